//! Line codec shared by the record and schedule files.
//!
//! Each line holds comma-separated fields. Locations are letters and spaces
//! only, so the delimiter never appears inside a field.

use std::io::{self, BufRead, Write};

use crate::domain::{DepartureTime, InvalidLocation, InvalidTime, Kind, Location, Record, RecordId};

pub(crate) const DELIMITER: char = ',';

/// Reasons a persisted line could not be decoded.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum LineError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid identifier '{0}'")]
    InvalidId(String),

    #[error(transparent)]
    Location(#[from] InvalidLocation),

    #[error(transparent)]
    Time(#[from] InvalidTime),
}

/// Reads `reader` line by line as raw bytes, yielding each line with its
/// 1-based number.
///
/// Line endings (`\n` or `\r\n`) are stripped. A line that is not valid
/// UTF-8 is skipped with a warning; the lines around it are unaffected.
pub(crate) fn text_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<(usize, String)>> {
    reader
        .split(b'\n')
        .enumerate()
        .filter_map(|(index, bytes)| {
            let line_number = index + 1;
            let mut bytes = match bytes {
                Ok(bytes) => bytes,
                Err(e) => return Some(Err(e)),
            };
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            match String::from_utf8(bytes) {
                Ok(line) => Some(Ok((line_number, line))),
                Err(e) => {
                    tracing::warn!(
                        "Skipping line {line_number}: not valid UTF-8 ({})",
                        e.utf8_error()
                    );
                    None
                }
            }
        })
}

/// Splits a line into exactly `N` trimmed fields.
pub(crate) fn split_fields<const N: usize>(line: &str) -> Result<[&str; N], LineError> {
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    <[&str; N]>::try_from(fields.as_slice()).map_err(|_| LineError::FieldCount {
        expected: N,
        found: fields.len(),
    })
}

pub(crate) fn parse_id(field: &str) -> Result<RecordId, LineError> {
    if field.is_empty() || field.contains(char::is_whitespace) {
        return Err(LineError::InvalidId(field.to_string()));
    }
    Ok(RecordId::new(field))
}

/// Decodes `id,location,time`.
pub(crate) fn decode_record<K: Kind>(line: &str) -> Result<Record<K>, LineError> {
    let [id, location, time] = split_fields::<3>(line)?;
    let id = parse_id(id)?;
    let location: Location = location.parse()?;
    let time: DepartureTime = time.parse()?;
    Ok(Record::new(id, location, time))
}

pub(crate) fn encode_record<K: Kind, W: Write>(record: &Record<K>, writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "{}{DELIMITER}{}{DELIMITER}{}",
        record.id(),
        record.location(),
        record.departure_time()
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use test_case::test_case;

    use super::*;
    use crate::domain::CargoRecord;

    #[test]
    fn decodes_record_line() {
        let record: CargoRecord = decode_record("C1,Seattle,900").unwrap();
        assert_eq!(record.id().as_str(), "C1");
        assert_eq!(record.location().as_str(), "Seattle");
        assert_eq!(record.departure_time().get(), 900);
    }

    #[test]
    fn trims_fields() {
        let record: CargoRecord = decode_record(" C1 , Salt Lake City , 0930 ").unwrap();
        assert_eq!(record.location().as_str(), "Salt Lake City");
    }

    #[test]
    fn text_lines_skips_invalid_utf8_and_keeps_numbering() {
        let input: &[u8] = b"C1,Seattle,0900\r\nC3,Bad\xff,0900\nC4,Austin,1000";

        let lines: Vec<(usize, String)> = text_lines(Cursor::new(input))
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(
            lines,
            [
                (1, "C1,Seattle,0900".to_string()),
                (3, "C4,Austin,1000".to_string()),
            ]
        );
    }

    #[test]
    fn encodes_with_padded_time() {
        let record: CargoRecord = decode_record("C1,Seattle,900").unwrap();
        let mut out = Vec::new();
        encode_record(&record, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "C1,Seattle,0900\n");
    }

    #[test_case("C1,Seattle"; "too few fields")]
    #[test_case("C1,Seattle,900,extra"; "too many fields")]
    #[test_case(",Seattle,900"; "empty id")]
    #[test_case("C1,Seattle2,900"; "bad location")]
    #[test_case("C1,Seattle,2500"; "bad time")]
    #[test_case("C1,Seattle,noon"; "non numeric time")]
    fn rejects_malformed_lines(line: &str) {
        assert!(decode_record::<crate::domain::Cargo>(line).is_err());
    }
}
