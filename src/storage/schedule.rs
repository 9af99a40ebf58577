//! The schedule: a match result with its record details resolved
//!
//! A [`Schedule`] is built either from a live [`MatchResult`] and the stores
//! it was computed from, or by re-reading a saved schedule file. Both are
//! rendered by the same function, so the two views show identical rows.
//!
//! The file is split into three sections:
//!
//! ```text
//! [matched]
//! C1,F1,Seattle,0900
//! [unmatched cargo]
//! C2
//! [unmatched freight]
//! F2
//! ```

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::instrument;

use crate::{
    domain::{Cargo, DepartureTime, Freight, Location, MatchResult, RecordId},
    storage::{
        KeyedStore,
        line::{DELIMITER, LineError, parse_id, split_fields, text_lines},
    },
    table::Table,
};

const MATCHED: &str = "[matched]";
const UNMATCHED_CARGO: &str = "[unmatched cargo]";
const UNMATCHED_FREIGHT: &str = "[unmatched freight]";

/// One matched pair with the location and time they share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    /// The cargo being carried.
    pub cargo_id: RecordId,
    /// The freight carrying it.
    pub freight_id: RecordId,
    /// Shared departure location.
    pub location: Location,
    /// Shared departure time.
    pub departure_time: DepartureTime,
}

/// A displayable, persistable match result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    rows: Vec<ScheduleRow>,
    unmatched_cargo: Vec<RecordId>,
    unmatched_freight: Vec<RecordId>,
}

/// Errors that can occur when building, reading or writing a schedule.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// No schedule file has been saved yet.
    #[error("no schedule available")]
    NotAvailable,

    /// A matched identifier is no longer present in its store.
    #[error("{kind} {id} in the match result is no longer stored")]
    UnknownRecord {
        /// The kind of the missing record.
        kind: &'static str,
        /// The missing identifier.
        id: RecordId,
    },

    /// The rendered schedule could not be written to its output.
    #[error("failed to write schedule output: {0}")]
    Output(#[source] io::Error),

    /// The schedule file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Matched,
    UnmatchedCargo,
    UnmatchedFreight,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        match line {
            MATCHED => Some(Self::Matched),
            UNMATCHED_CARGO => Some(Self::UnmatchedCargo),
            UNMATCHED_FREIGHT => Some(Self::UnmatchedFreight),
            _ => None,
        }
    }
}

impl Schedule {
    /// Resolves a live match result against the stores it was computed from.
    ///
    /// Each pair takes its location and time from the cargo record; the freight
    /// record shares them by construction.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::UnknownRecord`] if a paired identifier is no
    /// longer present, i.e. the stores changed after matching.
    pub fn resolve(
        result: &MatchResult,
        cargo: &KeyedStore<Cargo>,
        freight: &KeyedStore<Freight>,
    ) -> Result<Self, ScheduleError> {
        let rows = result
            .pairs()
            .iter()
            .map(|pairing| {
                let cargo_record = cargo.get_by_id(pairing.cargo_id.as_str()).ok_or_else(|| {
                    ScheduleError::UnknownRecord {
                        kind: "Cargo",
                        id: pairing.cargo_id.clone(),
                    }
                })?;
                if !freight.exists(pairing.freight_id.as_str()) {
                    return Err(ScheduleError::UnknownRecord {
                        kind: "Freight",
                        id: pairing.freight_id.clone(),
                    });
                }
                Ok(ScheduleRow {
                    cargo_id: pairing.cargo_id.clone(),
                    freight_id: pairing.freight_id.clone(),
                    location: cargo_record.location().clone(),
                    departure_time: cargo_record.departure_time(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rows,
            unmatched_cargo: result.unmatched_cargo().to_vec(),
            unmatched_freight: result.unmatched_freight().to_vec(),
        })
    }

    /// The matched rows.
    #[must_use]
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    /// Cargo left without freight.
    #[must_use]
    pub fn unmatched_cargo(&self) -> &[RecordId] {
        &self.unmatched_cargo
    }

    /// Freight left without cargo.
    #[must_use]
    pub fn unmatched_freight(&self) -> &[RecordId] {
        &self.unmatched_freight
    }

    /// Loads a saved schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotAvailable`] if the file does not exist, or
    /// [`ScheduleError::Io`] if it cannot be read.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self, ScheduleError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScheduleError::NotAvailable,
            _ => ScheduleError::io(path, e),
        })?;
        Self::read(BufReader::new(file)).map_err(|e| ScheduleError::io(path, e))
    }

    /// Parses a schedule from a reader.
    ///
    /// Lines outside a section, rows that cannot be decoded, and lines that
    /// are not valid UTF-8 are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only if the reader itself fails.
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut schedule = Self::default();
        let mut section = None;

        for line in text_lines(reader) {
            let (line_number, line) = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(header) = Section::from_header(line) {
                section = Some(header);
                continue;
            }

            let parsed = match section {
                Some(Section::Matched) => decode_row(line).map(|row| schedule.rows.push(row)),
                Some(Section::UnmatchedCargo) => {
                    parse_id(line).map(|id| schedule.unmatched_cargo.push(id))
                }
                Some(Section::UnmatchedFreight) => {
                    parse_id(line).map(|id| schedule.unmatched_freight.push(id))
                }
                None => {
                    tracing::warn!("Skipping line {line_number} outside any section: {line}");
                    continue;
                }
            };

            if let Err(e) = parsed {
                tracing::warn!("Skipping malformed line {line_number} ({e}): {line}");
            }
        }

        Ok(schedule)
    }

    /// Writes the schedule in its file format.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{MATCHED}")?;
        for row in &self.rows {
            writeln!(
                writer,
                "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
                row.cargo_id, row.freight_id, row.location, row.departure_time
            )?;
        }

        writeln!(writer, "{UNMATCHED_CARGO}")?;
        for id in &self.unmatched_cargo {
            writeln!(writer, "{id}")?;
        }

        writeln!(writer, "{UNMATCHED_FREIGHT}")?;
        for id in &self.unmatched_freight {
            writeln!(writer, "{id}")?;
        }

        writer.flush()
    }

    /// Saves the schedule, replacing any previous file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(level = "debug", skip(self), fields(rows = self.rows.len()))]
    pub fn save(&self, path: &Path) -> Result<(), ScheduleError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir).map_err(|e| ScheduleError::io(path, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            self.write(&mut writer)
                .map_err(|e| ScheduleError::io(path, e))?;
        }
        tmp.persist(path)
            .map_err(|e| ScheduleError::io(path, e.error))?;

        tracing::debug!("Saved schedule to {}", path.display());
        Ok(())
    }

    /// Renders the human-readable view: the matched table followed by the
    /// two leftover sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Matched ({})", self.rows.len())?;
        if self.rows.is_empty() {
            writeln!(out, "  (none)")?;
        } else {
            let mut table = Table::new(["Cargo", "Freight", "Location", "Time"]);
            table.extend(self.rows.iter().map(|row| {
                [
                    row.cargo_id.to_string(),
                    row.freight_id.to_string(),
                    row.location.to_string(),
                    row.departure_time.to_string(),
                ]
            }));
            for line in table.lines() {
                writeln!(out, "  {line}")?;
            }
        }

        writeln!(out)?;
        write_leftovers(out, "Unmatched Cargo", &self.unmatched_cargo)?;
        writeln!(out)?;
        write_leftovers(out, "Unmatched Freight", &self.unmatched_freight)
    }
}

impl ScheduleError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn decode_row(line: &str) -> Result<ScheduleRow, LineError> {
    let [cargo_id, freight_id, location, time] = split_fields::<4>(line)?;
    Ok(ScheduleRow {
        cargo_id: parse_id(cargo_id)?,
        freight_id: parse_id(freight_id)?,
        location: location.parse()?,
        departure_time: time.parse()?,
    })
}

fn write_leftovers<W: Write>(out: &mut W, title: &str, ids: &[RecordId]) -> io::Result<()> {
    writeln!(out, "{title} ({})", ids.len())?;
    if ids.is_empty() {
        writeln!(out, "  (none)")
    } else {
        let joined = ids.iter().map(RecordId::as_str).collect::<Vec<_>>().join(", ");
        writeln!(out, "  {joined}")
    }
}

/// Renders the schedule saved at `path`.
///
/// A missing file is reported as "No schedule available." rather than an
/// error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or if writing to
/// `out` fails.
pub fn display<W: Write>(path: &Path, out: &mut W) -> Result<(), ScheduleError> {
    let rendered = match Schedule::load(path) {
        Ok(schedule) => schedule.render(out),
        Err(ScheduleError::NotAvailable) => writeln!(out, "No schedule available."),
        Err(e) => return Err(e),
    };
    rendered.map_err(ScheduleError::Output)
}

/// Renders a live match result, resolving record details from the stores.
///
/// # Errors
///
/// Returns an error if the result no longer agrees with the stores, or if
/// writing to `out` fails.
pub fn display_all<W: Write>(
    result: &MatchResult,
    cargo: &KeyedStore<Cargo>,
    freight: &KeyedStore<Freight>,
    out: &mut W,
) -> Result<(), ScheduleError> {
    Schedule::resolve(result, cargo, freight)?
        .render(out)
        .map_err(ScheduleError::Output)
}

/// Resolves a live match result and saves it to `path`.
///
/// # Errors
///
/// Returns an error if the result no longer agrees with the stores, or if
/// the file cannot be written.
pub fn save(
    path: &Path,
    result: &MatchResult,
    cargo: &KeyedStore<Cargo>,
    freight: &KeyedStore<Freight>,
) -> Result<(), ScheduleError> {
    Schedule::resolve(result, cargo, freight)?.save(path)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::{MatchEngine, Record};

    fn record<K: crate::domain::Kind>(id: &str, location: &str, time: u16) -> Record<K> {
        Record::new(
            id,
            Location::parse(location).unwrap(),
            DepartureTime::new(time).unwrap(),
        )
    }

    fn sample() -> (KeyedStore<Cargo>, KeyedStore<Freight>, MatchResult) {
        let cargo: KeyedStore<Cargo> = [
            record("C1", "Seattle", 900),
            record("C2", "Boston", 1100),
        ]
        .into_iter()
        .collect();
        let freight: KeyedStore<Freight> = [
            record("F1", "Seattle", 900),
            record("F2", "Denver", 900),
        ]
        .into_iter()
        .collect();
        let result = MatchEngine::generate(&cargo, &freight);
        (cargo, freight, result)
    }

    fn rendered(render: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut out = Vec::new();
        render(&mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn resolve_fills_in_shared_fields() {
        let (cargo, freight, result) = sample();

        let schedule = Schedule::resolve(&result, &cargo, &freight).unwrap();

        assert_eq!(
            schedule.rows(),
            [ScheduleRow {
                cargo_id: "C1".into(),
                freight_id: "F1".into(),
                location: Location::parse("seattle").unwrap(),
                departure_time: DepartureTime::new(900).unwrap(),
            }]
        );
        assert_eq!(schedule.unmatched_cargo(), [RecordId::from("C2")]);
        assert_eq!(schedule.unmatched_freight(), [RecordId::from("F2")]);
    }

    #[test]
    fn resolve_fails_when_stores_changed() {
        let (mut cargo, freight, result) = sample();
        assert!(cargo.delete("C1"));

        let error = Schedule::resolve(&result, &cargo, &freight).unwrap_err();

        assert!(matches!(
            error,
            ScheduleError::UnknownRecord { kind: "Cargo", .. }
        ));
    }

    #[test]
    fn writes_sectioned_file() {
        let (cargo, freight, result) = sample();
        let schedule = Schedule::resolve(&result, &cargo, &freight).unwrap();

        let mut out = Vec::new();
        schedule.write(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[matched]\nC1,F1,Seattle,0900\n[unmatched cargo]\nC2\n[unmatched freight]\nF2\n"
        );
    }

    #[test]
    fn read_skips_malformed_rows() {
        let input = "stray\n[matched]\nC1,F1,Seattle,0900\nC2,F2,Seattle\n\n[unmatched cargo]\nC3\n[unmatched freight]\n";

        let schedule = Schedule::read(Cursor::new(input)).unwrap();

        assert_eq!(schedule.rows().len(), 1);
        assert_eq!(schedule.unmatched_cargo(), [RecordId::from("C3")]);
        assert!(schedule.unmatched_freight().is_empty());
    }

    #[test]
    fn display_skips_row_with_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("schedule.txt");
        std::fs::write(
            &path,
            b"[matched]\nC1,F1,Seattle,0900\nC2,F2,Bad\xff,0900\n[unmatched cargo]\nC3\n[unmatched freight]\n",
        )
        .unwrap();

        let schedule = Schedule::load(&path).unwrap();
        assert_eq!(schedule.rows().len(), 1);
        assert_eq!(schedule.unmatched_cargo(), [RecordId::from("C3")]);

        let output = rendered(|out| display(&path, out).unwrap());
        assert!(output.contains("C1"));
        assert!(output.contains("Unmatched Cargo (1)"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("schedule.txt");
        let (cargo, freight, result) = sample();

        save(&path, &result, &cargo, &freight).unwrap();
        let loaded = Schedule::load(&path).unwrap();

        assert_eq!(loaded, Schedule::resolve(&result, &cargo, &freight).unwrap());
    }

    #[test]
    fn file_and_live_views_render_identically() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("schedule.txt");
        let (cargo, freight, result) = sample();
        save(&path, &result, &cargo, &freight).unwrap();

        let live = rendered(|out| display_all(&result, &cargo, &freight, out).unwrap());
        let from_file = rendered(|out| display(&path, out).unwrap());

        assert_eq!(live, from_file);
        assert!(live.contains("C1"));
        assert!(live.contains("Unmatched Freight (1)"));
    }

    #[test]
    fn display_missing_file_reports_no_schedule() {
        let tmp = TempDir::new().unwrap();

        let output = rendered(|out| display(&tmp.path().join("schedule.txt"), out).unwrap());

        assert_eq!(output, "No schedule available.\n");
    }

    #[test]
    fn load_missing_file_is_not_available() {
        let tmp = TempDir::new().unwrap();
        let error = Schedule::load(&tmp.path().join("schedule.txt")).unwrap_err();
        assert!(matches!(error, ScheduleError::NotAvailable));
    }

    #[test]
    fn render_aligns_matched_rows() {
        let schedule = Schedule {
            rows: vec![ScheduleRow {
                cargo_id: "C1".into(),
                freight_id: "F12".into(),
                location: Location::parse("salt lake city").unwrap(),
                departure_time: DepartureTime::new(900).unwrap(),
            }],
            ..Schedule::default()
        };

        let output = rendered(|out| schedule.render(out).unwrap());

        assert!(output.starts_with(
            "Matched (1)\n  Cargo  Freight  Location        Time\n  -----  -------  --------------  ----\n  C1     F12      Salt Lake City  0900\n"
        ));
    }

    #[test]
    fn render_empty_schedule() {
        let output = rendered(|out| Schedule::default().render(out).unwrap());
        assert_eq!(
            output,
            "Matched (0)\n  (none)\n\nUnmatched Cargo (0)\n  (none)\n\nUnmatched Freight (0)\n  (none)\n"
        );
    }
}
