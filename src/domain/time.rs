use std::{fmt, str::FromStr};

use serde::Serialize;

/// A time of day encoded as `HHMM` in 24-hour form.
///
/// For example, `900` is 09:00 and `2359` is 23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct DepartureTime(u16);

impl DepartureTime {
    /// Creates a departure time from its `HHMM` encoding.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTime` if the hours are not below 24 or the minutes
    /// are not below 60.
    pub const fn new(hhmm: u16) -> Result<Self, InvalidTime> {
        if hhmm / 100 < 24 && hhmm % 100 < 60 {
            Ok(Self(hhmm))
        } else {
            Err(InvalidTime::OutOfRange(hhmm))
        }
    }

    /// Parses strict user input: exactly four digits, e.g. `0900`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTime` if the input is not four ASCII digits or is not
    /// a valid time of day.
    pub fn parse_hhmm(input: &str) -> Result<Self, InvalidTime> {
        if input.len() != 4 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTime::Format(input.to_string()));
        }
        input.parse()
    }

    /// Returns the `HHMM` encoding.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns the hour component.
    #[must_use]
    pub const fn hours(self) -> u16 {
        self.0 / 100
    }

    /// Returns the minute component.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0 % 100
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl From<DepartureTime> for String {
    fn from(time: DepartureTime) -> Self {
        time.to_string()
    }
}

impl TryFrom<u16> for DepartureTime {
    type Error = InvalidTime;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lenient parsing for persisted data: any decimal integer form is accepted,
/// so `"900"` and `"0900"` are the same time.
impl FromStr for DepartureTime {
    type Err = InvalidTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hhmm = s
            .trim()
            .parse::<u16>()
            .map_err(|_| InvalidTime::Format(s.to_string()))?;
        Self::new(hhmm)
    }
}

/// Errors that can occur when constructing a [`DepartureTime`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidTime {
    /// The input is not a number in the expected form.
    #[error("Invalid time '{0}': enter a 4-digit number, e.g. 0900")]
    Format(String),

    /// The hours or minutes are out of range.
    #[error("Invalid time {0:04}: must be in 24-hour format (0000 to 2359)")]
    OutOfRange(u16),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0; "midnight")]
    #[test_case(900; "nine am")]
    #[test_case(1259; "last minute of the hour")]
    #[test_case(2359; "last minute of the day")]
    fn new_accepts_valid_times(hhmm: u16) {
        assert_eq!(DepartureTime::new(hhmm).unwrap().get(), hhmm);
    }

    #[test_case(2400; "hour out of range")]
    #[test_case(960; "minutes out of range")]
    #[test_case(9999; "both out of range")]
    fn new_rejects_invalid_times(hhmm: u16) {
        assert_eq!(
            DepartureTime::new(hhmm),
            Err(InvalidTime::OutOfRange(hhmm))
        );
    }

    #[test]
    fn display_is_zero_padded() {
        let time = DepartureTime::new(905).unwrap();
        assert_eq!(time.to_string(), "0905");
        assert_eq!(time.hours(), 9);
        assert_eq!(time.minutes(), 5);
    }

    #[test_case("0900", Some(900); "four digits")]
    #[test_case("900", None; "three digits")]
    #[test_case("09:00", None; "colon")]
    #[test_case("2400", None; "out of range")]
    fn parse_hhmm_is_strict(input: &str, expected: Option<u16>) {
        let parsed = DepartureTime::parse_hhmm(input).ok().map(DepartureTime::get);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn from_str_accepts_unpadded_numbers() {
        assert_eq!("900".parse::<DepartureTime>().unwrap().get(), 900);
        assert!("nine".parse::<DepartureTime>().is_err());
    }
}
