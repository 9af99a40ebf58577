use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::Serialize;

/// A validated location name.
///
/// Locations are non-empty and contain only ASCII letters and spaces. Names
/// built with [`Location::parse`] are title-cased, so that `"new  YORK"` and
/// `"New York"` describe the same place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct Location(NonEmptyString);

impl Location {
    /// Creates a location from a string, keeping its casing as is.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocation` if the string is empty, contains only
    /// whitespace, or contains characters other than ASCII letters and
    /// spaces.
    pub fn new(s: String) -> Result<Self, InvalidLocation> {
        if s.trim().is_empty() || !s.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
            return Err(InvalidLocation(s));
        }
        let non_empty = NonEmptyString::new(s).map_err(InvalidLocation)?;
        Ok(Self(non_empty))
    }

    /// Validates user input and normalises it to title case.
    ///
    /// Words are separated by single spaces; the first letter of each word is
    /// upper-cased and the rest lower-cased.
    ///
    /// ```
    /// use scheduler::Location;
    ///
    /// let location = Location::parse("  new   YORK ").unwrap();
    /// assert_eq!(location.as_str(), "New York");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocation` under the same conditions as
    /// [`Location::new`].
    pub fn parse(input: &str) -> Result<Self, InvalidLocation> {
        if !input
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        {
            return Err(InvalidLocation(input.to_string()));
        }

        let title_cased = input
            .split_whitespace()
            .map(title_case_word)
            .collect::<Vec<_>>()
            .join(" ");

        Self::new(title_cased).map_err(|_| InvalidLocation(input.to_string()))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn title_case_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

impl Deref for Location {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0.as_str().to_owned()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Location {
    type Error = InvalidLocation;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for Location {
    type Err = InvalidLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a location contains anything but letters and spaces.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid location '{0}': letters and spaces only")]
pub struct InvalidLocation(String);
