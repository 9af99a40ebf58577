use std::{fmt, marker::PhantomData};

use serde::Serialize;

use crate::domain::{DepartureTime, Location};

/// A category of record.
///
/// Cargo and freight share the same shape but are distinct types, so a cargo
/// record can never be stored in, or matched as, a freight collection.
pub trait Kind: fmt::Debug + Clone + Copy + PartialEq + Eq + Default + 'static {
    /// Prefix used when generating identifiers, e.g. `C` for `C1`.
    const PREFIX: &'static str;

    /// Human-readable name of the kind.
    const NAME: &'static str;
}

/// A transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cargo;

impl Kind for Cargo {
    const PREFIX: &'static str = "C";
    const NAME: &'static str = "Cargo";
}

/// A transport offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Freight;

impl Kind for Freight {
    const PREFIX: &'static str = "F";
    const NAME: &'static str = "Freight";
}

/// The identifier of a record within its collection, e.g. `C1` or `F2`.
///
/// The text is kept exactly as written. Collections compare identifiers
/// case-insensitively through [`RecordId::matches`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates an identifier from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against user-supplied text.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A cargo or freight entry: who, where and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(bound = "")]
pub struct Record<K: Kind> {
    id: RecordId,
    location: Location,
    departure_time: DepartureTime,
    #[serde(skip)]
    kind: PhantomData<K>,
}

/// A transport request record.
pub type CargoRecord = Record<Cargo>;

/// A transport offer record.
pub type FreightRecord = Record<Freight>;

impl<K: Kind> Record<K> {
    /// Creates a record from pre-validated parts.
    #[must_use]
    pub fn new(id: impl Into<RecordId>, location: Location, departure_time: DepartureTime) -> Self {
        Self {
            id: id.into(),
            location,
            departure_time,
            kind: PhantomData,
        }
    }

    /// The record's identifier.
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    /// Where the transport departs from.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// When the transport departs.
    #[must_use]
    pub const fn departure_time(&self) -> DepartureTime {
        self.departure_time
    }

    pub(crate) fn update(&mut self, location: Location, departure_time: DepartureTime) {
        self.location = location;
        self.departure_time = departure_time;
    }
}
