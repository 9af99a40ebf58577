//! Domain models for cargo and freight scheduling.
//!
//! This module contains the record types shared by both collections, the
//! validated field types they are built from, and the match engine.

/// Record kinds and the generic record type.
pub mod record;
pub use record::{Cargo, CargoRecord, Freight, FreightRecord, Kind, Record, RecordId};

mod location;
pub use location::{InvalidLocation, Location};

mod time;
pub use time::{DepartureTime, InvalidTime};

/// Pairing of cargo with freight.
pub mod matcher;
pub use matcher::{MatchEngine, MatchResult, Pairing};
