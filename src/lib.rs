//! Plain-text Cargo and Freight scheduling
//!
//! Transport requests (cargo) and transport offers (freight) are kept in
//! line-oriented text files. The match engine pairs compatible entries into a
//! schedule, which can be persisted and replayed.

pub mod domain;
pub use domain::{
    Cargo, CargoRecord, DepartureTime, Freight, FreightRecord, Kind, Location, MatchEngine,
    MatchResult, Pairing, Record, RecordId,
};

/// Filesystem storage for record collections and schedules.
pub mod storage;
pub use storage::{KeyedStore, Schedule, ScheduleError, ScheduleRow, StoreError};

/// Session state shared by every operation.
pub mod session;
pub use session::{Session, SessionError};

pub mod table;
pub use table::Table;
