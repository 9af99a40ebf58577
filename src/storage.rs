mod line;
/// Persisted match results.
pub mod schedule;
/// Generic keyed collection of records.
pub mod store;

pub use schedule::{Schedule, ScheduleError, ScheduleRow};
pub use store::{KeyedStore, StoreError};
