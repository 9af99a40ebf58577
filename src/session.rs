//! The working state of one scheduling session.
//!
//! A [`Session`] owns both record collections and the most recent match
//! result. It replaces process-wide state: callers open a session, operate on
//! it, and flush it when they are done.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{Cargo, Freight, MatchEngine, MatchResult},
    storage::{KeyedStore, Schedule, ScheduleError, StoreError, schedule},
};

/// File holding the cargo collection, relative to the data root.
pub const CARGO_FILE: &str = "Cargo.txt";

/// File holding the freight collection, relative to the data root.
pub const FREIGHT_FILE: &str = "Freight.txt";

/// File holding the saved schedule, relative to the data root.
pub const SCHEDULE_FILE: &str = "schedule.txt";

/// Errors raised by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A record collection could not be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The schedule could not be built, saved or displayed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A schedule was requested before one was generated.
    #[error("no schedule has been generated yet")]
    NoSchedule,
}

/// Both record collections plus the latest match result.
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    cargo: KeyedStore<Cargo>,
    freight: KeyedStore<Freight>,
    matches: Option<MatchResult>,
}

impl Session {
    /// Opens the session stored under `root`.
    ///
    /// Missing files give empty collections, and malformed lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if a file exists but cannot be read.
    /// No session is opened in that case, so a later [`Session::flush`] can
    /// never replace the unread file with a partial collection.
    #[instrument(level = "debug")]
    pub fn open(root: PathBuf) -> Result<Self, SessionError> {
        let cargo = KeyedStore::load(&root.join(CARGO_FILE))?;
        let freight = KeyedStore::load(&root.join(FREIGHT_FILE))?;

        Ok(Self {
            root,
            cargo,
            freight,
            matches: None,
        })
    }

    /// The directory the session's files live in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The cargo collection.
    #[must_use]
    pub const fn cargo(&self) -> &KeyedStore<Cargo> {
        &self.cargo
    }

    /// The cargo collection, for editing.
    pub const fn cargo_mut(&mut self) -> &mut KeyedStore<Cargo> {
        &mut self.cargo
    }

    /// The freight collection.
    #[must_use]
    pub const fn freight(&self) -> &KeyedStore<Freight> {
        &self.freight
    }

    /// The freight collection, for editing.
    pub const fn freight_mut(&mut self) -> &mut KeyedStore<Freight> {
        &mut self.freight
    }

    /// Recomputes the match result from the current collections, replacing
    /// any previous result.
    pub fn generate_schedule(&mut self) -> &MatchResult {
        self.matches
            .insert(MatchEngine::generate(&self.cargo, &self.freight))
    }

    /// The most recently generated match result, if any.
    #[must_use]
    pub const fn matches(&self) -> Option<&MatchResult> {
        self.matches.as_ref()
    }

    /// Resolves the latest match result into a displayable schedule.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSchedule`] if nothing has been generated, or
    /// an error if the collections changed since generation.
    pub fn schedule(&self) -> Result<Schedule, SessionError> {
        let matches = self.matches.as_ref().ok_or(SessionError::NoSchedule)?;
        Ok(Schedule::resolve(matches, &self.cargo, &self.freight)?)
    }

    /// Renders the latest match result.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been generated or the output fails.
    pub fn display_schedule<W: Write>(&self, out: &mut W) -> Result<(), SessionError> {
        let matches = self.matches.as_ref().ok_or(SessionError::NoSchedule)?;
        schedule::display_all(matches, &self.cargo, &self.freight, out)?;
        Ok(())
    }

    /// Renders the schedule last saved to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved file cannot be read or the output fails.
    pub fn display_saved_schedule<W: Write>(&self, out: &mut W) -> Result<(), SessionError> {
        schedule::display(&self.schedule_path(), out)?;
        Ok(())
    }

    /// Saves the latest match result to the schedule file.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been generated or the file cannot be
    /// written.
    pub fn save_schedule(&self) -> Result<(), SessionError> {
        let matches = self.matches.as_ref().ok_or(SessionError::NoSchedule)?;
        schedule::save(&self.schedule_path(), matches, &self.cargo, &self.freight)?;
        Ok(())
    }

    /// Saves both collections.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written. The in-memory
    /// collections are unaffected.
    #[instrument(level = "debug", skip(self))]
    pub fn flush(&self) -> Result<(), SessionError> {
        self.cargo.save(&self.root.join(CARGO_FILE))?;
        self.freight.save(&self.root.join(FREIGHT_FILE))?;
        Ok(())
    }

    fn schedule_path(&self) -> PathBuf {
        self.root.join(SCHEDULE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{DepartureTime, Kind, Location, Record};

    fn record<K: Kind>(id: &str, location: &str, time: u16) -> Record<K> {
        Record::new(
            id,
            Location::parse(location).unwrap(),
            DepartureTime::new(time).unwrap(),
        )
    }

    #[test]
    fn open_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let session = Session::open(tmp.path().to_path_buf()).unwrap();

        assert!(session.cargo().is_empty());
        assert!(session.freight().is_empty());
        assert!(session.matches().is_none());
    }

    #[test]
    fn unreadable_store_fails_to_open() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(CARGO_FILE)).unwrap();
        std::fs::write(tmp.path().join(FREIGHT_FILE), "F1,Austin,1200\n").unwrap();

        let error = Session::open(tmp.path().to_path_buf()).unwrap_err();

        assert!(matches!(error, SessionError::Store(StoreError::Io { .. })));
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(FREIGHT_FILE)).unwrap(),
            "F1,Austin,1200\n"
        );
    }

    #[test]
    fn invalid_utf8_line_does_not_cost_valid_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CARGO_FILE);
        std::fs::write(
            &path,
            b"C1,Seattle,0900\nC2,Denver,1200\nC3,Bad\xff,0900\nC4,Austin,1000\n",
        )
        .unwrap();

        let mut session = Session::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(session.cargo().len(), 3);
        session.cargo_mut().add(record("C5", "Boston", 800));
        session.flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "C1,Seattle,0900\nC2,Denver,1200\nC4,Austin,1000\nC5,Boston,0800\n"
        );
    }

    #[test]
    fn flush_then_reopen() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open(tmp.path().to_path_buf()).unwrap();
        let id = session.cargo().next_id();
        session.cargo_mut().add(record(id.as_str(), "Seattle", 900));
        let id = session.freight().next_id();
        session.freight_mut().add(record(id.as_str(), "Seattle", 900));
        session.flush().unwrap();

        let reopened = Session::open(tmp.path().to_path_buf()).unwrap();

        assert_eq!(reopened.cargo(), session.cargo());
        assert_eq!(reopened.freight(), session.freight());
        assert!(reopened.cargo().exists("C1"));
        assert!(reopened.freight().exists("F1"));
    }

    #[test]
    fn schedule_requires_generation() {
        let tmp = TempDir::new().unwrap();
        let session = Session::open(tmp.path().to_path_buf()).unwrap();

        assert!(matches!(session.schedule(), Err(SessionError::NoSchedule)));
        assert!(matches!(
            session.save_schedule(),
            Err(SessionError::NoSchedule)
        ));
    }

    #[test]
    fn generate_replaces_previous_result() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open(tmp.path().to_path_buf()).unwrap();
        session.cargo_mut().add(record("C1", "Seattle", 900));
        assert_eq!(session.generate_schedule().unmatched_cargo().len(), 1);

        session.freight_mut().add(record("F1", "Seattle", 900));
        let result = session.generate_schedule();

        assert_eq!(result.pairs().len(), 1);
        assert!(result.unmatched_cargo().is_empty());
    }

    #[test]
    fn saved_schedule_matches_live_view() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open(tmp.path().to_path_buf()).unwrap();
        session.cargo_mut().add(record("C1", "Seattle", 900));
        session.freight_mut().add(record("F1", "Seattle", 900));
        session.freight_mut().add(record("F2", "Denver", 900));
        session.generate_schedule();
        session.save_schedule().unwrap();

        let mut live = Vec::new();
        session.display_schedule(&mut live).unwrap();
        let mut saved = Vec::new();
        session.display_saved_schedule(&mut saved).unwrap();

        assert_eq!(live, saved);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(SCHEDULE_FILE)).unwrap(),
            "[matched]\nC1,F1,Seattle,0900\n[unmatched cargo]\n[unmatched freight]\nF2\n"
        );
    }
}
