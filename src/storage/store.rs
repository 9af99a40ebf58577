//! A line-oriented, file backed store of records
//!
//! The [`KeyedStore`] keeps records in insertion order. It is loaded once from
//! a text file, mutated in memory, and written back on an explicit save.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::instrument;

use crate::{
    domain::{DepartureTime, Kind, Location, Record, RecordId},
    storage::line::{decode_record, encode_record, text_lines},
};

/// An ordered collection of records with unique identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedStore<K: Kind> {
    items: Vec<Record<K>>,
}

impl<K: Kind> Default for KeyedStore<K> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Errors that can occur when reading or writing a store file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file exists but could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl<K: Kind> KeyedStore<K> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a file.
    ///
    /// A missing file yields an empty store. Lines that cannot be decoded, and
    /// lines repeating an identifier already seen, are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    #[instrument(level = "debug", fields(kind = K::NAME))]
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} not found, starting with an empty store", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let store = Self::read(BufReader::new(file)).map_err(|e| StoreError::io(path, e))?;
        tracing::debug!("Loaded {} records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Reads records from a line-oriented reader.
    ///
    /// Lines that are not valid UTF-8 are skipped like any other malformed
    /// line.
    ///
    /// # Errors
    ///
    /// Returns an error only if the reader itself fails.
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut store = Self::new();

        for line in text_lines(reader) {
            let (line_number, line) = line?;
            if line.trim().is_empty() {
                continue;
            }

            match decode_record::<K>(&line) {
                Ok(record) if store.exists(record.id().as_str()) => {
                    tracing::warn!(
                        "Skipping line {line_number}: duplicate {} id {}",
                        K::NAME,
                        record.id()
                    );
                }
                Ok(record) => store.add(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed line {line_number} ({e}): {line}");
                }
            }
        }

        Ok(store)
    }

    /// Writes every record, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for record in &self.items {
            encode_record(record, writer)?;
        }
        writer.flush()
    }

    /// Saves every record to a file, replacing its previous contents.
    ///
    /// The records are written to a temporary file alongside the target which
    /// then replaces it, so a failed save leaves the old file intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(level = "debug", skip(self), fields(kind = K::NAME, records = self.len()))]
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(path, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            self.write(&mut writer).map_err(|e| StoreError::io(path, e))?;
        }
        tmp.persist(path)
            .map_err(|e| StoreError::io(path, e.error))?;

        tracing::debug!("Saved {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Appends a record.
    ///
    /// The caller is responsible for the identifier being unused, typically
    /// by taking it from [`KeyedStore::generate_next_id`] or checking
    /// [`KeyedStore::exists`] first.
    pub fn add(&mut self, record: Record<K>) {
        tracing::debug!("Adding {} {}", K::NAME, record.id());
        self.items.push(record);
    }

    /// Returns whether a record with this identifier exists, ignoring case.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Looks up a record by identifier, ignoring case.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Record<K>> {
        self.items.iter().find(|record| record.id().matches(id))
    }

    /// Replaces the location and departure time of a record in place.
    ///
    /// Returns `false`, without modifying anything, if no record has this
    /// identifier.
    #[must_use]
    pub fn edit(&mut self, id: &str, location: Location, departure_time: DepartureTime) -> bool {
        let Some(index) = self.position(id) else {
            tracing::debug!("Cannot edit {} {id}: not found", K::NAME);
            return false;
        };
        self.items[index].update(location, departure_time);
        true
    }

    /// Removes a record, preserving the order of the others.
    ///
    /// Returns `false` if no record has this identifier.
    #[must_use]
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            tracing::debug!("Cannot delete {} {id}: not found", K::NAME);
            return false;
        };
        let removed = self.items.remove(index);
        tracing::debug!("Deleted {} {}", K::NAME, removed.id());
        true
    }

    /// Generates the identifier for the next record: the prefix followed by
    /// the number of stored records plus one.
    ///
    /// Identifiers are count based. After a deletion the generated identifier
    /// may already be in use (`C1`, `C2`, delete `C1`, next is `C2`); callers
    /// that need to rule this out must check [`KeyedStore::exists`].
    #[must_use]
    pub fn generate_next_id(&self, prefix: &str) -> RecordId {
        RecordId::new(format!("{prefix}{}", self.items.len() + 1))
    }

    /// Generates the next identifier using the kind's own prefix.
    #[must_use]
    pub fn next_id(&self) -> RecordId {
        self.generate_next_id(K::PREFIX)
    }

    /// All records in insertion order.
    #[must_use]
    pub fn all_items(&self) -> &[Record<K>] {
        &self.items
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record<K>> {
        self.items.iter()
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|record| record.id().matches(id))
    }
}

impl<K: Kind> FromIterator<Record<K>> for KeyedStore<K> {
    fn from_iter<T: IntoIterator<Item = Record<K>>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, K: Kind> IntoIterator for &'a KeyedStore<K> {
    type Item = &'a Record<K>;
    type IntoIter = std::slice::Iter<'a, Record<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
