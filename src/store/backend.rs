use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::DrawingId;
use crate::error::{DecodeError, StoreResult};

/// One row of the drawings table. `draw` is the segment list as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: DrawingId,
    pub name: String,
    pub draw: String,
}

/// A row as returned by a full scan: either readable, or the reason it is not.
pub type ScannedRow = (DrawingId, Result<Row, DecodeError>);

/// Embedded storage medium behind a [`super::DrawingStore`].
///
/// Each method touches a single row (or the id sequence) and must be atomic
/// on its own; the store never needs multi-row transactions.
pub trait StorageBackend: Send {
    /// Write a new row under the next id and return it.
    ///
    /// Ids increase monotonically and a committed id is never handed out
    /// again. The sequence only advances once the row is written, so a failed
    /// insert leaves the medium untouched.
    fn insert(&mut self, name: String, draw: String) -> StoreResult<DrawingId>;

    fn load(&self, id: DrawingId) -> StoreResult<Option<Row>>;

    /// All rows in ascending id order. Unreadable rows are reported in place.
    fn scan(&self) -> StoreResult<Vec<ScannedRow>>;

    /// Insert or overwrite the row with `row.id`.
    fn write(&mut self, row: &Row) -> StoreResult<()>;

    /// Returns whether a row was actually removed.
    fn remove(&mut self, id: DrawingId) -> StoreResult<bool>;
}

/// Volatile backend, handy for tests and for sessions that never touch disk.
#[derive(Debug)]
pub struct MemoryBackend {
    rows: BTreeMap<DrawingId, Row>,
    next_id: u64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Seed the table with existing rows; new ids continue after the largest one.
    pub fn with_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let rows: BTreeMap<_, _> = rows.into_iter().map(|row| (row.id, row)).collect();
        let next_id = rows.keys().next_back().map_or(1, |id| id.0 + 1);
        Self { rows, next_id }
    }
}

impl StorageBackend for MemoryBackend {
    fn insert(&mut self, name: String, draw: String) -> StoreResult<DrawingId> {
        let id = DrawingId(self.next_id);
        self.rows.insert(id, Row { id, name, draw });
        self.next_id += 1;
        Ok(id)
    }

    fn load(&self, id: DrawingId) -> StoreResult<Option<Row>> {
        Ok(self.rows.get(&id).cloned())
    }

    fn scan(&self) -> StoreResult<Vec<ScannedRow>> {
        Ok(self
            .rows
            .values()
            .map(|row| (row.id, Ok(row.clone())))
            .collect())
    }

    fn write(&mut self, row: &Row) -> StoreResult<()> {
        self.rows.insert(row.id, row.clone());
        Ok(())
    }

    fn remove(&mut self, id: DrawingId) -> StoreResult<bool> {
        Ok(self.rows.remove(&id).is_some())
    }
}
