use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::backend::{Row, ScannedRow, StorageBackend};
use crate::config::StoreConfig;
use crate::document::DrawingId;
use crate::error::{DecodeError, StoreError, StoreResult};

const DRAWS_DIR: &str = "draws";
const SEQUENCE_FILE: &str = "sequence";

/// Stores each drawing as `<root>/draws/<id>.json` and the next free id in
/// `<root>/sequence`.
///
/// Every file is replaced by writing a temp file next to it and renaming it
/// over the old one, so a failed write leaves the previous content in place.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    next_id: u64,
}

impl FileBackend {
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(DRAWS_DIR)).map_err(StoreError::Write)?;

        let mut backend = Self { root, next_id: 1 };
        backend.next_id = backend.read_sequence()?;
        log::info!(
            "Opened drawing storage at {} (next id {})",
            backend.root.display(),
            backend.next_id
        );
        Ok(backend)
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(&config.data_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn draws_dir(&self) -> PathBuf {
        self.root.join(DRAWS_DIR)
    }

    fn row_path(&self, id: DrawingId) -> PathBuf {
        self.draws_dir().join(format!("{}.json", id.0))
    }

    /// The persisted sequence, never behind the largest id already on disk.
    fn read_sequence(&self) -> StoreResult<u64> {
        let stored = match fs::read_to_string(self.root.join(SEQUENCE_FILE)) {
            Ok(text) => text.trim().parse::<u64>().ok().unwrap_or_else(|| {
                log::warn!("Ignoring unreadable id sequence {:?}", text.trim());
                1
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => 1,
            Err(err) => return Err(StoreError::Read(err)),
        };

        let largest = self
            .row_ids()?
            .into_iter()
            .max()
            .map_or(0, |id| id.0);

        Ok(stored.max(largest + 1))
    }

    fn row_ids(&self) -> StoreResult<Vec<DrawingId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.draws_dir()).map_err(StoreError::Read)? {
            let entry = entry.map_err(StoreError::Read)?;
            let file_name = entry.file_name();
            let Some(id) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(".json"))
                .and_then(|stem| stem.parse::<u64>().ok())
            else {
                continue;
            };
            ids.push(DrawingId(id));
        }
        ids.sort();
        Ok(ids)
    }

    fn read_row(&self, id: DrawingId) -> StoreResult<Option<Result<Row, DecodeError>>> {
        let text = match fs::read_to_string(self.row_path(id)) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Read(err)),
        };

        let parsed = serde_json::from_str::<Row>(&text)
            .map_err(DecodeError::from)
            .and_then(|row| {
                if row.id == id {
                    Ok(row)
                } else {
                    Err(DecodeError {
                        message: format!("file for {id} holds row {}", row.id),
                    })
                }
            });
        Ok(Some(parsed))
    }
}

/// Replace `path` with `contents` via a uniquely named sibling temp file.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));

    let result = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

impl StorageBackend for FileBackend {
    fn insert(&mut self, name: String, draw: String) -> StoreResult<DrawingId> {
        let id = DrawingId(self.next_id);
        self.write(&Row { id, name, draw })?;
        self.next_id += 1;

        // The row is committed either way; `read_sequence` catches up on open.
        let sequence = self.next_id.to_string();
        if let Err(err) = write_atomically(&self.root.join(SEQUENCE_FILE), sequence.as_bytes()) {
            log::warn!("Failed to persist id sequence after inserting {}: {}", id, err);
        }
        Ok(id)
    }

    fn load(&self, id: DrawingId) -> StoreResult<Option<Row>> {
        match self.read_row(id)? {
            None => Ok(None),
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(source)) => Err(StoreError::Deserialization { id, source }),
        }
    }

    fn scan(&self) -> StoreResult<Vec<ScannedRow>> {
        let mut rows = Vec::new();
        for id in self.row_ids()? {
            // Removed between listing and reading: skip it.
            if let Some(row) = self.read_row(id)? {
                rows.push((id, row));
            }
        }
        Ok(rows)
    }

    fn write(&mut self, row: &Row) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(row)?;
        write_atomically(&self.row_path(row.id), &json).map_err(StoreError::Write)
    }

    fn remove(&mut self, id: DrawingId) -> StoreResult<bool> {
        match fs::remove_file(self.row_path(id)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StoreError::Write(err)),
        }
    }
}
