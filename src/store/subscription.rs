use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender};

use super::backend::ScannedRow;
use crate::codec;
use crate::document::{Drawing, DrawingId};
use crate::error::DecodeError;

/// A stored drawing whose row or segment blob could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct CorruptRecord {
    pub id: DrawingId,
    /// Known when only the segment blob is malformed.
    pub name: Option<String>,
    pub error: DecodeError,
}

pub type SnapshotEntry = Result<Drawing, CorruptRecord>;

/// What the list screen shows for one stored drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingSummary {
    pub id: DrawingId,
    pub name: String,
    pub readable: bool,
}

/// The full contents of the store at one instant, in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub(crate) fn from_rows(rows: Vec<ScannedRow>) -> Self {
        let entries = rows
            .into_iter()
            .map(|(id, row)| {
                let row = row.map_err(|error| CorruptRecord {
                    id,
                    name: None,
                    error,
                })?;
                match codec::decode_segments(&row.draw) {
                    Ok(segments) => Ok(Drawing::stored(id, row.name, segments)),
                    Err(error) => {
                        log::warn!("Drawing {} ({:?}) has unreadable segments: {}", id, row.name, error);
                        Err(CorruptRecord {
                            id,
                            name: Some(row.name),
                            error,
                        })
                    }
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Readable drawings only.
    pub fn drawings(&self) -> impl Iterator<Item = &Drawing> {
        self.entries.iter().filter_map(|entry| entry.as_ref().ok())
    }

    pub fn corrupt(&self) -> impl Iterator<Item = &CorruptRecord> {
        self.entries.iter().filter_map(|entry| entry.as_ref().err())
    }

    pub fn find(&self, id: DrawingId) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|entry| entry_id(entry) == id)
    }

    pub fn summaries(&self) -> Vec<DrawingSummary> {
        self.entries
            .iter()
            .map(|entry| match entry {
                Ok(drawing) => DrawingSummary {
                    id: entry_id(entry),
                    name: drawing.name().to_owned(),
                    readable: true,
                },
                Err(corrupt) => DrawingSummary {
                    id: corrupt.id,
                    name: corrupt.name.clone().unwrap_or_default(),
                    readable: false,
                },
            })
            .collect()
    }
}

fn entry_id(entry: &SnapshotEntry) -> DrawingId {
    match entry {
        // Stored drawings always carry their id.
        Ok(drawing) => drawing.id().unwrap_or(DrawingId(0)),
        Err(corrupt) => corrupt.id,
    }
}

pub type SnapshotReceiver = UnboundedReceiver<Snapshot>;

/// Fans committed snapshots out to every live subscriber.
#[derive(Default)]
pub(crate) struct Subscribers {
    senders: Vec<UnboundedSender<Snapshot>>,
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("senders", &format!("<{} subscribers>", self.senders.len()))
            .finish()
    }
}

impl Subscribers {
    pub(crate) fn add(&mut self, sender: UnboundedSender<Snapshot>) {
        self.senders.retain(|sender| !sender.is_closed());
        self.senders.push(sender);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Deliver to everyone, forgetting subscribers that hung up.
    pub(crate) fn emit(&mut self, snapshot: &Snapshot) {
        self.senders
            .retain(|sender| sender.unbounded_send(snapshot.clone()).is_ok());
        log::debug!(
            "Published snapshot of {} drawings to {} subscribers",
            snapshot.len(),
            self.senders.len()
        );
    }
}
