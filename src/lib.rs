#![warn(clippy::all, rust_2018_idioms)]

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod input;
pub mod renderer;
pub mod state;
pub mod store;
pub mod stroke;
pub mod tools;

pub use config::{SessionConfig, StoreConfig};
pub use document::{Drawing, DrawingId};
pub use error::{ConfigError, DecodeError, SessionError, StoreError};
pub use input::InputEvent;
pub use state::ActiveDrawingSession;
pub use store::{DrawingStore, DrawingSummary, FileBackend, MemoryBackend, Snapshot};
pub use stroke::{Argb, Point, Segment};
pub use tools::DrawStrokeTool;
