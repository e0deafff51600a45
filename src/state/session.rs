use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use parking_lot::Mutex;

use crate::config::SessionConfig;
use crate::document::{Drawing, DrawingId};
use crate::error::{SessionError, SessionResult, StoreError};
use crate::input::InputEvent;
use crate::store::{DrawingStore, DrawingSummary};
use crate::stroke::{Argb, Point, Segment};
use crate::tools::DrawStrokeTool;

/// Identity of the in-memory drawing, shared with pending saves.
#[derive(Debug, Default)]
struct Identity {
    /// Bumped whenever the session switches to another drawing.
    generation: u64,
    id: Option<DrawingId>,
    /// Generation whose save is currently running.
    saving: Option<u64>,
}

/// Owned by the queued store operation. Finishes the save on the store
/// worker: adopts the assigned id, then clears the in-flight mark.
struct SaveGuard {
    identity: Arc<Mutex<Identity>>,
    generation: u64,
}

impl SaveGuard {
    fn finish(self, result: Result<DrawingId, &StoreError>) {
        match result {
            Ok(id) => {
                let mut identity = self.identity.lock();
                if identity.generation == self.generation {
                    identity.id = Some(id);
                } else {
                    log::debug!("Saved {} for a drawing that is no longer active", id);
                }
            }
            Err(err) => log::debug!("Save of generation {} failed: {}", self.generation, err),
        }
    }
}

// Also runs if the queued operation is discarded without running.
impl Drop for SaveGuard {
    fn drop(&mut self) {
        let mut identity = self.identity.lock();
        if identity.saving == Some(self.generation) {
            identity.saving = None;
        }
    }
}

pub type SaveFuture = BoxFuture<'static, SessionResult<DrawingId>>;

/// Everything the canvas screen edits: the active drawing, the selected color
/// and stroke width, and the link to storage.
///
/// Pointer input is applied synchronously; storage work is handed to the
/// store and comes back as futures, so drawing continues while a save runs.
#[derive(Debug)]
pub struct ActiveDrawingSession {
    config: SessionConfig,
    store: DrawingStore,
    name: String,
    segments: Vec<Segment>,
    identity: Arc<Mutex<Identity>>,
    color_index: usize,
    stroke_width: f32,
    tool: DrawStrokeTool,
}

impl ActiveDrawingSession {
    pub fn new(store: DrawingStore, config: SessionConfig) -> Self {
        let color_index = config.default_color_index.min(config.palette.len().saturating_sub(1));
        let stroke_width = config.clamp_stroke_width(config.default_stroke_width);
        Self {
            name: config.default_name.clone(),
            segments: Vec::new(),
            identity: Arc::default(),
            color_index,
            stroke_width,
            tool: DrawStrokeTool::new(),
            store,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &DrawingStore {
        &self.store
    }

    // --------------------------------------------------------------------
    // Active drawing

    /// Id of the stored record this drawing is saved as, once a save assigned one.
    pub fn current_id(&self) -> Option<DrawingId> {
        self.identity.lock().id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A copy of the active drawing, carrying its current id.
    pub fn to_drawing(&self) -> Drawing {
        let mut drawing = Drawing::named(self.name.clone());
        drawing.set_id(self.current_id());
        drawing.replace_all(self.segments.clone());
        drawing
    }

    pub fn is_saving(&self) -> bool {
        let identity = self.identity.lock();
        identity.saving == Some(identity.generation)
    }

    /// In-memory only; persisted by the next [`Self::save_current`].
    /// Blank names are rejected.
    pub fn rename_current(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.trim().is_empty() {
            log::debug!("Ignoring blank drawing name");
            return false;
        }
        self.name = name;
        true
    }

    // --------------------------------------------------------------------
    // Palette

    pub fn palette(&self) -> &[Argb] {
        &self.config.palette
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn active_color(&self) -> Argb {
        self.config
            .palette
            .get(self.color_index)
            .copied()
            .unwrap_or(Argb::BLACK)
    }

    /// Affects only segments drawn from now on.
    pub fn select_color(&mut self, index: usize) -> bool {
        if index < self.config.palette.len() {
            self.color_index = index;
            true
        } else {
            false
        }
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    /// Clamped to the configured range. Affects only segments drawn from now on.
    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = self.config.clamp_stroke_width(width);
    }

    // --------------------------------------------------------------------
    // Capture

    /// Record one drag tick in the active color and width.
    pub fn append_segment_from_drag(&mut self, previous: Point, current: Point) -> Option<Segment> {
        self.append_segment_with(previous, current, self.active_color(), self.stroke_width)
    }

    /// Record one drag tick with explicit color and width.
    ///
    /// Returns `None` when the tick did not move and degenerate segments are
    /// configured to be dropped.
    pub fn append_segment_with(
        &mut self,
        previous: Point,
        current: Point,
        color: Argb,
        stroke_width: f32,
    ) -> Option<Segment> {
        if previous == current && !self.config.keep_degenerate_segments {
            return None;
        }
        let segment = Segment::new(previous, current, color, stroke_width);
        self.segments.push(segment);
        Some(segment)
    }

    /// Feed raw pointer input; returns the segment it produced, if any.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<Segment> {
        let tick = match event {
            InputEvent::PointerDown { position } => {
                self.tool.on_pointer_down(position);
                None
            }
            InputEvent::PointerMove { position } => self.tool.on_pointer_move(position),
            InputEvent::PointerUp { position } => self.tool.on_pointer_up(position),
            InputEvent::PointerCancel => {
                self.tool.cancel();
                None
            }
        }?;
        self.append_segment_from_drag(tick.previous, tick.current)
    }

    pub fn clear_canvas(&mut self) {
        self.segments.clear();
    }

    /// Switch to a fresh, unsaved, untitled drawing.
    pub fn start_new_drawing(&mut self) {
        self.switch_identity(None);
        self.name = self.config.default_name.clone();
        self.segments.clear();
        self.tool.cancel();
        log::debug!("Started a new drawing");
    }

    /// Replace the active drawing with one read from storage.
    pub fn open(&mut self, drawing: Drawing) {
        self.switch_identity(drawing.id());
        log::debug!(
            "Opened drawing {:?} ({} segments)",
            drawing.id(),
            drawing.segments().len()
        );
        self.name = drawing.name().to_owned();
        self.segments = drawing.into_segments();
        self.tool.cancel();
    }

    fn switch_identity(&mut self, id: Option<DrawingId>) {
        let mut identity = self.identity.lock();
        identity.generation += 1;
        identity.id = id;
    }

    // --------------------------------------------------------------------
    // Storage

    /// Persist the name and segments of the active drawing.
    ///
    /// Inserts on first save and adopts the new id; later saves overwrite the
    /// record. Only one save per drawing runs at a time: a second call while
    /// one is pending fails with [`SessionError::SaveInFlight`]. The store
    /// operation is queued immediately and finishes the save on the store
    /// worker; dropping the future only forgets the result.
    pub fn save_current(&mut self) -> SessionResult<SaveFuture> {
        let (generation, id) = {
            let mut identity = self.identity.lock();
            if identity.saving == Some(identity.generation) {
                return Err(SessionError::SaveInFlight);
            }
            identity.saving = Some(identity.generation);
            (identity.generation, identity.id)
        };
        let guard = SaveGuard {
            identity: Arc::clone(&self.identity),
            generation,
        };

        let name = self.name.clone();
        let segments = self.segments.clone();
        let pending = match id {
            Some(id) => self
                .store
                .save_then(id, name, segments, move |result| {
                    guard.finish(result.as_ref().map(|_| id))
                })
                .map(move |result| result.map(|()| id))
                .boxed(),
            None => self.store.insert_then(name, segments, move |result| {
                guard.finish(result.as_ref().copied())
            }),
        };

        Ok(pending.map(|result| result.map_err(SessionError::from)).boxed())
    }

    /// Load a stored drawing, replacing the active one.
    pub async fn load_drawing(&mut self, id: DrawingId) -> SessionResult<()> {
        let drawing = self.store.get(id).await?;
        self.open(drawing);
        Ok(())
    }

    /// Delete a stored drawing. If it is the one being edited, the canvas
    /// starts over with a new untitled drawing.
    pub async fn delete_drawing(&mut self, id: DrawingId) -> SessionResult<()> {
        self.store.delete(id).await?;
        if self.current_id() == Some(id) {
            self.start_new_drawing();
        }
        Ok(())
    }

    /// Live `{id, name}` list of stored drawings.
    pub fn subscribe_all_drawings(&self) -> BoxStream<'static, Vec<DrawingSummary>> {
        self.store
            .subscribe_all()
            .map(|snapshot| snapshot.summaries())
            .boxed()
    }
}
