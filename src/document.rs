use crate::stroke::{Argb, Point, Segment};

pub const DEFAULT_NAME: &str = "untitled";

/// Store-assigned identity of a persisted drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DrawingId(pub u64);

impl std::fmt::Display for DrawingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The named, identified aggregate of all segments of one picture.
///
/// Segment order is draw order: segments are only ever appended during capture,
/// and the whole list is replaced at once when a stored drawing is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    id: Option<DrawingId>,
    name: String,
    segments: Vec<Segment>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    /// A fresh, unsaved drawing with no segments.
    pub fn new() -> Self {
        Self::named(DEFAULT_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            segments: Vec::new(),
        }
    }

    /// A drawing as read back from storage.
    pub fn stored(id: DrawingId, name: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            segments,
        }
    }

    pub fn id(&self) -> Option<DrawingId> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<DrawingId>) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Record one drag tick: a segment from `previous` to `current` in the
    /// color and width selected at this moment.
    pub fn begin_or_continue_drag(
        &mut self,
        previous: Point,
        current: Point,
        color: Argb,
        stroke_width: f32,
    ) -> Segment {
        let segment = Segment::new(previous, current, color, stroke_width);
        self.segments.push(segment);
        segment
    }

    /// Empties the canvas. Stored records are untouched.
    pub fn clear_all(&mut self) {
        self.segments.clear();
    }

    pub fn replace_all(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    /// Back to an unsaved, untitled, empty drawing.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
