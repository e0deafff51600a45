use crate::stroke::Point;

/// Pointer input on the canvas, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Finger or button went down
    PointerDown { position: Point },
    /// Pointer moved while held down
    PointerMove { position: Point },
    /// Finger or button released
    PointerUp { position: Point },
    /// Gesture interrupted (e.g. pointer left the canvas)
    PointerCancel,
}

impl InputEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { position }
            | Self::PointerMove { position }
            | Self::PointerUp { position } => Some(*position),
            Self::PointerCancel => None,
        }
    }
}
