use crate::stroke::Point;

/// One drag tick: where the pointer was, and where it is now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTick {
    pub previous: Point,
    pub current: Point,
}

/// Follows a press-move-release gesture and reports each movement delta.
///
/// The tool itself stores nothing but the last pointer position; segments are
/// built by the session from the ticks it hands out.
#[derive(Debug, Default, Clone)]
pub struct DrawStrokeTool {
    // Transient state: last position of the gesture in progress (if any)
    last_position: Option<Point>,
}

impl DrawStrokeTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &'static str {
        "DrawStroke"
    }

    pub fn is_dragging(&self) -> bool {
        self.last_position.is_some()
    }

    pub fn on_pointer_down(&mut self, pos: Point) {
        self.last_position = Some(pos);
    }

    /// Movement without a preceding press is ignored.
    pub fn on_pointer_move(&mut self, pos: Point) -> Option<DragTick> {
        let previous = self.last_position.replace(pos)?;
        Some(DragTick {
            previous,
            current: pos,
        })
    }

    /// A release at a new position still counts as a final movement.
    pub fn on_pointer_up(&mut self, pos: Point) -> Option<DragTick> {
        let previous = self.last_position.take()?;
        (previous != pos).then_some(DragTick {
            previous,
            current: pos,
        })
    }

    pub fn cancel(&mut self) {
        self.last_position = None;
    }
}
