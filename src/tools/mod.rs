mod draw_stroke_tool;

pub use draw_stroke_tool::{DragTick, DrawStrokeTool};
