use egui::{Color32, Pos2};

/// A canvas coordinate.
pub type Point = Pos2;

/// A color packed as `0xAARRGGBB`, one byte per channel, not premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Argb(pub u32);

impl Argb {
    pub const BLACK: Self = Self(0xFF00_0000);

    pub const fn from_channels(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// The signed form written to storage (same bits, read as `i32`).
    pub const fn to_signed(self) -> i32 {
        self.0 as i32
    }

    pub const fn from_signed(value: i32) -> Self {
        Self(value as u32)
    }
}

impl From<Argb> for Color32 {
    fn from(color: Argb) -> Self {
        Color32::from_rgba_unmultiplied(color.red(), color.green(), color.blue(), color.alpha())
    }
}

impl From<Color32> for Argb {
    fn from(color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self::from_channels(a, r, g, b)
    }
}

/// One straight line primitive. A continuous drag produces a run of these,
/// one per reported pointer movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub color: Argb,
    pub stroke_width: f32,
}

impl Segment {
    pub fn new(start: Point, end: Point, color: Argb, stroke_width: f32) -> Self {
        Self {
            start,
            end,
            color,
            stroke_width,
        }
    }

    /// True when both endpoints coincide (a stationary drag tick).
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}
