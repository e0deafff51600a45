//! JSON form of a segment list.
//!
//! A drawing's segments are stored as one JSON array, in draw order:
//!
//! ```json
//! [{"start":{"x":0.0,"y":0.0},"end":{"x":5.0,"y":5.0},"colorArgb":-16777216,"strokeWidth":10.0}]
//! ```
//!
//! Coordinates and widths are written as the `f64` widening of the `f32`
//! values and narrowed back on read, which is lossless. `colorArgb` holds
//! the `0xAARRGGBB` bits as a signed 32-bit integer. Non-finite floats,
//! which JSON numbers cannot express, are written as the strings `"NaN"`,
//! `"Infinity"` and `"-Infinity"`.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::stroke::{Argb, Point, Segment};

/// An `f32` on the wire.
#[derive(Debug, Clone, Copy)]
struct WireFloat(f32);

impl Serialize for WireFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value == f32::INFINITY {
            serializer.serialize_str("Infinity")
        } else if value == f32::NEG_INFINITY {
            serializer.serialize_str("-Infinity")
        } else {
            serializer.serialize_f64(f64::from(value))
        }
    }
}

struct WireFloatVisitor;

impl Visitor<'_> for WireFloatVisitor {
    type Value = WireFloat;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, \"NaN\", \"Infinity\" or \"-Infinity\"")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<WireFloat, E> {
        Ok(WireFloat(value as f32))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<WireFloat, E> {
        Ok(WireFloat(value as f32))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<WireFloat, E> {
        Ok(WireFloat(value as f32))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<WireFloat, E> {
        match value {
            "NaN" => Ok(WireFloat(f32::NAN)),
            "Infinity" => Ok(WireFloat(f32::INFINITY)),
            "-Infinity" => Ok(WireFloat(f32::NEG_INFINITY)),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for WireFloat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WireFloatVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PointRecord {
    x: WireFloat,
    y: WireFloat,
}

impl From<Point> for PointRecord {
    fn from(point: Point) -> Self {
        Self {
            x: WireFloat(point.x),
            y: WireFloat(point.y),
        }
    }
}

impl From<PointRecord> for Point {
    fn from(record: PointRecord) -> Self {
        Point::new(record.x.0, record.y.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentRecord {
    start: PointRecord,
    end: PointRecord,
    // Wider than i32 so blobs written with the unsigned packing still load.
    color_argb: i64,
    stroke_width: WireFloat,
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            start: segment.start.into(),
            end: segment.end.into(),
            color_argb: i64::from(segment.color.to_signed()),
            stroke_width: WireFloat(segment.stroke_width),
        }
    }
}

impl SegmentRecord {
    fn into_segment(self, index: usize) -> Result<Segment, DecodeError> {
        let color = if let Ok(signed) = i32::try_from(self.color_argb) {
            Argb::from_signed(signed)
        } else if let Ok(unsigned) = u32::try_from(self.color_argb) {
            Argb(unsigned)
        } else {
            return Err(DecodeError {
                message: format!(
                    "segment {index}: colorArgb {} is not a 32-bit color",
                    self.color_argb
                ),
            });
        };

        Ok(Segment::new(
            self.start.into(),
            self.end.into(),
            color,
            self.stroke_width.0,
        ))
    }
}

/// Serialize segments to their stored JSON text, preserving order.
pub fn encode_segments(segments: &[Segment]) -> Result<String, serde_json::Error> {
    let records: Vec<SegmentRecord> = segments.iter().map(SegmentRecord::from).collect();
    serde_json::to_string(&records)
}

/// Parse stored JSON text back into segments, in stored order.
pub fn decode_segments(json: &str) -> Result<Vec<Segment>, DecodeError> {
    let records: Vec<SegmentRecord> = serde_json::from_str(json)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_segment(index))
        .collect()
}
