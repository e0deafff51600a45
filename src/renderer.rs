use egui::{Color32, Painter, Shape, Stroke};

use crate::stroke::Segment;

/// Rebuild the picture from its segments, in stored order.
///
/// Each segment is a straight line with round caps: the line itself plus a
/// filled disc of the stroke's radius at both ends. Later segments paint over
/// earlier ones, so the order of `segments` is the z-order.
pub fn replay(segments: &[Segment]) -> Vec<Shape> {
    let mut shapes = Vec::with_capacity(segments.len() * 3);
    for segment in segments {
        let color: Color32 = segment.color.into();
        let radius = segment.stroke_width / 2.0;
        shapes.push(Shape::line_segment(
            [segment.start, segment.end],
            Stroke::new(segment.stroke_width, color),
        ));
        shapes.push(Shape::circle_filled(segment.start, radius, color));
        shapes.push(Shape::circle_filled(segment.end, radius, color));
    }
    shapes
}

/// Paint the segments onto an egui canvas.
pub fn paint(painter: &Painter, segments: &[Segment]) {
    painter.extend(replay(segments));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Argb;
    use egui::pos2;

    #[test]
    fn test_replay_keeps_segment_order() {
        let segments = vec![
            Segment::new(pos2(0.0, 0.0), pos2(5.0, 5.0), Argb::BLACK, 10.0),
            Segment::new(pos2(5.0, 5.0), pos2(9.0, 2.0), Argb(0xFFFF_5185), 20.0),
        ];

        let shapes = replay(&segments);
        assert_eq!(shapes.len(), 6);

        match &shapes[3] {
            Shape::LineSegment { points, stroke } => {
                assert_eq!(*points, [pos2(5.0, 5.0), pos2(9.0, 2.0)]);
                assert_eq!(stroke.width, 20.0);
            }
            other => panic!("expected a line segment, got {other:?}"),
        }
        match &shapes[5] {
            Shape::Circle(circle) => {
                assert_eq!(circle.center, pos2(9.0, 2.0));
                assert_eq!(circle.radius, 10.0);
                assert_eq!(circle.fill, Color32::from_rgb(0xFF, 0x51, 0x85));
            }
            other => panic!("expected a cap, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_drawing_has_no_shapes() {
        assert!(replay(&[]).is_empty());
    }

    #[test]
    fn test_paint_onto_painter() {
        let ctx = egui::Context::default();
        let rect = egui::Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(100.0, 100.0));
        let painter = Painter::new(ctx, egui::LayerId::background(), rect);
        paint(
            &painter,
            &[Segment::new(pos2(1.0, 1.0), pos2(2.0, 2.0), Argb::BLACK, 5.0)],
        );
    }
}
