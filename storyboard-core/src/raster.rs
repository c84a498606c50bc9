//! # Rasterization
//!
//! Anti-aliased, round-capped, round-joined strokes onto a [`PixelBuffer`], equivalent to stroking a
//! path on a 2D canvas. Curves are flattened with `lyon`, then each pixel near the resulting polyline
//! gets a coverage from its distance to the nearest segment. The whole path is blended once, so
//! overlapping pieces of the same path do not darken each other.

use lyon_tessellation::{geom::QuadraticBezierSegment, math::point};
use smallvec::SmallVec;

use crate::{blend::CompositeOp, buffer::PixelBuffer, color::Color, util::Rect};

/// Maximum distance between a flattened curve and the true curve, in pixels.
const FLATTEN_TOLERANCE: f32 = 0.1;

/// Solid paint settings for one stroke.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f32,
    pub op: CompositeOp,
}

/// Stroke a straight segment. Returns the region touched, if any.
pub fn stroke_line(
    target: &mut PixelBuffer,
    from: [f32; 2],
    to: [f32; 2],
    pen: Pen,
) -> Option<Rect> {
    stroke_polyline(target, &[from, to], pen)
}

/// Stroke a quadratic Bézier curve. Returns the region touched, if any.
pub fn stroke_quadratic(
    target: &mut PixelBuffer,
    from: [f32; 2],
    ctrl: [f32; 2],
    to: [f32; 2],
    pen: Pen,
) -> Option<Rect> {
    let curve = QuadraticBezierSegment {
        from: point(from[0], from[1]),
        ctrl: point(ctrl[0], ctrl[1]),
        to: point(to[0], to[1]),
    };
    let mut points = SmallVec::<[[f32; 2]; 16]>::new();
    points.push(from);
    points.extend(curve.flattened(FLATTEN_TOLERANCE).map(|p| [p.x, p.y]));
    // Flattening always ends on `to`, but be certain the endpoint is exact.
    if points.last() != Some(&to) {
        points.push(to);
    }
    stroke_polyline(target, &points, pen)
}

/// Stroke connected segments through `points`. A single point (or repeated points) makes a round dot.
/// Returns the region touched, if any.
pub fn stroke_polyline(target: &mut PixelBuffer, points: &[[f32; 2]], pen: Pen) -> Option<Rect> {
    let half = pen.width / 2.0;
    if !(half > 0.0) || points.is_empty() || pen.color.is_transparent() {
        return None;
    }
    if points.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    let (min, max) = points.iter().fold(
        ([f32::INFINITY; 2], [f32::NEG_INFINITY; 2]),
        |(min, max), p| {
            (
                [min[0].min(p[0]), min[1].min(p[1])],
                [max[0].max(p[0]), max[1].max(p[1])],
            )
        },
    );
    // Half a pixel more for the anti-aliased fringe.
    let reach = half + 0.5;
    let bounds = Rect::enclosing(
        [min[0] - reach, min[1] - reach],
        [max[0] + reach, max[1] + reach],
    );
    let (xs, ys) = bounds.clip(target.width(), target.height())?;

    let segments: SmallVec<[([f32; 2], [f32; 2]); 16]> = if points.len() == 1 {
        std::iter::once((points[0], points[0])).collect()
    } else {
        points.windows(2).map(|w| (w[0], w[1])).collect()
    };

    for y in ys.clone() {
        #[allow(clippy::cast_precision_loss)]
        let cy = y as f32 + 0.5;
        for x in xs.clone() {
            #[allow(clippy::cast_precision_loss)]
            let center = [x as f32 + 0.5, cy];
            let distance = segments
                .iter()
                .map(|&(a, b)| distance_to_segment(center, a, b))
                .fold(f32::INFINITY, f32::min);
            let coverage = (reach - distance).clamp(0.0, 1.0);
            if coverage > 0.0 {
                target.blend(x, y, pen.color, coverage, pen.op);
            }
        }
    }
    Some(Rect::new(
        i64::from(xs.start),
        i64::from(ys.start),
        xs.end - xs.start,
        ys.end - ys.start,
    ))
}

fn distance_to_segment(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len_sq > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let nearest = [a[0] + ab[0] * t, a[1] + ab[1] * t];
    (p[0] - nearest[0]).hypot(p[1] - nearest[1])
}

#[cfg(test)]
mod test {
    use super::{stroke_line, stroke_polyline, stroke_quadratic, Pen};
    use crate::{blend::CompositeOp, buffer::PixelBuffer, color::Color};

    const PEN: Pen = Pen {
        color: Color::BLACK,
        width: 4.0,
        op: CompositeOp::SourceOver,
    };
    fn alpha(buffer: &PixelBuffer, x: u32, y: u32) -> u8 {
        buffer.get(x, y).unwrap().a
    }
    #[test]
    fn horizontal_line() {
        let mut buffer = PixelBuffer::new(32, 16);
        let touched = stroke_line(&mut buffer, [4.0, 8.0], [24.0, 8.0], PEN).unwrap();
        // Centerline and within the half width are solid.
        for x in 4..24 {
            assert_eq!(alpha(&buffer, x, 7), 255);
            assert_eq!(alpha(&buffer, x, 8), 255);
        }
        // Well outside is untouched.
        assert_eq!(alpha(&buffer, 12, 2), 0);
        assert_eq!(alpha(&buffer, 12, 13), 0);
        // Round caps extend past the endpoints.
        assert_eq!(alpha(&buffer, 24, 8), 255);
        assert_eq!(alpha(&buffer, 28, 8), 0);
        assert!(touched.width > 20 && touched.height >= 4);
    }
    #[test]
    fn antialiased_edge() {
        let mut buffer = PixelBuffer::new(16, 16);
        stroke_line(&mut buffer, [0.0, 8.0], [16.0, 8.0], Pen { width: 3.0, ..PEN });
        // Pixel centers 1.5 from the centerline, exactly on the edge: half covered.
        let edge = alpha(&buffer, 8, 9);
        assert!((100..=155).contains(&edge), "{edge}");
    }
    #[test]
    fn single_point_dot() {
        let mut buffer = PixelBuffer::new(16, 16);
        stroke_polyline(&mut buffer, &[[8.0, 8.0]], PEN).unwrap();
        assert_eq!(alpha(&buffer, 8, 8), 255);
        assert_eq!(alpha(&buffer, 7, 7), 255);
        assert_eq!(alpha(&buffer, 8, 12), 0);
    }
    #[test]
    fn offscreen_and_degenerate() {
        let mut buffer = PixelBuffer::new(8, 8);
        assert!(stroke_line(&mut buffer, [100.0, 100.0], [120.0, 100.0], PEN).is_none());
        let hairless = Pen { width: 0.0, ..PEN };
        assert!(stroke_line(&mut buffer, [1.0, 1.0], [5.0, 5.0], hairless).is_none());
        assert!(stroke_line(&mut buffer, [f32::NAN, 1.0], [5.0, 5.0], PEN).is_none());
        assert!(buffer.is_clear());
    }
    #[test]
    fn quadratic_passes_near_control() {
        let mut buffer = PixelBuffer::new(32, 32);
        stroke_quadratic(&mut buffer, [2.0, 28.0], [16.0, 0.0], [30.0, 28.0], PEN);
        // Apex of the curve is at y = 14 on x = 16.
        assert_eq!(alpha(&buffer, 16, 14), 255);
        assert_eq!(alpha(&buffer, 16, 4), 0);
        assert_eq!(alpha(&buffer, 2, 27), 255);
        assert_eq!(alpha(&buffer, 29, 27), 255);
    }
    #[test]
    fn erase_removes() {
        let mut buffer = PixelBuffer::filled(16, 16, Color::BLACK);
        stroke_line(
            &mut buffer,
            [0.0, 8.0],
            [16.0, 8.0],
            Pen {
                op: CompositeOp::DestinationOut,
                ..PEN
            },
        );
        assert_eq!(buffer.get(5, 8), Some(Color::TRANSPARENT));
        assert_eq!(buffer.get(5, 0), Some(Color::BLACK));
    }
}
