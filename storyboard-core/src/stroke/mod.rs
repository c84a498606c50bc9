//! # Strokes
//!
//! The stroke engine turns a gesture's pointer samples into paint on a layer buffer as they arrive.
//!
//! Pen and eraser gestures are resampled so that no two consecutive recorded samples are further
//! apart than [`RESAMPLE_SPACING`], and every recorded sample paints one smoothed step: a quadratic
//! curve between the midpoints of the last three samples, using the middle sample as the control
//! point. Consecutive steps share their endpoints, so the result is one continuous curve. Only the
//! final steps of a gesture ever touch pixels that earlier steps did not.
//!
//! Line gestures never touch the layer until they end. In the meantime, a preview of the line is
//! kept on a scratch surface for the compositor to overlay.

use crate::{
    blend::CompositeOp,
    buffer::PixelBuffer,
    color::Color,
    raster::{self, Pen},
    util::Rect,
};

/// Maximum gap between recorded samples of a pen or eraser gesture, in canvas pixels.
pub const RESAMPLE_SPACING: f32 = 5.0;
/// Pressure assumed for devices that do not report any.
pub const DEFAULT_PRESSURE: f32 = 0.5;
/// Smallest brush size, in canvas pixels.
pub const MIN_BRUSH_SIZE: f32 = 1.0;
/// Largest brush size, in canvas pixels.
pub const MAX_BRUSH_SIZE: f32 = 50.0;
/// Default brush size, in canvas pixels.
pub const DEFAULT_BRUSH_SIZE: f32 = 3.0;
// Longer jumps than this only come from garbage input, as no canvas is that large.
const MAX_RESAMPLE_STEPS: usize = 4096;

/// A single pointer sample in canvas coordinates.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    /// In `[0, 1]`.
    pub pressure: f32,
}
impl Sample {
    /// Create a sample. Pressure is clamped to `[0, 1]`, NaN pressure becomes [`DEFAULT_PRESSURE`].
    #[must_use]
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        let pressure = if pressure.is_nan() {
            DEFAULT_PRESSURE
        } else {
            pressure.clamp(0.0, 1.0)
        };
        Self { x, y, pressure }
    }
    #[must_use]
    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
    /// Linear interpolation of position and pressure. `t = 0` is `self`, `t = 1` is `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            pressure: self.pressure + (other.pressure - self.pressure) * t,
        }
    }
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> [f32; 2] {
        [(self.x + other.x) / 2.0, (self.y + other.y) / 2.0]
    }
}

#[derive(
    strum::AsRefStr, strum::EnumIter, Copy, Clone, PartialEq, Eq, Hash, Debug, Default,
)]
pub enum Tool {
    /// Freehand, pressure-sensitive black ink.
    #[default]
    Pen,
    /// Freehand, pressure-sensitive removal of paint.
    Eraser,
    /// Straight, fixed-width black segment from press to release.
    Line,
}
impl Tool {
    /// Does this tool paint continuously while the pointer moves?
    #[must_use]
    pub fn is_freehand(self) -> bool {
        matches!(self, Self::Pen | Self::Eraser)
    }
    #[must_use]
    pub fn composite_op(self) -> CompositeOp {
        match self {
            Self::Eraser => CompositeOp::DestinationOut,
            Self::Pen | Self::Line => CompositeOp::SourceOver,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum GestureState {
    Idle,
    Active,
}

/// Stroke width for a sample: between 50% (no pressure) and 100% (full pressure) of the brush size.
#[must_use]
pub fn pressure_width(brush_size: f32, pressure: f32) -> f32 {
    brush_size * (0.5 + pressure * 0.5)
}

pub struct StrokeEngine {
    tool: Tool,
    brush_size: f32,
    state: GestureState,
    /// Recorded (and resampled) samples of the current freehand gesture.
    samples: Vec<Sample>,
    /// Press location of the current line gesture.
    anchor: Option<Sample>,
    /// Most recent pointer location seen during the gesture.
    last_seen: Option<Sample>,
    /// Scratch surface holding the line preview.
    preview: PixelBuffer,
    /// Part of `preview` that may hold paint.
    preview_dirty: Option<Rect>,
}
impl StrokeEngine {
    /// An idle engine with the pen tool and default brush, previewing onto a `width` x `height` surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tool: Tool::default(),
            brush_size: DEFAULT_BRUSH_SIZE,
            state: GestureState::Idle,
            samples: Vec::new(),
            anchor: None,
            last_seen: None,
            preview: PixelBuffer::new(width, height),
            preview_dirty: None,
        }
    }
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }
    /// Change tool. Refused (returning `false`) while a gesture is active, end it first.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if self.is_active() {
            return false;
        }
        self.tool = tool;
        true
    }
    #[must_use]
    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }
    /// Set the nominal brush size, clamped to [`MIN_BRUSH_SIZE`]..=[`MAX_BRUSH_SIZE`].
    /// Takes effect on the next paint step.
    pub fn set_brush_size(&mut self, size: f32) {
        self.brush_size = if size.is_nan() {
            DEFAULT_BRUSH_SIZE
        } else {
            size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
        };
    }
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == GestureState::Active
    }
    /// Samples recorded so far during the current freehand gesture, resampled ones included.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
    /// Where the last event of the current gesture was, if a gesture is active.
    #[must_use]
    pub fn last_seen(&self) -> Option<Sample> {
        self.last_seen
    }
    /// The line preview, only while a line gesture is active.
    #[must_use]
    pub fn preview(&self) -> Option<&PixelBuffer> {
        (self.is_active() && self.anchor.is_some()).then_some(&self.preview)
    }
    /// Reallocate the preview surface for a new canvas size. Must not be called mid-gesture.
    pub fn resize_scratch(&mut self, width: u32, height: u32) {
        debug_assert!(!self.is_active(), "scratch resized mid-gesture");
        self.preview = PixelBuffer::new(width, height);
        self.preview_dirty = None;
    }
    /// Start a gesture at `sample`. Ignored if one is already active.
    pub fn begin(&mut self, sample: Sample) {
        if self.is_active() {
            log::trace!("ignoring press during an active gesture");
            return;
        }
        log::trace!("{} gesture begin at ({}, {})", self.tool.as_ref(), sample.x, sample.y);
        self.state = GestureState::Active;
        self.samples.clear();
        self.anchor = None;
        self.last_seen = Some(sample);
        if self.tool.is_freehand() {
            self.samples.push(sample);
        } else {
            self.anchor = Some(sample);
            self.clear_preview();
        }
    }
    /// Continue the active gesture to `sample`, painting freehand tools into `target`.
    ///
    /// Returns the number of paint steps made. Ignored (returning 0) when idle.
    pub fn extend(&mut self, sample: Sample, target: &mut PixelBuffer) -> usize {
        if !self.is_active() {
            return 0;
        }
        self.last_seen = Some(sample);
        if self.tool.is_freehand() {
            self.record(sample, target)
        } else {
            self.draw_preview(sample);
            0
        }
    }
    /// Finish the active gesture at `sample`, or at the last known position if `None`.
    ///
    /// Line gestures commit their segment into `target` here. Returns `true` if a gesture
    /// was actually ended, meaning the caller should commit the layer.
    pub fn end(&mut self, sample: Option<Sample>, target: &mut PixelBuffer) -> bool {
        if !self.is_active() {
            return false;
        }
        let release = sample.or(self.last_seen);
        if let (Some(anchor), Some(release)) = (self.anchor, release) {
            raster::stroke_line(target, anchor.position(), release.position(), self.line_pen());
            self.clear_preview();
        }
        log::trace!(
            "{} gesture end after {} samples",
            self.tool.as_ref(),
            self.samples.len()
        );
        self.state = GestureState::Idle;
        self.samples.clear();
        self.anchor = None;
        self.last_seen = None;
        true
    }

    /// Append a freehand sample, subdividing long jumps. Returns the number of paint steps.
    fn record(&mut self, sample: Sample, target: &mut PixelBuffer) -> usize {
        let Some(last) = self.samples.last().copied() else {
            self.samples.push(sample);
            return 0;
        };
        let distance = last.distance(&sample);
        if distance > RESAMPLE_SPACING {
            let steps: usize = az::saturating_cast((distance / RESAMPLE_SPACING).ceil());
            let steps = steps.min(MAX_RESAMPLE_STEPS);
            for step in 1..=steps {
                #[allow(clippy::cast_precision_loss)]
                let t = step as f32 / steps as f32;
                self.samples.push(last.lerp(&sample, t));
                self.paint_step(target);
            }
            steps
        } else {
            self.samples.push(sample);
            self.paint_step(target);
            1
        }
    }
    /// Paint the smoothed piece of the stroke ending at the most recent sample.
    fn paint_step(&self, target: &mut PixelBuffer) {
        let [.., p1, p2] = self.samples.as_slice() else {
            return;
        };
        let width = (pressure_width(self.brush_size, p1.pressure)
            + pressure_width(self.brush_size, p2.pressure))
            / 2.0;
        let pen = Pen {
            color: Color::BLACK,
            width,
            op: self.tool.composite_op(),
        };
        if let [.., p0, _, _] = self.samples.as_slice() {
            raster::stroke_quadratic(target, p0.midpoint(p1), p1.position(), p1.midpoint(p2), pen);
        } else {
            raster::stroke_line(target, p1.position(), p2.position(), pen);
        }
    }
    fn line_pen(&self) -> Pen {
        Pen {
            color: Color::BLACK,
            width: self.brush_size,
            op: CompositeOp::SourceOver,
        }
    }
    fn draw_preview(&mut self, to: Sample) {
        let Some(anchor) = self.anchor else {
            return;
        };
        self.clear_preview();
        let pen = self.line_pen();
        self.preview_dirty = raster::stroke_line(&mut self.preview, anchor.position(), to.position(), pen);
    }
    fn clear_preview(&mut self) {
        if let Some(dirty) = self.preview_dirty.take() {
            self.preview.clear_rect(dirty);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{pressure_width, GestureState, Sample, StrokeEngine, Tool};
    use crate::{buffer::PixelBuffer, color::Color};

    fn alpha(buffer: &PixelBuffer, x: u32, y: u32) -> u8 {
        buffer.get(x, y).unwrap().a
    }
    #[test]
    fn width_from_pressure() {
        assert!((pressure_width(10.0, 0.0) - 5.0).abs() < 1e-6);
        assert!((pressure_width(10.0, 0.5) - 7.5).abs() < 1e-6);
        assert!((pressure_width(10.0, 1.0) - 10.0).abs() < 1e-6);
    }
    #[test]
    fn sample_sanitizes_pressure() {
        assert_eq!(Sample::new(0.0, 0.0, 2.0).pressure, 1.0);
        assert_eq!(Sample::new(0.0, 0.0, -1.0).pressure, 0.0);
        assert_eq!(Sample::new(0.0, 0.0, f32::NAN).pressure, 0.5);
    }
    #[test]
    fn smooth_continuous_stroke() {
        let mut engine = StrokeEngine::new(40, 20);
        engine.set_brush_size(10.0);
        let mut target = PixelBuffer::new(40, 20);

        engine.begin(Sample::new(0.0, 0.0, 1.0));
        engine.extend(Sample::new(10.0, 0.0, 1.0), &mut target);
        engine.extend(Sample::new(20.0, 0.0, 1.0), &mut target);
        assert!(engine.end(None, &mut target));

        // Solid along the whole span including the midpoint. The smoothed curve stops at the
        // midpoint of the last two samples, with the round cap reaching past x = 20.
        for x in 0..=20 {
            for y in 0..=1 {
                assert_eq!(alpha(&target, x, y), 255, "gap at ({x}, {y})");
            }
            if x <= 17 {
                assert_eq!(alpha(&target, x, 3), 255, "narrow at {x}");
            }
            // Pixel centers 5.5 and beyond from the centerline are outside.
            assert_eq!(alpha(&target, x, 6), 0, "too wide at {x}");
        }
        // Round cap past the final sample, but nowhere near further.
        assert_eq!(alpha(&target, 21, 0), 255);
        assert_eq!(alpha(&target, 27, 0), 0);
    }
    #[test]
    fn resamples_long_jumps() {
        let mut engine = StrokeEngine::new(64, 8);
        engine.set_brush_size(3.0);
        let mut target = PixelBuffer::new(64, 8);
        engine.begin(Sample::new(5.0, 4.0, 0.5));
        let steps = engine.extend(Sample::new(55.0, 4.0, 0.5), &mut target);
        assert!(steps >= 10, "{steps}");
        assert_eq!(engine.samples().len(), 11);
        for pair in engine.samples().windows(2) {
            assert!(pair[0].distance(&pair[1]) <= 5.0 + 1e-4);
        }
        // Interpolation is even and ends exactly on the new sample.
        assert_eq!(engine.samples()[1].x, 10.0);
        assert_eq!(engine.samples().last().unwrap().x, 55.0);
        // Nothing missing along the way. The smoothed path stops at the last midpoint, 52.5.
        for x in 5..53 {
            assert!(alpha(&target, x, 4) > 0, "gap at {x}");
        }
    }
    #[test]
    fn pressure_interpolates() {
        let mut engine = StrokeEngine::new(64, 8);
        let mut target = PixelBuffer::new(64, 8);
        engine.begin(Sample::new(0.0, 4.0, 0.0));
        engine.extend(Sample::new(20.0, 4.0, 1.0), &mut target);
        let pressures: Vec<f32> = engine.samples().iter().map(|s| s.pressure).collect();
        assert_eq!(pressures, [0.0, 0.25, 0.5, 0.75, 1.0]);
    }
    #[test]
    fn short_moves_paint_once() {
        let mut engine = StrokeEngine::new(16, 16);
        let mut target = PixelBuffer::new(16, 16);
        engine.begin(Sample::new(4.0, 4.0, 0.5));
        assert_eq!(engine.extend(Sample::new(7.0, 8.0, 0.5), &mut target), 1);
        assert_eq!(engine.samples().len(), 2);
        assert!(!target.is_clear());
    }
    #[test]
    fn eraser_removes_paint() {
        let mut engine = StrokeEngine::new(32, 16);
        assert!(engine.set_tool(Tool::Eraser));
        engine.set_brush_size(6.0);
        let mut target = PixelBuffer::filled(32, 16, Color::BLACK);
        engine.begin(Sample::new(2.0, 8.0, 1.0));
        engine.extend(Sample::new(6.0, 8.0, 1.0), &mut target);
        engine.extend(Sample::new(10.0, 8.0, 1.0), &mut target);
        engine.end(None, &mut target);
        assert_eq!(target.get(5, 8), Some(Color::TRANSPARENT));
        assert_eq!(target.get(5, 1), Some(Color::BLACK));
        assert_eq!(target.get(30, 8), Some(Color::BLACK));
    }
    #[test]
    fn line_previews_then_commits() {
        let mut engine = StrokeEngine::new(16, 16);
        engine.set_tool(Tool::Line);
        let mut target = PixelBuffer::new(16, 16);

        engine.begin(Sample::new(0.0, 0.0, 0.5));
        assert_eq!(engine.extend(Sample::new(5.0, 5.0, 0.5), &mut target), 0);
        assert!(target.is_clear(), "line touched the layer before release");
        let preview = engine.preview().expect("line gesture has a preview");
        assert!(preview.get(3, 3).unwrap().a > 0);
        assert_eq!(preview.get(12, 12).unwrap().a, 0);

        assert!(engine.end(Some(Sample::new(10.0, 10.0, 0.5)), &mut target));
        assert!(engine.preview().is_none());
        assert!(target.get(9, 9).unwrap().a > 0);
        assert!(target.get(2, 2).unwrap().a > 0);
        assert_eq!(target.get(14, 1).unwrap().a, 0);
        // Preview cleared for the next gesture.
        engine.begin(Sample::new(0.0, 15.0, 0.5));
        assert!(engine.preview().unwrap().is_clear());
    }
    #[test]
    fn no_tool_switch_mid_gesture() {
        let mut engine = StrokeEngine::new(8, 8);
        let mut target = PixelBuffer::new(8, 8);
        engine.begin(Sample::new(1.0, 1.0, 0.5));
        assert_eq!(engine.state(), GestureState::Active);
        assert!(!engine.set_tool(Tool::Line));
        assert_eq!(engine.tool(), Tool::Pen);
        engine.end(None, &mut target);
        assert!(engine.set_tool(Tool::Line));
    }
    #[test]
    fn idle_events_ignored() {
        let mut engine = StrokeEngine::new(8, 8);
        let mut target = PixelBuffer::new(8, 8);
        assert_eq!(engine.extend(Sample::new(1.0, 1.0, 0.5), &mut target), 0);
        assert!(!engine.end(None, &mut target));
        assert!(target.is_clear());
    }
    #[test]
    fn brush_size_clamped() {
        let mut engine = StrokeEngine::new(8, 8);
        engine.set_brush_size(0.0);
        assert_eq!(engine.brush_size(), 1.0);
        engine.set_brush_size(500.0);
        assert_eq!(engine.brush_size(), 50.0);
    }
}
