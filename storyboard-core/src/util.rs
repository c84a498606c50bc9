//! Utility types, used throughout the crate.

/// An axis-aligned pixel rectangle. The origin may lie outside of any buffer it is used with,
/// use [`Rect::clip`] to get the part that is actually addressable.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}
impl Rect {
    #[must_use]
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
    /// The rect covering a whole `width` x `height` buffer.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
    /// Smallest pixel rect containing the floating point box `[min, max]`.
    /// Non-finite input yields an empty rect.
    #[must_use]
    pub fn enclosing(min: [f32; 2], max: [f32; 2]) -> Self {
        let finite = min.iter().chain(max.iter()).all(|v| v.is_finite());
        if !finite || min[0] > max[0] || min[1] > max[1] {
            return Self::new(0, 0, 0, 0);
        }
        let x0: i64 = az::saturating_cast(min[0].floor());
        let y0: i64 = az::saturating_cast(min[1].floor());
        let x1: i64 = az::saturating_cast(max[0].ceil());
        let y1: i64 = az::saturating_cast(max[1].ceil());
        Self::new(
            x0,
            y0,
            az::saturating_cast(x1 - x0),
            az::saturating_cast(y1 - y0),
        )
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
    /// Intersect with a `width` x `height` buffer, returning the half-open pixel ranges
    /// `(x0..x1, y0..y1)`, or `None` if nothing remains.
    #[must_use]
    pub fn clip(
        &self,
        width: u32,
        height: u32,
    ) -> Option<(std::ops::Range<u32>, std::ops::Range<u32>)> {
        let clamp_axis = |start: i64, len: u32, limit: u32| -> std::ops::Range<u32> {
            let end = start.saturating_add(i64::from(len));
            let lo = start.clamp(0, i64::from(limit));
            let hi = end.clamp(0, i64::from(limit));
            // Both clamped into [0, limit], so they fit.
            az::cast(lo)..az::cast(hi)
        };
        let xs = clamp_axis(self.x, self.width, width);
        let ys = clamp_axis(self.y, self.height, height);
        if xs.is_empty() || ys.is_empty() {
            None
        } else {
            Some((xs, ys))
        }
    }
}
