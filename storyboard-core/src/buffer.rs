//! # Pixel buffers
//!
//! Fixed-size RGBA8 rasters with straight alpha, the storage behind every layer, the presentation
//! surface, and export sheets. Snapshots are immutable deep copies used by layer history.

use crate::{blend::CompositeOp, color::Color, util::Rect};

#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    /// Row-major, `width * height` long.
    pixels: Vec<Color>,
}
impl PixelBuffer {
    /// Create a fully transparent buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; pixel_count(width, height)],
        }
    }
    /// Wrap existing row-major pixel data. Returns `None` if the length does not match the dimensions.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        (pixels.len() == pixel_count(width, height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
    /// Raw `[r, g, b, a]` bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }
    /// Overwrite one pixel. Out-of-bounds writes are ignored.
    pub fn put(&mut self, x: u32, y: u32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }
    /// Blend `color` onto the pixel at `(x, y)` with the given coverage.
    pub fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32, op: CompositeOp) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = op.apply(color, coverage, self.pixels[idx]);
        }
    }
    /// Is every pixel fully transparent?
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.pixels.iter().all(|p| p.is_transparent())
    }
    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
    }
    /// Reset the pixels inside `region` to transparent.
    pub fn clear_rect(&mut self, region: Rect) {
        self.for_rows_in(region, |row| row.fill(Color::TRANSPARENT));
    }
    /// Paint `region` with `color` using source-over.
    pub fn fill_rect(&mut self, region: Rect, color: Color) {
        if color.is_opaque() {
            self.for_rows_in(region, |row| row.fill(color));
        } else {
            self.for_rows_in(region, |row| {
                for px in row {
                    *px = CompositeOp::SourceOver.apply(color, 1.0, *px);
                }
            });
        }
    }
    /// Replace the pixels under `source` placed with its top-left corner at `offset`.
    /// Parts of `source` falling outside of `self` are discarded, pixels of `self` not under `source`
    /// are left untouched.
    pub fn copy_from(&mut self, source: &PixelBuffer, offset: [i64; 2]) {
        self.zip_rows(source, offset, |dst, src| dst.copy_from_slice(src));
    }
    /// Composite all of `source` onto `self` at `offset`, like drawing one image onto another.
    pub fn draw(&mut self, source: &PixelBuffer, offset: [i64; 2], op: CompositeOp) {
        self.zip_rows(source, offset, |dst, src| {
            for (d, s) in dst.iter_mut().zip(src) {
                if !s.is_transparent() {
                    *d = op.apply(*s, 1.0, *d);
                }
            }
        });
    }
    /// Take an immutable deep copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone().into_boxed_slice(),
        }
    }
    /// Overwrite the contents in place with a snapshot.
    ///
    /// # Panics
    /// If the snapshot was taken from a buffer of different dimensions. Every buffer reachable from a
    /// document shares its dimensions, so this indicates a broken invariant.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        assert_eq!(
            self.size(),
            [snapshot.width, snapshot.height],
            "snapshot dimensions do not match buffer"
        );
        self.pixels.copy_from_slice(&snapshot.pixels);
    }
    /// Make a new buffer of the given size holding this one's contents anchored at the top-left.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut new = Self::new(width, height);
        new.copy_from(self, [0, 0]);
        new
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
    fn for_rows_in(&mut self, region: Rect, mut f: impl FnMut(&mut [Color])) {
        let Some((xs, ys)) = region.clip(self.width, self.height) else {
            return;
        };
        let stride = self.width as usize;
        for y in ys {
            let start = y as usize * stride;
            f(&mut self.pixels[start + xs.start as usize..start + xs.end as usize]);
        }
    }
    /// Visit the overlapping rows of `self` and `source` placed at `offset`, as equal-length slices.
    fn zip_rows(
        &mut self,
        source: &PixelBuffer,
        offset: [i64; 2],
        mut f: impl FnMut(&mut [Color], &[Color]),
    ) {
        let region = Rect::new(offset[0], offset[1], source.width, source.height);
        let Some((xs, ys)) = region.clip(self.width, self.height) else {
            return;
        };
        let dst_stride = self.width as usize;
        let src_stride = source.width as usize;
        // Non-negative, the clip range starts at or after the offset.
        let src_x = usize::try_from(i64::from(xs.start) - offset[0]).unwrap_or_default();
        let len = xs.len();
        for y in ys {
            let src_y = usize::try_from(i64::from(y) - offset[1]).unwrap_or_default();
            let dst_start = y as usize * dst_stride + xs.start as usize;
            let src_start = src_y * src_stride + src_x;
            f(
                &mut self.pixels[dst_start..dst_start + len],
                &source.pixels[src_start..src_start + len],
            );
        }
    }
}
impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Dumping megabytes of pixels is never useful.
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// An immutable point-in-time copy of a [`PixelBuffer`].
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Box<[Color]>,
}
impl Snapshot {
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
    /// Does `buffer` currently hold exactly these pixels?
    #[must_use]
    pub fn matches(&self, buffer: &PixelBuffer) -> bool {
        self.size() == buffer.size() && *self.pixels == *buffer.pixels
    }
}
impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

#[cfg(test)]
mod test {
    use super::PixelBuffer;
    use crate::{blend::CompositeOp, color::Color, util::Rect};

    const RED: Color = Color::new(255, 0, 0, 255);

    #[test]
    fn new_is_transparent() {
        let buffer = PixelBuffer::new(7, 3);
        assert_eq!(buffer.size(), [7, 3]);
        assert_eq!(buffer.pixels().len(), 21);
        assert!(buffer.is_clear());
        assert_eq!(buffer.as_bytes().len(), 84);
    }
    #[test]
    fn snapshot_is_deep() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.put(1, 1, RED);
        let snap = buffer.snapshot();
        buffer.clear();
        assert!(buffer.is_clear());
        assert!(!snap.matches(&buffer));

        buffer.restore(&snap);
        assert_eq!(buffer.get(1, 1), Some(RED));
        assert!(snap.matches(&buffer));
    }
    #[test]
    #[should_panic(expected = "snapshot dimensions")]
    fn restore_mismatched() {
        let snap = PixelBuffer::new(2, 2).snapshot();
        PixelBuffer::new(3, 2).restore(&snap);
    }
    #[test]
    fn clear_region_only() {
        let mut buffer = PixelBuffer::filled(4, 4, RED);
        buffer.clear_rect(Rect::new(-1, 2, 2, 10));
        assert_eq!(buffer.get(0, 2), Some(Color::TRANSPARENT));
        assert_eq!(buffer.get(0, 3), Some(Color::TRANSPARENT));
        assert_eq!(buffer.get(1, 3), Some(RED));
        assert_eq!(buffer.get(0, 1), Some(RED));
    }
    #[test]
    fn resize_keeps_top_left() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.put(0, 0, RED);
        buffer.put(3, 3, Color::BLACK);

        let shrunk = buffer.resized(2, 2);
        assert_eq!(shrunk.get(0, 0), Some(RED));
        assert_eq!(shrunk.pixels().iter().filter(|p| !p.is_transparent()).count(), 1);

        let grown = buffer.resized(6, 5);
        assert_eq!(grown.get(0, 0), Some(RED));
        assert_eq!(grown.get(3, 3), Some(Color::BLACK));
        assert_eq!(grown.get(5, 4), Some(Color::TRANSPARENT));
    }
    #[test]
    fn copy_with_negative_offset() {
        let mut src = PixelBuffer::new(3, 3);
        src.put(2, 2, RED);
        let mut dst = PixelBuffer::new(3, 3);
        dst.copy_from(&src, [-2, -2]);
        assert_eq!(dst.get(0, 0), Some(RED));
        assert_eq!(dst.pixels().iter().filter(|p| !p.is_transparent()).count(), 1);
    }
    #[test]
    fn draw_blends_and_skips_transparent() {
        let mut dst = PixelBuffer::filled(2, 1, Color::WHITE);
        let mut src = PixelBuffer::new(2, 1);
        src.put(1, 0, RED);
        dst.draw(&src, [0, 0], CompositeOp::SourceOver);
        assert_eq!(dst.get(0, 0), Some(Color::WHITE));
        assert_eq!(dst.get(1, 0), Some(RED));
    }
}
