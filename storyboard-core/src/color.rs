/// A straight (non-premultiplied) sRGB color with 8 bits per channel, laid out as `[r, g, b, a]`.
///
/// This matches the pixel layout of a 2D canvas and of RGBA8 PNGs, so buffers of these can be
/// handed to encoders byte-for-byte.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}
impl Color {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
    #[must_use]
    pub const fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
    #[must_use]
    pub const fn as_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == u8::MAX
    }
    /// Color channels as `[0, 1]` floats, alpha last.
    #[must_use]
    pub fn to_unit(self) -> [f32; 4] {
        self.as_array().map(|c| f32::from(c) / 255.0)
    }
    /// Quantize `[0, 1]` floats back into a color. Out-of-range and NaN values saturate.
    /// Fully transparent results are normalized to [`Color::TRANSPARENT`].
    #[must_use]
    pub fn from_unit(unit: [f32; 4]) -> Self {
        let [r, g, b, a] = unit.map(quantize);
        if a == 0 {
            Self::TRANSPARENT
        } else {
            Self::new(r, g, b, a)
        }
    }
}
/// `az` panics on NaN, so that is mapped to zero first.
fn quantize(unit: f32) -> u8 {
    if unit.is_nan() {
        0
    } else {
        az::saturating_cast((unit * 255.0).round())
    }
}
impl From<[u8; 4]> for Color {
    fn from(value: [u8; 4]) -> Self {
        Self::from_array(value)
    }
}
impl From<Color> for [u8; 4] {
    fn from(value: Color) -> Self {
        value.as_array()
    }
}

#[cfg(test)]
mod test {
    use super::Color;
    #[test]
    fn unit_roundtrip_is_exact() {
        for value in [0u8, 1, 127, 128, 254, 255] {
            let color = Color::new(value, 255 - value, value / 2, 200);
            assert_eq!(Color::from_unit(color.to_unit()), color);
        }
    }
    #[test]
    fn transparent_normalized() {
        assert_eq!(Color::from_unit([1.0, 0.5, 0.2, 0.0]), Color::TRANSPARENT);
        // Saturates rather than wrapping.
        assert_eq!(Color::from_unit([2.0, -1.0, f32::NAN, 1.0]), Color::new(255, 0, 0, 255));
    }
}
