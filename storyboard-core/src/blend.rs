use crate::color::Color;

/// How painted pixels combine with what is already in a buffer.
///
/// Mirrors the two 2D canvas composite operations the tools need.
#[derive(strum::AsRefStr, PartialEq, Eq, strum::EnumIter, Copy, Clone, Hash, Debug, Default)]
#[repr(u8)]
pub enum CompositeOp {
    /// Paint over the destination.
    #[default]
    SourceOver,
    /// Remove destination alpha where the source is opaque, ignoring source color.
    DestinationOut,
}
impl CompositeOp {
    /// Blend `src`, scaled by `coverage` in `[0, 1]`, onto `dst`.
    #[must_use]
    pub fn apply(self, src: Color, coverage: f32, dst: Color) -> Color {
        let coverage = coverage.clamp(0.0, 1.0);
        if coverage <= 0.0 || src.is_transparent() {
            return dst;
        }
        match self {
            Self::SourceOver => source_over(src, coverage, dst),
            Self::DestinationOut => destination_out(src, coverage, dst),
        }
    }
}

fn source_over(src: Color, coverage: f32, dst: Color) -> Color {
    // Exact fast paths. These keep layer compositing bit-identical to the layer itself
    // whenever nothing underneath it shows through.
    if coverage >= 1.0 && (src.is_opaque() || dst.is_transparent()) {
        return src;
    }
    let [sr, sg, sb, sa] = src.to_unit();
    let [dr, dg, db, da] = dst.to_unit();
    let sa = sa * coverage;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Color::TRANSPARENT;
    }
    let dst_weight = da * (1.0 - sa);
    let mix = |s: f32, d: f32| (s * sa + d * dst_weight) / out_a;
    Color::from_unit([mix(sr, dr), mix(sg, dg), mix(sb, db), out_a])
}

fn destination_out(src: Color, coverage: f32, dst: Color) -> Color {
    if dst.is_transparent() {
        return dst;
    }
    let sa = src.to_unit()[3] * coverage;
    let [r, g, b, a] = dst.to_unit();
    Color::from_unit([r, g, b, a * (1.0 - sa)])
}
