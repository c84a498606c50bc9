//! # Text
//!
//! Rasterizing short labels. A bold sans-serif face is looked up among the installed system fonts
//! once, on first use. Without one, a built-in block font covering digits, `C`, and `-` is used.

use std::sync::OnceLock;

use ab_glyph::{Font as _, FontArc, FontVec, GlyphId, PxScale, PxScaleFont, ScaleFont as _};

use crate::{blend::CompositeOp, buffer::PixelBuffer, color::Color, util::Rect};

/// Family names tried before the generic sans-serif.
const PREFERRED_FAMILIES: &[&str] = &["Arial", "Liberation Sans", "DejaVu Sans", "Helvetica"];

/// Block glyph cell layout: 5 columns by 7 rows, most significant of the low five bits leftmost.
const GLYPH_COLUMNS: u8 = 5;
const GLYPH_ROWS: u8 = 7;
/// Horizontal distance between block glyph origins, in cells.
const GLYPH_ADVANCE: u8 = GLYPH_COLUMNS + 1;

fn block_glyph(c: char) -> Option<[u8; GLYPH_ROWS as usize]> {
    Some(match c {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        _ => return None,
    })
}

pub enum LabelFont {
    /// An installed outline face.
    Outline(FontArc),
    /// Built-in block glyphs. Characters outside of the table are left blank.
    Blocks,
}
impl LabelFont {
    /// The shared label font, located on first call.
    #[must_use]
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<LabelFont> = OnceLock::new();
        SHARED.get_or_init(|| match system_face() {
            Some(font) => Self::Outline(font),
            None => {
                log::warn!("no bold sans-serif system face, labels use block glyphs");
                Self::Blocks
            }
        })
    }
    /// Advance width of `text` set at `size` px.
    #[must_use]
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match self {
            Self::Outline(font) => {
                let scaled = font.as_scaled(em_scale(font, size));
                layout(&scaled, text).1
            }
            Self::Blocks => {
                #[allow(clippy::cast_precision_loss)]
                let glyphs = text.chars().count() as f32;
                (glyphs * f32::from(GLYPH_ADVANCE) - 1.0).max(0.0) * block_cell(size)
            }
        }
    }
    /// Draw `text` at `size` px with the top of its line box at `top_left`.
    pub fn draw(
        &self,
        target: &mut PixelBuffer,
        text: &str,
        top_left: [f32; 2],
        size: f32,
        color: Color,
    ) {
        match self {
            Self::Outline(font) => draw_outlined(font, target, text, top_left, size, color),
            Self::Blocks => draw_blocks(target, text, top_left, size, color),
        }
    }
}

fn system_face() -> Option<FontArc> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let families: Vec<fontdb::Family> = PREFERRED_FAMILIES
        .iter()
        .map(|&name| fontdb::Family::Name(name))
        .chain(std::iter::once(fontdb::Family::SansSerif))
        .collect();
    let id = db.query(&fontdb::Query {
        families: &families,
        weight: fontdb::Weight::BOLD,
        ..fontdb::Query::default()
    })?;
    let font = db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index)
    })?;
    match font {
        Ok(font) => {
            if let Some(face) = db.face(id) {
                log::info!("label face {}", face.post_script_name);
            }
            Some(FontArc::new(font))
        }
        Err(err) => {
            log::warn!("unreadable system face: {err}");
            None
        }
    }
}

/// Scale at which the em square is `size` px tall, the way CSS sizes fonts.
fn em_scale(font: &FontArc, size: f32) -> PxScale {
    match font.units_per_em() {
        Some(units) if units > 0.0 => PxScale::from(size * font.height_unscaled() / units),
        _ => PxScale::from(size),
    }
}

/// Glyphs of `text` with their pen x offsets, and the total advance.
fn layout(scaled: &PxScaleFont<&FontArc>, text: &str) -> (Vec<(GlyphId, f32)>, f32) {
    let mut glyphs = Vec::with_capacity(text.len());
    let mut pen = 0.0;
    let mut prev = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            pen += scaled.kern(prev, id);
        }
        glyphs.push((id, pen));
        pen += scaled.h_advance(id);
        prev = Some(id);
    }
    (glyphs, pen)
}

fn draw_outlined(
    font: &FontArc,
    target: &mut PixelBuffer,
    text: &str,
    [left, top]: [f32; 2],
    size: f32,
    color: Color,
) {
    let scale = em_scale(font, size);
    let scaled = font.as_scaled(scale);
    let baseline = top + scaled.ascent();
    for (id, x) in layout(&scaled, text).0 {
        let glyph = id.with_scale_and_position(scale, ab_glyph::point(left + x, baseline));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let origin: [i64; 2] = [
            az::saturating_cast(bounds.min.x),
            az::saturating_cast(bounds.min.y),
        ];
        outlined.draw(|px, py, coverage| {
            let x = u32::try_from(origin[0] + i64::from(px));
            let y = u32::try_from(origin[1] + i64::from(py));
            if let (Ok(x), Ok(y)) = (x, y) {
                target.blend(x, y, color, coverage, CompositeOp::SourceOver);
            }
        });
    }
}

fn block_cell(size: f32) -> f32 {
    size / f32::from(GLYPH_ROWS)
}

/// Pixel rect between two float corners, rounding each edge to the nearest pixel boundary so
/// adjacent cells tile without gaps or overlap.
pub(crate) fn snapped(min: [f32; 2], max: [f32; 2]) -> Rect {
    let round = |v: f32| -> i64 { az::saturating_cast(v.round()) };
    let [x0, y0, x1, y1] = [round(min[0]), round(min[1]), round(max[0]), round(max[1])];
    Rect::new(
        x0,
        y0,
        az::saturating_cast(x1 - x0),
        az::saturating_cast(y1 - y0),
    )
}

fn draw_blocks(target: &mut PixelBuffer, text: &str, [left, top]: [f32; 2], size: f32, color: Color) {
    let cell = block_cell(size);
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = block_glyph(c) else {
            continue;
        };
        #[allow(clippy::cast_precision_loss)]
        let glyph_x = left + (i as f32) * f32::from(GLYPH_ADVANCE) * cell;
        for (row, bits) in (0u8..).zip(rows) {
            for col in 0..GLYPH_COLUMNS {
                if bits & (1 << (GLYPH_COLUMNS - 1 - col)) == 0 {
                    continue;
                }
                let min = [glyph_x + f32::from(col) * cell, top + f32::from(row) * cell];
                target.fill_rect(snapped(min, [min[0] + cell, min[1] + cell]), color);
            }
        }
    }
}
