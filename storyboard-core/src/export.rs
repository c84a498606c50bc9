//! # Export
//!
//! Framed, captioned renders of panels: one tall sheet of every panel, or one image per panel.
//!
//! Each panel is drawn over a white backing inside a black frame, with its `C-###` label in bold
//! sans-serif on a black badge in the top-left corner.

use rayon::prelude::*;

use crate::{
    buffer::PixelBuffer,
    color::Color,
    compositor::Compositor,
    settings::ExportLayout,
    state::{panel_label, Document, Panel},
    text::{snapped, LabelFont},
    util::Rect,
};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportError {
    #[error("export of {width}x{height} is too large")]
    TooLarge { width: u64, height: u64 },
}

/// Caption text height for a canvas `canvas_width` pixels wide.
#[must_use]
pub fn caption_font_size(canvas_width: u32) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let scaled = canvas_width as f32 / 60.0;
    scaled.max(24.0)
}

/// Draw the label of the panel at `index` as a black badge with white text, its top-left corner at
/// `(x, y)`. The text size follows the canvas width. Returns the badge's extent.
pub fn stamp_caption(
    target: &mut PixelBuffer,
    index: usize,
    x: i64,
    y: i64,
    canvas_width: u32,
) -> Rect {
    stamp_caption_with(LabelFont::shared(), target, index, [x, y], canvas_width)
}

fn stamp_caption_with(
    font: &LabelFont,
    target: &mut PixelBuffer,
    index: usize,
    [x, y]: [i64; 2],
    canvas_width: u32,
) -> Rect {
    let label = panel_label(index);
    let size = caption_font_size(canvas_width);
    let padding = size * 0.4;
    let text_width = font.measure(&label, size);
    #[allow(clippy::cast_precision_loss)]
    let origin = [x as f32, y as f32];

    let badge = snapped(
        origin,
        [
            origin[0] + text_width + padding * 2.0,
            origin[1] + size + padding * 2.0,
        ],
    );
    target.fill_rect(badge, Color::BLACK);
    font.draw(
        target,
        &label,
        [origin[0] + padding, origin[1] + padding],
        size,
        Color::WHITE,
    );
    badge
}

/// Draw one framed panel with the top-left of its canvas area at `(x, y)`.
fn draw_framed(
    target: &mut PixelBuffer,
    panel: &Panel,
    index: usize,
    [x, y]: [i64; 2],
    layout: ExportLayout,
) {
    let composite = Compositor::flatten(panel, Some(Color::WHITE));
    let border = i64::from(layout.border);
    let frame = Rect::new(
        x - border,
        y - border,
        composite.width().saturating_add(layout.border.saturating_mul(2)),
        composite.height().saturating_add(layout.border.saturating_mul(2)),
    );
    target.fill_rect(frame, Color::BLACK);
    target.copy_from(&composite, [x, y]);
    stamp_caption(target, index, x, y, composite.width());
}

fn checked_size(width: u64, height: u64) -> Result<[u32; 2], ExportError> {
    let too_large = ExportError::TooLarge { width, height };
    let w = u32::try_from(width).map_err(|_| too_large)?;
    let h = u32::try_from(height).map_err(|_| too_large)?;
    // Keep the pixel count addressable.
    usize::try_from(width * height)
        .ok()
        .and_then(|count| count.checked_mul(std::mem::size_of::<Color>()))
        .ok_or(too_large)?;
    Ok([w, h])
}

/// Every panel of `document` stacked top to bottom on one white sheet.
pub fn sheet(document: &Document, layout: ExportLayout) -> Result<PixelBuffer, ExportError> {
    let (width, height) = (u64::from(document.width()), u64::from(document.height()));
    let (padding, border) = (u64::from(layout.padding), u64::from(layout.border));
    let count = document.panels().len() as u64;
    let step = height + border * 2 + padding;
    let [sheet_width, sheet_height] =
        checked_size(width + border * 2 + padding * 2, (step * count).saturating_sub(padding))?;

    let mut out = PixelBuffer::filled(sheet_width, sheet_height, Color::WHITE);
    let step = i64::from(document.height()) + i64::from(layout.border) * 2 + i64::from(layout.padding);
    let x = i64::from(layout.padding);
    let mut y = i64::from(layout.padding);
    for (index, panel) in document.panels().iter().enumerate() {
        draw_framed(&mut out, panel, index, [x, y], layout);
        y += step;
    }
    log::info!(
        "exported sheet of {} panels, {sheet_width}x{sheet_height}",
        document.panels().len()
    );
    Ok(out)
}

/// One framed image per panel, each named by its label, e.g. `C-001.png`.
pub fn frames(
    document: &Document,
    layout: ExportLayout,
) -> Result<Vec<(String, PixelBuffer)>, ExportError> {
    let (width, height) = (u64::from(document.width()), u64::from(document.height()));
    let margin = u64::from(layout.border) * 2 + u64::from(layout.padding) * 2;
    let [frame_width, frame_height] = checked_size(width + margin, height + margin)?;
    let offset = i64::from(layout.padding);

    Ok(document
        .panels()
        .par_iter()
        .enumerate()
        .map(|(index, panel)| {
            let mut out = PixelBuffer::filled(frame_width, frame_height, Color::WHITE);
            draw_framed(&mut out, panel, index, [offset, offset], layout);
            (format!("{}.png", panel_label(index)), out)
        })
        .collect())
}
