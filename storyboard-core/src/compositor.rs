//! # Compositor
//!
//! Flattens the visible layers of a panel, bottom to top, into a single surface.

use crate::{blend::CompositeOp, buffer::PixelBuffer, color::Color, state::Panel};

/// Owns the presentation surface, reused across renders so that re-rendering on every pointer
/// move does not allocate.
pub struct Compositor {
    surface: PixelBuffer,
}
impl Compositor {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: PixelBuffer::new(width, height),
        }
    }
    /// The result of the most recent [`Self::render`].
    #[must_use]
    pub fn surface(&self) -> &PixelBuffer {
        &self.surface
    }
    /// Composite `panel` onto the presentation surface, with `overlay` (such as a line preview)
    /// drawn above every layer. Does not modify the panel.
    ///
    /// The surface is only reallocated when the panel's dimensions differ from the last render.
    pub fn render(&mut self, panel: &Panel, overlay: Option<&PixelBuffer>) -> &PixelBuffer {
        let size = panel_size(panel);
        if self.surface.size() == size {
            self.surface.clear();
        } else {
            log::debug!("compositor surface reallocated to {}x{}", size[0], size[1]);
            self.surface = PixelBuffer::new(size[0], size[1]);
        }
        composite_into(&mut self.surface, panel);
        if let Some(overlay) = overlay {
            self.surface.draw(overlay, [0, 0], CompositeOp::SourceOver);
        }
        &self.surface
    }
    /// A freshly allocated composite of `panel`, e.g. for thumbnails or export.
    /// With a `background`, layers are drawn over an opaque fill of that color.
    #[must_use]
    pub fn flatten(panel: &Panel, background: Option<Color>) -> PixelBuffer {
        let [width, height] = panel_size(panel);
        let mut out = match background {
            Some(color) => PixelBuffer::filled(width, height, color),
            None => PixelBuffer::new(width, height),
        };
        composite_into(&mut out, panel);
        out
    }
}

fn panel_size(panel: &Panel) -> [u32; 2] {
    panel.layers()[0].buffer().size()
}

fn composite_into(target: &mut PixelBuffer, panel: &Panel) {
    for layer in panel.visible_layers() {
        target.draw(layer.buffer(), [0, 0], CompositeOp::SourceOver);
    }
}
