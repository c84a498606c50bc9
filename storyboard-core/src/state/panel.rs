use super::layer::Layer;
use crate::id::{LayerID, PanelID};

/// Every panel has exactly this many layers.
pub const LAYERS_PER_PANEL: usize = 4;

/// One storyboard frame: a fixed stack of layers, bottom (index 0) to top, with one active layer.
pub struct Panel {
    id: PanelID,
    layers: [Layer; LAYERS_PER_PANEL],
    /// Invariant: `< LAYERS_PER_PANEL`
    active_layer: usize,
}
impl Panel {
    /// A panel of blank, visible layers named "Layer 1" through "Layer 4".
    #[must_use]
    pub fn new(id: PanelID, width: u32, height: u32) -> Self {
        let layers = std::array::from_fn(|idx| {
            let number = idx + 1;
            // Tiny constant, always fits.
            let layer_id = LayerID(u32::try_from(number).unwrap_or(u32::MAX));
            Layer::new(layer_id, format!("Layer {number}"), width, height)
        });
        Self {
            id,
            layers,
            active_layer: 0,
        }
    }
    /// Assemble from existing layers. Returns `None` if `active_layer` is out of range.
    #[must_use]
    pub fn from_layers(
        id: PanelID,
        layers: [Layer; LAYERS_PER_PANEL],
        active_layer: usize,
    ) -> Option<Self> {
        (active_layer < LAYERS_PER_PANEL).then_some(Self {
            id,
            layers,
            active_layer,
        })
    }
    #[must_use]
    pub fn id(&self) -> PanelID {
        self.id
    }
    /// Layers in compositing order, bottom first.
    #[must_use]
    pub fn layers(&self) -> &[Layer; LAYERS_PER_PANEL] {
        &self.layers
    }
    pub fn layers_mut(&mut self) -> &mut [Layer; LAYERS_PER_PANEL] {
        &mut self.layers
    }
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }
    #[must_use]
    pub fn active_layer_index(&self) -> usize {
        self.active_layer
    }
    /// Select the layer that tools and history operate on.
    /// Returns `false` (and changes nothing) if `index` is out of range.
    pub fn set_active_layer(&mut self, index: usize) -> bool {
        if index < LAYERS_PER_PANEL {
            self.active_layer = index;
            true
        } else {
            false
        }
    }
    #[must_use]
    pub fn active_layer(&self) -> &Layer {
        &self.layers[self.active_layer]
    }
    pub fn active_layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.active_layer]
    }
    /// Layers with `visible` set, bottom first.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().filter(|layer| layer.visible)
    }
    /// A copy of this panel with every layer resized. See [`Layer::resized`].
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self {
            id: self.id,
            layers: std::array::from_fn(|idx| self.layers[idx].resized(width, height)),
            active_layer: self.active_layer,
        }
    }
}

/// Display name of the panel at `index`, e.g. `C-001` for index 0.
/// Names follow position, not [`PanelID`], so they renumber when panels are removed.
#[must_use]
pub fn panel_label(index: usize) -> String {
    format!("C-{:03}", index + 1)
}

#[cfg(test)]
mod test {
    use super::{panel_label, Panel, LAYERS_PER_PANEL};
    use crate::id::{LayerID, PanelID};

    #[test]
    fn default_layers() {
        let panel = Panel::new(PanelID(7), 10, 5);
        assert_eq!(panel.layers().len(), LAYERS_PER_PANEL);
        for (idx, layer) in panel.layers().iter().enumerate() {
            assert_eq!(layer.id(), LayerID(idx as u32 + 1));
            assert_eq!(layer.name, format!("Layer {}", idx + 1));
            assert!(layer.visible);
            assert_eq!(layer.buffer().size(), [10, 5]);
        }
        assert_eq!(panel.active_layer_index(), 0);
    }
    #[test]
    fn active_layer_bounds() {
        let mut panel = Panel::new(PanelID(1), 2, 2);
        assert!(panel.set_active_layer(3));
        assert_eq!(panel.active_layer().id(), LayerID(4));
        assert!(!panel.set_active_layer(4));
        assert_eq!(panel.active_layer_index(), 3);
    }
    #[test]
    fn labels() {
        assert_eq!(panel_label(0), "C-001");
        assert_eq!(panel_label(41), "C-042");
        assert_eq!(panel_label(1233), "C-1234");
    }
}
