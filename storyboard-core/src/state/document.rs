use super::{
    layer::Layer,
    panel::{panel_label, Panel},
};
use crate::id::{PanelID, PanelIdCounter};

/// Smallest accepted canvas dimension, on either axis.
pub const MIN_DIMENSION: u32 = 100;
/// Largest accepted canvas dimension, on either axis.
pub const MAX_DIMENSION: u32 = 4096;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionError {
    #[error("canvas size {width}x{height} outside of accepted range 100..=4096")]
    OutOfRange { width: u32, height: u32 },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelError {
    #[error("cannot delete the last remaining panel")]
    LastPanel,
    #[error("no panel at index {0}")]
    NoSuchPanel(usize),
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartsError {
    #[error("document has no panels")]
    NoPanels,
    #[error("active panel {0} out of range")]
    ActivePanel(usize),
    #[error("layer buffer size does not match canvas size")]
    SizeMismatch,
}

/// Canvas dimensions shared by every buffer in a document, checked against the accepted range.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CanvasSize {
    width: u32,
    height: u32,
}
impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Result<Self, DimensionError> {
        let range = MIN_DIMENSION..=MAX_DIMENSION;
        if range.contains(&width) && range.contains(&height) {
            Ok(Self { width, height })
        } else {
            Err(DimensionError::OutOfRange { width, height })
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}
impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// An ordered sequence of panels sharing one canvas size. Always holds at least one panel.
pub struct Document {
    size: CanvasSize,
    /// Never empty.
    panels: Vec<Panel>,
    /// Invariant: `< panels.len()`
    active_panel: usize,
    panel_ids: PanelIdCounter,
}
impl Document {
    /// A document holding a single blank panel.
    #[must_use]
    pub fn new(size: CanvasSize) -> Self {
        let mut panel_ids = PanelIdCounter::default();
        let first = Panel::new(panel_ids.allocate(), size.width, size.height);
        Self {
            size,
            panels: vec![first],
            active_panel: 0,
            panel_ids,
        }
    }
    /// Assemble a document from already-built panels, checking every invariant.
    /// The ID counter is raised if needed so it never reissues an existing panel's ID.
    pub fn from_parts(
        size: CanvasSize,
        panels: Vec<Panel>,
        active_panel: usize,
        mut panel_ids: PanelIdCounter,
    ) -> Result<Self, PartsError> {
        if panels.is_empty() {
            return Err(PartsError::NoPanels);
        }
        if active_panel >= panels.len() {
            return Err(PartsError::ActivePanel(active_panel));
        }
        let expected = [size.width, size.height];
        let sizes_match = panels
            .iter()
            .flat_map(|panel| panel.layers().iter())
            .all(|layer| layer.buffer().size() == expected);
        if !sizes_match {
            return Err(PartsError::SizeMismatch);
        }
        if let Some(max) = panels.iter().map(Panel::id).max() {
            if panel_ids.ensure_above(max) {
                log::warn!("panel ID counter was behind {max}, raised to {}", panel_ids.peek());
            }
        }
        Ok(Self {
            size,
            panels,
            active_panel,
            panel_ids,
        })
    }
    #[must_use]
    pub fn size(&self) -> CanvasSize {
        self.size
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.size.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.size.height
    }
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }
    #[must_use]
    pub fn panel(&self, index: usize) -> Option<&Panel> {
        self.panels.get(index)
    }
    pub fn panel_mut(&mut self, index: usize) -> Option<&mut Panel> {
        self.panels.get_mut(index)
    }
    #[must_use]
    pub fn active_panel_index(&self) -> usize {
        self.active_panel
    }
    #[must_use]
    pub fn active_panel(&self) -> &Panel {
        &self.panels[self.active_panel]
    }
    pub fn active_panel_mut(&mut self) -> &mut Panel {
        &mut self.panels[self.active_panel]
    }
    /// The layer tools paint into: the active layer of the active panel.
    #[must_use]
    pub fn active_layer(&self) -> &Layer {
        self.active_panel().active_layer()
    }
    pub fn active_layer_mut(&mut self) -> &mut Layer {
        self.active_panel_mut().active_layer_mut()
    }
    /// Display names of every panel, in order.
    #[must_use]
    pub fn panel_names(&self) -> Vec<String> {
        (0..self.panels.len()).map(panel_label).collect()
    }
    /// The next ID [`Self::add_panel`] will assign.
    #[must_use]
    pub fn next_panel_id(&self) -> u64 {
        self.panel_ids.peek()
    }
    /// Append a blank panel and make it active, returning its index.
    pub fn add_panel(&mut self) -> usize {
        let id = self.panel_ids.allocate();
        self.panels
            .push(Panel::new(id, self.size.width, self.size.height));
        self.active_panel = self.panels.len() - 1;
        log::info!("added {id} as {}", panel_label(self.active_panel));
        self.active_panel
    }
    /// Remove the panel at `index`. Remaining panels are renamed by their new positions.
    ///
    /// If the active index now points past the end, it is clamped to the last panel.
    pub fn delete_panel(&mut self, index: usize) -> Result<PanelID, PanelError> {
        if index >= self.panels.len() {
            return Err(PanelError::NoSuchPanel(index));
        }
        if self.panels.len() <= 1 {
            return Err(PanelError::LastPanel);
        }
        let removed = self.panels.remove(index);
        if self.active_panel >= self.panels.len() {
            self.active_panel = self.panels.len() - 1;
        }
        log::info!("deleted {} from {}", removed.id(), panel_label(index));
        Ok(removed.id())
    }
    pub fn set_active_panel(&mut self, index: usize) -> Result<(), PanelError> {
        if index < self.panels.len() {
            self.active_panel = index;
            Ok(())
        } else {
            Err(PanelError::NoSuchPanel(index))
        }
    }
    /// Change the canvas size of every layer in the document.
    ///
    /// Content is kept anchored at the top-left, cropped or padded with transparency. All history
    /// is discarded: each layer's resized content becomes its only entry. Out-of-range sizes are
    /// rejected without touching anything.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), DimensionError> {
        let size = CanvasSize::new(width, height)?;
        // Fully build the new panels before swapping them in.
        let panels: Vec<Panel> = self
            .panels
            .iter()
            .map(|panel| panel.resized(width, height))
            .collect();
        self.panels = panels;
        self.size = size;
        log::info!("resized document to {width}x{height}");
        Ok(())
    }
}
impl Default for Document {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

#[cfg(test)]
mod test {
    use super::{CanvasSize, DimensionError, Document, PanelError, PartsError};
    use crate::{
        color::Color,
        id::{PanelID, PanelIdCounter},
        state::panel::Panel,
    };

    fn small() -> Document {
        Document::new(CanvasSize::new(100, 120).unwrap())
    }
    #[test]
    fn starts_with_one_panel() {
        let doc = small();
        assert_eq!(doc.panels().len(), 1);
        assert_eq!(doc.active_panel_index(), 0);
        assert_eq!(doc.active_panel().id(), PanelID(1));
        assert_eq!(doc.panel_names(), ["C-001"]);
        assert_eq!(doc.next_panel_id(), 2);
    }
    #[test]
    fn size_range() {
        assert!(CanvasSize::new(100, 4096).is_ok());
        assert_eq!(
            CanvasSize::new(99, 500),
            Err(DimensionError::OutOfRange {
                width: 99,
                height: 500
            })
        );
        assert!(CanvasSize::new(500, 4097).is_err());
    }
    #[test]
    fn delete_renumbers_and_clamps() {
        let mut doc = small();
        doc.add_panel();
        doc.add_panel();
        assert_eq!(doc.panel_names(), ["C-001", "C-002", "C-003"]);
        assert_eq!(doc.active_panel_index(), 2);

        assert_eq!(doc.delete_panel(1), Ok(PanelID(2)));
        assert_eq!(doc.panel_names(), ["C-001", "C-002"]);
        // Was 2, past the new end.
        assert_eq!(doc.active_panel_index(), 1);
        assert_eq!(doc.active_panel().id(), PanelID(3));
        // IDs are never reused.
        doc.add_panel();
        assert_eq!(doc.active_panel().id(), PanelID(4));
    }
    #[test]
    fn delete_last_rejected() {
        let mut doc = small();
        assert_eq!(doc.delete_panel(0), Err(PanelError::LastPanel));
        assert_eq!(doc.delete_panel(5), Err(PanelError::NoSuchPanel(5)));
        assert_eq!(doc.panels().len(), 1);
    }
    #[test]
    fn switch_panel_bounds() {
        let mut doc = small();
        doc.add_panel();
        assert_eq!(doc.set_active_panel(0), Ok(()));
        assert_eq!(doc.set_active_panel(2), Err(PanelError::NoSuchPanel(2)));
        assert_eq!(doc.active_panel_index(), 0);
    }
    #[test]
    fn resize_rebuilds_everything() {
        let mut doc = small();
        doc.add_panel();
        for _ in 0..7 {
            doc.active_layer_mut().buffer_mut().put(5, 5, Color::BLACK);
            doc.active_layer_mut().commit();
        }
        assert!(doc.resize(300, 200).is_ok());
        assert_eq!((doc.width(), doc.height()), (300, 200));
        for panel in doc.panels() {
            for layer in panel.layers() {
                assert_eq!(layer.buffer().size(), [300, 200]);
                assert_eq!(layer.history_len(), 1);
                assert_eq!(layer.history_cursor(), 0);
            }
        }
        assert_eq!(doc.active_layer().buffer().get(5, 5), Some(Color::BLACK));
    }
    #[test]
    fn resize_out_of_range_untouched() {
        let mut doc = small();
        doc.active_layer_mut().buffer_mut().put(0, 0, Color::BLACK);
        doc.active_layer_mut().commit();
        assert!(doc.resize(5000, 200).is_err());
        assert_eq!((doc.width(), doc.height()), (100, 120));
        assert_eq!(doc.active_layer().history_len(), 2);
    }
    #[test]
    fn from_parts_checks() {
        let size = CanvasSize::new(100, 100).unwrap();
        assert_eq!(
            Document::from_parts(size, vec![], 0, PanelIdCounter::default()).err(),
            Some(PartsError::NoPanels)
        );
        let panels = vec![Panel::new(PanelID(1), 100, 100)];
        assert_eq!(
            Document::from_parts(size, panels, 1, PanelIdCounter::default()).err(),
            Some(PartsError::ActivePanel(1))
        );
        let panels = vec![Panel::new(PanelID(1), 100, 101)];
        assert_eq!(
            Document::from_parts(size, panels, 0, PanelIdCounter::default()).err(),
            Some(PartsError::SizeMismatch)
        );
        let panels = vec![Panel::new(PanelID(9), 100, 100)];
        let doc = Document::from_parts(size, panels, 0, PanelIdCounter::default()).unwrap();
        assert_eq!(doc.next_panel_id(), 10);
    }
}
