pub mod document;
pub mod layer;
pub mod panel;

pub use document::{CanvasSize, DimensionError, Document, PanelError, PartsError};
pub use layer::Layer;
pub use panel::{panel_label, Panel, LAYERS_PER_PANEL};
