//! # Storyboard core
//!
//! Layered raster editing for multi-panel storyboards: pixel buffers, anti-aliased pressure-sensitive
//! strokes, per-layer undo history, compositing, project files, and export.
//!
//! Nothing in here touches a window or an input device. Hosts feed canvas-space pointer events into
//! an [`editor::Editor`] and present whatever [`editor::Editor::render`] hands back.

pub mod blend;
pub mod buffer;
pub mod color;
pub mod compositor;
pub mod editor;
pub mod export;
pub mod history;
pub mod id;
pub mod input;
pub mod io;
pub mod raster;
pub mod settings;
pub mod state;
pub mod stroke;
pub mod text;
pub mod util;

pub use buffer::PixelBuffer;
pub use color::Color;
pub use editor::{EditError, Editor};
