//! User-tweakable defaults for new documents and export.
//!
//! Every field has a default, so partially-written settings files still load.

use crate::{
    state::{CanvasSize, DimensionError},
    stroke::DEFAULT_BRUSH_SIZE,
};

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct Settings {
    /// Canvas size of new documents.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Initial brush size, in canvas pixels.
    pub brush_size: f32,
    /// Name given to new projects, used as the prefix of exported files.
    pub project_name: String,
    pub export: ExportLayout,
}
impl Settings {
    /// The configured canvas size, if it is within the accepted range.
    pub fn canvas_size(&self) -> Result<CanvasSize, DimensionError> {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }
}
impl Default for Settings {
    fn default() -> Self {
        let size = CanvasSize::default();
        Self {
            canvas_width: size.width(),
            canvas_height: size.height(),
            brush_size: DEFAULT_BRUSH_SIZE,
            project_name: "storyboard".to_owned(),
            export: ExportLayout::default(),
        }
    }
}

/// Spacing of panels on exported images, in pixels.
#[derive(serde::Serialize, serde::Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(default)]
pub struct ExportLayout {
    /// White space around and between panels.
    pub padding: u32,
    /// Thickness of the black frame drawn around each panel.
    pub border: u32,
}
impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            padding: 20,
            border: 2,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ExportLayout, Settings};
    #[test]
    fn partial_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"canvas_width": 640, "export": {"border": 5}}"#).unwrap();
        assert_eq!(settings.canvas_width, 640);
        assert_eq!(settings.canvas_height, 1080);
        assert_eq!(settings.project_name, "storyboard");
        assert_eq!(
            settings.export,
            ExportLayout {
                padding: 20,
                border: 5
            }
        );
    }
    #[test]
    fn canvas_size_checked() {
        let settings = Settings {
            canvas_width: 10,
            ..Settings::default()
        };
        assert!(settings.canvas_size().is_err());
        assert!(Settings::default().canvas_size().is_ok());
    }
}
