//! # Project files
//!
//! JSON documents holding the canvas size, every panel, and each layer's current contents as an
//! embedded PNG data URL. History is never saved.
//!
//! Loading is all-or-nothing. Every layer is decoded (in parallel) into fresh buffers, and only once
//! all of them succeed is a [`Document`] assembled, so a failed load never leaves anything half-built
//! for the caller to swap in.

use rayon::prelude::*;

use super::codec::{self, DecodeError, EncodeError};
use crate::{
    buffer::PixelBuffer,
    id::{LayerID, PanelID, PanelIdCounter},
    state::{panel_label, CanvasSize, Document, Layer, Panel, LAYERS_PER_PANEL},
};

/// The only project version ever written.
pub const VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("invalid project json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed project: {0}")]
    Malformed(String),
    #[error("layer {layer} of panel {panel} could not be decoded: {source}")]
    Decode {
        panel: usize,
        layer: usize,
        source: DecodeError,
    },
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

fn default_version() -> u32 {
    VERSION
}
fn default_visible() -> bool {
    true
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub project_name: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub storyboards: Vec<PanelRecord>,
    #[serde(default)]
    pub current_storyboard_index: usize,
    /// Next panel ID to hand out.
    #[serde(default)]
    pub storyboard_id_counter: u64,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PanelRecord {
    pub id: PanelID,
    /// Written for other readers, ignored on load: names follow position.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub current_layer_index: usize,
    pub layers: Vec<LayerRecord>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub id: LayerID,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// PNG data URL. Absent for a blank layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl Project {
    /// Capture the committed contents of every layer of `document`. Painting not yet committed to
    /// history is left out.
    pub fn from_document(document: &Document, project_name: &str) -> Result<Self, ProjectError> {
        let layers: Vec<&Layer> = document
            .panels()
            .iter()
            .flat_map(|panel| panel.layers().iter())
            .collect();
        let mut encoded = layers
            .par_iter()
            .map(|layer| -> Result<String, EncodeError> {
                let png = codec::encode_snapshot_png(layer.committed())?;
                Ok(codec::to_data_url(&png))
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();

        let storyboards = document
            .panels()
            .iter()
            .enumerate()
            .map(|(index, panel)| PanelRecord {
                id: panel.id(),
                name: panel_label(index),
                current_layer_index: panel.active_layer_index(),
                layers: panel
                    .layers()
                    .iter()
                    .map(|layer| LayerRecord {
                        id: layer.id(),
                        name: layer.name.clone(),
                        visible: layer.visible,
                        image_data: encoded.next(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            version: VERSION,
            project_name: project_name.to_owned(),
            canvas_width: document.width(),
            canvas_height: document.height(),
            storyboards,
            current_storyboard_index: document.active_panel_index(),
            storyboard_id_counter: document.next_panel_id(),
        })
    }
    /// Check and decode into a new document. Nothing is returned unless every layer decoded.
    pub fn into_document(self) -> Result<Document, ProjectError> {
        self.validate()?;
        let size = CanvasSize::new(self.canvas_width, self.canvas_height)
            .map_err(|err| ProjectError::Malformed(err.to_string()))?;

        let jobs: Vec<(usize, usize, Option<&str>)> = self
            .storyboards
            .iter()
            .enumerate()
            .flat_map(|(panel, record)| {
                record
                    .layers
                    .iter()
                    .enumerate()
                    .map(move |(layer, data)| (panel, layer, data.image_data.as_deref()))
            })
            .collect();
        let mut buffers = jobs
            .into_par_iter()
            .map(|(panel, layer, data)| {
                decode_layer(data, size).map_err(|source| ProjectError::Decode {
                    panel,
                    layer,
                    source,
                })
            })
            .collect::<Result<Vec<PixelBuffer>, ProjectError>>()?
            .into_iter();

        let mut panels = Vec::with_capacity(self.storyboards.len());
        for (index, record) in self.storyboards.into_iter().enumerate() {
            let layers: Vec<Layer> = record
                .layers
                .into_iter()
                .zip(buffers.by_ref())
                .enumerate()
                .map(|(idx, (layer, buffer))| {
                    let name = if layer.name.is_empty() {
                        format!("Layer {}", idx + 1)
                    } else {
                        layer.name
                    };
                    Layer::from_buffer(layer.id, name, layer.visible, buffer)
                })
                .collect();
            let layers = <[Layer; LAYERS_PER_PANEL]>::try_from(layers).map_err(|_| {
                ProjectError::Malformed(format!("{} has the wrong layer count", panel_label(index)))
            })?;
            let panel = Panel::from_layers(record.id, layers, record.current_layer_index)
                .ok_or_else(|| {
                    ProjectError::Malformed(format!("{} active layer out of range", panel_label(index)))
                })?;
            panels.push(panel);
        }

        let document = Document::from_parts(
            size,
            panels,
            self.current_storyboard_index,
            PanelIdCounter::starting_at(self.storyboard_id_counter),
        )
        .map_err(|err| ProjectError::Malformed(err.to_string()))?;
        log::info!(
            "loaded project {:?}, {} panels at {}x{}",
            self.project_name,
            document.panels().len(),
            document.width(),
            document.height()
        );
        Ok(document)
    }
    /// Structural checks that need no decoding.
    fn validate(&self) -> Result<(), ProjectError> {
        let malformed = |msg: String| Err(ProjectError::Malformed(msg));
        if self.version != VERSION {
            return malformed(format!("unsupported version {}", self.version));
        }
        if self.storyboards.is_empty() {
            return malformed("no panels".to_owned());
        }
        if self.current_storyboard_index >= self.storyboards.len() {
            return malformed(format!(
                "active panel {} out of range",
                self.current_storyboard_index
            ));
        }
        for (index, record) in self.storyboards.iter().enumerate() {
            if record.layers.len() != LAYERS_PER_PANEL {
                return malformed(format!(
                    "{} has {} layers, expected {LAYERS_PER_PANEL}",
                    panel_label(index),
                    record.layers.len()
                ));
            }
            if record.current_layer_index >= LAYERS_PER_PANEL {
                return malformed(format!(
                    "{} active layer {} out of range",
                    panel_label(index),
                    record.current_layer_index
                ));
            }
            if self.storyboards[..index].iter().any(|other| other.id == record.id) {
                return malformed(format!("duplicate panel id {}", record.id.0));
            }
        }
        Ok(())
    }
    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string(self)?)
    }
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn decode_layer(data: Option<&str>, size: CanvasSize) -> Result<PixelBuffer, DecodeError> {
    match data {
        None => Ok(PixelBuffer::new(size.width(), size.height())),
        Some(url) => {
            let bytes = codec::from_data_url(url)?;
            codec::decode_into(&bytes, size.width(), size.height())
        }
    }
}
