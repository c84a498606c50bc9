//! # Editor
//!
//! The single entry point that drives a [`Document`]: pointer events are routed to the stroke
//! engine and committed to layer history, and every document-level command is checked against the
//! gesture state before anything is touched.
//!
//! Only the active layer of the active panel is ever painted. Structural changes (switching panel
//! or layer, adding or removing panels, resize, load, undo, redo, clear) are refused while a gesture
//! is underway, so a gesture always begins and ends on the same layer.

use crate::{
    buffer::PixelBuffer,
    compositor::Compositor,
    id::PanelID,
    input::{EventKind, InputEvent},
    io::{Project, ProjectError},
    settings::Settings,
    state::{CanvasSize, DimensionError, Document, PanelError},
    stroke::{GestureState, Sample, StrokeEngine, Tool},
};

#[derive(thiserror::Error, Debug)]
pub enum EditError {
    #[error("cannot delete the last remaining panel")]
    LastPanel,
    #[error("no panel at index {0}")]
    NoSuchPanel(usize),
    #[error("no layer at index {0}")]
    NoSuchLayer(usize),
    #[error("not allowed while a stroke is in progress")]
    GestureInProgress,
    #[error(transparent)]
    Dimension(#[from] DimensionError),
    #[error(transparent)]
    Project(#[from] ProjectError),
}
impl From<PanelError> for EditError {
    fn from(value: PanelError) -> Self {
        match value {
            PanelError::LastPanel => Self::LastPanel,
            PanelError::NoSuchPanel(index) => Self::NoSuchPanel(index),
        }
    }
}

pub struct Editor {
    document: Document,
    engine: StrokeEngine,
    compositor: Compositor,
    project_name: String,
}
impl Editor {
    #[must_use]
    pub fn new(size: CanvasSize, project_name: impl Into<String>) -> Self {
        Self::with_document(Document::new(size), project_name.into())
    }
    /// A blank editor using the configured canvas size, brush, and project name.
    pub fn from_settings(settings: &Settings) -> Result<Self, DimensionError> {
        let mut editor = Self::new(settings.canvas_size()?, settings.project_name.clone());
        editor.set_brush_size(settings.brush_size);
        Ok(editor)
    }
    fn with_document(document: Document, project_name: String) -> Self {
        let (width, height) = (document.width(), document.height());
        Self {
            document,
            engine: StrokeEngine::new(width, height),
            compositor: Compositor::new(width, height),
            project_name,
        }
    }
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }
    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.engine.tool()
    }
    #[must_use]
    pub fn brush_size(&self) -> f32 {
        self.engine.brush_size()
    }
    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.engine.state()
    }

    /// Route one pointer event. Returns `true` if the view needs re-rendering.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        let sample = event.sample();
        match event.kind {
            EventKind::Down => {
                if self.engine.is_active() {
                    // A second pointer. Only the first is honored.
                    log::trace!("ignoring second pointer down");
                    return false;
                }
                self.engine.begin(sample);
                false
            }
            EventKind::Move => {
                if !self.engine.is_active() {
                    return false;
                }
                let target = self.document.active_layer_mut().buffer_mut();
                self.engine.extend(sample, target);
                true
            }
            EventKind::Up | EventKind::Cancel => self.finish_gesture(Some(sample)),
        }
    }
    /// End the active gesture, if any, and commit the result to the active layer's history.
    fn finish_gesture(&mut self, at: Option<Sample>) -> bool {
        let layer = self.document.active_layer_mut();
        if self.engine.end(at, layer.buffer_mut()) {
            layer.commit();
            true
        } else {
            false
        }
    }
    fn ensure_idle(&self, operation: &str) -> Result<(), EditError> {
        if self.engine.is_active() {
            log::warn!("refused {operation} during a stroke");
            Err(EditError::GestureInProgress)
        } else {
            Ok(())
        }
    }

    /// Change tool. A gesture in progress is ended at its last position and committed first.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.engine.is_active() {
            log::debug!("tool switched mid-stroke, ending stroke");
            self.finish_gesture(None);
        }
        self.engine.set_tool(tool);
    }
    /// Set the brush size, clamped to the supported range. Applies from the next paint step.
    pub fn set_brush_size(&mut self, size: f32) {
        self.engine.set_brush_size(size);
    }

    /// Step the active layer back in its history. `Ok(false)` if it was already at its oldest state.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        self.ensure_idle("undo")?;
        Ok(self.document.active_layer_mut().undo())
    }
    /// Step the active layer forward in its history. `Ok(false)` if it was already at its newest state.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        self.ensure_idle("redo")?;
        Ok(self.document.active_layer_mut().redo())
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.engine.is_active() && self.document.active_layer().can_undo()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.engine.is_active() && self.document.active_layer().can_redo()
    }
    /// Erase the whole active layer, as one undoable step.
    pub fn clear_layer(&mut self) -> Result<(), EditError> {
        self.ensure_idle("clear")?;
        let layer = self.document.active_layer_mut();
        layer.buffer_mut().clear();
        layer.commit();
        Ok(())
    }

    /// Append a blank panel and switch to it. Returns its index.
    pub fn add_panel(&mut self) -> Result<usize, EditError> {
        self.ensure_idle("add panel")?;
        Ok(self.document.add_panel())
    }
    pub fn delete_panel(&mut self, index: usize) -> Result<PanelID, EditError> {
        self.ensure_idle("delete panel")?;
        self.document.delete_panel(index).map_err(|err| {
            log::warn!("delete panel: {err}");
            err.into()
        })
    }
    pub fn switch_panel(&mut self, index: usize) -> Result<(), EditError> {
        self.ensure_idle("panel switch")?;
        Ok(self.document.set_active_panel(index)?)
    }
    /// Select which layer of the active panel is painted on and undone.
    pub fn switch_layer(&mut self, index: usize) -> Result<(), EditError> {
        self.ensure_idle("layer switch")?;
        if self.document.active_panel_mut().set_active_layer(index) {
            Ok(())
        } else {
            Err(EditError::NoSuchLayer(index))
        }
    }
    /// Flip the visibility of a layer of the active panel, returning its new visibility.
    /// Not part of history.
    pub fn toggle_layer_visibility(&mut self, index: usize) -> Result<bool, EditError> {
        let layer = self
            .document
            .active_panel_mut()
            .layer_mut(index)
            .ok_or(EditError::NoSuchLayer(index))?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }
    /// Resize every layer of every panel. Discards all history.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EditError> {
        self.ensure_idle("resize")?;
        self.document.resize(width, height).map_err(|err| {
            log::warn!("resize: {err}");
            EditError::from(err)
        })?;
        self.engine.resize_scratch(width, height);
        Ok(())
    }

    /// Composite the active panel, with the line preview on top while one is being drawn.
    pub fn render(&mut self) -> &PixelBuffer {
        self.compositor
            .render(self.document.active_panel(), self.engine.preview())
    }
    /// A full-resolution composite of the panel at `index`, such as for a thumbnail.
    #[must_use]
    pub fn render_panel(&self, index: usize) -> Option<PixelBuffer> {
        self.document
            .panel(index)
            .map(|panel| Compositor::flatten(panel, None))
    }

    /// Serialize the document as project JSON. A stroke still in progress is not included.
    pub fn save_project(&self) -> Result<String, ProjectError> {
        let json = Project::from_document(&self.document, &self.project_name)?.to_json()?;
        log::info!("saved project {:?}", self.project_name);
        Ok(json)
    }
    /// Replace the document with one loaded from project JSON.
    /// On any failure, the current document is left exactly as it was.
    pub fn load_project(&mut self, json: &str) -> Result<(), EditError> {
        self.ensure_idle("load")?;
        let project = Project::from_json(json)?;
        let name = project.project_name.clone();
        let document = project.into_document().map_err(|err| {
            log::warn!("load failed: {err}");
            err
        })?;
        self.engine.resize_scratch(document.width(), document.height());
        self.document = document;
        if !name.is_empty() {
            self.project_name = name;
        }
        Ok(())
    }
}
impl Default for Editor {
    fn default() -> Self {
        Self::new(CanvasSize::default(), Settings::default().project_name)
    }
}
