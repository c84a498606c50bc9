//! # Layers
//!
//! One independently-undoable raster surface. The live buffer is what tools paint into while a
//! gesture is underway; the history holds committed snapshots. Between gestures, the buffer always
//! equals the history's present entry.

use crate::{
    buffer::{PixelBuffer, Snapshot},
    history::History,
    id::LayerID,
};

pub struct Layer {
    id: LayerID,
    pub name: String,
    pub visible: bool,
    buffer: PixelBuffer,
    history: History<Snapshot>,
}
impl Layer {
    /// A visible, transparent layer of the given size.
    #[must_use]
    pub fn new(id: LayerID, name: String, width: u32, height: u32) -> Self {
        Self::from_buffer(id, name, true, PixelBuffer::new(width, height))
    }
    /// Wrap an existing buffer. It becomes the sole history entry.
    #[must_use]
    pub fn from_buffer(id: LayerID, name: String, visible: bool, buffer: PixelBuffer) -> Self {
        let history = History::new(buffer.snapshot());
        Self {
            id,
            name,
            visible,
            buffer,
            history,
        }
    }
    #[must_use]
    pub fn id(&self) -> LayerID {
        self.id
    }
    /// The live contents. Includes any uncommitted painting.
    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
    /// Mutable access to the live contents, for painting.
    /// Changes are not part of history until [`Self::commit`].
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }
    /// Record the live buffer as a new history entry, discarding any redo-able entries.
    pub fn commit(&mut self) {
        // Length after truncating redo entries and pushing.
        let pushed_len = self.history.cursor() + 2;
        self.history.push(self.buffer.snapshot());
        if pushed_len > self.history.limit().get() {
            log::debug!("{} history full, evicted oldest entry", self.id);
        }
        log::debug!(
            "{} committed, history {}/{}",
            self.id,
            self.history.cursor() + 1,
            self.history.len()
        );
    }
    /// Restore the previous history entry. Returns `false` (and changes nothing) if already at the oldest.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.buffer.restore(snapshot);
        true
    }
    /// Restore the next history entry. Returns `false` (and changes nothing) if already at the newest.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.buffer.restore(snapshot);
        true
    }
    /// Throw away uncommitted painting, returning to the present history entry.
    pub fn revert(&mut self) {
        self.buffer.restore(self.history.current());
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
    #[must_use]
    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }
    /// The committed state, ignoring uncommitted painting.
    #[must_use]
    pub fn committed(&self) -> &Snapshot {
        self.history.current()
    }
    /// A copy of this layer at a new size, content anchored top-left.
    /// History does not carry over: the resized content becomes the only entry.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self::from_buffer(
            self.id,
            self.name.clone(),
            self.visible,
            self.buffer.resized(width, height),
        )
    }
}

#[cfg(test)]
mod test {
    use super::Layer;
    use crate::{color::Color, history::MAX_ENTRIES, id::LayerID};

    fn layer() -> Layer {
        Layer::new(LayerID(1), "Layer 1".into(), 8, 8)
    }
    #[test]
    fn fresh_layer_has_one_entry() {
        let layer = layer();
        assert_eq!(layer.history_len(), 1);
        assert_eq!(layer.history_cursor(), 0);
        assert!(!layer.can_undo());
        assert!(!layer.can_redo());
        assert!(layer.buffer().is_clear());
    }
    #[test]
    fn undo_redo_pixel_exact() {
        let mut layer = layer();
        let mut states = vec![layer.buffer().snapshot()];
        for i in 0..5u8 {
            layer
                .buffer_mut()
                .put(u32::from(i), 0, Color::new(i, 0, 0, 255));
            layer.commit();
            states.push(layer.buffer().snapshot());
        }
        for n in 1..=5 {
            for _ in 0..n {
                assert!(layer.undo());
            }
            assert!(states[5 - n].matches(layer.buffer()));
            for k in 1..=n {
                assert!(layer.redo());
                assert!(states[5 - n + k].matches(layer.buffer()));
            }
        }
    }
    #[test]
    fn undo_at_oldest_is_noop() {
        let mut layer = layer();
        layer.buffer_mut().put(0, 0, Color::BLACK);
        layer.commit();
        assert!(layer.undo());
        let before = layer.buffer().snapshot();
        assert!(!layer.undo());
        assert!(before.matches(layer.buffer()));
        assert!(layer.redo());
        assert!(!layer.redo());
        assert_eq!(layer.buffer().get(0, 0), Some(Color::BLACK));
    }
    #[test]
    fn history_capped() {
        let mut layer = layer();
        for i in 0..(MAX_ENTRIES as u32 + 10) {
            layer.buffer_mut().put(i % 8, i / 8 % 8, Color::BLACK);
            layer.commit();
            assert!(layer.history_len() <= MAX_ENTRIES);
        }
        assert_eq!(layer.history_cursor(), MAX_ENTRIES - 1);
        assert!(layer.committed().matches(layer.buffer()));
    }
    #[test]
    fn revert_drops_uncommitted() {
        let mut layer = layer();
        layer.buffer_mut().put(3, 3, Color::BLACK);
        layer.revert();
        assert!(layer.buffer().is_clear());
    }
    #[test]
    fn resize_resets_history() {
        let mut layer = layer();
        layer.buffer_mut().put(1, 1, Color::BLACK);
        layer.commit();
        layer.buffer_mut().put(7, 7, Color::BLACK);
        layer.commit();

        let resized = layer.resized(4, 12);
        assert_eq!(resized.buffer().size(), [4, 12]);
        assert_eq!(resized.history_len(), 1);
        assert_eq!(resized.buffer().get(1, 1), Some(Color::BLACK));
        assert_eq!(resized.id(), layer.id());
    }
}
