//! # IDs
//!
//! Panels and layers carry stable integer IDs which survive reordering and are written to project
//! files. Unlike positions, they are never reused within a document: panel IDs are handed out by a
//! per-document [`PanelIdCounter`] that only ever counts up.

/// Stable identity of a panel within a document.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PanelID(pub u64);

/// Stable identity of a layer within its panel.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerID(pub u32);

/// Monotonic source of [`PanelID`]s. Holds the *next* ID to be handed out.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PanelIdCounter(u64);
impl PanelIdCounter {
    /// A counter whose first ID will be `next`.
    #[must_use]
    pub fn starting_at(next: u64) -> Self {
        Self(next)
    }
    /// The value the next call to [`Self::allocate`] will return.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.0
    }
    /// Hand out a fresh ID.
    pub fn allocate(&mut self) -> PanelID {
        let id = PanelID(self.0);
        // A document would need to see 2^64 panel additions for this to matter.
        self.0 = self.0.saturating_add(1);
        id
    }
    /// Make sure the counter will never hand out `id` or anything below it.
    /// Returns `true` if the counter had to move.
    pub fn ensure_above(&mut self, id: PanelID) -> bool {
        let floor = id.0.saturating_add(1);
        if self.0 < floor {
            self.0 = floor;
            true
        } else {
            false
        }
    }
}
impl Default for PanelIdCounter {
    fn default() -> Self {
        Self(1)
    }
}

impl std::fmt::Display for PanelID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Panel#{}", self.0)
    }
}
impl std::fmt::Debug for PanelID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <PanelID as std::fmt::Display>::fmt(self, f)
    }
}
impl std::fmt::Display for LayerID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Layer#{}", self.0)
    }
}
impl std::fmt::Debug for LayerID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <LayerID as std::fmt::Display>::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::{PanelID, PanelIdCounter};
    #[test]
    fn monotonic() {
        let mut counter = PanelIdCounter::default();
        assert_eq!(counter.allocate(), PanelID(1));
        assert_eq!(counter.allocate(), PanelID(2));
        assert_eq!(counter.peek(), 3);
    }
    #[test]
    fn ensure_above_only_raises() {
        let mut counter = PanelIdCounter::starting_at(5);
        assert!(!counter.ensure_above(PanelID(2)));
        assert_eq!(counter.peek(), 5);
        assert!(counter.ensure_above(PanelID(9)));
        assert_eq!(counter.allocate(), PanelID(10));
    }
    #[test]
    fn display() {
        assert_eq!(PanelID(3).to_string(), "Panel#3");
        assert_eq!(format!("{:?}", super::LayerID(4)), "Layer#4");
    }
}
