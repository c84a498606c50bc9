//! Pointer input, already mapped from view space into canvas pixel coordinates.

use crate::stroke::{Sample, DEFAULT_PRESSURE};

#[derive(strum::AsRefStr, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum EventKind {
    Down,
    Move,
    Up,
    /// The pointer was lost mid-gesture, e.g. it left the canvas or another app took it.
    /// Treated like [`EventKind::Up`].
    Cancel,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct InputEvent {
    pub kind: EventKind,
    pub x: f32,
    pub y: f32,
    /// `None` for devices without pressure sensing.
    pub pressure: Option<f32>,
}
impl InputEvent {
    #[must_use]
    pub fn new(kind: EventKind, x: f32, y: f32, pressure: Option<f32>) -> Self {
        Self {
            kind,
            x,
            y,
            pressure,
        }
    }
    #[must_use]
    pub fn down(x: f32, y: f32, pressure: f32) -> Self {
        Self::new(EventKind::Down, x, y, Some(pressure))
    }
    #[must_use]
    pub fn moved(x: f32, y: f32, pressure: f32) -> Self {
        Self::new(EventKind::Move, x, y, Some(pressure))
    }
    #[must_use]
    pub fn up(x: f32, y: f32, pressure: f32) -> Self {
        Self::new(EventKind::Up, x, y, Some(pressure))
    }
    #[must_use]
    pub fn cancel(x: f32, y: f32) -> Self {
        Self::new(EventKind::Cancel, x, y, None)
    }
    /// The stroke sample this event describes. Missing or zero pressure reads as
    /// [`DEFAULT_PRESSURE`], since many devices report zero when they mean "unknown".
    #[must_use]
    pub fn sample(&self) -> Sample {
        let pressure = match self.pressure {
            Some(p) if p > 0.0 => p,
            _ => DEFAULT_PRESSURE,
        };
        Sample::new(self.x, self.y, pressure)
    }
}
