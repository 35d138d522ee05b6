//! Multi-click classification.

use super::message::EventName;
use crate::geometry::Offset;

/// Thresholds for grouping pointer-ups into double and triple clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickConfig {
    /// Two ups must be closer than this Manhattan distance.
    pub max_distance: i32,
    /// Two ups must be fewer than this many animation ticks apart.
    pub max_ticks: u64,
}

impl ClickConfig {
    pub fn new() -> Self {
        Self { max_distance: 1, max_ticks: 15 }
    }

    /// Set the distance threshold (builder).
    pub fn with_max_distance(mut self, distance: i32) -> Self {
        self.max_distance = distance;
        self
    }

    /// Set the tick threshold (builder).
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = ticks;
        self
    }
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts consecutive pointer-ups that land close together in space and time.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    config: ClickConfig,
    last_up: Option<(Offset, u64)>,
    run: u32,
}

impl ClickTracker {
    pub fn new(config: ClickConfig) -> Self {
        Self { config, last_up: None, run: 0 }
    }

    /// Record a pointer-up and return the length of the current run.
    pub fn register(&mut self, at: Offset, tick: u64) -> u32 {
        let continues = self.last_up.is_some_and(|(pos, last_tick)| {
            pos.manhattan_distance(at) < self.config.max_distance
                && tick.saturating_sub(last_tick) < self.config.max_ticks
        });
        self.run = if continues { self.run + 1 } else { 1 };
        self.last_up = Some((at, tick));
        self.run
    }

    /// Forget the current run.
    pub fn reset(&mut self) {
        self.last_up = None;
        self.run = 0;
    }

    /// The event for a run of `count` ups.
    ///
    /// Double and triple clicks only go to targets that listen for them;
    /// otherwise the up is delivered as a plain click.
    pub fn classify(count: u32, target_listens: impl Fn(EventName) -> bool) -> EventName {
        let wanted = match count {
            0 | 1 => EventName::Click,
            2 => EventName::DoubleClick,
            _ => EventName::TripleClick,
        };
        if wanted == EventName::Click || target_listens(wanted) {
            wanted
        } else {
            EventName::Click
        }
    }
}
