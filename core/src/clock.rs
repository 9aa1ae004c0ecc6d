//! Tick clock: counts cooperative scheduling steps.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickClock {
    pub current_tick: Tick,
    pub paused:       bool,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick. Returns the new tick number, or `None` while paused.
    pub fn advance(&mut self) -> Option<Tick> {
        if self.paused {
            return None;
        }
        self.current_tick += 1;
        Some(self.current_tick)
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    /// Ticks elapsed since `since`; zero if `since` is in the future.
    pub fn elapsed_since(&self, since: Tick) -> Tick {
        self.current_tick.saturating_sub(since)
    }
}
