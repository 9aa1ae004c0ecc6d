//! Load scheduler: holds a requested load back for a number of ticks.
//!
//! A load scheduled with delay `n` stays suspended for exactly `n` ticks
//! and becomes due on tick `n + 1`, so a zero delay runs on the next tick,
//! never inside the call that scheduled it. A due load also waits for the
//! world to report ready. Only one load may be pending or running at a time.

use crate::{
    clock::TickClock,
    error::{SaveError, SaveResult},
    types::{SlotName, Tick},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub slot:         SlotName,
    pub requested_at: Tick,
    pub delay:        Tick,
    remaining:        Tick,
}

impl PendingLoad {
    pub fn remaining(&self) -> Tick {
        self.remaining
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadPhase {
    Idle,
    Waiting(PendingLoad),
    Running(SlotName),
}

#[derive(Debug, Clone)]
pub struct LoadScheduler {
    clock: TickClock,
    phase: LoadPhase,
}

impl Default for LoadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadScheduler {
    pub fn new() -> Self {
        Self {
            clock: TickClock::new(),
            phase: LoadPhase::Idle,
        }
    }

    /// Queue a load of `slot` after `delay` ticks.
    /// Rejected while another load is pending or running.
    pub fn schedule(&mut self, slot: impl Into<SlotName>, delay: Tick) -> SaveResult<()> {
        let slot = slot.into();
        if let LoadPhase::Waiting(PendingLoad { slot: busy, .. }) | LoadPhase::Running(busy) = &self.phase {
            log::warn!("load of '{slot}' rejected: '{busy}' is already in flight");
            return Err(SaveError::LoadInFlight { slot: busy.clone() });
        }
        log::debug!("tick={} load of '{slot}' scheduled in {delay} ticks", self.clock.current_tick);
        self.phase = LoadPhase::Waiting(PendingLoad {
            slot,
            requested_at: self.clock.current_tick,
            delay,
            remaining: delay,
        });
        Ok(())
    }

    /// Abandon the pending load. A load that already started cannot be
    /// cancelled.
    pub fn cancel(&mut self) -> SaveResult<SlotName> {
        match std::mem::replace(&mut self.phase, LoadPhase::Idle) {
            LoadPhase::Waiting(pending) => {
                log::debug!("tick={} load of '{}' cancelled", self.clock.current_tick, pending.slot);
                Ok(pending.slot)
            }
            LoadPhase::Running(slot) => {
                self.phase = LoadPhase::Running(slot.clone());
                Err(SaveError::LoadInFlight { slot })
            }
            LoadPhase::Idle => Err(SaveError::NoPendingLoad),
        }
    }

    /// Advance one tick. Returns the slot whose load starts now; from then
    /// on the scheduler stays busy until `finish()`.
    pub fn tick(&mut self, world_ready: bool) -> Option<SlotName> {
        let now = self.clock.advance()?;
        let LoadPhase::Waiting(pending) = &mut self.phase else {
            return None;
        };
        if pending.remaining > 0 {
            pending.remaining -= 1;
            return None;
        }
        if !world_ready {
            log::trace!("tick={now} load of '{}' due, waiting for world", pending.slot);
            return None;
        }
        let slot = pending.slot.clone();
        self.phase = LoadPhase::Running(slot.clone());
        log::debug!("tick={now} load of '{slot}' starting");
        Some(slot)
    }

    /// Mark the running load as done, successful or not.
    pub fn finish(&mut self) {
        if let LoadPhase::Running(slot) = &self.phase {
            log::trace!("load of '{slot}' finished");
            self.phase = LoadPhase::Idle;
        }
    }

    pub fn pending(&self) -> Option<&PendingLoad> {
        match &self.phase {
            LoadPhase::Waiting(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == LoadPhase::Idle
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Pause the clock; a paused scheduler does not count down.
    pub fn pause(&mut self)  { self.clock.pause();  }
    pub fn resume(&mut self) { self.clock.resume(); }
}
