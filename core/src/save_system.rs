//! The save system: wires assembler, store, reconciliation and scheduler.
//!
//! TRIGGERS (the only ways a save happens):
//!   - an explicit `save()` / `new_game()` call
//!   - a `FlagChanged` or `SaveRequested` event drained from the world bus
//!
//! LOAD SEQUENCE (driven by `tick()`):
//!   1. Scheduler counts down the requested delay and waits for world ready.
//!   2. Missing slot → new-game bootstrap: save the world's defaults first.
//!   3. Read the slot, reconcile it into the world, drop the document.
//!   4. Make the slot current and emit `LoadCompleted`, only after every
//!      step above succeeded. A failed load leaves the current slot alone.
//!
//! RULES:
//!   - Every mutating call takes `&mut self` and `&mut LiveWorld`; the
//!     borrow checker is the exclusive section around a slot's document.
//!   - Reconciliation uses silent paths, so no save can start mid-load.

use crate::{
    assembler::assemble,
    config::SaveConfig,
    error::{SaveError, SaveResult},
    event::{EventBus, SaveEvent},
    load_scheduler::{LoadScheduler, PendingLoad},
    reconciliation::{reconcile, ReconcileReport},
    store::{format_last_save, PrefsStore, SaveStore},
    types::{SlotName, Tick},
    world::LiveWorld,
};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// What a finished load did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub slot:         SlotName,
    /// The slot did not exist and was created from the live world first.
    pub bootstrapped: bool,
    pub report:       ReconcileReport,
}

pub struct SaveSystem {
    config:       SaveConfig,
    store:        SaveStore,
    prefs:        PrefsStore,
    scheduler:    LoadScheduler,
    bus:          EventBus,
    current_slot: SlotName,
    save_count:   u64,
}

impl SaveSystem {
    /// Build from config: slot files under `data_root`, preferences in
    /// `prefs_db` (or in memory).
    pub fn new(config: SaveConfig) -> SaveResult<Self> {
        let prefs = match &config.prefs_db {
            Some(path) => PrefsStore::open(path)?,
            None => PrefsStore::in_memory()?,
        };
        prefs.migrate()?;
        let store = SaveStore::from_config(&config);
        Ok(Self::with_stores(config, store, prefs))
    }

    pub fn with_stores(config: SaveConfig, store: SaveStore, prefs: PrefsStore) -> Self {
        let current_slot = config.default_slot.clone();
        Self {
            config,
            store,
            prefs,
            scheduler: LoadScheduler::new(),
            bus: EventBus::new(),
            current_slot,
            save_count: 0,
        }
    }

    /// Listen to every event the system emits or forwards.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&SaveEvent) + Send + 'static,
    {
        self.bus.subscribe(subscriber);
    }

    // ── Save ───────────────────────────────────────────────────────

    /// Rebuild the document from the world and write it to the current slot.
    pub fn save(&mut self, world: &LiveWorld) -> SaveResult<PathBuf> {
        let slot = self.current_slot.clone();
        self.save_to(slot, world)
    }

    fn save_to(&mut self, slot: SlotName, world: &LiveWorld) -> SaveResult<PathBuf> {
        let state = assemble(world);
        let path = self.store.write(&slot, &state)?;

        let saved_at = Utc::now();
        if let Err(e) = self.prefs.set_last_save(&slot, saved_at) {
            log::warn!("slot '{slot}' saved but its last-save time was not recorded: {e}");
        }
        self.save_count += 1;

        log::info!(
            "saved slot '{slot}': {} entities, {} flags -> {}",
            state.entity_record_count(),
            state.flags.len(),
            path.display()
        );
        self.bus.emit(SaveEvent::SaveCompleted { slot, saved_at });
        Ok(path)
    }

    /// Start a new game in `slot`: make it current and save the world's
    /// present (default) state into it.
    pub fn new_game(&mut self, slot: impl Into<SlotName>, world: &LiveWorld) -> SaveResult<PathBuf> {
        let slot = slot.into();
        self.store.slot_path(&slot)?;
        self.current_slot = slot;
        self.save(world)
    }

    /// Drain the world's bus: forward every event to subscribers and save
    /// once per save-requesting event. Returns the number of saves made.
    ///
    /// A failed save does not stop the drain. Every event is still
    /// forwarded and every later request still tries to save; the first
    /// error is returned once the queue is empty.
    pub fn pump(&mut self, world: &mut LiveWorld) -> SaveResult<usize> {
        let mut saves = 0;
        let mut first_error = None;
        for event in world.bus.drain() {
            let wants_save = event.requests_save();
            let kind = event.kind();
            self.bus.emit(event);
            if !wants_save {
                continue;
            }
            match self.save(world) {
                Ok(_) => saves += 1,
                Err(e) => {
                    log::error!("save requested by {kind} failed: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(saves),
        }
    }

    /// Set a flag with notification and handle the resulting save now.
    pub fn set_flag(&mut self, world: &mut LiveWorld, id: &str, state: bool) -> SaveResult<bool> {
        let changed = world.set_flag(id, state);
        self.pump(world)?;
        Ok(changed)
    }

    // ── Load ───────────────────────────────────────────────────────

    /// Load `slot` after `delay` ticks. Only one load may be in flight.
    pub fn schedule_load(&mut self, slot: impl Into<SlotName>, delay: Tick) -> SaveResult<()> {
        let slot = slot.into();
        self.store.slot_path(&slot)?;
        self.scheduler.schedule(slot.clone(), delay)?;
        self.bus.emit(SaveEvent::LoadScheduled { slot, delay });
        Ok(())
    }

    /// Load the configured default slot with the configured delay.
    pub fn schedule_default_load(&mut self) -> SaveResult<()> {
        let slot = self.config.default_slot.clone();
        self.schedule_load(slot, self.config.load_delay_ticks)
    }

    /// Abandon a load that has not started yet.
    pub fn cancel_load(&mut self) -> SaveResult<SlotName> {
        let slot = self.scheduler.cancel()?;
        self.bus.emit(SaveEvent::LoadCancelled { slot: slot.clone() });
        Ok(slot)
    }

    pub fn pending_load(&self) -> Option<&PendingLoad> {
        self.scheduler.pending()
    }

    /// Advance one tick: handle queued save requests, then run the
    /// scheduled load if it is due. Returns the load's outcome when one ran.
    pub fn tick(&mut self, world: &mut LiveWorld) -> SaveResult<Option<LoadOutcome>> {
        self.pump(world)?;

        let Some(slot) = self.scheduler.tick(world.is_ready()) else {
            return Ok(None);
        };
        let result = self.run_load(&slot, world);
        self.scheduler.finish();

        match result {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                log::error!("load of slot '{slot}' failed: {e}");
                self.bus.emit(SaveEvent::LoadFailed {
                    slot,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Run ticks until the pending load finishes or `max_ticks` pass.
    pub fn run_until_loaded(
        &mut self,
        world: &mut LiveWorld,
        max_ticks: Tick,
    ) -> SaveResult<Option<LoadOutcome>> {
        for _ in 0..max_ticks {
            if let Some(outcome) = self.tick(world)? {
                return Ok(Some(outcome));
            }
            if self.scheduler.is_idle() {
                break;
            }
        }
        Ok(None)
    }

    /// The loaded slot becomes current only once reconciliation succeeded,
    /// so later saves never land in a slot whose load failed.
    fn run_load(&mut self, slot: &str, world: &mut LiveWorld) -> SaveResult<LoadOutcome> {
        let bootstrapped = !self.store.exists(slot)?;
        if bootstrapped {
            log::info!("slot '{slot}' not found, starting a new game");
            self.save_to(slot.to_string(), world)?;
        }

        let document = self.store.read(slot)?;
        let report = reconcile(world, document)?.report;
        self.current_slot = slot.to_string();

        log::info!(
            "loaded slot '{slot}': matched={} backfilled={} stale={}",
            report.matched,
            report.backfilled,
            report.stale()
        );
        self.bus.emit(SaveEvent::LoadCompleted {
            slot:       slot.to_string(),
            matched:    report.matched,
            backfilled: report.backfilled,
            stale:      report.stale(),
        });

        Ok(LoadOutcome {
            slot: slot.to_string(),
            bootstrapped,
            report,
        })
    }

    // ── Slots ──────────────────────────────────────────────────────

    /// Delete a slot and forget its last-save time. A load of that slot in
    /// flight is not affected until it reads.
    pub fn reset_slot(&mut self, slot: &str) -> SaveResult<bool> {
        let removed = self.store.delete(slot)?;
        self.prefs.clear_last_save(slot)?;
        log::info!("reset slot '{slot}' (file removed: {removed})");
        self.bus.emit(SaveEvent::SlotReset { slot: slot.to_string() });
        Ok(removed)
    }

    pub fn last_save(&self, slot: &str) -> SaveResult<Option<DateTime<Utc>>> {
        self.prefs.last_save(slot)
    }

    /// "HH:mm, Month d" of the slot's last save, or "..." if never saved.
    pub fn last_save_display(&self, slot: &str) -> SaveResult<String> {
        Ok(format_last_save(self.last_save(slot)?))
    }

    pub fn slots(&self) -> SaveResult<Vec<String>> {
        self.store.list_slots()
    }

    pub fn current_slot(&self) -> &str {
        &self.current_slot
    }

    /// Make `slot` the target of subsequent saves.
    pub fn select_slot(&mut self, slot: impl Into<SlotName>) -> SaveResult<()> {
        let slot = slot.into();
        if !self.scheduler.is_idle() {
            return Err(SaveError::LoadInFlight { slot });
        }
        self.store.slot_path(&slot)?;
        self.current_slot = slot;
        Ok(())
    }

    /// Saves written since this system was built.
    pub fn save_count(&self) -> u64 {
        self.save_count
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.scheduler.current_tick()
    }
}
