//! Reconciliation engine: merges a loaded document into the live world.
//!
//! Order of work:
//!   1. Index mechanism and collectable records by id (first record wins;
//!      flag records follow the same rule when applied).
//!   2. Walk every live entity: a hit loads the record, a miss backfills
//!      the index with the entity's own `save()`.
//!   3. Apply global records through silent paths: resources, flags,
//!      replaced nodes, achievements, stats, logs.
//!
//! RULES:
//!   - Matching is exact and case-sensitive, one hash lookup per entity.
//!   - The entity phase is all-or-nothing. If any `load()` fails, every
//!     entity touched so far is restored from a pre-load snapshot, no
//!     global record is applied, and the error is returned.
//!   - Nothing here publishes a save request.

use crate::{
    entity::Saveable,
    error::SaveResult,
    records::{CollectableSaveData, KeyedRecord, MechanismSaveData},
    snapshot::GameState,
    world::LiveWorld,
};
use std::collections::{HashMap, HashSet};

/// Counts from one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Live entities that found and loaded their record.
    pub matched:            usize,
    /// Live entities with no record, backfilled from their own state.
    pub backfilled:         usize,
    /// Entity records whose id matched no live entity.
    pub stale_mechanisms:   usize,
    pub stale_collectables: usize,
    /// Flag records naming no registered flag.
    pub stale_flags:        usize,
    /// Log records naming no defined log entry.
    pub stale_logs:         usize,
    /// Resource records with a resource number this build does not know.
    pub unknown_resources:  usize,
    /// Records dropped because an earlier record had the same id.
    pub duplicate_records:  usize,
}

impl ReconcileReport {
    /// Every record that was read but not consumed.
    pub fn stale(&self) -> usize {
        self.stale_mechanisms
            + self.stale_collectables
            + self.stale_flags
            + self.stale_logs
            + self.unknown_resources
    }
}

/// The outcome of a successful reconciliation: the report plus the
/// post-backfill indexes, which now hold a record for every live entity.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub report:            ReconcileReport,
    pub mechanism_index:   HashMap<String, MechanismSaveData>,
    pub collectable_index: HashMap<String, CollectableSaveData>,
}

pub fn reconcile(world: &mut LiveWorld, document: GameState) -> SaveResult<Reconciliation> {
    let GameState {
        mechanisms,
        collectables,
        stats,
        achievements,
        replaced_nodes,
        resources,
        flags,
        logs,
        ..
    } = document;

    let mut report = ReconcileReport::default();
    let mut mechanism_index = build_index("mechanism", mechanisms, &mut report);
    let mut collectable_index = build_index("collectable", collectables, &mut report);

    // ── Entity phase (all-or-nothing) ──────────────────────────────
    let mechanisms_before = snapshot_entities(&world.mechanisms);
    let collectables_before = snapshot_entities(&world.collectables);

    let mechanism_pass = match apply_records(&mut world.mechanisms, &mut mechanism_index) {
        Ok(pass) => pass,
        Err(failure) => {
            restore_entities(&mut world.mechanisms, &mechanisms_before, failure.touched);
            return Err(failure.error);
        }
    };
    let collectable_pass = match apply_records(&mut world.collectables, &mut collectable_index) {
        Ok(pass) => pass,
        Err(failure) => {
            let every_mechanism = world.mechanisms.len();
            restore_entities(&mut world.collectables, &collectables_before, failure.touched);
            restore_entities(&mut world.mechanisms, &mechanisms_before, every_mechanism);
            return Err(failure.error);
        }
    };

    report.matched = mechanism_pass.matched + collectable_pass.matched;
    report.backfilled = mechanism_pass.backfilled + collectable_pass.backfilled;
    report.stale_mechanisms = mechanism_pass.stale;
    report.stale_collectables = collectable_pass.stale;

    // ── Global phase (silent paths only) ───────────────────────────
    report.unknown_resources = world.resources.apply(&resources);
    let applied_flags = world.flags.apply(&flags);
    report.stale_flags = applied_flags.stale;
    report.duplicate_records += applied_flags.duplicates;
    world.blueprints.restore_replaced_nodes(&replaced_nodes);
    world.achievements.set_completed(&achievements);
    world.stats.load_save_data(&stats);
    report.stale_logs = world.logs.load(&logs);

    log::debug!(
        "reconciled: matched={} backfilled={} stale={} duplicates={}",
        report.matched,
        report.backfilled,
        report.stale(),
        report.duplicate_records
    );

    Ok(Reconciliation {
        report,
        mechanism_index,
        collectable_index,
    })
}

/// id → record. A repeated id keeps its first record.
fn build_index<R: KeyedRecord>(
    label: &str,
    records: Vec<R>,
    report: &mut ReconcileReport,
) -> HashMap<String, R> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        let id = record.record_id().to_string();
        if index.contains_key(&id) {
            log::warn!("{label} record '{id}' appears more than once, keeping the first");
            report.duplicate_records += 1;
            continue;
        }
        index.insert(id, record);
    }
    index
}

struct PassCounts {
    matched:    usize,
    backfilled: usize,
    stale:      usize,
}

struct PassFailure {
    /// Entities [0, touched) may have changed and must be restored.
    touched: usize,
    error:   crate::error::SaveError,
}

fn apply_records<R: KeyedRecord>(
    entities: &mut [Box<dyn Saveable<R>>],
    index: &mut HashMap<String, R>,
) -> Result<PassCounts, PassFailure> {
    let mut counts = PassCounts { matched: 0, backfilled: 0, stale: 0 };
    let mut consumed: HashSet<String> = HashSet::with_capacity(entities.len());

    for (position, entity) in entities.iter_mut().enumerate() {
        let id = entity.save_id().to_string();
        match index.get(&id) {
            Some(record) => {
                if let Err(error) = entity.load(record) {
                    log::error!("{} '{id}' failed to load, rolling back: {error}", entity.kind());
                    return Err(PassFailure { touched: position + 1, error });
                }
                counts.matched += 1;
            }
            None => {
                log::debug!("{} '{id}' has no saved record, backfilling", entity.kind());
                index.insert(id.clone(), entity.save());
                counts.backfilled += 1;
            }
        }
        consumed.insert(id);
    }

    counts.stale = index.keys().filter(|id| !consumed.contains(*id)).count();
    if counts.stale > 0 {
        log::debug!("{} saved records matched no live entity", counts.stale);
    }
    Ok(counts)
}

fn snapshot_entities<R>(entities: &[Box<dyn Saveable<R>>]) -> Vec<R> {
    entities.iter().map(|e| e.save()).collect()
}

fn restore_entities<R>(entities: &mut [Box<dyn Saveable<R>>], before: &[R], touched: usize) {
    for (entity, record) in entities.iter_mut().zip(before).take(touched) {
        if let Err(e) = entity.load(record) {
            log::error!("{} '{}' could not be restored after a failed load: {e}", entity.kind(), entity.save_id());
        }
    }
}
