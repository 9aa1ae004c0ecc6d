//! Flag registry tests.
//!
//! Tests cover: duplicate registration, unknown ids, notify vs silent
//! paths, and applying loaded records.

use savestate_core::{
    error::SaveError,
    event::{EventBus, SaveEvent},
    flag_registry::{FlagRegistry, SaveFlag},
    records::SaveFlagSaveData,
};

fn registry_with(ids: &[&str]) -> FlagRegistry {
    let mut registry = FlagRegistry::new();
    for id in ids {
        registry
            .register(SaveFlag::new(*id, format!("owner-of-{id}")))
            .expect("register");
    }
    registry
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn duplicate_registration_keeps_the_first_flag() {
    let mut registry = FlagRegistry::new();
    registry
        .register(SaveFlag::new("door-open", "west door").with_state(true))
        .unwrap();

    let err = registry
        .register(SaveFlag::new("door-open", "east door"))
        .unwrap_err();

    match err {
        SaveError::DuplicateFlag { id, existing_owner, new_owner } => {
            assert_eq!(id, "door-open");
            assert_eq!(existing_owner, "west door");
            assert_eq!(new_owner, "east door");
        }
        other => panic!("expected DuplicateFlag, got {other:?}"),
    }

    assert_eq!(registry.len(), 1);
    let flag = registry.get("door-open").unwrap();
    assert_eq!(flag.owner, "west door", "first registration must stay authoritative");
    assert!(flag.is_set());
}

#[test]
fn ids_are_case_sensitive() {
    let mut registry = registry_with(&["Door-Open"]);
    registry.register(SaveFlag::new("door-open", "other")).unwrap();
    assert_eq!(registry.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Setting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unknown_flag_is_a_silent_no_op() {
    let mut registry = registry_with(&["door-open"]);
    let mut bus = EventBus::new();

    let changed = registry.set_flag("never-registered", true, true, &mut bus);

    assert!(!changed);
    assert_eq!(bus.pending(), 0, "no event for an unregistered flag");
    assert_eq!(registry.is_set("never-registered"), None);
}

#[test]
fn notifying_change_publishes_one_event() {
    let mut registry = registry_with(&["door-open"]);
    let mut bus = EventBus::new();

    assert!(registry.set_flag("door-open", true, true, &mut bus));
    // Setting the same state again is not a change.
    assert!(!registry.set_flag("door-open", true, true, &mut bus));

    let events = bus.drain();
    assert_eq!(
        events,
        vec![SaveEvent::FlagChanged { flag_id: "door-open".into(), is_set: true }]
    );
}

#[test]
fn silent_paths_never_publish() {
    let mut registry = registry_with(&["door-open", "lights-on"]);
    let mut bus = EventBus::new();

    registry.set_flag("door-open", true, false, &mut bus);
    registry.set_silent("lights-on", true);

    assert_eq!(bus.pending(), 0);
    assert_eq!(registry.is_set("door-open"), Some(true));
    assert_eq!(registry.is_set("lights-on"), Some(true));
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn records_follow_registration_order() {
    let mut registry = registry_with(&["c", "a", "b"]);
    registry.set_silent("a", true);

    let ids: Vec<_> = registry.records().into_iter().map(|r| (r.flag_id, r.is_set)).collect();
    assert_eq!(
        ids,
        vec![("c".to_string(), false), ("a".to_string(), true), ("b".to_string(), false)]
    );
}

#[test]
fn apply_counts_stale_records() {
    let mut registry = registry_with(&["door-open"]);
    let records = vec![
        SaveFlagSaveData { flag_id: "door-open".into(), is_set: true },
        SaveFlagSaveData { flag_id: "lights-on".into(), is_set: true },
    ];

    let applied = registry.apply(&records);

    assert_eq!(applied.stale, 1);
    assert_eq!(applied.duplicates, 0);
    assert_eq!(registry.is_set("door-open"), Some(true));
    assert_eq!(registry.len(), 1, "stale records must not create flags");
}

#[test]
fn apply_keeps_the_first_of_repeated_records() {
    let mut registry = registry_with(&["door-open"]);
    let records = vec![
        SaveFlagSaveData { flag_id: "door-open".into(), is_set: true },
        SaveFlagSaveData { flag_id: "door-open".into(), is_set: false },
        SaveFlagSaveData { flag_id: "lights-on".into(), is_set: true },
        SaveFlagSaveData { flag_id: "lights-on".into(), is_set: false },
    ];

    let applied = registry.apply(&records);

    assert_eq!(registry.is_set("door-open"), Some(true));
    assert_eq!(applied.duplicates, 2);
    assert_eq!(applied.stale, 1, "a repeated stale record is counted once");
}
