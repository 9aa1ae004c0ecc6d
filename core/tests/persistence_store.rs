//! Persistence store tests.
//!
//! Tests cover: field-for-field round trip, on-disk field names,
//! NotFound / Deserialization / WriteFailed conditions, slot naming,
//! delete and listing.

use savestate_core::{
    error::SaveError,
    progress::PlayerStats,
    records::{
        CollectableSaveData, LogSaveData, MechanismSaveData, ReplacedNodeSaveData,
        ResourceSaveData, SaveFlagSaveData,
    },
    snapshot::{GameState, SAVE_VERSION},
    store::SaveStore,
};
use serde_json::json;
use std::fs;

fn store_in(dir: &tempfile::TempDir) -> SaveStore {
    SaveStore::new(dir.path(), "JSON")
}

/// A document with every collection populated.
fn full_document() -> GameState {
    let mut stats = PlayerStats::new();
    stats.set("floppies_inserted", 3.0);
    stats.set("distance_walked", 1234.5);

    GameState {
        mechanisms: vec![
            MechanismSaveData { id: "door-1".into(), state: json!({ "is_open": true, "locked": false }) },
            MechanismSaveData { id: "lever-main".into(), state: json!({ "is_on": false, "value": 0.25 }) },
        ],
        collectables: vec![CollectableSaveData {
            id:    "floppy-intro".into(),
            state: json!({ "state": "trash" }),
        }],
        stats,
        achievements: vec!["first-boot".into(), "reactor-online".into()],
        replaced_nodes: vec![ReplacedNodeSaveData {
            mechanism_id:   "lever-main".into(),
            achievement_id: "reactor-online".into(),
            x: 2,
            y: -1,
        }],
        resources: vec![
            ResourceSaveData { resource: 0, current_amount: 12.75 },
            ResourceSaveData { resource: 2, current_amount: 0.1 },
        ],
        flags: vec![
            SaveFlagSaveData { flag_id: "door-open".into(), is_set: true },
            SaveFlagSaveData { flag_id: "lights-on".into(), is_set: false },
        ],
        logs: vec![LogSaveData {
            log_id:            "log-intro".into(),
            is_complete:       true,
            is_read:           false,
            time_completed_at: 1_710_000_000_123,
        }],
        ..GameState::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Round trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn write_then_read_returns_an_equal_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let document = full_document();

    store.write("save", &document).expect("write");
    let loaded = store.read("save").expect("read");

    assert_eq!(loaded, document);
    assert_eq!(loaded.version, SAVE_VERSION);
}

#[test]
fn empty_document_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.write("empty", &GameState::default()).unwrap();
    assert_eq!(store.read("empty").unwrap(), GameState::default());
}

#[test]
fn document_uses_the_stable_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let path = store.write("save", &full_document()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    for key in [
        "\"mechanismSaves\"",
        "\"collectableSaves\"",
        "\"resourceSaveData\"",
        "\"saveFlagSaves\"",
        "\"logSaves\"",
        "\"replacedNodes\"",
        "\"achievements\"",
        "\"stats\"",
        "\"currentAmount\"",
        "\"FlagID\"",
        "\"IsSet\"",
        "\"LogID\"",
        "\"TimeCompletedAt\"",
        "\"mechanismID\"",
        "\"achievementID\"",
    ] {
        assert!(text.contains(key), "document is missing {key}:\n{text}");
    }
    assert!(text.contains('\n'), "document should be pretty-printed");
}

#[test]
fn slot_path_is_root_slot_and_extension() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert_eq!(store.slot_path("demoV3").unwrap(), dir.path().join("demoV3.JSON"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Error conditions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reading_a_missing_slot_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let err = store.read("never-written").unwrap_err();
    assert!(
        matches!(err, SaveError::SlotNotFound { ref slot } if slot == "never-written"),
        "got {err:?}"
    );
}

#[test]
fn unparseable_content_is_a_deserialization_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.slot_path("save").unwrap(), "{ this is not json").unwrap();

    let err = store.read("save").unwrap_err();
    assert!(matches!(err, SaveError::Deserialization { .. }), "got {err:?}");
}

#[test]
fn wrong_shape_is_a_deserialization_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    // Valid JSON, but the collections are missing.
    fs::write(store.slot_path("save").unwrap(), r#"{ "version": 1, "stats": {} }"#).unwrap();

    let err = store.read("save").unwrap_err();
    assert!(matches!(err, SaveError::Deserialization { .. }), "got {err:?}");
}

#[test]
fn failed_write_leaves_existing_content_intact() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    // Occupy the slot path with a non-empty directory so the final
    // replace step cannot succeed.
    let slot_path = store.slot_path("save").unwrap();
    fs::create_dir(&slot_path).unwrap();
    fs::write(slot_path.join("keep.txt"), "original").unwrap();

    let err = store.write("save", &full_document()).unwrap_err();
    assert!(matches!(err, SaveError::WriteFailed { .. }), "got {err:?}");

    assert_eq!(fs::read_to_string(slot_path.join("keep.txt")).unwrap(), "original");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp file left behind: {leftovers:?}");
}

#[test]
fn non_finite_amount_is_refused_and_the_slot_stays_readable() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let original = full_document();
    store.write("save", &original).unwrap();

    let mut broken = full_document();
    broken.resources[0].current_amount = f32::NAN;
    let err = store.write("save", &broken).unwrap_err();
    assert!(matches!(err, SaveError::Serialization(_)), "got {err:?}");

    let mut infinite_stat = full_document();
    infinite_stat.stats.set("distance_walked", f64::INFINITY);
    let err = store.write("save", &infinite_stat).unwrap_err();
    assert!(matches!(err, SaveError::Serialization(_)), "got {err:?}");

    assert_eq!(store.read("save").unwrap(), original);
}

#[test]
fn slot_names_must_be_a_single_component() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    for bad in ["", "..", "../escape", "a/b", "a\\b", ".hidden"] {
        let err = store.write(bad, &GameState::default()).unwrap_err();
        assert!(matches!(err, SaveError::InvalidSlotName { .. }), "{bad:?} gave {err:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slot management
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn delete_and_list_slots() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.write("beta", &GameState::default()).unwrap();
    store.write("alpha", &GameState::default()).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a slot").unwrap();

    assert_eq!(store.list_slots().unwrap(), vec!["alpha".to_string(), "beta".to_string()]);

    assert!(store.delete("alpha").unwrap());
    assert!(!store.delete("alpha").unwrap(), "deleting twice is not an error");
    assert!(!store.exists("alpha").unwrap());
    assert_eq!(store.list_slots().unwrap(), vec!["beta".to_string()]);
}

#[test]
fn missing_root_lists_no_slots() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("not-created-yet"), "JSON");
    assert!(store.list_slots().unwrap().is_empty());
}
