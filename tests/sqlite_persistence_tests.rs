#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use rollout_tool::persistence::{NOTES_TEXT_KEY, PLAN_KEY};
use rollout_tool::{GroupPlanStore, RolloutPlan, SqliteGroupStore, generate_plan};
use serde_json::Value;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plan() -> RolloutPlan {
    generate_plan("SQLite Cohort", 9, "03/02/2025").unwrap()
}

#[test]
fn sqlite_store_round_trip_plan() {
    let file = NamedTempFile::new().unwrap();
    let plan = plan();
    {
        let store = SqliteGroupStore::new(file.path()).expect("open store");
        store.save_plan("grp-1", &plan).expect("save plan");
    }

    let store = SqliteGroupStore::new(file.path()).expect("reopen store");
    let loaded = store
        .load_plan("grp-1")
        .expect("load plan")
        .expect("plan exists");
    assert_eq!(loaded, plan);

    let dates = store.module_dates("grp-1").unwrap();
    assert_eq!(dates.len(), 6);
    assert_eq!(dates[1].start, Some(d(2025, 3, 31)));
    assert_eq!(dates[5].end, Some(d(2026, 2, 11)));
}

#[test]
fn sqlite_store_keeps_existing_notes() {
    let store = SqliteGroupStore::in_memory().unwrap();
    store.set_notes("grp-1", "venue: boardroom").unwrap();
    store.save_plan("grp-1", &plan()).unwrap();

    let notes: Value = serde_json::from_str(&store.notes("grp-1").unwrap().unwrap()).unwrap();
    assert_eq!(notes[NOTES_TEXT_KEY], "venue: boardroom");
    assert_eq!(notes[PLAN_KEY]["learnerCount"], 9);
}

#[test]
fn sqlite_store_overlays_json_notes() {
    let store = SqliteGroupStore::in_memory().unwrap();
    store
        .set_notes("grp-1", r#"{"mentor":"A. Smith"}"#)
        .unwrap();
    store.save_plan("grp-1", &plan()).unwrap();
    let later = generate_plan("SQLite Cohort", 9, "07/04/2025").unwrap();
    store.save_plan("grp-1", &later).unwrap();

    let notes: Value = serde_json::from_str(&store.notes("grp-1").unwrap().unwrap()).unwrap();
    assert_eq!(notes["mentor"], "A. Smith");
    assert_eq!(notes[PLAN_KEY]["programStartDate"], "07/04/2025");
    assert_eq!(
        store.module_dates("grp-1").unwrap()[0].start,
        Some(d(2025, 4, 7))
    );
}

#[test]
fn sqlite_store_unknown_group() {
    let store = SqliteGroupStore::in_memory().unwrap();
    assert_eq!(store.notes("missing").unwrap(), None);
    assert!(store.module_dates("missing").unwrap().is_empty());
    assert_eq!(store.load_plan("missing").unwrap(), None);
}

#[test]
fn sqlite_group_without_plan_has_no_dates() {
    let store = SqliteGroupStore::in_memory().unwrap();
    store.set_notes("grp-2", "just notes").unwrap();
    assert!(store.module_dates("grp-2").unwrap().is_empty());
    assert_eq!(store.load_plan("grp-2").unwrap(), None);
}

#[test]
fn sqlite_completions_are_ordered_and_deduplicated() {
    let store = SqliteGroupStore::in_memory().unwrap();
    store
        .mark_completed("grp-1", &["9010".to_string(), "119472".to_string()])
        .unwrap();
    store
        .mark_completed("grp-1", &["9010".to_string(), "7456".to_string()])
        .unwrap();
    store.mark_completed("grp-2", &["116932".to_string()]).unwrap();

    assert_eq!(
        store.completed_topics("grp-1").unwrap(),
        vec!["9010", "119472", "7456"]
    );
    assert_eq!(store.completed_topics("grp-2").unwrap(), vec!["116932"]);
}
