use chrono::NaiveDate;
use rollout_tool::persistence::{NOTES_TEXT_KEY, PLAN_KEY, extract_plan_value};
use rollout_tool::{
    GroupPlanStore, MemoryGroupStore, ModuleDates, RolloutPlan, export_plan_to_csv,
    generate_plan, load_plan_from_json, merge_plan_into_notes, save_plan_to_json,
};
use serde_json::Value;
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plan() -> RolloutPlan {
    generate_plan("Cohort A", 12, "03/02/2025").unwrap()
}

#[test]
fn merge_into_empty_notes_creates_object() {
    let plan = plan();
    for existing in [None, Some(""), Some("   ")] {
        let merged = merge_plan_into_notes(existing, &plan).unwrap();
        let value: Value = serde_json::from_str(&merged).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[PLAN_KEY]["groupLabel"], "Cohort A");
    }
}

#[test]
fn merge_preserves_other_keys() {
    let plan = plan();
    let existing = r#"{"facilitator":"T. Ndlovu","rolloutPlan":{"stale":true}}"#;
    let merged = merge_plan_into_notes(Some(existing), &plan).unwrap();
    let value: Value = serde_json::from_str(&merged).unwrap();
    assert_eq!(value["facilitator"], "T. Ndlovu");
    assert!(value[PLAN_KEY].get("stale").is_none());
    assert_eq!(value[PLAN_KEY]["programStartDate"], "03/02/2025");
}

#[test]
fn merge_wraps_plain_text_notes() {
    let plan = plan();
    for existing in ["call the employer on Friday", "[1, 2, 3]"] {
        let merged = merge_plan_into_notes(Some(existing), &plan).unwrap();
        let value: Value = serde_json::from_str(&merged).unwrap();
        assert_eq!(value[NOTES_TEXT_KEY], existing);
        assert!(value.get(PLAN_KEY).is_some());
    }
}

#[test]
fn extract_returns_embedded_plan_only() {
    let plan = plan();
    let merged = merge_plan_into_notes(Some("hello"), &plan).unwrap();
    let extracted = extract_plan_value(&merged).unwrap();
    let back: RolloutPlan = serde_json::from_value(extracted).unwrap();
    assert_eq!(back, plan);

    assert!(extract_plan_value("plain").is_none());
    assert!(extract_plan_value(r#"{"other":1}"#).is_none());
}

#[test]
fn memory_store_saves_dates_and_notes() {
    let store = MemoryGroupStore::new();
    let plan = plan();
    store.set_notes("g1", "bring laptops").unwrap();
    store.save_plan("g1", &plan).unwrap();

    let dates = store.module_dates("g1").unwrap();
    assert_eq!(dates.len(), 6);
    assert_eq!(
        dates[0],
        ModuleDates {
            module_number: 1,
            start: Some(d(2025, 2, 3)),
            end: Some(d(2025, 3, 5)),
        }
    );

    let notes: Value = serde_json::from_str(&store.notes("g1").unwrap().unwrap()).unwrap();
    assert_eq!(notes[NOTES_TEXT_KEY], "bring laptops");
    assert_eq!(store.load_plan("g1").unwrap(), Some(plan));
}

#[test]
fn memory_store_resave_replaces_plan() {
    let store = MemoryGroupStore::new();
    store.save_plan("g1", &plan()).unwrap();
    let later = generate_plan("Cohort A", 12, "07/04/2025").unwrap();
    store.save_plan("g1", &later).unwrap();

    let loaded = store.load_plan("g1").unwrap().unwrap();
    assert_eq!(loaded.program_start_date, d(2025, 4, 7));
    assert_eq!(
        store.module_dates("g1").unwrap()[0].start,
        Some(d(2025, 4, 7))
    );
}

#[test]
fn memory_store_unknown_group_is_empty() {
    let store = MemoryGroupStore::new();
    assert_eq!(store.notes("nobody").unwrap(), None);
    assert!(store.module_dates("nobody").unwrap().is_empty());
    assert!(store.completed_topics("nobody").unwrap().is_empty());
    assert_eq!(store.load_plan("nobody").unwrap(), None);
}

#[test]
fn memory_store_completion_is_idempotent() {
    let store = MemoryGroupStore::new();
    store
        .mark_completed("g1", &["119472".to_string(), "119457".to_string()])
        .unwrap();
    store
        .mark_completed("g1", &["119472".to_string(), "9010".to_string()])
        .unwrap();
    assert_eq!(
        store.completed_topics("g1").unwrap(),
        vec!["119472", "119457", "9010"]
    );
}

#[test]
fn json_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.json");
    let plan = plan();
    save_plan_to_json(&plan, &path).unwrap();
    let loaded = load_plan_from_json(&path).unwrap();
    assert_eq!(loaded, plan);
}

#[test]
fn csv_export_lists_topics_and_workplace_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.csv");
    let plan = plan();
    export_plan_to_csv(&plan, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "group_label");
    assert_eq!(&headers[3], "kind");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let topic_count = plan.all_topics().count();
    assert_eq!(rows.len(), topic_count + plan.modules.len());

    let first = &rows[0];
    assert_eq!(&first[3], "topic");
    assert_eq!(&first[4], "119472");
    assert_eq!(&first[7], "03/02/2025");
    assert_eq!(&first[10], "11/02/2025");

    let workplace = &rows[6];
    assert_eq!(&workplace[3], "workplace");
    assert_eq!(&workplace[7], "10/03/2025");
    assert_eq!(&workplace[8], "21/03/2025");
    assert_eq!(&workplace[9], "");
}

#[test]
fn loading_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_plan_from_json(dir.path().join("absent.json")).is_err());
}
