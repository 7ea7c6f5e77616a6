//! The group notes field holds free-form structured notes. Plans are merged
//! into it under one key without disturbing anything else stored there.

use crate::plan::RolloutPlan;
use serde_json::{Map, Value};

pub const PLAN_KEY: &str = "rolloutPlan";
pub const NOTES_TEXT_KEY: &str = "notesText";

pub fn merge_plan_into_notes(
    existing: Option<&str>,
    plan: &RolloutPlan,
) -> serde_json::Result<String> {
    let plan_value = serde_json::to_value(plan)?;

    let mut root = match existing.filter(|text| !text.trim().is_empty()) {
        None => Map::new(),
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            // plain text, or JSON that is not an object
            _ => {
                let mut map = Map::new();
                map.insert(NOTES_TEXT_KEY.to_string(), Value::String(text.to_string()));
                map
            }
        },
    };

    root.insert(PLAN_KEY.to_string(), plan_value);
    serde_json::to_string(&Value::Object(root))
}

pub fn extract_plan_value(notes: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(notes) {
        Ok(Value::Object(mut map)) => map.remove(PLAN_KEY),
        _ => None,
    }
}
