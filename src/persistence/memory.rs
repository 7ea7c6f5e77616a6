use super::{GroupPlanStore, PersistenceResult, columnar_module_dates, merge_plan_into_notes};
use crate::plan::{ModuleDates, RolloutPlan};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct GroupRecord {
    module_dates: Vec<ModuleDates>,
    notes: Option<String>,
    completed: Vec<String>,
}

/// Process-local store, used when no database path is configured.
#[derive(Debug, Default)]
pub struct MemoryGroupStore {
    groups: RwLock<HashMap<String, GroupRecord>>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupPlanStore for MemoryGroupStore {
    fn save_plan(&self, group_id: &str, plan: &RolloutPlan) -> PersistenceResult<()> {
        let mut groups = self.groups.write();
        let record = groups.entry(group_id.to_string()).or_default();
        let notes = merge_plan_into_notes(record.notes.as_deref(), plan)?;
        record.module_dates = columnar_module_dates(plan);
        record.notes = Some(notes);
        Ok(())
    }

    fn notes(&self, group_id: &str) -> PersistenceResult<Option<String>> {
        Ok(self
            .groups
            .read()
            .get(group_id)
            .and_then(|record| record.notes.clone()))
    }

    fn set_notes(&self, group_id: &str, notes: &str) -> PersistenceResult<()> {
        let mut groups = self.groups.write();
        groups.entry(group_id.to_string()).or_default().notes = Some(notes.to_string());
        Ok(())
    }

    fn module_dates(&self, group_id: &str) -> PersistenceResult<Vec<ModuleDates>> {
        Ok(self
            .groups
            .read()
            .get(group_id)
            .map(|record| record.module_dates.clone())
            .unwrap_or_default())
    }

    fn mark_completed(&self, group_id: &str, topic_ids: &[String]) -> PersistenceResult<()> {
        let mut groups = self.groups.write();
        let record = groups.entry(group_id.to_string()).or_default();
        for id in topic_ids {
            if !record.completed.contains(id) {
                record.completed.push(id.clone());
            }
        }
        Ok(())
    }

    fn completed_topics(&self, group_id: &str) -> PersistenceResult<Vec<String>> {
        Ok(self
            .groups
            .read()
            .get(group_id)
            .map(|record| record.completed.clone())
            .unwrap_or_default())
    }
}
