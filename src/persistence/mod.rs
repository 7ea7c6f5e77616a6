use crate::plan::{ModuleDates, RolloutPlan};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub mod file;
pub mod memory;
pub mod notes;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{export_plan_to_csv, load_plan_from_json, save_plan_to_json};
pub use memory::MemoryGroupStore;
pub use notes::{NOTES_TEXT_KEY, PLAN_KEY, extract_plan_value, merge_plan_into_notes};

/// Modules 1..=COLUMNAR_MODULES have dedicated start/end columns per group.
pub const COLUMNAR_MODULES: u32 = 6;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage for per-group plans and completion records.
pub trait GroupPlanStore: Send + Sync {
    /// Write the plan's module date columns and merge it into the notes field.
    fn save_plan(&self, group_id: &str, plan: &RolloutPlan) -> PersistenceResult<()>;
    fn notes(&self, group_id: &str) -> PersistenceResult<Option<String>>;
    fn set_notes(&self, group_id: &str, notes: &str) -> PersistenceResult<()>;
    fn module_dates(&self, group_id: &str) -> PersistenceResult<Vec<ModuleDates>>;
    fn mark_completed(&self, group_id: &str, topic_ids: &[String]) -> PersistenceResult<()>;
    fn completed_topics(&self, group_id: &str) -> PersistenceResult<Vec<String>>;

    /// The stored plan as raw JSON, for lenient readers.
    fn plan_value(&self, group_id: &str) -> PersistenceResult<Option<Value>> {
        Ok(self
            .notes(group_id)?
            .and_then(|notes| extract_plan_value(&notes)))
    }

    fn load_plan(&self, group_id: &str) -> PersistenceResult<Option<RolloutPlan>> {
        match self.plan_value(group_id)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

pub(crate) fn columnar_module_dates(plan: &RolloutPlan) -> Vec<ModuleDates> {
    plan.module_date_ranges()
        .into_iter()
        .filter(|dates| {
            let fits = (1..=COLUMNAR_MODULES).contains(&dates.module_number);
            if !fits {
                warn!(
                    module = dates.module_number,
                    "module has no date columns; kept only in the embedded plan"
                );
            }
            fits
        })
        .collect()
}
