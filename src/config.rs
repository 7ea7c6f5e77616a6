use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
use crate::catalogue::{CatalogueError, Curriculum};
use crate::plan::RolloutEngine;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "ROLLOUT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RolloutSettings {
    /// Working days between induction and the first session.
    pub induction_lead_days: u32,
    pub workplace_block_days: u32,
    /// Contractual programme length, in calendar months.
    pub contract_months: u32,
}

impl Default for RolloutSettings {
    fn default() -> Self {
        Self {
            induction_lead_days: 3,
            workplace_block_days: 10,
            contract_months: 12,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub calendar: WorkCalendarConfig,
    pub settings: RolloutSettings,
    /// Alternate curriculum JSON; the shipped catalogue is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curriculum_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Reads the file named by `ROLLOUT_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn build_engine(&self) -> Result<RolloutEngine, ConfigError> {
        let calendar = WorkCalendar::from_config(&self.calendar)?;
        let curriculum = match &self.curriculum_path {
            Some(path) => Curriculum::load(path)?,
            None => Curriculum::standard(),
        };
        Ok(RolloutEngine::new(curriculum, calendar, self.settings)?)
    }
}
