use crate::calendar::WorkCalendar;
use crate::catalogue::{CatalogueError, Curriculum};
use crate::config::RolloutSettings;
use crate::dates::{self, DateField, display_date, option_display_date};
use crate::scheduler::ModuleScheduler;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("a programme start date is required")]
    MissingStartDate,
    #[error("start date '{0}' is not a DD/MM/YYYY date")]
    InvalidStartDate(String),
    #[error("programme end date is out of range for start {0}")]
    DateOutOfRange(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTopic {
    pub id: String,
    pub title: String,
    pub credits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
    #[serde(with = "display_date")]
    pub start_date: NaiveDate,
    #[serde(with = "display_date")]
    pub end_date: NaiveDate,
    #[serde(with = "display_date")]
    pub summative_date: NaiveDate,
    #[serde(with = "display_date")]
    pub assessing_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkplaceActivity {
    #[serde(with = "display_date")]
    pub start_date: NaiveDate,
    #[serde(with = "display_date")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledModule {
    pub module_number: u32,
    pub name: String,
    pub topics: Vec<ScheduledTopic>,
    pub workplace_activity: WorkplaceActivity,
    pub total_credits: u32,
}

impl ScheduledModule {
    pub fn first_start(&self) -> Option<NaiveDate> {
        self.topics.first().map(|t| t.start_date)
    }

    pub fn last_end(&self) -> Option<NaiveDate> {
        self.topics.last().map(|t| t.end_date)
    }
}

/// First-topic start and last-topic end of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDates {
    pub module_number: u32,
    #[serde(default, with = "option_display_date")]
    pub start: Option<NaiveDate>,
    #[serde(default, with = "option_display_date")]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutPlan {
    pub group_label: String,
    pub learner_count: u32,
    #[serde(with = "display_date")]
    pub program_start_date: NaiveDate,
    /// Contractual end: start plus the contract length, on a working day.
    #[serde(with = "display_date")]
    pub program_end_date: NaiveDate,
    #[serde(with = "display_date")]
    pub induction_date: NaiveDate,
    /// End of the last workplace-activity block; may differ from the
    /// contractual end date.
    #[serde(default, with = "option_display_date")]
    pub schedule_end_date: Option<NaiveDate>,
    pub modules: Vec<ScheduledModule>,
    pub total_credits: u32,
    pub required_credits: u32,
}

impl RolloutPlan {
    pub fn all_topics(&self) -> impl Iterator<Item = (&ScheduledModule, &ScheduledTopic)> {
        self.modules
            .iter()
            .flat_map(|module| module.topics.iter().map(move |topic| (module, topic)))
    }

    pub fn topic(&self, id: &str) -> Option<&ScheduledTopic> {
        self.all_topics()
            .map(|(_, topic)| topic)
            .find(|topic| topic.id == id)
    }

    pub fn module(&self, module_number: u32) -> Option<&ScheduledModule> {
        self.modules
            .iter()
            .find(|module| module.module_number == module_number)
    }

    pub fn computed_credits(&self) -> u32 {
        self.modules.iter().map(|m| m.total_credits).sum()
    }

    pub fn module_date_ranges(&self) -> Vec<ModuleDates> {
        self.modules
            .iter()
            .map(|module| ModuleDates {
                module_number: module.module_number,
                start: module.first_start(),
                end: module.last_end(),
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Inputs for one cohort's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub group_label: String,
    #[serde(default)]
    pub learner_count: u32,
    pub start_date: String,
}

impl PlanRequest {
    pub fn new(group_label: &str, learner_count: u32, start_date: &str) -> Self {
        Self {
            group_label: group_label.to_string(),
            learner_count,
            start_date: start_date.to_string(),
        }
    }
}

/// Chains per-module schedules across the curriculum into a full plan.
#[derive(Debug, Clone)]
pub struct RolloutEngine {
    curriculum: Curriculum,
    calendar: WorkCalendar,
    settings: RolloutSettings,
}

impl Default for RolloutEngine {
    fn default() -> Self {
        Self {
            curriculum: Curriculum::standard(),
            calendar: WorkCalendar::default(),
            settings: RolloutSettings::default(),
        }
    }
}

impl RolloutEngine {
    pub fn new(
        curriculum: Curriculum,
        calendar: WorkCalendar,
        settings: RolloutSettings,
    ) -> Result<Self, CatalogueError> {
        curriculum.validate()?;
        Ok(Self {
            curriculum,
            calendar,
            settings,
        })
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn settings(&self) -> &RolloutSettings {
        &self.settings
    }

    pub fn set_calendar(&mut self, calendar: WorkCalendar) {
        self.calendar = calendar;
    }

    pub fn generate_plan(
        &self,
        group_label: &str,
        learner_count: u32,
        start_date: &str,
    ) -> Result<RolloutPlan, PlanError> {
        match DateField::parse(Some(start_date)) {
            DateField::Valid(start) => self.plan_for_date(group_label, learner_count, start),
            DateField::Missing => Err(PlanError::MissingStartDate),
            DateField::Unparseable(raw) => Err(PlanError::InvalidStartDate(raw)),
        }
    }

    pub fn plan_for_date(
        &self,
        group_label: &str,
        learner_count: u32,
        program_start: NaiveDate,
    ) -> Result<RolloutPlan, PlanError> {
        let calendar = &self.calendar;
        let first_day = calendar.next_working_day(program_start);
        let induction_date =
            calendar.advance(first_day, -i64::from(self.settings.induction_lead_days));
        let contract_end = dates::add_months(program_start, self.settings.contract_months)
            .ok_or(PlanError::DateOutOfRange(program_start))?;
        let program_end_date = calendar.next_working_day(contract_end);

        let scheduler = ModuleScheduler::new(calendar, self.settings.workplace_block_days);
        let mut cursor = program_start;
        let mut modules = Vec::with_capacity(self.curriculum.modules.len());
        for seed in &self.curriculum.modules {
            let outcome = scheduler.schedule(seed, cursor);
            cursor = outcome.next_cursor;
            modules.push(outcome.module);
        }
        let schedule_end_date = modules.last().map(|m| m.workplace_activity.end_date);

        debug!(
            group = group_label,
            start = %program_start,
            modules = modules.len(),
            "assembled rollout plan"
        );

        Ok(RolloutPlan {
            group_label: group_label.to_string(),
            learner_count,
            program_start_date: program_start,
            program_end_date,
            induction_date,
            schedule_end_date,
            modules,
            total_credits: self.curriculum.total_credits,
            required_credits: self.curriculum.required_credits,
        })
    }

    /// Plans for many cohorts at once; results keep the request order.
    pub fn generate_plans(&self, requests: &[PlanRequest]) -> Vec<Result<RolloutPlan, PlanError>> {
        requests
            .par_iter()
            .map(|req| self.generate_plan(&req.group_label, req.learner_count, &req.start_date))
            .collect()
    }
}

/// Generate a plan with the shipped curriculum and default calendar.
pub fn generate_plan(
    group_label: &str,
    learner_count: u32,
    start_date: &str,
) -> Result<RolloutPlan, PlanError> {
    RolloutEngine::default().generate_plan(group_label, learner_count, start_date)
}
