//! Compares where a cohort should be against the topics it has completed.

use crate::dates::{DateField, option_display_date};
use crate::plan::RolloutPlan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// The dated span of one topic as read from a plan, stored or fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicWindow {
    pub module_number: u32,
    pub topic_id: String,
    pub start: DateField,
    pub end: DateField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarianceStatus {
    Ahead,
    Behind,
    OnTrack,
}

impl VarianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceStatus::Ahead => "ahead",
            VarianceStatus::Behind => "behind",
            VarianceStatus::OnTrack => "on-track",
        }
    }
}

impl fmt::Display for VarianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceResult {
    pub projected_module: Option<u32>,
    #[serde(default, with = "option_display_date")]
    pub projected_date: Option<NaiveDate>,
    pub actual_module: Option<u32>,
    pub weeks_ahead: i64,
    pub status: VarianceStatus,
    /// Topics left out of the comparison because a date would not parse.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_topics: Vec<String>,
}

impl VarianceResult {
    pub fn summary(&self) -> String {
        let module = |m: Option<u32>| m.map_or_else(|| "-".to_string(), |m| m.to_string());
        let mut parts = vec![
            format!("status={}", self.status),
            format!("projected={}", module(self.projected_module)),
            format!("actual={}", module(self.actual_module)),
            format!("weeks={:+}", self.weeks_ahead),
        ];
        if !self.skipped_topics.is_empty() {
            parts.push(format!("skipped={}", self.skipped_topics.join(",")));
        }
        parts.join(", ")
    }
}

pub fn plan_windows(plan: &RolloutPlan) -> Vec<TopicWindow> {
    plan.all_topics()
        .map(|(module, topic)| TopicWindow {
            module_number: module.module_number,
            topic_id: topic.id.clone(),
            start: DateField::Valid(topic.start_date),
            end: DateField::Valid(topic.end_date),
        })
        .collect()
}

/// Read topic windows out of a stored plan without rejecting bad dates.
/// Modules without a number and topics without an id are dropped.
pub fn topic_windows_from_value(plan: &Value) -> Vec<TopicWindow> {
    let Some(modules) = plan.get("modules").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut windows = Vec::new();
    for module in modules {
        let Some(module_number) = module
            .get("moduleNumber")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
        else {
            continue;
        };
        let topics = module.get("topics").and_then(Value::as_array);
        for topic in topics.into_iter().flatten() {
            let Some(topic_id) = topic.get("id").and_then(Value::as_str) else {
                continue;
            };
            windows.push(TopicWindow {
                module_number,
                topic_id: topic_id.to_string(),
                start: DateField::from_json(topic.get("startDate")),
                end: DateField::from_json(topic.get("endDate")),
            });
        }
    }
    windows
}

pub fn compare_windows<I, S>(windows: &[TopicWindow], completed: I, today: NaiveDate) -> VarianceResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let completed: HashSet<String> = completed
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect();

    let mut active: Option<(u32, NaiveDate)> = None;
    let mut upcoming: Option<(u32, NaiveDate)> = None;
    let mut actual_module: Option<u32> = None;
    let mut last_completed_end: Option<NaiveDate> = None;
    let mut skipped_topics = Vec::new();

    for window in windows {
        let (Some(start), Some(end)) = (window.start.valid(), window.end.valid()) else {
            if window.start.is_unparseable() || window.end.is_unparseable() {
                warn!(topic = %window.topic_id, "skipping topic with unparseable dates");
                skipped_topics.push(window.topic_id.clone());
            }
            continue;
        };

        if active.is_none() && start <= today && today <= end {
            active = Some((window.module_number, end));
        }
        if upcoming.is_none() && start > today {
            upcoming = Some((window.module_number, start));
        }
        if completed.contains(&window.topic_id) {
            actual_module = actual_module.max(Some(window.module_number));
            last_completed_end = last_completed_end.max(Some(end));
        }
    }

    let projection = active.or(upcoming);
    let projected_module = projection.map(|(module, _)| module);
    let projected_date = projection.map(|(_, date)| date);

    let status = match (projected_module, actual_module) {
        (Some(projected), Some(actual)) if actual > projected => VarianceStatus::Ahead,
        (Some(projected), Some(actual)) if actual < projected => VarianceStatus::Behind,
        (Some(_), Some(_)) => VarianceStatus::OnTrack,
        (None, Some(_)) => VarianceStatus::Ahead,
        (_, None) => VarianceStatus::Behind,
    };

    let weeks_ahead = match (last_completed_end, projected_date) {
        (Some(completed_end), Some(projected)) => (completed_end - projected).num_days().div_euclid(7),
        _ => 0,
    };

    VarianceResult {
        projected_module,
        projected_date,
        actual_module,
        weeks_ahead,
        status,
        skipped_topics,
    }
}

pub fn compare_progress<I, S>(plan: &RolloutPlan, completed: I, today: NaiveDate) -> VarianceResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    compare_windows(&plan_windows(plan), completed, today)
}

/// `compare_progress` against the local calendar date.
pub fn compare_progress_now<I, S>(plan: &RolloutPlan, completed: I) -> VarianceResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    compare_progress(plan, completed, chrono::Local::now().date_naive())
}
