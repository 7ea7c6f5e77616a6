use super::PersistenceResult;
use crate::dates::format_display_date;
use crate::plan::RolloutPlan;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &RolloutPlan, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, plan)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<RolloutPlan> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[derive(Default, Serialize)]
struct PlanCsvRecord {
    group_label: String,
    module_number: u32,
    module_name: String,
    kind: &'static str,
    topic_id: String,
    title: String,
    credits: u32,
    start_date: String,
    end_date: String,
    summative_date: String,
    assessing_date: String,
}

/// Write the plan as a facilitator calendar: one row per topic, followed by
/// the module's workplace-activity row.
pub fn export_plan_to_csv<P: AsRef<Path>>(plan: &RolloutPlan, path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for module in &plan.modules {
        for topic in &module.topics {
            writer.serialize(PlanCsvRecord {
                group_label: plan.group_label.clone(),
                module_number: module.module_number,
                module_name: module.name.clone(),
                kind: "topic",
                topic_id: topic.id.clone(),
                title: topic.title.clone(),
                credits: topic.credits,
                start_date: format_display_date(topic.start_date),
                end_date: format_display_date(topic.end_date),
                summative_date: format_display_date(topic.summative_date),
                assessing_date: format_display_date(topic.assessing_date),
            })?;
        }
        writer.serialize(PlanCsvRecord {
            group_label: plan.group_label.clone(),
            module_number: module.module_number,
            module_name: module.name.clone(),
            kind: "workplace",
            title: "Workplace activity".to_string(),
            start_date: format_display_date(module.workplace_activity.start_date),
            end_date: format_display_date(module.workplace_activity.end_date),
            ..PlanCsvRecord::default()
        })?;
    }
    writer.flush()?;
    Ok(())
}
