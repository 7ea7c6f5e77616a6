//! Flat tabular view of a plan: one row per topic, one per workplace block.

use crate::plan::RolloutPlan;
use chrono::NaiveDate;
use polars::prelude::*;

pub const TOPIC_ROW: &str = "topic";
pub const WORKPLACE_ROW: &str = "workplace";

#[derive(Default)]
struct FrameColumns {
    module: Vec<i32>,
    kind: Vec<&'static str>,
    topic_id: Vec<Option<String>>,
    title: Vec<String>,
    credits: Vec<i32>,
    start: Vec<Option<i32>>,
    end: Vec<Option<i32>>,
    summative: Vec<Option<i32>>,
    assessing: Vec<Option<i32>>,
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

fn date_series(name: &str, values: Vec<Option<i32>>) -> PolarsResult<Column> {
    Ok(Series::new(name.into(), values)
        .cast(&DataType::Date)?
        .into_column())
}

pub fn plan_to_dataframe(plan: &RolloutPlan) -> PolarsResult<DataFrame> {
    let mut cols = FrameColumns::default();

    for module in &plan.modules {
        let number = module.module_number as i32;
        for topic in &module.topics {
            cols.module.push(number);
            cols.kind.push(TOPIC_ROW);
            cols.topic_id.push(Some(topic.id.clone()));
            cols.title.push(topic.title.clone());
            cols.credits.push(topic.credits as i32);
            cols.start.push(Some(date_to_i32(topic.start_date)));
            cols.end.push(Some(date_to_i32(topic.end_date)));
            cols.summative.push(Some(date_to_i32(topic.summative_date)));
            cols.assessing.push(Some(date_to_i32(topic.assessing_date)));
        }
        let block = module.workplace_activity;
        cols.module.push(number);
        cols.kind.push(WORKPLACE_ROW);
        cols.topic_id.push(None);
        cols.title.push("Workplace activity".to_string());
        cols.credits.push(0);
        cols.start.push(Some(date_to_i32(block.start_date)));
        cols.end.push(Some(date_to_i32(block.end_date)));
        cols.summative.push(None);
        cols.assessing.push(None);
    }

    DataFrame::new(vec![
        Series::new("module".into(), cols.module).into_column(),
        Series::new("kind".into(), cols.kind).into_column(),
        Series::new("topic_id".into(), cols.topic_id).into_column(),
        Series::new("title".into(), cols.title).into_column(),
        Series::new("credits".into(), cols.credits).into_column(),
        date_series("start", cols.start)?,
        date_series("end", cols.end)?,
        date_series("summative", cols.summative)?,
        date_series("assessing", cols.assessing)?,
    ])
}

/// Credits per module, summed from the topic rows of a plan frame.
pub fn module_credit_totals(frame: &DataFrame) -> PolarsResult<DataFrame> {
    frame
        .clone()
        .lazy()
        .filter(col("kind").eq(lit(TOPIC_ROW)))
        .group_by_stable([col("module")])
        .agg([col("credits").sum().cast(DataType::Int64).alias("credits")])
        .sort(["module"], SortMultipleOptions::default())
        .collect()
}
