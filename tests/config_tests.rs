use chrono::{NaiveDate, Weekday};
use rollout_tool::{
    ConfigError, EngineConfig, HolidayWindow, RolloutSettings, WorkCalendarConfig,
};
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn defaults_match_standard_rollout() {
    let config = EngineConfig::default();
    assert_eq!(config.settings, RolloutSettings::default());
    assert_eq!(config.settings.induction_lead_days, 3);
    assert_eq!(config.settings.workplace_block_days, 10);
    assert_eq!(config.settings.contract_months, 12);

    let engine = config.build_engine().unwrap();
    let plan = engine.generate_plan("Cohort", 4, "03/02/2025").unwrap();
    assert_eq!(plan.induction_date, d(2025, 1, 29));
}

#[test]
fn partial_json_fills_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"settings": {"workplaceBlockDays": 5}}"#)
        .unwrap();
    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.settings.workplace_block_days, 5);
    assert_eq!(config.settings.induction_lead_days, 3);
    assert_eq!(config.calendar, WorkCalendarConfig::default());
    assert!(config.curriculum_path.is_none());
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    let config = EngineConfig {
        calendar: WorkCalendarConfig::new(
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu],
            [HolidayWindow::year_end(), HolidayWindow::new(4, 18, 4, 21)],
        ),
        settings: RolloutSettings {
            induction_lead_days: 2,
            workplace_block_days: 8,
            contract_months: 18,
        },
        curriculum_path: None,
    };
    config.save(&path).unwrap();
    assert_eq!(EngineConfig::load(&path).unwrap(), config);

    let engine = config.build_engine().unwrap();
    assert!(!engine.calendar().is_working_day(d(2025, 3, 7)));
    assert_eq!(engine.settings().contract_months, 18);
}

#[test]
fn custom_calendar_changes_plan() {
    let config = EngineConfig {
        calendar: WorkCalendarConfig::new(
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            Vec::new(),
        ),
        ..EngineConfig::default()
    };
    let engine = config.build_engine().unwrap();
    // without the year-end closure, a 20 Dec start begins on Monday 22 Dec
    let plan = engine.generate_plan("Cohort", 4, "20/12/2025").unwrap();
    assert_eq!(plan.modules[0].topics[0].start_date, d(2025, 12, 22));
}

#[test]
fn invalid_calendar_is_reported() {
    let config = EngineConfig {
        calendar: WorkCalendarConfig::new(Vec::<Weekday>::new(), Vec::new()),
        ..EngineConfig::default()
    };
    assert!(matches!(config.build_engine(), Err(ConfigError::Calendar(_))));
}

#[test]
fn missing_curriculum_file_is_reported() {
    let config = EngineConfig {
        curriculum_path: Some("/nonexistent/curriculum.json".into()),
        ..EngineConfig::default()
    };
    assert!(matches!(config.build_engine(), Err(ConfigError::Catalogue(_))));
}

#[test]
fn malformed_json_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    assert!(matches!(
        EngineConfig::load(file.path()),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        EngineConfig::load("/nonexistent/engine.json"),
        Err(ConfigError::Io(_))
    ));
}
