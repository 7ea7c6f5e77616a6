pub mod calendar;
pub mod catalogue;
pub mod config;
pub mod dates;
pub mod frame;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod plan;
pub mod progress;
pub mod scheduler;

pub use calendar::{CalendarError, HolidayWindow, WorkCalendar, WorkCalendarConfig};
pub use catalogue::{CatalogueError, Curriculum, ModuleSeed, TopicBlock, TopicSeed};
pub use config::{ConfigError, EngineConfig, RolloutSettings};
pub use dates::DateField;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteGroupStore;
pub use persistence::{
    GroupPlanStore, MemoryGroupStore, PersistenceError, export_plan_to_csv, load_plan_from_json,
    merge_plan_into_notes, save_plan_to_json,
};
pub use plan::{
    ModuleDates, PlanError, PlanRequest, RolloutEngine, RolloutPlan, ScheduledModule,
    ScheduledTopic, WorkplaceActivity, generate_plan,
};
pub use progress::{VarianceResult, VarianceStatus, compare_progress, compare_progress_now};
