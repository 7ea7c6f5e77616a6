use crate::calendar::WorkCalendar;
use crate::catalogue::{ModuleSeed, TopicBlock};
use crate::plan::{ScheduledModule, ScheduledTopic, WorkplaceActivity};
use chrono::NaiveDate;
use tracing::debug;

/// A scheduled module plus the date the following module may start from.
#[derive(Debug, Clone)]
pub struct ModuleOutcome {
    pub module: ScheduledModule,
    pub next_cursor: NaiveDate,
}

/// Lays a module's blocks end to end on working days, then appends the
/// workplace-activity block.
pub struct ModuleScheduler<'a> {
    calendar: &'a WorkCalendar,
    workplace_block_days: u32,
}

impl<'a> ModuleScheduler<'a> {
    pub fn new(calendar: &'a WorkCalendar, workplace_block_days: u32) -> Self {
        Self {
            calendar,
            workplace_block_days: workplace_block_days.max(1),
        }
    }

    pub fn schedule(&self, seed: &ModuleSeed, cursor: NaiveDate) -> ModuleOutcome {
        let mut cursor = cursor;
        let mut topics = Vec::new();
        let mut last_assessing: Option<NaiveDate> = None;

        for block in &seed.blocks {
            let (mut scheduled, assessing) = self.schedule_block(block, cursor);
            debug!(
                module = seed.module_number,
                group = block.group_key().unwrap_or("-"),
                topics = scheduled.len(),
                start = %scheduled.first().map(|t| t.start_date).unwrap_or(cursor),
                assessing = %assessing,
                "scheduled block"
            );
            topics.append(&mut scheduled);
            last_assessing = Some(assessing);
            cursor = self.calendar.advance(assessing, 1);
        }

        // a module without topics anchors its workplace block on the cursor
        let anchor = last_assessing.unwrap_or(cursor);
        let workplace_start = self.calendar.next_working_monday(anchor);
        let workplace_end = self
            .calendar
            .advance(workplace_start, i64::from(self.workplace_block_days) - 1);
        let next_cursor = self
            .calendar
            .next_working_monday(self.calendar.advance(workplace_end, 1));

        let total_credits = topics.iter().map(|t| t.credits).sum();
        ModuleOutcome {
            module: ScheduledModule {
                module_number: seed.module_number,
                name: seed.name.clone(),
                topics,
                workplace_activity: WorkplaceActivity {
                    start_date: workplace_start,
                    end_date: workplace_end,
                },
                total_credits,
            },
            next_cursor,
        }
    }

    fn schedule_block(&self, block: &TopicBlock, cursor: NaiveDate) -> (Vec<ScheduledTopic>, NaiveDate) {
        let start = self.calendar.next_working_day(cursor);
        let end = self
            .calendar
            .advance(start, i64::from(block.duration_days().max(1)) - 1);
        let summative = self.calendar.advance(end, 1);
        let assessing = self.calendar.advance(summative, 1);

        let topics = block
            .topics()
            .iter()
            .map(|seed| ScheduledTopic {
                id: seed.id.clone(),
                title: seed.title.clone(),
                credits: seed.credits,
                group_key: block.group_key().map(str::to_string),
                start_date: start,
                end_date: end,
                summative_date: summative,
                assessing_date: assessing,
            })
            .collect();
        (topics, assessing)
    }
}
