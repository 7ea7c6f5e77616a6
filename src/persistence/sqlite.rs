use super::{
    COLUMNAR_MODULES, GroupPlanStore, PersistenceResult, columnar_module_dates,
    merge_plan_into_notes,
};
use crate::dates::{format_display_date, parse_display_date};
use crate::plan::{ModuleDates, RolloutPlan};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::info;

pub struct SqliteGroupStore {
    connection: Mutex<Connection>,
}

impl SqliteGroupStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn module_columns() -> impl Iterator<Item = (u32, String, String)> {
        (1..=COLUMNAR_MODULES).map(|n| (n, format!("module_{n}_start"), format!("module_{n}_end")))
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let module_columns: String = Self::module_columns()
            .map(|(_, start, end)| format!("{start} TEXT,\n                {end} TEXT,\n                "))
            .collect();
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS learner_groups (
                group_id TEXT PRIMARY KEY,
                group_label TEXT,
                learner_count INTEGER NOT NULL DEFAULT 0,
                {module_columns}notes TEXT
            );
            CREATE TABLE IF NOT EXISTS topic_completions (
                group_id TEXT NOT NULL,
                topic_id TEXT NOT NULL,
                PRIMARY KEY (group_id, topic_id)
            );
        "#
        );
        connection.execute_batch(&ddl)?;
        Ok(())
    }

    fn ensure_group(tx: &Transaction, group_id: &str) -> PersistenceResult<()> {
        tx.execute(
            "INSERT INTO learner_groups (group_id) VALUES (?1) ON CONFLICT(group_id) DO NOTHING",
            params![group_id],
        )?;
        Ok(())
    }

    fn save_module_dates(
        tx: &Transaction,
        group_id: &str,
        dates: &[ModuleDates],
    ) -> PersistenceResult<()> {
        for (number, start_col, end_col) in Self::module_columns() {
            let entry = dates.iter().find(|d| d.module_number == number);
            let start = entry.and_then(|d| d.start).map(format_display_date);
            let end = entry.and_then(|d| d.end).map(format_display_date);
            tx.execute(
                &format!("UPDATE learner_groups SET {start_col} = ?1, {end_col} = ?2 WHERE group_id = ?3"),
                params![start, end, group_id],
            )?;
        }
        Ok(())
    }
}

impl GroupPlanStore for SqliteGroupStore {
    fn save_plan(&self, group_id: &str, plan: &RolloutPlan) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        Self::ensure_group(&tx, group_id)?;

        let existing: Option<String> = tx.query_row(
            "SELECT notes FROM learner_groups WHERE group_id = ?1",
            params![group_id],
            |row| row.get(0),
        )?;
        let notes = merge_plan_into_notes(existing.as_deref(), plan)?;

        tx.execute(
            "UPDATE learner_groups SET group_label = ?1, learner_count = ?2, notes = ?3 WHERE group_id = ?4",
            params![plan.group_label, plan.learner_count, notes, group_id],
        )?;
        Self::save_module_dates(&tx, group_id, &columnar_module_dates(plan))?;
        tx.commit()?;

        info!(group = group_id, modules = plan.modules.len(), "stored rollout plan");
        Ok(())
    }

    fn notes(&self, group_id: &str) -> PersistenceResult<Option<String>> {
        let conn = self.connection.lock();
        let notes: Option<Option<String>> = conn
            .query_row(
                "SELECT notes FROM learner_groups WHERE group_id = ?1",
                params![group_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(notes.flatten())
    }

    fn set_notes(&self, group_id: &str, notes: &str) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        Self::ensure_group(&tx, group_id)?;
        tx.execute(
            "UPDATE learner_groups SET notes = ?1 WHERE group_id = ?2",
            params![notes, group_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn module_dates(&self, group_id: &str) -> PersistenceResult<Vec<ModuleDates>> {
        let conn = self.connection.lock();
        let mut dates = Vec::new();
        for (module_number, start_col, end_col) in Self::module_columns() {
            let row: Option<(Option<String>, Option<String>)> = conn
                .query_row(
                    &format!("SELECT {start_col}, {end_col} FROM learner_groups WHERE group_id = ?1"),
                    params![group_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((start, end)) = row else {
                return Ok(Vec::new());
            };
            if start.is_none() && end.is_none() {
                continue;
            }
            dates.push(ModuleDates {
                module_number,
                start: start.as_deref().and_then(parse_display_date),
                end: end.as_deref().and_then(parse_display_date),
            });
        }
        Ok(dates)
    }

    fn mark_completed(&self, group_id: &str, topic_ids: &[String]) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO topic_completions (group_id, topic_id) VALUES (?1, ?2)",
            )?;
            for id in topic_ids {
                stmt.execute(params![group_id, id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn completed_topics(&self, group_id: &str) -> PersistenceResult<Vec<String>> {
        let conn = self.connection.lock();
        let mut stmt = conn
            .prepare("SELECT topic_id FROM topic_completions WHERE group_id = ?1 ORDER BY rowid ASC")?;
        let rows = stmt.query_map(params![group_id], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for id in rows {
            ids.push(id?);
        }
        Ok(ids)
    }
}
