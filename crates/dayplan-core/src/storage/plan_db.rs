//! SQLite-based storage for tags and tasks.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, PlanStore};
use crate::error::{DatabaseError, Result};
use crate::schedule::{Clock, PlanState, Tag, Task};

const SCHEMA_VERSION: i32 = 1;

const TASK_COLUMNS: &str =
    "id, title, date, start_time, end_time, fixed, done, tag_id, notes";

/// Parse a text column, surfacing bad data as a conversion failure.
fn parse_column<T>(row: &rusqlite::Row, idx: usize) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Build a Task from a row selected with [`TASK_COLUMNS`]
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        date: parse_column::<NaiveDate>(row, 2)?,
        start_time: parse_column::<Clock>(row, 3)?,
        end_time: parse_column::<Clock>(row, 4)?,
        fixed: row.get(5)?,
        done: row.get(6)?,
        tag_id: row.get(7)?,
        notes: row.get(8)?,
    })
}

fn row_to_tag(row: &rusqlite::Row) -> Result<Tag, rusqlite::Error> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
    })
}

/// SQLite database for the day plan.
pub struct PlanDb {
    conn: Connection,
}

impl PlanDb {
    /// Open `dayplan.db` in the data directory.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("dayplan.db");
        Ok(Self::open_at(path)?)
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SCHEMA_VERSION {
            return Ok(());
        }

        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS tags (
                    id    TEXT PRIMARY KEY,
                    name  TEXT NOT NULL,
                    color TEXT
                );
                CREATE TABLE IF NOT EXISTS tasks (
                    id         TEXT PRIMARY KEY,
                    title      TEXT NOT NULL,
                    date       TEXT NOT NULL,
                    start_time TEXT NOT NULL,
                    end_time   TEXT NOT NULL,
                    fixed      INTEGER NOT NULL DEFAULT 0,
                    done       INTEGER NOT NULL DEFAULT 0,
                    tag_id     TEXT,
                    notes      TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date);
                PRAGMA user_version = 1;",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        tracing::debug!(from = version, to = SCHEMA_VERSION, "plan database migrated");
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32, DatabaseError> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    // === Task Operations ===

    pub fn create_task(&self, task: &Task) -> Result<(), DatabaseError> {
        insert_task(&self.conn, task)
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_task)
            .optional()?)
    }

    /// All tasks, grouped by date in insertion order.
    pub fn list_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY date, rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// The day task set for `date`, in insertion order.
    pub fn list_tasks_for_day(&self, date: NaiveDate) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE date = ?1 ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params![date.to_string()], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?2, date = ?3, start_time = ?4, end_time = ?5,
                    fixed = ?6, done = ?7, tag_id = ?8, notes = ?9
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.date.to_string(),
                task.start_time.to_string(),
                task.end_time.to_string(),
                task.fixed,
                task.done,
                task.tag_id,
                task.notes,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "task",
                id: task.id.clone(),
            });
        }
        Ok(())
    }

    /// Rewrite only the time fields of every listed task that still exists.
    ///
    /// Returns the number of rows changed.
    pub fn update_task_times(&self, tasks: &[Task]) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE tasks SET start_time = ?2, end_time = ?3 WHERE id = ?1")?;
            for task in tasks {
                changed += stmt.execute(params![
                    task.id,
                    task.start_time.to_string(),
                    task.end_time.to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    pub fn delete_task(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "task",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // === Tag Operations ===

    pub fn create_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        insert_tag(&self.conn, tag)
    }

    pub fn get_tag(&self, id: &str) -> Result<Option<Tag>, DatabaseError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, color FROM tags WHERE id = ?1",
                params![id],
                row_to_tag,
            )
            .optional()?)
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM tags ORDER BY rowid")?;
        let tags = stmt
            .query_map([], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Delete a tag; tasks that used it become uncategorized.
    pub fn delete_tag(&self, id: &str) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "tag",
                id: id.to_string(),
            });
        }
        tx.execute("UPDATE tasks SET tag_id = NULL WHERE tag_id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }
}

fn insert_task(conn: &Connection, task: &Task) -> Result<(), DatabaseError> {
    conn.execute(
        &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
        params![
            task.id,
            task.title,
            task.date.to_string(),
            task.start_time.to_string(),
            task.end_time.to_string(),
            task.fixed,
            task.done,
            task.tag_id,
            task.notes,
        ],
    )?;
    Ok(())
}

fn insert_tag(conn: &Connection, tag: &Tag) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tags (id, name, color) VALUES (?1, ?2, ?3)",
        params![tag.id, tag.name, tag.color],
    )?;
    Ok(())
}

impl PlanStore for PlanDb {
    fn load(&self) -> Result<PlanState> {
        Ok(PlanState {
            tags: self.list_tags()?,
            tasks: self.list_tasks()?,
        })
    }

    fn save(&self, state: &PlanState) -> Result<PlanState> {
        let tx = self.conn.unchecked_transaction().map_err(DatabaseError::from)?;
        tx.execute_batch("DELETE FROM tasks; DELETE FROM tags;")
            .map_err(DatabaseError::from)?;
        for tag in &state.tags {
            insert_tag(&tx, tag)?;
        }
        for task in &state.tasks {
            insert_task(&tx, task)?;
        }
        tx.commit().map_err(DatabaseError::from)?;
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::test_support::{day, fixed, task};

    fn work_tag() -> Tag {
        Tag {
            id: "w".to_string(),
            name: "Work".to_string(),
            color: Some("#3b82f6".to_string()),
        }
    }

    #[test]
    fn task_crud() {
        let db = PlanDb::open_memory().unwrap();
        let t = task("a", "09:00", "10:00").with_notes("agenda").with_tag("w");
        db.create_task(&t).unwrap();
        assert_eq!(db.get_task("a").unwrap(), Some(t.clone()));

        let mut edited = t.clone();
        edited.title = "Standup".to_string();
        edited.done = true;
        db.update_task(&edited).unwrap();
        assert_eq!(db.get_task("a").unwrap(), Some(edited));

        db.delete_task("a").unwrap();
        assert!(db.get_task("a").unwrap().is_none());
        assert!(matches!(
            db.delete_task("a"),
            Err(DatabaseError::NotFound { kind: "task", .. })
        ));
    }

    #[test]
    fn update_missing_task_is_not_found() {
        let db = PlanDb::open_memory().unwrap();
        let err = db.update_task(&task("ghost", "09:00", "10:00")).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn day_listing_keeps_insertion_order() {
        let db = PlanDb::open_memory().unwrap();
        let mut other = task("x", "08:00", "09:00");
        other.date = day().succ_opt().unwrap();
        for t in [task("b", "12:00", "13:00"), other, task("a", "09:00", "10:00")] {
            db.create_task(&t).unwrap();
        }

        let ids: Vec<String> = db
            .list_tasks_for_day(day())
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(db.list_tasks().unwrap().len(), 3);
    }

    #[test]
    fn time_updates_skip_missing_rows() {
        let db = PlanDb::open_memory().unwrap();
        db.create_task(&task("a", "09:00", "10:00")).unwrap();
        let moved = vec![
            task("a", "11:00", "12:00"),
            task("gone", "13:00", "14:00"),
        ];
        assert_eq!(db.update_task_times(&moved).unwrap(), 1);
        assert_eq!(db.get_task("a").unwrap().unwrap().start_time.to_string(), "11:00");
        assert!(db.get_task("gone").unwrap().is_none());
    }

    #[test]
    fn deleting_tag_uncategorizes_tasks() {
        let db = PlanDb::open_memory().unwrap();
        db.create_tag(&work_tag()).unwrap();
        db.create_task(&task("a", "09:00", "10:00").with_tag("w")).unwrap();
        assert_eq!(db.list_tags().unwrap(), vec![work_tag()]);
        assert_eq!(db.get_tag("w").unwrap(), Some(work_tag()));

        db.delete_tag("w").unwrap();
        assert!(db.list_tags().unwrap().is_empty());
        assert_eq!(db.get_task("a").unwrap().unwrap().tag_id, None);
        assert!(db.delete_tag("w").is_err());
    }

    #[test]
    fn store_save_replaces_everything() {
        let db = PlanDb::open_memory().unwrap();
        db.create_task(&task("old", "09:00", "10:00")).unwrap();

        let state = PlanState {
            tags: vec![work_tag()],
            tasks: vec![fixed("f", "07:00", "08:00"), task("g", "08:00", "08:30")],
        };
        let saved = db.save(&state).unwrap();
        assert_eq!(saved, state);
        assert_eq!(db.load().unwrap(), state);
        assert!(db.get_task("old").unwrap().is_none());
    }

    #[test]
    fn duplicate_id_rolls_back_save() {
        let db = PlanDb::open_memory().unwrap();
        db.create_task(&task("keep", "09:00", "10:00")).unwrap();
        let state = PlanState {
            tags: Vec::new(),
            tasks: vec![task("dup", "09:00", "10:00"), task("dup", "11:00", "12:00")],
        };
        assert!(db.save(&state).is_err());
        assert!(db.get_task("keep").unwrap().is_some());
    }

    #[test]
    fn corrupt_time_is_a_query_error() {
        let db = PlanDb::open_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO tasks (id, title, date, start_time, end_time)
                 VALUES ('bad', 'Bad', '2024-05-14', '9am', '10:00')",
                [],
            )
            .unwrap();
        assert!(matches!(db.get_task("bad"), Err(DatabaseError::QueryFailed(_))));
    }

    #[test]
    fn on_disk_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dayplan.db");
        {
            let db = PlanDb::open_at(&path).unwrap();
            db.create_task(&task("a", "09:00", "10:00")).unwrap();
            assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
        }
        let db = PlanDb::open_at(&path).unwrap();
        assert_eq!(db.list_tasks().unwrap().len(), 1);
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }
}
