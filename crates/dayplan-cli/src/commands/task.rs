//! Task management commands for CLI.

use clap::Subcommand;
use dayplan_core::error::DatabaseError;
use dayplan_core::schedule::{Clock, Task};
use dayplan_core::storage::PlanDb;
use uuid::Uuid;

use super::resolve_date;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Exempt from automatic rearrangement
        #[arg(long)]
        fixed: bool,
        /// Tag ID
        #[arg(long)]
        tag: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tasks for a day
    List {
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// List every day
        #[arg(long, conflicts_with = "date")]
        all: bool,
    },
    /// Edit a task
    Edit {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New start time (HH:MM)
        #[arg(long)]
        start: Option<String>,
        /// New end time (HH:MM)
        #[arg(long)]
        end: Option<String>,
        /// Move to another day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Set fixed status
        #[arg(long)]
        fixed: Option<bool>,
        /// New tag ID
        #[arg(long, conflicts_with = "clear_tag")]
        tag: Option<String>,
        /// Remove the tag
        #[arg(long)]
        clear_tag: bool,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Mark a task done
    Done {
        /// Task ID
        id: String,
        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },
}

fn ensure_tag(db: &PlanDb, tag_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db.get_tag(tag_id)?.is_none() {
        return Err(DatabaseError::NotFound {
            kind: "tag",
            id: tag_id.to_string(),
        }
        .into());
    }
    Ok(())
}

fn load_task(db: &PlanDb, id: &str) -> Result<Task, Box<dyn std::error::Error>> {
    db.get_task(id)?.ok_or_else(|| {
        DatabaseError::NotFound {
            kind: "task",
            id: id.to_string(),
        }
        .into()
    })
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        TaskAction::Add {
            title,
            start,
            end,
            date,
            fixed,
            tag,
            notes,
        } => {
            let mut task = Task::new(
                Uuid::new_v4().to_string(),
                title,
                resolve_date(date.as_deref())?,
                start.parse::<Clock>()?,
                end.parse::<Clock>()?,
            )
            .with_fixed(fixed);
            if let Some(tag_id) = tag {
                ensure_tag(&db, &tag_id)?;
                task.tag_id = Some(tag_id);
            }
            task.notes = notes;
            task.validate()?;

            db.create_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { date, all } => {
            let tasks = if all {
                db.list_tasks()?
            } else {
                let mut tasks = db.list_tasks_for_day(resolve_date(date.as_deref())?)?;
                tasks.sort_by_key(|t| t.start_minutes());
                tasks
            };
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Edit {
            id,
            title,
            start,
            end,
            date,
            fixed,
            tag,
            clear_tag,
            notes,
        } => {
            let mut task = load_task(&db, &id)?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(start) = start {
                task.start_time = start.parse()?;
            }
            if let Some(end) = end {
                task.end_time = end.parse()?;
            }
            if let Some(date) = date {
                task.date = resolve_date(Some(&date))?;
            }
            if let Some(fixed) = fixed {
                task.fixed = fixed;
            }
            if let Some(tag_id) = tag {
                ensure_tag(&db, &tag_id)?;
                task.tag_id = Some(tag_id);
            }
            if clear_tag {
                task.tag_id = None;
            }
            if let Some(notes) = notes {
                task.notes = Some(notes).filter(|n| !n.is_empty());
            }
            task.validate()?;

            db.update_task(&task)?;
            println!("Task updated: {id}");
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
        TaskAction::Done { id, undo } => {
            let mut task = load_task(&db, &id)?;
            task.done = !undo;
            db.update_task(&task)?;
            println!("Task {}: {id}", if undo { "reopened" } else { "done" });
        }
    }
    Ok(())
}
