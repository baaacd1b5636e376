//! Schedule types: tasks, tags, and the persisted plan state.
//!
//! A [`Task`] is the atomic schedulable unit. Engine components only ever
//! rewrite its `start_time`/`end_time`; identity and the remaining fields
//! pass through untouched.

pub mod clock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use clock::{is_clock, round_to_grid, to_clock, to_minutes, Clock};

use crate::error::ValidationError;

/// A user category owned by persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A time-bounded task on a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Clock,
    pub end_time: Clock,
    /// Immovable by any automatic rearrangement.
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub tag_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Task {
    /// Create a flexible, not-done task without tag or notes.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
        start_time: Clock,
        end_time: Clock,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date,
            start_time,
            end_time,
            fixed: false,
            done: false,
            tag_id: None,
            notes: None,
        }
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_tag(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Clone with only the time fields rewritten.
    pub fn with_times(&self, start_time: Clock, end_time: Clock) -> Self {
        Self {
            start_time,
            end_time,
            ..self.clone()
        }
    }

    pub fn start_minutes(&self) -> i32 {
        self.start_time.minutes() as i32
    }

    pub fn end_minutes(&self) -> i32 {
        self.end_time.minutes() as i32
    }

    /// `end - start` in minutes; zero or negative means unplaceable.
    pub fn duration_minutes(&self) -> i32 {
        self.end_minutes() - self.start_minutes()
    }

    /// Whether `[start, end)` of both tasks intersect.
    pub fn overlaps(&self, other: &Task) -> bool {
        self.start_minutes() < other.end_minutes() && other.start_minutes() < self.end_minutes()
    }

    /// Boundary check applied before a user edit reaches storage.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyTitle`] for a blank title and
    /// [`ValidationError::InvalidValue`] when the end is not after the start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.duration_minutes() <= 0 {
            return Err(ValidationError::InvalidValue {
                field: "endTime".to_string(),
                message: format!(
                    "end time {} must be after start time {}",
                    self.end_time, self.start_time
                ),
            });
        }
        Ok(())
    }
}

/// Everything persistence hands to the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanState {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl PlanState {
    pub fn tasks_for_day(&self, date: NaiveDate) -> Vec<Task> {
        tasks_for_day(&self.tasks, date)
    }
}

/// The day task set: tasks whose calendar date equals `date`, input order kept.
pub fn tasks_for_day(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks.iter().filter(|t| t.date == date).cloned().collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn task_serialization_uses_wire_names() {
        let task = fixed("standup", "09:00", "09:15")
            .with_tag("work")
            .with_notes("daily");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "09:15");
        assert_eq!(json["tagId"], "work");
        assert_eq!(json["fixed"], true);

        let decoded: Task = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn malformed_time_is_rejected_on_load() {
        let json = r#"{"id":"a","title":"A","date":"2024-05-14","startTime":"9:00","endTime":"10:00"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn duration_and_overlap() {
        let a = task("a", "07:30", "08:30");
        let b = task("b", "08:30", "09:00");
        let c = task("c", "08:00", "08:45");
        assert_eq!(a.duration_minutes(), 60);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn with_times_keeps_identity() {
        let original = task("a", "07:30", "08:30").with_notes("keep");
        let moved = original.with_times(Clock::hm(10, 0), Clock::hm(11, 0));
        assert_eq!(moved.id, original.id);
        assert_eq!(moved.notes, original.notes);
        assert_eq!(moved.start_time, Clock::hm(10, 0));
    }

    #[test]
    fn validate_rejects_blank_title_and_inverted_range() {
        let mut t = task("a", "07:30", "08:30");
        assert!(t.validate().is_ok());
        t.title = "   ".to_string();
        assert_eq!(t.validate(), Err(ValidationError::EmptyTitle));
        let inverted = task("b", "09:00", "08:00");
        assert!(matches!(
            inverted.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn day_filter_keeps_only_matching_date() {
        let mut other = task("x", "07:00", "08:00");
        other.date = day().succ_opt().unwrap();
        let state = PlanState {
            tags: vec![],
            tasks: vec![task("a", "07:00", "08:00"), other, task("b", "09:00", "10:00")],
        };
        let ids: Vec<_> = state.tasks_for_day(day()).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
