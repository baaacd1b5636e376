//! Parsing and validation of advisor replies.
//!
//! Nothing in a reply is trusted: the JSON object is cut out of the raw
//! text, checked against the response shape, and each update is validated
//! against the original snapshot before it is applied.

use serde::Deserialize;

use crate::error::AdvisorError;
use crate::schedule::{Clock, Task};

/// Reply shape the advisor is instructed to produce.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorReply {
    pub summary: String,
    pub tasks: Vec<AdvisorUpdate>,
}

/// Proposed times for one task.
///
/// Time fields are kept as raw JSON so one bad value rejects only that
/// task's update instead of the whole reply.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorUpdate {
    pub id: String,
    #[serde(rename = "startTime", default)]
    pub start_time: serde_json::Value,
    #[serde(rename = "endTime", default)]
    pub end_time: serde_json::Value,
}

/// Why an update was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Target task is fixed
    FixedTask,
    /// A time field is not `HH:MM`
    MalformedTime,
    /// New interval length differs from the original
    DurationChanged,
}

/// Validated result of applying a reply to a snapshot.
#[derive(Debug, Clone)]
pub struct ValidatedUpdates {
    /// Every original task exactly once, sorted by start.
    pub tasks: Vec<Task>,
    pub applied: Vec<String>,
    pub rejected: Vec<(String, RejectReason)>,
    /// Update ids that match no task.
    pub unknown: Vec<String>,
}

/// Outermost `{...}` span: first `{` through last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse raw advisor text into the reply shape.
///
/// # Errors
/// [`AdvisorError::NoJsonObject`] when no braces are found, and
/// [`AdvisorError::Malformed`] when the span does not match the shape.
pub fn parse_reply(text: &str) -> Result<AdvisorReply, AdvisorError> {
    let json = extract_json_object(text).ok_or(AdvisorError::NoJsonObject)?;
    serde_json::from_str(json).map_err(|e| AdvisorError::Malformed(e.to_string()))
}

fn clock_field(value: &serde_json::Value) -> Option<Clock> {
    value.as_str().and_then(|s| s.parse().ok())
}

/// Apply reply updates to `original`, validating each one.
///
/// For every original task: fixed tasks are never touched; a flexible task
/// takes the first update with its id if both times are `HH:MM` and the
/// duration is unchanged; otherwise it keeps its times.
pub fn apply_updates(original: &[Task], reply: &AdvisorReply) -> ValidatedUpdates {
    let mut applied = Vec::new();
    let mut rejected = Vec::new();

    let mut tasks: Vec<Task> = original
        .iter()
        .map(|task| {
            let Some(update) = reply.tasks.iter().find(|u| u.id == task.id) else {
                return task.clone();
            };
            if task.fixed {
                rejected.push((task.id.clone(), RejectReason::FixedTask));
                return task.clone();
            }
            let (Some(start), Some(end)) =
                (clock_field(&update.start_time), clock_field(&update.end_time))
            else {
                rejected.push((task.id.clone(), RejectReason::MalformedTime));
                return task.clone();
            };
            let candidate = task.with_times(start, end);
            if candidate.duration_minutes() != task.duration_minutes() {
                rejected.push((task.id.clone(), RejectReason::DurationChanged));
                return task.clone();
            }
            applied.push(task.id.clone());
            candidate
        })
        .collect();
    tasks.sort_by_key(|t| t.start_minutes());

    let unknown = reply
        .tasks
        .iter()
        .filter(|u| !original.iter().any(|t| t.id == u.id))
        .map(|u| u.id.clone())
        .collect();

    ValidatedUpdates {
        tasks,
        applied,
        rejected,
        unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::test_support::{fixed, task};

    fn reply(json: &str) -> AdvisorReply {
        parse_reply(json).unwrap()
    }

    fn find<'a>(tasks: &'a [Task], id: &str) -> &'a Task {
        tasks.iter().find(|t| t.id == id).unwrap()
    }

    #[test]
    fn extracts_object_embedded_in_chatter() {
        let text = r#"Sure! {"summary":"ok","tasks":[]} thanks"#;
        assert_eq!(extract_json_object(text), Some(r#"{"summary":"ok","tasks":[]}"#));
        let parsed = parse_reply(text).unwrap();
        assert_eq!(parsed.summary, "ok");
        assert!(parsed.tasks.is_empty());
    }

    #[test]
    fn extraction_spans_nested_objects() {
        let text = "```json\n{\"summary\":\"s\",\"tasks\":[{\"id\":\"a\",\"startTime\":\"09:00\",\"endTime\":\"10:00\"}]}\n```";
        let parsed = parse_reply(text).unwrap();
        assert_eq!(parsed.tasks.len(), 1);
        assert_eq!(parsed.tasks[0].id, "a");
    }

    #[test]
    fn missing_braces_or_shape_is_an_error() {
        assert!(matches!(parse_reply("no json here"), Err(AdvisorError::NoJsonObject)));
        assert!(matches!(parse_reply("} backwards {"), Err(AdvisorError::NoJsonObject)));
        assert!(matches!(
            parse_reply(r#"{"summary":"missing tasks"}"#),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(matches!(parse_reply("{not json}"), Err(AdvisorError::Malformed(_))));
    }

    #[test]
    fn malformed_time_rejects_only_that_task() {
        let original = vec![task("a", "09:00", "10:00"), task("b", "11:00", "11:30")];
        let r = reply(
            r#"{"summary":"s","tasks":[
                {"id":"a","startTime":"9am","endTime":"10:00"},
                {"id":"b","startTime":"13:00","endTime":"13:30"}
            ]}"#,
        );
        let out = apply_updates(&original, &r);
        assert_eq!(find(&out.tasks, "a"), &original[0]);
        assert_eq!(find(&out.tasks, "b").start_time.to_string(), "13:00");
        assert_eq!(out.applied, vec!["b"]);
        assert_eq!(out.rejected, vec![("a".to_string(), RejectReason::MalformedTime)]);
    }

    #[test]
    fn non_string_time_is_a_malformed_field() {
        let original = vec![task("a", "09:00", "10:00")];
        let r = reply(r#"{"summary":"s","tasks":[{"id":"a","startTime":900,"endTime":"10:00"}]}"#);
        let out = apply_updates(&original, &r);
        assert_eq!(out.tasks, original);
        assert_eq!(out.rejected[0].1, RejectReason::MalformedTime);
    }

    #[test]
    fn fixed_task_is_never_updated() {
        let original = vec![fixed("f", "09:00", "10:00")];
        let r = reply(r#"{"summary":"s","tasks":[{"id":"f","startTime":"12:00","endTime":"13:00"}]}"#);
        let out = apply_updates(&original, &r);
        assert_eq!(out.tasks, original);
        assert_eq!(out.rejected, vec![("f".to_string(), RejectReason::FixedTask)]);
    }

    #[test]
    fn duration_change_is_rejected() {
        let original = vec![task("a", "09:00", "10:00")];
        let r = reply(r#"{"summary":"s","tasks":[{"id":"a","startTime":"12:00","endTime":"12:30"}]}"#);
        let out = apply_updates(&original, &r);
        assert_eq!(out.tasks, original);
        assert_eq!(out.rejected[0].1, RejectReason::DurationChanged);
    }

    #[test]
    fn unknown_ids_are_ignored_and_missing_updates_keep_times() {
        let original = vec![task("a", "09:00", "10:00"), task("b", "10:00", "10:15")];
        let r = reply(r#"{"summary":"s","tasks":[{"id":"ghost","startTime":"12:00","endTime":"13:00"}]}"#);
        let out = apply_updates(&original, &r);
        assert_eq!(out.tasks, original);
        assert_eq!(out.unknown, vec!["ghost"]);
        assert!(out.applied.is_empty());
    }

    #[test]
    fn result_is_sorted_and_identity_preserved() {
        let original = vec![task("a", "09:00", "10:00").with_notes("n"), task("b", "10:00", "10:15")];
        let r = reply(r#"{"summary":"s","tasks":[{"id":"a","startTime":"15:00","endTime":"16:00"}]}"#);
        let out = apply_updates(&original, &r);
        let ids: Vec<_> = out.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(find(&out.tasks, "a").notes.as_deref(), Some("n"));
    }
}
