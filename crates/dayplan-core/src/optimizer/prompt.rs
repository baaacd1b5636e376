//! Plan description and instructions sent to the advisor.

use crate::optimizer::advisor::ChatMessage;
use crate::policy::SchedulingPolicy;
use crate::schedule::{to_clock, Tag, Task};
use crate::timeline::find_free_gaps;

/// System instruction: response schema plus the six hard rules.
pub fn system_instruction(policy: &SchedulingPolicy) -> String {
    let window_start = to_clock(policy.advisor_window_start);
    let window_end = to_clock(policy.advisor_window_end);
    indoc::formatdoc! {"
        You are a day-planning assistant. Rearrange the user's flexible tasks into a better day.

        Respond with a single JSON object and nothing else, using exactly this shape:
        {{\"summary\": \"<one sentence describing the change>\", \"tasks\": [{{\"id\": \"<task id>\", \"startTime\": \"HH:MM\", \"endTime\": \"HH:MM\"}}]}}
        Only list tasks whose times you change. Times are 24-hour HH:MM.

        Hard rules:
        1. Never move tasks marked FIXED.
        2. Only adjust the start and end times of FLEXIBLE tasks.
        3. Group tasks with similar categories next to each other where possible.
        4. Keep every task between {window_start} and {window_end}.
        5. Avoid overlapping tasks.
        6. Preserve each task's duration exactly.
    "}
}

/// Plain-text description of the day. Ids are included only so updates can
/// be matched back to tasks.
pub fn describe_plan(tasks: &[Task], tags: &[Tag], policy: &SchedulingPolicy) -> String {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| t.start_minutes());

    let mut out = String::new();
    if sorted.is_empty() {
        out.push_str("No tasks are scheduled for this day.\n");
        return out;
    }

    out.push_str("Tasks for the day:\n");
    for task in &sorted {
        let category = task
            .tag_id
            .as_deref()
            .and_then(|id| tags.iter().find(|tag| tag.id == id))
            .map(|tag| tag.name.as_str())
            .unwrap_or("uncategorized");
        let status = if task.fixed { "FIXED" } else { "FLEXIBLE" };
        out.push_str(&format!(
            "- [{}-{}] ({} min) {} | category: {} | {} | id: {}",
            task.start_time,
            task.end_time,
            task.duration_minutes(),
            task.title,
            category,
            status,
            task.id,
        ));
        if let Some(notes) = task.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            out.push_str(&format!(" | notes: {}", notes.trim()));
        }
        out.push('\n');
    }

    let gaps = find_free_gaps(
        tasks,
        policy.advisor_window_start as i32,
        policy.advisor_window_end as i32,
        policy.min_gap_minutes as i32,
    );
    if !gaps.is_empty() {
        out.push_str(&format!(
            "\nFree time between {} and {}:\n",
            to_clock(policy.advisor_window_start),
            to_clock(policy.advisor_window_end)
        ));
        for gap in gaps {
            out.push_str(&format!("- {} ({} min)\n", gap.label(), gap.duration_minutes()));
        }
    }

    out
}

/// The exact turn sent to the advisor: one system and one user message.
pub fn build_messages(tasks: &[Task], tags: &[Tag], policy: &SchedulingPolicy) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_instruction(policy)),
        ChatMessage::user(format!(
            "Here is my plan for the day. Please optimize it.\n\n{}",
            describe_plan(tasks, tags, policy)
        )),
    ]
}
