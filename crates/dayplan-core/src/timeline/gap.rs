//! Free time detection between a day's tasks.
//!
//! Finds uncovered windows inside a bounded part of the day. The optimizer
//! lists them in the plan description and the CLI prints them under the
//! layout.

use serde::{Deserialize, Serialize};

use crate::schedule::{to_clock, Task};

/// Size category of a free gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapSize {
    Small,  // under 30 minutes
    Medium, // 30-59 minutes
    Large,  // 60+ minutes
}

impl GapSize {
    /// Categorize a gap by its duration in minutes
    pub fn from_minutes(minutes: i32) -> Self {
        if minutes < 30 {
            Self::Small
        } else if minutes < 60 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// An uncovered window `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeGap {
    pub start: i32,
    pub end: i32,
    pub size: GapSize,
}

impl FreeGap {
    fn new(start: i32, end: i32) -> Self {
        Self {
            start,
            end,
            size: GapSize::from_minutes(end - start),
        }
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end - self.start
    }

    /// `HH:MM-HH:MM` label
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            to_clock(self.start.max(0) as u32),
            to_clock(self.end.max(0) as u32)
        )
    }
}

/// Find gaps of at least `min_gap` minutes between tasks inside
/// `[window_start, window_end)`.
///
/// Tasks with non-positive duration cover nothing. Overlapping tasks are
/// merged. Gaps come back sorted by start.
pub fn find_free_gaps(
    tasks: &[Task],
    window_start: i32,
    window_end: i32,
    min_gap: i32,
) -> Vec<FreeGap> {
    let mut spans: Vec<(i32, i32)> = tasks
        .iter()
        .filter(|t| t.duration_minutes() > 0)
        .map(|t| (t.start_minutes(), t.end_minutes()))
        .collect();
    spans.sort_unstable();

    let mut gaps = Vec::new();
    let mut last_end = window_start;

    for (start, end) in spans {
        // Skip spans that end before our current position
        if end <= last_end {
            continue;
        }
        if start >= window_end {
            break;
        }
        if start > last_end && start - last_end >= min_gap {
            gaps.push(FreeGap::new(last_end, start.min(window_end)));
        }
        last_end = last_end.max(end.min(window_end));
    }

    if window_end - last_end >= min_gap && last_end < window_end {
        gaps.push(FreeGap::new(last_end, window_end));
    }

    gaps
}
