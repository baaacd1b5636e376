//! Lane assignment for temporally overlapping tasks.
//!
//! Tasks are swept in start order and cut into overlap groups: a task joins
//! the open group while it starts before the group's running maximum end.
//! Inside a group lanes are packed first-fit, and every member reports the
//! group's lane count so a renderer can split the column evenly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schedule::Task;

/// Horizontal slot of one task within its overlap group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSlot {
    /// 0-based lane index.
    pub lane: usize,
    /// Number of lanes opened by the task's overlap group.
    pub lane_count: usize,
}

impl LaneSlot {
    /// Horizontal offset as a fraction of the column width.
    pub fn left_fraction(&self) -> f64 {
        self.lane as f64 / self.lane_count.max(1) as f64
    }

    /// Width as a fraction of the column width.
    pub fn width_fraction(&self) -> f64 {
        1.0 / self.lane_count.max(1) as f64
    }
}

/// Tasks sorted by start minute, ties in input order.
pub(crate) fn sorted_by_start(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    // sort_by_key is stable
    sorted.sort_by_key(|t| t.start_minutes());
    sorted
}

/// Split start-sorted tasks into maximal runs of transitively overlapping tasks.
pub(crate) fn overlap_groups<'a>(sorted: &[&'a Task]) -> Vec<Vec<&'a Task>> {
    let mut groups: Vec<Vec<&Task>> = Vec::new();
    let mut group_end = i32::MIN;

    for &task in sorted {
        match groups.last_mut() {
            Some(group) if task.start_minutes() < group_end => {
                group.push(task);
                group_end = group_end.max(task.end_minutes());
            }
            _ => {
                groups.push(vec![task]);
                group_end = task.end_minutes();
            }
        }
    }

    groups
}

/// First-fit lane packing of one group. Returns the lane per member and the
/// number of lanes opened.
fn pack_group(group: &[&Task]) -> (Vec<usize>, usize) {
    let mut lane_ends: Vec<i32> = Vec::new();
    let lanes = group
        .iter()
        .map(|task| {
            let lane = lane_ends
                .iter()
                .position(|&end| end <= task.start_minutes())
                .unwrap_or_else(|| {
                    lane_ends.push(task.end_minutes());
                    lane_ends.len() - 1
                });
            lane_ends[lane] = task.end_minutes();
            lane
        })
        .collect();
    (lanes, lane_ends.len())
}

/// Assign a lane and lane count to every task of one day.
///
/// Total over any finite list; an empty input yields an empty map.
pub fn assign_lanes(tasks: &[Task]) -> HashMap<String, LaneSlot> {
    let sorted = sorted_by_start(tasks);
    let mut slots = HashMap::with_capacity(tasks.len());

    for group in overlap_groups(&sorted) {
        let (lanes, lane_count) = pack_group(&group);
        tracing::debug!(members = group.len(), lane_count, "packed overlap group");
        for (task, lane) in group.iter().zip(lanes) {
            slots.insert(task.id.clone(), LaneSlot { lane, lane_count });
        }
    }

    slots
}
