//! Render geometry for a day's task blocks.

use serde::{Deserialize, Serialize};

use super::lanes::{assign_lanes, sorted_by_start};
use crate::policy::ViewPolicy;
use crate::schedule::Task;

/// Where a renderer should draw one task block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPlacement {
    pub task_id: String,
    pub lane: usize,
    pub lane_count: usize,
    pub left_fraction: f64,
    pub width_fraction: f64,
    pub top_px: f64,
    pub height_px: f64,
}

/// Compute placements for every task, in start order.
///
/// Blocks shorter than `min_drag_minutes` are drawn at that height so they
/// stay grabbable; this does not change the task's stored times.
pub fn layout_day(tasks: &[Task], view: &ViewPolicy) -> Vec<BlockPlacement> {
    let slots = assign_lanes(tasks);
    let ppm = view.pixels_per_minute();
    let min_height = view.min_drag_minutes as f64 * ppm;

    sorted_by_start(tasks)
        .into_iter()
        .filter_map(|task| {
            let slot = slots.get(&task.id)?;
            let offset = (task.start_minutes() - view.view_start()) as f64;
            Some(BlockPlacement {
                task_id: task.id.clone(),
                lane: slot.lane,
                lane_count: slot.lane_count,
                left_fraction: slot.left_fraction(),
                width_fraction: slot.width_fraction(),
                top_px: offset * ppm,
                height_px: (task.duration_minutes() as f64 * ppm).max(min_height),
            })
        })
        .collect()
}
