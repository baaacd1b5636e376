//! Timeline layout.
//!
//! This module provides:
//! - Lane assignment for overlapping tasks
//! - Block placement geometry for the renderer
//! - Free gap detection between tasks

mod gap;
mod lanes;
mod layout;

pub use gap::{find_free_gaps, FreeGap, GapSize};
pub use lanes::{assign_lanes, LaneSlot};
pub use layout::{layout_day, BlockPlacement};
