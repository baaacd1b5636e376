//! Named scheduling and view constants.
//!
//! Both structs deserialize from the `[policy]` and `[view]` config sections
//! with every field defaulted, so a partial section only overrides what it
//! names.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::clock::{LAST_MINUTE, MINUTES_PER_DAY};

/// Constants used by the fallback scheduler and the advisor prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    /// Where the placement cursor starts (minutes since midnight).
    pub placement_start: u32,
    /// Placed tasks must end at or before this minute.
    pub placement_end: u32,
    /// Candidate step in minutes.
    pub slot_step: u32,
    /// Candidate starts examined per task before giving up.
    pub max_scan_steps: u32,
    /// Earliest time the advisor is told to use.
    pub advisor_window_start: u32,
    /// Latest time the advisor is told to use.
    pub advisor_window_end: u32,
    /// Smallest free gap listed in the plan description.
    pub min_gap_minutes: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            placement_start: 7 * 60,
            placement_end: 23 * 60,
            slot_step: 15,
            max_scan_steps: 96,
            advisor_window_start: 7 * 60,
            advisor_window_end: 22 * 60,
            min_gap_minutes: 15,
        }
    }
}

impl SchedulingPolicy {
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for a zero step or an inverted
    /// or out-of-day window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_step == 0 {
            return Err(invalid("policy.slot_step", "must be greater than zero"));
        }
        if self.placement_start >= self.placement_end || self.placement_end > MINUTES_PER_DAY {
            return Err(invalid(
                "policy.placement_end",
                "must be after placement_start and within the day",
            ));
        }
        if self.advisor_window_start >= self.advisor_window_end
            || self.advisor_window_end > LAST_MINUTE
        {
            return Err(invalid(
                "policy.advisor_window_end",
                "must be after advisor_window_start and within the day",
            ));
        }
        Ok(())
    }
}

/// Timeline geometry shared by block placement and the drag controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPolicy {
    /// First hour drawn on the timeline.
    pub day_start_hour: u32,
    /// Hour at which the timeline ends; no block may end after it.
    pub day_end_hour: u32,
    /// Static rendering scale.
    pub hour_height_px: f64,
    /// Drag divides pointer deltas by this on top of the static scale.
    pub drag_magnification: f64,
    /// Net pointer travel below this is a click.
    pub click_threshold_px: f64,
    /// Grid for live drag feedback, minutes.
    pub live_grid: u32,
    /// Grid for the drag label and committed start, minutes.
    pub commit_grid: u32,
    /// Drag target duration floor, minutes.
    pub min_drag_minutes: u32,
}

impl Default for ViewPolicy {
    fn default() -> Self {
        Self {
            day_start_hour: 6,
            day_end_hour: 23,
            hour_height_px: 64.0,
            drag_magnification: 2.0,
            click_threshold_px: 4.0,
            live_grid: 5,
            commit_grid: 15,
            min_drag_minutes: 15,
        }
    }
}

impl ViewPolicy {
    /// First visible minute.
    pub fn view_start(&self) -> i32 {
        (self.day_start_hour * 60).min(LAST_MINUTE) as i32
    }

    /// Latest minute a block may end at.
    pub fn view_end(&self) -> i32 {
        (self.day_end_hour * 60).min(LAST_MINUTE) as i32
    }

    pub fn pixels_per_minute(&self) -> f64 {
        self.hour_height_px / 60.0
    }

    /// Pixels per minute while dragging (finer than static rendering).
    pub fn drag_pixels_per_minute(&self) -> f64 {
        self.pixels_per_minute() * self.drag_magnification
    }

    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an empty view or a
    /// non-positive scale.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_start() >= self.view_end() {
            return Err(invalid("view.day_end_hour", "must be after day_start_hour"));
        }
        if self.hour_height_px <= 0.0 || self.drag_magnification <= 0.0 {
            return Err(invalid("view.hour_height_px", "scales must be positive"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
