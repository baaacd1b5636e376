//! Interactive drag rescheduling.
//!
//! The controller is a pointer-driven state machine. It has no timers:
//! the caller forwards pointer positions and the controller rewrites the
//! dragged task's times in place.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Dragging -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut drag = DragController::new(view);
//! drag.begin(&task, pointer_y);
//! drag.pointer_move(pointer_y, &mut tasks); // Some(DragPreview) while moving
//! drag.release(pointer_y, &mut tasks);      // Some(DragOutcome) ends the gesture
//! ```
//!
//! Live previews may overlap other tasks; only the view bounds are enforced.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::PlanEvent;
use crate::policy::ViewPolicy;
use crate::schedule::{round_to_grid, Clock, Task};

/// Captured at pointer-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    pub task_id: String,
    pub origin_y: f64,
    /// Times to restore when the gesture turns out to be a click.
    pub original_start: Clock,
    pub original_end: Clock,
    /// Dragged length in minutes, never below the view's floor.
    pub duration: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DragState {
    Idle,
    Dragging(DragSession),
}

/// Live feedback for the block being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPreview {
    pub task_id: String,
    pub start_time: Clock,
    pub end_time: Clock,
    /// Times on the coarse grid, `HH:MM-HH:MM`.
    pub label: String,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragOutcome {
    /// Movement stayed under the click threshold; open the task for editing.
    Clicked { task_id: String },
    Moved {
        task_id: String,
        start_time: Clock,
        end_time: Clock,
    },
}

impl DragOutcome {
    pub fn event(&self) -> PlanEvent {
        let at = Utc::now();
        match self {
            Self::Clicked { task_id } => PlanEvent::TaskClicked {
                task_id: task_id.clone(),
                at,
            },
            Self::Moved {
                task_id,
                start_time,
                end_time,
            } => PlanEvent::TaskMoved {
                task_id: task_id.clone(),
                start_time: *start_time,
                end_time: *end_time,
                at,
            },
        }
    }
}

/// Drag gesture controller for one timeline view.
#[derive(Debug, Clone)]
pub struct DragController {
    view: ViewPolicy,
    state: DragState,
}

impl DragController {
    pub fn new(view: ViewPolicy) -> Self {
        Self {
            view,
            state: DragState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn view(&self) -> &ViewPolicy {
        &self.view
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Pointer-down on a block. Returns false if a gesture is already active.
    pub fn begin(&mut self, task: &Task, pointer_y: f64) -> bool {
        if self.is_dragging() {
            return false;
        }
        let duration = task.duration_minutes().max(self.view.min_drag_minutes as i32);
        tracing::debug!(task_id = %task.id, duration, "drag started");
        self.state = DragState::Dragging(DragSession {
            task_id: task.id.clone(),
            origin_y: pointer_y,
            original_start: task.start_time,
            original_end: task.end_time,
            duration,
        });
        true
    }

    /// Pointer moved while pressed.
    ///
    /// Rewrites the dragged task's times on the fine grid once the pointer
    /// has left the click threshold. Returns `None` when idle, below the
    /// threshold, for a block longer than the view, or when the task is no
    /// longer in `tasks`.
    pub fn pointer_move(&mut self, pointer_y: f64, tasks: &mut [Task]) -> Option<DragPreview> {
        let DragState::Dragging(session) = &self.state else {
            return None;
        };
        if !self.passes_threshold(session, pointer_y) || !self.fits_view(session) {
            return None;
        }

        let start = self.target_start(session, pointer_y, self.view.live_grid as i32);
        let label_start = self.target_start(session, pointer_y, self.view.commit_grid as i32);
        let task = tasks.iter_mut().find(|t| t.id == session.task_id)?;
        write_times(task, start, session.duration);

        Some(DragPreview {
            task_id: session.task_id.clone(),
            start_time: task.start_time,
            end_time: task.end_time,
            label: format!(
                "{}-{}",
                Clock::clamped(label_start),
                Clock::clamped(label_start + session.duration)
            ),
        })
    }

    /// Pointer released. Always ends the gesture.
    ///
    /// Net travel under the click threshold restores the original times and
    /// reports a click. So does any release of a block longer than the view,
    /// since it has no position that keeps both its duration and the view
    /// end. Otherwise the start snaps to the coarse grid, the
    /// end follows from the kept duration, and the move is committed.
    pub fn release(&mut self, pointer_y: f64, tasks: &mut [Task]) -> Option<DragOutcome> {
        let DragState::Dragging(session) = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return None;
        };
        let task = tasks.iter_mut().find(|t| t.id == session.task_id);

        if !self.passes_threshold(&session, pointer_y) || !self.fits_view(&session) {
            if let Some(task) = task {
                task.start_time = session.original_start;
                task.end_time = session.original_end;
            }
            tracing::debug!(task_id = %session.task_id, "drag resolved as click");
            return Some(DragOutcome::Clicked {
                task_id: session.task_id,
            });
        }

        let start = self.target_start(&session, pointer_y, self.view.commit_grid as i32);
        let Some(task) = task else {
            tracing::debug!(task_id = %session.task_id, "dragged task vanished before release");
            return None;
        };
        write_times(task, start, session.duration);
        tracing::debug!(task_id = %task.id, start = %task.start_time, end = %task.end_time, "drag committed");

        Some(DragOutcome::Moved {
            task_id: session.task_id,
            start_time: task.start_time,
            end_time: task.end_time,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn passes_threshold(&self, session: &DragSession, pointer_y: f64) -> bool {
        (pointer_y - session.origin_y).abs() >= self.view.click_threshold_px
    }

    fn fits_view(&self, session: &DragSession) -> bool {
        session.duration <= self.view.view_end() - self.view.view_start()
    }

    /// Start minute for the pointer position, on `grid`, inside the view.
    fn target_start(&self, session: &DragSession, pointer_y: f64, grid: i32) -> i32 {
        let delta = (pointer_y - session.origin_y) / self.view.drag_pixels_per_minute();
        let lo = self.view.view_start();
        let hi = (self.view.view_end() - session.duration).max(lo);
        let raw = (session.original_start.minutes() as f64 + delta)
            .clamp(lo as f64, hi as f64)
            .round() as i32;
        snap_within(raw, grid, lo, hi)
    }
}

/// Round to `grid` without leaving `[lo, hi]`.
///
/// Bounds are tightened to grid multiples first; if no multiple fits, the
/// unrounded value is kept.
fn snap_within(minutes: i32, grid: i32, lo: i32, hi: i32) -> i32 {
    if grid <= 1 {
        return minutes.clamp(lo, hi);
    }
    let lo_on_grid = (lo + grid - 1).div_euclid(grid) * grid;
    let hi_on_grid = hi.div_euclid(grid) * grid;
    if lo_on_grid > hi_on_grid {
        return minutes.clamp(lo, hi);
    }
    round_to_grid(minutes, grid).clamp(lo_on_grid, hi_on_grid)
}

fn write_times(task: &mut Task, start: i32, duration: i32) {
    task.start_time = Clock::clamped(start);
    task.end_time = Clock::clamped(start + duration);
}
