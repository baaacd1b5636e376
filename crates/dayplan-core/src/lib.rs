//! # Dayplan Core Library
//!
//! This library provides the scheduling and layout engine behind the
//! `dayplan` day planner. Every operation is available via the standalone
//! CLI binary; a GUI would be a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Timeline**: Lane assignment and block placement for a day view, plus
//!   free-gap detection
//! - **Scheduler**: Deterministic first-fit fallback that packs flexible tasks
//!   around fixed ones
//! - **Optimizer**: Advisor request, reply validation and a staged
//!   propose/apply/discard workflow, falling back to the scheduler
//! - **Drag**: Pointer-driven reschedule state machine with snapping and
//!   clamping
//! - **Storage**: SQLite task and tag persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`assign_lanes`]: Overlap groups and first-fit lanes
//! - [`FallbackScheduler`]: Local rearrangement that cannot fail
//! - [`PlanOptimizer`]: Strategy-ordered optimization orchestrator
//! - [`ProposalSlot`]: Holds a pending plan apart from the live set
//! - [`DragController`]: Interactive drag gesture handling
//! - [`PlanDb`]: Plan persistence
//! - [`Config`]: Application configuration management

pub mod drag;
pub mod error;
pub mod events;
pub mod optimizer;
pub mod policy;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod timeline;

pub use drag::{DragController, DragOutcome, DragPreview, DragState};
pub use error::{AdvisorError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::PlanEvent;
pub use optimizer::{
    Advisor, AdvisorConfig, AdvisorStatus, HttpAdvisor, PlanOptimizer, PlanProposal, PlanStrategy,
    ProposalSlot, StrategyOutcome,
};
pub use policy::{SchedulingPolicy, ViewPolicy};
pub use schedule::{Clock, PlanState, Tag, Task};
pub use scheduler::{fallback_optimize, FallbackScheduler, OptimizedPlan, PlanProvider};
pub use storage::{Config, PlanDb, PlanStore};
pub use timeline::{assign_lanes, find_free_gaps, layout_day, BlockPlacement, FreeGap, LaneSlot};
