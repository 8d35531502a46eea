//! REST resource rules
//!
//! Resource-specific hooks the generic CRUD layer calls around each
//! request: payload validation before a write, derived attributes on update,
//! and attribute selection before a response goes out.

pub mod project_stats;
pub mod task;

pub use project_stats::ProjectStatsApi;
pub use task::TaskApi;
