//! crowdguard
//!
//! Data-access-level permissions for a crowdsourcing platform.
//!
//! ## Features
//!
//! - **Access levels** declared on projects, tasks and users, checked against
//!   configurable compatibility tables
//! - **Assignment guard** that refuses to persist a task whose levels clash
//!   with its project
//! - **User type policy** limiting which levels a kind of user may declare
//! - **CSV importers** for tasks (file, URL or Google Drive) and users
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Level Model
//!
//! ```text
//! task levels ⇄ project levels → user levels
//!                user type     → user levels
//! ```
//!
//! Enforcement is off unless `data_access.enabled` is set. When off, every
//! table is empty and every check passes.
//!
//! ## Example Configuration
//!
//! ```toml
//! [data_access]
//! enabled = true
//! valid_access_levels = ["L1", "L2", "L3", "L4"]
//!
//! [data_access.valid_project_levels_for_task_level]
//! L1 = ["L1"]
//! L2 = ["L1", "L2"]
//!
//! [data_access.valid_access_levels_for_user_types]
//! Researcher = ["L1"]
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod data_access;
pub mod error;
pub mod importers;
pub mod model;
pub mod repository;
pub mod util;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use data_access::{DataAccessPolicy, LevelRegistry};
pub use error::{AppError, Result};
