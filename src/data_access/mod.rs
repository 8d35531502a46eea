//! Data access levels
//!
//! Access levels are opaque tokens declared on projects, tasks and users.
//! Configured compatibility tables say which levels may be combined:
//!
//! ```text
//! task level    → project levels   (valid_project_levels_for_task_level)
//! project level → task levels      (valid_task_levels_for_project_level)
//! project level → user levels      (valid_user_levels_for_project_task_level)
//! user level    → task levels      (valid_task_levels_for_user_level)
//! user type     → levels           (valid_access_levels_for_user_types)
//! ```
//!
//! The policy enforces them in three places:
//! - assigning a user to a project or task ([`DataAccessPolicy::can_assign_user`])
//! - saving a task into a project ([`DataAccessPolicy::ensure_task_assignment_to_project`])
//! - declaring levels for a user ([`DataAccessPolicy::valid_user_type_based_data_access`])
//!
//! ## Example Configuration
//!
//! ```toml
//! [data_access]
//! enabled = true
//! valid_access_levels = ["L1", "L2"]
//!
//! [data_access.valid_user_levels_for_project_task_level]
//! L2 = ["L1"]
//!
//! [data_access.valid_access_levels_for_user_types]
//! Researcher = ["L1"]
//! ```

pub mod policy;
pub mod registry;
pub mod types;

pub use policy::DataAccessPolicy;
pub use registry::{LevelRegistry, RegistryHandle};
pub use types::{AccessLevel, CompatibilityTable, LevelSet, UserTypeTable, level_set};
