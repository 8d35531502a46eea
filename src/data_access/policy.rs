//! Data access policy
//!
//! Evaluates access levels declared on projects, tasks and users against a
//! [`LevelRegistry`]. Every check is a pure function of its inputs and the
//! registry snapshot the policy was built with.

use crate::data_access::registry::LevelRegistry;
use crate::data_access::types::LevelSet;
use crate::error::DataAccessError;
use crate::model::{Project, Task, User};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Access level policy over one registry snapshot
#[derive(Debug, Clone)]
pub struct DataAccessPolicy {
    registry: Arc<LevelRegistry>,
}

impl DataAccessPolicy {
    pub fn new(registry: Arc<LevelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    pub fn is_enabled(&self) -> bool {
        self.registry.is_enabled()
    }

    /// Levels a project may declare, given the levels a task declares
    pub fn valid_project_levels_for_task_levels(&self, task_levels: &LevelSet) -> LevelSet {
        self.registry
            .project_levels_for_task_level()
            .permitted(task_levels)
    }

    /// Levels a task may declare, given the levels a project declares
    pub fn valid_task_levels_for_project_levels(&self, project_levels: &LevelSet) -> LevelSet {
        self.registry
            .task_levels_for_project_level()
            .permitted(project_levels)
    }

    /// Task levels reachable from the levels a user declares
    pub fn valid_task_levels_for_user_levels(&self, user_levels: &LevelSet) -> LevelSet {
        self.registry
            .task_levels_for_user_level()
            .permitted(user_levels)
    }

    /// Levels the task's owning project may declare
    pub fn valid_project_levels_for_task(&self, task: &Task) -> LevelSet {
        self.valid_project_levels_for_task_levels(&task.data_access())
    }

    /// Levels the project's tasks may declare
    pub fn valid_task_levels_for_project(&self, project: &Project) -> LevelSet {
        self.valid_task_levels_for_project_levels(&project.data_access())
    }

    /// Check whether a user with `user_levels` may work on a project or task
    /// declaring `project_levels`.
    ///
    /// Unrecognised levels on either side deny the assignment. A project
    /// without levels places no restriction. Always allowed when enforcement
    /// is disabled.
    pub fn can_assign_user(&self, project_levels: &LevelSet, user_levels: &LevelSet) -> bool {
        if !self.registry.is_enabled() {
            return true;
        }

        let unknown_project = self.registry.unrecognized(project_levels);
        let unknown_user = self.registry.unrecognized(user_levels);
        if !unknown_project.is_empty() || !unknown_user.is_empty() {
            warn!(
                project_levels = ?unknown_project,
                user_levels = ?unknown_user,
                "Unrecognized access levels, denying assignment"
            );
            return false;
        }

        if project_levels.is_empty() {
            trace!("Project declares no access levels");
            return true;
        }

        let permitted = self
            .registry
            .user_levels_for_project_task_level()
            .permitted(project_levels);
        let allowed = !permitted.is_disjoint(user_levels);

        debug!(
            project_levels = ?project_levels,
            user_levels = ?user_levels,
            allowed,
            "Checked user assignment"
        );
        allowed
    }

    /// [`can_assign_user`](Self::can_assign_user) over the entities themselves
    pub fn can_assign_user_to_project(&self, user: &User, project: &Project) -> bool {
        self.can_assign_user(&project.data_access(), &user.data_access)
    }

    /// Validate that `task` may belong to `project`
    ///
    /// Each side's declared levels must fall within what the other side's
    /// levels permit, and the project must carry an external tracking id.
    /// Always passes when enforcement is disabled.
    pub fn ensure_task_assignment_to_project(
        &self,
        task: &Task,
        project: &Project,
    ) -> Result<(), DataAccessError> {
        if !self.registry.is_enabled() {
            return Ok(());
        }

        let task_levels = task.data_access();
        let project_levels = project.data_access();

        debug!(
            project_id = project.id,
            task_levels = ?task_levels,
            project_levels = ?project_levels,
            "Checking task assignment"
        );

        let allowed_project = self.valid_project_levels_for_task_levels(&task_levels);
        let allowed_task = self.valid_task_levels_for_project_levels(&project_levels);

        let project_rejects = !task_levels.is_empty() && project_levels.is_disjoint(&allowed_project);
        let task_rejects = !project_levels.is_empty() && task_levels.is_disjoint(&allowed_task);

        if project_rejects || task_rejects {
            warn!(
                project_id = project.id,
                task_levels = ?task_levels,
                project_levels = ?project_levels,
                "Task access levels incompatible with project"
            );
            return Err(DataAccessError::LevelMismatch {
                task_levels,
                project_levels,
            });
        }

        if project.tracking_id().is_none() {
            warn!(project_id = project.id, "Project tracking id missing");
            return Err(DataAccessError::MissingTrackingId {
                project_id: project.id,
            });
        }

        Ok(())
    }

    /// Check the levels a user declares against those their user type allows
    ///
    /// Returns whether every level is allowed, and the offending levels.
    /// User types missing from the table allow nothing.
    pub fn valid_user_type_based_data_access(
        &self,
        user_type: &str,
        declared: &LevelSet,
    ) -> (bool, LevelSet) {
        let allowed = self
            .registry
            .access_levels_for_user_types()
            .allowed(user_type);
        let invalid: LevelSet = declared.difference(&allowed).cloned().collect();

        if !invalid.is_empty() {
            debug!(user_type, invalid = ?invalid, "User type does not allow levels");
        }

        (invalid.is_empty(), invalid)
    }

    /// [`valid_user_type_based_data_access`](Self::valid_user_type_based_data_access)
    /// for a user record; a user without a type may declare no levels
    pub fn validate_user(&self, user: &User) -> (bool, LevelSet) {
        self.valid_user_type_based_data_access(
            user.user_type.as_deref().unwrap_or_default(),
            &user.data_access,
        )
    }
}
