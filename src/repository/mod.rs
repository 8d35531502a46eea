//! Task persistence
//!
//! The storage backend sits behind [`TaskRepository`]. Wrapping a backend
//! in [`GuardedTaskRepository`] makes every save pass the data access
//! consistency guard first; a rejected task never reaches the backend.

mod memory;

pub use memory::{InMemoryProjectRepository, InMemoryTaskRepository};

use crate::data_access::DataAccessPolicy;
use crate::error::{RepositoryError, RepositoryResult};
use crate::model::{Project, Task};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Task storage backend
pub trait TaskRepository: Send + Sync {
    /// Insert a new task (assigning its id) or replace an existing one
    fn save(&self, task: Task) -> RepositoryResult<Task>;

    fn get(&self, id: u64) -> Option<Task>;

    /// Id of a task in the project with exactly this `info`
    fn find_duplicate(&self, project_id: u64, info: &Map<String, Value>) -> Option<u64>;

    fn filter_by_project(&self, project_id: u64) -> Vec<Task>;
}

/// Project lookup used to resolve a task's owner
pub trait ProjectLookup: Send + Sync {
    fn get_project(&self, id: u64) -> Option<Project>;
}

/// Task repository enforcing the data access consistency guard
pub struct GuardedTaskRepository<R> {
    inner: R,
    projects: Arc<dyn ProjectLookup>,
    policy: DataAccessPolicy,
}

impl<R: TaskRepository> GuardedTaskRepository<R> {
    pub fn new(inner: R, projects: Arc<dyn ProjectLookup>, policy: DataAccessPolicy) -> Self {
        Self {
            inner,
            projects,
            policy,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn policy(&self) -> &DataAccessPolicy {
        &self.policy
    }
}

impl<R: TaskRepository> TaskRepository for GuardedTaskRepository<R> {
    fn save(&self, task: Task) -> RepositoryResult<Task> {
        let project = self
            .projects
            .get_project(task.project_id)
            .ok_or(RepositoryError::ProjectNotFound(task.project_id))?;

        self.policy
            .ensure_task_assignment_to_project(&task, &project)?;

        debug!(project_id = project.id, task_id = ?task.id, "Saving task");
        self.inner.save(task)
    }

    fn get(&self, id: u64) -> Option<Task> {
        self.inner.get(id)
    }

    fn find_duplicate(&self, project_id: u64, info: &Map<String, Value>) -> Option<u64> {
        self.inner.find_duplicate(project_id, info)
    }

    fn filter_by_project(&self, project_id: u64) -> Vec<Task> {
        self.inner.filter_by_project(project_id)
    }
}
