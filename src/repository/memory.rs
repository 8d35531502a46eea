//! In-memory repositories
//!
//! Reference backends for embedding without a database, and for tests.

use crate::error::{RepositoryError, RepositoryResult};
use crate::model::{Project, Task};
use crate::repository::{ProjectLookup, TaskRepository};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Task store keyed by id
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<u64, Task>>,
    next_id: AtomicU64,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().map(|t| t.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn save(&self, mut task: Task) -> RepositoryResult<Task> {
        let mut tasks = match self.tasks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let id = match task.id {
            Some(id) if tasks.contains_key(&id) => id,
            Some(id) => return Err(RepositoryError::NotFound(id)),
            None => self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        };
        task.id = Some(id);
        tasks.insert(id, task.clone());
        Ok(task)
    }

    fn get(&self, id: u64) -> Option<Task> {
        self.tasks.read().ok()?.get(&id).cloned()
    }

    fn find_duplicate(&self, project_id: u64, info: &Map<String, Value>) -> Option<u64> {
        self.tasks
            .read()
            .ok()?
            .values()
            .find(|t| t.project_id == project_id && &t.info == info)
            .and_then(|t| t.id)
    }

    fn filter_by_project(&self, project_id: u64) -> Vec<Task> {
        let Ok(tasks) = self.tasks.read() else {
            return Vec::new();
        };
        let mut found: Vec<Task> = tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        found.sort_by_key(|t| t.id);
        found
    }
}

/// Project store keyed by id
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: RwLock<HashMap<u64, Project>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, project: Project) {
        let mut projects = match self.projects.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        projects.insert(project.id, project);
    }
}

impl ProjectLookup for InMemoryProjectRepository {
    fn get_project(&self, id: u64) -> Option<Project> {
        let projects = match self.projects.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        projects.get(&id).cloned()
    }
}
