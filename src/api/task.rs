//! Task resource rules
//!
//! Payload checks and attribute handling for create, update and read of
//! tasks. Routing and persistence belong to the web layer.

use crate::error::ApiError;
use crate::model::{CurrentUser, Project, Task, TaskState};
use crate::repository::TaskRepository;
use crate::util::RequiredFields;
use serde_json::{Map, Value};
use tracing::debug;

/// Keys clients may never send
pub const RESERVED_KEYS: &[&str] = &["id", "created", "state", "fav_user_ids", "calibration"];

/// Keys fixed once the task exists
pub const IMMUTABLE_KEYS: &[&str] = &["project_id"];

/// Keys hidden from callers who do not manage the project
const PRIVILEGED_KEYS: &[&str] = &["gold_answers", "calibration"];

#[derive(Debug, Clone)]
pub struct TaskApi {
    required: RequiredFields,
    default_n_answers: u32,
}

impl Default for TaskApi {
    fn default() -> Self {
        Self::new(RequiredFields::default())
    }
}

impl TaskApi {
    pub fn new(required: RequiredFields) -> Self {
        Self {
            required,
            default_n_answers: 1,
        }
    }

    /// `n_answers` for new tasks when neither payload nor project sets one
    pub fn with_default_n_answers(mut self, n_answers: u32) -> Self {
        self.default_n_answers = n_answers;
        self
    }

    /// Reject payloads carrying reserved keys
    pub fn forbidden_attributes(&self, payload: &Map<String, Value>) -> Result<(), ApiError> {
        if payload.keys().any(|k| RESERVED_KEYS.contains(&k.as_str())) {
            return Err(ApiError::bad_request("Reserved keys in payload"));
        }
        Ok(())
    }

    /// Reject updates that change an immutable key
    pub fn check_immutable(&self, payload: &Map<String, Value>, existing: &Task) -> Result<(), ApiError> {
        for key in IMMUTABLE_KEYS {
            let Some(value) = payload.get(*key) else {
                continue;
            };
            let unchanged = match *key {
                "project_id" => value.as_u64() == Some(existing.project_id),
                _ => true,
            };
            if !unchanged {
                return Err(ApiError::bad_request(format!("{} cannot be changed", key)));
            }
        }
        Ok(())
    }

    /// Validate and complete a create payload
    ///
    /// Fails with a conflict when the project already has a task with the
    /// same `info`.
    pub fn preprocess_post_data(
        &self,
        payload: &mut Map<String, Value>,
        project: &Project,
        tasks: &dyn TaskRepository,
    ) -> Result<(), ApiError> {
        let info = payload
            .get("info")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ApiError::bad_request("Missing or invalid info"))?;

        if let Some(task_id) = tasks.find_duplicate(project.id, &info) {
            debug!(project_id = project.id, task_id, "Duplicate task");
            return Err(ApiError::duplicate_task(task_id));
        }

        if !payload.contains_key("n_answers") {
            payload.insert(
                "n_answers".to_string(),
                Value::from(project.default_n_answers(self.default_n_answers)),
            );
        }

        let invalid = self.required.validate(&info);
        if !invalid.is_empty() {
            return Err(ApiError::bad_request(format!(
                "Missing or incorrect required fields: {}",
                invalid.join(",")
            )));
        }

        if payload
            .get("gold_answers")
            .and_then(Value::as_object)
            .is_some_and(|answers| !answers.is_empty())
        {
            payload.insert("calibration".to_string(), Value::from(1));
            payload.insert("exported".to_string(), Value::Bool(true));
        }

        Ok(())
    }

    /// Recompute derived attributes of an updated task
    ///
    /// A completed task reopens when it became a gold task, or when more
    /// answers are now wanted than it has received.
    pub fn update_attribute(&self, new: &mut Task, old: &Task) {
        let gold = new.is_gold();
        if new.state == TaskState::Completed {
            let wants_more = old.n_answers < new.n_answers
                && new.task_run_count < new.n_answers as usize;
            if gold || wants_more {
                new.state = TaskState::Ongoing;
            }
        }
        new.calibration = u8::from(gold);
        new.exported = gold;
    }

    /// Whether `caller` may read tasks of `project`
    pub fn verify_auth(&self, caller: &CurrentUser, password_needed: bool) -> bool {
        if caller.is_anonymous() {
            return false;
        }
        if caller.is_admin() || caller.is_subadmin() {
            return true;
        }
        !password_needed
    }

    /// Drop privileged attributes unless the caller manages the project
    pub fn select_attributes(
        &self,
        mut payload: Map<String, Value>,
        caller: &CurrentUser,
        project: &Project,
    ) -> Map<String, Value> {
        let owner = caller.id().is_some_and(|id| project.is_owner(id));
        if caller.is_admin() || (caller.is_subadmin() && owner) {
            return payload;
        }
        for key in PRIVILEGED_KEYS {
            payload.remove(*key);
        }
        payload
    }

    /// Admins and project owners receive signed tasks
    pub fn should_sign(&self, caller: &CurrentUser, project: &Project) -> bool {
        caller.is_admin() || caller.id().is_some_and(|id| project.is_owner(id))
    }
}
