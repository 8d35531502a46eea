//! Data access level integration tests

use crowdguard::data_access::{
    CompatibilityTable, DataAccessPolicy, LevelRegistry, LevelSet, RegistryHandle, UserTypeTable,
    level_set,
};
use crowdguard::error::{DataAccessError, RepositoryError};
use crowdguard::model::{Project, Task, User};
use crowdguard::repository::{
    GuardedTaskRepository, InMemoryProjectRepository, InMemoryTaskRepository, TaskRepository,
};
use rstest::rstest;
use serde_json::Map;
use std::sync::Arc;

fn table<const N: usize>(entries: [(&str, Vec<&str>); N]) -> CompatibilityTable {
    entries.into_iter().collect()
}

/// Four-level registry used across the level tests
fn levels_registry() -> LevelRegistry {
    LevelRegistry::new(level_set(["L1", "L2", "L3", "L4"]))
        .with_user_levels_for_project_task_level(table([
            ("L1", vec![]),
            ("L2", vec!["L1"]),
            ("L3", vec!["L1", "L2"]),
            ("L4", vec!["L1", "L2", "L3"]),
        ]))
        .with_task_levels_for_user_level(table([
            ("L1", vec!["L2", "L3", "L4"]),
            ("L2", vec!["L3", "L4"]),
            ("L3", vec!["L4"]),
            ("L4", vec![]),
        ]))
        .with_project_levels_for_task_level(table([
            ("L1", vec!["L1"]),
            ("L2", vec!["L1", "L2"]),
            ("L3", vec!["L1", "L2", "L3"]),
            ("L4", vec!["L1", "L2", "L3", "L4"]),
        ]))
        .with_task_levels_for_project_level(table([
            ("L1", vec!["L1", "L2", "L3", "L4"]),
            ("L2", vec!["L2", "L3", "L4"]),
            ("L3", vec!["L3", "L4"]),
            ("L4", vec!["L4"]),
        ]))
}

fn policy(registry: LevelRegistry) -> DataAccessPolicy {
    DataAccessPolicy::new(Arc::new(registry))
}

fn project_with(levels: &[&str], tracking_id: Option<&str>) -> Project {
    let mut project = Project::new(1, "birds");
    project.set_data_access(levels.iter().copied());
    if let Some(tracking_id) = tracking_id {
        project.set_tracking_id(tracking_id);
    }
    project
}

fn task_with(levels: &[&str]) -> Task {
    let mut task = Task::new(1, Map::new());
    task.set_data_access(levels.iter().copied());
    task
}

#[rstest]
#[case(&["L3"], &["L2", "L4"], true)]
#[case(&["L5"], &["L2", "L4"], false)]
#[case(&["L3"], &["L2", "L6"], false)]
#[case(&["L1"], &["L2", "L4"], false)]
#[case(&["L2"], &["L1"], true)]
fn test_can_assign_user(
    #[case] project_levels: &[&str],
    #[case] user_levels: &[&str],
    #[case] expected: bool,
) {
    let policy = policy(levels_registry());
    assert_eq!(
        policy.can_assign_user(
            &level_set(project_levels.iter().copied()),
            &level_set(user_levels.iter().copied())
        ),
        expected
    );
}

#[test]
fn test_can_assign_unrestricted_project() {
    let policy = policy(levels_registry());
    assert!(policy.can_assign_user(&LevelSet::new(), &level_set(["L4"])));
}

#[test]
fn test_can_assign_user_to_project() {
    let policy = policy(levels_registry());
    let project = project_with(&["L3"], None);

    let mut user = User::new(7, "ada");
    user.data_access = level_set(["L2"]);
    assert!(policy.can_assign_user_to_project(&user, &project));

    user.data_access = level_set(["L4"]);
    assert!(!policy.can_assign_user_to_project(&user, &project));
}

#[test]
fn test_valid_project_levels_for_task() {
    let policy = policy(
        levels_registry().with_project_levels_for_task_level(table([("A", vec!["B"])])),
    );

    let mut task = task_with(&[]);
    assert!(policy.valid_project_levels_for_task(&task).is_empty());

    task.set_data_access(["A"]);
    assert_eq!(policy.valid_project_levels_for_task(&task), level_set(["B"]));
}

#[test]
fn test_valid_task_levels_for_project() {
    let policy = policy(
        levels_registry()
            .with_task_levels_for_project_level(table([("A", vec!["B"]), ("B", vec!["C"])])),
    );

    let mut project = project_with(&[], None);
    assert!(policy.valid_task_levels_for_project(&project).is_empty());

    project.set_data_access(["A", "B"]);
    assert_eq!(
        policy.valid_task_levels_for_project(&project),
        level_set(["B", "C"])
    );
}

#[test]
fn test_ensure_task_assignment_to_project() {
    let policy = policy(
        levels_registry()
            .with_project_levels_for_task_level(table([("A", vec!["A"])]))
            .with_task_levels_for_project_level(table([("A", vec!["A"])])),
    );

    // Nothing declared and no tracking id
    let mut project = project_with(&[], None);
    let mut task = task_with(&[]);
    assert!(matches!(
        policy.ensure_task_assignment_to_project(&task, &project),
        Err(DataAccessError::MissingTrackingId { project_id: 1 })
    ));

    project.set_data_access(["A"]);
    assert!(matches!(
        policy.ensure_task_assignment_to_project(&task, &project),
        Err(DataAccessError::LevelMismatch { .. })
    ));

    project.set_data_access(Vec::<String>::new());
    task.set_data_access(["A"]);
    assert!(matches!(
        policy.ensure_task_assignment_to_project(&task, &project),
        Err(DataAccessError::LevelMismatch { .. })
    ));

    project.set_data_access(["A", "B"]);
    assert!(matches!(
        policy.ensure_task_assignment_to_project(&task, &project),
        Err(DataAccessError::MissingTrackingId { .. })
    ));

    project.set_tracking_id("123");
    assert!(policy.ensure_task_assignment_to_project(&task, &project).is_ok());
}

#[test]
fn test_mismatch_message() {
    let policy = policy(
        levels_registry()
            .with_project_levels_for_task_level(table([("A", vec!["B"])]))
            .with_task_levels_for_project_level(table([("B", vec!["C"])])),
    );
    let err = policy
        .ensure_task_assignment_to_project(&task_with(&["A"]), &project_with(&["B"], Some("1")))
        .unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"Invalid or insufficient permission for task assignment: task levels [A] are not compatible with project levels [B]"
    );
}

#[test]
fn test_guard_disabled() {
    let policy = policy(LevelRegistry::disabled());
    assert!(
        policy
            .ensure_task_assignment_to_project(&task_with(&["A"]), &project_with(&["B"], None))
            .is_ok()
    );
}

fn guarded_repository(
    policy: DataAccessPolicy,
    project: Project,
) -> GuardedTaskRepository<InMemoryTaskRepository> {
    let projects = InMemoryProjectRepository::new();
    projects.insert(project);
    GuardedTaskRepository::new(InMemoryTaskRepository::new(), Arc::new(projects), policy)
}

#[test]
fn test_task_save_sufficient_permissions() {
    let policy = policy(
        levels_registry()
            .with_project_levels_for_task_level(table([("A", vec!["A"])]))
            .with_task_levels_for_project_level(table([("A", vec!["A"])])),
    );
    let repo = guarded_repository(policy, project_with(&["A"], Some("123")));

    let saved = repo.save(task_with(&["A"])).unwrap();
    let id = saved.id.unwrap();
    assert_eq!(repo.get(id).unwrap().data_access(), level_set(["A"]));
    assert_eq!(repo.filter_by_project(1).len(), 1);
}

#[test]
fn test_task_save_insufficient_permissions() {
    let policy = policy(
        levels_registry()
            .with_project_levels_for_task_level(table([("A", vec!["B"])]))
            .with_task_levels_for_project_level(table([("B", vec!["C"])])),
    );
    let repo = guarded_repository(policy, project_with(&["B"], None));

    let result = repo.save(task_with(&["A"]));
    assert!(matches!(
        result,
        Err(RepositoryError::DataAccess(DataAccessError::LevelMismatch { .. }))
    ));
    assert!(repo.inner().is_empty());
}

#[test]
fn test_task_save_unknown_project() {
    let repo = guarded_repository(policy(levels_registry()), project_with(&[], None));
    let mut task = task_with(&[]);
    task.project_id = 99;

    assert!(matches!(
        repo.save(task),
        Err(RepositoryError::ProjectNotFound(99))
    ));
}

#[test]
fn test_task_save_sees_projects_added_to_shared_store() {
    let projects = Arc::new(InMemoryProjectRepository::new());
    let repo = GuardedTaskRepository::new(
        InMemoryTaskRepository::new(),
        projects.clone(),
        policy(LevelRegistry::disabled()),
    );

    assert!(matches!(
        repo.save(task_with(&[])),
        Err(RepositoryError::ProjectNotFound(1))
    ));

    projects.insert(project_with(&[], None));
    assert!(repo.save(task_with(&[])).is_ok());
}

fn user_type_policy() -> DataAccessPolicy {
    let user_types: UserTypeTable = [
        ("Researcher", vec!["L1"]),
        ("Curator", vec!["L3", "L4"]),
    ]
    .into_iter()
    .collect();
    policy(levels_registry().with_access_levels_for_user_types(user_types))
}

#[rstest]
#[case("Researcher", &["L1"], true, &[])]
#[case("Curator", &["L3", "L4"], true, &[])]
#[case("Curator", &["L1"], false, &["L1"])]
#[case("Visitor", &["L1"], false, &["L1"])]
#[case("Visitor", &[], true, &[])]
fn test_user_type_based_access_levels(
    #[case] user_type: &str,
    #[case] declared: &[&str],
    #[case] valid: bool,
    #[case] invalid: &[&str],
) {
    let (ok, offending) = user_type_policy()
        .valid_user_type_based_data_access(user_type, &level_set(declared.iter().copied()));
    assert_eq!(ok, valid);
    assert_eq!(offending, level_set(invalid.iter().copied()));
}

#[test]
fn test_validate_user_record() {
    let policy = user_type_policy();
    let mut user = User::new(3, "cur");
    user.user_type = Some("Curator".to_string());
    user.data_access = level_set(["L3"]);
    assert_eq!(policy.validate_user(&user), (true, LevelSet::new()));

    user.user_type = None;
    assert_eq!(policy.validate_user(&user), (false, level_set(["L3"])));
}

#[test]
fn test_checks_are_idempotent() {
    let policy = policy(levels_registry());
    let project = level_set(["L3"]);
    let user = level_set(["L2", "L4"]);

    let first = policy.can_assign_user(&project, &user);
    assert_eq!(policy.can_assign_user(&project, &user), first);

    let task = task_with(&["L2"]);
    assert_eq!(
        policy.valid_project_levels_for_task(&task),
        policy.valid_project_levels_for_task(&task)
    );
}

#[test]
fn test_registry_handle_swap_keeps_snapshot() {
    let handle = RegistryHandle::new(levels_registry());
    let snapshot = DataAccessPolicy::new(handle.current());

    handle.swap(LevelRegistry::disabled());

    assert!(snapshot.is_enabled());
    assert!(!DataAccessPolicy::new(handle.current()).is_enabled());
}

#[test]
fn test_registry_from_config() {
    let config = crowdguard::config::load_config_from_str(
        r#"
[data_access]
enabled = true
valid_access_levels = ["l1", "l2"]

[data_access.valid_user_levels_for_project_task_level]
l1 = []
l2 = ["l1"]
"#,
    )
    .unwrap();

    let policy = policy(LevelRegistry::from_config(&config.data_access).unwrap());
    assert!(policy.can_assign_user(&level_set(["l2"]), &level_set(["l1"])));
    assert!(!policy.can_assign_user(&level_set(["l1"]), &level_set(["l1"])));
}
