use chrono::NaiveDate;
use rolepilot_application::{
    ApplicationRepository, DefaultRuleRepository, RoleRepository, UserRepository,
};
use rolepilot_core::AppError;
use rolepilot_domain::{
    Application, ApplicationId, Attribute, DefaultAssignmentRule, JobProfile, PermissionValue,
    Role, RoleId, RolePermission, RuleId, User, UserId,
};

use super::InMemoryAccessRepository;
use crate::AccessSnapshot;

fn role(id: &str) -> Role {
    Role::new(
        RoleId::new(id).unwrap_or_else(|_| panic!("id")),
        format!("Role {id}"),
        "",
        Attribute::all()
            .iter()
            .map(|attribute| RolePermission::new(*attribute, [PermissionValue::All]))
            .collect(),
    )
    .unwrap_or_else(|error| panic!("role: {error}"))
}

fn user(id: &str) -> User {
    User::new(
        UserId::new(id).unwrap_or_else(|_| panic!("id")),
        format!("User {id}"),
        JobProfile::new("HR"),
    )
    .unwrap_or_else(|error| panic!("user: {error}"))
}

#[tokio::test]
async fn snapshot_is_ordered_by_id() {
    let repository = InMemoryAccessRepository::new();
    for id in ["role-3", "role-1", "role-2"] {
        assert!(repository.save_role(role(id)).await.is_ok());
    }
    for id in ["U003", "U001"] {
        assert!(repository.save_user(user(id)).await.is_ok());
    }

    let snapshot = repository.snapshot().await;
    let role_ids: Vec<&str> = snapshot.roles.iter().map(|role| role.id().as_str()).collect();
    assert_eq!(role_ids, vec!["role-1", "role-2", "role-3"]);
    let user_ids: Vec<&str> = snapshot.users.iter().map(|user| user.id().as_str()).collect();
    assert_eq!(user_ids, vec!["U001", "U003"]);
}

#[tokio::test]
async fn save_replaces_existing_entry() {
    let repository = InMemoryAccessRepository::new();
    assert!(repository.save_role(role("role-1")).await.is_ok());

    let mut renamed = role("role-1");
    assert!(renamed.rename("Ship Captain", "").is_ok());
    assert!(repository.save_role(renamed).await.is_ok());

    let roles = repository
        .list_roles()
        .await
        .unwrap_or_else(|error| panic!("list: {error}"));
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name(), "Ship Captain");
}

#[tokio::test]
async fn deleting_missing_entries_is_not_found() {
    let repository = InMemoryAccessRepository::new();

    let role_result = repository
        .delete_role(&RoleId::new("role-404").unwrap_or_else(|_| panic!("id")))
        .await;
    assert!(matches!(role_result, Err(AppError::NotFound(_))));

    let rule_result = repository
        .delete_rule(&RuleId::new("rule-404").unwrap_or_else(|_| panic!("id")))
        .await;
    assert!(matches!(rule_result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn seeded_repository_serves_rules() {
    let rule = DefaultAssignmentRule::new(
        RuleId::new("rule-6").unwrap_or_else(|_| panic!("id")),
        "HR",
        [RoleId::new("role-4").unwrap_or_else(|_| panic!("id"))],
    )
    .unwrap_or_else(|error| panic!("rule: {error}"));
    let repository = InMemoryAccessRepository::from_snapshot(AccessSnapshot {
        roles: vec![role("role-4")],
        users: vec![user("U004")],
        default_rules: vec![rule.clone()],
        applications: Vec::new(),
    })
    .unwrap_or_else(|error| panic!("seed: {error}"));

    assert_eq!(repository.list_rules().await, Ok(vec![rule]));
    let found = repository
        .find_user(&UserId::new("U004").unwrap_or_else(|_| panic!("id")))
        .await;
    assert!(matches!(found, Ok(Some(_))));
}

#[tokio::test]
async fn seeding_with_duplicate_roles_is_conflict() {
    let result = InMemoryAccessRepository::from_snapshot(AccessSnapshot {
        roles: vec![role("role-1"), role("role-1")],
        ..AccessSnapshot::default()
    });

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

fn application(id: &str, name: &str) -> Application {
    Application::new(
        ApplicationId::new(id).unwrap_or_else(|_| panic!("id")),
        name,
        "RC001",
        "Admin User",
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_else(|| panic!("date")),
    )
    .unwrap_or_else(|error| panic!("application: {error}"))
}

#[tokio::test]
async fn application_registry_round_trips_through_snapshot() {
    let repository = InMemoryAccessRepository::new();
    for (id, name) in [("APP002", "Crew Schedule Manager"), ("APP001", "VPP Portal")] {
        assert!(repository.save_application(application(id, name)).await.is_ok());
    }

    let removed = repository
        .delete_application(&ApplicationId::new("APP002").unwrap_or_else(|_| panic!("id")))
        .await;
    assert!(removed.is_ok());
    let missing = repository
        .delete_application(&ApplicationId::new("APP002").unwrap_or_else(|_| panic!("id")))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let snapshot = repository.snapshot().await;
    assert_eq!(snapshot.applications, vec![application("APP001", "VPP Portal")]);

    let reseeded = InMemoryAccessRepository::from_snapshot(snapshot)
        .unwrap_or_else(|error| panic!("seed: {error}"));
    let found = reseeded
        .find_application(&ApplicationId::new("APP001").unwrap_or_else(|_| panic!("id")))
        .await;
    assert!(matches!(found, Ok(Some(_))));
}
