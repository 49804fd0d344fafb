use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use rolepilot_core::{AppError, AppResult};
use rolepilot_domain::{
    AccessContext, AppAccess, AppAction, Attribute, JobProfile, PermissionValue, Role, RoleId,
    RolePermission, User, UserId, grant_default, revoke,
};

use crate::{Clock, RoleRepository, UserRepository};

use super::AuthorizationService;

#[derive(Default)]
struct FakeRoleRepository {
    roles: Mutex<BTreeMap<RoleId, Role>>,
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.lock().await.values().cloned().collect())
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.lock().await.get(role_id).cloned())
    }

    async fn save_role(&self, role: Role) -> AppResult<()> {
        self.roles.lock().await.insert(role.id().clone(), role);
        Ok(())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        self.roles.lock().await.remove(role_id);
        Ok(())
    }
}

#[derive(Default)]
struct FakeUserRepository {
    users: Mutex<BTreeMap<UserId, User>>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().await.values().cloned().collect())
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(user_id).cloned())
    }

    async fn save_user(&self, user: User) -> AppResult<()> {
        self.users.lock().await.insert(user.id().clone(), user);
        Ok(())
    }
}

struct FixedClock(NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_else(|_| panic!("bad date"))
}

fn role_id(value: &str) -> RoleId {
    RoleId::new(value).unwrap_or_else(|_| panic!("id"))
}

fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| panic!("id"))
}

fn captain_role() -> Role {
    let permissions = Attribute::all()
        .iter()
        .map(|attribute| match attribute {
            Attribute::Function => {
                RolePermission::new(*attribute, [PermissionValue::literal("Nautical")])
            }
            Attribute::Ship => RolePermission::new(*attribute, [PermissionValue::Dynamic]),
            _ => RolePermission::new(*attribute, [PermissionValue::All]),
        })
        .collect();
    let mut role = Role::new(role_id("role-1"), "Ship Captain", "", permissions)
        .unwrap_or_else(|error| panic!("role: {error}"));
    role.set_app_access(vec![
        AppAccess::new("VPP", [AppAction::Read, AppAction::Write])
            .unwrap_or_else(|error| panic!("app access: {error}")),
    ]);
    assert!(role.set_write_restriction_days(Some(7)).is_ok());
    role
}

async fn service(revoked: bool) -> AuthorizationService {
    let roles = Arc::new(FakeRoleRepository::default());
    assert!(roles.save_role(captain_role()).await.is_ok());

    let mut user = User::new(
        user_id("U001"),
        "Captain Müller",
        JobProfile::new("Captain").with(Attribute::Ship, "ATL"),
    )
    .unwrap_or_else(|error| panic!("user: {error}"));
    assert!(grant_default(&mut user, &role_id("role-1"), date("2025-01-01")).is_ok());
    assert!(grant_default(&mut user, &role_id("role-gone"), date("2025-01-01")).is_ok());
    if revoked {
        let removed = revoke(
            &mut user,
            &role_id("role-1"),
            date("2025-01-01"),
            date("2025-02-01"),
        );
        assert!(removed.is_ok());
    }

    let users = Arc::new(FakeUserRepository::default());
    assert!(users.save_user(user).await.is_ok());

    AuthorizationService::new(roles, users, Arc::new(FixedClock(date("2025-03-10"))))
}

fn context(ship: &str) -> AccessContext {
    Attribute::all()
        .iter()
        .fold(AccessContext::new(), |context, attribute| {
            let value = match attribute {
                Attribute::Function => "Nautical",
                Attribute::Ship => ship,
                _ => "any",
            };
            context.with_resource_value(*attribute, value)
        })
        .with_caller_value(Attribute::Ship, "ATL")
}

#[tokio::test]
async fn user_is_authorized_through_dynamic_ship_scope() {
    let service = service(false).await;

    let same_ship = service.authorize_user(&user_id("U001"), &context("ATL")).await;
    assert_eq!(same_ship, Ok(true));

    let other_ship = service.authorize_user(&user_id("U001"), &context("BLD")).await;
    assert_eq!(other_ship, Ok(false));
}

#[tokio::test]
async fn revoked_role_no_longer_authorizes() {
    let service = service(true).await;

    let result = service.authorize_user(&user_id("U001"), &context("ATL")).await;
    assert_eq!(result, Ok(false));
    assert_eq!(service.can_read_app(&user_id("U001"), "VPP").await, Ok(false));
}

#[tokio::test]
async fn authorize_role_reports_unknown_role() {
    let service = service(false).await;

    let known = service.authorize_role(&role_id("role-1"), &context("ATL")).await;
    assert_eq!(known, Ok(true));

    let unknown = service.authorize_role(&role_id("role-404"), &context("ATL")).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn missing_caller_value_is_ambiguous() {
    let service = service(false).await;
    let context = Attribute::all()
        .iter()
        .fold(AccessContext::new(), |context, attribute| {
            context.with_resource_value(*attribute, "Nautical")
        });

    let result = service.authorize_user(&user_id("U001"), &context).await;
    assert!(matches!(result, Err(AppError::AmbiguousDynamicScope(_))));
}

#[tokio::test]
async fn write_window_limits_record_dates() {
    let service = service(false).await;
    let user = user_id("U001");

    let oldest_allowed = service
        .can_write_record(&user, "VPP", date("2025-03-03"))
        .await;
    assert_eq!(oldest_allowed, Ok(true));

    let too_old = service
        .can_write_record(&user, "VPP", date("2025-03-02"))
        .await;
    assert_eq!(too_old, Ok(false));

    let other_app = service
        .can_write_record(&user, "Roster Create", date("2025-03-10"))
        .await;
    assert_eq!(other_app, Ok(false));
}

fn open_role() -> Role {
    let permissions = Attribute::all()
        .iter()
        .map(|attribute| RolePermission::new(*attribute, [PermissionValue::All]))
        .collect();
    Role::new(role_id("role-open"), "Open Access", "", permissions)
        .unwrap_or_else(|error| panic!("role: {error}"))
}

fn broken_role() -> Role {
    serde_json::from_value(serde_json::json!({
        "id": "role-broken",
        "name": "Company Only",
        "permissions": [{"attribute": "Company", "values": ["All"]}]
    }))
    .unwrap_or_else(|error| panic!("decode: {error}"))
}

async fn service_holding(order: [&str; 2]) -> AuthorizationService {
    let roles = Arc::new(FakeRoleRepository::default());
    assert!(roles.save_role(open_role()).await.is_ok());
    assert!(roles.save_role(broken_role()).await.is_ok());

    let mut user = User::new(user_id("U002"), "Chief Officer", JobProfile::new("Chief Officer"))
        .unwrap_or_else(|error| panic!("user: {error}"));
    for id in order {
        assert!(grant_default(&mut user, &role_id(id), date("2025-01-01")).is_ok());
    }

    let users = Arc::new(FakeUserRepository::default());
    assert!(users.save_user(user).await.is_ok());

    AuthorizationService::new(roles, users, Arc::new(FixedClock(date("2025-03-10"))))
}

#[tokio::test]
async fn misconfigured_held_role_fails_in_any_history_order() {
    let open_first = service_holding(["role-open", "role-broken"])
        .await
        .authorize_user(&user_id("U002"), &context("ATL"))
        .await;
    let broken_first = service_holding(["role-broken", "role-open"])
        .await
        .authorize_user(&user_id("U002"), &context("ATL"))
        .await;

    assert!(matches!(open_first, Err(AppError::Configuration(_))));
    assert_eq!(open_first, broken_first);
}
