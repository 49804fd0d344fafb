use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use rolepilot_core::{AppError, AppResult};
use rolepilot_domain::{Application, DefaultAssignmentRule, Role, User};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};


/// Serializable image of every role, user, default rule and registered application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSnapshot {
    /// Role definitions.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Users with their assignment history.
    #[serde(default)]
    pub users: Vec<User>,
    /// Default-assignment rules.
    #[serde(default)]
    pub default_rules: Vec<DefaultAssignmentRule>,
    /// Application registry.
    #[serde(default)]
    pub applications: Vec<Application>,
}

impl AccessSnapshot {
    /// Rejects snapshots that declare the same role, user, rule or application twice.
    pub fn ensure_unique_ids(&self) -> AppResult<()> {
        ensure_unique("role", self.roles.iter().map(Role::id))?;
        ensure_unique("user", self.users.iter().map(User::id))?;
        ensure_unique(
            "default rule",
            self.default_rules.iter().map(DefaultAssignmentRule::id),
        )?;
        ensure_unique("application", self.applications.iter().map(Application::id))
    }
}

fn ensure_unique<'a, T>(kind: &str, ids: impl Iterator<Item = &'a T>) -> AppResult<()>
where
    T: Eq + Hash + std::fmt::Display + 'a,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::Conflict(format!(
                "snapshot declares {kind} '{id}' more than once"
            )));
        }
    }

    Ok(())
}

/// Reads and writes access snapshots as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// Creates a store bound to one file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the bound file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Loads and checks the snapshot file.
    ///
    /// Roles with an incomplete permission set are kept but reported, since
    /// they only fail when evaluated.
    pub async fn load(&self) -> AppResult<AccessSnapshot> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read snapshot '{}': {error}",
                self.path.display()
            ))
        })?;

        let snapshot: AccessSnapshot = serde_json::from_slice(&bytes).map_err(|error| {
            AppError::Validation(format!(
                "invalid snapshot '{}': {error}",
                self.path.display()
            ))
        })?;
        snapshot.ensure_unique_ids()?;

        for role in &snapshot.roles {
            if let Err(error) = role.validate_permissions() {
                warn!(role_id = %role.id(), error = %error, "snapshot role is misconfigured");
            }

            for entry in role.app_access() {
                let registered = snapshot
                    .applications
                    .iter()
                    .any(|application| application.name() == entry.app_name());
                if !registered {
                    warn!(
                        role_id = %role.id(),
                        app_name = %entry.app_name(),
                        "snapshot role grants an unregistered application"
                    );
                }
            }
        }

        info!(
            path = %self.path.display(),
            roles = snapshot.roles.len(),
            users = snapshot.users.len(),
            default_rules = snapshot.default_rules.len(),
            applications = snapshot.applications.len(),
            "snapshot loaded"
        );

        Ok(snapshot)
    }

    /// Writes the snapshot, replacing the file only once the content is complete.
    pub async fn save(&self, snapshot: &AccessSnapshot) -> AppResult<()> {
        let encoded = serde_json::to_vec_pretty(snapshot).map_err(|error| {
            AppError::Internal(format!("failed to encode snapshot: {error}"))
        })?;

        let staging_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging_path, &encoded)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write snapshot '{}': {error}",
                    staging_path.display()
                ))
            })?;
        if let Err(error) = tokio::fs::rename(&staging_path, &self.path).await {
            if let Err(cleanup_error) = tokio::fs::remove_file(&staging_path).await {
                warn!(
                    path = %staging_path.display(),
                    error = %cleanup_error,
                    "failed to remove staged snapshot"
                );
            }

            return Err(AppError::Internal(format!(
                "failed to replace snapshot '{}': {error}",
                self.path.display()
            )));
        }

        info!(path = %self.path.display(), bytes = encoded.len(), "snapshot written");
        Ok(())
    }
}
