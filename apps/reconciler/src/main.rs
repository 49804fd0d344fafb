//! RolePilot default-assignment reconciler.

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use rolepilot_application::{AssignmentService, Clock};
use rolepilot_core::{ActorIdentity, AppError, AppResult};
use rolepilot_infrastructure::{
    FixedClock, InMemoryAccessRepository, InMemoryAuditRepository, JsonSnapshotStore, SystemClock,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReconcilerConfig {
    snapshot_path: PathBuf,
    output_path: PathBuf,
    as_of: Option<NaiveDate>,
    actor: String,
    dry_run: bool,
}

impl ReconcilerConfig {
    fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let snapshot_path = PathBuf::from(required_env(&lookup, "ROLEPILOT_SNAPSHOT_PATH")?);
        let output_path = optional_env(&lookup, "ROLEPILOT_OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| snapshot_path.clone());
        let as_of = optional_env(&lookup, "ROLEPILOT_AS_OF")
            .map(|value| {
                NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|error| {
                    AppError::Validation(format!(
                        "invalid ROLEPILOT_AS_OF value '{value}': {error}"
                    ))
                })
            })
            .transpose()?;
        let actor = optional_env(&lookup, "ROLEPILOT_ACTOR").unwrap_or_else(|| "system".to_owned());
        let dry_run = match optional_env(&lookup, "ROLEPILOT_DRY_RUN").as_deref() {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "invalid ROLEPILOT_DRY_RUN value '{other}': expected true or false"
                )));
            }
        };

        Ok(Self {
            snapshot_path,
            output_path,
            as_of,
            actor,
            dry_run,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ReconcilerConfig::load()?;
    info!(
        snapshot = %config.snapshot_path.display(),
        dry_run = config.dry_run,
        "reconciler starting"
    );

    let snapshot = JsonSnapshotStore::new(&config.snapshot_path).load().await?;
    let repository = Arc::new(InMemoryAccessRepository::from_snapshot(snapshot)?);
    let clock: Arc<dyn Clock> = match config.as_of {
        Some(as_of) => Arc::new(FixedClock::new(as_of)),
        None => Arc::new(SystemClock),
    };

    let assignment_service = AssignmentService::new(
        repository.clone(),
        repository.clone(),
        repository.clone(),
        Arc::new(InMemoryAuditRepository::new()),
        clock,
    );

    let actor = ActorIdentity::new(config.actor.clone(), config.actor.clone());
    let report = assignment_service.reconcile_all(&actor).await?;
    for user in &report.users {
        for assignment in &user.granted {
            info!(user_id = %user.user_id, role_id = %assignment.role_id(), "granted");
        }
    }

    for record in assignment_service.expired_exceptions().await? {
        warn!(
            user_id = %record.user_id,
            role_id = %record.role_id,
            end_date = ?record.end_date,
            "exception grant has expired"
        );
    }

    if config.dry_run {
        info!(granted = report.granted_count(), "dry run, snapshot left untouched");
        return Ok(());
    }

    JsonSnapshotStore::new(&config.output_path)
        .save(&repository.snapshot().await)
        .await?;
    info!(
        output = %config.output_path.display(),
        granted = report.granted_count(),
        "reconciler finished"
    );

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    optional_env(lookup, name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn optional_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
