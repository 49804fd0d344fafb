//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_repository;
mod in_memory_audit_repository;
mod json_snapshot_store;
mod system_clock;

pub use in_memory_access_repository::InMemoryAccessRepository;
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use json_snapshot_store::{AccessSnapshot, JsonSnapshotStore};
pub use system_clock::{FixedClock, SystemClock};
