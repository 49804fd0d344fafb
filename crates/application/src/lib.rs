//! Application services and ports.

#![forbid(unsafe_code)]

mod access_admin_service;
mod access_ports;
mod assignment_service;
mod authorization_service;

pub use access_admin_service::{AccessAdminService, ApplicationInput, DefaultRuleInput, RoleInput};
pub use access_ports::{
    ApplicationRepository, AuditEvent, AuditRepository, Clock, DefaultRuleRepository,
    RoleRepository, UserRepository,
};
pub use assignment_service::{AssignmentService, ReconciliationReport, UserReconciliation};
pub use authorization_service::AuthorizationService;
