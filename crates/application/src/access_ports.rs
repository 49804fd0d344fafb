mod audit;
mod clock;
mod repositories;

pub use audit::{AuditEvent, AuditRepository};
pub use clock::Clock;
pub use repositories::{
    ApplicationRepository, DefaultRuleRepository, RoleRepository, UserRepository,
};
