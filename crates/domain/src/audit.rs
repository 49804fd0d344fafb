//! Flattened, filterable view of every user's assignment history.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    AssignedBy, AssignmentStatus, AssignmentType, DefaultAssignmentRule, Role, RoleId, User,
    UserId,
};

const UNKNOWN_ROLE_NAME: &str = "Unknown Role";

/// One denormalized assignment row for audit reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Assignee identifier.
    pub user_id: UserId,
    /// Assignee display name.
    pub user_name: String,
    /// Granted role identifier.
    pub role_id: RoleId,
    /// Resolved role name, or `Unknown Role` for dangling references.
    pub role_name: String,
    /// Default or exception grant.
    pub assignment_type: AssignmentType,
    /// Who created the grant.
    pub assigned_by: AssignedBy,
    /// Date the grant was recorded.
    pub assigned_on: NaiveDate,
    /// Justification, for exceptions.
    pub reason: Option<String>,
    /// Validity window start.
    pub start_date: Option<NaiveDate>,
    /// Validity window end.
    pub end_date: Option<NaiveDate>,
    /// Soft-deletion date.
    pub removed_on: Option<NaiveDate>,
    /// Status as of the report date.
    pub status: AssignmentStatus,
}

/// Filters applied to the audit view. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Case-insensitive substring of the user name or user id, matched as typed.
    pub user_search: Option<String>,
    /// Earliest `assigned_on`, inclusive.
    pub assigned_from: Option<NaiveDate>,
    /// Latest `assigned_on`, inclusive.
    pub assigned_to: Option<NaiveDate>,
    /// Restricts to default or exception grants.
    pub assignment_type: Option<AssignmentType>,
    /// Restricts to one role.
    pub role_id: Option<RoleId>,
}

impl AuditFilter {
    fn accepts(&self, record: &AuditRecord) -> bool {
        let user_match = self
            .user_search
            .as_deref()
            .filter(|needle| !needle.is_empty())
            .is_none_or(|needle| {
                let needle = needle.to_lowercase();
                record.user_name.to_lowercase().contains(&needle)
                    || record.user_id.as_str().to_lowercase().contains(&needle)
            });

        user_match
            && self
                .assigned_from
                .is_none_or(|from| record.assigned_on >= from)
            && self.assigned_to.is_none_or(|to| record.assigned_on <= to)
            && self
                .assignment_type
                .is_none_or(|assignment_type| record.assignment_type == assignment_type)
            && self
                .role_id
                .as_ref()
                .is_none_or(|role_id| &record.role_id == role_id)
    }
}

/// Builds the audit view, newest grants first.
///
/// Rows with the same `assigned_on` keep their user and history order.
#[must_use]
pub fn audit_records(
    users: &[User],
    roles: &[Role],
    filter: &AuditFilter,
    as_of: NaiveDate,
) -> Vec<AuditRecord> {
    let role_names: HashMap<&RoleId, &str> =
        roles.iter().map(|role| (role.id(), role.name())).collect();

    let mut records: Vec<AuditRecord> = users
        .iter()
        .flat_map(|user| {
            user.roles().iter().map(|assignment| AuditRecord {
                user_id: user.id().clone(),
                user_name: user.name().to_owned(),
                role_id: assignment.role_id().clone(),
                role_name: role_names
                    .get(assignment.role_id())
                    .copied()
                    .unwrap_or(UNKNOWN_ROLE_NAME)
                    .to_owned(),
                assignment_type: assignment.assignment_type(),
                assigned_by: assignment.assigned_by().clone(),
                assigned_on: assignment.assigned_on(),
                reason: assignment.reason().map(str::to_owned),
                start_date: assignment.start_date(),
                end_date: assignment.end_date(),
                removed_on: assignment.removed_on(),
                status: assignment.status(as_of),
            })
        })
        .filter(|record| filter.accepts(record))
        .collect();

    records.sort_by(|left, right| right.assigned_on.cmp(&left.assigned_on));
    records
}

/// Headline counts for the portal landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSummary {
    /// Number of defined roles.
    pub role_count: usize,
    /// Number of default-assignment rules.
    pub rule_count: usize,
    /// Number of exception grants active as of the summary date.
    pub active_exception_count: usize,
}

/// Computes the landing-page summary.
#[must_use]
pub fn access_summary(
    roles: &[Role],
    rules: &[DefaultAssignmentRule],
    users: &[User],
    as_of: NaiveDate,
) -> AccessSummary {
    AccessSummary {
        role_count: roles.len(),
        rule_count: rules.len(),
        active_exception_count: users
            .iter()
            .map(|user| user.active_exception_count(as_of))
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{AuditFilter, access_summary, audit_records};
    use crate::{
        AssignmentStatus, AssignmentType, Attribute, PermissionValue, Role, RoleId,
        RolePermission, User,
    };

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_else(|_| panic!("bad date"))
    }

    fn role(id: &str, name: &str) -> Role {
        Role::new(
            RoleId::new(id).unwrap_or_else(|_| panic!("id")),
            name,
            "",
            Attribute::all()
                .iter()
                .map(|attribute| RolePermission::new(*attribute, [PermissionValue::All]))
                .collect(),
        )
        .unwrap_or_else(|error| panic!("role: {error}"))
    }

    fn users() -> Vec<User> {
        let encoded = serde_json::json!([
            {
                "id": "U001",
                "name": "Captain Müller",
                "jobTitle": "Captain",
                "roles": [{"roleId": "role-1", "assignedOn": "2025-01-01", "assignedBy": "Auto"}]
            },
            {
                "id": "U003",
                "name": "Lisa Schmidt",
                "jobTitle": "Hotel Manager",
                "roles": [
                    {"roleId": "role-2", "assignedOn": "2025-03-01", "assignedBy": "Auto"},
                    {
                        "roleId": "role-6",
                        "assignedOn": "2024-07-01",
                        "assignedBy": "Admin",
                        "reason": "Temporary project lead",
                        "startDate": "2024-07-01",
                        "endDate": "2024-12-31"
                    },
                    {"roleId": "role-5", "assignedOn": "2023-01-01", "assignedBy": "Auto", "removedOn": "2024-02-01"},
                    {"roleId": "role-9", "assignedOn": "2025-01-01", "assignedBy": "Auto"}
                ]
            }
        ]);
        serde_json::from_value(encoded).unwrap_or_else(|error| panic!("decode: {error}"))
    }

    fn roles() -> Vec<Role> {
        vec![
            role("role-1", "Ship Captain"),
            role("role-2", "Ship Hotel Manager"),
            role("role-5", "Super Admin"),
            role("role-6", "Exception Admin"),
        ]
    }

    #[test]
    fn records_are_sorted_newest_first_with_stable_ties() {
        let records = audit_records(
            &users(),
            &roles(),
            &AuditFilter::default(),
            date("2025-06-01"),
        );

        let order: Vec<(&str, &str)> = records
            .iter()
            .map(|record| (record.user_id.as_str(), record.role_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("U003", "role-2"),
                ("U001", "role-1"),
                ("U003", "role-9"),
                ("U003", "role-6"),
                ("U003", "role-5"),
            ]
        );
    }

    #[test]
    fn records_carry_type_status_and_role_name() {
        let records = audit_records(
            &users(),
            &roles(),
            &AuditFilter::default(),
            date("2025-06-01"),
        );

        let exception = records
            .iter()
            .find(|record| record.role_id.as_str() == "role-6")
            .unwrap_or_else(|| panic!("missing exception row"));
        assert_eq!(exception.assignment_type, AssignmentType::Exception);
        assert_eq!(exception.status, AssignmentStatus::Expired);
        assert_eq!(exception.role_name, "Exception Admin");

        let dangling = records
            .iter()
            .find(|record| record.role_id.as_str() == "role-9")
            .unwrap_or_else(|| panic!("missing dangling row"));
        assert_eq!(dangling.role_name, "Unknown Role");
    }

    #[test]
    fn user_search_matches_name_or_id_case_insensitively() {
        let filter = AuditFilter {
            user_search: Some("lisa".to_owned()),
            ..AuditFilter::default()
        };
        let by_name = audit_records(&users(), &roles(), &filter, date("2025-06-01"));
        assert_eq!(by_name.len(), 4);

        let filter = AuditFilter {
            user_search: Some("u001".to_owned()),
            ..AuditFilter::default()
        };
        let by_id = audit_records(&users(), &roles(), &filter, date("2025-06-01"));
        assert_eq!(by_id.len(), 1);
    }

    #[test]
    fn user_search_keeps_surrounding_whitespace() {
        let filter = AuditFilter {
            user_search: Some("Lisa ".to_owned()),
            ..AuditFilter::default()
        };
        let inner_space = audit_records(&users(), &roles(), &filter, date("2025-06-01"));
        assert_eq!(inner_space.len(), 4);

        let filter = AuditFilter {
            user_search: Some(" lisa".to_owned()),
            ..AuditFilter::default()
        };
        let leading_space = audit_records(&users(), &roles(), &filter, date("2025-06-01"));
        assert!(leading_space.is_empty());
    }

    #[test]
    fn date_range_is_inclusive() {
        let filter = AuditFilter {
            assigned_from: Some(date("2024-07-01")),
            assigned_to: Some(date("2025-01-01")),
            ..AuditFilter::default()
        };
        let records = audit_records(&users(), &roles(), &filter, date("2025-06-01"));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn type_and_role_filters_combine() {
        let filter = AuditFilter {
            assignment_type: Some(AssignmentType::Default),
            role_id: Some(RoleId::new("role-5").unwrap_or_else(|_| panic!("id"))),
            ..AuditFilter::default()
        };
        let records = audit_records(&users(), &roles(), &filter, date("2025-06-01"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AssignmentStatus::Removed);
    }

    #[test]
    fn summary_counts_active_exceptions() {
        let summary = access_summary(&roles(), &[], &users(), date("2024-08-01"));
        assert_eq!(summary.role_count, 4);
        assert_eq!(summary.rule_count, 0);
        assert_eq!(summary.active_exception_count, 1);

        let later = access_summary(&roles(), &[], &users(), date("2025-08-01"));
        assert_eq!(later.active_exception_count, 0);
    }
}
