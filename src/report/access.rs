use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::{Report, ReportStatus};

use super::status::{self, DenyReason, Transition};

/// The reports a caller is entitled to see before any filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    All,
    Owner(Uuid),
}

impl QueryScope {
    pub fn owner(&self) -> Option<Uuid> {
        match self {
            QueryScope::All => None,
            QueryScope::Owner(id) => Some(*id),
        }
    }
}

fn is_owner_or_manager(caller: &AuthUser, report: &Report) -> bool {
    caller.is_manager() || caller.user_id == report.owner_id
}

pub fn can_view(caller: &AuthUser, report: &Report) -> bool {
    is_owner_or_manager(caller, report)
}

pub fn can_edit_notes(caller: &AuthUser, report: &Report) -> bool {
    is_owner_or_manager(caller, report)
}

pub fn can_delete(caller: &AuthUser, report: &Report) -> bool {
    is_owner_or_manager(caller, report)
}

pub fn can_change_status(caller: &AuthUser, report: &Report, next: ReportStatus) -> bool {
    status::check(report.status, next, caller.role).is_allowed()
}

pub fn scope_for_query(caller: &AuthUser) -> QueryScope {
    if caller.is_manager() {
        QueryScope::All
    } else {
        QueryScope::Owner(caller.user_id)
    }
}

/// Turns a failed check into `Unauthorized`.
pub fn require(allowed: bool, caller: &AuthUser, action: &str, report: &Report) -> Result<(), AppError> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!(
            "user {} may not {action} report {}",
            caller.user_id, report.id
        )))
    }
}

/// Like `can_change_status`, but keeps the reason: a caller without authority
/// is `Unauthorized`, an illegal transition is `InvalidStatus`.
pub fn authorize_status_change(
    caller: &AuthUser,
    report: &Report,
    next: ReportStatus,
) -> Result<(), AppError> {
    match status::check(report.status, next, caller.role) {
        Transition::Allow => Ok(()),
        Transition::Deny(DenyReason::RoleLacksAuthority) => Err(AppError::Unauthorized(format!(
            "user {} may not change the status of report {}",
            caller.user_id, report.id
        ))),
        Transition::Deny(DenyReason::NoChange(current)) => Err(AppError::InvalidStatus(format!(
            "Report is already {current}"
        ))),
    }
}
