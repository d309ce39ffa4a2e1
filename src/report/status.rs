use crate::models::{ReportStatus, Role};

/// Outcome of asking whether a report may move between two statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Only managers review reports.
    RoleLacksAuthority,
    /// The requested status equals the current one.
    NoChange(ReportStatus),
}

impl Transition {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Transition::Allow)
    }
}

/// Decides a status change from the current status, the requested one and the
/// caller's role alone. The role check comes first.
pub fn check(current: ReportStatus, requested: ReportStatus, role: Role) -> Transition {
    if role != Role::Manager {
        return Transition::Deny(DenyReason::RoleLacksAuthority);
    }

    match (current, requested) {
        (ReportStatus::Submitted, ReportStatus::Reviewed)
        | (ReportStatus::Reviewed, ReportStatus::Submitted) => Transition::Allow,
        (from, _) => Transition::Deny(DenyReason::NoChange(from)),
    }
}
