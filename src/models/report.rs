use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status")]
pub enum ReportStatus {
    Submitted,
    Reviewed,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 2] = [ReportStatus::Submitted, ReportStatus::Reviewed];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "Submitted",
            ReportStatus::Reviewed => "Reviewed",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownStatus(pub String);

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unknown report status '{}'; expected one of: Submitted, Reviewed",
            self.0
        )
    }
}

impl FromStr for ReportStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_path: String,
    pub notes: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

/// A report joined with its owner's current profile.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ReportWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: Report,
    pub owner_name: String,
    pub owner_email: String,
}
