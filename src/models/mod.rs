pub mod report;
pub mod user;

pub use report::{Report, ReportStatus, ReportWithOwner, UnknownStatus};
pub use user::{Role, User};
