pub mod reports;
pub mod users;

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Owner display name as rendered on reports: "first last", or the email when both are blank.
pub(crate) const OWNER_NAME_SQL: &str =
    "COALESCE(NULLIF(TRIM(TRIM(u.first_name) || ' ' || TRIM(u.last_name)), ''), u.email)";

/// Runs a read-only store operation, retrying once after a short backoff when the
/// failure is transient. Never use this for writes.
pub async fn read_with_retry<T, F, Fut>(mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match op().await.map_err(AppError::from) {
        Err(e) if e.is_transient() => {
            tracing::warn!("Retrying read after transient store error: {e}");
            tokio::time::sleep(RETRY_BACKOFF).await;
            op().await.map_err(AppError::from)
        }
        other => other,
    }
}
