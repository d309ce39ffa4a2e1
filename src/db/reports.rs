use sqlx::PgPool;
use uuid::Uuid;

use super::OWNER_NAME_SQL;
use crate::models::{Report, ReportStatus, ReportWithOwner};
use crate::report::query::ReportQuery;

const REPORT_COLUMNS: &str = "r.id, r.owner_id, r.file_path, r.notes, r.status, r.created_at";

/// Projection of a report row `r` joined with its owner `u`.
fn with_owner_columns() -> String {
    format!("{REPORT_COLUMNS}, {OWNER_NAME_SQL} AS owner_name, u.email AS owner_email")
}

const FILTER_CLAUSE: &str = "($1::uuid IS NULL OR r.owner_id = $1)
     AND ($2::uuid[] IS NULL OR r.owner_id = ANY($2))
     AND ($3::report_status IS NULL OR r.status = $3)
     AND ($4::date IS NULL OR (r.created_at AT TIME ZONE 'UTC')::date = $4)";

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    file_path: &str,
    notes: &str,
) -> Result<ReportWithOwner, sqlx::Error> {
    sqlx::query_as::<_, ReportWithOwner>(&format!(
        "WITH r AS (
            INSERT INTO reports (id, owner_id, file_path, notes, status)
            VALUES ($1, $2, $3, $4, $5) RETURNING *
         )
         SELECT {} FROM r JOIN users u ON u.id = r.owner_id",
        with_owner_columns()
    ))
    .bind(Uuid::now_v7())
    .bind(owner_id)
    .bind(file_path)
    .bind(notes)
    .bind(ReportStatus::Submitted)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Report>, sqlx::Error> {
    sqlx::query_as::<_, Report>(&format!("SELECT {REPORT_COLUMNS} FROM reports r WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_with_owner(pool: &PgPool, id: Uuid) -> Result<Option<ReportWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, ReportWithOwner>(&format!(
        "SELECT {} FROM reports r JOIN users u ON u.id = r.owner_id WHERE r.id = $1",
        with_owner_columns()
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list(pool: &PgPool, query: &ReportQuery) -> Result<Vec<ReportWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, ReportWithOwner>(&format!(
        "SELECT {} FROM reports r JOIN users u ON u.id = r.owner_id
         WHERE {FILTER_CLAUSE}
         ORDER BY {} {}, r.id ASC
         LIMIT $5 OFFSET $6",
        with_owner_columns(),
        query.sort.column(),
        query.direction.sql(),
    ))
    .bind(query.scope_owner)
    .bind(query.owner_filter.as_deref())
    .bind(query.status)
    .bind(query.date)
    .bind(query.page.size)
    .bind(query.page.offset())
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, query: &ReportQuery) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM reports r WHERE {FILTER_CLAUSE}"
    ))
    .bind(query.scope_owner)
    .bind(query.owner_filter.as_deref())
    .bind(query.status)
    .bind(query.date)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn update_notes(
    pool: &PgPool,
    id: Uuid,
    notes: &str,
) -> Result<Option<ReportWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, ReportWithOwner>(&format!(
        "WITH r AS (UPDATE reports SET notes = $2 WHERE id = $1 RETURNING *)
         SELECT {} FROM r JOIN users u ON u.id = r.owner_id",
        with_owner_columns()
    ))
    .bind(id)
    .bind(notes)
    .fetch_optional(pool)
    .await
}

/// Compare-and-set on the persisted status. Returns `None` when the row is gone
/// or its status is no longer `from`.
pub async fn transition_status(
    pool: &PgPool,
    id: Uuid,
    from: ReportStatus,
    to: ReportStatus,
) -> Result<Option<ReportWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, ReportWithOwner>(&format!(
        "WITH r AS (UPDATE reports SET status = $3 WHERE id = $1 AND status = $2 RETURNING *)
         SELECT {} FROM r JOIN users u ON u.id = r.owner_id",
        with_owner_columns()
    ))
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
