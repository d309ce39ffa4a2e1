use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Role, User};

/// Inserts a profile with the default role unless one already exists for `id`.
///
/// Returns `None` only when a concurrent insert committed after this statement's
/// snapshot; callers should re-read in that case.
pub async fn insert_if_absent(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "WITH inserted AS (
            INSERT INTO users (id, email, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, email, first_name, last_name, role, created_at
         )
         SELECT * FROM inserted
         UNION ALL
         SELECT id, email, first_name, last_name, role, created_at FROM users WHERE id = $1
         LIMIT 1",
    )
    .bind(id)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(Role::Employee)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, first_name, last_name, role, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Ids of users whose "first last" display name equals `name` exactly (case-insensitive).
pub async fn find_ids_by_display_name(pool: &PgPool, name: &str) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM users
         WHERE LOWER(TRIM(TRIM(first_name) || ' ' || TRIM(last_name))) = LOWER(TRIM($1))",
    )
    .bind(name)
    .fetch_all(pool)
    .await
}

/// Users who own at least one report.
pub async fn list_reporters(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.id, u.email, u.first_name, u.last_name, u.role, u.created_at FROM users u
         WHERE EXISTS (SELECT 1 FROM reports r WHERE r.owner_id = u.id)
         ORDER BY u.first_name ASC, u.last_name ASC, u.id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    first_name: &str,
    last_name: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET first_name = $2, last_name = $3 WHERE id = $1
         RETURNING id, email, first_name, last_name, role, created_at",
    )
    .bind(id)
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(pool)
    .await
}
