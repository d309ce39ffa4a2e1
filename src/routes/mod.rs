pub mod files;
pub mod reports;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Reports
        .route("/api/v1/reports", get(reports::list).post(reports::create))
        .route("/api/v1/reports/my", get(reports::list_my))
        .route(
            "/api/v1/reports/{id}",
            get(reports::get)
                .put(reports::update_notes)
                .delete(reports::delete),
        )
        .route(
            "/api/v1/reports/{id}/status",
            axum::routing::put(reports::update_status),
        )
        .route("/api/v1/reports/{id}/file", get(reports::file_link))
        // Users
        .route("/api/v1/users/me", get(users::me).put(users::update_me))
        .route("/api/v1/users/reporters", get(users::reporters))
}

pub fn file_routes() -> Router<SharedState> {
    Router::new().route("/files/{*path}", get(files::download))
}
