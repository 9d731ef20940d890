//! Health endpoint for monitoring.
//!
//! Reports build information and whether the session store can count its
//! sessions. The endpoint answers 200 even when the store is down, so a
//! monitor can tell the two failures apart.

use diesel::prelude::*;
use rocket::{Route, serde::json::Json};
use serde::Serialize;
use ts_rs::TS;

use crate::orm::DbConn;
use crate::schema::patron_action_sessions;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DatabaseState {
    Up,
    Down,
}

#[derive(Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HealthStatus {
    status: &'static str,
    database: DatabaseState,
    version: &'static str,
    built: &'static str,
    git_commit: Option<&'static str>,
}

async fn database_state(db: Option<DbConn>) -> DatabaseState {
    let Some(db) = db else {
        warn!("Health check could not get a database connection");
        return DatabaseState::Down;
    };
    match db
        .run(|conn| patron_action_sessions::table.count().get_result::<i64>(conn))
        .await
    {
        Ok(_) => DatabaseState::Up,
        Err(e) => {
            warn!("Health check query failed: {}", e);
            DatabaseState::Down
        }
    }
}

/// Health Status endpoint.
///
/// - **URL:** `/admin/health`
/// - **Method:** `GET`
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "status": "running",
///   "database": "up",
///   "version": "0.1.0",
///   "built": "Fri, 10 Jan 2025 12:00:00 +0000",
///   "gitCommit": "cd51275141a2e7d49737aa7dd4e8ff7c9a804d67"
/// }
/// ```
#[get("/admin/health")]
pub async fn health_status(db: Option<DbConn>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "running",
        database: database_state(db).await,
        version: env!("CARGO_PKG_VERSION"),
        built: built_info::BUILT_TIME_UTC,
        git_commit: built_info::GIT_COMMIT_HASH,
    })
}

pub fn routes() -> Vec<Route> {
    routes![health_status]
}
