//! HTTP endpoints.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::{Route, http::Status, response::status::Custom, serde::json::Json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub mod loan;
pub mod patron_action_session;
pub mod status;

/// Error body returned by JSON endpoints.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn json_error(
    code: Status,
    message: impl Into<String>,
) -> Custom<Json<ErrorResponse>> {
    Custom(code, Json(ErrorResponse { error: message.into() }))
}

pub(crate) fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// True when an insert lost to an existing row with the same key.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(error, DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
}

/// Returns every route served by the application.
pub fn routes() -> Vec<Route> {
    let mut all = Vec::new();
    all.extend(patron_action_session::routes());
    all.extend(loan::routes());
    all.extend(status::routes());
    all
}
