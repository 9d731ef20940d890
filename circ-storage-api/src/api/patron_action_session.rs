//! API endpoints for patron action sessions.
//!
//! A session records that a patron checked something out or in and that a
//! downstream notice is still pending. Besides plain CRUD this module serves
//! the expired-session scan used to find patrons who have gone quiet.
//!
//! Errors on collection endpoints are JSON (`{"error": ...}`); lookups by id
//! answer a missing record with the plain-text body `Not found`.

use rocket::{Route, http::Status, response::status, serde::json::Json};

use crate::{
    api::{ErrorResponse, is_unique_violation, is_uuid, json_error},
    expiry::{ExpiredSessionQuery, ExpiryScanError, find_expired_patron_ids, parse_instant},
    logged_json::LoggedJson,
    models::{
        ExpiredSessionPatronIds, PatronActionSessionInput, PatronActionSessionRecord,
        PatronActionSessions,
    },
    okapi_headers::OkapiHeaders,
    orm::{
        DbConn,
        loan::get_loan_by_id,
        patron_action_session::{
            delete_all_patron_action_sessions, delete_patron_action_session,
            get_patron_action_session_by_id, insert_patron_action_session,
            list_patron_action_sessions, replace_patron_action_session,
        },
    },
    query::ListQuery,
};

pub const SESSIONS_PATH: &str = "/patron-action-session-storage/patron-action-sessions";

const NOT_FOUND: &str = "Not found";

/// Checks the shape of a session payload. Returns a message on failure.
fn validate_session_input(input: &PatronActionSessionInput) -> Result<(), String> {
    if let Some(id) = &input.id {
        if !is_uuid(id) {
            return Err(format!("id '{}' is not a valid UUID", id));
        }
    }
    if !is_uuid(&input.patron_id) {
        return Err(format!("patronId '{}' is not a valid UUID", input.patron_id));
    }
    if let Some(loan_id) = &input.loan_id {
        if !is_uuid(loan_id) {
            return Err(format!("loanId '{}' is not a valid UUID", loan_id));
        }
    }
    if input.action_type.trim().is_empty() {
        return Err("actionType must not be empty".to_string());
    }
    Ok(())
}

/// Create Patron Action Session endpoint.
///
/// - **URL:** `/patron-action-session-storage/patron-action-sessions`
/// - **Method:** `POST`
/// - **Purpose:** Stores a new session; the id is generated when omitted
///
/// # Request Format
///
/// ```json
/// {
///   "patronId": "0f5b8a3e-64d4-4c3b-9f7a-2b3b1c6d9e11",
///   "loanId": "6a1c2f7e-3b0d-4c1a-8d5e-9f2e4b7a1c33",
///   "actionType": "Check-out"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):** the stored session with metadata
///
/// **Error Responses:**
/// - **422 Unprocessable Entity**: invalid UUIDs, empty action type, unknown
///   loan, or an id that already exists
#[post("/patron-action-session-storage/patron-action-sessions", data = "<request>")]
pub async fn create_patron_action_session(
    db: DbConn,
    okapi: OkapiHeaders,
    request: LoggedJson<PatronActionSessionInput>,
) -> Result<status::Created<Json<PatronActionSessionRecord>>, status::Custom<Json<ErrorResponse>>>
{
    let input = request.into_inner();
    validate_session_input(&input).map_err(|msg| json_error(Status::UnprocessableEntity, msg))?;

    db.run(move |conn| {
        // The loan must exist when the session is created
        if let Some(loan_id) = &input.loan_id {
            match get_loan_by_id(conn, loan_id) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return Err(json_error(
                        Status::UnprocessableEntity,
                        format!("loanId '{}' does not refer to an existing loan", loan_id),
                    ));
                }
                Err(e) => {
                    error!("Failed to look up loan {}: {}", loan_id, e);
                    return Err(json_error(
                        Status::InternalServerError,
                        "Database error while fetching loan",
                    ));
                }
            }
        }

        if let Some(session_id) = &input.id {
            match get_patron_action_session_by_id(conn, session_id) {
                Ok(None) => {}
                Ok(Some(_)) => {
                    return Err(json_error(
                        Status::UnprocessableEntity,
                        format!("id value already exists: {}", session_id),
                    ));
                }
                Err(e) => {
                    error!("Failed to look up session {}: {}", session_id, e);
                    return Err(json_error(
                        Status::InternalServerError,
                        "Database error while fetching session",
                    ));
                }
            }
        }

        match insert_patron_action_session(conn, input, okapi.user_id) {
            Ok(session) => {
                info!(
                    "Created patron action session {} ({}) for patron {}",
                    session.id, session.action_type, session.patron_id
                );
                let uri = format!("{}/{}", SESSIONS_PATH, session.id);
                Ok(status::Created::new(uri).body(Json(session.into())))
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Lost insert race for session id: {}", e);
                Err(json_error(
                    Status::UnprocessableEntity,
                    "id value already exists".to_string(),
                ))
            }
            Err(e) => {
                error!("Failed to create patron action session: {}", e);
                Err(json_error(
                    Status::InternalServerError,
                    "Failed to create patron action session",
                ))
            }
        }
    })
    .await
}

/// List Patron Action Sessions endpoint.
///
/// - **URL:** `/patron-action-session-storage/patron-action-sessions`
/// - **Method:** `GET`
/// - **Query:** `query` (e.g. `actionType==Check-out`), `offset`, `limit`
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "patronActionSessions": [ { "id": "...", "patronId": "...", "actionType": "Check-out" } ],
///   "totalRecords": 2
/// }
/// ```
///
/// `totalRecords` counts every match, not just the returned page.
#[get("/patron-action-session-storage/patron-action-sessions?<list..>")]
pub async fn list_sessions(
    db: DbConn,
    _okapi: OkapiHeaders,
    list: ListQuery,
) -> Result<Json<PatronActionSessions>, status::Custom<Json<ErrorResponse>>> {
    let (offset, limit) = list.paging().map_err(|msg| json_error(Status::BadRequest, msg))?;
    let filter = list.session_filter().map_err(|msg| json_error(Status::BadRequest, msg))?;

    db.run(move |conn| match list_patron_action_sessions(conn, &filter, offset, limit) {
        Ok((sessions, total)) => Ok(Json(PatronActionSessions {
            patron_action_sessions: sessions.into_iter().map(Into::into).collect(),
            total_records: total,
        })),
        Err(e) => {
            error!("Failed to list patron action sessions: {}", e);
            Err(json_error(
                Status::InternalServerError,
                "Failed to list patron action sessions",
            ))
        }
    })
    .await
}

/// Get Patron Action Session endpoint.
///
/// - **URL:** `/patron-action-session-storage/patron-action-sessions/{id}`
/// - **Method:** `GET`
#[get("/patron-action-session-storage/patron-action-sessions/<session_id>")]
pub async fn get_session(
    db: DbConn,
    _okapi: OkapiHeaders,
    session_id: String,
) -> Result<Json<PatronActionSessionRecord>, status::Custom<&'static str>> {
    db.run(move |conn| match get_patron_action_session_by_id(conn, &session_id) {
        Ok(Some(session)) => Ok(Json(session.into())),
        Ok(None) => Err(status::Custom(Status::NotFound, NOT_FOUND)),
        Err(e) => {
            error!("Failed to fetch patron action session {}: {}", session_id, e);
            Err(status::Custom(Status::InternalServerError, "Internal Server Error"))
        }
    })
    .await
}

/// Replace Patron Action Session endpoint.
///
/// - **URL:** `/patron-action-session-storage/patron-action-sessions/{id}`
/// - **Method:** `PUT`
/// - **Purpose:** Replaces patron, loan and action type of a session; the id
///   in the path wins over any id in the body
///
/// The loan reference is not re-checked on update.
///
/// **Success:** HTTP 204 No Content. **404** with `Not found` when absent,
/// **422** for an invalid payload.
#[put("/patron-action-session-storage/patron-action-sessions/<session_id>", data = "<request>")]
pub async fn update_session(
    db: DbConn,
    okapi: OkapiHeaders,
    session_id: String,
    request: LoggedJson<PatronActionSessionInput>,
) -> Result<Status, status::Custom<String>> {
    let mut input = request.into_inner();
    input.id = None;
    validate_session_input(&input)
        .map_err(|msg| status::Custom(Status::UnprocessableEntity, msg))?;

    db.run(move |conn| match replace_patron_action_session(conn, &session_id, input, okapi.user_id) {
        Ok(Some(_)) => Ok(Status::NoContent),
        Ok(None) => Err(status::Custom(Status::NotFound, NOT_FOUND.to_string())),
        Err(e) => {
            error!("Failed to update patron action session {}: {}", session_id, e);
            Err(status::Custom(
                Status::InternalServerError,
                "Failed to update patron action session".to_string(),
            ))
        }
    })
    .await
}

/// Delete Patron Action Session endpoint.
///
/// - **URL:** `/patron-action-session-storage/patron-action-sessions/{id}`
/// - **Method:** `DELETE`
///
/// **Success:** HTTP 204 No Content. **404** with `Not found` when absent.
#[delete("/patron-action-session-storage/patron-action-sessions/<session_id>")]
pub async fn delete_session(
    db: DbConn,
    _okapi: OkapiHeaders,
    session_id: String,
) -> Result<Status, status::Custom<&'static str>> {
    db.run(move |conn| match delete_patron_action_session(conn, &session_id) {
        Ok(0) => Err(status::Custom(Status::NotFound, NOT_FOUND)),
        Ok(_) => Ok(Status::NoContent),
        Err(e) => {
            error!("Failed to delete patron action session {}: {}", session_id, e);
            Err(status::Custom(Status::InternalServerError, "Internal Server Error"))
        }
    })
    .await
}

/// Delete All Patron Action Sessions endpoint.
///
/// - **URL:** `/patron-action-session-storage/patron-action-sessions`
/// - **Method:** `DELETE`
#[delete("/patron-action-session-storage/patron-action-sessions")]
pub async fn delete_all_sessions(db: DbConn, okapi: OkapiHeaders) -> Status {
    db.run(move |conn| match delete_all_patron_action_sessions(conn) {
        Ok(removed) => {
            warn!(
                "Deleted all {} patron action sessions (tenant: {})",
                removed,
                okapi.tenant.as_deref().unwrap_or("-")
            );
            Status::NoContent
        }
        Err(e) => {
            error!("Failed to delete patron action sessions: {}", e);
            Status::InternalServerError
        }
    })
    .await
}

/// Expired Session Patron IDs endpoint.
///
/// - **URL:** `/patron-action-session-storage/expired-session-patron-ids`
/// - **Method:** `GET`
/// - **Query:**
///   - `action_type`: action type to scan, e.g. `Check-in`
///   - `last_time_action_limit`: instant, e.g. `2024-03-01T10:00:00.000Z`
///   - `limit`: maximum number of patron ids; `0` yields an empty list
///
/// Returns patrons whose most recent session of `action_type` is older than
/// `last_time_action_limit`, longest overdue first.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "patronIds": ["0f5b8a3e-64d4-4c3b-9f7a-2b3b1c6d9e11"] }
/// ```
///
/// **Error Responses:**
/// - **400 Bad Request**: a parameter is missing or invalid
#[get(
    "/patron-action-session-storage/expired-session-patron-ids?<action_type>&<last_time_action_limit>&<limit>"
)]
pub async fn get_expired_session_patron_ids(
    db: DbConn,
    _okapi: OkapiHeaders,
    action_type: Option<String>,
    last_time_action_limit: Option<String>,
    limit: Option<String>,
) -> Result<Json<ExpiredSessionPatronIds>, status::Custom<Json<ErrorResponse>>> {
    let bad_request = |msg: String| json_error(Status::BadRequest, msg);

    let action_type = action_type.ok_or_else(|| bad_request("action_type is required".into()))?;
    let cutoff = last_time_action_limit
        .ok_or_else(|| bad_request("last_time_action_limit is required".into()))
        .and_then(|raw| {
            parse_instant(&raw).map_err(|e| {
                bad_request(format!("last_time_action_limit '{}' is not a valid date-time: {}", raw, e))
            })
        })?;
    let limit = limit
        .ok_or_else(|| bad_request("limit is required".into()))
        .and_then(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| bad_request(format!("limit '{}' is not an integer", raw)))
        })?;

    let query = ExpiredSessionQuery { action_type, cutoff, limit };

    db.run(move |conn| match find_expired_patron_ids(conn, &query) {
        Ok(patron_ids) => {
            debug!(
                "Expired {} sessions before {}: {} patrons",
                query.action_type,
                query.cutoff,
                patron_ids.len()
            );
            Ok(Json(ExpiredSessionPatronIds { patron_ids }))
        }
        Err(ExpiryScanError::InvalidArgument(msg)) => Err(json_error(Status::BadRequest, msg)),
        Err(ExpiryScanError::Datastore(e)) => {
            error!("Expired session scan failed: {}", e);
            Err(json_error(
                Status::InternalServerError,
                "Failed to read patron action sessions",
            ))
        }
    })
    .await
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![
        create_patron_action_session,
        list_sessions,
        get_session,
        update_session,
        delete_session,
        delete_all_sessions,
        get_expired_session_patron_ids
    ]
}
