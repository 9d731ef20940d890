//! API endpoints for loans.
//!
//! Only what sessions need: a loan must exist before a session can point at
//! it.

use rocket::{Route, http::Status, response::status, serde::json::Json};

use crate::{
    api::{ErrorResponse, is_unique_violation, is_uuid, json_error},
    logged_json::LoggedJson,
    models::{LoanInput, LoanRecord},
    okapi_headers::OkapiHeaders,
    orm::{
        DbConn,
        loan::{delete_loan, get_loan_by_id, insert_loan},
    },
};

pub const LOANS_PATH: &str = "/loan-storage/loans";

/// Create Loan endpoint.
///
/// - **URL:** `/loan-storage/loans`
/// - **Method:** `POST`
///
/// # Request Format
///
/// ```json
/// {
///   "id": "6a1c2f7e-3b0d-4c1a-8d5e-9f2e4b7a1c33",
///   "userId": "0f5b8a3e-64d4-4c3b-9f7a-2b3b1c6d9e11",
///   "itemId": "9d2e1b44-7f0c-4a8e-b6d3-5c1a2e3f4b55",
///   "status": { "name": "Closed" },
///   "loanDate": "2024-03-01T10:00:00Z"
/// }
/// ```
///
/// **Success (HTTP 201 Created)**; **422** for invalid ids or an id that
/// already exists.
#[post("/loan-storage/loans", data = "<request>")]
pub async fn create_loan(
    db: DbConn,
    okapi: OkapiHeaders,
    request: LoggedJson<LoanInput>,
) -> Result<status::Created<Json<LoanRecord>>, status::Custom<Json<ErrorResponse>>> {
    let input = request.into_inner();

    for (field, value) in [
        ("id", input.id.as_deref()),
        ("userId", Some(input.user_id.as_str())),
        ("itemId", Some(input.item_id.as_str())),
    ] {
        if let Some(value) = value {
            if !is_uuid(value) {
                return Err(json_error(
                    Status::UnprocessableEntity,
                    format!("{} '{}' is not a valid UUID", field, value),
                ));
            }
        }
    }

    db.run(move |conn| {
        if let Some(loan_id) = &input.id {
            if let Ok(Some(_)) = get_loan_by_id(conn, loan_id) {
                return Err(json_error(
                    Status::UnprocessableEntity,
                    format!("id value already exists: {}", loan_id),
                ));
            }
        }

        match insert_loan(conn, input, okapi.user_id) {
            Ok(loan) => {
                let uri = format!("{}/{}", LOANS_PATH, loan.id);
                Ok(status::Created::new(uri).body(Json(loan.into())))
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Lost insert race for loan id: {}", e);
                Err(json_error(Status::UnprocessableEntity, "id value already exists"))
            }
            Err(e) => {
                error!("Failed to create loan: {}", e);
                Err(json_error(Status::InternalServerError, "Failed to create loan"))
            }
        }
    })
    .await
}

/// Get Loan endpoint.
///
/// - **URL:** `/loan-storage/loans/{id}`
/// - **Method:** `GET`
#[get("/loan-storage/loans/<loan_id>")]
pub async fn get_loan(
    db: DbConn,
    _okapi: OkapiHeaders,
    loan_id: String,
) -> Result<Json<LoanRecord>, Status> {
    db.run(move |conn| match get_loan_by_id(conn, &loan_id) {
        Ok(Some(loan)) => Ok(Json(loan.into())),
        Ok(None) => Err(Status::NotFound),
        Err(e) => {
            error!("Failed to fetch loan {}: {}", loan_id, e);
            Err(Status::InternalServerError)
        }
    })
    .await
}

/// Delete Loan endpoint.
///
/// - **URL:** `/loan-storage/loans/{id}`
/// - **Method:** `DELETE`
#[delete("/loan-storage/loans/<loan_id>")]
pub async fn delete_loan_endpoint(
    db: DbConn,
    _okapi: OkapiHeaders,
    loan_id: String,
) -> Status {
    db.run(move |conn| match delete_loan(conn, &loan_id) {
        Ok(0) => Status::NotFound,
        Ok(_) => Status::NoContent,
        Err(e) => {
            error!("Failed to delete loan {}: {}", loan_id, e);
            Status::InternalServerError
        }
    })
    .await
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![create_loan, get_loan, delete_loan_endpoint]
}
