//! JSON data guard that logs the parsed request body.
//!
//! Used in place of `Json<T>` on the write endpoints. Each body is logged
//! once with method, path and tenant; long bodies are cut to
//! [`MAX_LOGGED_BODY`] characters.

use rocket::data::{self, Data, FromData};
use rocket::request::Request;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::okapi_headers::TENANT_HEADER;

pub const MAX_LOGGED_BODY: usize = 2048;

#[derive(Debug)]
pub struct LoggedJson<T>(pub T);

impl<T> LoggedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for LoggedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Cuts `body` to at most `max` characters, marking the cut.
fn clip_body(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((cut, _)) => format!("{}... ({} bytes total)", &body[..cut], body.len()),
        None => body.to_string(),
    }
}

#[rocket::async_trait]
impl<'r, T: Deserialize<'r> + Serialize> FromData<'r> for LoggedJson<T> {
    type Error = rocket::serde::json::Error<'r>;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        let parsed = match Json::<T>::from_data(req, data).await {
            data::Outcome::Success(parsed) => parsed.into_inner(),
            data::Outcome::Error((status, e)) => {
                warn!("Rejected body for {} {}: {}", req.method(), req.uri().path(), e);
                return data::Outcome::Error((status, e));
            }
            data::Outcome::Forward(f) => return data::Outcome::Forward(f),
        };

        let tenant = req.headers().get_one(TENANT_HEADER).unwrap_or("-");
        match serde_json::to_string(&parsed) {
            Ok(body) => info!(
                "{} {} | tenant: {} | body: {}",
                req.method(),
                req.uri().path(),
                tenant,
                clip_body(&body, MAX_LOGGED_BODY)
            ),
            Err(e) => warn!(
                "{} {} | tenant: {} | body not loggable: {}",
                req.method(),
                req.uri().path(),
                tenant,
                e
            ),
        }

        data::Outcome::Success(LoggedJson(parsed))
    }
}
