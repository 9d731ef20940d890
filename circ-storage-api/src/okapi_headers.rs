//! Request guard for the platform gateway headers.
//!
//! The gateway forwards the tenant and the acting user on every request.
//! Both are optional here: the tenant is only logged, and the user id ends up
//! in record metadata.

use rocket::request::{self, FromRequest, Request};

pub const TENANT_HEADER: &str = "X-Okapi-Tenant";
pub const USER_ID_HEADER: &str = "X-Okapi-User-Id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OkapiHeaders {
    pub tenant: Option<String>,
    pub user_id: Option<String>,
}

fn header_value(req: &Request<'_>, name: &str) -> Option<String> {
    req.headers()
        .get_one(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OkapiHeaders {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let headers = OkapiHeaders {
            tenant: header_value(req, TENANT_HEADER),
            user_id: header_value(req, USER_ID_HEADER),
        };

        match &headers.tenant {
            Some(tenant) => debug!("{} {} | tenant: {}", req.method(), req.uri().path(), tenant),
            None => debug!("{} {} | no tenant header", req.method(), req.uri().path()),
        }

        request::Outcome::Success(headers)
    }
}
