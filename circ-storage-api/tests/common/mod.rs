//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use rocket::http::{Header, Status};
use rocket::local::asynchronous::{Client, LocalRequest};
use serde_json::{Value, json};
use uuid::Uuid;

use circ_storage_api::orm::testing::test_rocket;

pub const TENANT_ID: &str = "test_tenant";
pub const USER_ID: &str = "79ff2a8b-d9c3-5b39-ad4a-0a84025ab085";

pub const SESSIONS_PATH: &str = "/patron-action-session-storage/patron-action-sessions";
pub const EXPIRED_PATH: &str = "/patron-action-session-storage/expired-session-patron-ids";
pub const LOANS_PATH: &str = "/loan-storage/loans";

pub async fn test_client() -> Client {
    Client::tracked(test_rocket()).await.expect("valid rocket instance")
}

/// Adds the gateway headers every request carries.
pub fn with_okapi_headers(request: LocalRequest<'_>) -> LocalRequest<'_> {
    request
        .header(Header::new("X-Okapi-Tenant", TENANT_ID))
        .header(Header::new("X-Okapi-User-Id", USER_ID))
}

/// A collection-resource client that asserts on the happy-path status codes.
pub struct RecordClient<'c> {
    client: &'c Client,
    path: &'static str,
    collection: &'static str,
}

impl<'c> RecordClient<'c> {
    pub fn new(client: &'c Client, path: &'static str, collection: &'static str) -> Self {
        Self { client, path, collection }
    }

    pub fn sessions(client: &'c Client) -> Self {
        Self::new(client, SESSIONS_PATH, "patronActionSessions")
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    /// Creates a record, asserting 201 and a Location header.
    pub async fn create(&self, body: &Value) -> Value {
        let (status, created) = self.attempt_create(body).await;
        assert_eq!(status, Status::Created, "create failed: {}", created);
        created
    }

    pub async fn attempt_create(&self, body: &Value) -> (Status, Value) {
        let response = with_okapi_headers(self.client.post(self.path))
            .json(body)
            .dispatch()
            .await;
        let status = response.status();
        if status == Status::Created {
            let location = response
                .headers()
                .get_one("Location")
                .map(str::to_string)
                .expect("Location header should be set");
            let created: Value = response.into_json().await.expect("valid JSON");
            assert_eq!(location, self.record_url(created["id"].as_str().expect("id")));
            (status, created)
        } else {
            let body = response.into_json().await.unwrap_or(Value::Null);
            (status, body)
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Value {
        let url = self.record_url(id);
        let response = with_okapi_headers(self.client.get(&url)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        response.into_json().await.expect("valid JSON")
    }

    pub async fn attempt_get_by_id(&self, id: &str) -> (Status, String) {
        let url = self.record_url(id);
        let response = with_okapi_headers(self.client.get(&url)).dispatch().await;
        let status = response.status();
        (status, response.into_string().await.unwrap_or_default())
    }

    /// Fetches a page with the given raw query string; returns records and
    /// the total count.
    pub async fn get_many(&self, query_string: &str) -> (Vec<Value>, i64) {
        let url = if query_string.is_empty() {
            self.path.to_string()
        } else {
            format!("{}?{}", self.path, query_string)
        };
        let response = with_okapi_headers(self.client.get(&url)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("valid JSON");
        let records = body[self.collection].as_array().cloned().expect("records array");
        let total = body["totalRecords"].as_i64().expect("totalRecords");
        (records, total)
    }

    pub async fn get_all(&self) -> (Vec<Value>, i64) {
        self.get_many("").await
    }

    pub async fn attempt_put_by_id(&self, body: &Value) -> (Status, String) {
        let id = body["id"].as_str().expect("body should carry an id");
        let url = self.record_url(id);
        let response = with_okapi_headers(self.client.put(&url))
            .json(body)
            .dispatch()
            .await;
        let status = response.status();
        (status, response.into_string().await.unwrap_or_default())
    }

    pub async fn delete_by_id(&self, id: &str) {
        let (status, body) = self.attempt_delete_by_id(id).await;
        assert_eq!(status, Status::NoContent, "delete failed: {}", body);
    }

    pub async fn attempt_delete_by_id(&self, id: &str) -> (Status, String) {
        let url = self.record_url(id);
        let response = with_okapi_headers(self.client.delete(&url)).dispatch().await;
        let status = response.status();
        (status, response.into_string().await.unwrap_or_default())
    }
}

/// Creates a closed loan and returns its id.
pub async fn create_closed_loan(client: &Client) -> String {
    let loan = json!({
        "id": Uuid::new_v4().to_string(),
        "userId": Uuid::new_v4().to_string(),
        "itemId": Uuid::new_v4().to_string(),
        "status": { "name": "Closed" },
        "action": "checkedin"
    });
    let created = RecordClient::new(client, LOANS_PATH, "loans").create(&loan).await;
    created["id"].as_str().expect("loan id").to_string()
}

/// A session payload for a fresh patron.
pub fn session_request(loan_id: &str, action_type: &str) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "patronId": Uuid::new_v4().to_string(),
        "loanId": loan_id,
        "actionType": action_type
    })
}
