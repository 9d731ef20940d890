use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Metadata;
use crate::schema::patron_action_sessions;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = patron_action_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PatronActionSession {
    pub id: String,
    pub patron_id: String,
    pub loan_id: Option<String>,
    pub action_type: String,
    pub created_at: NaiveDateTime,
    pub created_by_user_id: Option<String>,
    pub updated_at: NaiveDateTime,
    pub updated_by_user_id: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = patron_action_sessions)]
pub struct NewPatronActionSession {
    pub id: String,
    pub patron_id: String,
    pub loan_id: Option<String>,
    pub action_type: String,
    pub created_at: NaiveDateTime,
    pub created_by_user_id: Option<String>,
    pub updated_at: NaiveDateTime,
    pub updated_by_user_id: Option<String>,
}

// For API inputs; metadata sent by clients is ignored
#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatronActionSessionInput {
    pub id: Option<String>,
    pub patron_id: String,
    pub loan_id: Option<String>,
    pub action_type: String,
}

/// Wire representation of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatronActionSessionRecord {
    pub id: String,
    pub patron_id: String,
    pub loan_id: Option<String>,
    pub action_type: String,
    pub metadata: Metadata,
}

impl From<PatronActionSession> for PatronActionSessionRecord {
    fn from(session: PatronActionSession) -> Self {
        Self {
            id: session.id,
            patron_id: session.patron_id,
            loan_id: session.loan_id,
            action_type: session.action_type,
            metadata: Metadata::from_columns(
                session.created_at,
                session.created_by_user_id,
                session.updated_at,
                session.updated_by_user_id,
            ),
        }
    }
}

/// Paged collection returned by the listing endpoint.
#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatronActionSessions {
    pub patron_action_sessions: Vec<PatronActionSessionRecord>,
    pub total_records: i64,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExpiredSessionPatronIds {
    pub patron_ids: Vec<String>,
}

/// Field-equality filter over sessions. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub id: Option<String>,
    pub patron_id: Option<String>,
    pub loan_id: Option<String>,
    pub action_type: Option<String>,
}
