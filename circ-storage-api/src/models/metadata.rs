use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Server-assigned audit block attached to every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Metadata {
    #[ts(type = "string")]
    pub created_date: DateTime<Utc>,
    pub created_by_user_id: Option<String>,
    #[ts(type = "string")]
    pub updated_date: DateTime<Utc>,
    pub updated_by_user_id: Option<String>,
}

impl Metadata {
    /// Builds metadata from the UTC timestamps stored in the database.
    pub fn from_columns(
        created_at: NaiveDateTime,
        created_by_user_id: Option<String>,
        updated_at: NaiveDateTime,
        updated_by_user_id: Option<String>,
    ) -> Self {
        Self {
            created_date: created_at.and_utc(),
            created_by_user_id,
            updated_date: updated_at.and_utc(),
            updated_by_user_id,
        }
    }
}
