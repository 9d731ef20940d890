use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Metadata;
use crate::schema::loans;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = loans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Loan {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub status: String,
    pub action: Option<String>,
    pub loan_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub created_by_user_id: Option<String>,
    pub updated_at: NaiveDateTime,
    pub updated_by_user_id: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = loans)]
pub struct NewLoan {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub status: String,
    pub action: Option<String>,
    pub loan_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub created_by_user_id: Option<String>,
    pub updated_at: NaiveDateTime,
    pub updated_by_user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoanStatus {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoanInput {
    pub id: Option<String>,
    pub user_id: String,
    pub item_id: String,
    pub status: Option<LoanStatus>, // Defaults to "Open"
    pub action: Option<String>,
    #[ts(type = "string | null")]
    pub loan_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoanRecord {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub status: LoanStatus,
    pub action: Option<String>,
    #[ts(type = "string")]
    pub loan_date: DateTime<Utc>,
    pub metadata: Metadata,
}

impl From<Loan> for LoanRecord {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id,
            user_id: loan.user_id,
            item_id: loan.item_id,
            status: LoanStatus { name: loan.status },
            action: loan.action,
            loan_date: loan.loan_date.and_utc(),
            metadata: Metadata::from_columns(
                loan.created_at,
                loan.created_by_user_id,
                loan.updated_at,
                loan.updated_by_user_id,
            ),
        }
    }
}
