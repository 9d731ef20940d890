use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::{Loan, LoanInput, NewLoan};

/// Creates a new loan. Status defaults to `Open` and the loan date to now.
pub fn insert_loan(
    conn: &mut SqliteConnection,
    input: LoanInput,
    acting_user_id: Option<String>,
) -> Result<Loan, diesel::result::Error> {
    use crate::schema::loans::dsl::*;

    let now = Utc::now().naive_utc();
    let loan_id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let new_loan = NewLoan {
        id: loan_id.clone(),
        user_id: input.user_id,
        item_id: input.item_id,
        status: input.status.map(|s| s.name).unwrap_or_else(|| "Open".to_string()),
        action: input.action,
        loan_date: input.loan_date.map(|d| d.naive_utc()).unwrap_or(now),
        created_at: now,
        created_by_user_id: acting_user_id.clone(),
        updated_at: now,
        updated_by_user_id: acting_user_id,
    };

    diesel::insert_into(loans).values(&new_loan).execute(conn)?;

    loans.filter(id.eq(loan_id.as_str())).select(Loan::as_select()).first(conn)
}

/// Gets a loan by its ID.
pub fn get_loan_by_id(
    conn: &mut SqliteConnection,
    loan_id: &str,
) -> Result<Option<Loan>, diesel::result::Error> {
    use crate::schema::loans::dsl::*;
    loans.filter(id.eq(loan_id)).select(Loan::as_select()).first(conn).optional()
}

/// Deletes a loan. Sessions referring to it are left untouched.
pub fn delete_loan(
    conn: &mut SqliteConnection,
    loan_id: &str,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::loans::dsl::*;
    diesel::delete(loans.filter(id.eq(loan_id))).execute(conn)
}
