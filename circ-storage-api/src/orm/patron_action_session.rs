use chrono::{NaiveDateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use uuid::Uuid;

use crate::expiry::{SessionRow, SessionRowSource};
use crate::models::{
    NewPatronActionSession, PatronActionSession, PatronActionSessionInput, SessionFilter,
};
use crate::schema::patron_action_sessions;

/// Builds a boxed query over sessions restricted by `filter`.
fn filtered_sessions(filter: &SessionFilter) -> patron_action_sessions::BoxedQuery<'static, Sqlite> {
    use crate::schema::patron_action_sessions::dsl::*;

    let mut query = patron_action_sessions.into_boxed();
    if let Some(value) = &filter.id {
        query = query.filter(id.eq(value.clone()));
    }
    if let Some(value) = &filter.patron_id {
        query = query.filter(patron_id.eq(value.clone()));
    }
    if let Some(value) = &filter.loan_id {
        query = query.filter(loan_id.eq(value.clone()));
    }
    if let Some(value) = &filter.action_type {
        query = query.filter(action_type.eq(value.clone()));
    }
    query
}

/// Creates a session stamped with the current time.
/// A fresh UUID is assigned when the input carries no id.
pub fn insert_patron_action_session(
    conn: &mut SqliteConnection,
    input: PatronActionSessionInput,
    acting_user_id: Option<String>,
) -> Result<PatronActionSession, diesel::result::Error> {
    insert_patron_action_session_at(conn, input, acting_user_id, Utc::now().naive_utc())
}

/// Creates a session with an explicit creation time.
pub fn insert_patron_action_session_at(
    conn: &mut SqliteConnection,
    input: PatronActionSessionInput,
    acting_user_id: Option<String>,
    created: NaiveDateTime,
) -> Result<PatronActionSession, diesel::result::Error> {
    use crate::schema::patron_action_sessions::dsl::*;

    let session_id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let new_session = NewPatronActionSession {
        id: session_id.clone(),
        patron_id: input.patron_id,
        loan_id: input.loan_id,
        action_type: input.action_type,
        created_at: created,
        created_by_user_id: acting_user_id.clone(),
        updated_at: created,
        updated_by_user_id: acting_user_id,
    };

    diesel::insert_into(patron_action_sessions).values(&new_session).execute(conn)?;

    patron_action_sessions
        .filter(id.eq(session_id.as_str()))
        .select(PatronActionSession::as_select())
        .first(conn)
}

/// Gets a session by its ID.
pub fn get_patron_action_session_by_id(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Option<PatronActionSession>, diesel::result::Error> {
    use crate::schema::patron_action_sessions::dsl::*;
    patron_action_sessions
        .filter(id.eq(session_id))
        .select(PatronActionSession::as_select())
        .first(conn)
        .optional()
}

/// Lists one page of sessions matching `filter`, oldest first.
///
/// Returns the page together with the number of matching sessions across
/// all pages.
pub fn list_patron_action_sessions(
    conn: &mut SqliteConnection,
    filter: &SessionFilter,
    page_offset: i64,
    page_limit: i64,
) -> Result<(Vec<PatronActionSession>, i64), diesel::result::Error> {
    use crate::schema::patron_action_sessions::dsl::*;

    let total = filtered_sessions(filter).count().get_result::<i64>(conn)?;

    let sessions = filtered_sessions(filter)
        .order((created_at.asc(), id.asc()))
        .offset(page_offset)
        .limit(page_limit)
        .select(PatronActionSession::as_select())
        .load(conn)?;

    Ok((sessions, total))
}

/// Replaces the patron, loan and action type of a session.
///
/// Creation metadata is kept; the update pair is refreshed. Returns `None`
/// if no session has the given id.
pub fn replace_patron_action_session(
    conn: &mut SqliteConnection,
    session_id: &str,
    input: PatronActionSessionInput,
    acting_user_id: Option<String>,
) -> Result<Option<PatronActionSession>, diesel::result::Error> {
    use crate::schema::patron_action_sessions::dsl::*;

    let updated = diesel::update(patron_action_sessions.filter(id.eq(session_id)))
        .set((
            patron_id.eq(input.patron_id),
            loan_id.eq(input.loan_id),
            action_type.eq(input.action_type),
            updated_at.eq(Utc::now().naive_utc()),
            updated_by_user_id.eq(acting_user_id),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Ok(None);
    }

    get_patron_action_session_by_id(conn, session_id)
}

/// Deletes a session, returning the number of rows removed.
pub fn delete_patron_action_session(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::patron_action_sessions::dsl::*;
    diesel::delete(patron_action_sessions.filter(id.eq(session_id))).execute(conn)
}

/// Deletes every session.
pub fn delete_all_patron_action_sessions(
    conn: &mut SqliteConnection,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::patron_action_sessions::dsl::*;
    diesel::delete(patron_action_sessions).execute(conn)
}

/// The database does the per-patron aggregation: one row per patron with
/// the latest creation time for the requested action type.
impl SessionRowSource for SqliteConnection {
    type Error = diesel::result::Error;

    fn session_rows(&mut self, requested_type: &str) -> Result<Vec<SessionRow>, Self::Error> {
        use crate::schema::patron_action_sessions::dsl::*;

        let latest = patron_action_sessions
            .filter(action_type.eq(requested_type))
            .group_by((patron_id, action_type))
            .select((patron_id, action_type, max(created_at)))
            .load::<(String, String, Option<NaiveDateTime>)>(self)?;

        Ok(latest
            .into_iter()
            .filter_map(|(patron, action, latest_at)| {
                latest_at.map(|created| SessionRow {
                    patron_id: patron,
                    action_type: action,
                    created_at: created,
                })
            })
            .collect())
    }
}
