//! Expired session scan.
//!
//! Finds patrons whose most recent session of a given action type is older
//! than a cutoff, e.g. to drive check-in/check-out notices for patrons who
//! have gone quiet. The scan is a pure function over a [`SessionRowSource`],
//! so it runs against the SQLite store in production and against plain
//! vectors in tests.
//!
//! A patron qualifies only when the latest of their matching sessions is
//! strictly before the cutoff; one old session next to a recent one does not
//! make the patron expired.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

/// One session as seen by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub patron_id: String,
    pub action_type: String,
    pub created_at: NaiveDateTime,
}

/// Read capability the scan needs from a store.
///
/// Implementations return the sessions with the given action type. They may
/// pre-aggregate (one row per patron carrying the latest creation time)
/// since the scan only looks at each patron's maximum.
pub trait SessionRowSource {
    type Error;

    fn session_rows(&mut self, action_type: &str) -> Result<Vec<SessionRow>, Self::Error>;
}

impl SessionRowSource for Vec<SessionRow> {
    type Error = std::convert::Infallible;

    fn session_rows(&mut self, action_type: &str) -> Result<Vec<SessionRow>, Self::Error> {
        Ok(self.iter().filter(|row| row.action_type == action_type).cloned().collect())
    }
}

/// Parameters of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredSessionQuery {
    pub action_type: String,
    pub cutoff: NaiveDateTime,
    pub limit: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ExpiryScanError<E> {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("datastore unavailable: {0}")]
    Datastore(#[source] E),
}

/// Returns up to `query.limit` patron ids whose latest `query.action_type`
/// session was created before `query.cutoff`.
///
/// Patrons overdue the longest come first; equal times are ordered by
/// patron id. A limit of zero yields an empty list without touching the
/// store. Arguments are validated before the store is queried.
pub fn find_expired_patron_ids<S>(
    store: &mut S,
    query: &ExpiredSessionQuery,
) -> Result<Vec<String>, ExpiryScanError<S::Error>>
where
    S: SessionRowSource + ?Sized,
{
    if query.action_type.trim().is_empty() {
        return Err(ExpiryScanError::InvalidArgument(
            "action_type must not be empty".to_string(),
        ));
    }
    if query.limit < 0 {
        return Err(ExpiryScanError::InvalidArgument(format!(
            "limit must not be negative, got {}",
            query.limit
        )));
    }
    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let rows = store.session_rows(&query.action_type).map_err(ExpiryScanError::Datastore)?;

    let mut latest: HashMap<String, NaiveDateTime> = HashMap::new();
    for SessionRow { patron_id, action_type, created_at } in rows {
        if action_type != query.action_type {
            continue;
        }
        latest
            .entry(patron_id)
            .and_modify(|seen| {
                if created_at > *seen {
                    *seen = created_at;
                }
            })
            .or_insert(created_at);
    }

    let mut expired: Vec<(NaiveDateTime, String)> = latest
        .into_iter()
        .filter(|(_, latest_at)| *latest_at < query.cutoff)
        .map(|(patron_id, latest_at)| (latest_at, patron_id))
        .collect();
    expired.sort();
    expired.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));

    Ok(expired.into_iter().map(|(_, patron_id)| patron_id).collect())
}

/// Parses an instant such as `2024-03-01T10:00:00.000Z` or
/// `2024-03-01T10:00:00+02:00` into naive UTC. Offset-less values are taken
/// as UTC.
pub fn parse_instant(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let value = restore_plus_offset(value.trim());
    match DateTime::parse_from_rfc3339(&value) {
        Ok(instant) => Ok(instant.with_timezone(&Utc).naive_utc()),
        Err(err) => NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|_| err),
    }
}

/// Form decoding turns a literal `+` offset into a space. Only a space in
/// front of a trailing `HH:MM` is put back; a date/time separator space is
/// left alone.
fn restore_plus_offset(value: &str) -> String {
    let bytes = value.as_bytes();
    let offset_start = bytes.len().saturating_sub(6);
    let is_offset = bytes.len() > 6
        && bytes[offset_start] == b' '
        && bytes[offset_start + 1].is_ascii_digit()
        && bytes[offset_start + 2].is_ascii_digit()
        && bytes[offset_start + 3] == b':'
        && bytes[offset_start + 4].is_ascii_digit()
        && bytes[offset_start + 5].is_ascii_digit();

    if is_offset {
        format!("{}+{}", &value[..offset_start], &value[offset_start + 1..])
    } else {
        value.to_string()
    }
}
