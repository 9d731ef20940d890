//! Listing query support.
//!
//! Session listings accept a `query` parameter made of field-equality clauses
//! joined by `and`, e.g. `actionType==Check-out and patronId=="1234"`.
//! `cql.allRecords=1` or an empty query matches every record.

use rocket::form::FromForm;

use crate::models::SessionFilter;

/// Default page size when no `limit` is given.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Query options accepted by collection endpoints.
#[derive(FromForm, Debug, Clone, Default)]
pub struct ListQuery {
    /// Filter expression
    pub query: Option<String>,

    /// Number of records to skip
    pub offset: Option<i64>,

    /// Maximum number of records to return
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Returns `(offset, limit)` with defaults applied, or an error for
    /// negative values.
    pub fn paging(&self) -> Result<(i64, i64), String> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if offset < 0 {
            return Err(format!("offset must not be negative, got {}", offset));
        }
        if limit < 0 {
            return Err(format!("limit must not be negative, got {}", limit));
        }
        Ok((offset, limit))
    }

    pub fn session_filter(&self) -> Result<SessionFilter, String> {
        parse_session_filter(self.query.as_deref().unwrap_or(""))
    }
}

/// Parses a session filter expression.
pub fn parse_session_filter(expression: &str) -> Result<SessionFilter, String> {
    let mut filter = SessionFilter::default();
    let expression = expression.trim();

    if expression.is_empty() || expression == "cql.allRecords=1" {
        return Ok(filter);
    }

    for clause in split_clauses(expression) {
        let (field, value) = clause
            .split_once("==")
            .ok_or_else(|| format!("malformed clause '{}', expected field==value", clause))?;
        let field = field.trim();
        let value = unquote(value.trim());

        if value.is_empty() {
            return Err(format!("empty value for field '{}'", field));
        }

        let slot = match field {
            "id" => &mut filter.id,
            "patronId" => &mut filter.patron_id,
            "loanId" => &mut filter.loan_id,
            "actionType" => &mut filter.action_type,
            other => return Err(format!("unsupported query field '{}'", other)),
        };
        if slot.is_some() {
            return Err(format!("field '{}' given more than once", field));
        }
        *slot = Some(value.to_string());
    }

    Ok(filter)
}

/// Splits on the `and` keyword, case-insensitively, outside quotes.
fn split_clauses(expression: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let bytes = expression.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b' ' if !in_quotes && is_and_keyword(&bytes[i..]) => {
                clauses.push(expression[start..i].trim());
                i += 5;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    clauses.push(expression[start..].trim());
    clauses
}

fn is_and_keyword(rest: &[u8]) -> bool {
    rest.len() > 5 && rest[..5].eq_ignore_ascii_case(b" and ")
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
