//! Date and lookup helpers used around bookings

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{AdminError, AdminResult};
use crate::models::{Language, UserMeta};
use crate::repositories::BaseRepository;

/// Timestamp format used for job times
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// When a job offer expires, given its due time and creation time.
///
/// Banded on the absolute hour difference between the two:
/// up to 1.5h the due time itself, up to 24h creation + 90 minutes,
/// up to 72h creation + 16 hours, beyond that due time - 48 hours.
pub fn will_expire_at(due_time: NaiveDateTime, created_at: NaiveDateTime) -> NaiveDateTime {
    let difference = (due_time - created_at).num_seconds().abs() as f64 / 3600.0;

    if difference <= 1.5 {
        due_time
    } else if difference <= 24.0 {
        created_at + Duration::minutes(90)
    } else if difference <= 72.0 {
        created_at + Duration::hours(16)
    } else {
        due_time - Duration::hours(48)
    }
}

/// String form of [`will_expire_at`] over `Y-m-d H:i:s` timestamps
pub fn will_expire_at_str(due_time: &str, created_at: &str) -> AdminResult<String> {
    let due_time = parse_datetime(due_time)?;
    let created_at = parse_datetime(created_at)?;

    Ok(will_expire_at(due_time, created_at)
        .format(DATETIME_FORMAT)
        .to_string())
}

fn parse_datetime(value: &str) -> AdminResult<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| AdminError::BadRequest(format!("Invalid timestamp '{}': {}", value, e)))
}

/// Result of a user meta lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UsermetaLookup {
    /// Every meta attribute of the user
    All(BTreeMap<String, Option<String>>),
    /// A single attribute, empty when unset or unknown
    Value(String),
}

/// Select all attributes or a single one from a meta row
pub fn lookup_usermeta(meta: &UserMeta, key: Option<&str>) -> UsermetaLookup {
    let attributes = meta.attributes();

    match key.filter(|k| !k.is_empty()) {
        None => UsermetaLookup::All(
            attributes
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        ),
        Some(key) => UsermetaLookup::Value(
            attributes
                .into_iter()
                .find(|(name, _)| *name == key)
                .and_then(|(_, value)| value)
                .unwrap_or_default(),
        ),
    }
}

/// Meta attributes of a user; fails when the user has no meta row
pub async fn get_usermeta(
    repository: &BaseRepository<UserMeta>,
    user_id: i64,
    key: Option<&str>,
) -> AdminResult<UsermetaLookup> {
    let meta = repository
        .first_where("user_id", user_id)
        .await?
        .ok_or_else(|| AdminError::not_found("UserMeta", user_id))?;

    Ok(lookup_usermeta(&meta, key))
}

/// Display name of a language
pub async fn fetch_language(repository: &BaseRepository<Language>, id: i64) -> AdminResult<String> {
    Ok(repository.find_or_fail(id).await?.language)
}
