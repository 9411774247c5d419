//! Subscriber records and patch-based upserts.
//!
//! One row per chat. A row's existence is the consent signal: /stop and the
//! unsubscribe button delete the row instead of flagging it.

use rusqlite::OptionalExtension;

use crate::core::error::AppResult;
use crate::storage::db::DbConnection;

/// Push frequency for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Frequency {
    #[default]
    Normal,
    Low,
}

/// A subscriber row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    /// Raw locale tag as reported by Telegram (e.g. "vi", "zh-hans").
    /// `None` means the configured default applies.
    pub locale: Option<String>,
    pub consent: bool,
    /// Free-form attribution tag from the /start deep link, ≤64 chars.
    pub source: Option<String>,
    pub frequency: Frequency,
    /// Last free-text league preference reply, ≤100 chars.
    pub leagues: Option<String>,
    /// Epoch seconds, set on insert.
    pub created_at: i64,
    /// Epoch seconds, refreshed on every write.
    pub updated_at: i64,
}

/// Partial-field update for [`upsert`].
///
/// Every field is present-or-absent: `None` means "leave unchanged", which is
/// distinct from setting a nullable column to NULL (the nested `Option` on
/// `username`/`first_name`).
#[derive(Debug, Clone, Default)]
pub struct SubscriberPatch {
    pub username: Option<Option<String>>,
    pub first_name: Option<Option<String>>,
    pub locale: Option<String>,
    pub consent: Option<bool>,
    pub source: Option<String>,
    pub frequency: Option<Frequency>,
    pub leagues: Option<String>,
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Insert-or-update the row for `chat_id` with the fields given in `patch`.
///
/// On insert, unset fields take their schema defaults and
/// `created_at == updated_at == now`. On update, only the given fields plus
/// `updated_at` are written; everything else is left untouched. Runs as a
/// single `INSERT … ON CONFLICT DO UPDATE` statement so concurrent writers
/// to the same chat serialize inside SQLite.
pub fn upsert(conn: &DbConnection, chat_id: i64, patch: &SubscriberPatch) -> AppResult<()> {
    upsert_at(conn, chat_id, patch, now_ts())
}

/// [`upsert`] with an explicit clock, for deterministic tests.
pub fn upsert_at(conn: &DbConnection, chat_id: i64, patch: &SubscriberPatch, now: i64) -> AppResult<()> {
    let mut columns: Vec<&str> = vec!["chat_id", "created_at", "updated_at"];
    let mut params: Vec<&dyn rusqlite::ToSql> = vec![&chat_id, &now, &now];

    if let Some(username) = &patch.username {
        columns.push("username");
        params.push(username);
    }
    if let Some(first_name) = &patch.first_name {
        columns.push("first_name");
        params.push(first_name);
    }
    if let Some(locale) = &patch.locale {
        columns.push("locale");
        params.push(locale);
    }
    if let Some(consent) = &patch.consent {
        columns.push("consent");
        params.push(consent);
    }
    if let Some(source) = &patch.source {
        columns.push("source");
        params.push(source);
    }
    let frequency = patch.frequency.map(|f| f.to_string());
    if let Some(frequency) = &frequency {
        columns.push("frequency");
        params.push(frequency);
    }
    if let Some(leagues) = &patch.leagues {
        columns.push("leagues");
        params.push(leagues);
    }

    let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("?{i}")).collect();
    // On conflict, write updated_at plus the patch columns only; chat_id and
    // created_at stay as inserted.
    let assignments: Vec<String> = columns[2..].iter().map(|col| format!("{col}=excluded.{col}")).collect();

    let sql = format!(
        "INSERT INTO subscribers ({}) VALUES ({}) ON CONFLICT(chat_id) DO UPDATE SET {}",
        columns.join(", "),
        placeholders.join(", "),
        assignments.join(", "),
    );
    conn.execute(&sql, params.as_slice())?;
    Ok(())
}

/// Fetch the subscriber for `chat_id`, if any.
pub fn get(conn: &DbConnection, chat_id: i64) -> AppResult<Option<Subscriber>> {
    let row = conn
        .query_row(
            "SELECT chat_id, username, first_name, locale, consent, source, frequency, leagues,
                    created_at, updated_at
             FROM subscribers WHERE chat_id = ?1",
            rusqlite::params![chat_id],
            |row| {
                Ok(Subscriber {
                    chat_id: row.get(0)?,
                    username: row.get(1)?,
                    first_name: row.get(2)?,
                    locale: row.get(3)?,
                    consent: row.get::<_, i64>(4)? != 0,
                    source: row.get(5)?,
                    frequency: row.get::<_, String>(6)?.parse().unwrap_or_default(),
                    leagues: row.get(7)?,
                    created_at: row.get(8)?,
                    updated_at: row.get(9)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Delete the subscriber row. Deleting an absent chat is a no-op, not an error.
pub fn delete(conn: &DbConnection, chat_id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM subscribers WHERE chat_id = ?1", rusqlite::params![chat_id])?;
    Ok(())
}

/// Set the push frequency for an existing subscriber.
///
/// A bare UPDATE: writes nothing when the row is absent (stale callbacks
/// after unsubscribe fall through silently).
pub fn set_frequency(conn: &DbConnection, chat_id: i64, frequency: Frequency) -> AppResult<()> {
    set_frequency_at(conn, chat_id, frequency, now_ts())
}

/// [`set_frequency`] with an explicit clock.
pub fn set_frequency_at(conn: &DbConnection, chat_id: i64, frequency: Frequency, now: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE subscribers SET frequency = ?1, updated_at = ?2 WHERE chat_id = ?3",
        rusqlite::params![frequency.to_string(), now, chat_id],
    )?;
    Ok(())
}

/// Record the last free-text league preference for an existing subscriber.
pub fn set_leagues(conn: &DbConnection, chat_id: i64, leagues: &str) -> AppResult<()> {
    set_leagues_at(conn, chat_id, leagues, now_ts())
}

/// [`set_leagues`] with an explicit clock.
pub fn set_leagues_at(conn: &DbConnection, chat_id: i64, leagues: &str, now: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE subscribers SET leagues = ?1, updated_at = ?2 WHERE chat_id = ?3",
        rusqlite::params![leagues, now, chat_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::{create_pool, get_connection, DbPool};
    use pretty_assertions::assert_eq;

    fn test_pool() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        (dir, pool)
    }

    fn start_patch() -> SubscriberPatch {
        SubscriberPatch {
            username: Some(Some("x".to_string())),
            first_name: Some(Some("X".to_string())),
            locale: Some("vi".to_string()),
            consent: Some(true),
            source: Some("promoA".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn upsert_then_get_returns_matching_record() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_at(&conn, 42, &start_patch(), 1_000).unwrap();

        let sub = get(&conn, 42).unwrap().unwrap();
        assert_eq!(sub.chat_id, 42);
        assert_eq!(sub.username.as_deref(), Some("x"));
        assert_eq!(sub.first_name.as_deref(), Some("X"));
        assert_eq!(sub.locale.as_deref(), Some("vi"));
        assert!(sub.consent);
        assert_eq!(sub.source.as_deref(), Some("promoA"));
        assert_eq!(sub.frequency, Frequency::Normal);
        assert_eq!(sub.leagues, None);
        assert_eq!(sub.created_at, sub.updated_at);
    }

    #[test]
    fn partial_upsert_leaves_omitted_fields_unchanged() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_at(&conn, 42, &start_patch(), 1_000).unwrap();
        let patch = SubscriberPatch {
            locale: Some("zh-hans".to_string()),
            ..Default::default()
        };
        upsert_at(&conn, 42, &patch, 2_000).unwrap();

        let sub = get(&conn, 42).unwrap().unwrap();
        assert_eq!(sub.locale.as_deref(), Some("zh-hans"));
        // previously-set, now-omitted fields survive
        assert_eq!(sub.username.as_deref(), Some("x"));
        assert_eq!(sub.source.as_deref(), Some("promoA"));
        assert_eq!(sub.created_at, 1_000);
        assert_eq!(sub.updated_at, 2_000);
        assert!(sub.updated_at > sub.created_at);
    }

    #[test]
    fn upsert_is_idempotent_aside_from_timestamps() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_at(&conn, 42, &start_patch(), 1_000).unwrap();
        let first = get(&conn, 42).unwrap().unwrap();

        upsert_at(&conn, 42, &start_patch(), 3_000).unwrap();
        let second = get(&conn, 42).unwrap().unwrap();

        assert_eq!(
            Subscriber {
                updated_at: first.updated_at,
                ..second.clone()
            },
            first
        );
        assert_eq!(second.updated_at, 3_000);
    }

    #[test]
    fn username_can_be_set_to_null() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_at(&conn, 42, &start_patch(), 1_000).unwrap();
        let patch = SubscriberPatch {
            username: Some(None),
            ..Default::default()
        };
        upsert_at(&conn, 42, &patch, 2_000).unwrap();

        let sub = get(&conn, 42).unwrap().unwrap();
        assert_eq!(sub.username, None);
        // "leave unchanged" is distinct from "set to NULL"
        assert_eq!(sub.first_name.as_deref(), Some("X"));
    }

    #[test]
    fn delete_then_get_is_not_found_and_absent_delete_is_a_noop() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_at(&conn, 42, &start_patch(), 1_000).unwrap();
        delete(&conn, 42).unwrap();
        assert!(get(&conn, 42).unwrap().is_none());

        // absent chat_id: no error
        delete(&conn, 42).unwrap();
        delete(&conn, 999).unwrap();
    }

    #[test]
    fn single_field_writes_touch_updated_at_only() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_at(&conn, 42, &start_patch(), 1_000).unwrap();
        set_frequency_at(&conn, 42, Frequency::Low, 2_000).unwrap();
        set_leagues_at(&conn, 42, "V.League, EPL", 3_000).unwrap();

        let sub = get(&conn, 42).unwrap().unwrap();
        assert_eq!(sub.frequency, Frequency::Low);
        assert_eq!(sub.leagues.as_deref(), Some("V.League, EPL"));
        assert_eq!(sub.created_at, 1_000);
        assert_eq!(sub.updated_at, 3_000);
        assert_eq!(sub.source.as_deref(), Some("promoA"));
    }

    #[test]
    fn single_field_writes_do_not_create_rows() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        set_leagues_at(&conn, 7, "EPL", 1_000).unwrap();
        set_frequency_at(&conn, 7, Frequency::Low, 1_000).unwrap();

        assert!(get(&conn, 7).unwrap().is_none());
    }

    #[test]
    fn frequency_round_trips_through_text() {
        assert_eq!(Frequency::Normal.to_string(), "normal");
        assert_eq!(Frequency::Low.to_string(), "low");
        assert_eq!("low".parse::<Frequency>().unwrap(), Frequency::Low);
        assert!("weekly".parse::<Frequency>().is_err());
    }
}
