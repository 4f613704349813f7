use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::application::{AppError, AppResult, AuditLog, TimerRepository};
use crate::domain::{AuditEntry, AuditKind, TimerKey, TimerRecord, UserId};

/// Timers and audit log in one SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// db_url examples
    /// - "sqlite:/data/farm_timers.db" (docker volume)
    /// - "sqlite:./farm_timers.db"
    ///
    /// Only connects; call [`TimerRepository::initialize`] before use.
    pub async fn new(db_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(db_url)
            .map_err(|e| AppError::Storage(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // a write is acknowledged only once it is on disk
            .synchronous(SqliteSynchronous::Full);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn migrate(&self) -> AppResult<()> {
        // last_used stays REAL so databases written by the old bot still load
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_timers (
              user_id INTEGER NOT NULL,
              action TEXT NOT NULL,
              last_used REAL NOT NULL,
              custom_cooldown_secs INTEGER,
              PRIMARY KEY (user_id, action)
            );
          "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        let (has_custom,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM pragma_table_info('user_timers') WHERE name = 'custom_cooldown_secs'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        if has_custom == 0 {
            sqlx::query("ALTER TABLE user_timers ADD COLUMN custom_cooldown_secs INTEGER")
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS logs (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              timestamp TEXT NOT NULL,
              event_type TEXT NOT NULL,
              user_id INTEGER NOT NULL,
              action_name TEXT,
              message TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl TimerRepository for SqliteStore {
    async fn initialize(&self) -> AppResult<()> {
        self.migrate().await
    }

    async fn load_all(&self) -> AppResult<Vec<TimerRecord>> {
        let rows: Vec<(i64, String, f64, Option<i64>)> = sqlx::query_as(
            "SELECT user_id, action, last_used, custom_cooldown_secs FROM user_timers ORDER BY user_id, action",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(user_id, action, last_used, custom)| TimerRecord {
                user_id: UserId::from_i64(user_id),
                action_name: action,
                activated_at: last_used.floor() as i64,
                custom_cooldown_secs: custom.and_then(|s| u64::try_from(s).ok()),
            })
            .collect())
    }

    async fn upsert(&self, record: &TimerRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_timers(user_id, action, last_used, custom_cooldown_secs) VALUES(?, ?, ?, ?)
            ON CONFLICT(user_id, action) DO UPDATE SET
              last_used=excluded.last_used,
              custom_cooldown_secs=excluded.custom_cooldown_secs
            "#,
        )
        .bind(record.user_id.as_i64())
        .bind(&record.action_name)
        .bind(record.activated_at as f64)
        .bind(record.custom_cooldown_secs.map(|s| s as i64))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &TimerKey) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM user_timers WHERE user_id = ? AND action = ?")
            .bind(key.user_id.as_i64())
            .bind(&key.action_name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl AuditLog for SqliteStore {
    async fn append(&self, entry: &AuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO logs(timestamp, event_type, user_id, action_name, message)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.timestamp.to_rfc3339())
        .bind(entry.kind.as_str())
        .bind(entry.user_id.as_i64())
        .bind(entry.action_name.as_deref())
        .bind(entry.detail.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> AppResult<Vec<AuditEntry>> {
        let rows: Vec<(String, String, i64, Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT timestamp, event_type, user_id, action_name, message
            FROM logs ORDER BY id DESC LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (ts, event_type, user_id, action_name, message) in rows {
            let Some(kind) = AuditKind::parse(&event_type) else {
                tracing::warn!(event_type = %event_type, "skipping audit row with unknown kind");
                continue;
            };
            let timestamp = parse_timestamp(&ts).unwrap_or_else(|| {
                tracing::warn!(timestamp = %ts, "unparseable audit timestamp, using epoch");
                DateTime::default()
            });
            out.push(AuditEntry {
                timestamp,
                kind,
                user_id: UserId::from_i64(user_id),
                action_name,
                detail: message,
            });
        }
        Ok(out)
    }
}

/// RFC 3339, or the bare `YYYY-MM-DD HH:MM:SS` of older rows.
///
/// Bare values carry no offset. The old bot wrote them in its host's local
/// time; they are read as UTC here, so they are off by that host's offset.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|t| t.and_utc())
}
