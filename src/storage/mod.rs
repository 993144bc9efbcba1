pub mod media;

use anyhow::{Context as _, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

use crate::detect::Detection;

// ─── Row types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub role: String,
    pub is_suspended: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TranslationRow {
    pub id: String,
    /// NULL for anonymous (unauthenticated) translations.
    pub user_id: Option<String>,
    pub original_text: String,
    pub translated_text: String,
    pub timestamp: String,
    pub is_favorite: bool,
    /// Detection fields are NULL for rows added manually via the history API.
    pub detected_language: Option<String>,
    pub language_confidence: Option<f64>,
    pub detection_method: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct FavoriteRow {
    pub id: String,
    pub user_id: String,
    pub original_text: String,
    pub translated_text: String,
    pub timestamp: String,
    /// History row this favorite was copied from, when saved by id.
    pub translation_id: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct VoiceRecordingRow {
    pub id: String,
    pub user_id: String,
    pub duration: f64,
    pub language: String,
    pub transcription: String,
    pub translation: Option<String>,
    pub timestamp: String,
    pub is_favorite: bool,
}

// ─── Storage ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("turjubaan.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                full_name     TEXT NOT NULL,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                password_salt TEXT NOT NULL,
                role          TEXT NOT NULL DEFAULT 'user',
                is_suspended  INTEGER NOT NULL DEFAULT 0,
                created_at    TEXT NOT NULL,
                last_login    TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            "#,
        )
        .execute(pool)
        .await
        .context("Creating users table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS translations (
                id                  TEXT PRIMARY KEY,
                user_id             TEXT,
                original_text       TEXT NOT NULL,
                translated_text     TEXT NOT NULL,
                timestamp           TEXT NOT NULL,
                is_favorite         INTEGER NOT NULL DEFAULT 0,
                detected_language   TEXT,
                language_confidence REAL,
                detection_method    TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_translations_user ON translations(user_id);
            CREATE INDEX IF NOT EXISTS idx_translations_time ON translations(timestamp DESC);
            "#,
        )
        .execute(pool)
        .await
        .context("Creating translations table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                original_text   TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                timestamp       TEXT NOT NULL,
                translation_id  TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_favorites_user ON favorites(user_id);
            "#,
        )
        .execute(pool)
        .await
        .context("Creating favorites table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS voice_recordings (
                id            TEXT PRIMARY KEY,
                user_id       TEXT NOT NULL,
                duration      REAL NOT NULL DEFAULT 0,
                language      TEXT NOT NULL DEFAULT 'so',
                transcription TEXT NOT NULL DEFAULT '',
                translation   TEXT,
                timestamp     TEXT NOT NULL,
                is_favorite   INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_recordings_user ON voice_recordings(user_id);
            "#,
        )
        .execute(pool)
        .await
        .context("Creating voice_recordings table")?;

        Ok(())
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
        password_salt: &str,
        role: &str,
    ) -> Result<UserRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, password_salt, role, is_suspended, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .bind(password_salt)
        .bind(role)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Inserting user")?;

        Ok(UserRow {
            id,
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            password_salt: password_salt.to_string(),
            role: role.to_string(),
            is_suspended: false,
            created_at: now,
            last_login: None,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_users_page(&self, page: i64, limit: i64) -> Result<Vec<UserRow>> {
        let offset = (page.max(1) - 1) * limit;
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_suspended_users(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_suspended = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Partial update: `None` fields keep their current value.
    pub async fn update_user(
        &self,
        id: &str,
        full_name: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
        is_suspended: Option<bool>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET
                full_name    = COALESCE(?, full_name),
                email        = COALESCE(?, email),
                role         = COALESCE(?, role),
                is_suspended = COALESCE(?, is_suspended)
             WHERE id = ?",
        )
        .bind(full_name)
        .bind(email)
        .bind(role)
        .bind(is_suspended)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_user_suspended(&self, id: &str, suspended: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_suspended = ? WHERE id = ?")
            .bind(suspended)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_user(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_login(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Translations ───────────────────────────────────────────────────────

    pub async fn insert_translation(
        &self,
        user_id: Option<&str>,
        original_text: &str,
        translated_text: &str,
        detection: Option<&Detection>,
    ) -> Result<TranslationRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let detected_language = detection.map(|d| d.language.code().to_string());
        let language_confidence = detection.map(|d| d.confidence);
        let detection_method = detection.map(|d| d.method.as_str().to_string());

        sqlx::query(
            "INSERT INTO translations
                (id, user_id, original_text, translated_text, timestamp, is_favorite,
                 detected_language, language_confidence, detection_method)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(original_text)
        .bind(translated_text)
        .bind(&now)
        .bind(&detected_language)
        .bind(language_confidence)
        .bind(&detection_method)
        .execute(&self.pool)
        .await
        .context("Inserting translation")?;

        Ok(TranslationRow {
            id,
            user_id: user_id.map(str::to_string),
            original_text: original_text.to_string(),
            translated_text: translated_text.to_string(),
            timestamp: now,
            is_favorite: false,
            detected_language,
            language_confidence,
            detection_method,
        })
    }

    /// One page of a user's history, newest first.
    pub async fn list_translations(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<Vec<TranslationRow>> {
        let offset = (page.max(1) - 1) * limit;
        let rows = sqlx::query_as::<_, TranslationRow>(
            "SELECT * FROM translations WHERE user_id = ?
             ORDER BY timestamp DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_translations(&self, user_id: &str) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM translations WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_user_translations_since(
        &self,
        user_id: &str,
        since: &str,
    ) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM translations WHERE user_id = ? AND timestamp >= ?",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    pub async fn get_translation(&self, id: &str, user_id: &str) -> Result<Option<TranslationRow>> {
        let row = sqlx::query_as::<_, TranslationRow>(
            "SELECT * FROM translations WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_translation_favorite(
        &self,
        id: &str,
        user_id: &str,
        favorite: bool,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE translations SET is_favorite = ? WHERE id = ? AND user_id = ?")
                .bind(favorite)
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_translation(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM translations WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_translations(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM translations WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_translations_total(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM translations")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_translations_since(&self, since: &str) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM translations WHERE timestamp >= ?")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_translations_between(&self, start: &str, end: &str) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM translations WHERE timestamp >= ? AND timestamp < ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    pub async fn list_translations_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<TranslationRow>> {
        let rows = sqlx::query_as::<_, TranslationRow>(
            "SELECT * FROM translations WHERE timestamp >= ? AND timestamp < ?
             ORDER BY timestamp DESC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Distinct signed-in users who translated at or after `since`.
    pub async fn distinct_translation_users_since(&self, since: &str) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT user_id) FROM translations
             WHERE timestamp >= ? AND user_id IS NOT NULL",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    pub async fn distinct_translation_users_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT user_id) FROM translations
             WHERE timestamp >= ? AND timestamp < ? AND user_id IS NOT NULL",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    pub async fn recent_translations(&self, limit: i64) -> Result<Vec<TranslationRow>> {
        let rows = sqlx::query_as::<_, TranslationRow>(
            "SELECT * FROM translations ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Heaviest signed-in translators since `since`, as (user_id, count).
    pub async fn top_translation_users_since(
        &self,
        since: &str,
        limit: i64,
    ) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT user_id, COUNT(*) as n FROM translations
             WHERE timestamp >= ? AND user_id IS NOT NULL
             GROUP BY user_id ORDER BY n DESC LIMIT ?",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ─── Favorites ──────────────────────────────────────────────────────────

    pub async fn insert_favorite(
        &self,
        user_id: &str,
        original_text: &str,
        translated_text: &str,
        translation_id: Option<&str>,
    ) -> Result<FavoriteRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO favorites (id, user_id, original_text, translated_text, timestamp, translation_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(original_text)
        .bind(translated_text)
        .bind(&now)
        .bind(translation_id)
        .execute(&self.pool)
        .await
        .context("Inserting favorite")?;

        Ok(FavoriteRow {
            id,
            user_id: user_id.to_string(),
            original_text: original_text.to_string(),
            translated_text: translated_text.to_string(),
            timestamp: now,
            translation_id: translation_id.map(str::to_string),
        })
    }

    pub async fn list_favorites(&self, user_id: &str) -> Result<Vec<FavoriteRow>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            "SELECT * FROM favorites WHERE user_id = ? ORDER BY timestamp DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_favorite(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_favorites(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_favorites_total(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_favorites(&self, user_id: &str) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    // ─── Voice recordings ───────────────────────────────────────────────────

    pub async fn insert_recording(
        &self,
        user_id: &str,
        duration: f64,
        language: &str,
        transcription: &str,
        translation: Option<&str>,
    ) -> Result<VoiceRecordingRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO voice_recordings
                (id, user_id, duration, language, transcription, translation, timestamp, is_favorite)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(duration)
        .bind(language)
        .bind(transcription)
        .bind(translation)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Inserting voice recording")?;

        Ok(VoiceRecordingRow {
            id,
            user_id: user_id.to_string(),
            duration,
            language: language.to_string(),
            transcription: transcription.to_string(),
            translation: translation.map(str::to_string),
            timestamp: now,
            is_favorite: false,
        })
    }

    pub async fn list_recordings(
        &self,
        user_id: &str,
        only_favorites: bool,
    ) -> Result<Vec<VoiceRecordingRow>> {
        let sql = if only_favorites {
            "SELECT * FROM voice_recordings WHERE user_id = ? AND is_favorite = 1
             ORDER BY timestamp DESC"
        } else {
            "SELECT * FROM voice_recordings WHERE user_id = ? ORDER BY timestamp DESC"
        };
        let rows = sqlx::query_as::<_, VoiceRecordingRow>(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_recording(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<VoiceRecordingRow>> {
        let row = sqlx::query_as::<_, VoiceRecordingRow>(
            "SELECT * FROM voice_recordings WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_recording_favorite(
        &self,
        id: &str,
        user_id: &str,
        favorite: bool,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE voice_recordings SET is_favorite = ? WHERE id = ? AND user_id = ?")
                .bind(favorite)
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_recording(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM voice_recordings WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of all of a user's recordings, for blob cleanup before a clear.
    pub async fn recording_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT id FROM voice_recordings WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn clear_recordings(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM voice_recordings WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_recordings_total(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM voice_recordings")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Detection, Lang, Method};
    use tempfile::TempDir;

    async fn storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path()).await.unwrap();
        (dir, storage)
    }

    fn detection() -> Detection {
        Detection {
            language: Lang::Somali,
            confidence: 0.8,
            method: Method::PatternMatching,
        }
    }

    #[tokio::test]
    async fn user_roundtrip_and_email_lookup() {
        let (_dir, s) = storage().await;
        let created = s
            .create_user("Ayaan Cali", "ayaan@example.com", "hash", "salt", "user")
            .await
            .unwrap();

        let by_id = s.get_user(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ayaan@example.com");
        assert!(!by_id.is_suspended);

        let by_email = s.get_user_by_email("ayaan@example.com").await.unwrap();
        assert!(by_email.is_some());
        assert!(s.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_schema() {
        let (_dir, s) = storage().await;
        s.create_user("A", "same@example.com", "h", "s", "user")
            .await
            .unwrap();
        assert!(s
            .create_user("B", "same@example.com", "h", "s", "user")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn partial_user_update_keeps_other_fields() {
        let (_dir, s) = storage().await;
        let u = s
            .create_user("Old Name", "u@example.com", "h", "s", "user")
            .await
            .unwrap();

        assert!(s
            .update_user(&u.id, Some("New Name"), None, None, Some(true))
            .await
            .unwrap());

        let updated = s.get_user(&u.id).await.unwrap().unwrap();
        assert_eq!(updated.full_name, "New Name");
        assert_eq!(updated.email, "u@example.com");
        assert!(updated.is_suspended);
    }

    #[tokio::test]
    async fn translation_history_is_user_scoped_and_paginated() {
        let (_dir, s) = storage().await;
        for i in 0..5 {
            s.insert_translation(Some("u-1"), &format!("qoraal {i}"), "text", Some(&detection()))
                .await
                .unwrap();
        }
        s.insert_translation(Some("u-2"), "kale", "other", Some(&detection()))
            .await
            .unwrap();
        s.insert_translation(None, "anon", "anon", Some(&detection()))
            .await
            .unwrap();

        assert_eq!(s.count_translations("u-1").await.unwrap(), 5);
        assert_eq!(s.count_translations("u-2").await.unwrap(), 1);
        assert_eq!(s.count_translations_total().await.unwrap(), 7);

        let page1 = s.list_translations("u-1", 1, 2).await.unwrap();
        let page3 = s.list_translations("u-1", 3, 2).await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page3.len(), 1);

        // Scoped get refuses another user's row.
        let other = s.list_translations("u-2", 1, 10).await.unwrap();
        assert!(s
            .get_translation(&other[0].id, "u-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn manual_history_rows_have_no_detection_fields() {
        let (_dir, s) = storage().await;
        let row = s
            .insert_translation(Some("u-1"), "qoraal", "text", None)
            .await
            .unwrap();
        assert_eq!(row.detected_language, None);
        assert_eq!(row.language_confidence, None);

        let fetched = s.get_translation(&row.id, "u-1").await.unwrap().unwrap();
        assert_eq!(fetched.detection_method, None);
    }

    #[tokio::test]
    async fn clear_translations_reports_count() {
        let (_dir, s) = storage().await;
        for _ in 0..3 {
            s.insert_translation(Some("u-1"), "a", "b", None).await.unwrap();
        }
        assert_eq!(s.clear_translations("u-1").await.unwrap(), 3);
        assert_eq!(s.clear_translations("u-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn favorites_roundtrip() {
        let (_dir, s) = storage().await;
        let t = s
            .insert_translation(Some("u-1"), "qoraal", "text", Some(&detection()))
            .await
            .unwrap();
        let f = s
            .insert_favorite("u-1", &t.original_text, &t.translated_text, Some(&t.id))
            .await
            .unwrap();
        s.set_translation_favorite(&t.id, "u-1", true).await.unwrap();

        let favs = s.list_favorites("u-1").await.unwrap();
        assert_eq!(favs.len(), 1);
        assert_eq!(favs[0].translation_id.as_deref(), Some(t.id.as_str()));

        let marked = s.get_translation(&t.id, "u-1").await.unwrap().unwrap();
        assert!(marked.is_favorite);

        assert!(s.delete_favorite(&f.id, "u-1").await.unwrap());
        assert!(!s.delete_favorite(&f.id, "u-1").await.unwrap());
    }

    #[tokio::test]
    async fn voice_recordings_favorite_filter() {
        let (_dir, s) = storage().await;
        let a = s
            .insert_recording("u-1", 2.5, "so", "salaan", None)
            .await
            .unwrap();
        s.insert_recording("u-1", 1.0, "so", "mahadsanid", Some("thank you"))
            .await
            .unwrap();

        s.set_recording_favorite(&a.id, "u-1", true).await.unwrap();

        assert_eq!(s.list_recordings("u-1", false).await.unwrap().len(), 2);
        let favs = s.list_recordings("u-1", true).await.unwrap();
        assert_eq!(favs.len(), 1);
        assert_eq!(favs[0].id, a.id);

        let ids = s.recording_ids("u-1").await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(s.clear_recordings("u-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn admin_window_counts_use_timestamp_order() {
        let (_dir, s) = storage().await;
        s.insert_translation(Some("u-1"), "a", "b", None).await.unwrap();
        s.insert_translation(Some("u-2"), "c", "d", None).await.unwrap();

        // Everything inserted above is after the epoch and before tomorrow.
        assert_eq!(
            s.count_translations_since("1970-01-01T00:00:00+00:00")
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            s.count_translations_since("2999-01-01T00:00:00+00:00")
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            s.distinct_translation_users_since("1970-01-01T00:00:00+00:00")
                .await
                .unwrap(),
            2
        );

        let top = s
            .top_translation_users_since("1970-01-01T00:00:00+00:00", 10)
            .await
            .unwrap();
        assert_eq!(top.len(), 2);
    }
}
