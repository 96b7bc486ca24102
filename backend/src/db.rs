use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{Map, Value};
use shared::{Author, DateRange, DayPatch, DayRecord, GlobalNote, GLOBAL_NOTE_ID};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;

// The database URL for the production database
pub const DEFAULT_DATABASE_URL: &str = "sqlite:availability.db";

/// DbConnection stores day records and notes as JSON documents in SQLite
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// A private in-memory database with a unique name, for tests and demos
    pub async fn init_in_memory() -> Result<Self> {
        let db_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", db_id);

        // A single long-lived connection keeps the in-memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&db_url)
            .await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS day_records (
                date TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Retrieve the record for one date
    pub async fn get_day(&self, date: &str) -> Result<Option<DayRecord>> {
        let row = sqlx::query("SELECT data FROM day_records WHERE date = ?")
            .bind(date)
            .fetch_optional(&*self.pool)
            .await?;

        match row {
            Some(r) => {
                let data: String = r.get("data");
                let record = serde_json::from_str(&data)
                    .with_context(|| format!("corrupt day record for {}", date))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Upsert the fields present in `patch` and stamp the author's timestamp.
    ///
    /// The merge happens inside SQLite with `json_patch`, so concurrent writes
    /// to different fields of the same date do not overwrite each other.
    pub async fn merge_day(&self, date: &str, patch: &DayPatch, author: Author) -> Result<()> {
        let mut fields = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.insert("date".to_string(), Value::String(date.to_string()));
        fields.insert(
            author.timestamp_field().to_string(),
            serde_json::to_value(Utc::now())?,
        );
        let data = Value::Object(fields).to_string();

        sqlx::query(
            r#"
            INSERT INTO day_records (date, data) VALUES (?, ?)
            ON CONFLICT(date) DO UPDATE SET data = json_patch(day_records.data, excluded.data)
            "#,
        )
        .bind(date)
        .bind(&data)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// All records in the inclusive date range, in date order
    pub async fn query_days(&self, range: &DateRange) -> Result<Vec<DayRecord>> {
        let rows = sqlx::query("SELECT data FROM day_records WHERE date >= ? AND date <= ? ORDER BY date")
            .bind(&range.start)
            .bind(&range.end)
            .fetch_all(&*self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let data: String = row.get("data");
                serde_json::from_str(&data).context("corrupt day record")
            })
            .collect()
    }

    pub async fn get_global_note(&self) -> Result<Option<GlobalNote>> {
        let row = sqlx::query("SELECT data FROM notes WHERE id = ?")
            .bind(GLOBAL_NOTE_ID)
            .fetch_optional(&*self.pool)
            .await?;

        match row {
            Some(r) => {
                let data: String = r.get("data");
                Ok(Some(serde_json::from_str(&data).context("corrupt global note")?))
            }
            None => Ok(None),
        }
    }

    pub async fn merge_global_note(&self, note: &str) -> Result<()> {
        let data = serde_json::to_string(&GlobalNote {
            note: note.to_string(),
            updated_at: Some(Utc::now()),
        })?;

        sqlx::query(
            r#"
            INSERT INTO notes (id, data) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET data = json_patch(notes.data, excluded.data)
            "#,
        )
        .bind(GLOBAL_NOTE_ID)
        .bind(&data)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }
}
