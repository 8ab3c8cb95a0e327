use std::collections::HashMap;

use {
    async_trait::async_trait,
    serde_json::{Map, Value},
    tokio::sync::RwLock,
    tracing::debug,
};

#[cfg(feature = "metrics")]
use mediahost_metrics::{counter, labels, records as record_metrics};

use crate::{
    error::{Error, Result},
    schema::SchemaRegistry,
    types::Record,
};

/// Trait for persisting records. Implementations can be SQLite-backed,
/// in-memory, or adapters over an application's own database.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, record_type: &str, id: &str) -> Result<Option<Record>>;

    /// Insert a new record. Fails with [`Error::AlreadyExists`] on an id clash.
    async fn insert(&self, record: Record) -> Result<()>;

    /// Atomically merge `fields` into the record and return it post-update.
    ///
    /// The patch is validated against the record type's schema before
    /// anything is written. Returns `Ok(None)` when no record has this id.
    async fn find_and_update_by_id(
        &self,
        record_type: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<Record>>;
}

fn record_updated(record_type: &str, found: bool) {
    debug!(record_type, found, "record update");
    #[cfg(feature = "metrics")]
    {
        let name = if found {
            record_metrics::UPDATES_TOTAL
        } else {
            record_metrics::NOT_FOUND_TOTAL
        };
        counter!(name, labels::RECORD_TYPE => record_type.to_string()).increment(1);
    }
}

// ── SQLite-backed implementation ────────────────────────────────────

/// Stores records in a SQLite database, one JSON document per row.
pub struct SqliteRecordStore {
    pool: sqlx::SqlitePool,
    schemas: SchemaRegistry,
}

impl SqliteRecordStore {
    pub fn new(pool: sqlx::SqlitePool, schemas: SchemaRegistry) -> Self {
        Self { pool, schemas }
    }

    /// Initialize the records table schema.
    ///
    /// Production setups use [`crate::run_migrations`]; this is kept for
    /// tests that use in-memory databases.
    #[doc(hidden)]
    pub async fn init(pool: &sqlx::SqlitePool) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS records (
                record_type TEXT    NOT NULL,
                id          TEXT    NOT NULL,
                fields      TEXT    NOT NULL DEFAULT '{}',
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL,
                PRIMARY KEY (record_type, id)
            )"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get(&self, record_type: &str, id: &str) -> Result<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT * FROM records WHERE record_type = ? AND id = ?",
        )
        .bind(record_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Record::try_from).transpose()
    }

    async fn insert(&self, record: Record) -> Result<()> {
        self.schemas
            .get(&record.record_type)?
            .validate(&record.fields)?;

        let result = sqlx::query(
            r#"INSERT INTO records (record_type, id, fields, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(record_type, id) DO NOTHING"#,
        )
        .bind(&record.record_type)
        .bind(&record.id)
        .bind(serde_json::to_string(&record.fields)?)
        .bind(record.created_at as i64)
        .bind(record.updated_at as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::already_exists(record.record_type, record.id));
        }
        Ok(())
    }

    async fn find_and_update_by_id(
        &self,
        record_type: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<Record>> {
        self.schemas.get(record_type)?.validate(&fields)?;

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT * FROM records WHERE record_type = ? AND id = ?",
        )
        .bind(record_type)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            record_updated(record_type, false);
            return Ok(None);
        };

        let mut record = Record::try_from(row)?;
        record.apply(fields);

        sqlx::query(
            "UPDATE records SET fields = ?, updated_at = ? WHERE record_type = ? AND id = ?",
        )
        .bind(serde_json::to_string(&record.fields)?)
        .bind(record.updated_at as i64)
        .bind(record_type)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        record_updated(record_type, true);
        Ok(Some(record))
    }
}

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct RecordRow {
    record_type: String,
    id: String,
    fields: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RecordRow> for Record {
    type Error = Error;

    fn try_from(r: RecordRow) -> Result<Self> {
        let Value::Object(fields) = serde_json::from_str::<Value>(&r.fields)? else {
            return Err(Error::CorruptRecord {
                record_type: r.record_type,
                id: r.id,
            });
        };
        Ok(Self {
            record_type: r.record_type,
            id: r.id,
            fields,
            created_at: r.created_at as u64,
            updated_at: r.updated_at as u64,
        })
    }
}

// ── In-memory implementation ─────────────────────────────────────────

/// Keeps records in a process-local map. Useful for tests and for
/// applications that mirror their documents elsewhere.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<(String, String), Record>>,
    schemas: SchemaRegistry,
}

impl MemoryRecordStore {
    pub fn new(schemas: SchemaRegistry) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            schemas,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, record_type: &str, id: &str) -> Result<Option<Record>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(record_type.to_string(), id.to_string()))
            .cloned())
    }

    async fn insert(&self, record: Record) -> Result<()> {
        self.schemas
            .get(&record.record_type)?
            .validate(&record.fields)?;

        let mut records = self.records.write().await;
        let key = (record.record_type.clone(), record.id.clone());
        if records.contains_key(&key) {
            return Err(Error::already_exists(record.record_type, record.id));
        }
        records.insert(key, record);
        Ok(())
    }

    async fn find_and_update_by_id(
        &self,
        record_type: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<Record>> {
        self.schemas.get(record_type)?.validate(&fields)?;

        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&(record_type.to_string(), id.to_string())) else {
            record_updated(record_type, false);
            return Ok(None);
        };
        record.apply(fields);
        record_updated(record_type, true);
        Ok(Some(record.clone()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::schema::{FieldKind, RecordSchema},
        serde_json::json,
    };

    fn schemas() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                RecordSchema::new("blog_posts")
                    .field("title", FieldKind::String)
                    .field("imageAlt", FieldKind::String),
            )
            .with(RecordSchema::new("campaigns").field("name", FieldKind::String))
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn sqlite_store() -> SqliteRecordStore {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteRecordStore::init(&pool).await.unwrap();
        SqliteRecordStore::new(pool, schemas())
    }

    async fn exercise_store(store: &dyn RecordStore) {
        // Missing record
        assert!(store.get("blog_posts", "p1").await.unwrap().is_none());
        let none = store
            .find_and_update_by_id("blog_posts", "p1", obj(json!({"title": "x"})))
            .await
            .unwrap();
        assert!(none.is_none());

        // Insert + read back
        store
            .insert(Record::new("blog_posts", "p1", obj(json!({"title": "Hello"}))))
            .await
            .unwrap();
        let found = store.get("blog_posts", "p1").await.unwrap().unwrap();
        assert_eq!(found.fields["title"], "Hello");
        assert!(found.media_url().is_none());

        // Same id under a different type is a different record
        assert!(store.get("campaigns", "p1").await.unwrap().is_none());

        // Update merges and returns the post-update record
        let updated = store
            .find_and_update_by_id(
                "blog_posts",
                "p1",
                obj(json!({"mediaUrl": "https://res.example.com/a.webp", "imageAlt": "alt"})),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.media_url(), Some("https://res.example.com/a.webp"));
        assert_eq!(updated.fields["title"], "Hello");
        assert_eq!(updated.fields["imageAlt"], "alt");
        assert!(updated.updated_at >= found.updated_at);

        // And it is persisted
        let reread = store.get("blog_posts", "p1").await.unwrap().unwrap();
        assert_eq!(reread, updated);

        // Duplicate insert
        let err = store
            .insert(Record::new("blog_posts", "p1", Map::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));

        // Invalid patch leaves the record untouched
        let err = store
            .find_and_update_by_id("blog_posts", "p1", obj(json!({"mediaUrl": "nope"})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        let reread = store.get("blog_posts", "p1").await.unwrap().unwrap();
        assert_eq!(reread.media_url(), Some("https://res.example.com/a.webp"));

        // Unknown record type
        let err = store
            .find_and_update_by_id("authors", "p1", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownRecordType { .. }));
    }

    #[tokio::test]
    async fn test_sqlite_store() {
        let store = sqlite_store().await;
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryRecordStore::new(schemas());
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_corrupt_fields_are_reported() {
        let store = sqlite_store().await;
        sqlx::query(
            "INSERT INTO records (record_type, id, fields, created_at, updated_at) VALUES ('campaigns', 'c1', '[1,2]', 0, 0)",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.get("campaigns", "c1").await.unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
    }

    #[tokio::test]
    async fn test_migrations_create_table() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::run_migrations(&pool).await.unwrap();
        let store = SqliteRecordStore::new(pool, schemas());
        store
            .insert(Record::new("campaigns", "c1", obj(json!({"name": "Spring"}))))
            .await
            .unwrap();
        assert!(store.get("campaigns", "c1").await.unwrap().is_some());
    }
}
