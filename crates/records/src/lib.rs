//! Persisted records that reference hosted media.
//!
//! A record is an application document addressed by `(record_type, id)`
//! whose fields are a JSON object. The media flows only ever patch an
//! existing record through [`RecordStore::find_and_update_by_id`]; creating
//! and reading records is left to the embedding application.

pub mod error;
pub mod schema;
pub mod store;
pub mod types;

pub use {
    error::{Error, Result},
    schema::{FieldKind, RecordSchema, SchemaRegistry},
    store::{MemoryRecordStore, RecordStore, SqliteRecordStore},
    types::{MEDIA_URL_FIELD, Record},
};

/// Run database migrations for the records crate.
///
/// Creates the `records` table and indexes. Call at application startup
/// before using [`SqliteRecordStore`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
