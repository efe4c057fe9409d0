//! PostgreSQL dedup ledger.

use crate::schema::publish_records;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use kizashi_core::PublishRecord;
use kizashi_error::{ConfigError, KizashiResult, StorageError, StorageErrorKind};
use kizashi_interface::DedupStore;
use tracing::{debug, info, instrument};

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Database row for the publish_records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = publish_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct PublishRecordRow {
    #[allow(dead_code)]
    id: i32,
    key: String,
    published_at: DateTime<Utc>,
    platform: String,
    post_id: String,
}

/// Insertable struct for the publish_records table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = publish_records)]
struct NewPublishRecordRow {
    key: String,
    published_at: DateTime<Utc>,
    platform: String,
    post_id: String,
}

impl From<PublishRecordRow> for PublishRecord {
    fn from(row: PublishRecordRow) -> Self {
        PublishRecord::new(row.key, row.published_at, row.platform, row.post_id)
    }
}

impl From<&PublishRecord> for NewPublishRecordRow {
    fn from(record: &PublishRecord) -> Self {
        Self {
            key: record.key().clone(),
            published_at: *record.published_at(),
            platform: record.platform().clone(),
            post_id: record.post_id().clone(),
        }
    }
}

/// Dedup ledger stored in the `publish_records` table.
///
/// Diesel is synchronous, so every query runs on the blocking pool with a
/// pooled connection. PostgreSQL serializes concurrent inserts.
#[derive(Debug, Clone)]
pub struct PostgresDedupStore {
    pool: PgPool,
}

impl PostgresDedupStore {
    /// Connect with a pool of `pool_size` connections and run pending
    /// migrations.
    ///
    /// Both `postgres://` and `postgresql://` URLs are accepted.
    ///
    /// # Errors
    ///
    /// Returns error if the pool cannot be built or migrations fail.
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, pool_size: u32) -> KizashiResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(|e| database_error(format!("Failed to create connection pool: {}", e)))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!(pool_size, "Connected to dedup database");
        Ok(store)
    }

    /// Connect using the `DATABASE_URL` environment variable.
    pub async fn from_env(pool_size: u32) -> KizashiResult<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::new("DATABASE_URL environment variable not set"))?;
        Self::connect(&url, pool_size).await
    }

    async fn run_migrations(&self) -> KizashiResult<()> {
        use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

        const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

        self.with_connection(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|_| ())
                .map_err(|e| database_error(format!("Migration failed: {}", e)))
        })
        .await
    }

    async fn with_connection<T, F>(&self, f: F) -> KizashiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| database_error(format!("Failed to get connection from pool: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| database_error(format!("Database task failed: {}", e)))?;
        Ok(result?)
    }
}

#[track_caller]
fn database_error(message: String) -> StorageError {
    StorageError::new(StorageErrorKind::Database(message))
}

#[async_trait]
impl DedupStore for PostgresDedupStore {
    async fn is_recently_published(&self, key: &str, window: Duration) -> KizashiResult<bool> {
        let key = key.to_string();
        let cutoff = Utc::now() - window;
        self.with_connection(move |conn| {
            let count: i64 = publish_records::table
                .filter(publish_records::key.eq(&key))
                .filter(publish_records::published_at.gt(cutoff))
                .count()
                .get_result(conn)?;
            Ok(count > 0)
        })
        .await
    }

    #[instrument(skip(self, record), fields(key = %record.key()))]
    async fn record_published(&self, record: PublishRecord) -> KizashiResult<()> {
        let row = NewPublishRecordRow::from(&record);
        self.with_connection(move |conn| {
            diesel::insert_into(publish_records::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        debug!("Publish recorded");
        Ok(())
    }

    async fn recent(&self, window: Duration) -> KizashiResult<Vec<PublishRecord>> {
        let cutoff = Utc::now() - window;
        self.with_connection(move |conn| {
            let rows = publish_records::table
                .filter(publish_records::published_at.gt(cutoff))
                .order(publish_records::published_at.asc())
                .select(PublishRecordRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(PublishRecord::from).collect())
        })
        .await
    }
}
