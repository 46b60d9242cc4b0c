//! Postgres content store.
//!
//! Each content item is one row: the whole aggregate as JSONB plus a version
//! column used for the conditional update.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use super::store::{ContentStore, StoreError, Version};
use crate::common::ContentItemId;
use crate::domains::content::ContentItem;

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    /// Keyset-paged scan in id order, starting after `after`.
    pub async fn load_page(
        &self,
        after: Option<ContentItemId>,
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let rows: Vec<(sqlx::types::Json<ContentItem>,)> = sqlx::query_as(
            "SELECT record FROM content_items
             WHERE ($1::uuid IS NULL OR id > $1)
             ORDER BY id
             LIMIT $2",
        )
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(record,)| record.0).collect())
    }
}

fn to_db_version(version: Version) -> Result<i64, StoreError> {
    i64::try_from(version.value())
        .map_err(|_| StoreError::Backend(anyhow::anyhow!("version {} overflows bigint", version)))
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn load(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError> {
        let row: Option<(sqlx::types::Json<ContentItem>, i64)> =
            sqlx::query_as("SELECT record, version FROM content_items WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(record, version)| {
            let mut item = record.0;
            // The column is authoritative for the version token
            item.version = Version::new(version as u64);
            item
        }))
    }

    async fn compare_and_swap(
        &self,
        id: ContentItemId,
        expected: Version,
        record: &ContentItem,
    ) -> Result<Version, StoreError> {
        let next = expected.next();
        let mut stored = record.clone();
        stored.version = next;
        let payload = sqlx::types::Json(&stored);

        let rows_affected = if expected.is_none() {
            sqlx::query(
                "INSERT INTO content_items (id, version, record, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(id)
            .bind(to_db_version(next)?)
            .bind(payload)
            .bind(stored.created_at)
            .bind(stored.updated_at)
            .execute(&self.pool)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                "UPDATE content_items
                 SET record = $3, version = $4, updated_at = $5
                 WHERE id = $1 AND version = $2",
            )
            .bind(id)
            .bind(to_db_version(expected)?)
            .bind(payload)
            .bind(to_db_version(next)?)
            .bind(stored.updated_at)
            .execute(&self.pool)
            .await?
            .rows_affected()
        };

        if rows_affected == 0 {
            debug!(item_id = %id, expected = %expected, "conditional write matched no row");
            return Err(StoreError::Conflict);
        }

        Ok(next)
    }

    async fn exists(&self, id: ContentItemId) -> Result<bool, StoreError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM content_items WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
