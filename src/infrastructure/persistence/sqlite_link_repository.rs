//! SQLite implementation of link repository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};

const LINK_COLUMNS: &str =
    "id, code, destination, created_at, expires_at, click_count, owner_identity, is_custom";

/// SQLite repository for link storage and retrieval.
///
/// Uniqueness of `code` is enforced by the table's `UNIQUE` constraint, so a
/// racing insert of the same code fails with [`AppError::DuplicateCode`].
pub struct SqliteLinkRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let id = sqlx::query(
            r#"
            INSERT INTO links (code, destination, created_at, expires_at, owner_identity, is_custom)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.destination)
        .bind(new_link.created_at)
        .bind(new_link.expires_at)
        .bind(&new_link.owner_identity)
        .bind(new_link.is_custom)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error(e, &new_link.code))?
        .last_insert_rowid();

        Ok(new_link.into_link(id))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM links WHERE code = ?1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(found)
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE code = ?1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn list_by_owner(&self, owner_identity: &str) -> Result<Vec<Link>, AppError> {
        let links = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE owner_identity = ?1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_identity)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
