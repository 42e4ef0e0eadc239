pub mod comment_repo;
pub mod ownership_repo;
pub mod record_repo;
pub mod user_repo;
pub mod zone_repo;

use sqlx::SqlitePool;

pub type Db = SqlitePool;

pub async fn init_db(path: &std::path::Path) -> anyhow::Result<Db> {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = SqlitePool::connect(&url).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::Db;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Fresh in-memory database with the full schema applied. A single
    /// connection keeps every query on the same `:memory:` instance.
    pub async fn memory_db() -> Db {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }
}
