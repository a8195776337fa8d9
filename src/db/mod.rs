mod graph_repo;

pub use graph_repo::GraphRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::store::StoreError;

/// Open (creating if needed) the database at `path` and run migrations.
///
/// Any failure here means there is no usable store.
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    let unavailable = |reason: String| StoreError::StorageUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_db_creates_tables() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("weddmate.db");

        let pool = init_db(&db_path).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        for kind in crate::store::EntityKind::ALL {
            assert!(
                table_names.contains(&kind.table_name()),
                "missing table {}",
                kind.table_name()
            );
        }
    }

    #[tokio::test]
    async fn test_init_db_enables_foreign_keys() {
        let temp_dir = tempdir().unwrap();
        let pool = init_db(&temp_dir.path().join("fk.db")).await.unwrap();

        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_init_db_unavailable_path() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = init_db(&blocker.join("weddmate.db")).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
