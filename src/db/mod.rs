pub mod models;
pub mod store;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::state::DbPool;

pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../../migrations/001_initial.sql"),
)];

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Pragmas are per-connection, so every pooled connection gets them
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )
    });
    let pool = Pool::builder().max_size(8).build(manager)?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    // Create migrations tracking table
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pool(tmp: &tempfile::TempDir) -> DbPool {
        create_pool(&tmp.path().join("test.db")).unwrap()
    }

    #[test]
    fn create_pool_creates_db_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("sub/dir/test.db");
        let pool = create_pool(&db_path).unwrap();
        assert!(db_path.exists());
        // Verify we can get a connection
        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn every_connection_enforces_foreign_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = test_pool(&tmp);

        let first = pool.get().unwrap();
        let second = pool.get().unwrap();
        for conn in [&first, &second] {
            let enabled: bool = conn
                .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                .unwrap();
            assert!(enabled);
        }
    }

    #[test]
    fn migrations_run_successfully() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = test_pool(&tmp);
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as i64);

        let tables: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .filter_map(|r| r.ok())
                .collect()
        };
        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"posts".to_string()));
    }

    #[test]
    fn migrations_are_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = test_pool(&tmp);
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap(); // Should not error on second run

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as i64);
    }

    #[test]
    fn users_table_rejects_null_names() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = test_pool(&tmp);
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        let result = conn.execute(
            "INSERT INTO users (first_name, last_name) VALUES (?1, NULL)",
            params!["alice"],
        );
        assert!(result.is_err());
    }

    #[test]
    fn posts_default_created_at() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = test_pool(&tmp);
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO users (first_name, last_name) VALUES ('Ada', 'Lovelace')",
            [],
        )
        .unwrap();
        let user_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO posts (title, content, user_id) VALUES ('t', 'c', ?1)",
            params![user_id],
        )
        .unwrap();

        let created_at: chrono::DateTime<chrono::Utc> = conn
            .query_row("SELECT created_at FROM posts", [], |row| row.get(0))
            .unwrap();
        assert!((chrono::Utc::now() - created_at).num_seconds().abs() < 60);
    }

    #[test]
    fn foreign_keys_enforced() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = test_pool(&tmp);
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        // Inserting a post with a non-existent user_id should fail
        let result = conn.execute(
            "INSERT INTO posts (title, content, user_id) VALUES (?1, ?2, ?3)",
            params!["hello", "world", 9999],
        );
        assert!(result.is_err());
    }

    #[test]
    fn user_with_posts_cannot_be_deleted_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = test_pool(&tmp);
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO users (first_name, last_name) VALUES ('Ada', 'Lovelace')",
            [],
        )
        .unwrap();
        let user_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO posts (title, content, user_id) VALUES ('t', 'c', ?1)",
            params![user_id],
        )
        .unwrap();

        let result = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id]);
        assert!(result.is_err());
    }
}
