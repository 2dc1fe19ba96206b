use crate::config::Config;
use crate::db::DbPool;
use crate::startup;
use tempfile::TempDir;

/// Fresh database in a temporary directory. Keep the `TempDir` alive for as
/// long as the pool is used.
pub fn setup_test_db() -> (DbPool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config::testing(dir.path());
    let pool = startup::prepare(&config).expect("Failed to prepare test database");
    (pool, dir)
}
