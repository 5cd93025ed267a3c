use deadpool_sqlite::{Config, Pool, Runtime};
use toml::Value;

use crate::errors::RackyardError;

/// Idempotent schema batch, applied on every startup.
///
/// Role rows are intentionally not unique on name: every PUT on the roles
/// sub-resource inserts fresh rows. Association order lives in
/// `node_roles.position`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    environment_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    metadata TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (environment_id, name)
);

CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS node_roles (
    node_id INTEGER NOT NULL REFERENCES nodes (id) ON DELETE CASCADE,
    role_id INTEGER NOT NULL REFERENCES roles (id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    PRIMARY KEY (node_id, role_id)
);
";

pub fn init_pool(config: &Value) -> Pool {
    let path = config["sqlite"]["path"].as_str().expect("Missing sqlite path");

    Config::new(path)
        .create_pool(Runtime::Tokio1)
        .unwrap_or_else(|e| panic!("Could not create sqlite pool for {}.\n{}", path, e))
}

pub async fn run_migrations(pool: &Pool) -> Result<(), RackyardError> {
    let conn = pool
        .get()
        .await
        .map_err(|e| RackyardError::PoolError(e.to_string()))?;

    conn.interact(|conn| conn.execute_batch(SCHEMA))
        .await
        .map_err(|e| RackyardError::InternalServerError(e.to_string()))??;

    Ok(())
}
