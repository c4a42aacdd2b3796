//! Database Module
//!
//! Embedded SurrealDB storage. The document store is used through the
//! repository seam only; handlers never issue raw queries.

pub mod models;
pub mod repository;
pub mod seed;

use crate::utils::AppError;
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "roomboard";
const DATABASE: &str = "main";

/// Open the on-disk database under the given directory.
pub async fn connect(db_dir: &Path) -> Result<Surreal<Db>, AppError> {
    let path = db_dir.join("roomboard.db");
    let db = Surreal::new::<RocksDb>(path.as_path())
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

    tracing::info!(path = %path.display(), "Database connection established");
    Ok(db)
}

/// In-memory database for tests.
pub async fn connect_memory() -> Result<Surreal<Db>, AppError> {
    use surrealdb::engine::local::Mem;

    let db = Surreal::new::<Mem>(())
        .await
        .map_err(|e| AppError::database(format!("Failed to open memory database: {}", e)))?;
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;
    Ok(db)
}
