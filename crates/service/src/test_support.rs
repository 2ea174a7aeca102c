#![cfg(test)]
use configs::DatabaseConfig;

use crate::products::repo::MongoProductRepository;

/// Repository against a throwaway collection, or `None` when no database is configured.
pub async fn mongo_repo() -> Result<Option<MongoProductRepository>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(uri) = std::env::var("MONGO_URI") else {
        return Ok(None);
    };
    let cfg = DatabaseConfig {
        uri,
        database_name: std::env::var("MONGO_DB").unwrap_or_else(|_| "catalog_test".into()),
        collection: "products_test".into(),
    };
    Ok(Some(MongoProductRepository::connect(&cfg).await?))
}
