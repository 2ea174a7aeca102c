use mongodb::{Client, Collection, Database};
use tracing::info;

use configs::DatabaseConfig;

use crate::product::ProductDocument;

/// Connect to MongoDB and resolve the database to use: the one named in the
/// connection string, or `database_name` when the string names none.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Database> {
    let client = Client::with_uri_str(&cfg.uri).await?;
    let db = client
        .default_database()
        .unwrap_or_else(|| client.database(&cfg.database_name));
    info!(database = %db.name(), "mongodb client ready");
    Ok(db)
}

pub fn products(db: &Database, cfg: &DatabaseConfig) -> Collection<ProductDocument> {
    db.collection::<ProductDocument>(&cfg.collection)
}
