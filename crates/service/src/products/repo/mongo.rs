use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{bson::doc, Collection};
use tracing::debug;

use configs::DatabaseConfig;
use models::product::parse_id;
use models::{NewProduct, Product, ProductDocument};

use crate::errors::ServiceError;
use crate::products::repository::ProductRepository;

/// MongoDB-backed repository over the `products` collection.
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(collection: Collection<ProductDocument>) -> Self { Self { collection } }

    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = models::db::connect(cfg).await?;
        Ok(Self::new(models::db::products(&db, cfg)))
    }

    pub fn collection(&self) -> &Collection<ProductDocument> { &self.collection }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        let found = self.collection.find_one(doc! { "name": name }).await?;
        Ok(found.map(Product::try_from).transpose()?)
    }

    async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let cursor = self.collection.find(doc! {}).await?;
        let docs: Vec<ProductDocument> = cursor.try_collect().await?;
        debug!(count = docs.len(), "scanned products collection");
        docs.into_iter()
            .map(|d| Product::try_from(d).map_err(ServiceError::from))
            .collect()
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, ServiceError> {
        let res = self.collection.insert_one(product.to_document()).await?;
        let oid = res
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ServiceError::Db(format!("insert returned non-ObjectId _id {}", res.inserted_id)))?;
        Ok(product.into_product(oid))
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let oid = parse_id(id)?;
        let res = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(res.deleted_count > 0)
    }
}
