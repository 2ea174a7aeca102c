use async_trait::async_trait;

use models::{NewProduct, Product};

use crate::errors::ServiceError;

/// Document-store operations the catalog needs: equality lookup, insertion,
/// full scan, and delete-by-id.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError>;
    async fn list(&self) -> Result<Vec<Product>, ServiceError>;
    async fn insert(&self, product: NewProduct) -> Result<Product, ServiceError>;
    /// Returns whether a document matched. Callers are free to ignore it.
    async fn delete(&self, id: &str) -> Result<bool, ServiceError>;
}

/// In-memory repository for tests and local runs without a database.
pub mod memory {
    use super::*;
    use models::product::parse_id;
    use mongodb::bson::oid::ObjectId;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryProductRepository {
        products: RwLock<Vec<Product>>,
    }

    impl InMemoryProductRepository {
        pub fn new() -> Self { Self::default() }

        pub async fn len(&self) -> usize { self.products.read().await.len() }

        pub async fn is_empty(&self) -> bool { self.len().await == 0 }
    }

    #[async_trait]
    impl ProductRepository for InMemoryProductRepository {
        async fn find_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
            let products = self.products.read().await;
            Ok(products.iter().find(|p| p.name == name).cloned())
        }

        async fn list(&self) -> Result<Vec<Product>, ServiceError> {
            Ok(self.products.read().await.clone())
        }

        async fn insert(&self, product: NewProduct) -> Result<Product, ServiceError> {
            let created = product.into_product(ObjectId::new());
            self.products.write().await.push(created.clone());
            Ok(created)
        }

        async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
            let oid = parse_id(id)?;
            let hex = oid.to_hex();
            let mut products = self.products.write().await;
            let before = products.len();
            products.retain(|p| p.id != hex);
            Ok(products.len() != before)
        }
    }
}
