use std::sync::Arc;

use tracing::{info, instrument, warn};

use models::Product;

use crate::errors::ServiceError;
use crate::products::input::CreateProductInput;
use crate::products::repository::ProductRepository;

/// Catalog business rules, independent of the web framework and of the
/// concrete document store.
///
/// The name check and the insert are two separate store calls with nothing
/// holding them together, so two concurrent creates with the same name can
/// both succeed.
#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self { Self { repo } }

    /// Every product, in whatever order the store scans them.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let products = self.repo.list().await?;
        info!(count = products.len(), "listed products");
        Ok(products)
    }

    /// Create a product after checking that its name is present and unused.
    ///
    /// Images referenced by `input.image_urls` were stored before this call and
    /// stay stored when creation is rejected.
    #[instrument(skip(self, input), fields(name = input.name.as_deref().unwrap_or_default(), images = input.image_urls.len()))]
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, ServiceError> {
        let name = input.name()?;
        if self.repo.find_by_name(name).await?.is_some() {
            warn!(orphaned_images = input.image_urls.len(), "duplicate product name");
            return Err(ServiceError::duplicate_name());
        }
        let product = input.into_new_product()?;
        let created = self.repo.insert(product).await?;
        info!(id = %created.id, "product_created");
        Ok(created)
    }

    /// Delete by id without checking existence first.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let matched = self.repo.delete(id).await?;
        info!(matched, "product_delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::products::repository::memory::InMemoryProductRepository;
    use std::collections::HashSet;

    fn svc() -> (ProductService, Arc<InMemoryProductRepository>) {
        let repo = Arc::new(InMemoryProductRepository::new());
        (ProductService::new(repo.clone()), repo)
    }

    fn input(name: &str) -> CreateProductInput {
        CreateProductInput { name: Some(name.into()), ..Default::default() }
    }

    #[tokio::test]
    async fn create_returns_persisted_product_with_id() {
        let (svc, repo) = svc();
        let created = svc
            .create(CreateProductInput { price: Some("9.99".into()), ..input("Widget") })
            .await
            .unwrap();
        assert_eq!(created.name, "Widget");
        assert_eq!(created.price, Some(9.99));
        assert!(created.image_urls.is_empty());
        assert!(!created.availability);
        assert_eq!(created.id.len(), 24);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn availability_true_only_for_exact_text() {
        let (svc, _) = svc();
        let yes = svc
            .create(CreateProductInput { availability: Some("true".into()), ..input("A") })
            .await
            .unwrap();
        let no = svc
            .create(CreateProductInput { availability: Some("True".into()), ..input("B") })
            .await
            .unwrap();
        assert!(yes.availability);
        assert!(!no.availability);
    }

    #[tokio::test]
    async fn list_returns_exactly_the_created_products() {
        let (svc, _) = svc();
        let mut ids = HashSet::new();
        for i in 0..5 {
            ids.insert(svc.create(input(&format!("p{i}"))).await.unwrap().id);
        }
        let listed: HashSet<String> = svc.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn duplicate_name_conflicts_and_count_is_unchanged() {
        let (svc, repo) = svc();
        svc.create(input("Widget")).await.unwrap();
        let err = svc.create(input("Widget")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn missing_name_is_rejected_and_nothing_persisted() {
        let (svc, repo) = svc();
        let err = svc.create(CreateProductInput::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_price_is_rejected_and_nothing_persisted() {
        let (svc, repo) = svc();
        let err = svc
            .create(CreateProductInput { price: Some("cheap".into()), ..input("Widget") })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn delete_is_unconditional() {
        let (svc, repo) = svc();
        let created = svc.create(input("Widget")).await.unwrap();
        svc.delete(&created.id).await.unwrap();
        assert!(repo.is_empty().await);
        // Same outcome for an id that matches nothing.
        svc.delete(&created.id).await.unwrap();
    }

    #[tokio::test]
    async fn delete_with_malformed_id_is_infrastructure_error() {
        let (svc, _) = svc();
        let err = svc.delete("42").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
    }

    // Known gap: the lookup and the insert are not atomic. Two creates that both
    // pass the lookup before either inserts end up as two products with one name.
    #[tokio::test]
    async fn name_check_race_allows_duplicates() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let first = input("Widget").into_new_product().unwrap();
        let second = input("Widget").into_new_product().unwrap();
        assert!(repo.find_by_name("Widget").await.unwrap().is_none());
        assert!(repo.find_by_name("Widget").await.unwrap().is_none());
        repo.insert(first).await.unwrap();
        repo.insert(second).await.unwrap();
        let same_name = repo.list().await.unwrap().into_iter().filter(|p| p.name == "Widget").count();
        assert_eq!(same_name, 2);
    }
}
