use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ModelError;

/// A catalog entry as returned to HTTP clients.
///
/// The identifier is the hex form of the document's ObjectId and travels under
/// `_id`, the key the document store itself uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub availability: bool,
}

/// On-disk shape of a product in the `products` collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub availability: bool,
}

/// A validated product that has not been persisted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub availability: bool,
}

pub const NAME_REQUIRED: &str = "Product name is required.";

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.is_empty() {
        return Err(ModelError::Validation(NAME_REQUIRED.into()));
    }
    Ok(())
}

pub fn parse_id(id: &str) -> Result<ObjectId, ModelError> {
    ObjectId::parse_str(id).map_err(|e| ModelError::InvalidId(format!("{id:?}: {e}")))
}

impl NewProduct {
    /// Document to insert; the store assigns the id.
    pub fn to_document(&self) -> ProductDocument {
        ProductDocument {
            id: None,
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
            image_urls: self.image_urls.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            availability: self.availability,
        }
    }

    pub fn into_product(self, id: ObjectId) -> Product {
        Product {
            id: id.to_hex(),
            name: self.name,
            price: self.price,
            description: self.description,
            image_urls: self.image_urls,
            category: self.category,
            brand: self.brand,
            availability: self.availability,
        }
    }
}

impl TryFrom<ProductDocument> for Product {
    type Error = ModelError;

    fn try_from(doc: ProductDocument) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .ok_or_else(|| ModelError::Db(format!("stored product {:?} has no _id", doc.name)))?;
        Ok(Product {
            id: id.to_hex(),
            name: doc.name,
            price: doc.price,
            description: doc.description,
            image_urls: doc.image_urls,
            category: doc.category,
            brand: doc.brand,
            availability: doc.availability,
        })
    }
}
