use std::collections::HashMap;

use models::product::validate_name;
use models::NewProduct;

use crate::errors::ServiceError;

/// Raw create request: every form field arrives as optional text, the image
/// URLs come from the upload step and never from the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateProductInput {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub availability: Option<String>,
    pub image_urls: Vec<String>,
}

impl CreateProductInput {
    pub fn from_form(mut fields: HashMap<String, String>, image_urls: Vec<String>) -> Self {
        Self {
            name: fields.remove("name"),
            price: fields.remove("price"),
            description: fields.remove("description"),
            category: fields.remove("category"),
            brand: fields.remove("brand"),
            availability: fields.remove("availability"),
            image_urls,
        }
    }

    /// The required name, or the validation error for a missing one.
    pub fn name(&self) -> Result<&str, ServiceError> {
        let name = self.name.as_deref().unwrap_or_default();
        validate_name(name)?;
        Ok(name)
    }

    /// Apply the text coercions and produce the product to persist.
    pub fn into_new_product(self) -> Result<NewProduct, ServiceError> {
        self.name()?;
        let price = coerce_price(self.price.as_deref())?;
        let availability = coerce_availability(self.availability.as_deref());
        Ok(NewProduct {
            name: self.name.unwrap_or_default(),
            price,
            description: self.description,
            image_urls: self.image_urls,
            category: self.category,
            brand: self.brand,
            availability,
        })
    }
}

/// Exactly `"true"` is true; any other text, or none, is false.
pub fn coerce_availability(raw: Option<&str>) -> bool {
    raw == Some("true")
}

/// Absent or blank text means no price. Anything else must be a finite number.
pub fn coerce_price(raw: Option<&str>) -> Result<Option<f64>, ServiceError> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ServiceError::Validation(format!("Invalid price {text:?}; expected a number."))),
    }
}
