//! Persistent entities of the catalog and the document-store connection helper.

pub mod errors;
pub mod db;
pub mod product;

pub use product::{NewProduct, Product, ProductDocument};
