//! Service layer for the product catalog.
//! - `products`: business rules over a pluggable document store.
//! - `images`: upload policy and the pluggable image store client.
//! - `errors`: one error type with a kind used for HTTP status mapping.

pub mod errors;
pub mod images;
pub mod products;
#[cfg(test)]
pub mod test_support;
