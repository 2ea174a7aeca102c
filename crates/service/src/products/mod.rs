//! Products: three-layer split (input coercion, repository, service), the
//! same shape the rest of the service crate uses.

pub mod input;
pub mod repo;
pub mod repository;
pub mod service;

pub use input::CreateProductInput;
pub use repository::ProductRepository;
pub use service::ProductService;
