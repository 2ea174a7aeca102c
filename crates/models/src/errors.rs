use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid product id: {0}")]
    InvalidId(String),
    #[error("database error: {0}")]
    Db(String),
}
