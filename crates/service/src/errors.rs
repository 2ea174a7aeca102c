use thiserror::Error;

use models::errors::ModelError;

pub const DUPLICATE_NAME: &str = "A product with this name already exists.";

/// Coarse classification shared by every caller that needs to turn a
/// `ServiceError` into a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("unsupported image format {format:?} for file {filename:?}; allowed: {allowed}")]
    UnsupportedFormat { filename: String, format: String, allowed: String },
    #[error("too many files; at most {max} images per request")]
    TooManyFiles { max: usize },
    #[error("unexpected file field {0:?}")]
    UnexpectedField(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("image store error: {0}")]
    ImageStore(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn duplicate_name() -> Self { Self::Conflict(DUPLICATE_NAME.into()) }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) | ServiceError::Model(ModelError::Validation(_)) => ErrorKind::Validation,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            // A refused file is an upload failure, same class as the image host refusing it.
            ServiceError::UnsupportedFormat { .. }
            | ServiceError::TooManyFiles { .. }
            | ServiceError::UnexpectedField(_)
            | ServiceError::Db(_)
            | ServiceError::ImageStore(_)
            | ServiceError::Model(ModelError::InvalidId(_))
            | ServiceError::Model(ModelError::Db(_)) => ErrorKind::Infrastructure,
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self { ServiceError::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_error_taxonomy() {
        assert_eq!(ServiceError::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(ServiceError::TooManyFiles { max: 10 }.kind(), ErrorKind::Infrastructure);
        assert_eq!(ServiceError::UnexpectedField("photo".into()).kind(), ErrorKind::Infrastructure);
        let bad_format = ServiceError::UnsupportedFormat { filename: "a.txt".into(), format: "txt".into(), allowed: "jpg,png,jpeg".into() };
        assert_eq!(bad_format.kind(), ErrorKind::Infrastructure);
        assert_eq!(ServiceError::duplicate_name().kind(), ErrorKind::Conflict);
        assert_eq!(ServiceError::Db("down".into()).kind(), ErrorKind::Infrastructure);
        assert_eq!(ServiceError::ImageStore("down".into()).kind(), ErrorKind::Infrastructure);
        assert_eq!(ServiceError::from(ModelError::InvalidId("x".into())).kind(), ErrorKind::Infrastructure);
        assert_eq!(ServiceError::from(ModelError::Validation("x".into())).kind(), ErrorKind::Validation);
    }

    #[test]
    fn conflict_message_is_user_facing() {
        assert_eq!(ServiceError::duplicate_name().to_string(), DUPLICATE_NAME);
    }
}
