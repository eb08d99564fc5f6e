use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid resource address: {0}")]
    InvalidAddress(String),

    #[error("unknown attribute '{attribute}' for resource type {resource_type}")]
    UnknownAttribute {
        resource_type: String,
        attribute: String,
    },
}
