use thiserror::Error;

/// Failure taxonomy for catalog operations.
///
/// Every variant is recoverable at the service boundary: the agent adapter
/// reports these to the caller as tagged results and never lets them escape
/// as a fault from a well-formed call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("category '{0}' was not found")]
    CategoryNotFound(String),
    #[error("product '{name}' was not found in category '{category}'")]
    ProductNotFound { category: String, name: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl CatalogError {
    /// Stable class label carried on tagged error payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::CategoryNotFound(_) | Self::ProductNotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Persistence(_) => "persistence",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CategoryNotFound(_) | Self::ProductNotFound { .. })
    }
}
