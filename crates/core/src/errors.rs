use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),
    #[error("cart is empty")]
    EmptyCart,
    #[error("invalid interaction `{0}` (expected view|purchase|cart_add)")]
    InvalidInteraction(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in command payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::UnknownProduct(_)) => "unknown_product",
            Self::Domain(DomainError::OutOfStock(_)) => "out_of_stock",
            Self::Domain(DomainError::EmptyCart) => "empty_cart",
            Self::Domain(DomainError::InvalidInteraction(_)) => "invalid_interaction",
            Self::Configuration(_) => "config_validation",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn test_domain_error_maps_to_stable_error_class() {
        let error = ApplicationError::from(DomainError::OutOfStock(ProductId(7)));

        assert_eq!(error.error_class(), "out_of_stock");
        assert_eq!(error.to_string(), "product 7 is out of stock");
    }

    #[test]
    fn test_domain_error_messages_name_the_product() {
        let error = DomainError::UnknownProduct(ProductId(42));
        assert_eq!(error.to_string(), "unknown product 42");
    }

    #[test]
    fn test_configuration_error_maps_to_config_validation_class() {
        let error = ApplicationError::Configuration("max_results must be positive".to_owned());

        assert_eq!(error.error_class(), "config_validation");
        assert_eq!(error.to_string(), "configuration failure: max_results must be positive");
    }
}
