use thiserror::Error;

use super::status::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Order number {0} is already taken")]
    DuplicateOrderNumber(String),
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Only duplicate order numbers are transient enough to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::DuplicateOrderNumber(_))
    }
}
