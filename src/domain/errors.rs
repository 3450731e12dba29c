use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Booking is already finalized; reset to book another ticket")]
    BookingFinalized,
}

impl DomainError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DomainError::InvalidInput(msg.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
