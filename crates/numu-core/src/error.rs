use thiserror::Error;
use uuid::Uuid;

use numu_types::models::BookingStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("user {user} may not act on {kind} {id}")]
    Forbidden {
        kind: &'static str,
        id: Uuid,
        user: Uuid,
    },

    #[error("booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("equipment {0} is not available")]
    Unavailable(Uuid),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl MarketError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
