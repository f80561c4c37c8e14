use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use numu_core::MarketError;

/// `Json` body that refuses malformed or out-of-range input with 400,
/// matching the status of the handlers' own validation.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(StatusCode::BAD_REQUEST)
            }
        }
    }
}

pub fn market_status(err: MarketError) -> StatusCode {
    let status = match &err {
        MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
        MarketError::Forbidden { .. } => StatusCode::FORBIDDEN,
        MarketError::InvalidTransition { .. } | MarketError::Unavailable(_) => StatusCode::CONFLICT,
        MarketError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    debug!("Request refused with {}: {}", status, err);
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use numu_types::models::BookingStatus;
    use uuid::Uuid;

    #[test]
    fn conflicts_cover_transitions_and_availability() {
        assert_eq!(
            market_status(MarketError::InvalidTransition {
                from: BookingStatus::Cancelled,
                to: BookingStatus::Confirmed,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(market_status(MarketError::Unavailable(Uuid::nil())), StatusCode::CONFLICT);
        assert_eq!(
            market_status(MarketError::NotFound { kind: "booking", id: Uuid::nil() }),
            StatusCode::NOT_FOUND
        );
    }
}
