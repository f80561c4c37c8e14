use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let market = state.market.read().await;
    Json(json!({
        "status": "ok",
        "version": market.version(),
        "listings": market.catalog().len(),
        "bookings": market.ledger().len(),
    }))
}
