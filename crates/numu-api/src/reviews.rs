use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use numu_remote::rows::review_row;
use numu_remote::{EQUIPMENT, RemoteError, REVIEWS, Synced};
use numu_types::api::{Claims, RatingQuery};
use numu_types::models::{OwnerReview, RenterReview, Review, Side};

use crate::error::{JsonBody, market_status};
use crate::state::AppState;

pub async fn submit_renter_review(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<RenterReview>,
) -> Result<impl IntoResponse, StatusCode> {
    let (applied, rating) = {
        let mut market = state.market.write().await;
        let applied = market
            .submit_renter_review(claims.sub, booking_id, payload)
            .map_err(market_status)?;
        let rating = market
            .equipment(applied.value.equipment_id)
            .map(|eq| (eq.rating, eq.reviews_count));
        (applied, rating)
    };

    let mut mirrored = mirror_review(&state, &applied.value, Side::Renter).await;
    if let (true, Some((average, count))) = (mirrored.is_ok(), rating) {
        mirrored = state
            .remote
            .update(
                EQUIPMENT,
                &applied.value.equipment_id.to_string(),
                json!({ "rating": average, "reviews_count": count }),
            )
            .await;
    }
    state.dispatcher.deliver(applied.notices).await;

    Ok((
        StatusCode::CREATED,
        Json(Synced::from_remote(applied.value, mirrored, "review insert").into_response()),
    ))
}

pub async fn submit_owner_review(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<OwnerReview>,
) -> Result<impl IntoResponse, StatusCode> {
    let applied = state
        .market
        .write()
        .await
        .submit_owner_review(claims.sub, booking_id, payload)
        .map_err(market_status)?;

    let mirrored = mirror_review(&state, &applied.value, Side::Owner).await;
    state.dispatcher.deliver(applied.notices).await;

    Ok((
        StatusCode::CREATED,
        Json(Synced::from_remote(applied.value, mirrored, "review insert").into_response()),
    ))
}

async fn mirror_review(state: &AppState, review: &Review, side: Side) -> Result<(), RemoteError> {
    match review_row(review, side) {
        Some(row) => state.remote.insert(REVIEWS, row).await.map(|_| ()),
        None => Ok(()),
    }
}

/// Which sides have reviewed the booking; drives the caller's review prompt.
pub async fn review_state(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let review_state = state
        .market
        .read()
        .await
        .review_state(claims.sub, booking_id)
        .map_err(market_status)?;
    Ok(Json(review_state))
}

pub async fn equipment_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    Json(state.market.read().await.equipment_reviews(id))
}

pub async fn user_rating(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RatingQuery>,
) -> impl IntoResponse {
    Json(state.market.read().await.user_rating(user_id, query.role))
}
