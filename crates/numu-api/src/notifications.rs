use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use numu_types::api::{Claims, MarkReadResponse, UnreadCountResponse};

use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(state.market.read().await.notifications(claims.sub).to_vec())
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(UnreadCountResponse {
        unread: state.market.read().await.unread_count(claims.sub),
    })
}

/// Unknown ids and already-read notifications report zero updates.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let changed = state
        .market
        .write()
        .await
        .mark_notification_read(claims.sub, id);
    Json(MarkReadResponse {
        updated: usize::from(changed),
    })
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(MarkReadResponse {
        updated: state.market.write().await.mark_all_read(claims.sub),
    })
}
