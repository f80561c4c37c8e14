use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use numu_types::api::Claims;

use crate::state::AppState;

pub async fn owner_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    if !claims.role.can_list_equipment() {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(Json(state.market.read().await.owner_report(claims.sub)))
}
