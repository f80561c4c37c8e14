use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use numu_core::catalog::CatalogFilter;
use numu_remote::rows::{availability_patch, equipment_row};
use numu_remote::{EQUIPMENT, Synced};
use numu_types::api::{AvailabilityRequest, Claims, CreateEquipmentRequest};
use numu_types::models::{EquipmentPatch, Party};

use crate::error::{JsonBody, market_status};
use crate::state::AppState;

pub async fn list_equipment(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> impl IntoResponse {
    Json(state.market.read().await.search(&filter))
}

pub async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let market = state.market.read().await;
    let eq = market.equipment(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(eq.clone()))
}

pub async fn create_equipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateEquipmentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if !claims.role.can_list_equipment() {
        return Err(StatusCode::FORBIDDEN);
    }

    let owner = Party {
        id: claims.sub,
        name: claims.name,
        phone: None,
    };
    let applied = state
        .market
        .write()
        .await
        .add_equipment(&owner, req)
        .map_err(market_status)?;

    let mirrored = state.remote.insert(EQUIPMENT, equipment_row(&applied.value)).await;
    let synced = Synced::from_remote(applied.value, mirrored, "equipment insert");
    state.dispatcher.deliver(applied.notices).await;

    Ok((StatusCode::CREATED, Json(synced.into_response())))
}

pub async fn update_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(patch): JsonBody<EquipmentPatch>,
) -> Result<impl IntoResponse, StatusCode> {
    let updated = state
        .market
        .write()
        .await
        .update_equipment(claims.sub, id, &patch)
        .map_err(market_status)?;

    let mirrored = state
        .remote
        .update(EQUIPMENT, &id.to_string(), equipment_row(&updated))
        .await;
    Ok(Json(
        Synced::from_remote(updated, mirrored, "equipment update").into_response(),
    ))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let removed = state
        .market
        .write()
        .await
        .remove_equipment(claims.sub, id)
        .map_err(market_status)?;

    let mirrored = state.remote.delete(EQUIPMENT, &id.to_string()).await;
    Ok(Json(
        Synced::from_remote(removed.id, mirrored, "equipment delete").into_response(),
    ))
}

pub async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<AvailabilityRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let updated = state
        .market
        .write()
        .await
        .set_availability(claims.sub, id, req.available)
        .map_err(market_status)?;

    let mirrored = state
        .remote
        .update(EQUIPMENT, &id.to_string(), availability_patch(req.available))
        .await;
    Ok(Json(
        Synced::from_remote(updated, mirrored, "availability update").into_response(),
    ))
}
