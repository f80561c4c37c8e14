use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use numu_core::Applied;
use numu_core::ledger::{owner_view, renter_view};
use numu_remote::rows::{availability_patch, booking_row, booking_status_patch};
use numu_remote::{BOOKINGS, EQUIPMENT, RemoteError, Synced};
use numu_types::api::{BookingView, Claims, CreateBookingRequest, SyncedResponse};
use numu_types::models::{Booking, OwnerBookingView, Party};

use crate::error::{JsonBody, market_status};
use crate::state::{AppState, run_db};

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.days == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let owner_id = state
        .market
        .read()
        .await
        .equipment(req.equipment_id)
        .map(|eq| eq.owner_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    // Contact numbers are frozen into the booking at request time.
    let renter_id = claims.sub;
    let (renter_phone, owner_phone) = run_db(&state, move |db| {
        let phone = |id: Uuid| -> anyhow::Result<Option<String>> {
            Ok(db.get_user_by_id(&id.to_string())?.and_then(|u| u.phone))
        };
        Ok((phone(renter_id)?, phone(owner_id)?))
    })
    .await?;

    let renter = Party {
        id: claims.sub,
        name: claims.name,
        phone: renter_phone,
    };
    let applied = state
        .market
        .write()
        .await
        .request_booking(renter, owner_phone, req)
        .map_err(market_status)?;

    let mirrored = state.remote.insert(BOOKINGS, booking_row(&applied.value)).await;
    let synced = Synced::from_remote(renter_view(&applied.value), mirrored, "booking insert");
    state.dispatcher.deliver(applied.notices).await;

    Ok((StatusCode::CREATED, Json(synced.into_response())))
}

pub async fn renter_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(state.market.read().await.ledger().for_renter(claims.sub))
}

pub async fn owner_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(state.market.read().await.ledger().for_owner(claims.sub))
}

/// The projection matches whichever side of the booking the caller is on.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let market = state.market.read().await;
    let booking = market.ledger().get(id).ok_or(StatusCode::NOT_FOUND)?;

    let view = if booking.renter.id == claims.sub {
        BookingView::Renter(renter_view(booking))
    } else if booking.owner.id == claims.sub {
        BookingView::Owner(owner_view(booking))
    } else {
        return Err(StatusCode::FORBIDDEN);
    };
    Ok(Json(view))
}

pub async fn accept_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let applied = state
        .market
        .write()
        .await
        .accept_booking(claims.sub, id)
        .map_err(market_status)?;
    Ok(Json(respond(&state, applied, Some(false)).await))
}

pub async fn reject_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let applied = state
        .market
        .write()
        .await
        .reject_booking(claims.sub, id)
        .map_err(market_status)?;
    Ok(Json(respond(&state, applied, None).await))
}

pub async fn complete_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let applied = state
        .market
        .write()
        .await
        .complete_booking(claims.sub, id)
        .map_err(market_status)?;
    Ok(Json(respond(&state, applied, Some(true)).await))
}

/// Mirrors a status change (and the availability it implies), then pushes
/// the notices and the status event to both parties.
async fn respond(
    state: &AppState,
    applied: Applied<Booking>,
    availability: Option<bool>,
) -> SyncedResponse<OwnerBookingView> {
    let booking = applied.value;

    let mut mirrored: Result<(), RemoteError> = state
        .remote
        .update(BOOKINGS, &booking.id.to_string(), booking_status_patch(&booking))
        .await;
    if let (true, Some(available)) = (mirrored.is_ok(), availability) {
        mirrored = state
            .remote
            .update(
                EQUIPMENT,
                &booking.equipment.id.to_string(),
                availability_patch(available),
            )
            .await;
        if mirrored.is_err() {
            warn!("Booking {} mirrored without its equipment status", booking.id);
        }
    }

    state.dispatcher.deliver(applied.notices).await;
    state.dispatcher.booking_changed(&booking).await;

    Synced::from_remote(owner_view(&booking), mirrored, "booking status update").into_response()
}
