use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
};

use numu_gateway::connection;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, bookings, equipment, health, notifications, reports, reviews};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/equipment", get(equipment::list_equipment))
        .route("/equipment/{id}", get(equipment::get_equipment))
        .route("/equipment/{id}/reviews", get(reviews::equipment_reviews))
        .route("/users/{id}/rating", get(reviews::user_rating))
        .route("/gateway", get(ws_upgrade));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/equipment", post(equipment::create_equipment))
        .route(
            "/equipment/{id}",
            patch(equipment::update_equipment).delete(equipment::delete_equipment),
        )
        .route("/equipment/{id}/availability", put(equipment::set_availability))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/renter", get(bookings::renter_bookings))
        .route("/bookings/owner", get(bookings::owner_bookings))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route("/bookings/{id}/accept", post(bookings::accept_booking))
        .route("/bookings/{id}/reject", post(bookings::reject_booking))
        .route("/bookings/{id}/complete", post(bookings::complete_booking))
        .route("/bookings/{id}/reviews", get(reviews::review_state))
        .route("/bookings/{id}/reviews/renter", post(reviews::submit_renter_review))
        .route("/bookings/{id}/reviews/owner", post(reviews::submit_owner_review))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/owner/report", get(reports::owner_report))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// The socket authenticates with an Identify command after the upgrade.
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    let jwt_secret = state.jwt_secret.clone();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, dispatcher, jwt_secret))
}
