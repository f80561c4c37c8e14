use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{OwnerBookingView, RenterBookingView, Role, Side};

// -- JWT Claims --

/// JWT claims shared across numu-api (REST middleware) and numu-gateway
/// (WebSocket authentication).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
    /// Access token issued by the hosted backend, when sign-in reached it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_token: Option<String>,
    pub exp: usize,
}

// -- Remote sync --

/// Whether a mutation reached the hosted backend or only the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Remote,
    LocalOnly,
}

#[derive(Debug, Serialize)]
pub struct SyncedResponse<T> {
    pub data: T,
    pub sync: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
    pub sync: SyncStatus,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub token: String,
    pub sync: SyncStatus,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    /// `None` when no remote session exists or the backend is unreachable.
    pub remote_user_id: Option<String>,
}

// -- Equipment --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEquipmentRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub city: String,
    pub location: Option<String>,
    pub day_rate: u64,
    /// Defaults to six day rates when omitted.
    pub week_rate: Option<u64>,
    pub image: Option<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AvailabilityRequest {
    pub available: bool,
}

// -- Bookings --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub equipment_id: Uuid,
    pub start_date: NaiveDate,
    pub days: u32,
    pub notes: Option<String>,
}

/// A booking shaped for whoever asked for it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "perspective", rename_all = "snake_case")]
pub enum BookingView {
    Renter(RenterBookingView),
    Owner(OwnerBookingView),
}

// -- Notifications --

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub updated: usize,
}

// -- Reviews --

/// Review progress on a booking for one of its parties. `side` is the
/// caller's side; `can_review` is false until the booking is committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewState {
    pub booking_id: Uuid,
    pub side: Side,
    pub can_review: bool,
    pub renter_reviewed: bool,
    pub owner_reviewed: bool,
}

// -- Ratings --

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub role: Side,
}
