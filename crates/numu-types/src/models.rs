use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Users --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Renter,
    EquipmentOwner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Renter => "renter",
            Self::EquipmentOwner => "equipment_owner",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may list equipment for rent.
    pub fn can_list_equipment(&self) -> bool {
        matches!(self, Self::EquipmentOwner | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "renter" => Ok(Self::Renter),
            "equipment_owner" => Ok(Self::EquipmentOwner),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// The side of a rental a user stands on. Ratings are always aggregated
/// for one side at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Renter,
    Owner,
}

/// Contact snapshot denormalized into bookings and reviews at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

// -- Equipment --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub city: String,
    pub location: String,
    pub day_rate: u64,
    pub week_rate: u64,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub rating: f64,
    pub reviews_count: u32,
    pub available: bool,
    pub image: String,
    pub specifications: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Equipment {
    pub fn snapshot(&self) -> EquipmentSnapshot {
        EquipmentSnapshot {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// Partial listing update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub location: Option<String>,
    pub day_rate: Option<u64>,
    pub week_rate: Option<u64>,
    pub image: Option<String>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub available: Option<bool>,
}

/// Display fields of a listing frozen into a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    pub id: Uuid,
    pub name: String,
    pub image: String,
}

// -- Bookings --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// pending -> confirmed -> completed, or pending -> cancelled.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
        )
    }

    /// Confirmed and completed bookings count as revenue.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rental transaction. One record per booking id; the renter-side and
/// owner-side shapes are projections of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub equipment: EquipmentSnapshot,
    pub owner: Party,
    pub renter: Party,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub total_price: u64,
    pub status: BookingStatus,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenterBookingView {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub equipment_image: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub renter_id: Uuid,
    pub renter_name: String,
    pub renter_phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub total_price: u64,
    pub status: BookingStatus,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerBookingView {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub equipment_image: String,
    pub renter_id: Uuid,
    pub renter_name: String,
    pub renter_phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub total_price: u64,
    pub status: BookingStatus,
    pub requested_at: DateTime<Utc>,
}

// -- Notifications --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Booking,
    Review,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

// -- Reviews --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// The renter's assessment of the owner and the equipment at pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenterReview {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub equipment_condition: Condition,
    pub would_rent_again: bool,
}

/// The owner's assessment of the renter and the equipment on return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerReview {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub return_condition: Condition,
    pub would_rent_again: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub renter: Party,
    pub owner: Party,
    pub created_at: DateTime<Utc>,
    pub renter_to_owner: Option<RenterReview>,
    pub owner_to_renter: Option<OwnerReview>,
}

/// Derived per-user rating summary; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserRating {
    pub count: usize,
    pub average: f64,
    pub positive_percentage: f64,
}
