//! Mapping between marketplace models and the hosted tables' row shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use numu_core::pricing::default_week_rate;
use numu_types::models::{Booking, Equipment, Review, Role, Side};

pub fn user_row(id: Uuid, email: &str, name: &str, role: Role, phone: Option<&str>) -> Value {
    json!({
        "id": id,
        "email": email,
        "name": name,
        "role": role.as_str(),
        "phone": phone,
    })
}

pub fn equipment_row(eq: &Equipment) -> Value {
    json!({
        "id": eq.id,
        "owner_id": eq.owner_id,
        "name": eq.name,
        "category": eq.category,
        "description": eq.description,
        "daily_price": eq.day_rate,
        "weekly_price": eq.week_rate,
        "location": eq.location,
        "city": eq.city,
        "status": if eq.available { "available" } else { "rented" },
        "image_emoji": eq.image,
        "rating": eq.rating,
        "reviews_count": eq.reviews_count,
        "specifications": eq.specifications,
        "created_at": eq.created_at,
    })
}

pub fn availability_patch(available: bool) -> Value {
    json!({ "status": if available { "available" } else { "rented" } })
}

pub fn booking_row(b: &Booking) -> Value {
    json!({
        "id": b.id,
        "equipment_id": b.equipment.id,
        "renter_id": b.renter.id,
        "owner_id": b.owner.id,
        "start_date": b.start_date,
        "end_date": b.end_date,
        "total_price": b.total_price,
        "status": b.status.as_str(),
        "notes": b.notes,
        "created_at": b.requested_at,
    })
}

pub fn booking_status_patch(b: &Booking) -> Value {
    json!({ "status": b.status.as_str() })
}

/// The hosted `reviews` table stores one row per reviewer, so each side of
/// a review maps to its own row.
pub fn review_row(review: &Review, side: Side) -> Option<Value> {
    let base = |reviewer: Uuid, reviewee: Uuid, rating: u8, comment: &str, condition: Value, again: bool| {
        json!({
            "booking_id": review.booking_id,
            "equipment_id": review.equipment_id,
            "reviewer_id": reviewer,
            "reviewee_id": reviewee,
            "reviewer_type": match side {
                Side::Renter => "renter",
                Side::Owner => "owner",
            },
            "rating": rating,
            "comment": comment,
            "equipment_condition": condition,
            "would_rent_again": again,
        })
    };

    match side {
        Side::Renter => review.renter_to_owner.as_ref().map(|p| {
            base(
                review.renter.id,
                review.owner.id,
                p.rating,
                &p.comment,
                json!(p.equipment_condition),
                p.would_rent_again,
            )
        }),
        Side::Owner => review.owner_to_renter.as_ref().map(|p| {
            base(
                review.owner.id,
                review.renter.id,
                p.rating,
                &p.comment,
                json!(p.return_condition),
                p.would_rent_again,
            )
        }),
    }
}

#[derive(Deserialize)]
struct EquipmentRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    category: String,
    #[serde(default)]
    description: String,
    daily_price: u64,
    weekly_price: Option<u64>,
    location: String,
    city: String,
    status: String,
    #[serde(default)]
    image_emoji: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    reviews_count: u32,
    #[serde(default)]
    specifications: Option<BTreeMap<String, String>>,
    created_at: DateTime<Utc>,
}

/// Builds a listing from a hosted `equipment` row. The table does not carry
/// the owner's display name, so the caller supplies it.
pub fn equipment_from_row(row: Value, owner_name: &str) -> Result<Equipment, serde_json::Error> {
    let r: EquipmentRow = serde_json::from_value(row)?;
    Ok(Equipment {
        id: r.id,
        name: r.name,
        description: r.description,
        category: r.category,
        city: r.city,
        location: r.location,
        day_rate: r.daily_price,
        week_rate: r.weekly_price.unwrap_or_else(|| default_week_rate(r.daily_price)),
        owner_id: r.owner_id,
        owner_name: owner_name.to_string(),
        rating: r.rating,
        reviews_count: r.reviews_count,
        available: r.status == "available",
        image: r.image_emoji,
        specifications: r.specifications.unwrap_or_default(),
        created_at: r.created_at,
    })
}
