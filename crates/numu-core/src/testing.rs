//! Builders shared by the unit tests.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use numu_types::models::{Equipment, Party};

use crate::pricing::default_week_rate;

pub fn party(name: &str) -> Party {
    Party {
        id: Uuid::new_v4(),
        name: name.to_string(),
        phone: Some("0500000000".to_string()),
    }
}

pub fn listing(owner_id: Uuid, name: &str, category: &str, city: &str, day_rate: u64) -> Equipment {
    Equipment {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: String::new(),
        category: category.to_string(),
        city: city.to_string(),
        location: city.to_string(),
        day_rate,
        week_rate: default_week_rate(day_rate),
        owner_id,
        owner_name: "مالك المعدة".to_string(),
        rating: 0.0,
        reviews_count: 0,
        available: true,
        image: "🚜".to_string(),
        specifications: BTreeMap::new(),
        created_at: Utc::now(),
    }
}
