use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use numu_types::models::{Notification, NotificationKind};

pub const RENTER_DASHBOARD: &str = "/dashboard";
pub const OWNER_BOOKINGS: &str = "/owner?tab=bookings";

/// A notification before it gets an id and a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

impl NotificationDraft {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(link.to_string());
        self
    }

    pub fn booking_sent(equipment: &str) -> Self {
        Self::new(
            NotificationKind::Booking,
            "تم إرسال طلب الحجز",
            format!("تم إرسال طلب حجز \"{}\" بنجاح", equipment),
        )
        .with_link(RENTER_DASHBOARD)
    }

    pub fn booking_received(renter: &str, equipment: &str) -> Self {
        Self::new(
            NotificationKind::Booking,
            "طلب حجز جديد",
            format!("{} يريد حجز {}", renter, equipment),
        )
        .with_link(OWNER_BOOKINGS)
    }

    pub fn booking_accepted(equipment: &str) -> Self {
        Self::new(
            NotificationKind::Booking,
            "🎉 تم قبول طلبك!",
            format!(
                "تم قبول طلب حجز \"{}\". يمكنك الآن التواصل مع المالك.",
                equipment
            ),
        )
        .with_link(RENTER_DASHBOARD)
    }

    pub fn booking_rejected(equipment: &str) -> Self {
        Self::new(
            NotificationKind::Booking,
            "تم رفض الطلب",
            format!("للأسف تم رفض طلب حجز \"{}\".", equipment),
        )
        .with_link(RENTER_DASHBOARD)
    }

    pub fn booking_completed(equipment: &str) -> Self {
        Self::new(
            NotificationKind::Booking,
            "اكتمل الحجز",
            format!("تم إكمال حجز \"{}\" بنجاح.", equipment),
        )
        .with_link(RENTER_DASHBOARD)
    }

    pub fn accepted_by_owner(booking_id: Uuid) -> Self {
        Self::new(
            NotificationKind::System,
            "تم قبول الحجز",
            format!("تم قبول الحجز {} بنجاح", booking_id),
        )
    }

    pub fn rejected_by_owner(booking_id: Uuid) -> Self {
        Self::new(
            NotificationKind::System,
            "تم رفض الحجز",
            format!("تم رفض الحجز {}", booking_id),
        )
    }

    pub fn equipment_added(name: &str) -> Self {
        Self::new(
            NotificationKind::System,
            "تمت إضافة المعدة",
            format!("تم إضافة \"{}\" بنجاح", name),
        )
    }

    pub fn review_received(reviewer: &str, rating: u8, equipment: &str) -> Self {
        Self::new(
            NotificationKind::Review,
            "تقييم جديد",
            format!("{} أعطى تقييم {} نجوم على {}", reviewer, rating, equipment),
        )
    }
}

/// Per-user notification logs, newest first. Entries are never removed;
/// only the read flag changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feeds {
    feeds: HashMap<Uuid, Vec<Notification>>,
}

impl Feeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, user_id: Uuid, draft: NotificationDraft) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            is_read: false,
            created_at: Utc::now(),
            link: draft.link,
        };
        self.feeds
            .entry(user_id)
            .or_default()
            .insert(0, notification.clone());
        notification
    }

    pub fn list(&self, user_id: Uuid) -> &[Notification] {
        self.feeds.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns whether the notification was unread before the call.
    pub fn mark_read(&mut self, user_id: Uuid, id: Uuid) -> bool {
        let Some(n) = self
            .feeds
            .get_mut(&user_id)
            .and_then(|feed| feed.iter_mut().find(|n| n.id == id))
        else {
            return false;
        };
        let was_unread = !n.is_read;
        n.is_read = true;
        was_unread
    }

    /// Returns how many notifications flipped to read.
    pub fn mark_all_read(&mut self, user_id: Uuid) -> usize {
        let Some(feed) = self.feeds.get_mut(&user_id) else {
            return 0;
        };
        let mut changed = 0;
        for n in feed.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        changed
    }

    pub fn unread_count(&self, user_id: Uuid) -> usize {
        self.list(user_id).iter().filter(|n| !n.is_read).count()
    }
}
