use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use numu_types::api::{CreateBookingRequest, CreateEquipmentRequest, ReviewState};
use numu_types::models::{
    Booking, BookingStatus, Equipment, EquipmentPatch, Notification, OwnerReview, Party, RenterReview, Review,
    Side, UserRating,
};

use crate::catalog::{Catalog, CatalogFilter};
use crate::error::{MarketError, MarketResult};
use crate::ledger::{Ledger, NewBooking};
use crate::notifications::{Feeds, NotificationDraft};
use crate::pricing::default_week_rate;
use crate::report::{OwnerReport, owner_report};
use crate::reviews::{ReviewBook, ReviewContext};

/// A notification that was appended to `user_id`'s feed by a mutation.
#[derive(Debug, Clone)]
pub struct Notice {
    pub user_id: Uuid,
    pub notification: Notification,
}

/// Result of a mutation together with the notifications it produced, so the
/// caller can push them to connected clients.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

/// Serializable copy of the whole marketplace at one version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub version: u64,
    pub catalog: Catalog,
    pub ledger: Ledger,
    pub feeds: Feeds,
    pub reviews: ReviewBook,
}

/// The marketplace service object. Owns every store and coordinates the
/// effects one operation has on several of them. Every mutation bumps
/// `version`; persisting is left to the caller.
#[derive(Debug, Default)]
pub struct Marketplace {
    catalog: Catalog,
    ledger: Ledger,
    feeds: Feeds,
    reviews: ReviewBook,
    version: u64,
}

impl Marketplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(snapshot: MarketSnapshot) -> Self {
        info!(
            "Restored marketplace v{}: {} listings, {} bookings, {} reviews",
            snapshot.version,
            snapshot.catalog.len(),
            snapshot.ledger.len(),
            snapshot.reviews.len()
        );
        Self {
            catalog: snapshot.catalog,
            ledger: snapshot.ledger,
            feeds: snapshot.feeds,
            reviews: snapshot.reviews,
            version: snapshot.version,
        }
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            version: self.version,
            catalog: self.catalog.clone(),
            ledger: self.ledger.clone(),
            feeds: self.feeds.clone(),
            reviews: self.reviews.clone(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn reviews(&self) -> &ReviewBook {
        &self.reviews
    }

    fn notify(&mut self, notices: &mut Vec<Notice>, user_id: Uuid, draft: NotificationDraft) {
        let notification = self.feeds.push(user_id, draft);
        notices.push(Notice {
            user_id,
            notification,
        });
    }

    // -- Catalog --

    pub fn search(&self, filter: &CatalogFilter) -> Vec<Equipment> {
        self.catalog.filter(filter).into_iter().cloned().collect()
    }

    pub fn equipment(&self, id: Uuid) -> Option<&Equipment> {
        self.catalog.get(id)
    }

    pub fn add_equipment(
        &mut self,
        owner: &Party,
        req: CreateEquipmentRequest,
    ) -> MarketResult<Applied<Equipment>> {
        if req.name.trim().is_empty() {
            return Err(MarketError::invalid("equipment name is required"));
        }
        if req.day_rate == 0 {
            return Err(MarketError::invalid("day rate must be positive"));
        }
        if req.week_rate == Some(0) {
            return Err(MarketError::invalid("week rate must be positive"));
        }

        let listing = Equipment {
            id: Uuid::new_v4(),
            location: req.location.unwrap_or_else(|| req.city.clone()),
            week_rate: req.week_rate.unwrap_or_else(|| default_week_rate(req.day_rate)),
            name: req.name,
            description: req.description,
            category: req.category,
            city: req.city,
            day_rate: req.day_rate,
            owner_id: owner.id,
            owner_name: owner.name.clone(),
            rating: 0.0,
            reviews_count: 0,
            available: true,
            image: req.image.unwrap_or_else(|| "📦".to_string()),
            specifications: req.specifications,
            created_at: Utc::now(),
        };

        let mut notices = Vec::new();
        self.catalog.add(listing.clone());
        self.notify(
            &mut notices,
            owner.id,
            NotificationDraft::equipment_added(&listing.name),
        );
        self.bump();

        info!("{} listed equipment {} ({})", owner.id, listing.id, listing.name);
        Ok(Applied {
            value: listing,
            notices,
        })
    }

    /// Adds a listing that already has an identity (seed data, remote import).
    /// Returns `false` when a listing with that id exists.
    pub fn import_equipment(&mut self, listing: Equipment) -> bool {
        if self.catalog.contains(listing.id) {
            return false;
        }
        self.catalog.add(listing);
        self.bump();
        true
    }

    fn owned_listing(&self, owner_id: Uuid, id: Uuid) -> MarketResult<&Equipment> {
        let eq = self.catalog.get(id).ok_or(MarketError::NotFound {
            kind: "equipment",
            id,
        })?;
        if eq.owner_id != owner_id {
            return Err(MarketError::Forbidden {
                kind: "equipment",
                id,
                user: owner_id,
            });
        }
        Ok(eq)
    }

    pub fn update_equipment(
        &mut self,
        owner_id: Uuid,
        id: Uuid,
        patch: &EquipmentPatch,
    ) -> MarketResult<Equipment> {
        self.owned_listing(owner_id, id)?;
        if patch.day_rate == Some(0) || patch.week_rate == Some(0) {
            return Err(MarketError::invalid("rates must be positive"));
        }
        let updated = self.catalog.update(id, patch)?.clone();
        self.bump();
        Ok(updated)
    }

    pub fn set_availability(
        &mut self,
        owner_id: Uuid,
        id: Uuid,
        available: bool,
    ) -> MarketResult<Equipment> {
        self.owned_listing(owner_id, id)?;
        let updated = self.catalog.set_availability(id, available)?.clone();
        self.bump();
        Ok(updated)
    }

    /// Bookings keep their equipment snapshot after the listing is gone.
    pub fn remove_equipment(&mut self, owner_id: Uuid, id: Uuid) -> MarketResult<Equipment> {
        self.owned_listing(owner_id, id)?;
        let removed = self
            .catalog
            .remove(id)
            .ok_or(MarketError::NotFound { kind: "equipment", id })?;
        self.bump();
        Ok(removed)
    }

    // -- Bookings --

    /// Opens a pending booking for `renter`. `owner_phone` is the owner's
    /// contact number looked up by the caller, if known.
    pub fn request_booking(
        &mut self,
        renter: Party,
        owner_phone: Option<String>,
        req: CreateBookingRequest,
    ) -> MarketResult<Applied<Booking>> {
        let eq = self.catalog.get(req.equipment_id).ok_or(MarketError::NotFound {
            kind: "equipment",
            id: req.equipment_id,
        })?;
        if !eq.available {
            return Err(MarketError::Unavailable(eq.id));
        }
        if eq.owner_id == renter.id {
            return Err(MarketError::invalid("owners cannot book their own equipment"));
        }

        let new = NewBooking {
            equipment: eq.snapshot(),
            owner: Party {
                id: eq.owner_id,
                name: eq.owner_name.clone(),
                phone: owner_phone,
            },
            renter,
            day_rate: eq.day_rate,
            week_rate: eq.week_rate,
            start_date: req.start_date,
            days: req.days,
            notes: req.notes,
        };
        let booking = self.ledger.create(new)?.clone();

        let mut notices = Vec::new();
        self.notify(
            &mut notices,
            booking.renter.id,
            NotificationDraft::booking_sent(&booking.equipment.name),
        );
        self.notify(
            &mut notices,
            booking.owner.id,
            NotificationDraft::booking_received(&booking.renter.name, &booking.equipment.name),
        );
        self.bump();

        info!(
            "Booking {} requested by {} for {} ({} days, {})",
            booking.id, booking.renter.id, booking.equipment.id, booking.days, booking.total_price
        );
        Ok(Applied {
            value: booking,
            notices,
        })
    }

    /// Confirms a pending booking and takes the equipment off the market.
    /// Equipment rented out under another confirmed booking cannot be
    /// promised twice.
    pub fn accept_booking(&mut self, owner_id: Uuid, id: Uuid) -> MarketResult<Applied<Booking>> {
        if let Some(pending) = self
            .ledger
            .get(id)
            .filter(|b| b.owner.id == owner_id && b.status == BookingStatus::Pending)
        {
            let equipment_id = pending.equipment.id;
            if self.ledger.has_other_confirmed(equipment_id, id) {
                return Err(MarketError::Unavailable(equipment_id));
            }
        }
        let booking = self.ledger.accept(id, owner_id)?.clone();
        // The listing may have been removed since; the booking still stands.
        if self.catalog.set_availability(booking.equipment.id, false).is_err() {
            debug!("Accepted booking {} for a removed listing", id);
        }

        let mut notices = Vec::new();
        self.notify(
            &mut notices,
            booking.renter.id,
            NotificationDraft::booking_accepted(&booking.equipment.name),
        );
        self.notify(&mut notices, owner_id, NotificationDraft::accepted_by_owner(id));
        self.bump();

        info!("Booking {} confirmed by {}", id, owner_id);
        Ok(Applied {
            value: booking,
            notices,
        })
    }

    /// Cancels a pending booking. Availability is untouched since accepting
    /// is what takes equipment off the market.
    pub fn reject_booking(&mut self, owner_id: Uuid, id: Uuid) -> MarketResult<Applied<Booking>> {
        let booking = self.ledger.reject(id, owner_id)?.clone();

        let mut notices = Vec::new();
        self.notify(
            &mut notices,
            booking.renter.id,
            NotificationDraft::booking_rejected(&booking.equipment.name),
        );
        self.notify(&mut notices, owner_id, NotificationDraft::rejected_by_owner(id));
        self.bump();

        info!("Booking {} rejected by {}", id, owner_id);
        Ok(Applied {
            value: booking,
            notices,
        })
    }

    /// Marks a confirmed booking returned. The equipment goes back on the
    /// market unless another confirmed booking still holds it.
    pub fn complete_booking(
        &mut self,
        owner_id: Uuid,
        id: Uuid,
    ) -> MarketResult<Applied<Booking>> {
        let booking = self.ledger.complete(id, owner_id)?.clone();
        if self.ledger.has_other_confirmed(booking.equipment.id, id) {
            debug!("Equipment {} stays rented after booking {}", booking.equipment.id, id);
        } else if self.catalog.set_availability(booking.equipment.id, true).is_err() {
            debug!("Completed booking {} for a removed listing", id);
        }

        let mut notices = Vec::new();
        self.notify(
            &mut notices,
            booking.renter.id,
            NotificationDraft::booking_completed(&booking.equipment.name),
        );
        self.bump();

        info!("Booking {} completed", id);
        Ok(Applied {
            value: booking,
            notices,
        })
    }

    // -- Reviews --

    fn reviewable_booking(&self, booking_id: Uuid, user_id: Uuid, side: Side) -> MarketResult<&Booking> {
        let booking = self.ledger.get(booking_id).ok_or(MarketError::NotFound {
            kind: "booking",
            id: booking_id,
        })?;
        let party = match side {
            Side::Renter => &booking.renter,
            Side::Owner => &booking.owner,
        };
        if party.id != user_id {
            return Err(MarketError::Forbidden {
                kind: "booking",
                id: booking_id,
                user: user_id,
            });
        }
        if !booking.status.is_committed() {
            return Err(MarketError::invalid(format!(
                "a {} booking cannot be reviewed",
                booking.status
            )));
        }
        Ok(booking)
    }

    pub fn submit_renter_review(
        &mut self,
        renter_id: Uuid,
        booking_id: Uuid,
        payload: RenterReview,
    ) -> MarketResult<Applied<Review>> {
        let ctx = ReviewContext::from(self.reviewable_booking(booking_id, renter_id, Side::Renter)?);
        let rating = payload.rating;
        let review = self.reviews.submit_renter_review(ctx, payload)?.clone();

        let (average, count) = self.reviews.equipment_rating(review.equipment_id);
        if self
            .catalog
            .apply_rating(review.equipment_id, average, count)
            .is_err()
        {
            debug!("Review {} targets a removed listing", review.id);
        }

        let mut notices = Vec::new();
        self.notify(
            &mut notices,
            review.owner.id,
            NotificationDraft::review_received(&review.renter.name, rating, &review.equipment_name),
        );
        self.bump();

        Ok(Applied {
            value: review,
            notices,
        })
    }

    pub fn submit_owner_review(
        &mut self,
        owner_id: Uuid,
        booking_id: Uuid,
        payload: OwnerReview,
    ) -> MarketResult<Applied<Review>> {
        let ctx = ReviewContext::from(self.reviewable_booking(booking_id, owner_id, Side::Owner)?);
        let rating = payload.rating;
        let review = self.reviews.submit_owner_review(ctx, payload)?.clone();

        let mut notices = Vec::new();
        self.notify(
            &mut notices,
            review.renter.id,
            NotificationDraft::review_received(&review.owner.name, rating, &review.equipment_name),
        );
        self.bump();

        Ok(Applied {
            value: review,
            notices,
        })
    }

    /// Which sides have reviewed a booking, as seen by one of its parties.
    pub fn review_state(&self, user_id: Uuid, booking_id: Uuid) -> MarketResult<ReviewState> {
        let booking = self.ledger.get(booking_id).ok_or(MarketError::NotFound {
            kind: "booking",
            id: booking_id,
        })?;
        let side = if booking.renter.id == user_id {
            Side::Renter
        } else if booking.owner.id == user_id {
            Side::Owner
        } else {
            return Err(MarketError::Forbidden {
                kind: "booking",
                id: booking_id,
                user: user_id,
            });
        };
        Ok(ReviewState {
            booking_id,
            side,
            can_review: booking.status.is_committed(),
            renter_reviewed: self.reviews.has_reviewed(booking_id, Side::Renter),
            owner_reviewed: self.reviews.has_reviewed(booking_id, Side::Owner),
        })
    }

    pub fn user_rating(&self, user_id: Uuid, side: Side) -> UserRating {
        self.reviews.user_rating(user_id, side)
    }

    pub fn equipment_reviews(&self, equipment_id: Uuid) -> Vec<Review> {
        self.reviews
            .equipment_reviews(equipment_id)
            .into_iter()
            .cloned()
            .collect()
    }

    // -- Notifications --

    pub fn notifications(&self, user_id: Uuid) -> &[Notification] {
        self.feeds.list(user_id)
    }

    pub fn unread_count(&self, user_id: Uuid) -> usize {
        self.feeds.unread_count(user_id)
    }

    pub fn mark_notification_read(&mut self, user_id: Uuid, id: Uuid) -> bool {
        let changed = self.feeds.mark_read(user_id, id);
        if changed {
            self.bump();
        }
        changed
    }

    pub fn mark_all_read(&mut self, user_id: Uuid) -> usize {
        let changed = self.feeds.mark_all_read(user_id);
        if changed > 0 {
            self.bump();
        }
        changed
    }

    // -- Reports --

    pub fn owner_report(&self, owner_id: Uuid) -> OwnerReport {
        owner_report(&self.catalog, &self.ledger, &self.reviews, owner_id)
    }
}
