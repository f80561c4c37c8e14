use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use numu_types::models::{
    Booking, BookingStatus, EquipmentSnapshot, OwnerBookingView, Party, RenterBookingView,
};

use crate::error::{MarketError, MarketResult};
use crate::pricing::{rental_end_date, rental_price};

/// Everything needed to open a booking. Snapshots are copied in as-is.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub equipment: EquipmentSnapshot,
    pub owner: Party,
    pub renter: Party,
    pub day_rate: u64,
    pub week_rate: u64,
    pub start_date: NaiveDate,
    pub days: u32,
    pub notes: Option<String>,
}

/// Booking records keyed by id, newest first. Each record is the single
/// source of truth for both the renter's and the owner's view of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    bookings: Vec<Booking>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn create(&mut self, new: NewBooking) -> MarketResult<&Booking> {
        let total_price = rental_price(new.day_rate, new.week_rate, new.days)?;
        let end_date = rental_end_date(new.start_date, new.days)?;

        let booking = Booking {
            id: Uuid::new_v4(),
            equipment: new.equipment,
            owner: new.owner,
            renter: new.renter,
            start_date: new.start_date,
            end_date,
            days: new.days,
            total_price,
            status: BookingStatus::Pending,
            requested_at: Utc::now(),
            responded_at: None,
            notes: new.notes.filter(|n| !n.trim().is_empty()),
        };

        self.bookings.insert(0, booking);
        Ok(&self.bookings[0])
    }

    pub fn get(&self, id: Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn renter_view(&self, id: Uuid) -> Option<RenterBookingView> {
        self.get(id).map(renter_view)
    }

    pub fn owner_view(&self, id: Uuid) -> Option<OwnerBookingView> {
        self.get(id).map(owner_view)
    }

    pub fn for_renter(&self, renter_id: Uuid) -> Vec<RenterBookingView> {
        self.bookings
            .iter()
            .filter(|b| b.renter.id == renter_id)
            .map(renter_view)
            .collect()
    }

    pub fn for_owner(&self, owner_id: Uuid) -> Vec<OwnerBookingView> {
        self.owned_by(owner_id).map(owner_view).collect()
    }

    pub fn owned_by(&self, owner_id: Uuid) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(move |b| b.owner.id == owner_id)
    }

    /// Whether a booking other than `except` holds the equipment right now.
    pub fn has_other_confirmed(&self, equipment_id: Uuid, except: Uuid) -> bool {
        self.bookings.iter().any(|b| {
            b.id != except && b.equipment.id == equipment_id && b.status == BookingStatus::Confirmed
        })
    }

    pub fn accept(&mut self, id: Uuid, owner_id: Uuid) -> MarketResult<&Booking> {
        self.transition(id, owner_id, BookingStatus::Confirmed)
    }

    pub fn reject(&mut self, id: Uuid, owner_id: Uuid) -> MarketResult<&Booking> {
        self.transition(id, owner_id, BookingStatus::Cancelled)
    }

    /// The owner got the equipment back.
    pub fn complete(&mut self, id: Uuid, owner_id: Uuid) -> MarketResult<&Booking> {
        self.transition(id, owner_id, BookingStatus::Completed)
    }

    fn transition(
        &mut self,
        id: Uuid,
        owner_id: Uuid,
        next: BookingStatus,
    ) -> MarketResult<&Booking> {
        let booking = self
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(MarketError::NotFound { kind: "booking", id })?;

        if booking.owner.id != owner_id {
            return Err(MarketError::Forbidden {
                kind: "booking",
                id,
                user: owner_id,
            });
        }
        if !booking.status.can_transition_to(next) {
            return Err(MarketError::InvalidTransition {
                from: booking.status,
                to: next,
            });
        }

        // responded_at records the owner's answer to the request.
        if booking.status == BookingStatus::Pending {
            booking.responded_at = Some(Utc::now());
        }
        booking.status = next;
        Ok(booking)
    }
}

pub fn renter_view(b: &Booking) -> RenterBookingView {
    RenterBookingView {
        id: b.id,
        equipment_id: b.equipment.id,
        equipment_name: b.equipment.name.clone(),
        equipment_image: b.equipment.image.clone(),
        owner_id: b.owner.id,
        owner_name: b.owner.name.clone(),
        owner_phone: b.owner.phone.clone(),
        renter_id: b.renter.id,
        renter_name: b.renter.name.clone(),
        renter_phone: b.renter.phone.clone(),
        start_date: b.start_date,
        end_date: b.end_date,
        days: b.days,
        total_price: b.total_price,
        status: b.status,
        requested_at: b.requested_at,
        responded_at: b.responded_at,
        notes: b.notes.clone(),
    }
}

pub fn owner_view(b: &Booking) -> OwnerBookingView {
    OwnerBookingView {
        id: b.id,
        equipment_id: b.equipment.id,
        equipment_name: b.equipment.name.clone(),
        equipment_image: b.equipment.image.clone(),
        renter_id: b.renter.id,
        renter_name: b.renter.name.clone(),
        renter_phone: b.renter.phone.clone(),
        start_date: b.start_date,
        end_date: b.end_date,
        days: b.days,
        total_price: b.total_price,
        status: b.status,
        requested_at: b.requested_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::party;

    fn new_booking(owner: &Party, renter: &Party, days: u32) -> NewBooking {
        NewBooking {
            equipment: EquipmentSnapshot {
                id: Uuid::new_v4(),
                name: "محراث قلاب".into(),
                image: "🔧".into(),
            },
            owner: owner.clone(),
            renter: renter.clone(),
            day_rate: 100,
            week_rate: 600,
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            days,
            notes: Some("  ".into()),
        }
    }

    #[test]
    fn create_fills_dates_price_and_pending_status() {
        let owner = party("خالد");
        let renter = party("محمد");
        let mut ledger = Ledger::new();

        let booking = ledger.create(new_booking(&owner, &renter, 10)).unwrap().clone();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_price, 900);
        assert_eq!(booking.end_date, NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
        assert!(booking.notes.is_none());
        assert!(booking.responded_at.is_none());

        let renter_side = ledger.renter_view(booking.id).unwrap();
        let owner_side = ledger.owner_view(booking.id).unwrap();
        assert_eq!(renter_side.status, BookingStatus::Pending);
        assert_eq!(owner_side.status, BookingStatus::Pending);
        assert_eq!(renter_side.owner_phone, owner.phone);
        assert_eq!(owner_side.renter_name, "محمد");
    }

    #[test]
    fn zero_day_booking_is_rejected_without_insert() {
        let mut ledger = Ledger::new();
        let result = ledger.create(new_booking(&party("a"), &party("b"), 0));
        assert!(matches!(result, Err(MarketError::InvalidInput(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn accept_is_visible_in_both_views() {
        let owner = party("خالد");
        let mut ledger = Ledger::new();
        let id = ledger.create(new_booking(&owner, &party("r"), 2)).unwrap().id;

        let accepted = ledger.accept(id, owner.id).unwrap();
        assert_eq!(accepted.status, BookingStatus::Confirmed);
        assert!(accepted.responded_at.is_some());
        assert_eq!(ledger.renter_view(id).unwrap().status, BookingStatus::Confirmed);
        assert_eq!(ledger.owner_view(id).unwrap().status, BookingStatus::Confirmed);
    }

    #[test]
    fn terminal_states_refuse_further_transitions() {
        let owner = party("خالد");
        let mut ledger = Ledger::new();
        let id = ledger.create(new_booking(&owner, &party("r"), 2)).unwrap().id;

        ledger.reject(id, owner.id).unwrap();
        assert_eq!(
            ledger.accept(id, owner.id).unwrap_err(),
            MarketError::InvalidTransition {
                from: BookingStatus::Cancelled,
                to: BookingStatus::Confirmed,
            }
        );
        assert!(ledger.complete(id, owner.id).is_err());
    }

    #[test]
    fn second_racing_response_loses() {
        let owner = party("خالد");
        let mut ledger = Ledger::new();
        let id = ledger.create(new_booking(&owner, &party("r"), 2)).unwrap().id;

        ledger.accept(id, owner.id).unwrap();
        assert!(matches!(
            ledger.reject(id, owner.id),
            Err(MarketError::InvalidTransition { .. })
        ));
        assert_eq!(ledger.get(id).unwrap().status, BookingStatus::Confirmed);
    }

    #[test]
    fn complete_requires_confirmation_first() {
        let owner = party("خالد");
        let mut ledger = Ledger::new();
        let id = ledger.create(new_booking(&owner, &party("r"), 2)).unwrap().id;

        assert!(ledger.complete(id, owner.id).is_err());
        ledger.accept(id, owner.id).unwrap();
        assert_eq!(
            ledger.complete(id, owner.id).unwrap().status,
            BookingStatus::Completed
        );
    }

    #[test]
    fn completing_keeps_the_response_time() {
        let owner = party("خالد");
        let mut ledger = Ledger::new();
        let id = ledger.create(new_booking(&owner, &party("r"), 2)).unwrap().id;

        let responded = ledger.accept(id, owner.id).unwrap().responded_at;
        assert!(responded.is_some());
        let completed = ledger.complete(id, owner.id).unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert_eq!(completed.responded_at, responded);
        assert_eq!(ledger.renter_view(id).unwrap().responded_at, responded);
    }

    #[test]
    fn other_confirmed_bookings_are_found_per_equipment() {
        let owner = party("خالد");
        let renter = party("r");
        let mut ledger = Ledger::new();
        let first = ledger.create(new_booking(&owner, &renter, 2)).unwrap().clone();
        let mut same = new_booking(&owner, &renter, 3);
        same.equipment = first.equipment.clone();
        let second = ledger.create(same).unwrap().id;

        assert!(!ledger.has_other_confirmed(first.equipment.id, second));
        ledger.accept(first.id, owner.id).unwrap();
        assert!(ledger.has_other_confirmed(first.equipment.id, second));
        assert!(!ledger.has_other_confirmed(first.equipment.id, first.id));

        ledger.complete(first.id, owner.id).unwrap();
        assert!(!ledger.has_other_confirmed(first.equipment.id, second));
    }

    #[test]
    fn only_the_owner_may_respond() {
        let owner = party("خالد");
        let renter = party("r");
        let mut ledger = Ledger::new();
        let id = ledger.create(new_booking(&owner, &renter, 2)).unwrap().id;

        assert!(matches!(
            ledger.accept(id, renter.id),
            Err(MarketError::Forbidden { .. })
        ));
        assert!(matches!(
            ledger.accept(Uuid::new_v4(), owner.id),
            Err(MarketError::NotFound { .. })
        ));
    }

    #[test]
    fn perspective_listings_filter_by_party() {
        let owner = party("o");
        let other_owner = party("o2");
        let renter = party("r");
        let mut ledger = Ledger::new();
        let first = ledger.create(new_booking(&owner, &renter, 1)).unwrap().id;
        let second = ledger.create(new_booking(&other_owner, &renter, 1)).unwrap().id;

        let mine: Vec<Uuid> = ledger.for_renter(renter.id).iter().map(|v| v.id).collect();
        assert_eq!(mine, vec![second, first]);
        assert_eq!(ledger.for_owner(owner.id).len(), 1);
        assert!(ledger.for_owner(renter.id).is_empty());
    }
}
