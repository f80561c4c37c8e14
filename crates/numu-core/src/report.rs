use serde::Serialize;
use uuid::Uuid;

use numu_types::models::{BookingStatus, Side, UserRating};

use crate::catalog::Catalog;
use crate::ledger::Ledger;
use crate::reviews::ReviewBook;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentPerformance {
    pub equipment_id: Uuid,
    pub name: String,
    pub bookings: usize,
    pub revenue: u64,
}

/// Owner dashboard figures computed from the live ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerReport {
    pub total_bookings: usize,
    pub pending: usize,
    /// Confirmed and completed.
    pub confirmed: usize,
    pub cancelled: usize,
    pub revenue: u64,
    pub average_booking_value: f64,
    /// Percentage of all bookings that were confirmed.
    pub acceptance_rate: f64,
    pub available_equipment: usize,
    pub rating: UserRating,
    pub top_equipment: Vec<EquipmentPerformance>,
}

pub fn owner_report(
    catalog: &Catalog,
    ledger: &Ledger,
    reviews: &ReviewBook,
    owner_id: Uuid,
) -> OwnerReport {
    let mut total = 0;
    let mut pending = 0;
    let mut confirmed = 0;
    let mut cancelled = 0;
    let mut revenue: u64 = 0;

    for booking in ledger.owned_by(owner_id) {
        total += 1;
        match booking.status {
            BookingStatus::Pending => pending += 1,
            BookingStatus::Cancelled => cancelled += 1,
            BookingStatus::Confirmed | BookingStatus::Completed => {
                confirmed += 1;
                revenue = revenue.saturating_add(booking.total_price);
            }
        }
    }

    let listings = catalog.by_owner(owner_id);
    let available_equipment = listings.iter().filter(|eq| eq.available).count();

    let mut top_equipment: Vec<EquipmentPerformance> = listings
        .iter()
        .map(|eq| {
            let mut perf = EquipmentPerformance {
                equipment_id: eq.id,
                name: eq.name.clone(),
                bookings: 0,
                revenue: 0,
            };
            for b in ledger.owned_by(owner_id).filter(|b| b.equipment.id == eq.id) {
                perf.bookings += 1;
                if b.status.is_committed() {
                    perf.revenue = perf.revenue.saturating_add(b.total_price);
                }
            }
            perf
        })
        .collect();
    top_equipment.sort_by(|a, b| b.revenue.cmp(&a.revenue));

    OwnerReport {
        total_bookings: total,
        pending,
        confirmed,
        cancelled,
        revenue,
        average_booking_value: if confirmed > 0 {
            revenue as f64 / confirmed as f64
        } else {
            0.0
        },
        acceptance_rate: if total > 0 {
            confirmed as f64 / total as f64 * 100.0
        } else {
            0.0
        },
        available_equipment,
        rating: reviews.user_rating(owner_id, Side::Owner),
        top_equipment,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ledger::NewBooking;
    use crate::testing::{listing, party};

    #[test]
    fn empty_owner_has_zeroed_report() {
        let report = owner_report(&Catalog::new(), &Ledger::new(), &ReviewBook::new(), Uuid::new_v4());
        assert_eq!(report.total_bookings, 0);
        assert_eq!(report.average_booking_value, 0.0);
        assert_eq!(report.acceptance_rate, 0.0);
        assert!(report.top_equipment.is_empty());
    }

    #[test]
    fn counts_revenue_from_committed_bookings_only() {
        let owner = party("o");
        let renter = party("r");
        let cheap = listing(owner.id, "محراث", "ploughs", "حائل", 100);
        let pricey = listing(owner.id, "حصادة", "harvesters", "بريدة", 1000);

        let mut catalog = Catalog::new();
        catalog.add(cheap.clone());
        catalog.add(pricey.clone());
        catalog.set_availability(pricey.id, false).unwrap();

        let mut ledger = Ledger::new();
        let mut book = |eq: &numu_types::models::Equipment, days| {
            ledger
                .create(NewBooking {
                    equipment: eq.snapshot(),
                    owner: owner.clone(),
                    renter: renter.clone(),
                    day_rate: eq.day_rate,
                    week_rate: eq.week_rate,
                    start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                    days,
                    notes: None,
                })
                .unwrap()
                .id
        };
        let a = book(&cheap, 2);
        let b = book(&pricey, 1);
        let c = book(&cheap, 3);
        let _pending = book(&cheap, 1);

        ledger.accept(a, owner.id).unwrap();
        ledger.accept(b, owner.id).unwrap();
        ledger.complete(b, owner.id).unwrap();
        ledger.reject(c, owner.id).unwrap();

        let report = owner_report(&catalog, &ledger, &ReviewBook::new(), owner.id);
        assert_eq!(report.total_bookings, 4);
        assert_eq!(report.pending, 1);
        assert_eq!(report.confirmed, 2);
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.revenue, 200 + 1000);
        assert_eq!(report.average_booking_value, 600.0);
        assert_eq!(report.acceptance_rate, 50.0);
        assert_eq!(report.available_equipment, 1);
        assert_eq!(report.top_equipment[0].equipment_id, pricey.id);
        assert_eq!(report.top_equipment[1].bookings, 3);
        assert_eq!(report.top_equipment[1].revenue, 200);
    }
}
