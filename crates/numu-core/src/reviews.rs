use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use numu_types::models::{Booking, OwnerReview, Party, RenterReview, Review, Side, UserRating};

use crate::error::{MarketError, MarketResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Booking facts copied into a review when it is first created.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub booking_id: Uuid,
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub renter: Party,
    pub owner: Party,
}

impl From<&Booking> for ReviewContext {
    fn from(b: &Booking) -> Self {
        Self {
            booking_id: b.id,
            equipment_id: b.equipment.id,
            equipment_name: b.equipment.name.clone(),
            renter: b.renter.clone(),
            owner: b.owner.clone(),
        }
    }
}

/// At most one review per booking, with each side's payload set independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewBook {
    reviews: Vec<Review>,
}

impl ReviewBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn get(&self, booking_id: Uuid) -> Option<&Review> {
        self.reviews.iter().find(|r| r.booking_id == booking_id)
    }

    pub fn submit_renter_review(
        &mut self,
        ctx: ReviewContext,
        payload: RenterReview,
    ) -> MarketResult<&Review> {
        validate_rating(payload.rating)?;
        let review = self.upsert(ctx);
        review.renter_to_owner = Some(payload);
        Ok(review)
    }

    pub fn submit_owner_review(
        &mut self,
        ctx: ReviewContext,
        payload: OwnerReview,
    ) -> MarketResult<&Review> {
        validate_rating(payload.rating)?;
        let review = self.upsert(ctx);
        review.owner_to_renter = Some(payload);
        Ok(review)
    }

    fn upsert(&mut self, ctx: ReviewContext) -> &mut Review {
        let index = match self.reviews.iter().position(|r| r.booking_id == ctx.booking_id) {
            Some(index) => index,
            None => {
                self.reviews.insert(
                    0,
                    Review {
                        id: Uuid::new_v4(),
                        booking_id: ctx.booking_id,
                        equipment_id: ctx.equipment_id,
                        equipment_name: ctx.equipment_name,
                        renter: ctx.renter,
                        owner: ctx.owner,
                        created_at: Utc::now(),
                        renter_to_owner: None,
                        owner_to_renter: None,
                    },
                );
                0
            }
        };
        &mut self.reviews[index]
    }

    pub fn has_reviewed(&self, booking_id: Uuid, side: Side) -> bool {
        self.get(booking_id).is_some_and(|r| match side {
            Side::Renter => r.renter_to_owner.is_some(),
            Side::Owner => r.owner_to_renter.is_some(),
        })
    }

    /// Ratings `user_id` received while acting as `side`: an owner is rated by
    /// renters and a renter by owners.
    pub fn user_rating(&self, user_id: Uuid, side: Side) -> UserRating {
        let received: Vec<(u8, bool)> = match side {
            Side::Owner => self
                .reviews
                .iter()
                .filter(|r| r.owner.id == user_id)
                .filter_map(|r| r.renter_to_owner.as_ref())
                .map(|p| (p.rating, p.would_rent_again))
                .collect(),
            Side::Renter => self
                .reviews
                .iter()
                .filter(|r| r.renter.id == user_id)
                .filter_map(|r| r.owner_to_renter.as_ref())
                .map(|p| (p.rating, p.would_rent_again))
                .collect(),
        };
        summarize(&received)
    }

    /// Public reviews of a listing. Owner payloads rate the renter, not the
    /// equipment, so reviews without a renter payload are left out.
    pub fn equipment_reviews(&self, equipment_id: Uuid) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|r| r.equipment_id == equipment_id && r.renter_to_owner.is_some())
            .collect()
    }

    /// Mean renter rating and count for a listing.
    pub fn equipment_rating(&self, equipment_id: Uuid) -> (f64, u32) {
        let ratings: Vec<u8> = self
            .equipment_reviews(equipment_id)
            .iter()
            .filter_map(|r| r.renter_to_owner.as_ref().map(|p| p.rating))
            .collect();
        if ratings.is_empty() {
            return (0.0, 0);
        }
        let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
        let count = ratings.len() as u32;
        (f64::from(sum) / f64::from(count), count)
    }
}

fn validate_rating(rating: u8) -> MarketResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(MarketError::invalid(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        )))
    }
}

fn summarize(received: &[(u8, bool)]) -> UserRating {
    if received.is_empty() {
        return UserRating::default();
    }
    let count = received.len();
    let sum: u32 = received.iter().map(|&(r, _)| u32::from(r)).sum();
    let positive = received.iter().filter(|&&(_, again)| again).count();
    UserRating {
        count,
        average: f64::from(sum) / count as f64,
        positive_percentage: positive as f64 / count as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::party;
    use numu_types::models::Condition;

    fn context(owner: &Party, renter: &Party, equipment_id: Uuid) -> ReviewContext {
        ReviewContext {
            booking_id: Uuid::new_v4(),
            equipment_id,
            equipment_name: "جرار".into(),
            renter: renter.clone(),
            owner: owner.clone(),
        }
    }

    fn renter_payload(rating: u8, again: bool) -> RenterReview {
        RenterReview {
            rating,
            comment: "ممتاز".into(),
            equipment_condition: Condition::Good,
            would_rent_again: again,
        }
    }

    fn owner_payload(rating: u8, again: bool) -> OwnerReview {
        OwnerReview {
            rating,
            comment: String::new(),
            return_condition: Condition::Excellent,
            would_rent_again: again,
        }
    }

    #[test]
    fn resubmission_updates_own_side_only() {
        let owner = party("o");
        let renter = party("r");
        let ctx = context(&owner, &renter, Uuid::new_v4());
        let mut book = ReviewBook::new();

        book.submit_owner_review(ctx.clone(), owner_payload(4, true)).unwrap();
        book.submit_renter_review(ctx.clone(), renter_payload(2, false)).unwrap();
        book.submit_renter_review(ctx.clone(), renter_payload(5, true)).unwrap();

        assert_eq!(book.len(), 1);
        let review = book.get(ctx.booking_id).unwrap();
        assert_eq!(review.renter_to_owner.as_ref().unwrap().rating, 5);
        assert_eq!(review.owner_to_renter, Some(owner_payload(4, true)));
    }

    #[test]
    fn out_of_range_rating_is_rejected_without_creating_a_review() {
        let ctx = context(&party("o"), &party("r"), Uuid::new_v4());
        let mut book = ReviewBook::new();
        assert!(book.submit_renter_review(ctx.clone(), renter_payload(0, true)).is_err());
        assert!(book.submit_owner_review(ctx, owner_payload(6, true)).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn rating_without_reviews_is_zero() {
        let book = ReviewBook::new();
        let rating = book.user_rating(Uuid::new_v4(), Side::Owner);
        assert_eq!(rating.count, 0);
        assert_eq!(rating.average, 0.0);
        assert_eq!(rating.positive_percentage, 0.0);
    }

    #[test]
    fn owner_rating_comes_from_renter_payloads() {
        let owner = party("o");
        let renter = party("r");
        let equipment = Uuid::new_v4();
        let mut book = ReviewBook::new();

        book.submit_renter_review(context(&owner, &renter, equipment), renter_payload(5, true))
            .unwrap();
        book.submit_renter_review(context(&owner, &renter, equipment), renter_payload(4, false))
            .unwrap();
        // Rates the renter; must not count toward the owner.
        book.submit_owner_review(context(&owner, &renter, equipment), owner_payload(1, false))
            .unwrap();

        let owner_rating = book.user_rating(owner.id, Side::Owner);
        assert_eq!(owner_rating.count, 2);
        assert_eq!(owner_rating.average, 4.5);
        assert_eq!(owner_rating.positive_percentage, 50.0);

        let renter_rating = book.user_rating(renter.id, Side::Renter);
        assert_eq!(renter_rating.count, 1);
        assert_eq!(renter_rating.average, 1.0);
        assert_eq!(renter_rating.positive_percentage, 0.0);
    }

    #[test]
    fn equipment_reviews_hide_owner_only_reviews() {
        let owner = party("o");
        let renter = party("r");
        let equipment = Uuid::new_v4();
        let mut book = ReviewBook::new();
        let public = context(&owner, &renter, equipment);
        book.submit_renter_review(public.clone(), renter_payload(3, true)).unwrap();
        book.submit_owner_review(context(&owner, &renter, equipment), owner_payload(5, true))
            .unwrap();

        let reviews = book.equipment_reviews(equipment);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].booking_id, public.booking_id);
        assert_eq!(book.equipment_rating(equipment), (3.0, 1));
        assert_eq!(book.equipment_rating(Uuid::new_v4()), (0.0, 0));
    }

    #[test]
    fn has_reviewed_tracks_each_side() {
        let ctx = context(&party("o"), &party("r"), Uuid::new_v4());
        let mut book = ReviewBook::new();
        assert!(!book.has_reviewed(ctx.booking_id, Side::Renter));

        book.submit_renter_review(ctx.clone(), renter_payload(4, true)).unwrap();
        assert!(book.has_reviewed(ctx.booking_id, Side::Renter));
        assert!(!book.has_reviewed(ctx.booking_id, Side::Owner));
    }
}
