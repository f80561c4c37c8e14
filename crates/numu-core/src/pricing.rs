use chrono::{Days, NaiveDate};

use crate::error::{MarketError, MarketResult};

pub const DAYS_PER_WEEK: u32 = 7;

/// Week rate used when an owner lists equipment without one: a week costs six days.
pub const DEFAULT_WEEK_MULTIPLIER: u64 = 6;

/// Total cost of renting for `days` days.
///
/// Whole weeks are billed at `week_rate`, the remaining days at `day_rate`.
/// Rates are whole currency units; nothing here rounds.
pub fn rental_price(day_rate: u64, week_rate: u64, days: u32) -> MarketResult<u64> {
    if days == 0 {
        return Err(MarketError::invalid("rental must last at least one day"));
    }

    let weeks = u64::from(days / DAYS_PER_WEEK);
    let rest = u64::from(days % DAYS_PER_WEEK);

    Ok(weeks
        .saturating_mul(week_rate)
        .saturating_add(rest.saturating_mul(day_rate)))
}

/// Last day of a rental that begins on `start`. The start day counts as day one.
pub fn rental_end_date(start: NaiveDate, days: u32) -> MarketResult<NaiveDate> {
    if days == 0 {
        return Err(MarketError::invalid("rental must last at least one day"));
    }

    start
        .checked_add_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| MarketError::invalid("rental end date out of range"))
}

pub fn default_week_rate(day_rate: u64) -> u64 {
    day_rate.saturating_mul(DEFAULT_WEEK_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rentals_bill_per_day() {
        assert_eq!(rental_price(100, 600, 1).unwrap(), 100);
        assert_eq!(rental_price(100, 600, 6).unwrap(), 600);
    }

    #[test]
    fn whole_weeks_use_week_rate_and_rest_use_day_rate() {
        assert_eq!(rental_price(100, 600, 7).unwrap(), 600);
        assert_eq!(rental_price(100, 600, 10).unwrap(), 900);
        assert_eq!(rental_price(800, 4500, 15).unwrap(), 2 * 4500 + 800);
    }

    #[test]
    fn formula_holds_across_durations() {
        for days in 1..=60u32 {
            let expected = u64::from(days / 7) * 600 + u64::from(days % 7) * 100;
            assert_eq!(rental_price(100, 600, days).unwrap(), expected, "days={}", days);
        }
    }

    #[test]
    fn zero_days_is_rejected() {
        assert!(matches!(
            rental_price(100, 600, 0),
            Err(MarketError::InvalidInput(_))
        ));
        assert!(rental_end_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 0).is_err());
    }

    #[test]
    fn inconsistent_rates_are_not_corrected() {
        // A week rate above seven day rates is accepted as given.
        assert_eq!(rental_price(100, 900, 7).unwrap(), 900);
    }

    #[test]
    fn end_date_includes_start_day() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        assert_eq!(rental_end_date(start, 1).unwrap(), start);
        assert_eq!(
            rental_end_date(start, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn default_week_rate_is_six_days() {
        assert_eq!(default_week_rate(800), 4800);
    }
}
