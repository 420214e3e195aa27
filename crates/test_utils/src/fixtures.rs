//! Pre-built Test Fixtures
//!
//! Ready-to-use dates, amounts, and identifiers for the lodging tests. The
//! values are fixed so expected totals can be written down by hand.

use chrono::NaiveDate;
use core_kernel::{Currency, CustomerId, Money, Rate, StayPeriod};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Currency every fixture amount is expressed in
pub const FIXTURE_CURRENCY: Currency = Currency::INR;

/// Shorthand for an INR amount
pub fn inr(amount: Decimal) -> Money {
    Money::new(amount, FIXTURE_CURRENCY)
}

/// Shorthand for a calendar date
///
/// # Panics
///
/// Panics on an invalid date
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Fixture for money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Default nightly rate of the deluxe room type
    pub fn deluxe_rate() -> Money {
        inr(dec!(1000))
    }

    /// Default nightly rate of the suite room type
    pub fn suite_rate() -> Money {
        inr(dec!(2500))
    }

    /// A minibar charge
    pub fn minibar() -> Money {
        inr(dec!(350.50))
    }

    pub fn zero() -> Money {
        Money::zero(FIXTURE_CURRENCY)
    }

    /// An amount in a currency the fixtures do not bill in
    pub fn usd_100() -> Money {
        Money::new(dec!(100), Currency::USD)
    }
}

/// Fixture for tax rates
pub struct RateFixtures;

impl RateFixtures {
    /// Standard GST slab for room tariffs
    pub fn gst_standard() -> Rate {
        Rate::from_percentage(dec!(18))
    }

    /// Reduced GST slab
    pub fn gst_reduced() -> Rate {
        Rate::from_percentage(dec!(12))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The date fixed clocks start on
    pub fn today() -> NaiveDate {
        date(2024, 4, 1)
    }

    /// A three-night stay starting a week after `today`
    pub fn three_night_stay() -> StayPeriod {
        StayPeriod::new(date(2024, 4, 8), date(2024, 4, 11)).expect("valid fixture stay")
    }

    /// A stay that starts on the day `three_night_stay` ends
    pub fn back_to_back_stay() -> StayPeriod {
        StayPeriod::new(date(2024, 4, 11), date(2024, 4, 13)).expect("valid fixture stay")
    }

    /// A stay sharing its first night with the last night of `three_night_stay`
    pub fn overlapping_stay() -> StayPeriod {
        StayPeriod::new(date(2024, 4, 10), date(2024, 4, 12)).expect("valid fixture stay")
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A deterministic customer ID
    pub fn customer_id() -> CustomerId {
        CustomerId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440001))
    }

    /// A second customer, distinct from `customer_id`
    pub fn other_customer_id() -> CustomerId {
        CustomerId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440002))
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn deluxe() -> &'static str {
        "Deluxe"
    }

    pub fn suite() -> &'static str {
        "Suite"
    }

    pub fn gst_prefix() -> &'static str {
        "GST"
    }

    pub fn non_gst_prefix() -> &'static str {
        "INV"
    }
}
