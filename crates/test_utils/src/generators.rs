//! Property-Based Test Generators
//!
//! Proptest strategies for lodging data. Generated values always satisfy
//! the domain's construction rules (positive stays, non-negative amounts).

use chrono::{Duration, NaiveDate};
use core_kernel::{CustomerId, Money, Rate, RoomId, StayPeriod};
use domain_billing::{BillCategory, PaymentMethod};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::fixtures::{date, FIXTURE_CURRENCY};

/// First date generated stays may start on
pub fn season_start() -> NaiveDate {
    date(2024, 6, 1)
}

/// Strategy for check-in dates within a 60-day season
pub fn check_in_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..60).prop_map(|offset| season_start() + Duration::days(offset))
}

/// Strategy for stays of 1 to 14 nights within the season
pub fn stay_strategy() -> impl Strategy<Value = StayPeriod> {
    (check_in_strategy(), 1i64..15).prop_map(|(check_in, nights)| {
        StayPeriod::new(check_in, check_in + Duration::days(nights)).expect("nights are positive")
    })
}

/// Strategy for a list of booking attempts against a single room
pub fn booking_attempts_strategy(max: usize) -> impl Strategy<Value = Vec<StayPeriod>> {
    proptest::collection::vec(stay_strategy(), 1..=max)
}

/// Strategy for amounts in minor units (paise), 0.01 to 1,00,000.00
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

/// Strategy for positive amounts in the fixture currency
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, FIXTURE_CURRENCY))
}

/// Strategy for nightly rates in whole rupees
pub fn nightly_rate_strategy() -> impl Strategy<Value = Money> {
    (500i64..20_000).prop_map(|rupees| Money::new(Decimal::from(rupees), FIXTURE_CURRENCY))
}

/// Strategy for GST rates between 0% and 28% in steps of 0.5%
pub fn gst_rate_strategy() -> impl Strategy<Value = Rate> {
    (0i64..=56).prop_map(|halves| Rate::from_percentage(Decimal::new(halves * 5, 1)))
}

/// Strategy for splitting an amount in minor units into 1 to `max_parts` positive payments
///
/// `total_minor` should be at least `100 * max_parts`.
pub fn payment_split_strategy(total_minor: i64, max_parts: usize) -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(1i64..=100, 1..=max_parts).prop_map(move |weights| {
        let weight_sum: i64 = weights.iter().sum();
        let mut parts: Vec<i64> = weights
            .iter()
            .map(|w| (total_minor * w / weight_sum).max(1))
            .collect();
        let assigned: i64 = parts.iter().sum();
        if let Some(last) = parts.last_mut() {
            *last += total_minor - assigned;
        }
        parts.retain(|part| *part > 0);
        parts
    })
}

pub fn category_strategy() -> impl Strategy<Value = BillCategory> {
    prop_oneof![Just(BillCategory::Gst), Just(BillCategory::NonGst)]
}

pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Card),
        Just(PaymentMethod::Upi),
        Just(PaymentMethod::BankTransfer),
    ]
}

pub fn customer_id_strategy() -> impl Strategy<Value = CustomerId> {
    any::<[u8; 16]>().prop_map(|bytes| CustomerId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

pub fn room_id_strategy() -> impl Strategy<Value = RoomId> {
    any::<[u8; 16]>().prop_map(|bytes| RoomId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for room numbers such as `304`
pub fn room_number_strategy() -> impl Strategy<Value = String> {
    (1u32..10, 1u32..40).prop_map(|(floor, number)| format!("{}{:02}", floor, number))
}
