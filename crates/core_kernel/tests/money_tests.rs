//! Unit tests for the Money module
//!
//! Tests cover money creation, checked arithmetic, rate application,
//! currency handling, and edge cases relevant to bills and payments.

use core_kernel::{Money, Currency, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::INR);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_handles_jpy_no_decimals() {
        let m = Money::from_minor(10000, Currency::JPY);
        assert_eq!(m.amount(), dec!(10000));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::INR);
        assert!(m.is_zero());
        assert!(!m.is_positive());
        assert!(!m.is_negative());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_and_sub() {
        let a = Money::new(dec!(600.00), Currency::INR);
        let b = Money::new(dec!(400.00), Currency::INR);

        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(1000.00));
        assert_eq!(b.checked_sub(&a).unwrap().amount(), dec!(-200.00));
    }

    #[test]
    fn test_sum_of_empty_sequence_is_zero() {
        let total = Money::sum(Currency::INR, &[]).unwrap();
        assert!(total.is_zero());
        assert_eq!(total.currency(), Currency::INR);
    }

    #[test]
    fn test_sum_rejects_mixed_currencies() {
        let amounts = vec![
            Money::new(dec!(10), Currency::INR),
            Money::new(dec!(10), Currency::USD),
        ];

        let result = Money::sum(Currency::INR, &amounts);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_covers_is_inclusive() {
        let paid = Money::new(dec!(1000.00), Currency::INR);
        let total = Money::new(dec!(1000.00), Currency::INR);

        assert!(paid.covers(&total).unwrap());
        assert!(!Money::new(dec!(999.99), Currency::INR).covers(&total).unwrap());
    }

    #[test]
    fn test_multiply_by_nights() {
        let rate = Money::new(dec!(1500.00), Currency::INR);
        assert_eq!(rate.multiply(Decimal::from(3)).amount(), dec!(4500.00));
    }
}

mod rates {
    use super::*;

    #[test]
    fn test_rate_from_percentage() {
        let gst = Rate::from_percentage(dec!(18));
        assert_eq!(gst.as_decimal(), dec!(0.18));
        assert_eq!(gst.to_string(), "18%");
    }

    #[test]
    fn test_zero_rate_yields_zero_tax() {
        let tax = Rate::zero().apply(&Money::new(dec!(4500.00), Currency::INR));
        assert!(tax.is_zero());
    }

    #[test]
    fn test_rate_rounds_half_away_from_zero() {
        let rate = Rate::from_percentage(dec!(5));
        let tax = rate.apply(&Money::new(dec!(0.10), Currency::INR));
        assert_eq!(tax.amount(), dec!(0.01));
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_uses_symbol_and_minor_units() {
        let m = Money::new(dec!(1500), Currency::INR);
        assert_eq!(m.to_string(), "₹ 1500.00");
    }

    #[test]
    fn test_serde_currency_is_uppercase() {
        let json = serde_json::to_string(&Currency::INR).unwrap();
        assert_eq!(json, "\"INR\"");
    }
}
