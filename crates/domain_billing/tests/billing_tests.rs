//! Tests for domain_billing

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BillId, Currency, CustomerId, LineItemId, Money, PaymentId, Rate, ReservationId};

use domain_billing::{
    Bill, BillAmounts, BillCategory, BillDraft, BillStatus, BillType, BillingError, ExplicitAmounts,
    InvoiceCounter, InvoiceNumber, Payment, PaymentMethod, Reconciliation,
};

fn inr(amount: Decimal) -> Money {
    Money::new(amount, Currency::INR)
}

fn bill_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 5).unwrap()
}

fn gst_rate() -> Rate {
    Rate::from_percentage(dec!(18))
}

fn issue(draft: BillDraft) -> Result<Bill, BillingError> {
    Bill::issue(
        BillId::new_v7(),
        InvoiceNumber::new("GST", 1).to_string(),
        draft,
        gst_rate(),
        Currency::INR,
        LineItemId::new_v7,
        Utc::now(),
    )
}

// ============================================================================
// Bill Creation Tests
// ============================================================================

mod bill_creation_tests {
    use super::*;

    #[test]
    fn test_stay_bill_for_reservation() {
        let reservation_id = ReservationId::new_v7();
        let draft = BillDraft::new(CustomerId::new_v7(), BillCategory::Gst, bill_date())
            .with_reservation(reservation_id)
            .with_type(BillType::Room)
            .with_charge("Room 101: 3 night(s) @ ₹ 1000.00", inr(dec!(3000)));

        let bill = issue(draft).unwrap();

        assert_eq!(bill.invoice_number, "GST-0001");
        assert_eq!(bill.reservation_id, Some(reservation_id));
        assert_eq!(bill.bill_type, BillType::Room);
        assert_eq!(bill.amounts.tax.amount(), dec!(540));
        assert_eq!(bill.total().amount(), dec!(3540));
        assert_eq!(bill.tax_rate, Some(gst_rate()));
    }

    #[test]
    fn test_explicit_amounts_are_kept() {
        let draft = BillDraft::new(CustomerId::new_v7(), BillCategory::Gst, bill_date())
            .with_explicit_amounts(ExplicitAmounts {
                subtotal: inr(dec!(1000)),
                tax: inr(dec!(50)),
                discount: inr(dec!(100)),
            });

        let bill = issue(draft).unwrap();

        assert!(bill.line_items.is_empty());
        assert_eq!(bill.total().amount(), dec!(950));
        assert!(bill.tax_rate.is_none());
    }

    #[test]
    fn test_discount_larger_than_bill_rejected() {
        let draft = BillDraft::new(CustomerId::new_v7(), BillCategory::NonGst, bill_date())
            .with_charge("Tea", inr(dec!(40)))
            .with_discount(inr(dec!(100)));

        assert!(matches!(issue(draft), Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_negative_line_item_rejected() {
        let draft = BillDraft::new(CustomerId::new_v7(), BillCategory::NonGst, bill_date())
            .with_charge("Refund", inr(dec!(-10)));

        assert!(matches!(issue(draft), Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_foreign_currency_rejected() {
        let draft = BillDraft::new(CustomerId::new_v7(), BillCategory::NonGst, bill_date())
            .with_charge("Souvenir", Money::new(dec!(10), Currency::USD));

        assert!(matches!(issue(draft), Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_zero_amount_line_item_allowed() {
        let draft = BillDraft::new(CustomerId::new_v7(), BillCategory::NonGst, bill_date())
            .with_charge("Complimentary breakfast", Money::zero(Currency::INR));

        let bill = issue(draft).unwrap();
        assert!(bill.total().is_zero());
    }
}

// ============================================================================
// Bill Status Tests
// ============================================================================

mod bill_status_tests {
    use super::*;

    fn draft_bill() -> Bill {
        issue(
            BillDraft::new(CustomerId::new_v7(), BillCategory::NonGst, bill_date())
                .with_charge("Lunch", inr(dec!(450))),
        )
        .unwrap()
    }

    #[test]
    fn test_full_state_machine() {
        let mut bill = draft_bill();

        bill.finalize(Utc::now()).unwrap();
        assert_eq!(bill.status, BillStatus::Finalized);

        bill.mark_unpaid(Utc::now()).unwrap();
        assert_eq!(bill.status, BillStatus::Unpaid);

        assert!(bill.mark_paid(Utc::now()));
        assert!(!bill.mark_paid(Utc::now()));
        assert_eq!(bill.status, BillStatus::Paid);
    }

    #[test]
    fn test_finalize_from_paid_rejected() {
        let mut bill = draft_bill();
        bill.finalize(Utc::now()).unwrap();
        assert!(bill.mark_paid(Utc::now()));

        let err = bill.finalize(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            BillingError::InvalidTransition {
                action: "finalize",
                status: BillStatus::Paid
            }
        );
    }

    #[test]
    fn test_mark_unpaid_requires_finalized() {
        let mut bill = draft_bill();
        assert!(bill.mark_unpaid(Utc::now()).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_add_line_item_recomputes_gst() {
        let mut bill = issue(
            BillDraft::new(CustomerId::new_v7(), BillCategory::Gst, bill_date())
                .with_charge("Room", inr(dec!(1000))),
        )
        .unwrap();

        bill.add_line_item(LineItemId::new_v7(), "Laundry", inr(dec!(200)), Utc::now())
            .unwrap();

        assert_eq!(bill.amounts.subtotal.amount(), dec!(1200));
        assert_eq!(bill.amounts.tax.amount(), dec!(216));
        assert_eq!(bill.total().amount(), dec!(1416));
        assert_eq!(bill.line_items.last().map(|i| i.position), Some(1));
    }

    #[test]
    fn test_add_line_item_keeps_explicit_tax() {
        let mut bill = issue(
            BillDraft::new(CustomerId::new_v7(), BillCategory::Gst, bill_date()).with_explicit_amounts(
                ExplicitAmounts {
                    subtotal: inr(dec!(500)),
                    tax: inr(dec!(25)),
                    discount: Money::zero(Currency::INR),
                },
            ),
        )
        .unwrap();

        bill.add_line_item(LineItemId::new_v7(), "Minibar", inr(dec!(100)), Utc::now())
            .unwrap();

        assert_eq!(bill.amounts.tax.amount(), dec!(25));
        assert_eq!(bill.total().amount(), dec!(625));
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(BillCategory::NonGst.to_string(), "NON_GST");
        assert_eq!("GST".parse::<BillCategory>().unwrap(), BillCategory::Gst);
        assert_eq!("WALK_IN".parse::<BillType>().unwrap(), BillType::WalkIn);
        assert!("VOID".parse::<BillStatus>().is_err());
    }

    #[test]
    fn test_wire_names_match_column_codes() {
        for category in BillCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
        assert_eq!(serde_json::to_string(&BillStatus::Paid).unwrap(), "\"PAID\"");
    }
}

// ============================================================================
// Invoice Counter Tests
// ============================================================================

mod invoice_counter_tests {
    use super::*;

    #[test]
    fn test_categories_are_independent() {
        let mut gst = InvoiceCounter::new(BillCategory::Gst, "GST", Utc::now());
        let mut plain = InvoiceCounter::new(BillCategory::NonGst, "INV", Utc::now());

        assert_eq!(gst.allocate(Utc::now()).to_string(), "GST-0001");
        assert_eq!(gst.allocate(Utc::now()).to_string(), "GST-0002");
        assert_eq!(plain.allocate(Utc::now()).to_string(), "INV-0001");
    }

    #[test]
    fn test_restart_then_allocate() {
        let mut counter = InvoiceCounter::new(BillCategory::Gst, "GST", Utc::now());
        counter.restart_at(1001, Utc::now()).unwrap();

        assert_eq!(counter.allocate(Utc::now()).to_string(), "GST-1001");
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    fn payment(bill_id: BillId, amount: Decimal) -> Payment {
        Payment::record(
            PaymentId::new_v7(),
            bill_id,
            inr(amount),
            PaymentMethod::Card,
            bill_date(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_six_hundred_then_four_hundred() {
        let bill_id = BillId::new_v7();
        let total = inr(dec!(1000));
        let mut payments = vec![payment(bill_id, dec!(600))];

        assert!(!Reconciliation::compute(total, &payments).unwrap().is_settled());

        payments.push(payment(bill_id, dec!(400)));
        let reconciliation = Reconciliation::compute(total, &payments).unwrap();
        assert!(reconciliation.is_settled());
        assert_eq!(reconciliation.paid.amount(), dec!(1000));
    }

    #[test]
    fn test_negative_payment_rejected() {
        let result = Payment::record(
            PaymentId::new_v7(),
            BillId::new_v7(),
            inr(dec!(-5)),
            PaymentMethod::Cash,
            bill_date(),
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_amount_rounded_to_paise() {
        let payment = payment(BillId::new_v7(), dec!(10.0049));
        assert_eq!(payment.amount.amount(), dec!(10.00));
    }

    #[test]
    fn test_amount_below_one_paisa_rejected() {
        let result = Payment::record(
            PaymentId::new_v7(),
            BillId::new_v7(),
            inr(dec!(0.004)),
            PaymentMethod::Upi,
            bill_date(),
            Utc::now(),
        );
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_rounded_payments_settle_rounded_total() {
        let bill = issue(
            BillDraft::new(CustomerId::new_v7(), BillCategory::NonGst, bill_date())
                .with_charge("Laundry", inr(dec!(10.005))),
        )
        .unwrap();
        let payments = vec![payment(bill.id, dec!(5.0049)), payment(bill.id, dec!(5.005))];

        let reconciliation = Reconciliation::compute(bill.total(), &payments).unwrap();

        assert_eq!(bill.total().amount(), dec!(10.01));
        assert_eq!(reconciliation.paid.amount(), dec!(10.01));
        assert!(reconciliation.is_settled());
        assert!(reconciliation.overpaid_by.is_none());
    }

    #[test]
    fn test_reference_attached() {
        let payment = payment(BillId::new_v7(), dec!(10)).with_reference("UPI-88213");
        assert_eq!(payment.reference.as_deref(), Some("UPI-88213"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000).prop_map(|paise| Decimal::new(paise, 2))
    }

    proptest! {
        #[test]
        fn itemized_bills_satisfy_total_invariant(
            amounts in prop::collection::vec(amount_strategy(), 1..12),
            taxable in any::<bool>(),
        ) {
            let category = if taxable { BillCategory::Gst } else { BillCategory::NonGst };
            let draft = amounts.iter().enumerate().fold(
                BillDraft::new(CustomerId::new_v7(), category, bill_date()),
                |draft, (i, amount)| draft.with_charge(format!("Item {}", i + 1), inr(*amount)),
            );

            let bill = issue(draft).unwrap();
            let expected: Decimal = amounts.iter().sum();

            prop_assert_eq!(bill.amounts.subtotal.amount(), expected);
            prop_assert!(bill.amounts.is_consistent());
            prop_assert_eq!(bill.line_items.len(), amounts.len());
        }

        #[test]
        fn settlement_matches_sum(
            total in amount_strategy(),
            paid in prop::collection::vec(1i64..100_000, 0..8),
        ) {
            let bill_id = BillId::new_v7();
            let payments: Vec<Payment> = paid
                .iter()
                .map(|paise| {
                    Payment::record(
                        PaymentId::new_v7(),
                        bill_id,
                        inr(Decimal::new(*paise, 2)),
                        PaymentMethod::Cash,
                        bill_date(),
                        Utc::now(),
                    )
                    .unwrap()
                })
                .collect();

            let reconciliation = Reconciliation::compute(inr(total), &payments).unwrap();
            let sum: Decimal = paid.iter().map(|p| Decimal::new(*p, 2)).sum();

            prop_assert_eq!(reconciliation.is_settled(), sum >= total);
            prop_assert_eq!(reconciliation.overpaid_by.is_some(), sum > total);
        }

        #[test]
        fn amounts_reject_negative_totals(subtotal in amount_strategy(), extra in 1i64..1000) {
            let discount = subtotal + Decimal::new(extra, 2);
            let result = BillAmounts::new(inr(subtotal), Money::zero(Currency::INR), inr(discount));
            prop_assert!(result.is_err());
        }
    }
}
