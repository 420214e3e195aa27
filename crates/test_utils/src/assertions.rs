//! Custom Test Assertions
//!
//! Assertion helpers for lodging types with messages that name the record
//! at fault.

use core_kernel::Money;
use domain_billing::{Bill, BillCategory, BillStatus, InvoiceNumber};
use domain_lifecycle::{ErrorKind, LifecycleError};
use domain_reservation::Reservation;
use rust_decimal::Decimal;

/// Asserts that two amounts are equal and share a currency
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that an amount equals `expected` in its own currency
pub fn assert_amount(actual: &Money, expected: Decimal) {
    assert_eq!(actual.amount(), expected, "Expected {}, got {}", expected, actual);
}

/// Asserts the bill's amounts satisfy `total = subtotal + tax - discount`
/// and its items add up to the subtotal
pub fn assert_bill_consistent(bill: &Bill) {
    assert!(
        bill.amounts.is_consistent(),
        "Bill {} is inconsistent: subtotal={} tax={} discount={} total={}",
        bill.invoice_number,
        bill.amounts.subtotal,
        bill.amounts.tax,
        bill.amounts.discount,
        bill.amounts.total
    );

    if !bill.line_items.is_empty() && bill.tax_rate.is_some() {
        let items = Money::sum(bill.currency(), bill.line_items.iter().map(|item| &item.amount))
            .expect("line items share the bill currency")
            .round_to_currency();
        assert_money_eq(&items, &bill.amounts.subtotal);
    }
}

pub fn assert_bill_status(bill: &Bill, expected: BillStatus) {
    assert_eq!(
        bill.status, expected,
        "Bill {} is {:?}, expected {:?}",
        bill.invoice_number, bill.status, expected
    );
}

/// Asserts that no two ACTIVE reservations of the same room overlap
pub fn assert_no_overlap(reservations: &[Reservation]) {
    let active: Vec<&Reservation> = reservations.iter().filter(|r| r.is_active()).collect();

    for (i, a) in active.iter().enumerate() {
        for b in &active[i + 1..] {
            assert!(
                a.room_id != b.room_id || !a.stay.overlaps(&b.stay),
                "Active reservations {} and {} overlap on room {}",
                a.id,
                b.id,
                a.room_id
            );
        }
    }
}

/// Asserts that the bills of one category carry consecutive numbers
/// `first, first + 1, ...` in some order
pub fn assert_invoice_numbers_contiguous(bills: &[Bill], category: BillCategory, prefix: &str, first: i64) {
    let mut numbers: Vec<String> = bills
        .iter()
        .filter(|b| b.category == category)
        .map(|b| b.invoice_number.clone())
        .collect();
    numbers.sort();

    let expected: Vec<String> = (0..numbers.len() as i64)
        .map(|offset| InvoiceNumber::new(prefix, first + offset).to_string())
        .collect();

    assert_eq!(numbers, expected, "Invoice numbers of {:?} have gaps or duplicates", category);
}

/// Asserts that a result failed with the given error kind
pub fn assert_error_kind<T: std::fmt::Debug>(result: Result<T, LifecycleError>, expected: ErrorKind) {
    match result {
        Ok(value) => panic!("Expected {:?} error, got Ok({:?})", expected, value),
        Err(err) => assert_eq!(err.kind(), expected, "Unexpected error: {}", err),
    }
}
