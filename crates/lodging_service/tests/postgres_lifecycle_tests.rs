//! Lifecycle tests against PostgreSQL
//!
//! Each test starts its own container. They need Docker and are ignored by
//! default; run them with `cargo test -p lodging_service -- --ignored`.
//!
//! A plain `cargo test` never reaches the database. These are the only tests
//! that exercise what the in-memory store merely imitates:
//!
//! - the `reservations_no_overlap` exclusion constraint as the last guard
//!   against double booking
//! - `SELECT ... FOR UPDATE` row locks on rooms, reservations, bills, and
//!   invoice counters under concurrent requests
//! - `UPDATE ... RETURNING` invoice allocation staying contiguous
//! - the NUMERIC(12,2) amount columns, the `bills_total_check` constraint,
//!   and the append-only trigger on payments
//!
//! Run them before changing a migration or any SQL in `infra_db`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use rust_decimal_macros::dec;

use core_kernel::CustomerId;
use domain_billing::{BillCategory, BillStatus, PaymentMethod};
use domain_lifecycle::{ErrorKind, LodgingStore};
use domain_reservation::{ReservationStatus, RoomStatus};
use infra_db::PostgresLodgingStore;
use test_utils::{
    assert_amount, assert_bill_consistent, assert_bill_status, assert_error_kind, assert_no_overlap, date,
    create_isolated_test_database, inr, BillDraftBuilder, LodgingHarness, PaymentBuilder, RateFixtures,
    ReservationRequestBuilder, TemporalFixtures, TestDatabase,
};

async fn harness() -> (TestDatabase, LodgingHarness) {
    let db = create_isolated_test_database().await.expect("test database");
    let store: Arc<dyn LodgingStore> = Arc::new(PostgresLodgingStore::new(db.pool().clone()));
    let harness = LodgingHarness::with_store(store, RateFixtures::gst_standard())
        .await
        .expect("seeded harness");
    (db, harness)
}

// ============================================================================
// Reservation Tests
// ============================================================================

mod reservation_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_overlap_is_rejected_and_back_to_back_accepted() {
        let (_db, h) = harness().await;

        h.coordinator
            .create_reservation(
                ReservationRequestBuilder::new(h.room.id)
                    .with_stay(TemporalFixtures::three_night_stay())
                    .build(),
            )
            .await
            .unwrap();

        let overlapping = h
            .coordinator
            .create_reservation(
                ReservationRequestBuilder::new(h.room.id)
                    .with_stay(TemporalFixtures::overlapping_stay())
                    .build(),
            )
            .await;
        assert_error_kind(overlapping, ErrorKind::Conflict);

        h.coordinator
            .create_reservation(
                ReservationRequestBuilder::new(h.room.id)
                    .with_stay(TemporalFixtures::back_to_back_stay())
                    .build(),
            )
            .await
            .unwrap();

        assert_no_overlap(&h.coordinator.reservations().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires Docker"]
    async fn test_concurrent_overlapping_bookings_admit_one() {
        let (_db, h) = harness().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let coordinator = Arc::clone(&h.coordinator);
                let request = ReservationRequestBuilder::new(h.room.id)
                    .with_customer(CustomerId::new_v7())
                    .for_nights(date(2024, 7, 1) + Duration::days(i % 2), 3)
                    .build();
                tokio::spawn(async move { coordinator.create_reservation(request).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict),
            }
        }
        assert_eq!(accepted, 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_check_in_and_cancel_round_trip_room_status() {
        let (_db, h) = harness().await;
        let stay = TemporalFixtures::three_night_stay();
        let reservation = h
            .coordinator
            .create_reservation(ReservationRequestBuilder::new(h.room.id).with_stay(stay).build())
            .await
            .unwrap();

        h.clock.set_today(stay.check_in());
        let checked_in = h.coordinator.check_in(reservation.id).await.unwrap();
        assert_eq!(checked_in.actual_check_in, Some(stay.check_in()));
        assert_eq!(h.coordinator.room(h.room.id).await.unwrap().status, RoomStatus::Occupied);

        let cancelled = h.coordinator.cancel_reservation(reservation.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert_eq!(h.coordinator.room(h.room.id).await.unwrap().status, RoomStatus::Available);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires Docker"]
    async fn test_checkout_racing_next_check_in_leaves_room_occupied() {
        let (_db, h) = harness().await;
        let first = TemporalFixtures::three_night_stay();
        let next = TemporalFixtures::back_to_back_stay();
        let departing = h
            .coordinator
            .create_reservation(ReservationRequestBuilder::new(h.room.id).with_stay(first).build())
            .await
            .unwrap();
        let arriving = h
            .coordinator
            .create_reservation(ReservationRequestBuilder::new(h.room.id).with_stay(next).build())
            .await
            .unwrap();
        h.clock.set_today(first.check_in());
        h.coordinator.check_in(departing.id).await.unwrap();
        h.clock.set_today(next.check_in());

        let checkout = {
            let coordinator = Arc::clone(&h.coordinator);
            tokio::spawn(async move {
                coordinator
                    .checkout_and_bill(departing.id, first.check_out(), BillCategory::NonGst, None)
                    .await
            })
        };
        let check_in = {
            let coordinator = Arc::clone(&h.coordinator);
            tokio::spawn(async move { coordinator.check_in(arriving.id).await })
        };

        checkout.await.unwrap().unwrap();
        check_in.await.unwrap().unwrap();
        assert_eq!(h.coordinator.room(h.room.id).await.unwrap().status, RoomStatus::Occupied);
    }
}

// ============================================================================
// Billing Tests
// ============================================================================

mod billing_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_checkout_and_bill_persists_bill_with_items() {
        let (_db, h) = harness().await;
        let stay = TemporalFixtures::three_night_stay();
        let reservation = h
            .coordinator
            .create_reservation(ReservationRequestBuilder::new(h.room.id).with_stay(stay).build())
            .await
            .unwrap();

        let outcome = h
            .coordinator
            .checkout_and_bill(reservation.id, stay.check_out(), BillCategory::Gst, Some(inr(dec!(40))))
            .await
            .unwrap();

        let stored = h.coordinator.bill(outcome.bill.id).await.unwrap();
        assert_eq!(stored, outcome.bill);
        assert_bill_consistent(&stored);
        assert_eq!(stored.invoice_number, "GST-0001");
        assert_eq!(stored.line_items.len(), 1);
        assert_amount(&stored.amounts.total, dec!(3500));

        let second = h
            .coordinator
            .create_reservation_bill(reservation.id, BillCategory::Gst, None)
            .await;
        assert_error_kind(second, ErrorKind::Conflict);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires Docker"]
    async fn test_concurrent_bills_get_distinct_contiguous_numbers() {
        let (_db, h) = harness().await;
        let n = 20;

        let handles: Vec<_> = (0..n)
            .map(|_| {
                let coordinator = Arc::clone(&h.coordinator);
                tokio::spawn(async move {
                    coordinator
                        .create_bill(BillDraftBuilder::new().with_minibar().build())
                        .await
                })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in handles {
            assert!(numbers.insert(handle.await.unwrap().unwrap().invoice_number));
        }

        let expected: HashSet<String> = (1..=n).map(|i| format!("GST-{:04}", i)).collect();
        assert_eq!(numbers, expected);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_starting_number_moves_forward_only() {
        let (_db, h) = harness().await;

        h.coordinator
            .set_invoice_starting_number(BillCategory::NonGst, 1200)
            .await
            .unwrap();
        let bill = h
            .coordinator
            .create_bill(BillDraftBuilder::new().non_gst().with_minibar().build())
            .await
            .unwrap();
        assert_eq!(bill.invoice_number, "INV-1200");

        let rewind = h
            .coordinator
            .set_invoice_starting_number(BillCategory::NonGst, 5)
            .await;
        assert_error_kind(rewind, ErrorKind::Validation);
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_split_payment_settles_bill() {
        let (_db, h) = harness().await;
        let bill = h
            .coordinator
            .create_bill(
                BillDraftBuilder::new()
                    .non_gst()
                    .with_charge("Banquet hall", inr(dec!(1000)))
                    .build(),
            )
            .await
            .unwrap();

        let first = h
            .coordinator
            .record_payment(PaymentBuilder::new(bill.id, inr(dec!(600))).build())
            .await
            .unwrap();
        assert!(!first.settled_now);
        assert_bill_status(&h.coordinator.bill(bill.id).await.unwrap(), BillStatus::Draft);

        let finalized = h.coordinator.finalize_bill(bill.id).await.unwrap();
        assert_bill_status(&finalized, BillStatus::Finalized);

        let second = h
            .coordinator
            .record_payment(
                PaymentBuilder::new(bill.id, inr(dec!(400)))
                    .by(PaymentMethod::Card)
                    .with_random_reference()
                    .build(),
            )
            .await
            .unwrap();
        assert!(second.settled_now);
        assert_bill_status(&h.coordinator.bill(bill.id).await.unwrap(), BillStatus::Paid);

        let payments = h.coordinator.payments_for_bill(bill.id).await.unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].payment_date, TemporalFixtures::today());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_paid_draft_settles_on_finalize() {
        let (_db, h) = harness().await;
        let bill = h
            .coordinator
            .create_bill(BillDraftBuilder::new().non_gst().with_minibar().build())
            .await
            .unwrap();

        let receipt = h
            .coordinator
            .record_payment(PaymentBuilder::new(bill.id, inr(dec!(350.504))).build())
            .await
            .unwrap();
        assert!(!receipt.settled_now);
        assert_amount(&receipt.payment.amount, dec!(350.50));

        let finalized = h.coordinator.finalize_bill(bill.id).await.unwrap();
        assert_bill_status(&finalized, BillStatus::Paid);
        assert_bill_status(&h.coordinator.bill(bill.id).await.unwrap(), BillStatus::Paid);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_payments_table_rejects_updates() {
        let (db, h) = harness().await;
        let bill = h
            .coordinator
            .create_bill(BillDraftBuilder::new().with_minibar().build())
            .await
            .unwrap();
        h.coordinator
            .record_payment(PaymentBuilder::new(bill.id, inr(dec!(100))).build())
            .await
            .unwrap();

        let update = sqlx::query("UPDATE payments SET amount = 1")
            .execute(db.pool())
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM payments").execute(db.pool()).await;
        assert!(delete.is_err());
    }
}
