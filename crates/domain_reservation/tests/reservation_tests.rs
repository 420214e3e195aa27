//! Tests for domain_reservation

use chrono::{Days, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::{Currency, CustomerId, Money, ReservationId, RoomId, RoomTypeId, StayPeriod, TemporalError};

use domain_reservation::{
    assess_booking, find_overlapping, Reservation, ReservationError, ReservationStatus, Room,
    RoomStatus, RoomType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn standard_room() -> Room {
    let room_type = RoomType::new(
        RoomTypeId::new_v7(),
        "Standard",
        Money::new(dec!(1500), Currency::INR),
        Utc::now(),
    )
    .unwrap();
    Room::new(RoomId::new_v7(), "101", &room_type, None, Utc::now()).unwrap()
}

fn book(room: &Room, stay: StayPeriod) -> Reservation {
    Reservation::book(ReservationId::new_v7(), CustomerId::new_v7(), room.id, stay, Utc::now())
}

// ============================================================================
// Booking Tests
// ============================================================================

mod booking_tests {
    use super::*;

    #[test]
    fn test_zero_night_stay_is_invalid() {
        let err: ReservationError = StayPeriod::parse("2024-05-01", "2024-05-01").unwrap_err().into();
        assert!(matches!(err, ReservationError::InvalidDates(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_back_to_back_in_either_order() {
        let room = standard_room();
        let early = StayPeriod::new(date(2024, 5, 1), date(2024, 5, 5)).unwrap();
        let late = StayPeriod::new(date(2024, 5, 5), date(2024, 5, 8)).unwrap();
        let today = date(2024, 4, 1);

        for (first, second) in [(early, late), (late, early)] {
            let existing = vec![book(&room, first)];
            let overlapping: Vec<Reservation> = find_overlapping(room.id, &second, &existing)
                .into_iter()
                .cloned()
                .collect();

            assert!(overlapping.is_empty());
            assert!(assess_booking(&room, &overlapping, &second, today).is_ok());
        }
    }

    #[test]
    fn test_overlap_is_a_conflict() {
        let room = standard_room();
        let existing = vec![book(&room, StayPeriod::new(date(2024, 5, 1), date(2024, 5, 5)).unwrap())];
        let requested = StayPeriod::new(date(2024, 5, 3), date(2024, 5, 6)).unwrap();

        let overlapping: Vec<Reservation> = find_overlapping(room.id, &requested, &existing)
            .into_iter()
            .cloned()
            .collect();
        let err = assess_booking(&room, &overlapping, &requested, date(2024, 4, 1)).unwrap_err();

        assert!(err.is_conflict());
        assert!(err.to_string().contains("already reserved"));
    }

    #[test]
    fn test_cancelled_reservations_do_not_block() {
        let room = standard_room();
        let stay = StayPeriod::new(date(2024, 5, 1), date(2024, 5, 5)).unwrap();
        let mut cancelled = book(&room, stay);
        cancelled.cancel(Utc::now()).unwrap();

        assert!(find_overlapping(room.id, &stay, &[cancelled]).is_empty());
    }

    #[test]
    fn test_other_rooms_do_not_block() {
        let room = standard_room();
        let other = standard_room();
        let stay = StayPeriod::new(date(2024, 5, 1), date(2024, 5, 5)).unwrap();
        let existing = vec![book(&other, stay)];

        assert!(find_overlapping(room.id, &stay, &existing).is_empty());
    }

    #[test]
    fn test_occupied_room_blocks_same_day_check_in() {
        let mut room = standard_room();
        room.status = RoomStatus::Occupied;
        let today = date(2024, 5, 10);
        let stay = StayPeriod::new(today, date(2024, 5, 12)).unwrap();

        let err = assess_booking(&room, &[], &stay, today).unwrap_err();
        assert_eq!(err, ReservationError::RoomOccupied { room_id: room.id });
    }

    #[test]
    fn test_occupied_room_allows_future_check_in() {
        let mut room = standard_room();
        room.status = RoomStatus::Occupied;
        let today = date(2024, 5, 10);
        let stay = StayPeriod::new(date(2024, 5, 20), date(2024, 5, 22)).unwrap();

        assert!(assess_booking(&room, &[], &stay, today).is_ok());
    }

    #[test]
    fn test_maintenance_does_not_block_booking() {
        let mut room = standard_room();
        room.status = RoomStatus::Maintenance;
        let today = date(2024, 5, 10);
        let stay = StayPeriod::new(today, date(2024, 5, 11)).unwrap();

        assert!(assess_booking(&room, &[], &stay, today).is_ok());
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    fn active() -> Reservation {
        book(&standard_room(), StayPeriod::new(date(2024, 5, 1), date(2024, 5, 4)).unwrap())
    }

    #[test]
    fn test_cancel_completed_is_invalid_state() {
        let mut reservation = active();
        reservation.check_out(date(2024, 5, 4), Utc::now()).unwrap();

        let err = reservation.cancel(Utc::now()).unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(reservation.status, ReservationStatus::Completed);
    }

    #[test]
    fn test_check_in_cancelled_is_invalid_state() {
        let mut reservation = active();
        reservation.cancel(Utc::now()).unwrap();

        let err = reservation.check_in(date(2024, 5, 1), Utc::now()).unwrap_err();
        assert!(err.is_invalid_state());
        assert!(reservation.actual_check_in.is_none());
    }

    #[test]
    fn test_checkout_without_check_in_is_allowed() {
        let mut reservation = active();
        reservation.check_out(date(2024, 5, 3), Utc::now()).unwrap();

        assert_eq!(reservation.status, ReservationStatus::Completed);
        assert_eq!(reservation.actual_check_out, Some(date(2024, 5, 3)));
        assert!(reservation.actual_check_in.is_none());
    }

    #[test]
    fn test_terminal_reservations_refuse_checkout() {
        let mut reservation = active();
        reservation.cancel(Utc::now()).unwrap();

        assert!(reservation.check_out(date(2024, 5, 3), Utc::now()).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&ReservationStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn stay_strategy() -> impl Strategy<Value = StayPeriod> {
        (0u64..60, 1u64..10).prop_map(|(offset, nights)| {
            let check_in = date(2024, 1, 1) + Days::new(offset);
            StayPeriod::new(check_in, check_in + Days::new(nights)).unwrap()
        })
    }

    proptest! {
        #[test]
        fn accepted_bookings_never_overlap(
            requests in prop::collection::vec((stay_strategy(), any::<bool>()), 1..40)
        ) {
            let room = standard_room();
            let today = date(2023, 12, 1);
            let mut ledger: Vec<Reservation> = Vec::new();

            for (stay, cancel_afterwards) in requests {
                let overlapping: Vec<Reservation> = find_overlapping(room.id, &stay, &ledger)
                    .into_iter()
                    .cloned()
                    .collect();
                if assess_booking(&room, &overlapping, &stay, today).is_ok() {
                    let mut reservation = book(&room, stay);
                    if cancel_afterwards {
                        reservation.cancel(Utc::now()).unwrap();
                    }
                    ledger.push(reservation);
                }
            }

            let active: Vec<&Reservation> = ledger.iter().filter(|r| r.is_active()).collect();
            for (i, a) in active.iter().enumerate() {
                for b in active.iter().skip(i + 1) {
                    prop_assert!(!a.stay.overlaps(&b.stay));
                }
            }
        }

        #[test]
        fn billable_nights_is_at_least_one(stay in stay_strategy()) {
            let reservation = book(&standard_room(), stay);
            prop_assert!(reservation.billable_nights() >= 1);
            prop_assert_eq!(reservation.billable_nights(), stay.nights());
        }
    }
}
