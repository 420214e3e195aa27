//! Test Data Builders
//!
//! Builders for coordinator requests with sensible defaults, so a test only
//! names the fields it cares about.

use chrono::NaiveDate;
use core_kernel::{BillId, CustomerId, Money, ReservationId, RoomId, RoomTypeId, StayPeriod};
use domain_billing::{BillCategory, BillDraft, BillType, ExplicitAmounts, PaymentMethod};
use domain_lifecycle::{NewPayment, NewReservation, NewRoom, NewRoomType};
use fake::faker::lorem::en::Sentence;
use fake::Fake;

use crate::fixtures::{inr, IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for reservation requests
pub struct ReservationRequestBuilder {
    customer_id: CustomerId,
    room_id: RoomId,
    stay: StayPeriod,
}

impl ReservationRequestBuilder {
    /// Starts a request for `room_id` over the three-night fixture stay
    pub fn new(room_id: RoomId) -> Self {
        Self {
            customer_id: IdFixtures::customer_id(),
            room_id,
            stay: TemporalFixtures::three_night_stay(),
        }
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn with_stay(mut self, stay: StayPeriod) -> Self {
        self.stay = stay;
        self
    }

    /// Sets the stay from a check-in date and a number of nights
    ///
    /// # Panics
    ///
    /// Panics if `nights` is not positive
    pub fn for_nights(mut self, check_in: NaiveDate, nights: i64) -> Self {
        self.stay = StayPeriod::new(check_in, check_in + chrono::Duration::days(nights))
            .expect("nights must be positive");
        self
    }

    pub fn build(self) -> NewReservation {
        NewReservation::new(self.customer_id, self.room_id, self.stay.check_in(), self.stay.check_out())
    }
}

/// Builder for bill drafts
pub struct BillDraftBuilder {
    draft: BillDraft,
}

impl Default for BillDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BillDraftBuilder {
    /// Starts a GST draft for the fixture customer dated on the fixture day
    pub fn new() -> Self {
        Self {
            draft: BillDraft::new(IdFixtures::customer_id(), BillCategory::Gst, TemporalFixtures::today()),
        }
    }

    pub fn non_gst(mut self) -> Self {
        self.draft.category = BillCategory::NonGst;
        self
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.draft.customer_id = customer_id;
        self
    }

    pub fn with_date(mut self, bill_date: NaiveDate) -> Self {
        self.draft.bill_date = bill_date;
        self
    }

    pub fn for_reservation(mut self, reservation_id: ReservationId) -> Self {
        self.draft = self.draft.with_reservation(reservation_id).with_type(BillType::Room);
        self
    }

    pub fn with_charge(mut self, description: impl Into<String>, amount: Money) -> Self {
        self.draft = self.draft.with_charge(description, amount);
        self
    }

    /// Adds a minibar charge
    pub fn with_minibar(self) -> Self {
        self.with_charge("Minibar", MoneyFixtures::minibar())
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.draft = self.draft.with_discount(discount);
        self
    }

    pub fn with_explicit_amounts(mut self, subtotal: Money, tax: Money, discount: Money) -> Self {
        self.draft = self.draft.with_explicit_amounts(ExplicitAmounts { subtotal, tax, discount });
        self
    }

    /// Attaches a random note
    pub fn with_random_notes(mut self) -> Self {
        let notes: String = Sentence(3..8).fake();
        self.draft = self.draft.with_notes(notes);
        self
    }

    pub fn build(self) -> BillDraft {
        self.draft
    }
}

/// Builder for payment requests
pub struct PaymentBuilder {
    request: NewPayment,
}

impl PaymentBuilder {
    /// Starts a cash payment against `bill_id`
    pub fn new(bill_id: BillId, amount: Money) -> Self {
        Self {
            request: NewPayment::new(bill_id, amount, PaymentMethod::Cash),
        }
    }

    pub fn by(mut self, method: PaymentMethod) -> Self {
        self.request.method = method;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.request = self.request.on(date);
        self
    }

    /// Attaches a random gateway reference such as `TXN-482913`
    pub fn with_random_reference(mut self) -> Self {
        let number: u32 = (100_000..1_000_000).fake();
        self.request = self.request.with_reference(format!("TXN-{}", number));
        self
    }

    pub fn build(self) -> NewPayment {
        self.request
    }
}

/// Room type request at the deluxe fixture rate
pub fn deluxe_room_type() -> NewRoomType {
    NewRoomType {
        name: StringFixtures::deluxe().to_string(),
        default_rate: MoneyFixtures::deluxe_rate(),
    }
}

/// Room type request at the suite fixture rate
pub fn suite_room_type() -> NewRoomType {
    NewRoomType {
        name: StringFixtures::suite().to_string(),
        default_rate: MoneyFixtures::suite_rate(),
    }
}

/// Room request inheriting its type's rate
pub fn room(room_number: impl Into<String>, room_type_id: RoomTypeId) -> NewRoom {
    NewRoom {
        room_number: room_number.into(),
        room_type_id,
        nightly_rate: None,
    }
}

/// Room request with its own nightly rate
pub fn room_at_rate(room_number: impl Into<String>, room_type_id: RoomTypeId, rate: rust_decimal::Decimal) -> NewRoom {
    NewRoom {
        room_number: room_number.into(),
        room_type_id,
        nightly_rate: Some(inr(rate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::date;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reservation_builder_defaults() {
        let room_id = RoomId::new_v7();
        let request = ReservationRequestBuilder::new(room_id).build();

        assert_eq!(request.room_id, room_id);
        assert_eq!(request.customer_id, IdFixtures::customer_id());
        assert_eq!(request.stay().unwrap(), TemporalFixtures::three_night_stay());
    }

    #[test]
    fn test_reservation_builder_for_nights() {
        let request = ReservationRequestBuilder::new(RoomId::new_v7())
            .for_nights(date(2024, 5, 30), 4)
            .build();

        assert_eq!(request.check_out, date(2024, 6, 3));
    }

    #[test]
    fn test_bill_draft_builder() {
        let reservation_id = ReservationId::new_v7();
        let draft = BillDraftBuilder::new()
            .non_gst()
            .for_reservation(reservation_id)
            .with_charge("Laundry", inr(dec!(200)))
            .with_minibar()
            .with_random_notes()
            .build();

        assert_eq!(draft.category, BillCategory::NonGst);
        assert_eq!(draft.bill_type, BillType::Room);
        assert_eq!(draft.reservation_id, Some(reservation_id));
        assert_eq!(draft.charges.len(), 2);
        assert!(draft.notes.is_some());
    }

    #[test]
    fn test_payment_builder_reference() {
        let payment = PaymentBuilder::new(BillId::new_v7(), inr(dec!(500)))
            .by(PaymentMethod::Upi)
            .with_random_reference()
            .build();

        assert_eq!(payment.method, PaymentMethod::Upi);
        assert!(payment.reference.unwrap().starts_with("TXN-"));
        assert!(payment.payment_date.is_none());
    }
}
