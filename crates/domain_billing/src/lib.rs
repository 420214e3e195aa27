//! Billing Domain - Bills, Invoice Numbers, and Payments
//!
//! This crate holds the billing rules of the lodging core. It does not talk to
//! storage; the lifecycle coordinator loads and saves bills through its store
//! port and applies the rules defined here.
//!
//! # Bill amounts
//!
//! Every bill carries a subtotal, tax, discount, and total with
//! `total = subtotal + tax - discount`. Line-item driven bills derive the
//! subtotal from their items and, for the GST category, the tax from the
//! configured GST rate.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{Bill, BillCategory, BillDraft};
//!
//! let draft = BillDraft::new(customer_id, BillCategory::Gst, today)
//!     .with_charge("Room 101: 2 night(s)", rate.multiply(dec!(2)));
//!
//! let bill = Bill::issue(bill_id, "GST-0001", draft, gst_rate, currency, next_line_id, now)?;
//! ```

pub mod bill;
pub mod invoice;
pub mod payment;
pub mod error;

pub use bill::{
    Bill, BillAmounts, BillCategory, BillDraft, BillStatus, BillType, Charge, ExplicitAmounts,
    LineItem,
};
pub use invoice::{check_starting_number, InvoiceCounter, InvoiceNumber};
pub use payment::{Payment, PaymentMethod, Reconciliation};
pub use error::BillingError;
