//! Billing domain errors

use core_kernel::MoneyError;
use thiserror::Error;

use crate::bill::{BillCategory, BillStatus};

/// Errors that can occur in the billing domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Amounts in different currencies were combined
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// The bill's status does not allow the requested action
    #[error("Cannot {action} a bill that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: BillStatus,
    },

    /// A counter may only move forward, or numbers already issued would repeat
    #[error("Invoice counter {category} is at {next_number}; cannot restart at {requested}")]
    CounterRewind {
        category: BillCategory,
        next_number: i64,
        requested: i64,
    },
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    /// Returns true for errors caused by the bill's lifecycle state
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, BillingError::InvalidTransition { .. })
    }
}
