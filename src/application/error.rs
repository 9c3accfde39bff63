use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::AmountOverflow;

/// Bad user input. Nothing is changed when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be greater than 0, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Date must be in YYYY-MM-DD format, got '{0}'")]
    InvalidDate(String),

    #[error("Entry type must not be empty")]
    EmptyKind,

    #[error("Unknown entry type '{0}'. Valid types: income, expense")]
    UnknownKind(String),

    #[error("Unknown invoice type '{0}'. Valid types: none, electronic, paper")]
    UnknownInvoiceKind(String),

    #[error("Invoice information is required for {0} invoices")]
    MissingInvoiceInfo(String),

    #[error("Currency code must not be empty")]
    EmptyCurrency,

    #[error("Budget cannot be negative, got {0}")]
    NegativeBudget(Decimal),

    #[error("Exchange rate for {currency} must be greater than 0, got {rate}")]
    NonPositiveRate { currency: String, rate: Decimal },

    #[error("Unknown plan type '{0}'. Valid types: weekly, monthly, yearly")]
    UnknownPlanType(String),

    #[error("Spending limit and saving goal cannot be negative")]
    NegativePlanAmount,

    #[error("Plan ends ({end}) before it starts ({start})")]
    PlanEndsBeforeStart { start: String, end: String },

    #[error("Amount too large: ledger totals would overflow")]
    TotalsOverflow,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot compute totals: {0}")]
    Overflow(#[from] AmountOverflow),

    #[error("Failed to load ledger from {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to save ledger to {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to import ledger from {path}")]
    Import {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
