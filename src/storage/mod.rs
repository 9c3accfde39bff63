mod repository;

pub use repository::*;

/// Ledger file used when none is given.
pub const DEFAULT_LEDGER_FILE: &str = "finance_data.json";
