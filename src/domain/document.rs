use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entry, ExchangeRates, Plan};

/// Name older ledger files used for the entry kind.
pub const LEGACY_KIND_FIELD: &str = "entry_type";

/// Name the entry kind is stored under.
pub const KIND_FIELD: &str = "type";

/// Everything a ledger file holds.
///
/// Amounts, the budget and rates are written as JSON numbers, which pass
/// through `f64`. Values with more than about 15 significant digits do not
/// come back from a save and load exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    pub entries: Vec<Entry>,
    /// Amount set aside; subtracted from net income
    pub budget: Decimal,
    pub exchange_rates: ExchangeRates,
    pub plans: Vec<Plan>,
}

impl Default for LedgerDocument {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            budget: Decimal::ZERO,
            exchange_rates: ExchangeRates::default(),
            plans: Vec::new(),
        }
    }
}

impl LedgerDocument {
    /// Shallow-merge a parsed ledger file on top of this document.
    ///
    /// Every top-level key present in `overlay` replaces the current value
    /// wholesale. A file holding only `{"exchange_rates": {"USD": 7.1}}` leaves
    /// a table with USD alone, not the defaults plus USD. Unknown top-level keys
    /// are dropped.
    pub fn merged_with(&self, overlay: Value) -> Result<Self, DocumentError> {
        let Value::Object(overlay) = overlay else {
            return Err(DocumentError::NotAnObject);
        };

        let mut base = match serde_json::to_value(self).map_err(DocumentError::Invalid)? {
            Value::Object(map) => map,
            _ => return Err(DocumentError::NotAnObject),
        };
        for (key, value) in overlay {
            base.insert(key, value);
        }

        serde_json::from_value(Value::Object(base)).map_err(DocumentError::Invalid)
    }
}

/// Rename the legacy kind field to the current one on every entry of a raw
/// ledger file. A legacy value wins over a current one on the same entry.
/// Returns how many entries were rewritten.
pub fn normalize_legacy_entries(raw: &mut Value) -> usize {
    let Some(entries) = raw.get_mut("entries").and_then(Value::as_array_mut) else {
        return 0;
    };

    let mut rewritten = 0;
    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(kind) = entry.remove(LEGACY_KIND_FIELD) {
            entry.insert(KIND_FIELD.to_string(), kind);
            rewritten += 1;
        }
    }
    rewritten
}

#[derive(Debug)]
pub enum DocumentError {
    NotAnObject,
    Invalid(serde_json::Error),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::NotAnObject => write!(f, "ledger data must be a JSON object"),
            DocumentError::Invalid(e) => write!(f, "invalid ledger data: {}", e),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::NotAnObject => None,
            DocumentError::Invalid(e) => Some(e),
        }
    }
}
