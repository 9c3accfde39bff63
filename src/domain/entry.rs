use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{BASE_CURRENCY, ExchangeRates};

/// Whether an entry brings money in or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    /// Anything that is not income, including entries saved without a kind.
    #[default]
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    /// Parse a kind typed by a user. Case-insensitive, rejects unknown kinds.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }

    /// Classify a kind read from a ledger file. Only the exact value `income`
    /// counts as income; missing, empty or unrecognized kinds are expenses.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some("income") => EntryKind::Income,
            _ => EntryKind::Expense,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `type` field of an entry exactly as found in the ledger file.
///
/// Values other than `income` and `expense` are kept as they are, so a
/// load followed by a save never rewrites them. They are classified only
/// when the entry is counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum KindLabel {
    /// No `type` field at all
    #[default]
    Missing,
    /// `"type": null`
    Null,
    Text(String),
}

impl KindLabel {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KindLabel::Text(text) => Some(text),
            KindLabel::Missing | KindLabel::Null => None,
        }
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::classify(self.as_text())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, KindLabel::Missing)
    }
}

impl From<EntryKind> for KindLabel {
    fn from(kind: EntryKind) -> Self {
        KindLabel::Text(kind.as_str().to_string())
    }
}

impl Serialize for KindLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            KindLabel::Text(text) => serializer.serialize_str(text),
            KindLabel::Missing | KindLabel::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for KindLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(text) => KindLabel::Text(text),
            None => KindLabel::Null,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// A file on disk, `info` holds its path
    Electronic,
    /// A paper receipt, `info` describes it
    Paper,
}

impl InvoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceKind::Electronic => "electronic",
            InvoiceKind::Paper => "paper",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "electronic" => Some(InvoiceKind::Electronic),
            "paper" => Some(InvoiceKind::Paper),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "type")]
    pub kind: InvoiceKind,
    pub info: String,
}

fn default_currency() -> String {
    BASE_CURRENCY.to_string()
}

/// One recorded income or expense. Entries have no id of their own;
/// they are addressed by their position in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "type", default, skip_serializing_if = "KindLabel::is_missing")]
    pub kind_label: KindLabel,
    /// Amount in `currency`, always positive for entries recorded through the service
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub invoice: Option<Invoice>,
}

impl Entry {
    pub fn new(
        kind: EntryKind,
        amount: Decimal,
        currency: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind_label: kind.into(),
            amount,
            currency: currency.into(),
            category: category.into(),
            date,
            invoice: None,
        }
    }

    pub fn with_invoice(mut self, kind: InvoiceKind, info: impl Into<String>) -> Self {
        self.invoice = Some(Invoice {
            kind,
            info: info.into(),
        });
        self
    }

    /// How the entry counts in totals.
    pub fn kind(&self) -> EntryKind {
        self.kind_label.kind()
    }

    pub fn is_income(&self) -> bool {
        self.kind() == EntryKind::Income
    }

    /// Amount expressed in the base currency, or `None` if it does not fit
    /// in a `Decimal`.
    pub fn converted_amount(&self, rates: &ExchangeRates) -> Option<Decimal> {
        self.amount.checked_mul(rates.rate_for(&self.currency))
    }

    /// Invoice as shown in listings, e.g. "paper: taxi receipt".
    pub fn invoice_display(&self) -> String {
        match &self.invoice {
            Some(invoice) => format!("{}: {}", invoice.kind, invoice.info),
            None => String::new(),
        }
    }
}
