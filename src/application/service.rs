use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{
    AmountOverflow, BASE_CURRENCY, Entry, EntryKind, ExchangeRates, InvoiceKind, LedgerDocument,
    PeriodType, Plan, compute_totals, parse_amount,
};
use crate::storage::{LoadOutcome, Repository};

use super::{AppError, EntryRow, PlanStatus, TotalsReport, ValidationError};

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any front end (CLI, GUI, TUI, etc.).
///
/// Every successful mutation is written to disk straight away. If that write
/// fails the change stays in memory and `AppError::Save` is returned.
pub struct LedgerService {
    repo: Repository,
}

/// Entry fields as typed into a form, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub date: String,
    /// `None` or `"none"` means no invoice
    pub invoice_kind: Option<String>,
    pub invoice_info: Option<String>,
}

/// Plan fields as typed into a form, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewPlan {
    pub plan_type: String,
    pub start_date: String,
    /// Defaults to the last day of the period containing the start date
    pub end_date: Option<String>,
    pub spending_limit: String,
    pub saving_goal: String,
}

impl LedgerService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the ledger at `path`. A missing file yields the default ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, LoadOutcome), AppError> {
        let path = path.into();
        let (repo, outcome) = Repository::open(&path).map_err(|source| {
            tracing::error!(
                path = %path.display(),
                error = %format!("{source:#}"),
                "Load failed"
            );
            AppError::Load {
                path: path.clone(),
                source,
            }
        })?;
        Ok((Self::new(repo), outcome))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn document(&self) -> &LedgerDocument {
        self.repo.document()
    }

    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    // ========================
    // Entry operations
    // ========================

    /// Validate and record a new entry, then save.
    pub fn record_entry(&mut self, input: NewEntry) -> Result<Entry, AppError> {
        let entry = validate_entry(&input)?;

        let mut candidate = self.repo.entries().to_vec();
        candidate.push(entry.clone());
        ensure_totals_fit(&candidate, self.repo.exchange_rates(), self.repo.budget())?;

        self.repo.add_entry(entry.clone());
        tracing::info!(
            kind = %entry.kind(),
            amount = %entry.amount,
            currency = %entry.currency,
            "Entry recorded"
        );
        self.persist()?;
        Ok(entry)
    }

    /// Delete entries by position, then save. Returns how many were removed.
    pub fn delete_entries(&mut self, indices: &[usize]) -> Result<usize, AppError> {
        let removed = self.repo.delete_entries(indices);
        tracing::info!(requested = indices.len(), removed, "Entries deleted");
        self.persist()?;
        Ok(removed)
    }

    /// Entries in ledger order with their base-currency amounts.
    pub fn entry_rows(&self) -> Result<Vec<EntryRow>, AppError> {
        let rates = self.repo.exchange_rates();
        self.repo
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| -> Result<EntryRow, AppError> {
                Ok(EntryRow {
                    index,
                    date: entry.date,
                    kind: entry.kind().to_string(),
                    amount: entry.amount,
                    currency: entry.currency.clone(),
                    category: entry.category.clone(),
                    converted_amount: entry.converted_amount(rates).ok_or(AmountOverflow)?,
                    invoice: entry.invoice_display(),
                })
            })
            .collect()
    }

    // ========================
    // Budget and exchange rates
    // ========================

    pub fn set_budget(&mut self, budget: Decimal) -> Result<(), AppError> {
        if budget < Decimal::ZERO {
            return Err(ValidationError::NegativeBudget(budget).into());
        }
        ensure_totals_fit(self.repo.entries(), self.repo.exchange_rates(), budget)?;
        self.repo.set_budget(budget);
        tracing::info!(%budget, "Budget set");
        self.persist()
    }

    /// Merge `updates` into the current rate table and save. Every rate must
    /// be positive; otherwise nothing changes.
    pub fn update_exchange_rates(
        &mut self,
        updates: ExchangeRates,
    ) -> Result<&ExchangeRates, AppError> {
        let updates: ExchangeRates = updates
            .iter()
            .map(|(code, rate)| (code.trim().to_uppercase(), rate))
            .collect();

        if let Some((currency, rate)) = updates.first_non_positive() {
            return Err(ValidationError::NonPositiveRate {
                currency: currency.to_string(),
                rate,
            }
            .into());
        }
        if updates.iter().any(|(code, _)| code.is_empty()) {
            return Err(ValidationError::EmptyCurrency.into());
        }

        let mut rates = self.repo.exchange_rates().clone();
        rates.merge(&updates);
        ensure_totals_fit(self.repo.entries(), &rates, self.repo.budget())?;
        self.repo.set_exchange_rates(rates);
        tracing::info!(updated = updates.len(), "Exchange rates updated");
        self.persist()?;
        Ok(self.repo.exchange_rates())
    }

    // ========================
    // Plan operations
    // ========================

    pub fn add_plan(&mut self, input: NewPlan) -> Result<Plan, AppError> {
        let plan = validate_plan(&input)?;
        self.repo.add_plan(plan.clone());
        tracing::info!(
            plan_type = %plan.plan_type,
            start = %plan.start_date,
            end = %plan.end_date,
            "Plan added"
        );
        self.persist()?;
        Ok(plan)
    }

    /// Delete the plan at `index`, then save. Returns false when there was
    /// no such plan; nothing is written in that case.
    pub fn delete_plan(&mut self, index: usize) -> Result<bool, AppError> {
        if !self.repo.delete_plan(index) {
            return Ok(false);
        }
        tracing::info!(index, "Plan deleted");
        self.persist()?;
        Ok(true)
    }

    /// Progress of every plan against the entries dated inside its window.
    pub fn plan_statuses(&self) -> Result<Vec<PlanStatus>, AppError> {
        let rates = self.repo.exchange_rates();
        self.repo
            .plans()
            .iter()
            .enumerate()
            .map(|(index, plan)| -> Result<PlanStatus, AppError> {
                let in_window: Vec<Entry> = self
                    .repo
                    .entries()
                    .iter()
                    .filter(|entry| plan.contains(entry.date))
                    .cloned()
                    .collect();
                let totals = compute_totals(&in_window, rates, Decimal::ZERO)?;
                let spent = totals.total_expenses;
                let saved = totals
                    .total_income
                    .checked_sub(spent)
                    .ok_or(AmountOverflow)?;
                let remaining_limit = plan
                    .spending_limit
                    .checked_sub(spent)
                    .ok_or(AmountOverflow)?;

                Ok(PlanStatus {
                    index,
                    plan_type: plan.plan_type,
                    start_date: plan.start_date,
                    end_date: plan.end_date,
                    spending_limit: plan.spending_limit,
                    saving_goal: plan.saving_goal,
                    income: totals.total_income,
                    spent,
                    remaining_limit,
                    saved,
                    over_limit: spent > plan.spending_limit,
                    goal_reached: saved >= plan.saving_goal,
                })
            })
            .collect()
    }

    // ========================
    // Reporting
    // ========================

    pub fn compute_totals(&self) -> Result<TotalsReport, AppError> {
        let totals = compute_totals(
            self.repo.entries(),
            self.repo.exchange_rates(),
            self.repo.budget(),
        )?;
        Ok(TotalsReport::new(
            BASE_CURRENCY,
            self.repo.entries().len(),
            totals,
        ))
    }

    // ========================
    // File operations
    // ========================

    /// Replace the document with the ledger at `path` merged over defaults.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome, AppError> {
        let path = path.as_ref();
        self.repo.load(path).map_err(|source| {
            tracing::error!(
                path = %path.display(),
                error = %format!("{source:#}"),
                "Load failed"
            );
            AppError::Load {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.persist()
    }

    pub fn save_as(&mut self, new_path: impl Into<PathBuf>) -> Result<(), AppError> {
        let new_path = new_path.into();
        self.repo.save_as(&new_path).map_err(|source| {
            tracing::error!(
                path = %new_path.display(),
                error = %format!("{source:#}"),
                "Save as failed"
            );
            AppError::Save {
                path: new_path.clone(),
                source,
            }
        })
    }

    /// Merge the ledger at `path` into the current one, switch to `path`
    /// and save there. Returns the resulting entry count.
    pub fn import(&mut self, path: impl Into<PathBuf>) -> Result<usize, AppError> {
        let path = path.into();
        self.repo.import(&path).map_err(|source| {
            tracing::error!(
                path = %path.display(),
                error = %format!("{source:#}"),
                "Import failed"
            );
            AppError::Import {
                path: path.clone(),
                source,
            }
        })
    }

    fn persist(&self) -> Result<(), AppError> {
        self.repo.save().map_err(|source| {
            let path = self.repo.path().to_path_buf();
            tracing::error!(
                path = %path.display(),
                error = %format!("{source:#}"),
                "Save failed"
            );
            AppError::Save { path, source }
        })
    }
}

/// Reject a change that would leave the ledger with totals that cannot be
/// computed.
fn ensure_totals_fit(
    entries: &[Entry],
    rates: &ExchangeRates,
    budget: Decimal,
) -> Result<(), ValidationError> {
    compute_totals(entries, rates, budget)
        .map(|_| ())
        .map_err(|_| ValidationError::TotalsOverflow)
}

fn parse_form_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

fn parse_form_amount(input: &str) -> Result<Decimal, ValidationError> {
    parse_amount(input).map_err(|e| ValidationError::InvalidAmount(e.to_string()))
}

fn validate_entry(input: &NewEntry) -> Result<Entry, ValidationError> {
    let amount = parse_form_amount(&input.amount)?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }

    let date = parse_form_date(&input.date)?;

    let invoice = match input.invoice_kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(kind) if kind.eq_ignore_ascii_case("none") => None,
        Some(kind) => {
            let invoice_kind = InvoiceKind::from_str(kind)
                .ok_or_else(|| ValidationError::UnknownInvoiceKind(kind.to_string()))?;
            let info = input.invoice_info.as_deref().map(str::trim).unwrap_or("");
            if info.is_empty() {
                return Err(ValidationError::MissingInvoiceInfo(invoice_kind.to_string()));
            }
            Some((invoice_kind, info.to_string()))
        }
    };

    let kind_text = input.kind.trim();
    if kind_text.is_empty() {
        return Err(ValidationError::EmptyKind);
    }
    let kind = EntryKind::from_str(kind_text)
        .ok_or_else(|| ValidationError::UnknownKind(kind_text.to_string()))?;

    let currency = input.currency.trim().to_uppercase();
    if currency.is_empty() {
        return Err(ValidationError::EmptyCurrency);
    }

    let mut entry = Entry::new(kind, amount, currency, input.category.trim(), date);
    if let Some((invoice_kind, info)) = invoice {
        entry = entry.with_invoice(invoice_kind, info);
    }
    Ok(entry)
}

fn validate_plan(input: &NewPlan) -> Result<Plan, ValidationError> {
    let plan_type = PeriodType::from_str(&input.plan_type)
        .ok_or_else(|| ValidationError::UnknownPlanType(input.plan_type.clone()))?;

    let spending_limit = parse_form_amount(&input.spending_limit)?;
    let saving_goal = parse_form_amount(&input.saving_goal)?;
    if spending_limit < Decimal::ZERO || saving_goal < Decimal::ZERO {
        return Err(ValidationError::NegativePlanAmount);
    }

    let start_date = parse_form_date(&input.start_date)?;
    let end_date = match input.end_date.as_deref() {
        Some(end) => parse_form_date(end)?,
        None => plan_type
            .period_containing(start_date)
            .map(|(_, end)| end)
            .ok_or_else(|| ValidationError::InvalidDate(input.start_date.clone()))?,
    };
    if end_date < start_date {
        return Err(ValidationError::PlanEndsBeforeStart {
            start: start_date.to_string(),
            end: end_date.to_string(),
        });
    }

    Ok(Plan::new(
        plan_type,
        start_date,
        end_date,
        spending_limit,
        saving_goal,
    ))
}
