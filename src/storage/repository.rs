use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::domain::{
    Entry, ExchangeRates, LedgerDocument, Plan, normalize_legacy_entries,
};

/// Result of reading the ledger file at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file existed and was merged over the defaults.
    Loaded { entries: usize, legacy_rewritten: usize },
    /// No file at the path; the defaults stay in place.
    NotFound,
}

/// Holds the ledger document in memory and mirrors it to one JSON file.
pub struct Repository {
    path: PathBuf,
    document: LedgerDocument,
}

impl Repository {
    /// Create a repository with a default document. Nothing is read or written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: LedgerDocument::default(),
        }
    }

    /// Create a repository and load `path` over the defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, LoadOutcome)> {
        let path = path.into();
        let mut repo = Self::new(path.clone());
        let outcome = repo.load(&path)?;
        Ok((repo, outcome))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &LedgerDocument {
        &self.document
    }

    pub fn entries(&self) -> &[Entry] {
        &self.document.entries
    }

    pub fn plans(&self) -> &[Plan] {
        &self.document.plans
    }

    pub fn budget(&self) -> Decimal {
        self.document.budget
    }

    pub fn exchange_rates(&self) -> &ExchangeRates {
        &self.document.exchange_rates
    }

    // ========================
    // File operations
    // ========================

    /// Load the ledger at `path` on top of a fresh default document and start
    /// mirroring that path. A missing file is not an error: the defaults are
    /// kept and `LoadOutcome::NotFound` is returned. On failure nothing changes.
    pub fn load(&mut self, path: &Path) -> Result<LoadOutcome> {
        let Some(raw) = read_raw(path)? else {
            tracing::info!(path = %path.display(), "Ledger file not found, using defaults");
            self.document = LedgerDocument::default();
            self.path = path.to_path_buf();
            return Ok(LoadOutcome::NotFound);
        };

        let (document, legacy_rewritten) = merge_raw(&LedgerDocument::default(), raw)
            .with_context(|| format!("Failed to load ledger from {}", path.display()))?;

        let entries = document.entries.len();
        self.document = document;
        self.path = path.to_path_buf();
        tracing::info!(path = %path.display(), entries, "Ledger loaded");

        Ok(LoadOutcome::Loaded {
            entries,
            legacy_rewritten,
        })
    }

    /// Write the whole document to the current path.
    pub fn save(&self) -> Result<()> {
        write_document(&self.path, &self.document)?;
        tracing::info!(path = %self.path.display(), "Ledger saved");
        Ok(())
    }

    /// Write the document to `new_path` and mirror that path from now on.
    /// If the write fails the current path is kept.
    pub fn save_as(&mut self, new_path: impl Into<PathBuf>) -> Result<()> {
        let new_path = new_path.into();
        write_document(&new_path, &self.document)?;
        tracing::info!(
            from = %self.path.display(),
            to = %new_path.display(),
            "Ledger saved to new location"
        );
        self.path = new_path;
        Ok(())
    }

    /// Merge the ledger at `path` on top of the current document, then
    /// mirror `path` and write the merged result there. Document and path
    /// only change once that write has succeeded.
    pub fn import(&mut self, path: impl Into<PathBuf>) -> Result<usize> {
        let path = path.into();
        let raw = read_raw(&path)?
            .ok_or_else(|| anyhow!("Ledger file not found: {}", path.display()))?;

        let (document, _) = merge_raw(&self.document, raw)
            .with_context(|| format!("Failed to import ledger from {}", path.display()))?;

        write_document(&path, &document)?;

        let entries = document.entries.len();
        self.document = document;
        self.path = path;
        tracing::info!(path = %self.path.display(), entries, "Ledger imported");
        Ok(entries)
    }

    // ========================
    // Mutations
    // ========================

    pub fn add_entry(&mut self, entry: Entry) {
        self.document.entries.push(entry);
    }

    /// Remove entries by position. Indices are applied from highest to lowest
    /// so earlier removals do not shift later ones. Out-of-range and repeated
    /// indices are ignored. Returns how many entries were removed.
    pub fn delete_entries(&mut self, indices: &[usize]) -> usize {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();

        let mut removed = 0;
        for index in sorted {
            if index < self.document.entries.len() {
                self.document.entries.remove(index);
                removed += 1;
            } else {
                tracing::debug!(index, "Ignoring out-of-range entry index");
            }
        }
        removed
    }

    pub fn add_plan(&mut self, plan: Plan) {
        self.document.plans.push(plan);
    }

    /// Remove the plan at `index`. Returns false, changing nothing, when
    /// there is no such plan.
    pub fn delete_plan(&mut self, index: usize) -> bool {
        if index < self.document.plans.len() {
            self.document.plans.remove(index);
            true
        } else {
            tracing::debug!(index, "Ignoring out-of-range plan index");
            false
        }
    }

    pub fn set_budget(&mut self, budget: Decimal) {
        self.document.budget = budget;
    }

    pub fn set_exchange_rates(&mut self, rates: ExchangeRates) {
        self.document.exchange_rates = rates;
    }
}

/// Read and parse a ledger file. `Ok(None)` when there is nothing at `path`,
/// including when a parent component is not a directory.
fn read_raw(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let raw = serde_json::from_str(&text)
        .with_context(|| format!("Malformed JSON in {}", path.display()))?;
    Ok(Some(raw))
}

fn merge_raw(base: &LedgerDocument, mut raw: Value) -> Result<(LedgerDocument, usize)> {
    let rewritten = normalize_legacy_entries(&mut raw);
    if rewritten > 0 {
        tracing::warn!(rewritten, "Rewrote legacy 'entry_type' fields to 'type'");
    }
    let document = base.merged_with(raw)?;
    if let Some((currency, rate)) = document.exchange_rates.first_non_positive() {
        bail!("Exchange rate for {currency} must be greater than 0, got {rate}");
    }
    Ok((document, rewritten))
}

/// Write `document` next to `path` in a temporary file, then rename it over
/// `path`, so a crash never leaves a half-written ledger behind.
fn write_document(path: &Path, document: &LedgerDocument) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut json = serde_json::to_string_pretty(document).context("Failed to serialize ledger")?;
    json.push('\n');

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .context("Failed to write ledger data")?;
    tmp.as_file()
        .sync_all()
        .context("Failed to flush ledger data")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
