mod common;

use std::fs;

use anyhow::Result;
use chrono::NaiveDate;
use common::{read_ledger, unwritable_path, write_ledger};
use rust_decimal_macros::dec;
use serde_json::json;
use tally::domain::{Entry, EntryKind, ExchangeRates, LedgerDocument, PeriodType, Plan};
use tally::storage::{LoadOutcome, Repository};
use tempfile::TempDir;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn populated(path: impl Into<std::path::PathBuf>) -> Repository {
    let mut repo = Repository::new(path);
    repo.add_entry(Entry::new(
        EntryKind::Income,
        dec!(1000),
        "CNY",
        "salary",
        date("2024-01-31"),
    ));
    repo.add_entry(
        Entry::new(EntryKind::Expense, dec!(12.5), "EUR", "lunch", date("2024-02-01"))
            .with_invoice(tally::domain::InvoiceKind::Paper, "receipt"),
    );
    repo.add_plan(Plan::new(
        PeriodType::Monthly,
        date("2024-02-01"),
        date("2024-02-29"),
        dec!(3000),
        dec!(500),
    ));
    repo.set_budget(dec!(250.75));
    repo
}

#[test]
fn test_load_missing_file_keeps_defaults() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("absent.json");

    let (repo, outcome) = Repository::open(&path)?;

    assert_eq!(outcome, LoadOutcome::NotFound);
    assert_eq!(repo.document(), &LedgerDocument::default());
    assert_eq!(repo.path(), path.as_path());
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_save_then_load_roundtrip() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.json");
    let repo = populated(&path);
    repo.save()?;

    let (loaded, outcome) = Repository::open(&path)?;

    assert!(matches!(outcome, LoadOutcome::Loaded { entries: 2, .. }));
    assert_eq!(loaded.document(), repo.document());
    Ok(())
}

#[test]
fn test_saved_file_format() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.json");
    populated(&path).save()?;

    let text = fs::read_to_string(&path)?;
    assert!(text.contains("\n  \"entries\": ["), "expected indented JSON");

    let raw = read_ledger(&path)?;
    assert_eq!(raw["entries"][0]["type"], "income");
    assert_eq!(raw["entries"][0]["date"], "2024-01-31");
    assert!(raw["entries"][0]["invoice"].is_null());
    assert_eq!(raw["entries"][1]["invoice"]["type"], "paper");
    assert_eq!(raw["entries"][1]["invoice"]["info"], "receipt");
    assert_eq!(raw["budget"].as_f64(), Some(250.75));
    assert_eq!(raw["exchange_rates"]["HKD"].as_f64(), Some(0.9));
    assert_eq!(raw["plans"][0]["plan_type"], "monthly");
    assert_eq!(raw["plans"][0]["spending_limit"].as_f64(), Some(3000.0));
    Ok(())
}

#[test]
fn test_save_keeps_non_ascii_text() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.json");
    let mut repo = Repository::new(&path);
    repo.add_entry(Entry::new(
        EntryKind::Expense,
        dec!(35),
        "CNY",
        "餐饮",
        date("2024-01-02"),
    ));
    repo.save()?;

    assert!(fs::read_to_string(&path)?.contains("餐饮"));
    Ok(())
}

#[test]
fn test_load_rewrites_legacy_kind_field() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_ledger(
        temp.path(),
        "old.json",
        &json!({
            "entries": [
                {"entry_type": "income", "amount": 800, "currency": "CNY",
                 "category": "bonus", "date": "2023-12-20", "invoice": null},
                {"entry_type": "expense", "amount": 20, "currency": "USD",
                 "category": "books", "date": "2023-12-21", "invoice": null}
            ]
        }),
    )?;

    let (mut repo, outcome) = Repository::open(&path)?;
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            entries: 2,
            legacy_rewritten: 2
        }
    );
    assert_eq!(repo.entries()[0].kind(), EntryKind::Income);
    assert_eq!(repo.entries()[1].kind(), EntryKind::Expense);

    repo.save()?;
    let raw = read_ledger(&path)?;
    for entry in raw["entries"].as_array().unwrap() {
        let fields = entry.as_object().unwrap();
        assert!(fields.contains_key("type"));
        assert!(!fields.contains_key("entry_type"));
    }
    assert_eq!(raw["entries"][0]["type"], "income");
    Ok(())
}

#[test]
fn test_load_partial_rates_replace_defaults() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_ledger(
        temp.path(),
        "rates.json",
        &json!({"exchange_rates": {"USD": 7.3}, "budget": 100}),
    )?;

    let (repo, _) = Repository::open(&path)?;

    assert_eq!(repo.exchange_rates().len(), 1);
    assert_eq!(repo.exchange_rates().get("USD"), Some(dec!(7.3)));
    assert_eq!(repo.exchange_rates().get("EUR"), None);
    assert_eq!(repo.budget(), dec!(100));
    assert!(repo.entries().is_empty());
    Ok(())
}

#[test]
fn test_save_keeps_unrecognized_kinds() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_ledger(
        temp.path(),
        "kinds.json",
        &json!({
            "entries": [
                {"type": "Income", "amount": 1, "currency": "CNY", "category": "a", "date": "2024-01-01"},
                {"type": "refund", "amount": 2, "currency": "CNY", "category": "b", "date": "2024-01-02"},
                {"type": "", "amount": 3, "currency": "CNY", "category": "c", "date": "2024-01-03"},
                {"type": null, "amount": 4, "currency": "CNY", "category": "d", "date": "2024-01-04"},
                {"amount": 5, "currency": "CNY", "category": "e", "date": "2024-01-05"}
            ]
        }),
    )?;

    let (repo, _) = Repository::open(&path)?;
    assert!(repo.entries().iter().all(|e| e.kind() == EntryKind::Expense));
    repo.save()?;

    let raw = read_ledger(&path)?;
    let entries = raw["entries"].as_array().unwrap();
    assert_eq!(entries[0]["type"], "Income");
    assert_eq!(entries[1]["type"], "refund");
    assert_eq!(entries[2]["type"], "");
    assert_eq!(entries[3].get("type"), Some(&serde_json::Value::Null));
    assert!(entries[4].get("type").is_none());

    let (reloaded, _) = Repository::open(&path)?;
    assert_eq!(reloaded.document(), repo.document());
    Ok(())
}

#[test]
fn test_load_rejects_non_positive_rates() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_ledger(
        temp.path(),
        "rates.json",
        &json!({"exchange_rates": {"USD": -3, "CNY": 0}}),
    )?;

    assert!(Repository::open(&path).is_err());

    let original = temp.path().join("ledger.json");
    let mut repo = populated(&original);
    let before = repo.document().clone();

    assert!(repo.load(&path).is_err());
    assert!(repo.import(&path).is_err());
    assert_eq!(repo.document(), &before);
    assert_eq!(repo.path(), original.as_path());
    Ok(())
}

#[test]
fn test_load_malformed_json_keeps_state() -> Result<()> {
    let temp = TempDir::new()?;
    let good = temp.path().join("good.json");
    populated(&good).save()?;
    let bad = temp.path().join("bad.json");
    fs::write(&bad, "{ \"entries\": [ ")?;

    let (mut repo, _) = Repository::open(&good)?;
    let before = repo.document().clone();

    assert!(repo.load(&bad).is_err());
    assert_eq!(repo.document(), &before);
    assert_eq!(repo.path(), good.as_path());
    Ok(())
}

#[test]
fn test_load_resets_to_defaults_before_merging() -> Result<()> {
    let temp = TempDir::new()?;
    let first = temp.path().join("first.json");
    populated(&first).save()?;
    let second = write_ledger(temp.path(), "second.json", &json!({"budget": 5}))?;

    let (mut repo, _) = Repository::open(&first)?;
    repo.load(&second)?;

    assert!(repo.entries().is_empty());
    assert_eq!(repo.budget(), dec!(5));
    assert_eq!(repo.exchange_rates(), &ExchangeRates::default());
    assert_eq!(repo.path(), second.as_path());
    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("a").join("b").join("ledger.json");

    populated(&path).save()?;

    assert!(path.exists());
    Ok(())
}

#[test]
fn test_save_leaves_no_temporary_files() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("ledger.json");
    let repo = populated(&path);
    repo.save()?;
    repo.save()?;

    let names: Vec<_> = fs::read_dir(temp.path())?
        .map(|e| e.map(|e| e.file_name()))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(names, vec![std::ffi::OsString::from("ledger.json")]);
    Ok(())
}

#[test]
fn test_save_as_switches_path() -> Result<()> {
    let temp = TempDir::new()?;
    let original = temp.path().join("ledger.json");
    let copy = temp.path().join("copy.json");
    let mut repo = populated(&original);

    repo.save_as(&copy)?;

    assert_eq!(repo.path(), copy.as_path());
    assert!(copy.exists());
    assert!(!original.exists());
    Ok(())
}

#[test]
fn test_save_as_unwritable_path_keeps_state() -> Result<()> {
    let temp = TempDir::new()?;
    let original = temp.path().join("ledger.json");
    let mut repo = populated(&original);
    let before = repo.document().clone();
    let target = unwritable_path(temp.path())?;

    assert!(repo.save_as(&target).is_err());

    assert_eq!(repo.path(), original.as_path());
    assert_eq!(repo.document(), &before);
    assert!(!target.exists());
    Ok(())
}

#[test]
fn test_import_merges_over_current_document() -> Result<()> {
    let temp = TempDir::new()?;
    let original = temp.path().join("ledger.json");
    let mut repo = populated(&original);
    let import_path = write_ledger(
        temp.path(),
        "other.json",
        &json!({
            "entries": [
                {"entry_type": "expense", "amount": 60, "currency": "HKD",
                 "category": "tram", "date": "2024-03-05", "invoice": null}
            ],
            "budget": 900
        }),
    )?;

    let entries = repo.import(&import_path)?;

    assert_eq!(entries, 1);
    assert_eq!(repo.path(), import_path.as_path());
    assert_eq!(repo.entries()[0].category, "tram");
    assert_eq!(repo.budget(), dec!(900));
    // Keys absent from the imported file survive from the current document
    assert_eq!(repo.plans().len(), 1);

    let raw = read_ledger(&import_path)?;
    assert_eq!(raw["entries"][0]["type"], "expense");
    assert!(raw["entries"][0].get("entry_type").is_none());
    assert_eq!(raw["plans"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn test_import_failure_keeps_state() -> Result<()> {
    let temp = TempDir::new()?;
    let original = temp.path().join("ledger.json");
    let mut repo = populated(&original);
    let before = repo.document().clone();

    assert!(repo.import(temp.path().join("missing.json")).is_err());

    let bad = temp.path().join("bad.json");
    fs::write(&bad, "[1, 2, 3]")?;
    assert!(repo.import(&bad).is_err());

    assert_eq!(repo.document(), &before);
    assert_eq!(repo.path(), original.as_path());
    Ok(())
}
