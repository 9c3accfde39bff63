use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{LedgerService, NewEntry, NewPlan};
use crate::domain::{BucketValue, ExchangeRates, format_amount, parse_amount};
use crate::storage::{DEFAULT_LEDGER_FILE, LoadOutcome};

/// Tally - Personal Finance Ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A personal finance ledger kept in a single JSON file")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, env = "TALLY_FILE", default_value = DEFAULT_LEDGER_FILE)]
    pub file: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an income or expense entry
    Add {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Entry type: income, expense
        #[arg(short = 't', long = "type")]
        kind: String,

        /// Currency code (e.g., CNY, USD)
        #[arg(short = 'C', long, default_value = "CNY")]
        currency: String,

        /// Category (e.g., "salary", "food")
        #[arg(short, long, default_value = "")]
        category: String,

        /// Date of the entry (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Invoice type: none, electronic, paper
        #[arg(long, default_value = "none")]
        invoice: String,

        /// Invoice file path (electronic) or description (paper)
        #[arg(long)]
        invoice_info: Option<String>,
    },

    /// List entries with their index
    List,

    /// Delete entries by index
    Delete {
        /// Indices as shown by `list`
        #[arg(required = true)]
        indices: Vec<usize>,
    },

    /// Budget commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Exchange rate commands
    #[command(subcommand)]
    Rates(RatesCommands),

    /// Saving and spending plan commands
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Show totals converted to the base currency
    Totals {
        /// View: bar (income, expenses, budget, net) or pie (income, expenses, deficit/surplus)
        #[arg(long, default_value = "bar")]
        view: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Write the ledger to its file
    Save,

    /// Write the ledger to a new file and use that file from now on
    SaveAs {
        /// Destination path
        path: String,
    },

    /// Merge another ledger file into this one and switch to it
    Import {
        /// Ledger file to import
        path: String,
    },

    /// Export entries to CSV
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the budget
    Set {
        /// Budget amount (e.g., "500" or "500.00")
        amount: String,
    },

    /// Show the budget
    Show,
}

#[derive(Subcommand)]
pub enum RatesCommands {
    /// List exchange rates to the base currency
    List,

    /// Set one or more rates, e.g. `USD=7.1 EUR=7.9`
    Set {
        #[arg(required = true)]
        rates: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Add a plan
    Add {
        /// Plan type: weekly, monthly, yearly
        #[arg(short = 't', long = "type")]
        plan_type: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD, defaults to the end of the period containing the start date)
        #[arg(long)]
        end: Option<String>,

        /// Spending limit
        #[arg(short, long, default_value = "0")]
        limit: String,

        /// Saving goal
        #[arg(short, long, default_value = "0")]
        goal: String,
    },

    /// List plans
    List,

    /// Delete a plan by index
    Delete {
        /// Index as shown by `plan list`
        index: usize,
    },

    /// Show spending and savings against every plan
    Status,
}

/// Set up logging to stderr. `RUST_LOG` overrides the level picked by `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let (mut service, outcome) = LedgerService::open(&self.file)?;
        if self.verbose {
            match outcome {
                LoadOutcome::NotFound => {
                    eprintln!("No ledger at {}, starting a new one", self.file)
                }
                LoadOutcome::Loaded { entries, .. } => {
                    eprintln!("Loaded {} entries from {}", entries, self.file)
                }
            }
        }

        match self.command {
            Commands::Add {
                amount,
                kind,
                currency,
                category,
                date,
                invoice,
                invoice_info,
            } => {
                let date = date.unwrap_or_else(|| Local::now().date_naive().to_string());
                let entry = service.record_entry(NewEntry {
                    kind,
                    amount,
                    currency,
                    category,
                    date,
                    invoice_kind: Some(invoice),
                    invoice_info,
                })?;

                println!(
                    "Recorded {}: {} {} ({}, {})",
                    entry.kind(),
                    format_amount(entry.amount),
                    entry.currency,
                    if entry.category.is_empty() {
                        "uncategorized"
                    } else {
                        entry.category.as_str()
                    },
                    entry.date
                );
            }

            Commands::List => run_list_command(&service)?,

            Commands::Delete { indices } => {
                let removed = service.delete_entries(&indices)?;
                println!("Deleted {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
            }

            Commands::Budget(cmd) => run_budget_command(&mut service, cmd)?,

            Commands::Rates(cmd) => run_rates_command(&mut service, cmd)?,

            Commands::Plan(cmd) => run_plan_command(&mut service, cmd)?,

            Commands::Totals { view, format } => run_totals_command(&service, &view, &format)?,

            Commands::Save => {
                service.save()?;
                println!("Ledger saved: {}", service.path().display());
            }

            Commands::SaveAs { path } => {
                service.save_as(&path)?;
                println!("Ledger saved to: {}", path);
            }

            Commands::Import { path } => {
                let entries = service.import(&path)?;
                println!("Imported {} ({} entries)", path, entries);
            }

            Commands::Export { output } => run_export_command(&service, output.as_deref())?,
        }

        Ok(())
    }
}

fn run_list_command(service: &LedgerService) -> Result<()> {
    let rows = service.entry_rows()?;
    if rows.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    println!(
        "{:>5} {:<10} {:<8} {:>12} {:<5} {:<16} {:>12} {}",
        "INDEX", "DATE", "TYPE", "AMOUNT", "CUR", "CATEGORY", "CONVERTED", "INVOICE"
    );
    println!("{}", "-".repeat(90));
    for row in rows {
        println!(
            "{:>5} {:<10} {:<8} {:>12} {:<5} {:<16} {:>12} {}",
            row.index,
            row.date.format("%Y-%m-%d"),
            row.kind,
            format_amount(row.amount),
            row.currency,
            truncate(&row.category, 16),
            format_amount(row.converted_amount),
            row.invoice
        );
    }
    Ok(())
}

fn run_budget_command(service: &mut LedgerService, cmd: BudgetCommands) -> Result<()> {
    match cmd {
        BudgetCommands::Set { amount } => {
            let budget =
                parse_amount(&amount).context("Invalid amount format. Use '500.00' or '500'")?;
            service.set_budget(budget)?;
            println!("Budget set: {}", format_amount(budget));
        }
        BudgetCommands::Show => {
            println!("Budget: {}", format_amount(service.document().budget));
        }
    }
    Ok(())
}

fn run_rates_command(service: &mut LedgerService, cmd: RatesCommands) -> Result<()> {
    match cmd {
        RatesCommands::List => print_rates(service.document().exchange_rates.iter()),
        RatesCommands::Set { rates } => {
            let updates = rates
                .iter()
                .map(|pair| parse_rate_pair(pair))
                .collect::<Result<ExchangeRates>>()?;
            let table = service.update_exchange_rates(updates)?;
            println!("Exchange rates updated");
            print_rates(table.iter());
        }
    }
    Ok(())
}

fn print_rates<'a>(rates: impl Iterator<Item = (&'a str, rust_decimal::Decimal)>) {
    println!("{:<8} {:>12}", "CURRENCY", "RATE");
    println!("{}", "-".repeat(21));
    for (code, rate) in rates {
        println!("{:<8} {:>12}", code, rate.normalize());
    }
}

fn parse_rate_pair(pair: &str) -> Result<(String, rust_decimal::Decimal)> {
    let (code, rate) = pair
        .split_once('=')
        .with_context(|| format!("Invalid rate '{}'. Use CODE=RATE, e.g. USD=7.1", pair))?;
    let rate = parse_amount(rate).with_context(|| format!("Invalid rate for {}", code))?;
    Ok((code.to_string(), rate))
}

fn run_plan_command(service: &mut LedgerService, cmd: PlanCommands) -> Result<()> {
    match cmd {
        PlanCommands::Add {
            plan_type,
            start,
            end,
            limit,
            goal,
        } => {
            let plan = service.add_plan(NewPlan {
                plan_type,
                start_date: start,
                end_date: end,
                spending_limit: limit,
                saving_goal: goal,
            })?;
            println!(
                "Added {} plan: {} to {} (limit {}, goal {})",
                plan.plan_type,
                plan.start_date,
                plan.end_date,
                format_amount(plan.spending_limit),
                format_amount(plan.saving_goal)
            );
        }

        PlanCommands::List => {
            let plans = &service.document().plans;
            if plans.is_empty() {
                println!("No plans found.");
            } else {
                println!(
                    "{:>5} {:<8} {:<10} {:<10} {:>12} {:>12}",
                    "INDEX", "TYPE", "START", "END", "LIMIT", "GOAL"
                );
                println!("{}", "-".repeat(62));
                for (index, plan) in plans.iter().enumerate() {
                    println!(
                        "{:>5} {:<8} {:<10} {:<10} {:>12} {:>12}",
                        index,
                        plan.plan_type,
                        plan.start_date,
                        plan.end_date,
                        format_amount(plan.spending_limit),
                        format_amount(plan.saving_goal)
                    );
                }
            }
        }

        PlanCommands::Delete { index } => {
            if service.delete_plan(index)? {
                println!("Deleted plan {}", index);
            } else {
                println!("No plan at index {}", index);
            }
        }

        PlanCommands::Status => {
            let statuses = service.plan_statuses()?;
            if statuses.is_empty() {
                println!("No plans found.");
            } else {
                println!(
                    "{:>5} {:<8} {:<23} {:>12} {:>12} {:>12} {:>12} {:>12}",
                    "INDEX", "TYPE", "WINDOW", "LIMIT", "SPENT", "REMAINING", "GOAL", "SAVED"
                );
                println!("{}", "-".repeat(105));
                for status in statuses {
                    let mut flags = Vec::new();
                    if status.over_limit {
                        flags.push("over limit");
                    }
                    if status.goal_reached {
                        flags.push("goal reached");
                    }
                    println!(
                        "{:>5} {:<8} {:<23} {:>12} {:>12} {:>12} {:>12} {:>12} {}",
                        status.index,
                        status.plan_type,
                        format!("{}..{}", status.start_date, status.end_date),
                        format_amount(status.spending_limit),
                        format_amount(status.spent),
                        format_amount(status.remaining_limit),
                        format_amount(status.saving_goal),
                        format_amount(status.saved),
                        flags.join(", ")
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_totals_command(service: &LedgerService, view: &str, format: &str) -> Result<()> {
    let report = service.compute_totals()?;

    let buckets: &[BucketValue] = match view {
        "bar" => &report.bar,
        "pie" => &report.pie,
        _ => anyhow::bail!("Invalid view '{}'. Valid views: bar, pie", view),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "table" => {
            println!(
                "Totals in {} ({} entries)",
                report.base_currency, report.entry_count
            );
            println!();
            println!("{:<10} {:>14}", "BUCKET", "AMOUNT");
            println!("{}", "-".repeat(25));
            for bucket in buckets {
                println!(
                    "{:<10} {:>14}",
                    bucket.bucket.as_str(),
                    format_amount(bucket.value)
                );
            }
        }
        _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
    }

    Ok(())
}

fn run_export_command(service: &LedgerService, output: Option<&str>) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = exporter.export_entries_csv(writer)?;
    if output.is_some() {
        eprintln!("Exported {} entries", count);
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
