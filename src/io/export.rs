use anyhow::Result;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::format_amount;

/// Exporter for writing ledger data to other formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export entries to CSV, one row per entry in ledger order.
    /// Returns the number of rows written.
    pub fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "index",
            "date",
            "type",
            "amount",
            "currency",
            "category",
            "converted_amount",
            "invoice",
        ])?;

        let mut count = 0;
        for row in self.service.entry_rows()? {
            csv_writer.write_record(&[
                row.index.to_string(),
                row.date.format("%Y-%m-%d").to_string(),
                row.kind,
                row.amount.normalize().to_string(),
                row.currency,
                row.category,
                format_amount(row.converted_amount),
                row.invoice,
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
