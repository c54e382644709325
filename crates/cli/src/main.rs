//! Command-line caller around the commission core: CSV tables in,
//! per-employee PDF statements out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use provitool_commission::{CommissionLine, compute, ledger_to_table};
use provitool_core::Table;
use provitool_statements::render;

#[derive(Parser, Debug)]
#[command(
    name = "provitool",
    version,
    about = "Berechnet Mitarbeiter-Provisionen und erzeugt PDF-Abrechnungen"
)]
struct Cli {
    /// Invoice ledger CSV (';'-separated, German number/date format)
    #[arg(short = 'i', long = "invoices")]
    invoices: PathBuf,

    /// Employee rate table CSV (Mitarbeiter, Eigenleistung, Fremdleistung)
    #[arg(short = 'r', long = "rates")]
    rates: PathBuf,

    /// Lookback window in months; paid invoices on/after now minus this
    /// many months count
    #[arg(short = 'm', long = "months", default_value_t = 1)]
    months: u32,

    /// Output directory for the PDF statements
    #[arg(short = 'o', long = "out", default_value = "statements")]
    out: PathBuf,

    /// Optional path for a ';'-separated CSV export of the ledger
    #[arg(long = "ledger-out")]
    ledger_out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    provitool_observability::init();
    let cli = Cli::parse();

    let invoices = read_table(&cli.invoices)
        .with_context(|| format!("reading invoices from {}", cli.invoices.display()))?;
    let rates = read_table(&cli.rates)
        .with_context(|| format!("reading rates from {}", cli.rates.display()))?;

    let run = compute(&invoices, &rates, cli.months, Local::now().date_naive())?;

    if !run.diagnostics.is_clean() {
        tracing::warn!(
            coerced_amounts = run.diagnostics.coerced_amounts,
            coerced_dates = run.diagnostics.coerced_dates,
            "some cells could not be parsed and were defaulted"
        );
    }

    if let Some(path) = &cli.ledger_out {
        write_ledger(path, &run.lines)
            .with_context(|| format!("writing ledger to {}", path.display()))?;
        tracing::info!(file = %path.display(), "ledger written");
    }

    if run.is_empty() {
        tracing::warn!(
            months = cli.months,
            "no paid invoices inside the lookback window; nothing to render"
        );
        return Ok(());
    }
    tracing::info!(lines = run.lines.len(), "commission ledger computed");

    let outcome = render(&run.lines);

    fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating output directory {}", cli.out.display()))?;
    for statement in &outcome.statements {
        let path = cli.out.join(&statement.file_name);
        fs::write(&path, &statement.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(file = %path.display(), "statement written");
    }
    for failure in &outcome.failures {
        tracing::error!(
            employee = %failure.employee,
            error = %failure.reason,
            "statement skipped"
        );
    }
    tracing::info!(
        written = outcome.statements.len(),
        skipped = outcome.failures.len(),
        "done"
    );
    Ok(())
}

/// Read a CSV file into a [`Table`]. Tries ';' first (the usual German
/// export) and falls back to ',' when the header row does not split.
fn read_table(path: &Path) -> anyhow::Result<Table> {
    let data = fs::read_to_string(path)?;
    let table = parse_csv(&data, b';')?;
    if table.headers().len() > 1 {
        return Ok(table);
    }
    parse_csv(&data, b',')
}

fn parse_csv(data: &str, delimiter: u8) -> anyhow::Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table::new(headers, rows))
}

fn write_ledger(path: &Path, lines: &[CommissionLine]) -> anyhow::Result<()> {
    let table = ledger_to_table(lines);
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
