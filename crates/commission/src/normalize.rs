//! Input normalization: header-variant resolution and cell coercion.

use provitool_core::{Diagnostics, SchemaError, SchemaResult, Table, locale};

use crate::model::{EmployeeRate, Invoice};

/// Accepted header names for the invoice-number column.
const INVOICE_NO_HEADERS: &[&str] = &["Rechnungsnummer", "Rechnungsnr."];

/// Accepted header names for the payment-date column. Some exports only
/// carry a "letztes Bezahldatum" column, which substitutes for the plain
/// payment date.
const PAYMENT_DATE_HEADERS: &[&str] = &["Zahlungsdatum", "letztes Bezahldatum"];

/// Normalize the uploaded invoice table into typed [`Invoice`] rows.
///
/// Missing required columns (invoice number, payment date, Status, Netto)
/// fail with a [`SchemaError`] naming the column. Kunde, Projekt and
/// Fremdleistung are optional and default per cell. Bad cells degrade
/// (amount to 0.0, date to none) and are counted in `diagnostics`; a single
/// bad row never aborts the run.
pub fn normalize_invoices(
    table: &Table,
    diagnostics: &mut Diagnostics,
) -> SchemaResult<Vec<Invoice>> {
    let number_col = table
        .column_any(INVOICE_NO_HEADERS)
        .ok_or_else(|| SchemaError::missing("Rechnungsnummer"))?;
    let date_col = table
        .column_any(PAYMENT_DATE_HEADERS)
        .ok_or_else(|| SchemaError::missing("Zahlungsdatum"))?;
    let status_col = table
        .column("Status")
        .ok_or_else(|| SchemaError::missing("Status"))?;
    let net_col = table
        .column("Netto")
        .ok_or_else(|| SchemaError::missing("Netto"))?;

    let customer_col = table.column("Kunde");
    let project_col = table.column("Projekt");
    let external_col = table.column("Fremdleistung");

    let mut invoices = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let net = match locale::parse_amount(table.cell(row, net_col)) {
            Some(value) => value,
            None => {
                diagnostics.coerced_amounts += 1;
                0.0
            }
        };

        let raw_date = table.cell(row, date_col);
        let payment_date = locale::parse_date(raw_date);
        if payment_date.is_none() && !raw_date.trim().is_empty() {
            diagnostics.coerced_dates += 1;
        }

        invoices.push(Invoice {
            number: table.cell(row, number_col).to_string(),
            customer: opt_cell(table, row, customer_col).to_string(),
            project: opt_cell(table, row, project_col).to_string(),
            net,
            status: table.cell(row, status_col).to_string(),
            payment_date,
            is_external: locale::is_affirmative(opt_cell(table, row, external_col)),
        });
    }
    Ok(invoices)
}

/// Normalize the employee rate table.
///
/// `Mitarbeiter` is required. `Eigenleistung` defaults to 0 per cell. A
/// blank or unparsable `Fremdleistung` cell means "no external rate", which
/// is not the same as 0%. Rows without an employee name are skipped; a rate
/// without an owner cannot be attributed.
pub fn normalize_rates(
    table: &Table,
    diagnostics: &mut Diagnostics,
) -> SchemaResult<Vec<EmployeeRate>> {
    let employee_col = table
        .column("Mitarbeiter")
        .ok_or_else(|| SchemaError::missing("Mitarbeiter"))?;
    let own_col = table.column("Eigenleistung");
    let external_col = table.column("Fremdleistung");

    let mut rates = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let employee = table.cell(row, employee_col).trim();
        if employee.is_empty() {
            continue;
        }

        let own_raw = opt_cell(table, row, own_col);
        let own_rate = match locale::parse_amount(own_raw) {
            Some(value) => value,
            None => {
                // An absent cell is the documented default, not a coercion.
                if !own_raw.trim().is_empty() {
                    diagnostics.coerced_amounts += 1;
                }
                0.0
            }
        };

        rates.push(EmployeeRate {
            employee: employee.to_string(),
            own_rate,
            external_rate: locale::parse_amount(opt_cell(table, row, external_col)),
        });
    }
    Ok(rates)
}

fn opt_cell(table: &Table, row: usize, col: Option<usize>) -> &str {
    col.map(|c| table.cell(row, c)).unwrap_or("")
}
