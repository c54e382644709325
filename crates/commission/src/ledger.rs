//! Fixed ledger schema and untyped-table conversions.

use provitool_core::{SchemaError, SchemaResult, Table, locale};

use crate::model::CommissionLine;

/// The fixed output column set of a calculation run, in order.
pub const LEDGER_COLUMNS: &[&str] = &[
    "Mitarbeiter",
    "Rechnungsnummer",
    "Kunde",
    "Projekt",
    "Netto",
    "Provision",
    "Zahlungsdatum",
    "Ist_Fremdleistung",
    "Status",
];

/// Materialize the ledger as a table with the fixed schema.
///
/// An empty run still produces the full header row, so downstream consumers
/// can distinguish "valid but empty" from "malformed".
pub fn ledger_to_table(lines: &[CommissionLine]) -> Table {
    let headers = LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect();
    let rows = lines
        .iter()
        .map(|line| {
            vec![
                line.employee.clone(),
                line.invoice_number.clone(),
                line.customer.clone(),
                line.project.clone(),
                locale::format_amount(line.net),
                locale::format_amount(line.commission),
                locale::format_date(line.payment_date),
                if line.is_external { "Ja" } else { "Nein" }.to_string(),
                line.status.clone(),
            ]
        })
        .collect();
    Table::new(headers, rows)
}

/// Rebuild typed commission lines from an untyped ledger table.
///
/// This is the renderer's required-field check for ledgers that did not
/// come straight out of [`crate::compute`] (for example a re-loaded CSV
/// export): every fixed column must be present, otherwise a [`SchemaError`]
/// names the missing one. Cells follow the usual leniency, bad amounts read
/// as 0.0 and bad dates as missing.
pub fn lines_from_table(table: &Table) -> SchemaResult<Vec<CommissionLine>> {
    let col = |name: &'static str| -> SchemaResult<usize> {
        table.column(name).ok_or_else(|| SchemaError::missing(name))
    };
    let employee = col("Mitarbeiter")?;
    let number = col("Rechnungsnummer")?;
    let customer = col("Kunde")?;
    let project = col("Projekt")?;
    let net = col("Netto")?;
    let commission = col("Provision")?;
    let date = col("Zahlungsdatum")?;
    let external = col("Ist_Fremdleistung")?;
    let status = col("Status")?;

    let mut lines = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        lines.push(CommissionLine {
            employee: table.cell(row, employee).to_string(),
            invoice_number: table.cell(row, number).to_string(),
            customer: table.cell(row, customer).to_string(),
            project: table.cell(row, project).to_string(),
            net: locale::parse_amount(table.cell(row, net)).unwrap_or(0.0),
            commission: locale::parse_amount(table.cell(row, commission)).unwrap_or(0.0),
            payment_date: locale::parse_date(table.cell(row, date)),
            is_external: locale::is_affirmative(table.cell(row, external)),
            status: table.cell(row, status).to_string(),
        });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn line() -> CommissionLine {
        CommissionLine {
            employee: "Anna Schmidt".to_string(),
            invoice_number: "R1".to_string(),
            customer: "ACME".to_string(),
            project: "Relaunch".to_string(),
            net: 1234.56,
            commission: 123.46,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            is_external: true,
            status: "Bezahlt".to_string(),
        }
    }

    #[test]
    fn empty_ledger_keeps_the_fixed_schema() {
        let table = ledger_to_table(&[]);
        assert_eq!(table.headers(), LEDGER_COLUMNS);
        assert!(table.is_empty());
    }

    #[test]
    fn table_roundtrip_preserves_the_line() {
        let table = ledger_to_table(&[line()]);
        let restored = lines_from_table(&table).unwrap();
        assert_eq!(restored, vec![line()]);
    }

    #[test]
    fn missing_ledger_column_is_named() {
        let mut headers: Vec<String> = LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect();
        headers.retain(|h| h != "Provision");
        let table = Table::new(headers, vec![]);
        assert_eq!(
            lines_from_table(&table),
            Err(SchemaError::missing("Provision"))
        );
    }
}
