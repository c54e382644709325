//! The calculation run: paid-in-window filter and per-employee expansion.

use chrono::{Months, NaiveDate};
use provitool_core::{Diagnostics, SchemaResult, Table};

use crate::model::{CommissionLine, CommissionRun, PAID_MARKER};
use crate::normalize::{normalize_invoices, normalize_rates};

/// Compute the commission ledger for one run.
///
/// `reference` is the caller-supplied "now": the cutoff is `reference`
/// minus `lookback_months` calendar months, inclusive. Passing the
/// reference date explicitly keeps the run deterministic and testable.
///
/// Only invoices whose status equals the paid marker and whose payment date
/// is on or after the cutoff take part. Each employee rate row is expanded
/// independently over the surviving invoices: own-service invoices earn
/// `net * own_rate / 100` for every employee, external-service invoices
/// earn `net * external_rate / 100` only when that rate is present and are
/// removed from the employee's candidate set otherwise. Candidates with a
/// commission of zero or less are dropped.
///
/// Returns an empty run (not an error) when no invoice survives the filter
/// or no employee yields a line. Fails only with a schema error for a
/// missing required column.
pub fn compute(
    invoices: &Table,
    rates: &Table,
    lookback_months: u32,
    reference: NaiveDate,
) -> SchemaResult<CommissionRun> {
    let mut diagnostics = Diagnostics::default();
    let invoices = normalize_invoices(invoices, &mut diagnostics)?;
    let rates = normalize_rates(rates, &mut diagnostics)?;

    let cutoff = cutoff_date(reference, lookback_months);

    let eligible: Vec<_> = invoices
        .into_iter()
        .filter(|inv| inv.status == PAID_MARKER)
        .filter(|inv| inv.payment_date.is_some_and(|date| date >= cutoff))
        .collect();

    let mut lines = Vec::new();
    for rate in &rates {
        for invoice in &eligible {
            let commission = if invoice.is_external {
                match rate.external_rate {
                    Some(external_rate) => invoice.net * (external_rate / 100.0),
                    // No external rate: this invoice is not part of the
                    // employee's candidate set at all.
                    None => continue,
                }
            } else {
                invoice.net * (rate.own_rate / 100.0)
            };

            if commission <= 0.0 {
                continue;
            }

            lines.push(CommissionLine {
                employee: rate.employee.clone(),
                invoice_number: invoice.number.clone(),
                customer: invoice.customer.clone(),
                project: invoice.project.clone(),
                net: invoice.net,
                commission,
                payment_date: invoice.payment_date,
                is_external: invoice.is_external,
                status: invoice.status.clone(),
            });
        }
    }

    Ok(CommissionRun { lines, diagnostics })
}

/// Calendar-month lookback cutoff. Month arithmetic clamps the day when the
/// target month is shorter (May 31 minus one month is April 30).
fn cutoff_date(reference: NaiveDate, lookback_months: u32) -> NaiveDate {
    reference
        .checked_sub_months(Months::new(lookback_months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const INVOICE_HEADERS: &[&str] = &[
        "Rechnungsnummer",
        "Kunde",
        "Projekt",
        "Netto",
        "Status",
        "Zahlungsdatum",
        "Fremdleistung",
    ];

    fn invoice_table(rows: &[&[&str]]) -> Table {
        Table::new(
            INVOICE_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn rate_table(rows: &[&[&str]]) -> Table {
        Table::new(
            ["Mitarbeiter", "Eigenleistung", "Fremdleistung"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn no_paid_invoice_in_window_yields_empty_run() {
        let invoices = invoice_table(&[
            // Paid, but far outside the window.
            &["R1", "", "", "100,00", "Bezahlt", "01.01.2022", ""],
            // In the window, but not paid.
            &["R2", "", "", "100,00", "Offen", "20.01.2024", ""],
            // Paid, but no parsable payment date.
            &["R3", "", "", "100,00", "Bezahlt", "demnächst", ""],
        ]);
        let rates = rate_table(&[&["Anna", "10", "20"]]);

        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        assert!(run.is_empty());
    }

    #[test]
    fn external_invoice_without_external_rate_yields_no_line() {
        let invoices = invoice_table(&[&[
            "R1", "", "", "1.000,00", "Bezahlt", "01.01.2024", "Ja",
        ]]);
        let rates = rate_table(&[&["Anna", "10", ""]]);

        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        assert!(run.is_empty());
    }

    #[test]
    fn external_invoice_with_external_rate_earns_commission() {
        let invoices = invoice_table(&[&[
            "R1", "ACME", "Relaunch", "1.000,00", "Bezahlt", "01.01.2024", "Ja",
        ]]);
        let rates = rate_table(&[&["Anna", "10", "20"]]);

        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        assert_eq!(run.lines.len(), 1);

        let line = &run.lines[0];
        assert_eq!(line.employee, "Anna");
        assert_eq!(line.invoice_number, "R1");
        assert_eq!(line.customer, "ACME");
        assert_eq!(line.project, "Relaunch");
        assert!(line.is_external);
        assert_eq!(line.status, "Bezahlt");
        assert!((line.commission - 200.0).abs() < 1e-9);
    }

    #[test]
    fn own_invoices_pay_every_employee_with_positive_rate() {
        let invoices = invoice_table(&[&[
            "R1", "", "", "500,00", "Bezahlt", "15.01.2024", "nein",
        ]]);
        let rates = rate_table(&[
            &["Anna", "10", ""],
            &["Ben", "0", "20"],
            &["Cleo", "4", "8"],
        ]);

        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        // Ben's own rate is 0, so his candidate is dropped.
        let employees: Vec<_> = run.lines.iter().map(|l| l.employee.as_str()).collect();
        assert_eq!(employees, vec!["Anna", "Cleo"]);
        assert!(run.lines.iter().all(|l| l.commission > 0.0));
    }

    #[test]
    fn cutoff_is_inclusive() {
        let invoices = invoice_table(&[
            &["R1", "", "", "100,00", "Bezahlt", "31.12.2023", ""],
            &["R2", "", "", "100,00", "Bezahlt", "30.12.2023", ""],
        ]);
        let rates = rate_table(&[&["Anna", "10", ""]]);

        // Reference 31.01.2024, one month back: cutoff is 31.12.2023.
        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        assert_eq!(run.lines.len(), 1);
        assert_eq!(run.lines[0].invoice_number, "R1");
    }

    #[test]
    fn output_order_is_rate_rows_then_input_order() {
        let invoices = invoice_table(&[
            &["R2", "", "", "100,00", "Bezahlt", "10.01.2024", ""],
            &["R1", "", "", "100,00", "Bezahlt", "20.01.2024", ""],
        ]);
        let rates = rate_table(&[&["Ben", "5", ""], &["Anna", "10", ""]]);

        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        let keys: Vec<_> = run
            .lines
            .iter()
            .map(|l| (l.employee.as_str(), l.invoice_number.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("Ben", "R2"), ("Ben", "R1"), ("Anna", "R2"), ("Anna", "R1")]
        );
    }

    #[test]
    fn identical_inputs_and_reference_give_identical_runs() {
        let invoices = invoice_table(&[
            &["R1", "K", "P", "1.234,56", "Bezahlt", "05.01.2024", "ja"],
            &["R2", "K", "P", "250,00", "Bezahlt", "06.01.2024", ""],
        ]);
        let rates = rate_table(&[&["Anna", "10", "20"], &["Ben", "5", ""]]);

        let first = compute(&invoices, &rates, 1, reference()).unwrap();
        let second = compute(&invoices, &rates, 1, reference()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn coerced_cells_are_reported() {
        let invoices = invoice_table(&[&[
            "R1", "", "", "abc", "Bezahlt", "01.01.2024", "",
        ]]);
        let rates = rate_table(&[&["Anna", "10", ""]]);

        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        assert!(run.is_empty());
        assert_eq!(run.diagnostics.coerced_amounts, 1);
    }

    #[test]
    fn empty_rate_table_yields_empty_run() {
        let invoices = invoice_table(&[&[
            "R1", "", "", "100,00", "Bezahlt", "01.01.2024", "",
        ]]);
        let rates = rate_table(&[]);

        let run = compute(&invoices, &rates, 1, reference()).unwrap();
        assert!(run.is_empty());
    }

    #[test]
    fn month_cutoff_clamps_short_months() {
        // 31.03.2024 minus one month clamps to 29.02.2024 (leap year).
        let d = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            cutoff_date(d, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    proptest! {
        /// Property: every line in any run carries a strictly positive
        /// commission, whatever the rates and amounts.
        #[test]
        fn all_surviving_lines_have_positive_commission(
            nets in prop::collection::vec(0.0f64..100_000.0, 1..8),
            own in 0.0f64..100.0,
            external in prop::option::of(0.0f64..100.0),
        ) {
            let rows: Vec<Vec<String>> = nets
                .iter()
                .enumerate()
                .map(|(i, net)| {
                    vec![
                        format!("R{i}"),
                        String::new(),
                        String::new(),
                        format!("{:.2}", net).replace('.', ","),
                        "Bezahlt".to_string(),
                        "15.01.2024".to_string(),
                        if i % 2 == 0 { "ja" } else { "" }.to_string(),
                    ]
                })
                .collect();
            let invoices = Table::new(
                INVOICE_HEADERS.iter().map(|h| h.to_string()).collect(),
                rows,
            );
            let rates = rate_table(&[&[
                "Anna",
                &format!("{:.2}", own).replace('.', ","),
                &external.map(|e| format!("{:.2}", e).replace('.', ",")).unwrap_or_default(),
            ]]);

            let run = compute(&invoices, &rates, 1, reference()).unwrap();
            prop_assert!(run.lines.iter().all(|line| line.commission > 0.0));
            if external.is_none() {
                prop_assert!(run.lines.iter().all(|line| !line.is_external));
            }
        }
    }
}
