//! Statement rendering: grouping, ordering, and failure isolation.

use provitool_commission::{CommissionLine, PAID_MARKER};

use crate::error::StatementError;
use crate::layout::StatementDocument;

/// Section heading for paid invoices, the payout basis.
const PAID_SECTION: &str = "Auszahlungsbasis – bezahlte Rechnungen";
/// Section heading for open invoices, shown as a preview only.
const OPEN_SECTION: &str = "Vorschau – offene Rechnungen, nicht auszahlbar";

/// One rendered statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Why one employee's statement could not be rendered.
#[derive(Debug)]
pub struct RenderFailure {
    pub employee: String,
    pub reason: StatementError,
}

/// Partial result of one render batch: every employee either produced a
/// statement or a recorded failure. One bad employee never aborts the rest.
#[derive(Debug, Default)]
pub struct RenderOutcome {
    pub statements: Vec<Statement>,
    pub failures: Vec<RenderFailure>,
}

/// Render one PDF statement per distinct employee in the ledger.
///
/// Employees appear in first-occurrence order; an empty ledger yields an
/// empty outcome, not an error. Within a statement the employee's lines are
/// sorted by (payment date, invoice number) and split into a paid section
/// and an open preview section, each closed by its own subtotal. Failures
/// are logged and collected per employee.
pub fn render(lines: &[CommissionLine]) -> RenderOutcome {
    let mut outcome = RenderOutcome::default();
    for (employee, employee_lines) in group_by_employee(lines) {
        match render_employee(&employee, employee_lines) {
            Ok(bytes) => outcome.statements.push(Statement {
                file_name: file_name(&employee),
                bytes,
            }),
            Err(reason) => {
                tracing::error!(
                    employee = %employee,
                    error = %reason,
                    "statement rendering failed, employee skipped"
                );
                outcome.failures.push(RenderFailure { employee, reason });
            }
        }
    }
    outcome
}

/// Deterministic statement file name: a fixed prefix plus the employee name
/// with spaces replaced by underscores.
pub fn file_name(employee: &str) -> String {
    format!("provision_{}.pdf", employee.replace(' ', "_"))
}

fn group_by_employee(lines: &[CommissionLine]) -> Vec<(String, Vec<CommissionLine>)> {
    let mut groups: Vec<(String, Vec<CommissionLine>)> = Vec::new();
    for line in lines {
        match groups.iter_mut().find(|(name, _)| *name == line.employee) {
            Some((_, bucket)) => bucket.push(line.clone()),
            None => groups.push((line.employee.clone(), vec![line.clone()])),
        }
    }
    groups
}

fn render_employee(
    employee: &str,
    mut lines: Vec<CommissionLine>,
) -> Result<Vec<u8>, StatementError> {
    lines.sort_by(|a, b| {
        (a.payment_date, a.invoice_number.as_str())
            .cmp(&(b.payment_date, b.invoice_number.as_str()))
    });

    let (paid, open): (Vec<_>, Vec<_>) =
        lines.into_iter().partition(|line| line.status == PAID_MARKER);

    let mut doc = StatementDocument::new(employee)?;
    if !paid.is_empty() {
        doc.section(PAID_SECTION, &paid)?;
    }
    if !open.is_empty() {
        doc.section(OPEN_SECTION, &open)?;
    }
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn line(employee: &str, number: &str, status: &str, day: u32) -> CommissionLine {
        CommissionLine {
            employee: employee.to_string(),
            invoice_number: number.to_string(),
            customer: "ACME".to_string(),
            project: "Relaunch".to_string(),
            net: 1000.0,
            commission: 100.0,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, day),
            is_external: false,
            status: status.to_string(),
        }
    }

    #[test]
    fn empty_ledger_renders_nothing() {
        let outcome = render(&[]);
        assert!(outcome.statements.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn one_employee_one_line_yields_one_pdf() {
        let outcome = render(&[line("Anna Schmidt", "R1", "Bezahlt", 5)]);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.statements.len(), 1);

        let statement = &outcome.statements[0];
        assert_eq!(statement.file_name, "provision_Anna_Schmidt.pdf");
        assert!(statement.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn employees_keep_first_occurrence_order() {
        let outcome = render(&[
            line("Ben", "R1", "Bezahlt", 5),
            line("Anna", "R2", "Bezahlt", 6),
            line("Ben", "R3", "Bezahlt", 7),
        ]);
        let names: Vec<_> = outcome
            .statements
            .iter()
            .map(|s| s.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["provision_Ben.pdf", "provision_Anna.pdf"]);
    }

    #[test]
    fn mixed_statuses_render_both_sections() {
        let outcome = render(&[
            line("Anna", "R1", "Bezahlt", 5),
            line("Anna", "R2", "Offen", 6),
            line("Anna", "R3", "Bezahlt", 7),
        ]);
        assert_eq!(outcome.statements.len(), 1);
        assert!(outcome.statements[0].bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_ledgers_paginate_without_failing() {
        let lines: Vec<_> = (0..150u32)
            .map(|i| line("Anna", &format!("R{i:03}"), "Bezahlt", 1 + (i % 28)))
            .collect();
        let outcome = render(&lines);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.statements.len(), 1);
        // Well past one page of rows.
        assert!(outcome.statements[0].bytes.len() > 1000);
    }

    #[test]
    fn file_names_replace_spaces() {
        assert_eq!(
            file_name("Max von und zu Muster"),
            "provision_Max_von_und_zu_Muster.pdf"
        );
        assert_eq!(file_name("Anna"), "provision_Anna.pdf");
    }
}
