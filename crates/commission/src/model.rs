//! Domain records of one calculation run.

use chrono::NaiveDate;
use provitool_core::Diagnostics;
use serde::{Deserialize, Serialize};

/// Status value identifying a paid invoice. The status column is an open
/// set of strings; only this marker has meaning to the pipeline.
pub const PAID_MARKER: &str = "Bezahlt";

/// One normalized invoice row.
///
/// Created from the uploaded ledger and never mutated afterwards; immutable
/// for the duration of one calculation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub number: String,
    pub customer: String,
    pub project: String,
    /// Net amount, non-negative after normalization (bad cells become 0.0).
    pub net: f64,
    /// Raw status cell, compared only against [`PAID_MARKER`].
    pub status: String,
    /// `None` when the cell was empty or unparsable; such rows never pass
    /// the lookback filter.
    pub payment_date: Option<NaiveDate>,
    /// Derived from the Fremdleistung column's affirmative markers.
    pub is_external: bool,
}

/// One employee's commission rates, in percent.
///
/// `external_rate: None` means the employee earns nothing on external
/// services: external invoices are removed from that employee's candidate
/// set instead of being zeroed. Distinct from `Some(0.0)`, although both
/// end up excluded by the positive-commission filter.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRate {
    pub employee: String,
    pub own_rate: f64,
    pub external_rate: Option<f64>,
}

/// One (employee, invoice) pairing with its computed commission.
///
/// Invariant: `commission > 0.0`; zero-commission candidates are dropped
/// before the line is materialized. Serialized field names are the fixed
/// German ledger schema ([`crate::LEDGER_COLUMNS`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionLine {
    #[serde(rename = "Mitarbeiter")]
    pub employee: String,
    #[serde(rename = "Rechnungsnummer")]
    pub invoice_number: String,
    #[serde(rename = "Kunde")]
    pub customer: String,
    #[serde(rename = "Projekt")]
    pub project: String,
    #[serde(rename = "Netto")]
    pub net: f64,
    #[serde(rename = "Provision")]
    pub commission: f64,
    #[serde(rename = "Zahlungsdatum")]
    pub payment_date: Option<NaiveDate>,
    #[serde(rename = "Ist_Fremdleistung")]
    pub is_external: bool,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Result of one calculation run: the commission ledger plus coercion
/// diagnostics. An empty ledger is a valid result, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommissionRun {
    pub lines: Vec<CommissionLine>,
    pub diagnostics: Diagnostics,
}

impl CommissionRun {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
