//! `provitool-commission` — the commission calculator.
//!
//! Pure, deterministic domain logic (no IO, no clock): normalizes the
//! invoice and rate tables, keeps paid invoices inside the lookback window,
//! and expands one commission line per (employee, invoice) pairing.

pub mod compute;
pub mod ledger;
pub mod model;
pub mod normalize;

pub use compute::compute;
pub use ledger::{LEDGER_COLUMNS, ledger_to_table, lines_from_table};
pub use model::{CommissionLine, CommissionRun, EmployeeRate, Invoice, PAID_MARKER};
