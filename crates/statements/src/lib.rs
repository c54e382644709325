//! `provitool-statements` — per-employee PDF commission statements.
//!
//! Consumes the commission ledger and produces one in-memory PDF per
//! distinct employee. Pure transform: no filesystem access, no state across
//! calls; a failure for one employee never aborts the batch.

pub mod error;
pub mod layout;
pub mod render;

pub use error::StatementError;
pub use render::{RenderFailure, RenderOutcome, Statement, render};
