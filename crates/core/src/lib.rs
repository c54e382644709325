//! `provitool-core` — shared foundation for the commission pipeline.
//!
//! This crate contains **pure** primitives (no IO): the materialized
//! [`Table`] input model, schema errors, German-locale parsing/formatting,
//! and normalization diagnostics.

pub mod diagnostics;
pub mod error;
pub mod locale;
pub mod table;

pub use diagnostics::Diagnostics;
pub use error::{SchemaError, SchemaResult};
pub use table::Table;
