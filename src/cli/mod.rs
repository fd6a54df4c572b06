//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod lookup;
mod output;
mod query;

pub use lookup::{run_aliases, run_identify, run_licenses, run_operators};
pub use output::{exit_codes, to_json, write_output, OutputTarget};
pub use query::{collect_expressions, is_query_error, run_compat, run_normalize, QueryOutcome};
