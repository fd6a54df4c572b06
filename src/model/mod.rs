//! Data model for license definitions and query results.
//!
//! Definition records are what the loader produces and the engine indexes;
//! result types are what the engine hands back to callers. Both serialize
//! with serde so the CLI can print them as JSON.

mod license;
mod mode;
mod result;

pub use license::*;
pub use mode::*;
pub use result::*;
