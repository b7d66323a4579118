//! Web-app project importer.
//!
//! Scans a React project tree, parses its schema, components and API
//! routes into structured records, folds them into a semantic `AppModel`,
//! and emits an app-definition DSL file plus a Markdown import report.
//!
//! The pipeline is read-only over the source tree and deterministic:
//! equal inputs produce byte-identical output. Per-file parse failures
//! degrade to diagnostics; only an unreadable project root or an explicit
//! cancellation aborts a run.

pub mod aggregate;
pub mod component;
pub mod emit;
pub mod jsx;
pub mod model;
pub mod pipeline;
pub mod routes;
pub mod scan;
pub mod scanner;
pub mod schema;


pub use aggregate::{Aggregator, ConsolidationRule};
pub use model::{
    AppModel, Diagnostic, Diagnostics, GeneratedFile, ImportError, Severity, UserRefinement,
};
pub use pipeline::{import_project, ImportOptions, ImportResult, RunContext};
pub use scanner::Framework;
