//! Core cataloging and deduplication engine for spotkeep.
//!
//! This crate exposes the image fingerprinting, directory cataloging,
//! rule validation, and duplicate resolution used by the CLI: records
//! are built once per run, validated against a [`ValidationPolicy`],
//! and reconciled through a [`resolver::RemovalPlan`] that names one
//! winner per duplicate group.

pub mod catalog;
pub mod fingerprint;
pub mod operations;
pub mod pipeline;
pub mod policy;
pub mod progress;
pub mod report;
pub mod resolver;

pub use catalog::{count_entries, scan, Catalog, CatalogError, ThreadingMode};
pub use fingerprint::{ContentHash, FingerprintError, ImageRecord, HASH_LENGTH};
pub use operations::{copy_image, destination_path, remove_image, CopyError, RemoveError};
pub use pipeline::{run, PipelineError, RunConfig};
pub use policy::{validate, Rejection, ValidationPolicy, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH};
pub use report::{print_summary, write_json, ReportingError, RunReport};
pub use resolver::{resolve, Removal, RemovalPlan, ResolveMode};
