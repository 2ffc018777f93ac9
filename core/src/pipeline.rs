//! The single end-to-end run: catalog the source, validate and copy,
//! then reconcile the target directory.
//!
//! This replaces the historical pair of near-identical entry points;
//! everything that differed between them is a [`RunConfig`] field.

use crate::catalog::{count_entries, scan, Catalog, CatalogError, ThreadingMode};
use crate::operations::{copy_image, remove_image};
use crate::policy::{validate, ValidationPolicy};
use crate::progress;
use crate::report::RunReport;
use crate::resolver::{resolve, ResolveMode};
use indicatif::ProgressBar;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parameters for one pipeline run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub policy: ValidationPolicy,
    pub threading: ThreadingMode,
    pub resolve_mode: ResolveMode,
    /// When true, marked duplicates in the target are deleted; otherwise
    /// they are only reported.
    pub remove_duplicates: bool,
    /// When true, target images that fail validation are deleted.
    pub purge_invalid: bool,
    pub show_progress: bool,
}

impl RunConfig {
    pub fn new(source: PathBuf, target: PathBuf) -> Self {
        Self {
            source,
            target,
            policy: ValidationPolicy::default(),
            threading: ThreadingMode::Parallel,
            resolve_mode: ResolveMode::Grouped,
            remove_duplicates: false,
            purge_invalid: false,
            show_progress: true,
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_threading(mut self, threading: ThreadingMode) -> Self {
        self.threading = threading;
        self
    }

    pub fn with_resolve_mode(mut self, mode: ResolveMode) -> Self {
        self.resolve_mode = mode;
        self
    }

    pub fn with_duplicate_removal(mut self, enabled: bool) -> Self {
        self.remove_duplicates = enabled;
        self
    }

    pub fn with_invalid_purge(mut self, enabled: bool) -> Self {
        self.purge_invalid = enabled;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }
}

/// Fatal pipeline conditions. Per-file failures are logged and absorbed;
/// only a failed directory listing or an uncreatable target halts a run.
#[derive(Debug)]
pub enum PipelineError {
    Catalog(CatalogError),
    TargetDir {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(error) => write!(f, "{}", error),
            Self::TargetDir { source, path } => write!(
                f,
                "could not create target directory {}: {}",
                path.display(),
                source
            ),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(error) => Some(error),
            Self::TargetDir { source, .. } => Some(source),
        }
    }
}

impl From<CatalogError> for PipelineError {
    fn from(error: CatalogError) -> Self {
        Self::Catalog(error)
    }
}

/// Runs the full pipeline and returns the run's counters.
pub fn run(config: &RunConfig) -> Result<RunReport, PipelineError> {
    fs::create_dir_all(&config.target).map_err(|source| PipelineError::TargetDir {
        source,
        path: config.target.clone(),
    })?;

    let mut report = RunReport::default();

    let source_catalog = catalog_directory(&config.source, config)?;
    report.scanned = source_catalog.len();
    for record in &source_catalog {
        match validate(record, &config.policy) {
            Ok(()) => match copy_image(record, &config.target) {
                Ok(destination) => {
                    log::info!("copied {} to {}", record, destination.display());
                    report.copied += 1;
                }
                Err(error) => {
                    log::warn!("{}", error);
                    report.copy_failures += 1;
                }
            },
            Err(rejection) => {
                log::info!("skipped {}: {}", record, rejection);
                report.skipped += 1;
            }
        }
    }

    log::info!("analyzing target directory {}", config.target.display());
    let target_catalog = catalog_directory(&config.target, config)?;

    let plan = resolve(&target_catalog, config.resolve_mode);
    report.duplicates_found = plan.marked_count();
    for removal in plan.removals() {
        log::info!(
            "duplicate: {} superseded by {}",
            target_catalog[removal.loser],
            target_catalog[removal.winner]
        );
    }
    if !plan.is_empty() {
        if config.remove_duplicates {
            log::info!("removing {} duplicate files", plan.marked_count());
            for removal in plan.removals() {
                let loser = &target_catalog[removal.loser];
                match remove_image(&loser.path) {
                    Ok(()) => report.duplicates_removed += 1,
                    Err(error) => log::warn!("{}", error),
                }
            }
        } else {
            log::info!(
                "found {} duplicate files (not removing)",
                plan.marked_count()
            );
        }
    }

    revalidate_target(&target_catalog, &plan, config, &mut report);

    Ok(report)
}

fn revalidate_target(
    target_catalog: &Catalog,
    plan: &crate::resolver::RemovalPlan,
    config: &RunConfig,
    report: &mut RunReport,
) {
    for (index, record) in target_catalog.iter().enumerate() {
        // Records already deleted by deduplication are not re-checked.
        if config.remove_duplicates && plan.is_marked(index) {
            continue;
        }
        if let Err(rejection) = validate(record, &config.policy) {
            report.invalid_found += 1;
            if config.purge_invalid {
                log::info!(
                    "target image fails validation, removing: {}: {}",
                    record,
                    rejection
                );
                match remove_image(&record.path) {
                    Ok(()) => report.invalid_removed += 1,
                    Err(error) => log::warn!("{}", error),
                }
            } else {
                log::warn!("target image fails validation: {}: {}", record, rejection);
            }
        }
    }
}

fn catalog_directory(dir: &Path, config: &RunConfig) -> Result<Catalog, PipelineError> {
    let bar = if config.show_progress {
        ProgressBar::new(count_entries(dir))
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(progress::default_style());
    let bar = Arc::new(bar);
    let records = scan(dir, config.threading, &bar)?;
    bar.finish_and_clear();
    Ok(records)
}
