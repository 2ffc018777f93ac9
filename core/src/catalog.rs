use crate::fingerprint::{analyze, ImageRecord};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Ordered list of records for one directory pass.
pub type Catalog = Vec<ImageRecord>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadingMode {
    Parallel,
    Sequential,
}

/// The one fatal cataloging condition: the directory itself cannot be
/// listed, so the pass cannot start at all.
#[derive(Debug)]
pub enum CatalogError {
    List {
        dir: PathBuf,
        source: std::io::Error,
    },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List { dir, source } => {
                write!(f, "could not list directory {}: {}", dir.display(), source)
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::List { source, .. } => Some(source),
        }
    }
}

/// Counts direct entries of `dir` for progress bar sizing.
pub fn count_entries(dir: &Path) -> u64 {
    WalkDir::new(dir).max_depth(1).into_iter().count() as u64
}

/// Builds a catalog from a single non-recursive listing of `dir`.
///
/// Entries that fail fingerprinting (subdirectories, unreadable files,
/// non-images) are dropped silently. Output order is the enumeration
/// order of the listing in both threading modes, so downstream
/// tie-breaking stays deterministic.
pub fn scan(
    dir: &Path,
    threading: ThreadingMode,
    progress_bar: &Arc<ProgressBar>,
) -> Result<Catalog, CatalogError> {
    let listing = fs::read_dir(dir).map_err(|source| CatalogError::List {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in listing {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            // An unreadable entry is skipped like any other bad file.
            Err(_) => continue,
        }
    }

    let records = match threading {
        ThreadingMode::Parallel => paths
            .par_iter()
            .filter_map(|path| handle_path(path, progress_bar))
            .collect(),
        ThreadingMode::Sequential => paths
            .iter()
            .filter_map(|path| handle_path(path, progress_bar))
            .collect(),
    };

    Ok(records)
}

fn handle_path(path: &Path, progress_bar: &Arc<ProgressBar>) -> Option<ImageRecord> {
    progress_bar.inc(1);
    progress_bar.set_message(format!("Scanning: {}", path.display()));
    match analyze(path) {
        Ok(record) => Some(record),
        Err(error) => {
            log::debug!("not cataloged: {}", error);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn hidden_bar() -> Arc<ProgressBar> {
        Arc::new(ProgressBar::hidden())
    }

    #[test]
    fn catalogs_images_and_skips_non_images() {
        let dir = tempdir().unwrap();
        image::RgbImage::new(32, 32)
            .save(dir.path().join("a.jpg"))
            .unwrap();
        image::RgbImage::new(48, 16)
            .save(dir.path().join("b.png"))
            .unwrap();
        fs::write(dir.path().join("readme.txt"), b"plain text").unwrap();

        let catalog = scan(dir.path(), ThreadingMode::Sequential, &hidden_bar()).unwrap();
        assert_eq!(catalog.len(), 2);
        let mut formats: Vec<_> = catalog.iter().map(|r| r.format.clone()).collect();
        formats.sort();
        assert_eq!(formats, vec![String::from("jpg"), String::from("png")]);
    }

    #[test]
    fn does_not_recurse_into_subdirectories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        image::RgbImage::new(32, 32)
            .save(nested.join("inner.png"))
            .unwrap();
        image::RgbImage::new(32, 32)
            .save(dir.path().join("outer.png"))
            .unwrap();

        let catalog = scan(dir.path(), ThreadingMode::Sequential, &hidden_bar()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].path, dir.path().join("outer.png"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        let result = scan(&missing, ThreadingMode::Sequential, &hidden_bar());
        assert!(matches!(result, Err(CatalogError::List { .. })));
    }

    #[test]
    fn parallel_and_sequential_produce_the_same_catalog() {
        let dir = tempdir().unwrap();
        for name in ["a.png", "b.png", "c.jpg", "d.gif"] {
            image::RgbImage::new(20, 10).save(dir.path().join(name)).unwrap();
        }

        let sequential = scan(dir.path(), ThreadingMode::Sequential, &hidden_bar()).unwrap();
        let parallel = scan(dir.path(), ThreadingMode::Parallel, &hidden_bar()).unwrap();
        let sequential_paths: Vec<_> = sequential.iter().map(|r| r.path.clone()).collect();
        let parallel_paths: Vec<_> = parallel.iter().map(|r| r.path.clone()).collect();
        assert_eq!(sequential_paths, parallel_paths);
    }

    #[test]
    fn count_entries_includes_root_and_files() {
        let dir = tempdir().unwrap();
        image::RgbImage::new(8, 8).save(dir.path().join("a.jpg")).unwrap();
        image::RgbImage::new(8, 8).save(dir.path().join("b.jpg")).unwrap();
        assert_eq!(count_entries(dir.path()), 3);
    }
}
