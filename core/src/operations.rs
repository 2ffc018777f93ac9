use crate::fingerprint::ImageRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CopyError {
    Io {
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },
    MissingFileName(PathBuf),
}

impl Display for CopyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, from, to } => write!(
                f,
                "failed to copy {} to {}: {}",
                from.display(),
                to.display(),
                source
            ),
            Self::MissingFileName(path) => {
                write!(f, "file name not found for {}", path.display())
            }
        }
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct RemoveError {
    pub source: std::io::Error,
    pub path: PathBuf,
}

impl Display for RemoveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not remove {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl Error for RemoveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Plain byte copy of a record's file into `target_dir`, named
/// `<original-file-name>.<detected-format>`. No metadata is preserved.
pub fn copy_image(record: &ImageRecord, target_dir: &Path) -> Result<PathBuf, CopyError> {
    let destination = destination_path(record, target_dir)?;
    fs::copy(&record.path, &destination).map_err(|source| CopyError::Io {
        source,
        from: record.path.clone(),
        to: destination.clone(),
    })?;
    Ok(destination)
}

/// Destination a record would be copied to, without copying.
pub fn destination_path(record: &ImageRecord, target_dir: &Path) -> Result<PathBuf, CopyError> {
    let name = record
        .path
        .file_name()
        .ok_or_else(|| CopyError::MissingFileName(record.path.clone()))?;
    let mut file_name = name.to_os_string();
    file_name.push(".");
    file_name.push(&record.format);
    Ok(target_dir.join(file_name))
}

pub fn remove_image(path: &Path) -> Result<(), RemoveError> {
    fs::remove_file(path).map_err(|source| RemoveError {
        source,
        path: path.to_path_buf(),
    })
}
