use image::ImageFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Length in bytes of a record's content hash (SHA-256).
pub const HASH_LENGTH: usize = 32;

/// Whole-file content digest.
pub type ContentHash = [u8; HASH_LENGTH];

/// Everything known about one image file after fingerprinting.
///
/// Records are immutable once built; resolution state lives in a
/// separate [`crate::resolver::RemovalPlan`], never on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    /// Codec name by primary extension, e.g. "jpg", "png", "gif".
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub content_hash: ContentHash,
    pub file_size: u64,
    /// Used only for duplicate tie-breaking, never for equality.
    pub modified: SystemTime,
}

impl ImageRecord {
    /// Duplicate predicate between two records. Symmetric, not an ordering.
    ///
    /// Identical paths are duplicates without further checks (a record is
    /// always a duplicate of itself). Otherwise all of file size, format,
    /// dimensions, and content hash must match. Modification time never
    /// participates.
    pub fn is_duplicate_of(&self, other: &ImageRecord) -> bool {
        if self.path == other.path {
            return true;
        }
        self.file_size == other.file_size
            && self.format == other.format
            && self.width == other.width
            && self.height == other.height
            && self.content_hash == other.content_hash
    }

    fn short_name(&self) -> String {
        let full = self.path.to_string_lossy();
        let count = full.chars().count();
        if count <= 23 {
            full.into_owned()
        } else {
            let tail: String = full.chars().skip(count - 20).collect();
            format!("...{}", tail)
        }
    }
}

impl Display for ImageRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}x{}:{}]:<{}>:{}b",
            self.short_name(),
            self.width,
            self.height,
            self.format,
            hex::encode(&self.content_hash[..4]),
            self.file_size,
        )
    }
}

/// Errors from fingerprinting a single file. Callers treat both variants
/// as "skip this file"; neither ever aborts a directory pass.
#[derive(Debug)]
pub enum FingerprintError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    UnsupportedFormat(PathBuf),
}

impl Display for FingerprintError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => {
                write!(f, "io error for {}: {}", path.display(), source)
            }
            Self::UnsupportedFormat(path) => {
                write!(f, "{} is not a recognized image", path.display())
            }
        }
    }
}

impl Error for FingerprintError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Fingerprints the file at `path` into an [`ImageRecord`].
///
/// Decodes only the image header for format and dimensions, then hashes
/// the full byte stream with SHA-256. O(file size) per file.
pub fn analyze(path: &Path) -> Result<ImageRecord, FingerprintError> {
    let metadata = fs::metadata(path).map_err(|source| FingerprintError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let modified = metadata.modified().map_err(|source| FingerprintError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let bytes = fs::read(path).map_err(|source| FingerprintError::Io {
        source,
        path: path.to_path_buf(),
    })?;

    let reader = image::ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|source| FingerprintError::Io {
            source,
            path: path.to_path_buf(),
        })?;
    let format = reader
        .format()
        .ok_or_else(|| FingerprintError::UnsupportedFormat(path.to_path_buf()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|_| FingerprintError::UnsupportedFormat(path.to_path_buf()))?;
    if width == 0 || height == 0 {
        return Err(FingerprintError::UnsupportedFormat(path.to_path_buf()));
    }

    Ok(ImageRecord {
        path: path.to_path_buf(),
        format: format_name(format).to_string(),
        width,
        height,
        content_hash: Sha256::digest(&bytes).into(),
        file_size: metadata.len(),
        modified,
    })
}

fn format_name(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}
