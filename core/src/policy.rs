//! Acceptance rules applied to cataloged images.
//!
//! Orientation quirks of the historical tool are preserved exactly:
//! portrait preference rejects records with height > width, and when
//! both preferences are set the landscape rule wins (the portrait check
//! is skipped once landscape matched).

use crate::fingerprint::ImageRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Width at or under which an image counts as "small".
pub const DEFAULT_MIN_WIDTH: u32 = 150;

/// Height at or under which an image counts as "small".
pub const DEFAULT_MIN_HEIGHT: u32 = 150;

/// Acceptance rules for one run. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub min_width: u32,
    pub min_height: u32,
    /// `None` means "any width" (the historical `0 = ignore`).
    pub exact_width: Option<u32>,
    /// `None` means "any height".
    pub exact_height: Option<u32>,
    pub prefer_landscape: bool,
    pub prefer_portrait: bool,
    pub allow_small: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            exact_width: None,
            exact_height: None,
            prefer_landscape: false,
            prefer_portrait: false,
            allow_small: false,
        }
    }
}

/// Typed rejection reason. Drives a log line in the caller; never a
/// program-terminating error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    HeightMismatch {
        actual: u32,
        expected: u32,
    },
    WidthMismatch {
        actual: u32,
        expected: u32,
    },
    NotLandscape {
        width: u32,
        height: u32,
    },
    NotPortrait {
        width: u32,
        height: u32,
    },
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooSmall {
                width,
                height,
                min_width,
                min_height,
            } => write!(
                f,
                "image {}x{} at or below minimum {}x{}",
                width, height, min_width, min_height
            ),
            Self::HeightMismatch { actual, expected } => {
                write!(f, "height {} != expected {}", actual, expected)
            }
            Self::WidthMismatch { actual, expected } => {
                write!(f, "width {} != expected {}", actual, expected)
            }
            Self::NotLandscape { width, height } => {
                write!(f, "{}x{} not landscape", width, height)
            }
            Self::NotPortrait { width, height } => {
                write!(f, "{}x{} not portrait", width, height)
            }
        }
    }
}

impl Error for Rejection {}

/// Applies `policy` to one record.
pub fn validate(record: &ImageRecord, policy: &ValidationPolicy) -> Result<(), Rejection> {
    if !policy.allow_small
        && record.width <= policy.min_width
        && record.height <= policy.min_height
    {
        return Err(Rejection::TooSmall {
            width: record.width,
            height: record.height,
            min_width: policy.min_width,
            min_height: policy.min_height,
        });
    }

    if let Some(expected) = policy.exact_height {
        if record.height != expected {
            return Err(Rejection::HeightMismatch {
                actual: record.height,
                expected,
            });
        }
    }

    if let Some(expected) = policy.exact_width {
        if record.width != expected {
            return Err(Rejection::WidthMismatch {
                actual: record.width,
                expected,
            });
        }
    }

    if policy.prefer_landscape || policy.prefer_portrait {
        if policy.prefer_landscape {
            if record.width < record.height {
                return Err(Rejection::NotLandscape {
                    width: record.width,
                    height: record.height,
                });
            }
            // Landscape matched; the portrait check is skipped even when
            // both preferences are set.
        } else if record.height > record.width {
            return Err(Rejection::NotPortrait {
                width: record.width,
                height: record.height,
            });
        }
    }

    Ok(())
}
