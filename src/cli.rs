use spotkeep_core::{ResolveMode, ThreadingMode, ValidationPolicy};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
spotkeep - collects, validates, and deduplicates lock-screen images

Usage: spotkeep [SOURCE] [TARGET] [flags]

  --source=DIR        source directory (default: the Windows Spotlight
                      asset cache under the local data directory)
  --target=DIR        target directory (default: Pictures/Spotlight)
  --no-landscape      drop the default landscape preference
  --portrait          prefer portrait images
  --width=N           only accept images with this exact width (0 = any)
  --height=N          only accept images with this exact height (0 = any)
  --copy-small        also accept images at or under 150x150
  --dedup             delete duplicate images found in the target
  --validate-clean    delete target images that fail validation
  --pairwise          use the historical pairwise duplicate scan
  --no-thread         fingerprint files sequentially
  --log-file=FILE     append log output to FILE instead of stderr
  --report=FILE       write a JSON run report to FILE
  --quiet             no progress bar or summary
  --help              print this help
  --version           print the version";

#[derive(Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub policy: ValidationPolicy,
    pub threading: ThreadingMode,
    pub resolve_mode: ResolveMode,
    pub remove_duplicates: bool,
    pub purge_invalid: bool,
    pub log_file: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub quiet: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    Help,
    Version,
    MissingSource,
    MissingTarget,
    InvalidFlag(String),
    InvalidValue { flag: String, value: String },
}

impl CliConfig {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_iter(env::args().skip(1))
    }

    pub fn from_iter<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut source: Option<PathBuf> = None;
        let mut target: Option<PathBuf> = None;
        let mut threading = ThreadingMode::Parallel;
        let mut resolve_mode = ResolveMode::Grouped;
        let mut remove_duplicates = false;
        let mut purge_invalid = false;
        let mut log_file: Option<PathBuf> = None;
        let mut report: Option<PathBuf> = None;
        let mut quiet = false;
        let mut policy = ValidationPolicy {
            // The historical default: landscape images preferred.
            prefer_landscape: true,
            ..ValidationPolicy::default()
        };

        for arg in args {
            if arg.starts_with("--") {
                match arg.as_str() {
                    "--help" => return Err(CliError::Help),
                    "--version" => return Err(CliError::Version),
                    "--no-landscape" => {
                        policy.prefer_landscape = false;
                        continue;
                    }
                    "--portrait" => {
                        policy.prefer_portrait = true;
                        continue;
                    }
                    "--copy-small" => {
                        policy.allow_small = true;
                        continue;
                    }
                    "--dedup" => {
                        remove_duplicates = true;
                        continue;
                    }
                    "--validate-clean" => {
                        purge_invalid = true;
                        continue;
                    }
                    "--pairwise" => {
                        resolve_mode = ResolveMode::Pairwise;
                        continue;
                    }
                    "--no-thread" => {
                        threading = ThreadingMode::Sequential;
                        continue;
                    }
                    "--quiet" => {
                        quiet = true;
                        continue;
                    }
                    _ => {}
                }
                if let Some(value) = arg.strip_prefix("--source=") {
                    source = Some(PathBuf::from(value));
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--target=") {
                    target = Some(PathBuf::from(value));
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--width=") {
                    policy.exact_width = parse_dimension("--width", value)?;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--height=") {
                    policy.exact_height = parse_dimension("--height", value)?;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--log-file=") {
                    log_file = Some(PathBuf::from(value));
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--report=") {
                    report = Some(PathBuf::from(value));
                    continue;
                }
                return Err(CliError::InvalidFlag(arg));
            }

            if source.is_none() {
                source = Some(PathBuf::from(&arg));
                continue;
            }
            if target.is_none() {
                target = Some(PathBuf::from(&arg));
                continue;
            }
            return Err(CliError::InvalidFlag(arg));
        }

        let source = source
            .or_else(default_source_dir)
            .ok_or(CliError::MissingSource)?;
        let target = target
            .or_else(default_target_dir)
            .ok_or(CliError::MissingTarget)?;

        Ok(Self {
            source,
            target,
            policy,
            threading,
            resolve_mode,
            remove_duplicates,
            purge_invalid,
            log_file,
            report,
            quiet,
        })
    }
}

fn parse_dimension(flag: &str, value: &str) -> Result<Option<u32>, CliError> {
    let parsed: u32 = value.parse().map_err(|_| CliError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })?;
    // 0 keeps the historical "ignore this dimension" meaning.
    Ok(if parsed == 0 { None } else { Some(parsed) })
}

fn default_source_dir() -> Option<PathBuf> {
    let mut dir = dirs::data_local_dir()?;
    dir.push("Packages");
    dir.push("Microsoft.Windows.ContentDeliveryManager_cw5n1h2txyewy");
    dir.push("LocalState");
    dir.push("Assets");
    Some(dir)
}

fn default_target_dir() -> Option<PathBuf> {
    let mut dir = dirs::picture_dir().or_else(dirs::home_dir)?;
    dir.push("Spotlight");
    Some(dir)
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Help => write!(f, "{}", USAGE),
            Self::Version => write!(f, "spotkeep {}", VERSION),
            Self::MissingSource => write!(f, "source directory argument is required"),
            Self::MissingTarget => write!(f, "target directory argument is required"),
            Self::InvalidFlag(flag) => write!(f, "unrecognized argument: {}", flag),
            Self::InvalidValue { flag, value } => {
                write!(f, "invalid value for {}: {}", flag, value)
            }
        }
    }
}

impl Error for CliError {}
