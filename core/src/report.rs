use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Counts gathered over one pipeline run, suitable for serialisation.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct RunReport {
    pub scanned: usize,
    pub skipped: usize,
    pub copied: usize,
    pub copy_failures: usize,
    pub duplicates_found: usize,
    pub duplicates_removed: usize,
    pub invalid_found: usize,
    pub invalid_removed: usize,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: String,
    #[serde(flatten)]
    report: &'a RunReport,
}

#[derive(Debug)]
pub enum ReportingError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl Display for ReportingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {}", error),
            Self::Serialization(error) => write!(f, "serialization error: {}", error),
        }
    }
}

impl Error for ReportingError {}

pub fn print_summary(report: &RunReport) {
    println!("Source scan:");
    println!("  cataloged : {}", report.scanned);
    println!("  copied    : {}", report.copied);
    println!("  skipped   : {}", report.skipped);
    if report.copy_failures > 0 {
        println!("  copy errs : {}", report.copy_failures);
    }
    println!("Target reconciliation:");
    println!("  duplicates: {}", report.duplicates_found);
    println!("  removed   : {}", report.duplicates_removed);
    println!("  invalid   : {}", report.invalid_found);
    println!("  purged    : {}", report.invalid_removed);
}

pub fn write_json(report: &RunReport, output_path: &Path) -> Result<(), ReportingError> {
    let document = ReportDocument {
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
        report,
    };
    let file = File::create(output_path).map_err(ReportingError::Io)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &document).map_err(ReportingError::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_report_document() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("report.json");
        let report = RunReport {
            scanned: 12,
            skipped: 3,
            copied: 9,
            duplicates_found: 2,
            duplicates_removed: 2,
            ..RunReport::default()
        };

        write_json(&report, &output).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["scanned"], 12);
        assert_eq!(value["copied"], 9);
        assert_eq!(value["duplicates_removed"], 2);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn write_to_missing_directory_reports_io_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("absent").join("report.json");
        let result = write_json(&RunReport::default(), &output);
        assert!(matches!(result, Err(ReportingError::Io(_))));
    }
}
