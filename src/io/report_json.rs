//! Read/write fit report JSON files.
//!
//! The report is the portable record of a `fit` run: sample statistics, every
//! candidate family with its parameters and error, and the selected family.
//! `distfit plot` re-renders a report without refitting. The schema is
//! `domain::FitReport`.

use std::fs::File;
use std::path::Path;

use crate::domain::FitReport;
use crate::error::AppError;

pub fn write_fit_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

pub fn read_fit_json(path: &Path) -> Result<FitReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: FitReport =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CandidateFit, DistributionKind, DistributionSpec, SampleStats};
    use chrono::Utc;

    #[test]
    fn report_survives_a_file_round_trip() {
        let best = CandidateFit {
            distribution: DistributionSpec::new(DistributionKind::Weibull, vec![1.5, 2.0]),
            error: 1.25e-4,
        };
        let report = FitReport {
            tool: "distfit".to_string(),
            generated_at: Utc::now(),
            quantile_range: (0.05, 0.95),
            partitions: 20,
            samples: SampleStats::from_samples(&[1.0, 3.0, 5.0]).unwrap(),
            candidates: vec![best.clone()],
            skipped: Vec::new(),
            best,
        };
        let path = std::env::temp_dir().join(format!("distfit-report-{}.json", std::process::id()));
        write_fit_json(&path, &report).unwrap();
        assert_eq!(read_fit_json(&path).unwrap(), report);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_invalid_input() {
        let err = read_fit_json(Path::new("/nonexistent/report.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
