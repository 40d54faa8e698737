//! JSON persistence of results and summaries

use std::path::{Path, PathBuf};

use bizbench_core::error::BenchResult;
use chrono::Utc;
use tracing::info;

use crate::metrics::{RunResult, Summary};

/// Paths produced by one report write
#[derive(Debug, Clone)]
pub struct ReportPaths {
    /// Full result set, one entry per attempted unit
    pub results: PathBuf,
    /// The aggregated summary
    pub summary: PathBuf,
}

/// Writes benchmark output as pretty-printed JSON files
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer targeting the given directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Persist the result set and summary under timestamped file names
    pub fn write(&self, results: &[RunResult], summary: &Summary) -> BenchResult<ReportPaths> {
        std::fs::create_dir_all(&self.output_dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let results_path = self.output_dir.join(format!("results_{timestamp}.json"));
        let summary_path = self.output_dir.join(format!("summary_{timestamp}.json"));

        std::fs::write(&results_path, serde_json::to_string_pretty(results)?)?;
        std::fs::write(&summary_path, serde_json::to_string_pretty(summary)?)?;

        info!(
            results = %results_path.display(),
            summary = %summary_path.display(),
            "wrote benchmark reports"
        );

        Ok(ReportPaths {
            results: results_path,
            summary: summary_path,
        })
    }

    /// The configured output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Render a summary as a JSON string
pub fn render_summary(summary: &Summary) -> BenchResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SummaryAggregator;
    use std::collections::HashMap;

    #[test]
    fn written_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let summary = SummaryAggregator::new(HashMap::new()).aggregate(&[], &HashMap::new());

        let paths = ReportWriter::new(dir.path())
            .write(&[], &summary)
            .unwrap();

        let raw = std::fs::read_to_string(&paths.summary).unwrap();
        let parsed: Summary = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.attempted_runs, 0);

        let raw = std::fs::read_to_string(&paths.results).unwrap();
        let parsed: Vec<RunResult> = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_empty());
    }
}
