// ============================================================
// Layer 6 — Evaluation Metrics
// ============================================================
// Holds the result of one evaluation pass, writes it to the
// log, and appends it as a row to a CSV file.
//
// Output file: <checkpoint_path>/metrics.csv
//
// Example CSV output:
//   epoch,batch,loss,accuracy,precision_0,recall_0,precision_1,recall_1,precision_2,recall_2
//   0,0,1.102311,0.333333,NaN,0.000000,0.333333,1.000000,NaN,0.000000
//   0,1000,0.412007,0.871250,0.880102,0.861000,0.850739,0.901244,0.884615,0.850000
//
// NaN cells are classes that were never predicted (precision)
// or never present (recall) in that pass.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::{
    confusion::ConfusionMatrix,
    example::{class_name, NUM_CLASSES},
};

/// Aggregate result of one pass over the evaluation split.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    /// Sum of per-batch mean losses divided by the number of batches
    pub mean_loss: f64,
    /// correct / total over every evaluated example
    pub accuracy:  f64,
    /// Number of batches the loss was averaged over
    pub batches:   usize,
    pub matrix:    ConfusionMatrix,
}

impl EvalReport {
    pub fn examples(&self) -> u64 {
        self.matrix.total()
    }

    pub fn precision(&self, class: usize) -> f64 {
        self.matrix.precision(class)
    }

    pub fn recall(&self, class: usize) -> f64 {
        self.matrix.recall(class)
    }

    /// Write the metrics block to the log.
    pub fn log_summary(&self) {
        tracing::info!("eval on {} examples in {} batches", self.examples(), self.batches);
        tracing::info!("eval loss: {}", self.mean_loss);
        tracing::info!("eval accu: {}", self.accuracy);
        tracing::info!("confusion matrix (rows = true, cols = predicted):");
        for line in self.matrix.row_lines() {
            tracing::info!("{}", line);
        }
        for c in 0..NUM_CLASSES {
            tracing::info!(
                "{} precision {} recall {}",
                class_name(c),
                self.precision(c),
                self.recall(c),
            );
        }
    }
}

/// Appends evaluation reports to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory if needed and write the CSV header
    /// when the file does not exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{}", Self::header())?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    fn header() -> String {
        let mut cols = vec!["epoch".to_string(), "batch".into(), "loss".into(), "accuracy".into()];
        for c in 0..NUM_CLASSES {
            cols.push(format!("precision_{c}"));
            cols.push(format!("recall_{c}"));
        }
        cols.join(",")
    }

    /// Append one row for the evaluation run at (epoch, batch).
    pub fn log(&self, epoch: usize, batch: usize, report: &EvalReport) -> Result<()> {
        let mut row = format!("{epoch},{batch},{:.6},{:.6}", report.mean_loss, report.accuracy);
        for c in 0..NUM_CLASSES {
            row.push_str(&format!(",{:.6},{:.6}", report.precision(c), report.recall(c)));
        }

        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{row}")?;

        tracing::debug!("Logged eval metrics for epoch {} batch {}", epoch, batch);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
