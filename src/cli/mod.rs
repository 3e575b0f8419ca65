// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with `clap` and hands the loaded
// configuration to Layer 2. There is one action: train.
//
//   textcls                      → reads ./config.yaml
//   textcls --config run.yaml    → reads run.yaml
//
// Reference: Rust Book §12 (CLI programs)

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::application::train_use_case::TrainUseCase;
use crate::infra::config_loader::load_config;

#[derive(Parser, Debug)]
#[command(
    name = "textcls",
    version,
    about = "Fine-tune a transformer encoder as a three-class text classifier."
)]
pub struct Cli {
    /// YAML run configuration
    #[arg(long, short, default_value = "config.yaml")]
    pub config: PathBuf,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config  = load_config(&self.config)?;
        let summary = TrainUseCase::new(config).execute()?;

        tracing::info!(
            "Finished: {} steps, {} evaluations, {} checkpoints",
            summary.steps,
            summary.evaluations.len(),
            summary.checkpoints.len(),
        );
        if let Some(last) = summary.evaluations.last() {
            tracing::info!(
                "Last evaluation (epoch {} batch {}): loss {} accuracy {}",
                last.epoch,
                last.batch,
                last.report.mean_loss,
                last.report.accuracy,
            );
        }
        Ok(())
    }
}
