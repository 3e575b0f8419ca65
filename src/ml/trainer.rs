// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fixed-epoch mini-batch training with AdamW.
//
// Per step (epoch e, batch index i within the epoch):
//   forward → cross-entropy → backward → optimiser step
//   i % log_every  == 0 && i > 0 → progress line with the step loss
//   i % eval_every == 0          → evaluate on the eval split
//                                  (i == 0 included: a sanity check
//                                   right after the first step)
//        and i > 0               → also write
//                                  checkpoint-epoch{e}-batch{i}.bin
//
// Training uses Autodiff<_>; evaluation runs on model.valid(),
// i.e. the same weights on the inner backend with no gradient
// tracking and no dropout. The autodiff model itself is never
// switched, so training mode resumes as soon as eval returns.
//
// Any error in a step ends the run; there are no retries.

use anyhow::Result;
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use std::path::PathBuf;

use crate::data::{batcher::ClassificationBatcher, dataset::ExampleStore};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EvalReport, MetricsLogger},
};
use crate::ml::{evaluator::evaluate, model::TextClassifier};

/// Loop hyperparameters taken from the run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSchedule {
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    pub log_every:     usize,
    pub eval_every:    usize,
    pub seed:          u64,
}

/// One evaluation triggered during training.
#[derive(Debug, Clone)]
pub struct EvalRecord {
    pub epoch:  usize,
    pub batch:  usize,
    pub report: EvalReport,
}

/// What a finished run did.
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub steps:       usize,
    pub evaluations: Vec<EvalRecord>,
    pub checkpoints: Vec<PathBuf>,
}

pub fn run_training<B: AutodiffBackend>(
    schedule:    &TrainingSchedule,
    mut model:   TextClassifier<B>,
    train_set:   ExampleStore,
    eval_set:    ExampleStore,
    checkpoints: &CheckpointManager,
    metrics:     &MetricsLogger,
    device:      &B::Device,
) -> Result<(TextClassifier<B>, TrainingSummary)> {
    let batches_per_epoch = train_set.len().div_ceil(schedule.batch_size);

    tracing::info!("***** Running training *****");
    tracing::info!("  Num train examples = {}", train_set.len());
    tracing::info!("  Num eval examples = {}", eval_set.len());
    tracing::info!("  Num Epochs = {}", schedule.epochs);
    tracing::info!("  Batch size = {}", schedule.batch_size);
    tracing::info!("  Learning rate = {}", schedule.learning_rate);
    tracing::info!("  Metrics CSV = {}", metrics.csv_path().display());

    // ── Training data loader (AutodiffBackend, reshuffled every epoch) ───────
    let train_loader = DataLoaderBuilder::new(ClassificationBatcher::<B>::new(device.clone()))
        .batch_size(schedule.batch_size)
        .shuffle(schedule.seed)
        .build(train_set);

    // ── Evaluation data loader (InnerBackend — no autodiff overhead) ─────────
    let eval_loader = DataLoaderBuilder::new(ClassificationBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(schedule.batch_size)
        .build(eval_set);

    // torch AdamW defaults
    let mut optim = AdamWConfig::new()
        .with_epsilon(1e-8)
        .with_weight_decay(0.01)
        .init();

    let mut summary = TrainingSummary::default();

    for epoch in 0..schedule.epochs {
        for (index, batch) in train_loader.iter().enumerate() {
            let output = model.forward_loss(batch);
            let loss   = output.loss.clone().into_scalar().elem::<f64>();

            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(schedule.learning_rate, model, grads);
            summary.steps += 1;

            if index % schedule.log_every == 0 && index > 0 {
                tracing::info!(
                    "train epoch {}/{} batch {}/{} loss {}",
                    epoch, schedule.epochs, index, batches_per_epoch, loss,
                );
            }

            if index % schedule.eval_every == 0 {
                let report = evaluate(&model.valid(), eval_loader.iter());
                metrics.log(epoch, index, &report)?;

                if index > 0 {
                    let path = checkpoints.save_checkpoint(&model, epoch, index)?;
                    tracing::info!("Saved checkpoint '{}'", path.display());
                    summary.checkpoints.push(path);
                }
                summary.evaluations.push(EvalRecord { epoch, batch: index, report });
            }
        }
    }

    tracing::info!("Training complete after {} steps", summary.steps);
    Ok((model, summary))
}
