// ============================================================
// Layer 5 — Evaluation Procedure
// ============================================================
// Runs the classifier over an evaluation batch stream and builds
// an EvalReport:
//
//   mean_loss = Σ batch_loss / number_of_batches
//               (a mean of batch means; a smaller final batch
//                weighs as much as a full one)
//   accuracy  = trace / total of the matrix
//   matrix    = confusion counts, rows = true, cols = predicted
//
// The caller passes an inference-mode model (`model.valid()`),
// so no gradients are tracked and dropout is inactive. A fresh
// matrix is created per call.

use burn::{prelude::*, tensor::ElementConversion};

use crate::data::batcher::ClassificationBatch;
use crate::domain::confusion::ConfusionMatrix;
use crate::infra::metrics::EvalReport;
use crate::ml::model::TextClassifier;

pub fn evaluate<B, I>(model: &TextClassifier<B>, batches: I) -> EvalReport
where
    B: Backend,
    I: IntoIterator<Item = ClassificationBatch<B>>,
{
    tracing::info!("Running evaluation");

    let mut loss_sum    = 0.0f64;
    let mut num_batches = 0usize;
    let mut matrix      = ConfusionMatrix::new();

    for batch in batches {
        let output = model.forward_loss(batch);
        loss_sum    += output.loss.into_scalar().elem::<f64>();
        num_batches += 1;

        // argmax(1) returns shape [batch, 1] — flatten to [batch]
        let predicted: Vec<i64> = output
            .logits
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data()
            .iter::<i64>()
            .collect();
        let truth: Vec<i64> = output.labels.into_data().iter::<i64>().collect();

        for (&t, &p) in truth.iter().zip(&predicted) {
            matrix.record(t as usize, p as usize);
        }
    }

    let report = EvalReport {
        mean_loss: loss_sum / num_batches as f64,
        accuracy:  matrix.accuracy(),
        batches:   num_batches,
        matrix,
    };
    report.log_summary();
    report
}
