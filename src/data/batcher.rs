// ============================================================
// Layer 4 — Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<Example> into
// tensors for one forward pass.
//
//   Input:  N Examples, each with sequences of length S
//   Output: ClassificationBatch with [N, S] token tensors and
//           an [N] label vector
//
// All sequences were padded to the same length when the
// dataset was built, so stacking is a flatten + reshape:
//   [e1_t1, ..., e1_tS, e2_t1, ..., eN_tS] → [N, S]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::example::Example;

// ─── ClassificationBatch ─────────────────────────────────────────────────────
/// A batch of examples ready for the classifier forward pass.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token IDs — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Segment IDs — shape: [batch_size, seq_len]
    pub token_type_ids: Tensor<B, 2, Int>,

    /// Ground truth class index per example — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── ClassificationBatcher ───────────────────────────────────────────────────
/// Holds the target device so tensors are created on the
/// configured host or accelerator.
#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn stack(&self, rows: Vec<i32>, batch_size: usize, seq_len: usize) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints(rows.as_slice(), &self.device)
            .reshape([batch_size, seq_len])
    }
}

impl<B: Backend> Batcher<Example, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<Example>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|e| e.input_ids.len()).unwrap_or(0);

        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|e| e.input_ids.iter().map(|&x| x as i32))
            .collect();
        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|e| e.attention_mask.iter().map(|&x| x as i32))
            .collect();
        let type_flat: Vec<i32> = items
            .iter()
            .flat_map(|e| e.token_type_ids.iter().map(|&x| x as i32))
            .collect();

        let input_ids      = self.stack(input_flat, batch_size, seq_len);
        let attention_mask = self.stack(mask_flat, batch_size, seq_len);
        let token_type_ids = self.stack(type_flat, batch_size, seq_len);

        let labels: Vec<i32> = items.iter().map(|e| e.label as i32).collect();
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ClassificationBatch { input_ids, attention_mask, token_type_ids, labels }
    }
}
