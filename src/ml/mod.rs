// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that builds, trains or runs the network.
//
//   model.rs     — BERT-shaped encoder with a 3-way head
//   device.rs    — host / accelerator selection
//   trainer.rs   — AdamW training loop with periodic
//                  evaluation and checkpointing
//   evaluator.rs — inference-mode pass over a split:
//                  loss, accuracy, confusion matrix
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Devlin et al. (2019) BERT

/// Transformer encoder classifier
pub mod model;

/// Backend selection
pub mod device;

/// Training loop
pub mod trainer;

/// Evaluation procedure
pub mod evaluator;
