// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Filesystem-facing concerns shared by the other layers:
//
//   config_loader.rs   — reads and validates config.yaml
//   tokenizer_store.rs — loads tokenizer.json and pins it to a
//                        fixed sequence length
//   bert_weights.rs    — copies a HuggingFace BERT checkpoint
//                        (model.safetensors) into the encoder
//   checkpoint.rs      — writes weight snapshots and the
//                        resolved config, loads pretrained
//                        weights
//   metrics.rs         — evaluation reports and metrics.csv
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// YAML configuration loading
pub mod config_loader;

/// Pretrained encoder weights from safetensors
pub mod bert_weights;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Fixed-length tokenizer
pub mod tokenizer_store;

/// Evaluation report and CSV logger
pub mod metrics;
