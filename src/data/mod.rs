// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from labelled text files to tensor batches.
//
//   train.txt / eval.txt / test.txt
//       │
//       ▼
//   RecordFormat        → splits "<text><sep><label>" positionally
//       │
//       ▼
//   DatasetConstructor  → tokenises each line to a fixed length
//       │
//       ▼
//   ExampleStore        → implements Burn's Dataset trait
//       │
//       ▼
//   ClassificationBatcher → stacks examples into tensor batches
//       │
//       ▼
//   DataLoader          → feeds (shuffled) batches to the trainer
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Positional `<text><sep><label>` line format
pub mod record;

/// Reads labelled files into tokenised datasets
pub mod constructor;

/// Implements Burn's Dataset trait for tokenised examples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
