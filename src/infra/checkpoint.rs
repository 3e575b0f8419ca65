// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Writes model weights during training using Burn's
// BinFileRecorder (full precision, no metadata header).
//
// File naming convention:
//   <checkpoint_path>/
//     checkpoint-epoch0-batch1000.bin
//     checkpoint-epoch0-batch2000.bin
//     checkpoint-epoch1-batch1000.bin
//     ...
//     train_config.json     ← resolved configuration of the run
//
// Checkpoints are write-only during training. The only read path
// is `load_pretrained`, which seeds a freshly initialised model
// with encoder weights before the first step.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{BinFileRecorder, FullPrecisionSettings, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::TextClassifier;

const CHECKPOINT_EXTENSION: &str = "bin";

/// `checkpoint-epoch{epoch}-batch{batch}` — the recorder adds `.bin`.
fn checkpoint_stem(epoch: usize, batch: usize) -> String {
    format!("checkpoint-epoch{epoch}-batch{batch}")
}

/// Final on-disk file name for a checkpoint.
pub fn checkpoint_file_name(epoch: usize, batch: usize) -> String {
    format!("{}.{CHECKPOINT_EXTENSION}", checkpoint_stem(epoch, batch))
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory (and parents) if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Snapshot every parameter of `model`. Returns the written path.
    pub fn save_checkpoint<B: Backend>(
        &self,
        model: &TextClassifier<B>,
        epoch: usize,
        batch: usize,
    ) -> Result<PathBuf> {
        let stem = self.dir.join(checkpoint_stem(epoch, batch));

        BinFileRecorder::<FullPrecisionSettings>::new()
            .record(model.clone().into_record(), stem.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", stem.display()))?;

        let path = self.dir.join(checkpoint_file_name(epoch, batch));
        tracing::debug!("Saved checkpoint '{}'", path.display());
        Ok(path)
    }

    /// Load a full-precision binary record into `model`.
    ///
    /// The record must come from the same architecture or loading fails.
    pub fn load_pretrained<B: Backend>(
        &self,
        model:  TextClassifier<B>,
        path:   &Path,
        device: &B::Device,
    ) -> Result<TextClassifier<B>> {
        tracing::info!("Loading pretrained weights from '{}'", path.display());

        let record = BinFileRecorder::<FullPrecisionSettings>::new()
            .load(path.to_path_buf(), device)
            .with_context(|| format!("Cannot load pretrained weights '{}'", path.display()))?;

        Ok(model.load_record(record))
    }

    /// Save the resolved training configuration next to the checkpoints.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::tiny_config;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn logits(model: &TextClassifier<TestBackend>, device: &<TestBackend as Backend>::Device) -> Vec<f32> {
        let ids  = Tensor::<TestBackend, 1, Int>::from_ints([1, 4, 2, 0], device).reshape([1, 4]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 0], device).reshape([1, 4]);
        let tt   = Tensor::<TestBackend, 2, Int>::zeros([1, 4], device);
        model.forward(ids, mask, tt).into_data().iter::<f32>().collect()
    }

    #[test]
    fn test_checkpoint_file_name() {
        assert_eq!(checkpoint_file_name(2, 3000), "checkpoint-epoch2-batch3000.bin");
        assert_eq!(checkpoint_file_name(0, 1000), "checkpoint-epoch0-batch1000.bin");
    }

    #[test]
    fn test_new_creates_nested_directory() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/ckpt");
        CheckpointManager::new(&path).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn test_save_writes_named_file() {
        let dir    = tempfile::tempdir().unwrap();
        let mgr    = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let model  = tiny_config(8).init::<TestBackend>(&device);

        let path = mgr.save_checkpoint(&model, 2, 3000).unwrap();
        assert_eq!(path, dir.path().join("checkpoint-epoch2-batch3000.bin"));
        assert!(path.is_file());
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_pretrained_weights_restore_parameters() {
        let dir    = tempfile::tempdir().unwrap();
        let mgr    = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let source = tiny_config(8).init::<TestBackend>(&device);
        let path   = mgr.save_checkpoint(&source, 0, 1).unwrap();

        let fresh  = tiny_config(8).init::<TestBackend>(&device);
        let loaded = mgr.load_pretrained(fresh, &path, &device).unwrap();

        let expected = logits(&source, &device);
        let actual   = logits(&loaded, &device);
        for (a, b) in expected.iter().zip(&actual) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_pretrained_file_is_error() {
        let dir    = tempfile::tempdir().unwrap();
        let mgr    = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let model  = tiny_config(8).init::<TestBackend>(&device);
        assert!(mgr.load_pretrained(model, &dir.path().join("missing.bin"), &device).is_err());
    }
}
