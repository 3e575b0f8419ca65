// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one fine-tuning run in order:
//
//   Step 1: Resolve the compute device      (Layer 5 - ml)
//   Step 2: Load the tokenizer              (Layer 6 - infra)
//   Step 3: Build train / eval / test sets  (Layer 4 - data)
//   Step 4: Build the classifier and copy   (Layer 5 - ml,
//           in the pretrained encoder        Layer 6 - infra)
//   Step 5: Save the resolved config        (Layer 6 - infra)
//   Step 6: Run the training loop           (Layer 5 - ml)
//
// The test split is built and counted but not consumed by the
// loop; a bad line in it still fails the run before training.

use anyhow::Result;
use burn::{
    backend::{Autodiff, NdArray},
    tensor::backend::{AutodiffBackend, Backend},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{constructor::DatasetConstructor, record::RecordFormat};
use crate::infra::{
    bert_weights::{load_bert_weights, weights_path},
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::{
    device::ComputeDevice,
    model::{TextClassifier, TextClassifierConfig},
    trainer::{run_training, TrainingSchedule, TrainingSummary},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Read from config.yaml. The upper-case keys keep the names the
// existing config files use; everything below `checkpoint_path`
// is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    #[serde(rename = "CURRENT_DIR")]
    pub current_dir:     PathBuf,
    #[serde(rename = "TRAIN_DIR")]
    pub train_dir:       PathBuf,
    #[serde(rename = "EVAL_DIR")]
    pub eval_dir:        PathBuf,
    #[serde(rename = "TEST_DIR")]
    pub test_dir:        PathBuf,
    pub bert_model_path: PathBuf,
    pub batch_size:      usize,
    #[serde(rename = "LR")]
    pub lr:              f64,
    #[serde(rename = "EPOCH")]
    pub epochs:          usize,
    #[serde(default)]
    pub use_cuda:        bool,
    pub checkpoint_path: PathBuf,

    #[serde(default = "default_max_length")]
    pub max_length:         usize,
    #[serde(default = "default_log_every")]
    pub log_every:          usize,
    #[serde(default = "default_eval_every")]
    pub eval_every:         usize,
    #[serde(default)]
    pub seed:               Option<u64>,
    #[serde(default)]
    pub record_format:      RecordFormat,
    #[serde(default)]
    pub pretrained_weights: Option<PathBuf>,
    #[serde(default)]
    pub model:              EncoderSettings,
}

fn default_max_length() -> usize { 20 }
fn default_log_every() -> usize { 10 }
fn default_eval_every() -> usize { 1000 }

/// Encoder hyperparameters. Defaults are BERT-base and must match
/// the checkpoint in `bert_model_path` when one is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub hidden_size:       usize,
    pub num_heads:         usize,
    pub num_layers:        usize,
    pub intermediate_size: usize,
    pub max_position:      usize,
    pub type_vocab_size:   usize,
    pub dropout:           f64,
    pub layer_norm_eps:    f64,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            hidden_size:       768,
            num_heads:         12,
            num_layers:        12,
            intermediate_size: 3072,
            max_position:      512,
            type_vocab_size:   2,
            dropout:           0.1,
            layer_norm_eps:    1e-12,
        }
    }
}

impl EncoderSettings {
    pub fn to_model_config(&self, vocab_size: usize) -> TextClassifierConfig {
        TextClassifierConfig::new(vocab_size)
            .with_hidden_size(self.hidden_size)
            .with_num_heads(self.num_heads)
            .with_num_layers(self.num_layers)
            .with_intermediate_size(self.intermediate_size)
            .with_max_position(self.max_position)
            .with_type_vocab_size(self.type_vocab_size)
            .with_dropout(self.dropout)
            .with_layer_norm_eps(self.layer_norm_eps)
    }
}

impl TrainConfig {
    pub fn train_file(&self) -> PathBuf { self.current_dir.join(&self.train_dir) }
    pub fn eval_file(&self) -> PathBuf { self.current_dir.join(&self.eval_dir) }
    pub fn test_file(&self) -> PathBuf { self.current_dir.join(&self.test_dir) }

    /// Loop hyperparameters with a concrete seed.
    pub fn schedule(&self, seed: u64) -> TrainingSchedule {
        TrainingSchedule {
            epochs:        self.epochs,
            batch_size:    self.batch_size,
            learning_rate: self.lr,
            log_every:     self.log_every,
            eval_every:    self.eval_every,
            seed,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Pick the backend once and run the whole pipeline on it.
    pub fn execute(&self) -> Result<TrainingSummary> {
        match ComputeDevice::resolve(self.config.use_cuda) {
            ComputeDevice::Host => {
                tracing::info!("Using host backend (ndarray)");
                self.run::<Autodiff<NdArray>>(&Default::default())
            }
            ComputeDevice::Accelerator => self.run_accelerator(),
        }
    }

    #[cfg(feature = "wgpu")]
    fn run_accelerator(&self) -> Result<TrainingSummary> {
        use burn::backend::{wgpu::WgpuDevice, Wgpu};
        tracing::info!("Using accelerator backend (wgpu)");
        self.run::<Autodiff<Wgpu>>(&WgpuDevice::default())
    }

    #[cfg(not(feature = "wgpu"))]
    fn run_accelerator(&self) -> Result<TrainingSummary> {
        Err(crate::domain::error::DataError::DeviceUnavailable.into())
    }

    fn run<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainingSummary> {
        let cfg = &self.config;

        // ── Step 2: Tokenizer pinned to max_length ───────────────────────────
        let tokenizer = TokenizerStore::new(&cfg.bert_model_path).load(cfg.max_length)?;

        // ── Step 3: Datasets ─────────────────────────────────────────────────
        let constructor = DatasetConstructor::new(&tokenizer, cfg.record_format);
        let splits = constructor.load_splits(&cfg.train_file(), &cfg.eval_file(), &cfg.test_file())?;

        // ── Step 4: Model with the pretrained encoder ────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_path)?;
        let model = self.build_model::<B>(tokenizer.vocab_size(), &ckpt_manager, device)?;

        // ── Step 5: Persist the resolved config ──────────────────────────────
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_path)?;

        // ── Step 6: Train ────────────────────────────────────────────────────
        let seed = cfg.seed.unwrap_or_else(rand::random);
        tracing::debug!("Shuffle seed {}", seed);

        let (_, summary) = run_training(
            &cfg.schedule(seed),
            model,
            splits.train,
            splits.eval,
            &ckpt_manager,
            &metrics,
            device,
        )?;
        Ok(summary)
    }

    /// Initialise the classifier, copy in `model.safetensors` from
    /// `bert_model_path` when present, then apply `pretrained_weights`.
    fn build_model<B: Backend>(
        &self,
        vocab_size:   usize,
        ckpt_manager: &CheckpointManager,
        device:       &B::Device,
    ) -> Result<TextClassifier<B>> {
        let cfg = &self.config;
        let mut model = cfg.model.to_model_config(vocab_size).init::<B>(device);

        if weights_path(&cfg.bert_model_path).is_file() {
            model = load_bert_weights(model, &cfg.bert_model_path, device)?;
        } else {
            tracing::warn!(
                "No '{}' found; the encoder starts from random initialisation",
                weights_path(&cfg.bert_model_path).display()
            );
        }

        if let Some(path) = &cfg.pretrained_weights {
            model = ckpt_manager.load_pretrained(model, path, device)?;
        }
        Ok(model)
    }
}
