// ============================================================
// Layer 6 — Config Loader
// ============================================================
// Reads config.yaml into a TrainConfig and rejects values the
// training loop cannot run with, before any data is touched.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use thiserror::Error;

use crate::application::train_use_case::TrainConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value} (expected {constraint})")]
    InvalidRange {
        field:      &'static str,
        value:      String,
        constraint: &'static str,
    },
}

fn invalid(field: &'static str, value: impl ToString, constraint: &'static str) -> ConfigError {
    ConfigError::InvalidRange { field, value: value.to_string(), constraint }
}

pub fn load_config(path: &Path) -> Result<TrainConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config '{}'", path.display()))?;
    let cfg = parse_config(&text)
        .with_context(|| format!("Invalid config '{}'", path.display()))?;
    tracing::info!("Loaded config from '{}'", path.display());
    Ok(cfg)
}

pub fn parse_config(text: &str) -> Result<TrainConfig> {
    let cfg: TrainConfig = serde_yaml::from_str(text)?;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn validate(cfg: &TrainConfig) -> Result<(), ConfigError> {
    if cfg.batch_size == 0 {
        return Err(invalid("batch_size", cfg.batch_size, "> 0"));
    }
    if cfg.epochs == 0 {
        return Err(invalid("EPOCH", cfg.epochs, "> 0"));
    }
    if !(cfg.lr > 0.0 && cfg.lr.is_finite()) {
        return Err(invalid("LR", cfg.lr, "finite and > 0"));
    }
    if cfg.log_every == 0 {
        return Err(invalid("log_every", cfg.log_every, "> 0"));
    }
    if cfg.eval_every == 0 {
        return Err(invalid("eval_every", cfg.eval_every, "> 0"));
    }
    if cfg.max_length == 0 || cfg.max_length > cfg.model.max_position {
        return Err(invalid("max_length", cfg.max_length, "1..=model.max_position"));
    }
    if cfg.model.num_heads == 0 || cfg.model.hidden_size % cfg.model.num_heads != 0 {
        return Err(invalid("model.num_heads", cfg.model.num_heads, "a divisor of model.hidden_size"));
    }
    if cfg.record_format.label_width == 0 {
        return Err(invalid("record_format.label_width", 0, "> 0"));
    }
    Ok(())
}
