// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the HuggingFace `tokenizer.json` shipped with the
// pretrained encoder and pins it to a fixed sequence length:
//
//   - truncation: anything longer than max_length is cut
//   - padding:    anything shorter is padded with [PAD] up to
//                 max_length (PaddingStrategy::Fixed)
//
// so every encoding has exactly max_length ids, mask bits and
// segment ids.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokenizers::{
    PaddingParams, PaddingStrategy, Tokenizer, TruncationParams,
};

use crate::domain::{error::DataError, example::EncodedText, traits::TextEncoder};

const TOKENIZER_FILE: &str = "tokenizer.json";
const PAD_TOKEN: &str = "[PAD]";

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    /// Load `tokenizer.json` from the model directory.
    pub fn load(&self, max_length: usize) -> Result<FixedLengthTokenizer> {
        let path = self.tokenizer_path();
        let tokenizer = Tokenizer::from_file(&path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e)
        })?;
        tracing::info!("Loaded tokenizer from '{}'", path.display());
        Ok(FixedLengthTokenizer::new(tokenizer, max_length)?)
    }
}

/// A tokenizer that always emits `max_length` tokens.
pub struct FixedLengthTokenizer {
    inner:      Tokenizer,
    max_length: usize,
}

impl FixedLengthTokenizer {
    pub fn new(mut tokenizer: Tokenizer, max_length: usize) -> Result<Self, DataError> {
        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(DataError::framework)?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy:  PaddingStrategy::Fixed(max_length),
            pad_id,
            pad_token: PAD_TOKEN.to_string(),
            ..Default::default()
        }));

        Ok(Self { inner: tokenizer, max_length })
    }

    /// One past the largest token id, so every id indexes the embedding table.
    pub fn vocab_size(&self) -> usize {
        self.inner
            .get_vocab(true)
            .values()
            .max()
            .map(|&id| id as usize + 1)
            .unwrap_or(0)
    }
}

impl TextEncoder for FixedLengthTokenizer {
    fn encode(&self, text: &str) -> Result<EncodedText, DataError> {
        let enc = self.inner.encode(text, true).map_err(DataError::framework)?;
        Ok(EncodedText {
            input_ids:      enc.get_ids().to_vec(),
            attention_mask: enc.get_attention_mask().to_vec(),
            token_type_ids: enc.get_type_ids().to_vec(),
        })
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}

/// Writes a small word-level tokenizer in HuggingFace JSON format.
#[cfg(test)]
pub(crate) fn write_test_tokenizer(dir: &Path, words: &[&str]) -> PathBuf {
    let mut vocab = serde_json::json!({ "[PAD]": 0, "[UNK]": 1 });
    for (i, w) in words.iter().enumerate() {
        vocab[*w] = serde_json::json!(i + 2);
    }
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": 0, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 1, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]" }
    });
    let path = dir.join(TOKENIZER_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(&tokenizer_json).unwrap()).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: [&str; 6] = ["buy", "a", "car", "here", "audit", "ledger"];

    fn load(max_length: usize) -> (tempfile::TempDir, FixedLengthTokenizer) {
        let dir = tempfile::tempdir().unwrap();
        write_test_tokenizer(dir.path(), &WORDS);
        let tok = TokenizerStore::new(dir.path()).load(max_length).unwrap();
        (dir, tok)
    }

    #[test]
    fn test_pads_to_max_length() {
        let (_dir, tok) = load(20);
        let enc = tok.encode("buy a car here").unwrap();

        assert_eq!(enc.input_ids.len(), 20);
        assert_eq!(enc.attention_mask.len(), 20);
        assert_eq!(enc.token_type_ids.len(), 20);
        assert_eq!(&enc.input_ids[..5], &[2, 3, 4, 5, 0]);
        assert_eq!(enc.attention_mask.iter().sum::<u32>(), 4);
        assert!(enc.token_type_ids.iter().all(|&t| t == 0));
    }

    #[test]
    fn test_truncates_to_max_length() {
        let (_dir, tok) = load(2);
        let enc = tok.encode("buy a car here").unwrap();
        assert_eq!(enc.input_ids, vec![2, 3]);
        assert_eq!(enc.attention_mask, vec![1, 1]);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let (_dir, tok) = load(4);
        let enc = tok.encode("Audit spaceship").unwrap();
        assert_eq!(enc.input_ids, vec![6, 1, 0, 0]);
    }

    #[test]
    fn test_vocab_size_covers_largest_id() {
        let (_dir, tok) = load(4);
        assert_eq!(tok.vocab_size(), WORDS.len() + 2);
        assert_eq!(tok.max_length(), 4);
    }

    #[test]
    fn test_missing_tokenizer_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TokenizerStore::new(dir.path()).load(8).is_err());
    }
}
