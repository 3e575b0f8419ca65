// ============================================================
// Layer 6 — Pretrained BERT Weights
// ============================================================
// Copies a HuggingFace BERT checkpoint (`model.safetensors` in
// bert_model_path) into a freshly initialised TextClassifier.
//
// Tensor name mapping (an optional leading "bert." is accepted,
// as saved by BertForSequenceClassification):
//
//   embeddings.word_embeddings        → word_embedding
//   embeddings.position_embeddings    → position_embedding
//   embeddings.token_type_embeddings  → token_type_embedding
//   embeddings.LayerNorm              → embedding_norm
//   encoder.layer.{i}.attention.self.{query,key,value}
//                                     → layers[i].self_attn.{query,key,value}
//   encoder.layer.{i}.attention.output.dense     → layers[i].self_attn.output
//   encoder.layer.{i}.attention.output.LayerNorm → layers[i].norm1
//   encoder.layer.{i}.intermediate.dense         → layers[i].ffn_in
//   encoder.layer.{i}.output.dense               → layers[i].ffn_out
//   encoder.layer.{i}.output.LayerNorm           → layers[i].norm2
//   pooler.dense                      → pooler
//
// torch Linear stores weight as [out, in]; burn stores [in, out],
// so every dense weight is transposed on the way in. LayerNorm
// parameters may be named weight/bias or gamma/beta. The 3-way
// classifier head is never in the checkpoint and keeps its
// random initialisation.
//
// Only F32 tensors are accepted. Every shape is checked against
// the model built from config.yaml.

use anyhow::{Context, Result};
use burn::{
    module::Param,
    nn::{Embedding, LayerNorm, Linear},
    prelude::*,
};
use safetensors::{Dtype, SafeTensors};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::error::DataError;
use crate::ml::model::{EncoderBlock, TextClassifier};

const WEIGHTS_FILE: &str = "model.safetensors";

/// `model.safetensors` inside a HuggingFace model directory.
pub fn weights_path(model_dir: &Path) -> PathBuf {
    model_dir.join(WEIGHTS_FILE)
}

/// Load the BERT encoder and pooler weights from `model_dir`.
pub fn load_bert_weights<B: Backend>(
    model:     TextClassifier<B>,
    model_dir: &Path,
    device:    &B::Device,
) -> Result<TextClassifier<B>> {
    let path  = weights_path(model_dir);
    let bytes = fs::read(&path)
        .with_context(|| format!("Cannot read pretrained weights '{}'", path.display()))?;
    let model = apply_bert_weights(model, &bytes, device)
        .with_context(|| format!("Cannot apply pretrained weights '{}'", path.display()))?;
    tracing::info!("Loaded pretrained encoder from '{}'", path.display());
    Ok(model)
}

/// Copy every encoder parameter found in a serialized safetensors buffer.
pub fn apply_bert_weights<B: Backend>(
    mut model: TextClassifier<B>,
    bytes:     &[u8],
    device:    &B::Device,
) -> Result<TextClassifier<B>, DataError> {
    let tensors = SafeTensors::deserialize(bytes).map_err(DataError::framework)?;
    let source  = CheckpointTensors::new(&tensors, device);

    model.word_embedding       = source.embedding(model.word_embedding, "embeddings.word_embeddings")?;
    model.position_embedding   = source.embedding(model.position_embedding, "embeddings.position_embeddings")?;
    model.token_type_embedding = source.embedding(model.token_type_embedding, "embeddings.token_type_embeddings")?;
    model.embedding_norm       = source.layer_norm(model.embedding_norm, "embeddings.LayerNorm")?;

    let layers = std::mem::take(&mut model.layers);
    model.layers = layers
        .into_iter()
        .enumerate()
        .map(|(i, block)| source.encoder_block(block, i))
        .collect::<Result<_, _>>()?;

    model.pooler = source.linear(model.pooler, "pooler.dense")?;
    Ok(model)
}

struct CheckpointTensors<'a, 'd, B: Backend> {
    tensors: &'a SafeTensors<'a>,
    prefix:  &'static str,
    device:  &'d B::Device,
}

impl<'a, 'd, B: Backend> CheckpointTensors<'a, 'd, B> {
    fn new(tensors: &'a SafeTensors<'a>, device: &'d B::Device) -> Self {
        let prefixed = tensors
            .names()
            .iter()
            .any(|name| name.starts_with("bert."));
        Self { tensors, prefix: if prefixed { "bert." } else { "" }, device }
    }

    fn contains(&self, name: &str) -> bool {
        self.tensors.tensor(&format!("{}{name}", self.prefix)).is_ok()
    }

    /// Read `name` as an F32 tensor, checking it has `expected` dims.
    fn tensor<const D: usize>(&self, name: &str, expected: [usize; D]) -> Result<Tensor<B, D>, DataError> {
        let full = format!("{}{name}", self.prefix);
        let view = self
            .tensors
            .tensor(&full)
            .map_err(|e| DataError::Framework(format!("tensor '{full}': {e}")))?;

        if view.dtype() != Dtype::F32 {
            return Err(DataError::Framework(format!(
                "tensor '{full}' has dtype {:?}, expected F32",
                view.dtype()
            )));
        }
        if view.shape() != expected.as_slice() {
            return Err(DataError::Framework(format!(
                "tensor '{full}' has shape {:?}, model expects {:?}",
                view.shape(),
                expected
            )));
        }

        let values: Vec<f32> = view
            .data()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Tensor::from_data(TensorData::new(values, expected), self.device))
    }

    fn embedding(&self, mut layer: Embedding<B>, name: &str) -> Result<Embedding<B>, DataError> {
        let dims = layer.weight.val().dims();
        layer.weight = Param::from_tensor(self.tensor(&format!("{name}.weight"), dims)?);
        Ok(layer)
    }

    fn layer_norm(&self, mut layer: LayerNorm<B>, name: &str) -> Result<LayerNorm<B>, DataError> {
        let dims = layer.gamma.val().dims();
        let (scale, shift) = if self.contains(&format!("{name}.gamma")) {
            ("gamma", "beta")
        } else {
            ("weight", "bias")
        };
        layer.gamma = Param::from_tensor(self.tensor(&format!("{name}.{scale}"), dims)?);
        layer.beta  = Param::from_tensor(self.tensor(&format!("{name}.{shift}"), dims)?);
        Ok(layer)
    }

    fn linear(&self, mut layer: Linear<B>, name: &str) -> Result<Linear<B>, DataError> {
        let [d_in, d_out] = layer.weight.val().dims();
        let weight = self.tensor::<2>(&format!("{name}.weight"), [d_out, d_in])?;
        layer.weight = Param::from_tensor(weight.transpose());
        layer.bias   = Some(Param::from_tensor(self.tensor(&format!("{name}.bias"), [d_out])?));
        Ok(layer)
    }

    fn encoder_block(&self, mut block: EncoderBlock<B>, index: usize) -> Result<EncoderBlock<B>, DataError> {
        let base = format!("encoder.layer.{index}");

        block.self_attn.query  = self.linear(block.self_attn.query, &format!("{base}.attention.self.query"))?;
        block.self_attn.key    = self.linear(block.self_attn.key, &format!("{base}.attention.self.key"))?;
        block.self_attn.value  = self.linear(block.self_attn.value, &format!("{base}.attention.self.value"))?;
        block.self_attn.output = self.linear(block.self_attn.output, &format!("{base}.attention.output.dense"))?;
        block.norm1   = self.layer_norm(block.norm1, &format!("{base}.attention.output.LayerNorm"))?;
        block.ffn_in  = self.linear(block.ffn_in, &format!("{base}.intermediate.dense"))?;
        block.ffn_out = self.linear(block.ffn_out, &format!("{base}.output.dense"))?;
        block.norm2   = self.layer_norm(block.norm2, &format!("{base}.output.LayerNorm"))?;
        Ok(block)
    }
}

/// Write `model`'s encoder as a HuggingFace `model.safetensors` in `dir`.
#[cfg(test)]
pub(crate) fn write_test_weights(dir: &Path, model: &TextClassifier<burn::backend::NdArray>) -> PathBuf {
    let path = weights_path(dir);
    fs::write(&path, tests::serialize(&tests::export(model, "bert."))).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::tiny_config;
    use burn::backend::NdArray;
    use safetensors::tensor::TensorView;
    use std::collections::HashMap;

    type TestBackend = NdArray;

    fn values<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.into_data().iter::<f32>().collect()
    }

    pub(super) type Entry = (String, Vec<usize>, Vec<f32>);

    pub(super) fn entry<const D: usize>(name: String, t: Tensor<TestBackend, D>) -> Entry {
        (name, t.dims().to_vec(), values(t))
    }

    /// Export `model` under HuggingFace BERT names (torch layout).
    pub(super) fn export(model: &TextClassifier<TestBackend>, prefix: &str) -> Vec<Entry> {
        let mut out = vec![
            entry(format!("{prefix}embeddings.word_embeddings.weight"), model.word_embedding.weight.val()),
            entry(format!("{prefix}embeddings.position_embeddings.weight"), model.position_embedding.weight.val()),
            entry(format!("{prefix}embeddings.token_type_embeddings.weight"), model.token_type_embedding.weight.val()),
        ];

        let mut linears: Vec<(String, &Linear<TestBackend>)> = vec![("pooler.dense".into(), &model.pooler)];
        let mut norms:   Vec<(String, &LayerNorm<TestBackend>)> = vec![("embeddings.LayerNorm".into(), &model.embedding_norm)];
        for (i, block) in model.layers.iter().enumerate() {
            let base = format!("encoder.layer.{i}");
            linears.push((format!("{base}.attention.self.query"), &block.self_attn.query));
            linears.push((format!("{base}.attention.self.key"), &block.self_attn.key));
            linears.push((format!("{base}.attention.self.value"), &block.self_attn.value));
            linears.push((format!("{base}.attention.output.dense"), &block.self_attn.output));
            linears.push((format!("{base}.intermediate.dense"), &block.ffn_in));
            linears.push((format!("{base}.output.dense"), &block.ffn_out));
            norms.push((format!("{base}.attention.output.LayerNorm"), &block.norm1));
            norms.push((format!("{base}.output.LayerNorm"), &block.norm2));
        }
        for (name, layer) in linears {
            out.push(entry(format!("{prefix}{name}.weight"), layer.weight.val().transpose()));
            out.push(entry(format!("{prefix}{name}.bias"), layer.bias.as_ref().unwrap().val()));
        }
        for (name, norm) in norms {
            out.push(entry(format!("{prefix}{name}.weight"), norm.gamma.val()));
            out.push(entry(format!("{prefix}{name}.bias"), norm.beta.val()));
        }
        out
    }

    pub(super) fn serialize(entries: &[Entry]) -> Vec<u8> {
        let bytes: Vec<Vec<u8>> = entries
            .iter()
            .map(|(_, _, v)| v.iter().flat_map(|x| x.to_le_bytes()).collect())
            .collect();
        let views: HashMap<String, TensorView<'_>> = entries
            .iter()
            .zip(&bytes)
            .map(|((name, shape, _), data)| {
                (name.clone(), TensorView::new(Dtype::F32, shape.clone(), data).unwrap())
            })
            .collect();
        safetensors::serialize(views, &None).unwrap()
    }

    fn logits(model: &TextClassifier<TestBackend>, device: &<TestBackend as Backend>::Device) -> Vec<f32> {
        let ids  = Tensor::<TestBackend, 1, Int>::from_ints([1, 4, 2, 0], device).reshape([1, 4]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 0], device).reshape([1, 4]);
        let tt   = Tensor::<TestBackend, 2, Int>::zeros([1, 4], device);
        values(model.forward(ids, mask, tt))
    }

    fn assert_same_logits(source: &TextClassifier<TestBackend>, loaded: TextClassifier<TestBackend>) {
        let device = Default::default();
        let mut loaded = loaded;
        // the head is not part of the checkpoint
        loaded.classifier = source.classifier.clone();
        for (a, b) in logits(source, &device).iter().zip(&logits(&loaded, &device)) {
            assert!((a - b).abs() < 1e-5, "{a} != {b}");
        }
    }

    #[test]
    fn test_safetensors_round_trip() {
        let device = Default::default();
        let source = tiny_config(8).init::<TestBackend>(&device);
        let bytes  = serialize(&export(&source, ""));

        let fresh  = tiny_config(8).init::<TestBackend>(&device);
        let loaded = apply_bert_weights(fresh, &bytes, &device).unwrap();
        assert_same_logits(&source, loaded);
    }

    #[test]
    fn test_bert_prefix_is_accepted() {
        let device = Default::default();
        let source = tiny_config(8).init::<TestBackend>(&device);
        let bytes  = serialize(&export(&source, "bert."));

        let loaded = apply_bert_weights(tiny_config(8).init::<TestBackend>(&device), &bytes, &device).unwrap();
        assert_same_logits(&source, loaded);
    }

    #[test]
    fn test_load_from_model_dir() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let source = tiny_config(8).init::<TestBackend>(&device);
        fs::write(weights_path(dir.path()), serialize(&export(&source, ""))).unwrap();

        let loaded = load_bert_weights(tiny_config(8).init::<TestBackend>(&device), dir.path(), &device).unwrap();
        assert_same_logits(&source, loaded);
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        let device = Default::default();
        // checkpoint vocabulary of 8, model vocabulary of 9
        let bytes  = serialize(&export(&tiny_config(8).init::<TestBackend>(&device), ""));
        let err = apply_bert_weights(tiny_config(9).init::<TestBackend>(&device), &bytes, &device).unwrap_err();
        assert!(err.to_string().contains("embeddings.word_embeddings.weight"));
    }

    #[test]
    fn test_missing_tensor_is_error() {
        let device  = Default::default();
        let entries: Vec<_> = export(&tiny_config(8).init::<TestBackend>(&device), "")
            .into_iter()
            .filter(|(name, _, _)| !name.starts_with("pooler."))
            .collect();
        let err = apply_bert_weights(tiny_config(8).init::<TestBackend>(&device), &serialize(&entries), &device)
            .unwrap_err();
        assert!(err.to_string().contains("pooler.dense.weight"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model  = tiny_config(8).init::<TestBackend>(&device);
        assert!(load_bert_weights(model, dir.path(), &device).is_err());
    }
}
