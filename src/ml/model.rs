use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::data::batcher::ClassificationBatch;
use crate::domain::example::NUM_CLASSES;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TextClassifierConfig {
    pub vocab_size:        usize,
    #[config(default = 3)]
    pub num_classes:       usize,
    #[config(default = 768)]
    pub hidden_size:       usize,
    #[config(default = 12)]
    pub num_heads:         usize,
    #[config(default = 12)]
    pub num_layers:        usize,
    #[config(default = 3072)]
    pub intermediate_size: usize,
    #[config(default = 512)]
    pub max_position:      usize,
    #[config(default = 2)]
    pub type_vocab_size:   usize,
    #[config(default = 0.1)]
    pub dropout:           f64,
    #[config(default = 1e-12)]
    pub layer_norm_eps:    f64,
}

impl TextClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassifier<B> {
        let word_embedding       = EmbeddingConfig::new(self.vocab_size, self.hidden_size).init(device);
        let position_embedding   = EmbeddingConfig::new(self.max_position, self.hidden_size).init(device);
        let token_type_embedding = EmbeddingConfig::new(self.type_vocab_size, self.hidden_size).init(device);
        let embedding_norm       = self.layer_norm().init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let pooler     = LinearConfig::new(self.hidden_size, self.hidden_size).init(device);
        let classifier = LinearConfig::new(self.hidden_size, self.num_classes).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TextClassifier {
            word_embedding, position_embedding, token_type_embedding,
            embedding_norm, layers, pooler, classifier, dropout,
        }
    }

    fn layer_norm(&self) -> LayerNormConfig {
        LayerNormConfig::new(self.hidden_size).with_epsilon(self.layer_norm_eps)
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.hidden_size, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_in  = LinearConfig::new(self.hidden_size, self.intermediate_size).init(device);
        let ffn_out = LinearConfig::new(self.intermediate_size, self.hidden_size).init(device);
        let norm1   = self.layer_norm().init(device);
        let norm2   = self.layer_norm().init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_in, ffn_out, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn: MultiHeadAttention<B>,
    pub ffn_in:    Linear<B>,
    pub ffn_out:   Linear<B>,
    pub norm1:     LayerNorm<B>,
    pub norm2:     LayerNorm<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// `pad_mask` is true at padding positions, which attention ignores.
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(pad_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_out.forward(activation::gelu(self.ffn_in.forward(x.clone())));
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// BERT-shaped encoder with a pooled `[CLS]` classification head.
#[derive(Module, Debug)]
pub struct TextClassifier<B: Backend> {
    pub word_embedding:       Embedding<B>,
    pub position_embedding:   Embedding<B>,
    pub token_type_embedding: Embedding<B>,
    pub embedding_norm:       LayerNorm<B>,
    pub layers:               Vec<EncoderBlock<B>>,
    pub pooler:               Linear<B>,
    pub classifier:           Linear<B>,
    pub dropout:              Dropout,
}

pub struct ClassificationOutput<B: Backend> {
    /// Mean cross-entropy over the batch — shape: [1]
    pub loss:   Tensor<B, 1>,
    /// Raw class scores — shape: [batch, num_classes]
    pub logits: Tensor<B, 2>,
    /// Ground truth — shape: [batch]
    pub labels: Tensor<B, 1, Int>,
}

impl<B: Backend> TextClassifier<B> {
    /// All inputs: [batch, seq_len] → logits: [batch, num_classes]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        token_type_ids: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);

        let embeddings = self.word_embedding.forward(input_ids)
            + self.position_embedding.forward(positions)
            + self.token_type_embedding.forward(token_type_ids);
        let mut x = self.dropout.forward(self.embedding_norm.forward(embeddings));

        let pad_mask = attention_mask.equal_elem(0);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }

        // Pool the first ([CLS]) position
        let [_, _, hidden] = x.dims();
        let cls = x
            .slice([0..batch_size, 0..1, 0..hidden])
            .reshape([batch_size, hidden]);
        let pooled = self.pooler.forward(cls).tanh();

        self.classifier.forward(self.dropout.forward(pooled))
    }

    pub fn forward_loss(&self, batch: ClassificationBatch<B>) -> ClassificationOutput<B> {
        let logits = self.forward(batch.input_ids, batch.attention_mask, batch.token_type_ids);
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(logits.clone(), batch.labels.clone());
        ClassificationOutput { loss, logits, labels: batch.labels }
    }
}

/// Small architecture for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) fn tiny_config(vocab_size: usize) -> TextClassifierConfig {
    TextClassifierConfig::new(vocab_size)
        .with_num_classes(NUM_CLASSES)
        .with_hidden_size(8)
        .with_num_heads(2)
        .with_num_layers(1)
        .with_intermediate_size(16)
        .with_max_position(16)
        .with_dropout(0.1)
}
