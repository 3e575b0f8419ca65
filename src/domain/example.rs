// ============================================================
// Layer 3 — Example Domain Type
// ============================================================
// One labelled record after tokenisation. All three token
// sequences are padded/truncated to the same fixed length,
// so a batch can be stacked without dynamic padding.

/// Number of target classes the classifier head predicts.
pub const NUM_CLASSES: usize = 3;

/// Display names for the class indices, in index order.
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "software development",
    "accounting & audit",
    "car sales",
];

/// Token sequences produced by a `TextEncoder` for one text span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub token_type_ids: Vec<u32>,
}

impl EncodedText {
    /// Length shared by all three sequences, or `None` if they disagree.
    pub fn uniform_len(&self) -> Option<usize> {
        let n = self.input_ids.len();
        (self.attention_mask.len() == n && self.token_type_ids.len() == n).then_some(n)
    }
}

/// One fully tokenised and padded training example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub token_type_ids: Vec<u32>,
    /// Class index in `0..NUM_CLASSES`
    pub label:          usize,
}

impl Example {
    pub fn new(encoded: EncodedText, label: usize) -> Self {
        Self {
            input_ids:      encoded.input_ids,
            attention_mask: encoded.attention_mask,
            token_type_ids: encoded.token_type_ids,
            label,
        }
    }

    /// Number of non-padding tokens
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}

/// Human-readable name for a class index.
pub fn class_name(label: usize) -> &'static str {
    CLASS_NAMES[label]
}
