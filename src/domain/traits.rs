// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The dataset constructor only needs "turn this text into
// fixed-length token sequences". Keeping that behind a trait
// lets the data layer be tested with a tiny in-memory encoder
// while production uses a HuggingFace tokenizer file.

use crate::domain::{error::DataError, example::EncodedText};

// ─── TextEncoder ──────────────────────────────────────────────────────────────
/// Any component that can tokenise a text span to a fixed length.
///
/// Implementations:
///   - FixedLengthTokenizer → wraps `tokenizers::Tokenizer`
pub trait TextEncoder {
    /// Encode `text`, padding or truncating every sequence to `max_length()`.
    fn encode(&self, text: &str) -> Result<EncodedText, DataError>;

    /// The sequence length every encoding is padded/truncated to.
    fn max_length(&self) -> usize;
}
