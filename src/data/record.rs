// ============================================================
// Layer 4 — Labelled Line Format
// ============================================================
// Source files hold one record per line:
//
//   <text><separator><label>
//
//   "buy a car here.1"
//    └────────────┘│└─ label     (label_width chars, a class digit)
//        text      └── separator (separator_width chars, discarded)
//
// The split is purely positional: after trimming surrounding
// whitespace the last `label_width` characters are the label and
// the `separator_width` characters before them are dropped. The
// separator character itself is never inspected. Positions count
// chars, not bytes, so CJK text splits on the same boundaries.

use serde::{Deserialize, Serialize};

use crate::domain::example::NUM_CLASSES;

/// Positional layout of one labelled line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFormat {
    #[serde(default = "RecordFormat::default_separator_width")]
    pub separator_width: usize,
    #[serde(default = "RecordFormat::default_label_width")]
    pub label_width:     usize,
}

impl RecordFormat {
    fn default_separator_width() -> usize { 1 }
    fn default_label_width() -> usize { 1 }

    /// Shortest line (in chars) that can hold a separator and a label.
    pub fn min_chars(&self) -> usize {
        self.separator_width + self.label_width
    }

    /// Split one raw line into `(text, label)`.
    ///
    /// Returns a human-readable reason on failure; the caller attaches
    /// the file path and line number.
    pub fn parse<'a>(&self, raw: &'a str) -> Result<LabelledLine<'a>, String> {
        let line = raw.trim();
        let chars = line.chars().count();
        if chars < self.min_chars() {
            return Err(format!(
                "line has {chars} characters, need at least {}",
                self.min_chars()
            ));
        }

        let text_end  = byte_offset(line, chars - self.min_chars());
        let label_pos = byte_offset(line, chars - self.label_width);
        let label_str = &line[label_pos..];

        let label = label_str
            .parse::<usize>()
            .ok()
            .filter(|&l| l < NUM_CLASSES && label_str.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| format!("label '{label_str}' is not a class digit in 0..{NUM_CLASSES}"))?;

        Ok(LabelledLine { text: &line[..text_end], label })
    }
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            separator_width: Self::default_separator_width(),
            label_width:     Self::default_label_width(),
        }
    }
}

/// A parsed line borrowing its text from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelledLine<'a> {
    pub text:  &'a str,
    pub label: usize,
}

/// Byte index of the `n`-th char of `s` (or `s.len()` past the end).
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
