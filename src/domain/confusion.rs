// ============================================================
// Layer 3 — Confusion Matrix
// ============================================================
// Rows are the true label, columns the predicted label:
//
//               pred 0   pred 1   pred 2
//   true 0    [  m00      m01      m02  ]
//   true 1    [  m10      m11      m12  ]
//   true 2    [  m20      m21      m22  ]
//
// precision(c) = m[c][c] / column sum of c   (how often a prediction of c is right)
// recall(c)    = m[c][c] / row sum of c      (how much of class c was found)
//
// A class that never appears as a prediction (or never appears as a
// true label) has a zero denominator. The division is left unguarded
// so the result is NaN rather than a misleading 0.0.

use crate::domain::example::NUM_CLASSES;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[u64; NUM_CLASSES]; NUM_CLASSES],
}

impl ConfusionMatrix {
    /// An all-zero matrix.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn from_counts(counts: [[u64; NUM_CLASSES]; NUM_CLASSES]) -> Self {
        Self { counts }
    }

    /// Count one (true, predicted) pair.
    ///
    /// # Panics
    /// Panics if either index is outside `0..NUM_CLASSES`.
    pub fn record(&mut self, truth: usize, predicted: usize) {
        self.counts[truth][predicted] += 1;
    }

    /// Sum of all cells — the number of examples recorded.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Sum of the diagonal — the number of correct predictions.
    pub fn correct(&self) -> u64 {
        (0..NUM_CLASSES).map(|c| self.counts[c][c]).sum()
    }

    /// How many times class `c` was predicted.
    pub fn predicted_count(&self, c: usize) -> u64 {
        self.counts.iter().map(|row| row[c]).sum()
    }

    /// How many examples truly belong to class `c`.
    pub fn actual_count(&self, c: usize) -> u64 {
        self.counts[c].iter().sum()
    }

    pub fn accuracy(&self) -> f64 {
        self.correct() as f64 / self.total() as f64
    }

    pub fn precision(&self, c: usize) -> f64 {
        self.counts[c][c] as f64 / self.predicted_count(c) as f64
    }

    pub fn recall(&self, c: usize) -> f64 {
        self.counts[c][c] as f64 / self.actual_count(c) as f64
    }

    /// One formatted line per true-label row: `a   |   b   |   c`
    pub fn row_lines(&self) -> Vec<String> {
        self.counts
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("   |   ")
            })
            .collect()
    }
}
