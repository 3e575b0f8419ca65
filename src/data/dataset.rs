use burn::data::dataset::Dataset;

use crate::domain::example::{Example, NUM_CLASSES};

/// Immutable, indexable collection of tokenised examples.
#[derive(Debug)]
pub struct ExampleStore {
    examples: Vec<Example>,
}

impl ExampleStore {
    pub fn new(examples: Vec<Example>) -> Self { Self { examples } }

    pub fn example_count(&self) -> usize { self.examples.len() }

    /// How many examples carry each label.
    pub fn label_histogram(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0usize; NUM_CLASSES];
        for ex in &self.examples {
            counts[ex.label] += 1;
        }
        counts
    }
}

impl Dataset<Example> for ExampleStore {
    fn get(&self, index: usize) -> Option<Example> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(label: usize) -> Example {
        Example {
            input_ids:      vec![1, 2, 0],
            attention_mask: vec![1, 1, 0],
            token_type_ids: vec![0, 0, 0],
            label,
        }
    }

    #[test]
    fn test_indexed_access() {
        let store = ExampleStore::new(vec![ex(0), ex(2)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).map(|e| e.label), Some(2));
        assert!(store.get(2).is_none());
    }

    #[test]
    fn test_label_histogram() {
        let store = ExampleStore::new(vec![ex(0), ex(2), ex(2), ex(1)]);
        assert_eq!(store.label_histogram(), [1, 1, 2]);
    }
}
