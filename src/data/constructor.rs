// ============================================================
// Layer 4 — Dataset Constructor
// ============================================================
// Reads a newline-delimited labelled text file and turns every
// line into one tokenised Example:
//
//   "buy a car here.1"
//        │ RecordFormat::parse
//        ▼
//   ("buy a car here", 1)
//        │ TextEncoder::encode   (fixed max_length, pad + truncate)
//        ▼
//   Example { input_ids, attention_mask, token_type_ids, label: 1 }
//
// The first malformed line aborts the whole file with a
// MalformedRecord error naming the file and 1-based line number.
// Nothing is cached to disk.

use std::{fs, path::Path};

use indicatif::{ProgressBar, ProgressStyle};

use crate::data::{dataset::ExampleStore, record::RecordFormat};
use crate::domain::{
    error::DataError,
    example::Example,
    traits::TextEncoder,
};

/// Builds `ExampleStore`s from labelled text files.
pub struct DatasetConstructor<'a, E: TextEncoder> {
    encoder: &'a E,
    format:  RecordFormat,
}

/// The three independent splits of one run.
#[derive(Debug)]
pub struct DataSplits {
    pub train: ExampleStore,
    pub eval:  ExampleStore,
    pub test:  ExampleStore,
}

impl<'a, E: TextEncoder> DatasetConstructor<'a, E> {
    pub fn new(encoder: &'a E, format: RecordFormat) -> Self {
        Self { encoder, format }
    }

    /// Read and tokenise every line of `path`.
    pub fn from_file(&self, path: &Path) -> Result<ExampleStore, DataError> {
        let contents = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.from_text(path, &contents)
    }

    /// Tokenise already-loaded file contents. `path` is only used in errors.
    pub fn from_text(&self, path: &Path, contents: &str) -> Result<ExampleStore, DataError> {
        let lines: Vec<&str> = contents.lines().collect();
        let max_length = self.encoder.max_length();

        let progress = ProgressBar::new(lines.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}") {
            progress.set_style(style);
        }
        progress.set_message(path.display().to_string());

        let mut examples = Vec::with_capacity(lines.len());
        for (i, raw) in lines.iter().enumerate() {
            let record = self.format.parse(raw).map_err(|reason| DataError::MalformedRecord {
                path: path.to_path_buf(),
                line: i + 1,
                reason,
            })?;

            let encoded = self.encoder.encode(record.text)?;
            if encoded.uniform_len() != Some(max_length) {
                return Err(DataError::Framework(format!(
                    "tokenizer returned sequences of lengths {}/{}/{} for {}:{}, expected {max_length}",
                    encoded.input_ids.len(),
                    encoded.attention_mask.len(),
                    encoded.token_type_ids.len(),
                    path.display(),
                    i + 1,
                )));
            }

            examples.push(Example::new(encoded, record.label));
            progress.inc(1);
        }
        progress.finish_and_clear();

        let full = examples.iter().filter(|e| e.token_count() == max_length).count();
        tracing::debug!(
            "Built {} examples from '{}' ({} fill all {} token slots, possibly truncated)",
            examples.len(),
            path.display(),
            full,
            max_length,
        );
        Ok(ExampleStore::new(examples))
    }

    /// Build train, eval and test splits and log their sizes.
    pub fn load_splits(
        &self,
        train: &Path,
        eval:  &Path,
        test:  &Path,
    ) -> Result<DataSplits, DataError> {
        tracing::info!("Building datasets...");
        let splits = DataSplits {
            train: self.from_file(train)?,
            eval:  self.from_file(eval)?,
            test:  self.from_file(test)?,
        };
        tracing::info!(
            "Datasets ready: {} train, {} eval, {} test examples",
            splits.train.example_count(),
            splits.eval.example_count(),
            splits.test.example_count(),
        );
        tracing::info!(
            "Label counts: train {:?}, eval {:?}, test {:?}",
            splits.train.label_histogram(),
            splits.eval.label_histogram(),
            splits.test.label_histogram(),
        );
        Ok(splits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::{EncodedText, NUM_CLASSES};
    use burn::data::dataset::Dataset;
    use std::{cell::RefCell, io::Write, path::PathBuf};

    /// Maps each char to its code point, pads with 0 to a fixed length,
    /// and remembers every text it was asked to encode.
    struct CharEncoder {
        max_length: usize,
        seen:       RefCell<Vec<String>>,
    }

    impl CharEncoder {
        fn new(max_length: usize) -> Self {
            Self { max_length, seen: RefCell::new(Vec::new()) }
        }
    }

    impl TextEncoder for CharEncoder {
        fn encode(&self, text: &str) -> Result<EncodedText, DataError> {
            self.seen.borrow_mut().push(text.to_string());
            let mut ids: Vec<u32> = text.chars().map(|c| c as u32).take(self.max_length).collect();
            let mut mask = vec![1u32; ids.len()];
            ids.resize(self.max_length, 0);
            mask.resize(self.max_length, 0);
            Ok(EncodedText {
                input_ids:      ids,
                attention_mask: mask,
                token_type_ids: vec![0; self.max_length],
            })
        }

        fn max_length(&self) -> usize {
            self.max_length
        }
    }

    /// Ignores max_length and always returns 3 tokens.
    struct BrokenEncoder;

    impl TextEncoder for BrokenEncoder {
        fn encode(&self, _text: &str) -> Result<EncodedText, DataError> {
            Ok(EncodedText {
                input_ids:      vec![1, 2, 3],
                attention_mask: vec![1, 1, 1],
                token_type_ids: vec![0, 0, 0],
            })
        }

        fn max_length(&self) -> usize {
            8
        }
    }

    fn path() -> PathBuf {
        PathBuf::from("train.txt")
    }

    #[test]
    fn test_single_line_scenario() {
        let enc   = CharEncoder::new(20);
        let store = DatasetConstructor::new(&enc, RecordFormat::default())
            .from_text(&path(), "buy a car here.1\n")
            .unwrap();

        assert_eq!(store.example_count(), 1);
        let ex = store.get(0).unwrap();
        assert_eq!(ex.label, 1);
        assert_eq!(ex.input_ids.len(), 20);
        assert_eq!(ex.attention_mask.len(), 20);
        assert_eq!(ex.token_type_ids.len(), 20);
        assert_eq!(enc.seen.borrow().as_slice(), ["buy a car here"]);
        assert_eq!(ex.token_count(), "buy a car here".len());
    }

    #[test]
    fn test_one_example_per_line() {
        let enc   = CharEncoder::new(6);
        let text  = "first,0\nsecond,1\nthird one is long,2\n四,0\n";
        let store = DatasetConstructor::new(&enc, RecordFormat::default())
            .from_text(&path(), text)
            .unwrap();

        assert_eq!(store.example_count(), 4);
        for i in 0..store.len() {
            let ex = store.get(i).unwrap();
            assert!(ex.label < NUM_CLASSES);
            assert_eq!(ex.input_ids.len(), 6);
        }
        // truncated to max_length
        assert_eq!(store.get(2).unwrap().token_count(), 6);
        assert_eq!(store.label_histogram(), [2, 1, 1]);
    }

    #[test]
    fn test_crlf_lines() {
        let enc   = CharEncoder::new(4);
        let store = DatasetConstructor::new(&enc, RecordFormat::default())
            .from_text(&path(), "ab,1\r\ncd,2\r\n")
            .unwrap();
        assert_eq!(store.example_count(), 2);
        assert_eq!(enc.seen.borrow().as_slice(), ["ab", "cd"]);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let enc = CharEncoder::new(4);
        let err = DatasetConstructor::new(&enc, RecordFormat::default())
            .from_text(&path(), "ok line,0\nbad label,7\n")
            .unwrap_err();

        match err {
            DataError::MalformedRecord { path, line, .. } => {
                assert_eq!(path, PathBuf::from("train.txt"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let enc = CharEncoder::new(4);
        let err = DatasetConstructor::new(&enc, RecordFormat::default())
            .from_text(&path(), "a,0\n\nb,1\n")
            .unwrap_err();
        assert!(matches!(err, DataError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_wrong_sequence_length_is_framework_error() {
        let err = DatasetConstructor::new(&BrokenEncoder, RecordFormat::default())
            .from_text(&path(), "text,0\n")
            .unwrap_err();
        assert!(matches!(err, DataError::Framework(_)));
    }

    #[test]
    fn test_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("eval.txt");
        let mut f = std::fs::File::create(&file).unwrap();
        writeln!(f, "hello there,2").unwrap();
        writeln!(f, "general ledger,1").unwrap();

        let enc   = CharEncoder::new(5);
        let ctor  = DatasetConstructor::new(&enc, RecordFormat::default());
        let store = ctor.from_file(&file).unwrap();
        assert_eq!(store.example_count(), 2);

        let missing = ctor.from_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(missing, DataError::Io { .. }));
    }

    #[test]
    fn test_load_splits() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| {
            let p = dir.path().join(name);
            std::fs::write(&p, body).unwrap();
            p
        };
        let train = write("train.txt", "a,0\nb,1\nc,2\n");
        let eval  = write("eval.txt", "d,0\n");
        let test  = write("test.txt", "e,1\nf,2\n");

        let enc    = CharEncoder::new(3);
        let splits = DatasetConstructor::new(&enc, RecordFormat::default())
            .load_splits(&train, &eval, &test)
            .unwrap();
        assert_eq!(splits.train.example_count(), 3);
        assert_eq!(splits.eval.example_count(), 1);
        assert_eq!(splits.test.example_count(), 2);
    }
}
