//! (prefix, next character) samples derived from a word list.

use super::CharModelError;
use super::index::{CharIndex, PAD};
use ndarray::{Array2, Axis};

/// One training pair: the codes of a word prefix and the code that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub prefix: Vec<usize>,
    pub target: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub samples: Vec<Sample>,
    /// Longest prefix across all samples; every padded input has this length.
    pub maxlen: usize,
}

impl Dataset {
    /// Split every word of length ≥ 2 at each interior position.
    pub fn from_words<S: AsRef<str>>(
        words: &[S],
        index: &CharIndex,
    ) -> Result<Self, CharModelError> {
        let mut samples = Vec::new();
        for word in words {
            let codes = index.encode(word.as_ref());
            for i in 1..codes.len() {
                samples.push(Sample {
                    prefix: codes[..i].to_vec(),
                    target: codes[i],
                });
            }
        }

        let maxlen = samples
            .iter()
            .map(|s| s.prefix.len())
            .max()
            .ok_or(CharModelError::EmptyCorpus)?;

        Ok(Self { samples, maxlen })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All prefixes left-padded to `maxlen`, one row per sample.
    pub fn inputs(&self) -> Array2<usize> {
        let mut inputs = Array2::from_elem((self.samples.len(), self.maxlen), PAD);
        for (mut row, sample) in inputs.axis_iter_mut(Axis(0)).zip(&self.samples) {
            for (slot, code) in row.iter_mut().zip(pad_sequence(&sample.prefix, self.maxlen)) {
                *slot = code;
            }
        }
        inputs
    }

    /// One-hot targets of width `vocab_size`.
    pub fn targets(&self, vocab_size: usize) -> Array2<f32> {
        let mut targets = Array2::zeros((self.samples.len(), vocab_size));
        for (row, sample) in self.samples.iter().enumerate() {
            targets[[row, sample.target]] = 1.0;
        }
        targets
    }
}

/// Fit a code sequence to `maxlen`.
///
/// Short sequences are padded on the left with [`PAD`]; long ones keep their
/// rightmost `maxlen` codes.
pub fn pad_sequence(codes: &[usize], maxlen: usize) -> Vec<usize> {
    if codes.len() >= maxlen {
        return codes[codes.len() - maxlen..].to_vec();
    }
    let mut padded = vec![PAD; maxlen - codes.len()];
    padded.extend_from_slice(codes);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<String> {
        ["hola", "a", "si", "casa"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sample_count_per_word() {
        let words = words();
        let index = CharIndex::from_words(&words);
        let dataset = Dataset::from_words(&words, &index).unwrap();
        // hola: 3, a: 0, si: 1, casa: 3
        assert_eq!(dataset.len(), 7);
        assert_eq!(dataset.maxlen, 3);
    }

    #[test]
    fn test_prefixes_and_targets() {
        let words = vec!["sol".to_string()];
        let index = CharIndex::from_words(&words);
        let dataset = Dataset::from_words(&words, &index).unwrap();
        let s = index.code('s').unwrap();
        let o = index.code('o').unwrap();
        let l = index.code('l').unwrap();
        assert_eq!(
            dataset.samples,
            vec![
                Sample { prefix: vec![s], target: o },
                Sample { prefix: vec![s, o], target: l },
            ]
        );
    }

    #[test]
    fn test_every_prefix_is_proper_prefix() {
        let words = words();
        let index = CharIndex::from_words(&words);
        let dataset = Dataset::from_words(&words, &index).unwrap();
        for sample in &dataset.samples {
            assert!(!sample.prefix.is_empty());
            let found = words.iter().any(|w| {
                let codes = index.encode(w);
                codes.len() > sample.prefix.len()
                    && codes.starts_with(&sample.prefix)
                    && codes[sample.prefix.len()] == sample.target
            });
            assert!(found, "no word explains {:?}", sample);
        }
    }

    #[test]
    fn test_inputs_are_left_padded_to_maxlen() {
        let words = vec!["sol".to_string(), "casas".to_string()];
        let index = CharIndex::from_words(&words);
        let dataset = Dataset::from_words(&words, &index).unwrap();
        let inputs = dataset.inputs();
        assert_eq!(inputs.dim(), (dataset.len(), 4));
        let s = index.code('s').unwrap();
        assert_eq!(inputs.row(0).to_vec(), vec![PAD, PAD, PAD, s]);
    }

    #[test]
    fn test_targets_are_one_hot() {
        let words = vec!["ab".to_string()];
        let index = CharIndex::from_words(&words);
        let dataset = Dataset::from_words(&words, &index).unwrap();
        let targets = dataset.targets(index.vocab_size());
        assert_eq!(targets.dim(), (1, 3));
        assert_eq!(targets.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_no_samples_is_an_error() {
        let words = vec!["a".to_string(), "b".to_string()];
        let index = CharIndex::from_words(&words);
        assert!(matches!(
            Dataset::from_words(&words, &index),
            Err(CharModelError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_pad_sequence_keeps_most_recent() {
        assert_eq!(pad_sequence(&[1, 2], 4), vec![0, 0, 1, 2]);
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5], 3), vec![3, 4, 5]);
        assert_eq!(pad_sequence(&[7, 8, 9], 3), vec![7, 8, 9]);
        assert_eq!(pad_sequence(&[], 2), vec![0, 0]);
    }
}
