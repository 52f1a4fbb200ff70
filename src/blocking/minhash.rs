// minhash.rs - MinHash/LSH blocking

use log::warn;

use super::{record_ids, Block, BlockIter, Blocking};
use crate::data::Dataset;
use crate::error::BlockingError;
use crate::minhash::Minlsh;

/// Blocking through MinHash + LSH: the engine is trained on the reference
/// texts followed by the target texts (missing values contribute the empty
/// string), and each non-singleton LSH bucket that spans both origins
/// becomes a block.
pub struct MinHashingBlocking {
    ref_attr_index: usize,
    target_attr_index: usize,
    threshold: f64,
    kwordsgram: usize,
    siglen: usize,
    seed: Option<u64>,
    blocks: Vec<Block>,
    fitted: bool,
}

impl MinHashingBlocking {
    pub fn new(ref_attr_index: usize, target_attr_index: usize) -> Self {
        Self::with_params(ref_attr_index, target_attr_index, 0.1, 1, 200)
    }

    pub fn with_params(
        ref_attr_index: usize,
        target_attr_index: usize,
        threshold: f64,
        kwordsgram: usize,
        siglen: usize,
    ) -> Self {
        MinHashingBlocking {
            ref_attr_index,
            target_attr_index,
            threshold,
            kwordsgram,
            siglen,
            seed: None,
            blocks: Vec::new(),
            fitted: false,
        }
    }

    /// Seed the underlying signature engine for reproducible blocks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Blocking for MinHashingBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.cleanup();
        let mut minhasher = match self.seed {
            Some(seed) => Minlsh::with_seed(seed),
            None => Minlsh::new(),
        };
        let documents: Vec<String> = refset
            .iter()
            .map(|r| r.value(self.ref_attr_index).to_text())
            .chain(
                targetset
                    .iter()
                    .map(|r| r.value(self.target_attr_index).to_text()),
            )
            .collect();
        minhasher.train(documents.iter(), self.kwordsgram, self.siglen);

        let nb_elements = refset.len();
        let refids = record_ids(refset);
        let targetids = record_ids(targetset);
        match minhasher.predict(self.threshold) {
            Ok(groups) => {
                for group in groups {
                    let mut refs = Vec::new();
                    let mut targets = Vec::new();
                    for i in group {
                        if i >= nb_elements {
                            targets.push(targetids[i - nb_elements].clone());
                        } else {
                            refs.push(refids[i].clone());
                        }
                    }
                    if !refs.is_empty() && !targets.is_empty() {
                        self.blocks.push(Block { refs, targets });
                    }
                }
            }
            Err(e) => warn!("minhash blocking produced no blocks: {}", e),
        }
        self.fitted = true;
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn iter_blocks(&self) -> Result<BlockIter<'_>, BlockingError> {
        if !self.fitted {
            return Err(BlockingError::NotFitted);
        }
        Ok(Box::new(self.blocks.iter().cloned()))
    }

    fn cleanup(&mut self) {
        self.blocks.clear();
        self.fitted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Record, Value};

    fn text_record(id: &str, text: &str) -> Record {
        Record::from_id(id, vec![Value::from("label"), Value::from(text)])
    }

    #[test]
    fn test_minhashing_blocking() {
        // simplified French sentences; near-duplicates must land together
        let refset: Dataset = vec![
            text_record("V1", "nuage flotta grand ciel bleu"),
            text_record("V2", "occasion etes appretee"),
            text_record("V3", "vis ensemble plusieurs occasions"),
        ];
        let targetset: Dataset = vec![
            text_record("T1", "nuage flotta grand ciel noir"),
            text_record("T2", "vis ensemble plusieurs occasions"),
        ];
        let mut blocking = MinHashingBlocking::with_params(2, 2, 0.4, 1, 200).with_seed(6);
        blocking.fit(&refset, &targetset);
        let blocks: Vec<(Vec<usize>, Vec<usize>)> =
            blocking.iter_indice_blocks().unwrap().collect();
        assert!(blocks.iter().any(|(r, t)| r.contains(&0) && t.contains(&0)));
        assert!(blocks.iter().any(|(r, t)| r.contains(&2) && t.contains(&1)));
        for (refs, targets) in blocks {
            assert!(!refs.is_empty() && !targets.is_empty());
        }
    }

    #[test]
    fn test_minhashing_missing_values() {
        let refset: Dataset = vec![
            Record::from_id("V1", vec![Value::from("l"), Value::Empty]),
            text_record("V2", "alpha beta gamma"),
        ];
        let targetset: Dataset = vec![text_record("T1", "alpha beta gamma")];
        let mut blocking = MinHashingBlocking::with_params(2, 2, 0.9, 1, 100).with_seed(1);
        blocking.fit(&refset, &targetset);
        let blocks: Vec<(Vec<usize>, Vec<usize>)> =
            blocking.iter_indice_blocks().unwrap().collect();
        assert!(blocks.iter().any(|(r, t)| r.contains(&1) && t.contains(&0)));
    }
}
