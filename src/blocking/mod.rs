// mod.rs - Blocking techniques
//
// Blocking splits the reference and target datasets into smaller candidate
// subsets that are aligned in detail afterwards. See P. Christen, Data
// Matching, for the background on the individual techniques.

pub mod kdtree;
pub mod key;
pub mod kmeans;
pub mod minhash;
pub mod ngram;
pub mod pipeline;
pub mod sorted;

pub use kdtree::KdTreeBlocking;
pub use key::{KeyBlocking, SoundexBlocking};
pub use kmeans::KmeansBlocking;
pub use minhash::MinHashingBlocking;
pub use ngram::NGramBlocking;
pub use pipeline::PipelineBlocking;
pub use sorted::SortedNeighborhoodBlocking;

use crate::data::{Dataset, Key};
use crate::error::BlockingError;

/// One candidate block: the (index, id) pairs of the reference records and
/// of the target records that may align. Both sides are non-empty for every
/// block a blocking emits.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub refs: Vec<(usize, Key)>,
    pub targets: Vec<(usize, Key)>,
}

impl Block {
    pub fn ref_indexes(&self) -> Vec<usize> {
        self.refs.iter().map(|(i, _)| *i).collect()
    }

    pub fn target_indexes(&self) -> Vec<usize> {
        self.targets.iter().map(|(i, _)| *i).collect()
    }

    pub fn ref_ids(&self) -> Vec<Key> {
        self.refs.iter().map(|(_, id)| id.clone()).collect()
    }

    pub fn target_ids(&self) -> Vec<Key> {
        self.targets.iter().map(|(_, id)| id.clone()).collect()
    }
}

/// The (index, id) address list of a dataset, in record order.
pub(crate) fn record_ids(dataset: &Dataset) -> Vec<(usize, Key)> {
    dataset
        .iter()
        .enumerate()
        .map(|(i, r)| (i, r.id()))
        .collect()
}

pub type BlockIter<'a> = Box<dyn Iterator<Item = Block> + 'a>;
pub type PairIter<'a> = Box<dyn Iterator<Item = ((usize, Key), (usize, Key))> + 'a>;

/// Common contract of all blocking techniques: `fit` consumes both datasets
/// and populates the internal indexes, `iter_blocks` lazily yields the
/// candidate blocks. Iterating before fitting fails with
/// [`BlockingError::NotFitted`].
pub trait Blocking: Send {
    /// Fit the blocking on the reference and target datasets. Fitting again
    /// resets any previous state.
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset);

    fn is_fitted(&self) -> bool;

    /// Iterate the candidate blocks, always as (reference side, target side).
    fn iter_blocks(&self) -> Result<BlockIter<'_>, BlockingError>;

    /// Drop the fitted state so the blocking can be reused.
    fn cleanup(&mut self);

    /// Blocks stripped to record indexes.
    fn iter_indice_blocks(
        &self,
    ) -> Result<Box<dyn Iterator<Item = (Vec<usize>, Vec<usize>)> + '_>, BlockingError> {
        Ok(Box::new(
            self.iter_blocks()?
                .map(|b| (b.ref_indexes(), b.target_indexes())),
        ))
    }

    /// Blocks stripped to record ids.
    fn iter_id_blocks(
        &self,
    ) -> Result<Box<dyn Iterator<Item = (Vec<Key>, Vec<Key>)> + '_>, BlockingError> {
        Ok(Box::new(
            self.iter_blocks()?.map(|b| (b.ref_ids(), b.target_ids())),
        ))
    }

    /// Every (reference, target) candidate pair, block by block.
    fn iter_pairs(&self) -> Result<PairIter<'_>, BlockingError> {
        Ok(Box::new(self.iter_blocks()?.flat_map(|block| {
            let targets = block.targets;
            block
                .refs
                .into_iter()
                .flat_map(move |r| {
                    targets
                        .clone()
                        .into_iter()
                        .map(move |t| (r.clone(), t))
                })
                .collect::<Vec<_>>()
                .into_iter()
        })))
    }

    fn iter_indice_pairs(
        &self,
    ) -> Result<Box<dyn Iterator<Item = (usize, usize)> + '_>, BlockingError> {
        Ok(Box::new(
            self.iter_pairs()?.map(|((i, _), (j, _))| (i, j)),
        ))
    }

    fn iter_id_pairs(&self) -> Result<Box<dyn Iterator<Item = (Key, Key)> + '_>, BlockingError> {
        Ok(Box::new(
            self.iter_pairs()?.map(|((_, a), (_, b))| (a, b)),
        ))
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use crate::data::{Dataset, Record, Value};

    /// The surname fixture shared by the key/soundex/ngram blocking tests.
    pub fn soundex_refset() -> Dataset {
        [
            ("a1", "smith"),
            ("a2", "neighan"),
            ("a3", "meier"),
            ("a4", "smithers"),
            ("a5", "nguyen"),
            ("a6", "faulkner"),
            ("a7", "sandy"),
        ]
        .iter()
        .map(|(id, name)| Record::from_id(*id, vec![Value::from(*name)]))
        .collect()
    }

    pub fn soundex_targetset() -> Dataset {
        [
            ("b1", "meier"),
            ("b2", "meier"),
            ("b3", "smith"),
            ("b4", "nguyen"),
            ("b5", "fawkner"),
            ("b6", "santi"),
            ("b7", "cain"),
        ]
        .iter()
        .map(|(id, name)| Record::from_id(*id, vec![Value::from(*name)]))
        .collect()
    }

    pub const SOUNDEX_PAIRS: [(&str, &str); 8] = [
        ("a3", "b1"),
        ("a3", "b2"),
        ("a2", "b4"),
        ("a5", "b4"),
        ("a1", "b3"),
        ("a1", "b6"),
        ("a7", "b3"),
        ("a7", "b6"),
    ];

    /// The French city fixture shared by the clustering blocking tests.
    pub fn city_refset() -> Dataset {
        vec![
            Record::from_id("V1", vec![Value::from("label1"), Value::from((6.14194444444, 48.67))]),
            Record::from_id("V2", vec![Value::from("label2"), Value::from((6.2, 49.0))]),
            Record::from_id("V3", vec![Value::from("label3"), Value::from((5.1, 48.0))]),
            Record::from_id("V4", vec![Value::from("label4"), Value::from((5.2, 48.1))]),
        ]
    }

    pub fn city_targetset() -> Dataset {
        vec![
            Record::from_id("T1", vec![Value::from("labelt1"), Value::from((6.2, 48.9))]),
            Record::from_id("T2", vec![Value::from("labelt2"), Value::from((5.3, 48.2))]),
            Record::from_id("T3", vec![Value::from("labelt3"), Value::from((6.25, 48.91))]),
        ]
    }
}
