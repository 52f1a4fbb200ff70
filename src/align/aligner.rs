// aligner.rs - Divide-and-conquer record alignment

use std::collections::HashMap;

use rayon::prelude::*;

use crate::blocking::{Block, Blocking};
use crate::data::{Dataset, Key};
use crate::error::AlignError;
use crate::matrix::{composite_matrix, SparseMatrix};
use crate::matrix::Processing;
use crate::normalize::NormalizerPipeline;

/// All pairs within the threshold:
/// (ref index, ref id) -> [((target index, target id), distance)].
/// Entries are deduplicated on the (target index, target id, distance)
/// triple, so cross-block overlap keeps set semantics.
pub type MatchedMap = HashMap<(usize, Key), Vec<((usize, Key), f32)>>;

/// One aligned pair as yielded by [`BaseAligner::get_aligned_pairs`].
pub type AlignedPair = ((usize, Key), (usize, Key), f32);

fn insert_match(
    matched: &mut MatchedMap,
    ref_addr: (usize, Key),
    target_addr: (usize, Key),
    distance: f32,
) {
    let entries = matched.entry(ref_addr).or_default();
    let candidate = (target_addr, distance);
    if !entries.contains(&candidate) {
        entries.push(candidate);
    }
}

/// Combines normalizers, processings, a blocking and a threshold into the
/// full alignment pipeline: normalize, block, build the composite distance
/// matrix per block, extract the matches and merge them globally.
pub struct BaseAligner {
    threshold: f32,
    processings: Vec<Processing>,
    ref_normalizer: Option<NormalizerPipeline>,
    target_normalizer: Option<NormalizerPipeline>,
    blocking: Option<Box<dyn Blocking>>,
    nb_comparisons: u64,
}

impl BaseAligner {
    pub fn new(threshold: f32, processings: Vec<Processing>) -> Self {
        BaseAligner {
            threshold,
            processings,
            ref_normalizer: None,
            target_normalizer: None,
            blocking: None,
            nb_comparisons: 0,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn register_ref_normalizer(&mut self, pipeline: NormalizerPipeline) {
        self.ref_normalizer = Some(pipeline);
    }

    pub fn register_target_normalizer(&mut self, pipeline: NormalizerPipeline) {
        self.target_normalizer = Some(pipeline);
    }

    pub fn register_blocking(&mut self, blocking: Box<dyn Blocking>) {
        self.blocking = Some(blocking);
    }

    /// Number of cell comparisons done by the last align() calls.
    pub fn nb_comparisons(&self) -> u64 {
        self.nb_comparisons
    }

    /// Align `refset` onto `targetset`. Returns the sparse distance matrix
    /// (when `want_matrix` is set) and the matched map of all pairs whose
    /// composite distance is at or under the threshold.
    pub fn align(
        &mut self,
        refset: &Dataset,
        targetset: &Dataset,
        want_matrix: bool,
    ) -> Result<(Option<SparseMatrix>, MatchedMap), AlignError> {
        for processing in &self.processings {
            processing.validate(refset, targetset)?;
        }

        let refset = self.normalized(refset, true)?;
        let targetset = self.normalized(targetset, false)?;

        let matched = if self.blocking.is_some() {
            self.align_blocked(&refset, &targetset)?
        } else {
            self.align_full(&refset, &targetset)?
        };

        let matrix = want_matrix.then(|| {
            let mut sparse = SparseMatrix::new(refset.len(), targetset.len());
            for ((i, _), entries) in &matched {
                for ((j, _), distance) in entries {
                    sparse.set(*i, *j, *distance);
                }
            }
            sparse
        });
        Ok((matrix, matched))
    }

    fn normalized(&self, dataset: &Dataset, reference: bool) -> Result<Dataset, AlignError> {
        let pipeline = if reference {
            self.ref_normalizer.as_ref()
        } else {
            self.target_normalizer.as_ref()
        };
        match pipeline {
            Some(pipeline) if !pipeline.is_empty() => {
                let mut normalized = dataset.clone();
                pipeline.normalize_dataset(&mut normalized)?;
                Ok(normalized)
            }
            _ => Ok(dataset.clone()),
        }
    }

    /// Alignment over the full |R| x |T| product.
    fn align_full(
        &mut self,
        refset: &Dataset,
        targetset: &Dataset,
    ) -> Result<MatchedMap, AlignError> {
        let ref_indexes: Vec<usize> = (0..refset.len()).collect();
        let target_indexes: Vec<usize> = (0..targetset.len()).collect();
        let composite =
            composite_matrix(&self.processings, refset, targetset, &ref_indexes, &target_indexes)?;
        self.nb_comparisons += (refset.len() * targetset.len()) as u64;

        let mut matched = MatchedMap::new();
        for (i, entries) in composite.matched(self.threshold) {
            for (j, distance) in entries {
                insert_match(
                    &mut matched,
                    (i, refset[i].id()),
                    (j, targetset[j].id()),
                    distance,
                );
            }
        }
        Ok(matched)
    }

    /// Divide-and-conquer: fit the blocking, align inside every block in
    /// parallel, lift local indices back to global addressing and merge the
    /// per-block partial maps.
    fn align_blocked(
        &mut self,
        refset: &Dataset,
        targetset: &Dataset,
    ) -> Result<MatchedMap, AlignError> {
        let blocks: Vec<Block> = match self.blocking.as_mut() {
            Some(blocking) => {
                blocking.fit(refset, targetset);
                blocking.iter_blocks()?.collect()
            }
            None => return self.align_full(refset, targetset),
        };

        let threshold = self.threshold;
        let processings = &self.processings;
        let results: Result<Vec<(MatchedMap, u64)>, AlignError> = blocks
            .par_iter()
            .map(|block| {
                let ref_indexes = block.ref_indexes();
                let target_indexes = block.target_indexes();
                let composite = composite_matrix(
                    processings,
                    refset,
                    targetset,
                    &ref_indexes,
                    &target_indexes,
                )?;
                let mut local = MatchedMap::new();
                for (local_i, entries) in composite.matched(threshold) {
                    for (local_j, distance) in entries {
                        insert_match(
                            &mut local,
                            block.refs[local_i].clone(),
                            block.targets[local_j].clone(),
                            distance,
                        );
                    }
                }
                Ok((local, (ref_indexes.len() * target_indexes.len()) as u64))
            })
            .collect();

        let mut matched = MatchedMap::new();
        for (local, comparisons) in results? {
            self.nb_comparisons += comparisons;
            for (ref_addr, entries) in local {
                for (target_addr, distance) in entries {
                    insert_match(&mut matched, ref_addr.clone(), target_addr, distance);
                }
            }
        }
        Ok(matched)
    }

    /// Stream the aligned pairs. With `unique`, each reference yields only
    /// its minimum-distance pair; ties break on the lowest (target index,
    /// target id).
    pub fn get_aligned_pairs(
        &mut self,
        refset: &Dataset,
        targetset: &Dataset,
        unique: bool,
    ) -> Result<Vec<AlignedPair>, AlignError> {
        let (_, matched) = self.align(refset, targetset, false)?;
        Ok(aligned_pairs_of(&matched, unique))
    }
}

/// Flatten a matched map into aligned pairs, sorted by reference address for
/// deterministic output. See [`BaseAligner::get_aligned_pairs`].
pub fn aligned_pairs_of(matched: &MatchedMap, unique: bool) -> Vec<AlignedPair> {
    let mut refs: Vec<&(usize, Key)> = matched.keys().collect();
    refs.sort();
    let mut pairs = Vec::new();
    for ref_addr in refs {
        let entries = &matched[ref_addr];
        if unique {
            if let Some(best) = entries.iter().min_by(|a, b| {
                (a.1, &(a.0).0, &(a.0).1)
                    .partial_cmp(&(b.1, &(b.0).0, &(b.0).1))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }) {
                pairs.push((ref_addr.clone(), best.0.clone(), best.1));
            }
        } else {
            for (target_addr, distance) in entries {
                pairs.push((ref_addr.clone(), target_addr.clone(), *distance));
            }
        }
    }
    pairs
}
