// pipeline.rs - Chained blockings

use super::{record_ids, Block, BlockIter, Blocking};
use crate::data::Dataset;
use crate::error::BlockingError;

/// Apply several blockings in sequence: every stage refines the blocks
/// produced so far, so the emitted pair set can only shrink as stages are
/// added. With `collect_stats`, the number of records admitted after each
/// stage is recorded.
pub struct PipelineBlocking {
    blockings: Vec<Box<dyn Blocking>>,
    collect_stats: bool,
    stats: Vec<(usize, usize)>,
    blocks: Vec<Block>,
    fitted: bool,
}

impl PipelineBlocking {
    pub fn new(blockings: Vec<Box<dyn Blocking>>) -> Self {
        PipelineBlocking {
            blockings,
            collect_stats: false,
            stats: Vec::new(),
            blocks: Vec::new(),
            fitted: false,
        }
    }

    pub fn with_stats(mut self) -> Self {
        self.collect_stats = true;
        self
    }

    /// Records admitted per stage, as (reference count, target count).
    pub fn stats(&self) -> &[(usize, usize)] {
        &self.stats
    }
}

impl Blocking for PipelineBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.cleanup();
        let mut current: Vec<(Vec<usize>, Vec<usize>)> = vec![(
            (0..refset.len()).collect(),
            (0..targetset.len()).collect(),
        )];

        for blocking in self.blockings.iter_mut() {
            let mut next: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
            for (ref_indexes, target_indexes) in &current {
                let sub_refset: Dataset =
                    ref_indexes.iter().map(|&i| refset[i].clone()).collect();
                let sub_targetset: Dataset =
                    target_indexes.iter().map(|&i| targetset[i].clone()).collect();
                blocking.cleanup();
                blocking.fit(&sub_refset, &sub_targetset);
                // the stage was just fitted, so iteration cannot fail
                let sub_blocks: Vec<(Vec<usize>, Vec<usize>)> =
                    match blocking.iter_indice_blocks() {
                        Ok(blocks) => blocks.collect(),
                        Err(_) => Vec::new(),
                    };
                for (sub_refs, sub_targets) in sub_blocks {
                    next.push((
                        sub_refs.iter().map(|&i| ref_indexes[i]).collect(),
                        sub_targets.iter().map(|&i| target_indexes[i]).collect(),
                    ));
                }
            }
            if self.collect_stats {
                let ref_count: usize = next.iter().map(|(r, _)| r.len()).sum();
                let target_count: usize = next.iter().map(|(_, t)| t.len()).sum();
                self.stats.push((ref_count, target_count));
            }
            current = next;
        }

        let refids = record_ids(refset);
        let targetids = record_ids(targetset);
        self.blocks = current
            .into_iter()
            .filter(|(refs, targets)| !refs.is_empty() && !targets.is_empty())
            .map(|(refs, targets)| Block {
                refs: refs.iter().map(|&i| refids[i].clone()).collect(),
                targets: targets.iter().map(|&i| targetids[i].clone()).collect(),
            })
            .collect();
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
        self.stats.clear();
        self.fitted = false;
    }
}
