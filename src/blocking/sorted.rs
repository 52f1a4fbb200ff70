// sorted.rs - Sorted-neighborhood blocking

use super::{Block, BlockIter, Blocking};
use crate::data::{Dataset, Key, Value};
use crate::error::BlockingError;

pub type SortKeyFn = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Sorted-neighborhood blocking: both datasets are merged, tagged with their
/// origin and stable-sorted by a key function; each reference record then
/// pairs with the target records within a window of `window_width` positions
/// on each side.
pub struct SortedNeighborhoodBlocking {
    ref_attr_index: usize,
    target_attr_index: usize,
    key_func: SortKeyFn,
    window_width: usize,
    // ((index, id), origin is target)
    sorted_dataset: Vec<((usize, Key), bool)>,
    fitted: bool,
}

impl SortedNeighborhoodBlocking {
    pub fn new(ref_attr_index: usize, target_attr_index: usize, window_width: usize) -> Self {
        Self::with_key(
            ref_attr_index,
            target_attr_index,
            Box::new(|v: &Value| v.to_text()),
            window_width,
        )
    }

    pub fn with_key(
        ref_attr_index: usize,
        target_attr_index: usize,
        key_func: SortKeyFn,
        window_width: usize,
    ) -> Self {
        SortedNeighborhoodBlocking {
            ref_attr_index,
            target_attr_index,
            key_func,
            window_width,
            sorted_dataset: Vec::new(),
            fitted: false,
        }
    }
}

impl Blocking for SortedNeighborhoodBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.cleanup();
        let mut tagged: Vec<((usize, Key), String, bool)> = refset
            .iter()
            .enumerate()
            .map(|(i, r)| {
                (
                    (i, r.id()),
                    (self.key_func)(r.value(self.ref_attr_index)),
                    false,
                )
            })
            .collect();
        tagged.extend(targetset.iter().enumerate().map(|(i, r)| {
            (
                (i, r.id()),
                (self.key_func)(r.value(self.target_attr_index)),
                true,
            )
        }));
        tagged.sort_by(|a, b| a.1.cmp(&b.1));
        self.sorted_dataset = tagged
            .into_iter()
            .map(|(address, _, is_target)| (address, is_target))
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
        let window = self.window_width;
        Ok(Box::new(
            self.sorted_dataset
                .iter()
                .enumerate()
                .filter_map(move |(position, (address, is_target))| {
                    if *is_target {
                        return None;
                    }
                    let min_ind = position.saturating_sub(window);
                    let max_ind = (position + window + 1).min(self.sorted_dataset.len());
                    let targets: Vec<(usize, Key)> = self.sorted_dataset[min_ind..max_ind]
                        .iter()
                        .filter(|(_, t)| *t)
                        .map(|(a, _)| a.clone())
                        .collect();
                    if targets.is_empty() {
                        return None;
                    }
                    Some(Block {
                        refs: vec![address.clone()],
                        targets,
                    })
                }),
        ))
    }

    fn cleanup(&mut self) {
        self.sorted_dataset.clear();
        self.fitted = false;
    }
}
