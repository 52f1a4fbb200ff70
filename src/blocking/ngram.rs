// ngram.rs - N-gram prefix blocking

use super::{Block, BlockIter, Blocking};
use crate::data::{Dataset, Key};
use crate::error::BlockingError;

/// One level of the nested n-gram index; children keep insertion order so
/// iteration is deterministic.
#[derive(Debug, Default)]
struct NGramNode {
    children: Vec<(String, NGramNode)>,
    records: Vec<(usize, Key)>,
}

impl NGramNode {
    fn child_mut(&mut self, key: &str) -> &mut NGramNode {
        if let Some(pos) = self.children.iter().position(|(k, _)| k == key) {
            return &mut self.children[pos].1;
        }
        self.children.push((key.to_string(), NGramNode::default()));
        &mut self.children.last_mut().unwrap().1
    }

    fn child(&self, key: &str) -> Option<&NGramNode> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }
}

/// Blocking on nested n-gram prefixes: at depth level `i`, records are
/// partitioned by the `ngram_size`-character slice at offset
/// `i * ngram_size`, so two records co-occur iff all `depth` prefixes match.
pub struct NGramBlocking {
    ref_attr_index: usize,
    target_attr_index: usize,
    ngram_size: usize,
    depth: usize,
    reference_index: NGramNode,
    target_index: NGramNode,
    fitted: bool,
}

impl NGramBlocking {
    pub fn new(ref_attr_index: usize, target_attr_index: usize) -> Self {
        Self::with_params(ref_attr_index, target_attr_index, 2, 2)
    }

    pub fn with_params(
        ref_attr_index: usize,
        target_attr_index: usize,
        ngram_size: usize,
        depth: usize,
    ) -> Self {
        NGramBlocking {
            ref_attr_index,
            target_attr_index,
            ngram_size: ngram_size.max(1),
            depth: depth.max(1),
            reference_index: NGramNode::default(),
            target_index: NGramNode::default(),
            fitted: false,
        }
    }

    fn ngram_at(&self, chars: &[char], level: usize) -> String {
        let start = (level * self.ngram_size).min(chars.len());
        let end = ((level + 1) * self.ngram_size).min(chars.len());
        chars[start..end].iter().collect()
    }

    fn fit_dataset(&mut self, dataset: &Dataset, attr_index: usize, reference: bool) {
        for (ind, record) in dataset.iter().enumerate() {
            let chars: Vec<char> = record.value(attr_index).to_text().chars().collect();
            let grams: Vec<String> = (0..self.depth).map(|i| self.ngram_at(&chars, i)).collect();
            let root = if reference {
                &mut self.reference_index
            } else {
                &mut self.target_index
            };
            let mut node = root;
            for gram in &grams {
                node = node.child_mut(gram);
            }
            node.records.push((ind, record.id()));
        }
    }

    fn collect_blocks(ref_node: &NGramNode, target_node: &NGramNode, out: &mut Vec<Block>) {
        if !ref_node.records.is_empty() && !target_node.records.is_empty() {
            out.push(Block {
                refs: ref_node.records.clone(),
                targets: target_node.records.clone(),
            });
        }
        for (key, ref_child) in &ref_node.children {
            if let Some(target_child) = target_node.child(key) {
                Self::collect_blocks(ref_child, target_child, out);
            }
        }
    }
}

impl Blocking for NGramBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.cleanup();
        self.fit_dataset(refset, self.ref_attr_index, true);
        self.fit_dataset(targetset, self.target_attr_index, false);
        self.fitted = true;
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn iter_blocks(&self) -> Result<BlockIter<'_>, BlockingError> {
        if !self.fitted {
            return Err(BlockingError::NotFitted);
        }
        let mut blocks = Vec::new();
        Self::collect_blocks(&self.reference_index, &self.target_index, &mut blocks);
        Ok(Box::new(blocks.into_iter()))
    }

    fn cleanup(&mut self) {
        self.reference_index = NGramNode::default();
        self.target_index = NGramNode::default();
        self.fitted = false;
    }
}
