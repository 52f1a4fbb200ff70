// key.rs - Key-based blocking

use std::collections::HashMap;

use super::{Block, BlockIter, Blocking};
use crate::data::{Dataset, Key, Value};
use crate::error::BlockingError;
use crate::metrics::{soundex_code, Language};

pub type KeyCallback = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Blocking on a key function: one index per dataset maps `key_fn(attr)` to
/// the records carrying that key, and one block is emitted per key present
/// on both sides.
pub struct KeyBlocking {
    ref_attr_index: usize,
    target_attr_index: usize,
    callback: KeyCallback,
    // key order of first appearance in the reference set, for deterministic
    // iteration
    key_order: Vec<String>,
    reference_index: HashMap<String, Vec<(usize, Key)>>,
    target_index: HashMap<String, Vec<(usize, Key)>>,
    fitted: bool,
}

impl KeyBlocking {
    pub fn new(ref_attr_index: usize, target_attr_index: usize, callback: KeyCallback) -> Self {
        KeyBlocking {
            ref_attr_index,
            target_attr_index,
            callback,
            key_order: Vec::new(),
            reference_index: HashMap::new(),
            target_index: HashMap::new(),
            fitted: false,
        }
    }
}

impl Blocking for KeyBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.cleanup();
        for (ind, record) in refset.iter().enumerate() {
            let key = (self.callback)(record.value(self.ref_attr_index));
            if !self.reference_index.contains_key(&key) {
                self.key_order.push(key.clone());
            }
            self.reference_index
                .entry(key)
                .or_default()
                .push((ind, record.id()));
        }
        for (ind, record) in targetset.iter().enumerate() {
            let key = (self.callback)(record.value(self.target_attr_index));
            self.target_index
                .entry(key)
                .or_default()
                .push((ind, record.id()));
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
        Ok(Box::new(self.key_order.iter().filter_map(move |key| {
            let refs = self.reference_index.get(key)?;
            let targets = self.target_index.get(key)?;
            if refs.is_empty() || targets.is_empty() {
                return None;
            }
            Some(Block {
                refs: refs.clone(),
                targets: targets.clone(),
            })
        })))
    }

    fn cleanup(&mut self) {
        self.key_order.clear();
        self.reference_index.clear();
        self.target_index.clear();
        self.fitted = false;
    }
}

/// Key blocking on the Soundex code of the attribute. Values the code
/// rejects (non-alphabetic) fall back to their raw upper-cased text so the
/// blocking stays total.
pub struct SoundexBlocking {
    inner: KeyBlocking,
}

impl SoundexBlocking {
    pub fn new(ref_attr_index: usize, target_attr_index: usize, language: Language) -> Self {
        let callback: KeyCallback = Box::new(move |value: &Value| {
            let text = value.to_text();
            soundex_code(&text, language).unwrap_or_else(|_| text.to_uppercase())
        });
        SoundexBlocking {
            inner: KeyBlocking::new(ref_attr_index, target_attr_index, callback),
        }
    }
}

impl Blocking for SoundexBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.inner.fit(refset, targetset);
    }

    fn is_fitted(&self) -> bool {
        self.inner.is_fitted()
    }

    fn iter_blocks(&self) -> Result<BlockIter<'_>, BlockingError> {
        self.inner.iter_blocks()
    }

    fn cleanup(&mut self) {
        self.inner.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocking::test_fixtures::*;

    fn soundex_callback() -> KeyCallback {
        Box::new(|v: &Value| {
            soundex_code(&v.to_text(), Language::English).unwrap_or_default()
        })
    }

    fn id_block(refs: &[&str], targets: &[&str]) -> (Vec<Key>, Vec<Key>) {
        (
            refs.iter().map(|s| Key::from(*s)).collect(),
            targets.iter().map(|s| Key::from(*s)).collect(),
        )
    }

    #[test]
    fn test_not_fitted() {
        let blocking = KeyBlocking::new(1, 1, soundex_callback());
        assert!(matches!(
            blocking.iter_blocks(),
            Err(BlockingError::NotFitted)
        ));
    }

    #[test]
    fn test_keyblocking_blocks() {
        let mut blocking = KeyBlocking::new(1, 1, soundex_callback());
        blocking.fit(&soundex_refset(), &soundex_targetset());
        let blocks: Vec<(Vec<Key>, Vec<Key>)> = blocking.iter_id_blocks().unwrap().collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks.contains(&id_block(&["a1", "a7"], &["b3", "b6"])));
        assert!(blocks.contains(&id_block(&["a2", "a5"], &["b4"])));
        assert!(blocks.contains(&id_block(&["a3"], &["b1", "b2"])));
    }

    #[test]
    fn test_keyblocking_indice_blocks() {
        let mut blocking = KeyBlocking::new(1, 1, soundex_callback());
        blocking.fit(&soundex_refset(), &soundex_targetset());
        let blocks: Vec<(Vec<usize>, Vec<usize>)> =
            blocking.iter_indice_blocks().unwrap().collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks.contains(&(vec![0, 6], vec![2, 5])));
        assert!(blocks.contains(&(vec![1, 4], vec![3])));
        assert!(blocks.contains(&(vec![2], vec![0, 1])));
    }

    #[test]
    fn test_keyblocking_pairs() {
        let mut blocking = KeyBlocking::new(1, 1, soundex_callback());
        blocking.fit(&soundex_refset(), &soundex_targetset());
        let pairs: Vec<(Key, Key)> = blocking.iter_id_pairs().unwrap().collect();
        assert_eq!(pairs.len(), SOUNDEX_PAIRS.len());
        for (a, b) in SOUNDEX_PAIRS {
            assert!(pairs.contains(&(Key::from(a), Key::from(b))));
        }
    }

    #[test]
    fn test_soundex_blocking() {
        let mut blocking = SoundexBlocking::new(1, 1, Language::English);
        blocking.fit(&soundex_refset(), &soundex_targetset());
        let pairs: Vec<(Key, Key)> = blocking.iter_id_pairs().unwrap().collect();
        assert_eq!(pairs.len(), 8);
        for (a, b) in SOUNDEX_PAIRS {
            assert!(pairs.contains(&(Key::from(a), Key::from(b))));
        }
    }

    #[test]
    fn test_block_sides_never_empty() {
        let mut blocking = SoundexBlocking::new(1, 1, Language::English);
        blocking.fit(&soundex_refset(), &soundex_targetset());
        for block in blocking.iter_blocks().unwrap() {
            assert!(!block.refs.is_empty() && !block.targets.is_empty());
        }
    }
}
