// mod.rs - MinHash + locality-sensitive hashing over text documents

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::MinhashError;

/// Default cap on the number of precomputed hash-table entries (siglen x
/// features). Above it, signatures are streamed document by document.
pub const DEFAULT_PRECOMPUTE_LIMIT: usize = 50_000_000;

/// Iterate the k-wordgrams of a sentence: every window of k consecutive
/// space-separated tokens, shorter tails included, so a document with fewer
/// than k tokens contributes its whole string as a single feature.
pub fn iter_wordgrams(sentence: &str, k: usize) -> Vec<String> {
    let words: Vec<&str> = sentence.split(' ').collect();
    let k = k.max(1);
    (0..words.len())
        .map(|r| words[r..(r + k).min(words.len())].join(" "))
        .collect()
}

/// A random affine hash `x -> (a*x + b) mod modulus`.
#[derive(Debug, Clone, Copy)]
struct AffineHash {
    a: u64,
    b: u64,
    modulus: u64,
}

impl AffineHash {
    fn random(rng: &mut SmallRng, modulus: u64) -> Self {
        let upper = modulus.saturating_sub(1).max(1);
        AffineHash {
            a: rng.gen_range(1..=upper),
            b: rng.gen_range(1..=upper),
            modulus,
        }
    }

    #[inline]
    fn apply(&self, x: u64) -> u64 {
        ((self.a as u128 * x as u128 + self.b as u128) % self.modulus as u128) as u64
    }
}

/// The trained signature matrix: `siglen` rows, one column per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignatureMatrix {
    siglen: usize,
    ndocs: usize,
    values: Vec<u64>,
}

impl SignatureMatrix {
    #[inline]
    fn get(&self, row: usize, doc: usize) -> u64 {
        self.values[row * self.ndocs + doc]
    }
}

/// MinHashing + banded LSH to find similar documents.
///
/// Train on a document collection, then predict candidate groups for a
/// similarity threshold. Only the signature matrix survives training; the
/// feature universe is discarded (and never persisted).
pub struct Minlsh {
    trained: bool,
    sigmatrix: Option<SignatureMatrix>,
    precompute_limit: usize,
    seed: Option<u64>,
}

impl Default for Minlsh {
    fn default() -> Self {
        Self::new()
    }
}

impl Minlsh {
    pub fn new() -> Self {
        Minlsh {
            trained: false,
            sigmatrix: None,
            precompute_limit: DEFAULT_PRECOMPUTE_LIMIT,
            seed: None,
        }
    }

    /// Seeded variant for reproducible signatures.
    pub fn with_seed(seed: u64) -> Self {
        Minlsh {
            seed: Some(seed),
            ..Self::new()
        }
    }

    pub fn with_precompute_limit(mut self, limit: usize) -> Self {
        self.precompute_limit = limit;
        self
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Train on the given documents. `k` is the wordgram length (the lower,
    /// the faster), `siglen` the signature length.
    pub fn train<I, S>(&mut self, sentences: I, k: usize, siglen: usize)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (rows, nfeatures) = self.build_document_features(sentences, k);
        info!(
            "minhash training: {} documents over {} features",
            rows.len(),
            nfeatures
        );
        self.compute_signature_matrix(&rows, nfeatures, siglen);
        self.trained = true;
    }

    /// Assign feature ids in first-seen order and return each document as
    /// its feature-id list, plus the size of the feature universe.
    fn build_document_features<I, S>(&self, sentences: I, k: usize) -> (Vec<Vec<u64>>, u64)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut universe: HashMap<String, u64> = HashMap::new();
        let mut rows = Vec::new();
        for sentence in sentences {
            let mut row = Vec::new();
            for gram in iter_wordgrams(sentence.as_ref(), k) {
                let next_id = universe.len() as u64;
                let id = *universe.entry(gram).or_insert(next_id);
                row.push(id);
            }
            rows.push(row);
        }
        (rows, universe.len() as u64)
    }

    fn compute_signature_matrix(&mut self, rows: &[Vec<u64>], nfeatures: u64, siglen: usize) {
        let ndocs = rows.len();
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let modulus = nfeatures.max(2);
        let hashes: Vec<AffineHash> = (0..siglen)
            .map(|_| AffineHash::random(&mut rng, modulus))
            .collect();

        let mut values = vec![u64::MAX; siglen * ndocs];
        if siglen.saturating_mul(nfeatures as usize) <= self.precompute_limit {
            // Precompute the siglen x features table once, then take minima.
            let mut table = vec![0u64; siglen * nfeatures as usize];
            for (i, hash) in hashes.iter().enumerate() {
                for f in 0..nfeatures {
                    table[i * nfeatures as usize + f as usize] = hash.apply(f);
                }
            }
            for (doc, row) in rows.iter().enumerate() {
                for (i, _) in hashes.iter().enumerate() {
                    let min = row
                        .iter()
                        .map(|&f| table[i * nfeatures as usize + f as usize])
                        .min()
                        .unwrap_or(u64::MAX);
                    values[i * ndocs + doc] = min;
                }
            }
        } else {
            // Stream: recompute hashes per document to bound memory.
            for (doc, row) in rows.iter().enumerate() {
                for (i, hash) in hashes.iter().enumerate() {
                    let min = row.iter().map(|&f| hash.apply(f)).min().unwrap_or(u64::MAX);
                    values[i * ndocs + doc] = min;
                }
            }
        }

        self.sigmatrix = Some(SignatureMatrix {
            siglen,
            ndocs,
            values,
        });
    }

    /// Derive the LSH band size for a similarity threshold by bisecting the
    /// continuous extension of `f(b) = (b/L)^(1/b) - t` over [1, L]. The
    /// classical tuning: hit probability follows `1 - (1 - s^b)^(L/b)`.
    fn compute_band_size(threshold: f64, nbrows: usize) -> usize {
        let l = nbrows as f64;
        let f = |x: f64| (x / l).powf(1.0 / x) - threshold;
        let (mut lo, mut hi) = (1.0f64, l);
        let (flo, fhi) = (f(lo), f(hi));
        if flo >= 0.0 && fhi >= 0.0 {
            // below every band size: the most permissive banding
            return if flo.abs() <= fhi.abs() { 1 } else { nbrows };
        }
        if flo <= 0.0 && fhi <= 0.0 {
            return if flo.abs() <= fhi.abs() { 1 } else { nbrows };
        }
        for _ in 0..64 {
            let mid = (lo + hi) / 2.0;
            if (f(mid) < 0.0) == (flo < 0.0) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo as usize).clamp(1, nbrows)
    }

    /// Return the candidate groups of *possibly* similar documents for a
    /// similarity threshold in ]0 ; 1]: the union over all bands of the
    /// non-singleton buckets, as sorted index tuples.
    pub fn predict(&self, threshold: f64) -> Result<BTreeSet<Vec<usize>>, MinhashError> {
        let sig = self
            .sigmatrix
            .as_ref()
            .filter(|_| self.trained)
            .ok_or(MinhashError::NotTrained)?;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(MinhashError::BadThreshold { value: threshold });
        }

        let band_size = Self::compute_band_size(threshold, sig.siglen);
        let mut similars: BTreeSet<Vec<usize>> = BTreeSet::new();
        let mut buckets: HashMap<Vec<u64>, Vec<usize>> = HashMap::new();
        let mut r = 0;
        while r < sig.siglen {
            buckets.clear();
            let band_end = (r + band_size).min(sig.siglen);
            for doc in 0..sig.ndocs {
                let slice: Vec<u64> = (r..band_end).map(|row| sig.get(row, doc)).collect();
                buckets.entry(slice).or_default().push(doc);
            }
            for docs in buckets.values() {
                if docs.len() > 1 {
                    similars.insert(docs.clone());
                }
            }
            r += band_size;
        }
        Ok(similars)
    }

    /// Persist the signature matrix (lz4-compressed bincode). The feature
    /// universe is not saved; predict needs only the signatures.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MinhashError> {
        let sig = self
            .sigmatrix
            .as_ref()
            .filter(|_| self.trained)
            .ok_or(MinhashError::NotTrained)?;
        let encoded = bincode::serialize(sig).map_err(|e| MinhashError::Codec(e.to_string()))?;
        let compressed = lz4_flex::compress_prepend_size(&encoded);
        std::fs::write(path, compressed)?;
        Ok(())
    }

    /// Restore a signature matrix saved by [`Minlsh::save`] and mark the
    /// engine trained.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), MinhashError> {
        let compressed = std::fs::read(path)?;
        let decoded = lz4_flex::decompress_size_prepended(&compressed)
            .map_err(|e| MinhashError::Codec(e.to_string()))?;
        let sig: SignatureMatrix =
            bincode::deserialize(&decoded).map_err(|e| MinhashError::Codec(e.to_string()))?;
        self.sigmatrix = Some(sig);
        self.trained = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sentences() -> Vec<&'static str> {
        vec![
            "un nuage flotta dans le grand ciel bleu",
            "un nuage flotta dans le grand ciel noir",
            "je n aime pas ce genre de bandes dessinees tristes",
            "j aime les bandes dessinees de genre comiques",
            "pour quelle occasion vous etes vous appretee",
        ]
    }

    #[test]
    fn test_iter_wordgrams() {
        assert_eq!(
            iter_wordgrams("a b c", 2),
            vec!["a b".to_string(), "b c".to_string(), "c".to_string()]
        );
        // shorter than k: the whole string is the single leading feature
        assert_eq!(iter_wordgrams("abc", 3)[0], "abc");
    }

    #[test]
    fn test_predict_before_train() {
        let minlsh = Minlsh::new();
        assert!(matches!(minlsh.predict(0.5), Err(MinhashError::NotTrained)));
    }

    #[test]
    fn test_bad_threshold() {
        let mut minlsh = Minlsh::with_seed(6);
        minlsh.train(sample_sentences(), 1, 100);
        assert!(matches!(
            minlsh.predict(0.0),
            Err(MinhashError::BadThreshold { .. })
        ));
        assert!(matches!(
            minlsh.predict(1.5),
            Err(MinhashError::BadThreshold { .. })
        ));
    }

    #[test]
    fn test_similar_sentences_grouped() {
        let mut minlsh = Minlsh::with_seed(6);
        minlsh.train(sample_sentences(), 1, 200);
        let groups = minlsh.predict(0.4).unwrap();
        let paired: Vec<&Vec<usize>> = groups.iter().filter(|g| g.contains(&0)).collect();
        assert!(paired.iter().any(|g| g.contains(&1)));
    }

    #[test]
    fn test_threshold_one_needs_identical_signatures() {
        let sentences = vec!["a b c", "a b c", "x y z"];
        let mut minlsh = Minlsh::with_seed(42);
        minlsh.train(sentences, 1, 50);
        let groups = minlsh.predict(1.0).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups.contains(&vec![0usize, 1]));
    }

    #[test]
    fn test_low_threshold_admits_shared_signature_pairs() {
        let sentences = vec!["a b c", "c b a", "q r s"];
        let mut minlsh = Minlsh::with_seed(42);
        minlsh.train(sentences, 1, 50);
        // identical feature sets give identical signatures at any threshold
        let groups = minlsh.predict(0.01).unwrap();
        assert!(groups.iter().any(|g| g.contains(&0) && g.contains(&1)));
    }

    #[test]
    fn test_streamed_signatures_match_precomputed() {
        let mut precomputed = Minlsh::with_seed(7);
        precomputed.train(sample_sentences(), 1, 64);
        let mut streamed = Minlsh::with_seed(7).with_precompute_limit(0);
        streamed.train(sample_sentences(), 1, 64);
        assert_eq!(
            precomputed.predict(0.4).unwrap(),
            streamed.predict(0.4).unwrap()
        );
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatures.lz4");
        let mut minlsh = Minlsh::with_seed(6);
        minlsh.train(sample_sentences(), 1, 100);
        let expected = minlsh.predict(0.4).unwrap();
        minlsh.save(&path).unwrap();

        let mut restored = Minlsh::new();
        restored.load(&path).unwrap();
        assert!(restored.is_trained());
        assert_eq!(restored.predict(0.4).unwrap(), expected);
    }

    #[test]
    fn test_band_size_bounds() {
        assert_eq!(Minlsh::compute_band_size(1.0, 200), 200);
        assert_eq!(Minlsh::compute_band_size(1e-6, 200), 1);
        let mid = Minlsh::compute_band_size(0.4, 200);
        assert!(mid > 1 && mid < 200);
    }
}
