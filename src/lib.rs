// lib.rs - reclink library root

//! # reclink - Record-linkage toolkit
//!
//! Given two datasets of records, a reference set and a target set, this
//! library produces the pairs whose composite weighted distance stays under
//! a threshold, together with the underlying distance matrix. It covers the
//! full alignment pipeline (normalization, blocking, per-attribute metric
//! matrices, weighted sum, threshold extraction), a MinHash/LSH engine for
//! near-duplicate text blocking, an external-memory driver for huge input
//! files and a named-entity recognition process mapping text spans onto
//! URIs.
//!
//! ## Features
//!
//! - **Distance functions**: Levenshtein, Soundex, Jaccard, temporal,
//!   geographical, Euclidean, plus custom metrics
//! - **Blocking family**: key/soundex, n-gram, sorted neighborhood,
//!   k-means, k-d tree, MinHash+LSH, and blocking pipelines
//! - **Parallel core**: per-processing matrix fill and per-block alignment
//!   run on a thread pool
//! - **External-memory driver**: page-by-page alignment with a persistent
//!   best-distance cache
//! - **NER**: tokenized recognition over lexical, SPARQL and RQL sources
//!   with preprocessor and filter chains
//!
//! ## Basic usage
//!
//! ```rust,no_run
//! use reclink::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let refset = parse_file("reference.csv".as_ref(), &ParseSpec::default())?;
//! let targetset = parse_file("target.csv".as_ref(), &ParseSpec::default())?;
//!
//! let mut aligner = BaseAligner::new(
//!     0.3,
//!     vec![Processing::new(1, 1, Metric::Levenshtein)],
//! );
//! aligner.register_blocking(Box::new(NGramBlocking::new(1, 1)));
//! let (_, matched) = aligner.align(&refset, &targetset, false)?;
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod blocking;
pub mod cli;
pub mod data;
pub mod error;
pub mod matrix;
pub mod metrics;
pub mod minhash;
pub mod ner;
pub mod normalize;
pub mod output;
pub mod reference_data;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::align::{alignall_iterative, BaseAligner, IterativeOptions, PipelineAligner};
    pub use crate::blocking::{
        Blocking, KdTreeBlocking, KeyBlocking, KmeansBlocking, MinHashingBlocking, NGramBlocking,
        PipelineBlocking, SortedNeighborhoodBlocking, SoundexBlocking,
    };
    pub use crate::data::{parse_file, ColumnSpec, Dataset, Key, ParseSpec, Record, Value};
    pub use crate::matrix::{DistanceMatrix, Processing, SparseMatrix};
    pub use crate::metrics::{Granularity, Language, Metric, Units};
    pub use crate::minhash::Minlsh;
    pub use crate::ner::{LexicalSource, NerProcess, NerSource, RichStringTokenizer};
    pub use crate::normalize::{
        NormalizerPipeline, RegexpNormalizer, RoundNormalizer, SimplifyNormalizer,
        UnicodeNormalizer,
    };
    pub use crate::output::write_results;
}

// Re-export the most used types at the root level
pub use align::{BaseAligner, MatchedMap, PipelineAligner};
pub use blocking::Blocking;
pub use data::{Dataset, Key, Record, Value};
pub use matrix::Processing;
pub use metrics::Metric;
pub use minhash::Minlsh;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!("reclink v{} - Record-linkage toolkit", VERSION)
}
