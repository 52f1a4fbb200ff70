// mod.rs - Aligners

pub mod aligner;
pub mod iterative;
pub mod pipeline;

pub use aligner::{aligned_pairs_of, AlignedPair, BaseAligner, MatchedMap};
pub use iterative::{alignall_iterative, load_cache, save_cache, AlignCache, IterativeOptions};
pub use pipeline::PipelineAligner;
