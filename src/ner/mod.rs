// mod.rs - Named-entity recognition

pub mod filters;
pub mod html;
pub mod preprocess;
pub mod process;
pub mod sources;
pub mod tokenizer;

pub use filters::{
    DisambiguationWordParts, NamedEntity, NerFilter, OccurrenceFilter, RdfTypeFilter,
    ReplacementRulesFilter,
};
pub use html::{NerHtmlPrettyPrint, NerValidXhtmlPrettyPrint};
pub use preprocess::{
    HashTagPreprocessor, LowerCaseFilterPreprocessor, LowerFirstWordPreprocessor, NerPreprocessor,
    StopwordsFilterPreprocessor, WordSizeFilterPreprocessor,
};
pub use process::NerProcess;
pub use sources::{LexicalSource, NerSource, RqlSessionSource, RqlUrlSource, SparqlSource};
pub use tokenizer::{RichStringTokenizer, Sentence, Token};
