// mod.rs - Built-in reference tables

pub mod stopwords;

pub use stopwords::{stopwords_for, ENGLISH_STOPWORDS, FRENCH_STOPWORDS};
