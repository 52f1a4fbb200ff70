// mod.rs - Attribute normalizers and the normalization pipeline

pub mod lemmas;
pub mod unaccent;

pub use lemmas::{lemmatized, lemmatized_word, load_lemmas};
pub use unaccent::{fold_char, unormalize};

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::data::{Dataset, Record, Value};
use crate::error::NormalizeError;

/// ASCII punctuation characters stripped by the simplify pipeline.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// A pure transformation of one attribute value, bound to the attribute it
/// operates on. The id column (index 0) is never a valid target.
pub trait Normalizer: Send + Sync {
    /// Index of the attribute this normalizer rewrites.
    fn attr_index(&self) -> usize;

    /// Normalize a single value. Empty values never reach this method.
    fn normalize_value(&self, value: &Value) -> Result<Value, NormalizeError>;

    fn normalize_record(&self, record: &mut Record) -> Result<(), NormalizeError> {
        let index = self.attr_index();
        if record.value(index).is_empty() {
            return Ok(());
        }
        let normalized = self.normalize_value(record.value(index))?;
        record.set_value(index, normalized);
        Ok(())
    }

    fn normalize_dataset(&self, dataset: &mut Dataset) -> Result<(), NormalizeError> {
        for record in dataset.iter_mut() {
            self.normalize_record(record)?;
        }
        Ok(())
    }
}

fn value_text(value: &Value) -> String {
    value.to_string()
}

/// Lower-case + accent fold through the fixed decomposition table.
pub struct UnicodeNormalizer {
    attr_index: usize,
    substitute: Option<char>,
}

impl UnicodeNormalizer {
    pub fn new(attr_index: usize) -> Self {
        UnicodeNormalizer {
            attr_index,
            substitute: None,
        }
    }

    /// Replace non-mappable code points with `substitute` instead of failing.
    pub fn with_substitute(attr_index: usize, substitute: char) -> Self {
        UnicodeNormalizer {
            attr_index,
            substitute: Some(substitute),
        }
    }
}

impl Normalizer for UnicodeNormalizer {
    fn attr_index(&self) -> usize {
        self.attr_index
    }

    fn normalize_value(&self, value: &Value) -> Result<Value, NormalizeError> {
        let folded = unormalize(&value_text(value), self.substitute)?;
        Ok(Value::Str(folded.to_lowercase()))
    }
}

/// The text-simplification pipeline: optional lemma substitution, lower
/// case, punctuation replaced by spaces, optional stop-word removal.
/// Accents are preserved.
pub struct SimplifyNormalizer {
    attr_index: usize,
    lemmas: Option<HashMap<String, String>>,
    remove_stopwords: bool,
    stopwords: HashSet<&'static str>,
}

impl SimplifyNormalizer {
    pub fn new(
        attr_index: usize,
        lemmas: Option<HashMap<String, String>>,
        remove_stopwords: bool,
        stopwords: HashSet<&'static str>,
    ) -> Self {
        SimplifyNormalizer {
            attr_index,
            lemmas,
            remove_stopwords,
            stopwords,
        }
    }

    /// French defaults: lemma table optional, stop words removed.
    pub fn french(attr_index: usize, lemmas: Option<HashMap<String, String>>) -> Self {
        Self::new(
            attr_index,
            lemmas,
            true,
            crate::reference_data::stopwords_for("fr"),
        )
    }

    pub fn simplify(&self, text: &str) -> String {
        let sentence = match &self.lemmas {
            Some(table) => lemmatized(text, table),
            None => text.to_string(),
        };
        let sentence = sentence.to_lowercase();
        let clean: String = sentence
            .chars()
            .map(|c| if PUNCTUATION.contains(c) { ' ' } else { c })
            .collect();
        let clean = clean.trim().replace("  ", " ");
        if !self.remove_stopwords {
            return clean;
        }
        clean
            .split(' ')
            .filter(|w| !self.stopwords.contains(w))
            .collect::<Vec<&str>>()
            .join(" ")
    }
}

impl Normalizer for SimplifyNormalizer {
    fn attr_index(&self) -> usize {
        self.attr_index
    }

    fn normalize_value(&self, value: &Value) -> Result<Value, NormalizeError> {
        Ok(Value::Str(self.simplify(&value_text(value))))
    }
}

/// Coerce to float, round half-to-even, format with a fixed decimal count.
pub struct RoundNormalizer {
    attr_index: usize,
    ndigits: usize,
}

impl RoundNormalizer {
    pub fn new(attr_index: usize, ndigits: usize) -> Self {
        RoundNormalizer { attr_index, ndigits }
    }
}

impl Normalizer for RoundNormalizer {
    fn attr_index(&self) -> usize {
        self.attr_index
    }

    fn normalize_value(&self, value: &Value) -> Result<Value, NormalizeError> {
        let number = value
            .as_f64()
            .ok_or_else(|| NormalizeError::PatternMismatch {
                value: value.to_string(),
            })?;
        Ok(Value::Str(format!(
            "{:.precision$}",
            number,
            precision = self.ndigits
        )))
    }
}

/// Apply a named-capture regex and rebuild the value from an output template
/// using `%(name)s` placeholders.
pub struct RegexpNormalizer {
    attr_index: usize,
    regex: Regex,
    output: String,
}

impl RegexpNormalizer {
    pub fn new(attr_index: usize, pattern: &str, output: &str) -> Result<Self, regex::Error> {
        Ok(RegexpNormalizer {
            attr_index,
            regex: Regex::new(pattern)?,
            output: output.to_string(),
        })
    }
}

impl Normalizer for RegexpNormalizer {
    fn attr_index(&self) -> usize {
        self.attr_index
    }

    fn normalize_value(&self, value: &Value) -> Result<Value, NormalizeError> {
        let text = value_text(value);
        let captures = self
            .regex
            .captures(&text)
            .filter(|c| c.get(0).map(|m| m.start()) == Some(0))
            .ok_or_else(|| NormalizeError::PatternMismatch {
                value: text.clone(),
            })?;
        let mut output = self.output.clone();
        for name in self.regex.capture_names().flatten() {
            if let Some(m) = captures.name(name) {
                output = output.replace(&format!("%({})s", name), m.as_str());
            }
        }
        Ok(Value::Str(output))
    }
}

/// An ordered sequence of normalizers applied to every record of a dataset.
/// Normalizers run in registration order; the id column is never modified.
pub struct NormalizerPipeline {
    normalizers: Vec<Box<dyn Normalizer>>,
}

impl NormalizerPipeline {
    pub fn new(normalizers: Vec<Box<dyn Normalizer>>) -> Result<Self, NormalizeError> {
        if normalizers.iter().any(|n| n.attr_index() == 0) {
            return Err(NormalizeError::IdColumn);
        }
        Ok(NormalizerPipeline { normalizers })
    }

    pub fn is_empty(&self) -> bool {
        self.normalizers.is_empty()
    }

    pub fn normalize_dataset(&self, dataset: &mut Dataset) -> Result<(), NormalizeError> {
        for normalizer in &self.normalizers {
            normalizer.normalize_dataset(dataset)?;
        }
        Ok(())
    }
}
