// sources.rs - Named-entity sources

use std::collections::HashMap;
use std::sync::Mutex;

use log::warn;

use crate::data::loaders::rql::{rql_url_query, RqlSession};
use crate::data::loaders::sparql::sparql_values;
use crate::error::DataIoError;
use crate::ner::preprocess::NerPreprocessor;
use crate::ner::tokenizer::Token;

/// Shared plumbing of every source: name, per-source preprocessors and the
/// per-word lookup cache. Endpoint failures are soft: logged and degraded to
/// an empty result so the walk continues.
pub struct SourceCore {
    name: Option<String>,
    preprocessors: Vec<Box<dyn NerPreprocessor>>,
    use_cache: bool,
    cache: Mutex<HashMap<String, Vec<String>>>,
}

impl SourceCore {
    pub fn new(name: Option<String>) -> Self {
        SourceCore {
            name,
            preprocessors: Vec::new(),
            use_cache: true,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn add_preprocessor(&mut self, preprocessor: Box<dyn NerPreprocessor>) {
        self.preprocessors.push(preprocessor);
    }

    fn recognize<Q>(&self, token: &Token, query_word: Q) -> Vec<String>
    where
        Q: Fn(&str) -> Result<Vec<String>, DataIoError>,
    {
        let mut token = token.clone();
        for preprocessor in &self.preprocessors {
            match preprocessor.process(&token) {
                Some(processed) => token = processed,
                None => return Vec::new(),
            }
        }
        if token.word.is_empty() {
            return Vec::new();
        }
        if self.use_cache {
            if let Ok(cache) = self.cache.lock() {
                if let Some(uris) = cache.get(&token.word) {
                    return uris.clone();
                }
            }
        }
        let uris = match query_word(&token.word) {
            Ok(uris) => uris,
            Err(e) => {
                warn!("NER source lookup failed for '{}': {}", token.word, e);
                Vec::new()
            }
        };
        if self.use_cache {
            if let Ok(mut cache) = self.cache.lock() {
                cache.insert(token.word.clone(), uris.clone());
            }
        }
        uris
    }
}

/// A named-entity source: maps a token onto the URIs it may denote.
pub trait NerSource: Send + Sync {
    fn name(&self) -> Option<&str>;

    /// Raw per-word lookup, bypassing preprocessors and cache.
    fn query_word(&self, word: &str) -> Result<Vec<String>, DataIoError>;

    /// Recognize a token: apply the source preprocessors, consult the cache,
    /// then look the word up.
    fn recognize_token(&self, token: &Token) -> Vec<String>;
}

/// Source over a precomputed in-memory word -> URI lexicon.
pub struct LexicalSource {
    core: SourceCore,
    lexicon: HashMap<String, String>,
}

impl LexicalSource {
    pub fn new(lexicon: HashMap<String, String>, name: Option<String>) -> Self {
        LexicalSource {
            core: SourceCore::new(name),
            lexicon,
        }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let lexicon = pairs
            .into_iter()
            .map(|(w, u)| (w.into(), u.into()))
            .collect();
        Self::new(lexicon, None)
    }

    pub fn add_preprocessor(&mut self, preprocessor: Box<dyn NerPreprocessor>) {
        self.core.add_preprocessor(preprocessor);
    }
}

impl NerSource for LexicalSource {
    fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    fn query_word(&self, word: &str) -> Result<Vec<String>, DataIoError> {
        Ok(self
            .lexicon
            .get(word)
            .map(|uri| vec![uri.clone()])
            .unwrap_or_default())
    }

    fn recognize_token(&self, token: &Token) -> Vec<String> {
        self.core.recognize(token, |word| self.query_word(word))
    }
}

/// Source querying a remote SPARQL endpoint; the query template binds the
/// token through its `%(word)s` placeholder and must select a `?uri`
/// variable.
pub struct SparqlSource {
    core: SourceCore,
    query: String,
    endpoint: String,
}

impl SparqlSource {
    pub fn new(query: impl Into<String>, endpoint: impl Into<String>, name: Option<String>) -> Self {
        SparqlSource {
            core: SourceCore::new(name),
            query: query.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn add_preprocessor(&mut self, preprocessor: Box<dyn NerPreprocessor>) {
        self.core.add_preprocessor(preprocessor);
    }
}

impl NerSource for SparqlSource {
    fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    fn query_word(&self, word: &str) -> Result<Vec<String>, DataIoError> {
        let query = self.query.replace("%(word)s", word);
        sparql_values(&self.endpoint, &query, "uri")
    }

    fn recognize_token(&self, token: &Token) -> Vec<String> {
        self.core.recognize(token, |word| self.query_word(word))
    }
}

/// Source querying an RQL host over its CSV-export view; URL form.
pub struct RqlUrlSource {
    core: SourceCore,
    query: String,
    endpoint: String,
}

impl RqlUrlSource {
    pub fn new(query: impl Into<String>, endpoint: impl Into<String>, name: Option<String>) -> Self {
        RqlUrlSource {
            core: SourceCore::new(name),
            query: query.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn add_preprocessor(&mut self, preprocessor: Box<dyn NerPreprocessor>) {
        self.core.add_preprocessor(preprocessor);
    }
}

impl NerSource for RqlUrlSource {
    fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    fn query_word(&self, word: &str) -> Result<Vec<String>, DataIoError> {
        let query = self.query.replace("%(word)s", word);
        let records = rql_url_query(&self.endpoint, &query, &[])?;
        Ok(records.iter().map(|r| r.id().to_string()).collect())
    }

    fn recognize_token(&self, token: &Token) -> Vec<String> {
        self.core.recognize(token, |word| self.query_word(word))
    }
}

/// Source running an RQL query through an in-process session handle.
pub struct RqlSessionSource {
    core: SourceCore,
    query: String,
    session: Box<dyn RqlSession>,
}

impl RqlSessionSource {
    pub fn new(query: impl Into<String>, session: Box<dyn RqlSession>, name: Option<String>) -> Self {
        RqlSessionSource {
            core: SourceCore::new(name),
            query: query.into(),
            session,
        }
    }

    pub fn add_preprocessor(&mut self, preprocessor: Box<dyn NerPreprocessor>) {
        self.core.add_preprocessor(preprocessor);
    }
}

impl NerSource for RqlSessionSource {
    fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    fn query_word(&self, word: &str) -> Result<Vec<String>, DataIoError> {
        let rows = self.session.execute(&self.query, word)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.first())
            .map(|v| v.to_string())
            .collect())
    }

    fn recognize_token(&self, token: &Token) -> Vec<String> {
        self.core.recognize(token, |word| self.query_word(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::ner::tokenizer::{Sentence, Token};

    fn dummy_sentence() -> Sentence {
        Sentence {
            index: 0,
            start: 0,
            end: 10,
        }
    }

    #[test]
    fn test_lexical_source() {
        let source = LexicalSource::from_pairs([
            ("everyone", "http://example.com/everyone"),
            ("me", "http://example.com/me"),
        ]);
        assert_eq!(
            source.query_word("me").unwrap(),
            vec!["http://example.com/me"]
        );
        assert_eq!(
            source.query_word("everyone").unwrap(),
            vec!["http://example.com/everyone"]
        );
        assert!(source.query_word("me everyone").unwrap().is_empty());
        assert!(source.query_word("toto").unwrap().is_empty());

        let token = Token::new("me", 0, 2, dummy_sentence());
        assert_eq!(
            source.recognize_token(&token),
            vec!["http://example.com/me"]
        );
        let token = Token::new("ma", 0, 2, dummy_sentence());
        assert!(source.recognize_token(&token).is_empty());
    }

    #[test]
    fn test_lexical_source_cache() {
        let source = LexicalSource::from_pairs([("me", "http://example.com/me")]);
        let token = Token::new("me", 0, 2, dummy_sentence());
        assert_eq!(source.recognize_token(&token).len(), 1);
        // second lookup hits the cache and stays consistent
        assert_eq!(source.recognize_token(&token).len(), 1);
    }

    #[test]
    fn test_session_source() {
        struct FakeSession;
        impl RqlSession for FakeSession {
            fn execute(&self, _query: &str, word: &str) -> Result<Vec<Vec<Value>>, DataIoError> {
                if word == "apycot" {
                    Ok(vec![vec![Value::from("http://www.cubicweb.org/1310453")]])
                } else {
                    Ok(Vec::new())
                }
            }
        }
        let source = RqlSessionSource::new(
            "Any U LIMIT 1 WHERE X cwuri U, X name %(word)s",
            Box::new(FakeSession),
            None,
        );
        assert_eq!(
            source.query_word("apycot").unwrap(),
            vec!["http://www.cubicweb.org/1310453"]
        );
        assert!(source.query_word("nothing").unwrap().is_empty());
    }
}
