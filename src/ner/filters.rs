// filters.rs - Postprocessing filters over recognized entities

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::warn;

use crate::data::loaders::sparql::sparql_values;
use crate::ner::tokenizer::Token;

/// One recognized entity: (URI, source name, token).
pub type NamedEntity = (String, Option<String>, Token);

/// A filter cleans the recognized entity list after the walk; filters run in
/// registration order.
pub trait NerFilter: Send + Sync {
    fn filter(&self, named_entities: Vec<NamedEntity>) -> Vec<NamedEntity>;
}

/// Keep entities whose URI occurrence count lies in the given range.
pub struct OccurrenceFilter {
    min_occ: Option<usize>,
    max_occ: Option<usize>,
}

impl OccurrenceFilter {
    pub fn new(min_occ: Option<usize>, max_occ: Option<usize>) -> Self {
        OccurrenceFilter { min_occ, max_occ }
    }
}

impl NerFilter for OccurrenceFilter {
    fn filter(&self, named_entities: Vec<NamedEntity>) -> Vec<NamedEntity> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (uri, _, _) in &named_entities {
            *counts.entry(uri.as_str()).or_insert(0) += 1;
        }
        let keep: HashSet<String> = counts
            .iter()
            .filter(|(_, &count)| {
                !(self.min_occ.is_some_and(|min| count < min)
                    || self.max_occ.is_some_and(|max| count > max))
            })
            .map(|(uri, _)| uri.to_string())
            .collect();
        named_entities
            .into_iter()
            .filter(|(uri, _, _)| keep.contains(uri))
            .collect()
    }
}

/// Keep entities whose RDF types intersect an accepted set; type lookups go
/// through a SPARQL endpoint and are cached per URI. Endpoint failures
/// exclude the URI and log a warning.
pub struct RdfTypeFilter {
    endpoint: String,
    accepted_types: HashSet<String>,
    query: String,
    seen_uris: Mutex<HashMap<String, bool>>,
}

impl RdfTypeFilter {
    pub fn new<I, S>(endpoint: impl Into<String>, accepted_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RdfTypeFilter {
            endpoint: endpoint.into(),
            accepted_types: accepted_types.into_iter().map(Into::into).collect(),
            query: "SELECT ?type WHERE{<%(uri)s> rdf:type ?type}".to_string(),
            seen_uris: Mutex::new(HashMap::new()),
        }
    }

    fn accepts(&self, uri: &str) -> bool {
        if let Ok(seen) = self.seen_uris.lock() {
            if let Some(&accepted) = seen.get(uri) {
                return accepted;
            }
        }
        let query = self.query.replace("%(uri)s", uri);
        let accepted = match sparql_values(&self.endpoint, &query, "type") {
            Ok(types) => types.iter().any(|t| self.accepted_types.contains(t)),
            Err(e) => {
                warn!("RDF type lookup failed for <{}>: {}", uri, e);
                false
            }
        };
        if let Ok(mut seen) = self.seen_uris.lock() {
            seen.insert(uri.to_string(), accepted);
        }
        accepted
    }
}

impl NerFilter for RdfTypeFilter {
    fn filter(&self, named_entities: Vec<NamedEntity>) -> Vec<NamedEntity> {
        named_entities
            .into_iter()
            .filter(|(uri, _, _)| self.accepts(uri))
            .collect()
    }
}

/// Disambiguate on word parts: when a multi-word entity "X Y" and a short
/// entity "X" both appear, the short matches are rewritten to the longer
/// entity's URI.
pub struct DisambiguationWordParts;

impl NerFilter for DisambiguationWordParts {
    fn filter(&self, named_entities: Vec<NamedEntity>) -> Vec<NamedEntity> {
        let mut parts: HashMap<String, String> = HashMap::new();
        for (uri, _, token) in &named_entities {
            if token.word.contains(' ') {
                for part in token.word.split(' ') {
                    parts.insert(part.to_lowercase(), uri.clone());
                }
            }
        }
        named_entities
            .into_iter()
            .map(|(uri, source, token)| {
                let uri = parts.get(&token.word).cloned().unwrap_or(uri);
                (uri, source, token)
            })
            .collect()
    }
}

/// Apply explicit URI replacement rules.
pub struct ReplacementRulesFilter {
    rules: HashMap<String, String>,
}

impl ReplacementRulesFilter {
    pub fn new(rules: HashMap<String, String>) -> Self {
        ReplacementRulesFilter { rules }
    }
}

impl NerFilter for ReplacementRulesFilter {
    fn filter(&self, named_entities: Vec<NamedEntity>) -> Vec<NamedEntity> {
        named_entities
            .into_iter()
            .map(|(uri, source, token)| {
                let uri = self.rules.get(&uri).cloned().unwrap_or(uri);
                (uri, source, token)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::tokenizer::{Sentence, Token};

    fn entity(uri: &str, word: &str, start: usize) -> NamedEntity {
        (
            uri.to_string(),
            None,
            Token::new(
                word,
                start,
                start + word.chars().count(),
                Sentence {
                    index: 0,
                    start: 0,
                    end: 100,
                },
            ),
        )
    }

    #[test]
    fn test_occurrence_filter() {
        let entities = vec![
            entity("http://example.com/a", "a", 0),
            entity("http://example.com/a", "a", 10),
            entity("http://example.com/b", "b", 20),
        ];
        let filter = OccurrenceFilter::new(Some(2), None);
        let kept = filter.filter(entities.clone());
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|(uri, _, _)| uri.ends_with("/a")));

        let filter = OccurrenceFilter::new(None, Some(1));
        let kept = filter.filter(entities);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].0.ends_with("/b"));
    }

    #[test]
    fn test_word_parts_disambiguation() {
        let entities = vec![
            entity("http://example.com/toto_tutu", "toto tutu", 0),
            entity("http://example.com/toto", "toto", 20),
        ];
        let filter = DisambiguationWordParts;
        let kept = filter.filter(entities);
        assert_eq!(kept[1].0, "http://example.com/toto_tutu");
        assert_eq!(kept[0].0, "http://example.com/toto_tutu");
    }

    #[test]
    fn test_replacement_rules() {
        let mut rules = HashMap::new();
        rules.insert(
            "http://example.com/toto".to_string(),
            "http://example.com/tata".to_string(),
        );
        let filter = ReplacementRulesFilter::new(rules);
        let kept = filter.filter(vec![
            entity("http://example.com/toto", "toto", 0),
            entity("http://example.com/other", "other", 10),
        ]);
        assert_eq!(kept[0].0, "http://example.com/tata");
        assert_eq!(kept[1].0, "http://example.com/other");
    }
}
