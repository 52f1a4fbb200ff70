// process.rs - The named-entity recognition walk

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::NerError;
use crate::ner::filters::{NamedEntity, NerFilter};
use crate::ner::preprocess::NerPreprocessor;
use crate::ner::sources::NerSource;
use crate::ner::tokenizer::{RichStringTokenizer, Token};

/// High-level named-entity recognition: a tokenized scan over the text,
/// multi-source recognition with overlap suppression, then the filter chain.
pub struct NerProcess {
    sources: Vec<Box<dyn NerSource>>,
    preprocessors: Vec<Box<dyn NerPreprocessor>>,
    filters: Vec<Box<dyn NerFilter>>,
    unique: bool,
}

impl NerProcess {
    pub fn new(sources: Vec<Box<dyn NerSource>>, unique: bool) -> Self {
        NerProcess {
            sources,
            preprocessors: Vec::new(),
            filters: Vec::new(),
            unique,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn NerSource>) {
        self.sources.push(source);
    }

    pub fn add_preprocessor(&mut self, preprocessor: Box<dyn NerPreprocessor>) {
        self.preprocessors.push(preprocessor);
    }

    pub fn add_filter(&mut self, filter: Box<dyn NerFilter>) {
        self.filters.push(filter);
    }

    /// Analyze a text: tokenize it and recognize the token stream.
    pub fn process_text(&self, text: &str) -> Vec<NamedEntity> {
        let tokenizer = RichStringTokenizer::default();
        self.recognize_tokens(tokenizer.tokenize(text))
    }

    /// Cancellable variant; the flag is honored at token boundaries.
    pub fn process_text_cancellable(
        &self,
        text: &str,
        cancel: &AtomicBool,
    ) -> Result<Vec<NamedEntity>, NerError> {
        let tokenizer = RichStringTokenizer::default();
        self.walk(tokenizer.tokenize(text), Some(cancel))
            .map(|entities| self.postprocess(entities))
    }

    /// Recognize named entities from an already-tokenized stream.
    pub fn recognize_tokens<I>(&self, tokens: I) -> Vec<NamedEntity>
    where
        I: IntoIterator<Item = Token>,
    {
        // infallible without a cancellation flag
        let entities = self.walk(tokens, None).unwrap_or_default();
        self.postprocess(entities)
    }

    fn walk<I>(
        &self,
        tokens: I,
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<NamedEntity>, NerError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut last_stop = 0;
        let mut named_entities = Vec::new();
        'tokens: for token in tokens {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(NerError::Cancelled);
                }
            }
            if token.start < last_stop {
                continue; // this token overlaps with a previous match
            }
            let mut token = token;
            let mut dropped = false;
            for preprocessor in &self.preprocessors {
                match preprocessor.process(&token) {
                    Some(processed) => token = processed,
                    None => {
                        dropped = true;
                        break;
                    }
                }
            }
            if dropped {
                continue;
            }
            let mut recognized = false;
            for source in &self.sources {
                for uri in source.recognize_token(&token) {
                    named_entities.push((
                        uri,
                        source.name().map(str::to_string),
                        token.clone(),
                    ));
                    recognized = true;
                    last_stop = token.end;
                    if self.unique {
                        break;
                    }
                }
                if recognized && self.unique {
                    continue 'tokens;
                }
            }
        }
        Ok(named_entities)
    }

    /// Apply the filters in registration order.
    fn postprocess(&self, mut named_entities: Vec<NamedEntity>) -> Vec<NamedEntity> {
        for filter in &self.filters {
            named_entities = filter.filter(named_entities);
        }
        named_entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::preprocess::StopwordsFilterPreprocessor;
    use crate::ner::sources::LexicalSource;

    const TEXT: &str = "Hello everyone, this is   me speaking. And me.";

    fn everyone_me_source() -> Box<dyn NerSource> {
        Box::new(LexicalSource::from_pairs([
            ("everyone", "http://example.com/everyone"),
            ("me", "http://example.com/me"),
        ]))
    }

    #[test]
    fn test_process_text_offsets() {
        let process = NerProcess::new(vec![everyone_me_source()], false);
        let entities = process.process_text(TEXT);
        let found: Vec<(&str, usize, usize)> = entities
            .iter()
            .map(|(uri, _, t)| (uri.as_str(), t.start, t.end))
            .collect();
        assert_eq!(
            found,
            vec![
                ("http://example.com/everyone", 6, 14),
                ("http://example.com/me", 26, 28),
                ("http://example.com/me", 43, 45),
            ]
        );
        assert_eq!(entities[0].2.sentence.index, 0);
        assert_eq!(entities[2].2.sentence.index, 1);
    }

    #[test]
    fn test_process_multisources() {
        let source2: Box<dyn NerSource> = Box::new(LexicalSource::from_pairs([(
            "me",
            "http://example2.com/me",
        )]));

        // two sources, not unique: both uris are reported
        let process = NerProcess::new(vec![everyone_me_source(), source2], false);
        let entities = process.process_text(TEXT);
        let uris: Vec<&str> = entities.iter().map(|(u, _, _)| u.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "http://example.com/everyone",
                "http://example.com/me",
                "http://example2.com/me",
                "http://example.com/me",
                "http://example2.com/me",
            ]
        );

        // unique: the first source wins per token
        let source2: Box<dyn NerSource> = Box::new(LexicalSource::from_pairs([(
            "me",
            "http://example2.com/me",
        )]));
        let process = NerProcess::new(vec![everyone_me_source(), source2], true);
        let entities = process.process_text(TEXT);
        let uris: Vec<&str> = entities.iter().map(|(u, _, _)| u.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "http://example.com/everyone",
                "http://example.com/me",
                "http://example.com/me",
            ]
        );

        // sources inverted, unique: the second lexicon answers first for "me"
        let source2: Box<dyn NerSource> = Box::new(LexicalSource::from_pairs([(
            "me",
            "http://example2.com/me",
        )]));
        let process = NerProcess::new(vec![source2, everyone_me_source()], true);
        let entities = process.process_text(TEXT);
        let uris: Vec<&str> = entities.iter().map(|(u, _, _)| u.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "http://example.com/everyone",
                "http://example2.com/me",
                "http://example2.com/me",
            ]
        );
    }

    #[test]
    fn test_process_with_preprocessor() {
        let source: Box<dyn NerSource> = Box::new(LexicalSource::from_pairs([
            ("Toto", "http://example.com/toto"),
            ("me", "http://example.com/me"),
        ]));
        let mut process = NerProcess::new(vec![source], false);
        process.add_preprocessor(Box::new(StopwordsFilterPreprocessor::new(false, "en")));
        let entities = process.process_text("Hello Toto, this is   me speaking. And me.");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].0, "http://example.com/toto");
        assert_eq!((entities[0].2.start, entities[0].2.end), (6, 10));
    }

    #[test]
    fn test_process_chained_words() {
        let source: Box<dyn NerSource> = Box::new(LexicalSource::from_pairs([
            ("everyone", "http://example.com/everyone"),
            ("everyone me", "http://example.com/everyone_me"),
            ("me", "http://example.com/me"),
        ]));
        let process = NerProcess::new(vec![source], false);
        let entities = process.process_text("Hello everyone me, this is   me speaking. And me.");
        let found: Vec<(&str, usize, usize)> = entities
            .iter()
            .map(|(uri, _, t)| (uri.as_str(), t.start, t.end))
            .collect();
        assert_eq!(
            found,
            vec![
                ("http://example.com/everyone_me", 6, 17),
                ("http://example.com/me", 29, 31),
                ("http://example.com/me", 46, 48),
            ]
        );
    }

    #[test]
    fn test_cancellation() {
        let process = NerProcess::new(vec![everyone_me_source()], false);
        let cancel = AtomicBool::new(true);
        assert_eq!(
            process.process_text_cancellable(TEXT, &cancel),
            Err(NerError::Cancelled)
        );
    }
}
