// preprocess.rs - Token preprocessors for the NER walk

use std::collections::HashSet;

use crate::ner::tokenizer::Token;
use crate::reference_data::stopwords_for;

/// A token preprocessor: rewrite or suppress a token before recognition.
/// Returning None drops the token.
pub trait NerPreprocessor: Send + Sync {
    fn process(&self, token: &Token) -> Option<Token>;
}

/// Drop tokens whose word length falls outside the given range.
pub struct WordSizeFilterPreprocessor {
    min_size: Option<usize>,
    max_size: Option<usize>,
}

impl WordSizeFilterPreprocessor {
    pub fn new(min_size: Option<usize>, max_size: Option<usize>) -> Self {
        WordSizeFilterPreprocessor { min_size, max_size }
    }
}

impl NerPreprocessor for WordSizeFilterPreprocessor {
    fn process(&self, token: &Token) -> Option<Token> {
        let size = token.word.chars().count();
        if self.min_size.is_some_and(|min| size < min)
            || self.max_size.is_some_and(|max| size > max)
        {
            return None;
        }
        Some(token.clone())
    }
}

/// Drop tokens written entirely in lower case.
pub struct LowerCaseFilterPreprocessor;

impl NerPreprocessor for LowerCaseFilterPreprocessor {
    fn process(&self, token: &Token) -> Option<Token> {
        let has_alpha = token.word.chars().any(char::is_alphabetic);
        let all_lower = token
            .word
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_lowercase);
        if has_alpha && all_lower {
            None
        } else {
            Some(token.clone())
        }
    }
}

/// At the start of a sentence, lower the first character of a token whose
/// leading word is a stop word (sentence-initial capitalization noise).
pub struct LowerFirstWordPreprocessor {
    stopwords: HashSet<&'static str>,
}

impl LowerFirstWordPreprocessor {
    pub fn new(lang: &str) -> Self {
        LowerFirstWordPreprocessor {
            stopwords: stopwords_for(lang),
        }
    }
}

impl NerPreprocessor for LowerFirstWordPreprocessor {
    fn process(&self, token: &Token) -> Option<Token> {
        if token.start != token.sentence.start {
            return Some(token.clone());
        }
        let first_word = token.word.split(' ').next().unwrap_or_default().to_lowercase();
        if !self.stopwords.contains(first_word.as_str()) {
            return Some(token.clone());
        }
        let mut chars = token.word.chars();
        let word = match chars.next() {
            Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
            None => return Some(token.clone()),
        };
        Some(token.with_word(word))
    }
}

/// Drop stop words: either the whole token, or (in split mode) tokens made
/// of nothing but stop words.
pub struct StopwordsFilterPreprocessor {
    split_words: bool,
    stopwords: HashSet<&'static str>,
}

impl StopwordsFilterPreprocessor {
    pub fn new(split_words: bool, lang: &str) -> Self {
        StopwordsFilterPreprocessor {
            split_words,
            stopwords: stopwords_for(lang),
        }
    }
}

impl NerPreprocessor for StopwordsFilterPreprocessor {
    fn process(&self, token: &Token) -> Option<Token> {
        if self.split_words {
            let any_content = token
                .word
                .split(' ')
                .any(|w| !self.stopwords.contains(w.to_lowercase().as_str()));
            if !any_content {
                return None;
            }
        } else if self.stopwords.contains(token.word.to_lowercase().as_str()) {
            return None;
        }
        Some(token.clone())
    }
}

/// Rewrite `@Barack_Obama`-style handles to space-delimited word form.
pub struct HashTagPreprocessor;

impl NerPreprocessor for HashTagPreprocessor {
    fn process(&self, token: &Token) -> Option<Token> {
        if let Some(stripped) = token.word.strip_prefix('@') {
            return Some(token.with_word(stripped.replace('_', " ")));
        }
        Some(token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::tokenizer::Sentence;

    fn token(word: &str, start: usize) -> Token {
        Token::new(
            word,
            start,
            start + word.chars().count(),
            Sentence {
                index: 0,
                start: 0,
                end: 100,
            },
        )
    }

    #[test]
    fn test_word_size_filter() {
        let p = WordSizeFilterPreprocessor::new(Some(2), Some(10));
        assert!(p.process(&token("a", 0)).is_none());
        assert!(p.process(&token("word", 0)).is_some());
        assert!(p.process(&token("tremendously-long", 0)).is_none());
    }

    #[test]
    fn test_lowercase_filter() {
        let p = LowerCaseFilterPreprocessor;
        assert!(p.process(&token("hello", 0)).is_none());
        assert!(p.process(&token("Hello", 0)).is_some());
        assert!(p.process(&token("HELLO", 0)).is_some());
    }

    #[test]
    fn test_lower_first_word() {
        let p = LowerFirstWordPreprocessor::new("en");
        // sentence-initial stop word is lowered
        let t = p.process(&token("The cat", 0)).unwrap();
        assert_eq!(t.word, "the cat");
        // mid-sentence tokens are untouched
        let t = p.process(&token("The cat", 10)).unwrap();
        assert_eq!(t.word, "The cat");
        // non-stopword leading words are untouched
        let t = p.process(&token("Toto tata", 0)).unwrap();
        assert_eq!(t.word, "Toto tata");
    }

    #[test]
    fn test_stopwords_filter() {
        let p = StopwordsFilterPreprocessor::new(false, "en");
        assert!(p.process(&token("Me", 0)).is_none());
        assert!(p.process(&token("the cat", 0)).is_some());

        let split = StopwordsFilterPreprocessor::new(true, "en");
        assert!(split.process(&token("the me", 0)).is_none());
        assert!(split.process(&token("the cat", 0)).is_some());
    }

    #[test]
    fn test_hashtag_cleanup() {
        let p = HashTagPreprocessor;
        let t = p.process(&token("@Barack_Obama", 0)).unwrap();
        assert_eq!(t.word, "Barack Obama");
        let t = p.process(&token("Obama", 0)).unwrap();
        assert_eq!(t.word, "Obama");
    }
}
