// tokenizer.rs - Sentence and token scanning for the NER walk

/// A sentence of the source text: its index and half-open character span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

/// A token: one or several consecutive words joined by single spaces, with
/// its half-open character span and the sentence it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub word: String,
    pub start: usize,
    pub end: usize,
    pub sentence: Sentence,
}

impl Token {
    pub fn new(word: impl Into<String>, start: usize, end: usize, sentence: Sentence) -> Self {
        Token {
            word: word.into(),
            start,
            end,
            sentence,
        }
    }

    /// Rebuild this token with another word, keeping its position.
    pub fn with_word(&self, word: String) -> Token {
        Token {
            word,
            start: self.start,
            end: self.end,
            sentence: self.sentence,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '@' || c == '-'
}

fn is_sentence_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Sliding-window tokenizer: sentences are split on `.!?` boundaries, words
/// scanned as `[\w@-]+` runs, and at every word position the windows of
/// `max_size` down to `min_size` words (clipped to the sentence) are yielded
/// longest first. All offsets are character positions.
pub struct RichStringTokenizer {
    min_size: usize,
    max_size: usize,
}

impl Default for RichStringTokenizer {
    fn default() -> Self {
        RichStringTokenizer {
            min_size: 1,
            max_size: 3,
        }
    }
}

impl RichStringTokenizer {
    pub fn new(min_size: usize, max_size: usize) -> Self {
        RichStringTokenizer {
            min_size: min_size.max(1),
            max_size: max_size.max(min_size.max(1)),
        }
    }

    /// The sentence spans of `text`, in order. Stray terminators between
    /// sentences are skipped.
    pub fn find_sentences(text: &str) -> Vec<Sentence> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if is_sentence_terminator(chars[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && !is_sentence_terminator(chars[i]) {
                i += 1;
            }
            let end = if i < chars.len() { i + 1 } else { chars.len() };
            sentences.push(Sentence {
                index: sentences.len(),
                start,
                end,
            });
            i = end;
        }
        sentences
    }

    /// Word spans as (start, end, text) character triples.
    fn find_words(text: &str) -> Vec<(usize, usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let mut words = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if !is_word_char(chars[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && is_word_char(chars[i]) {
                i += 1;
            }
            words.push((start, i, chars[start..i].iter().collect()));
        }
        words
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let sentences = Self::find_sentences(text);
        let words = Self::find_words(text);
        let mut tokens = Vec::new();
        for indice in 0..words.len() {
            let word_start = words[indice].0;
            let current_sentence = sentences
                .iter()
                .rev()
                .find(|s| s.start <= word_start)
                .or_else(|| sentences.first())
                .copied();
            let Some(current_sentence) = current_sentence else {
                break;
            };
            let remaining = words.len() - indice;
            for length in (self.min_size..=self.max_size.min(remaining)).rev() {
                let window = &words[indice..indice + length];
                let last = window.last().unwrap_or(&window[0]);
                if last.0 > current_sentence.end {
                    // the window spills into the next sentence
                    continue;
                }
                let normalized: String = window
                    .iter()
                    .map(|(_, _, w)| w.as_str())
                    .collect::<Vec<&str>>()
                    .join(" ");
                tokens.push(Token {
                    word: normalized,
                    start: window[0].0,
                    end: last.1,
                    sentence: current_sentence,
                });
            }
        }
        tokens
    }
}
