// lemmas.rs - Lemma table loading and lemmatization

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;

/// Load a lemma table from a TAB-separated `word<TAB>lemma` file; malformed
/// lines are skipped.
pub fn load_lemmas<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>, std::io::Error> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lemmas = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let parts: Vec<&str> = line.trim().split('\t').collect();
        if parts.len() == 2 {
            lemmas.insert(parts[0].to_string(), parts[1].to_string());
        }
    }
    Ok(lemmas)
}

/// Return the lemma of a word. The table stores pipe-separated alternates;
/// when the original word appears among them it wins, otherwise the first
/// alternate is used.
pub fn lemmatized_word(word: &str, lemmas: &HashMap<String, String>) -> String {
    let lower = word.to_lowercase();
    let lemma = lemmas.get(&lower).cloned().unwrap_or_else(|| word.to_string());
    if lemma.contains('|') {
        let alternates: Vec<&str> = lemma.split('|').collect();
        if alternates.contains(&lower.as_str()) {
            lower
        } else {
            alternates[0].to_string()
        }
    } else {
        lemma
    }
}

/// Lemmatize a sentence: tokenize on word/punctuation boundaries, map each
/// token through the table, rejoin with single spaces.
pub fn lemmatized(sentence: &str, lemmas: &HashMap<String, String>) -> String {
    let tokenizer = Regex::new(r"\w+|[^\w\s]+").unwrap();
    tokenizer
        .find_iter(sentence)
        .map(|m| lemmatized_word(m.as_str(), lemmas))
        .collect::<Vec<String>>()
        .join(" ")
}
