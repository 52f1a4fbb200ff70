// soundex.rs - Soundex codes and the derived match distance

use super::{token_matrix_reduction, Language};
use crate::error::MetricError;

const VOWELS: &str = "AEHIOUWY";

/// Numeric code of an uppercase consonant, per the language tables.
fn consonant_code(c: char, language: Language) -> Option<char> {
    match language {
        Language::French => match c {
            'B' | 'P' => Some('1'),
            'C' | 'K' | 'Q' => Some('2'),
            'D' | 'T' => Some('3'),
            'L' => Some('4'),
            'M' | 'N' => Some('5'),
            'R' => Some('6'),
            'G' | 'J' => Some('7'),
            'X' | 'Z' | 'S' => Some('8'),
            'F' | 'V' => Some('9'),
            _ => None,
        },
        Language::English => match c {
            'B' | 'F' | 'P' | 'V' => Some('1'),
            'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
            'D' | 'T' => Some('3'),
            'L' => Some('4'),
            'M' | 'N' => Some('5'),
            'R' => Some('6'),
            _ => None,
        },
    }
}

/// Return the 4-character Soundex code of `word`.
///
/// The first letter is kept; vowels (and H/W/Y) are skipped; consecutive
/// consonants with the same code collapse to the first unless a vowel stands
/// between them; a consonant is also dropped when a W or H separates it from
/// a consonant of identical code two positions ahead. The resulting code is
/// truncated or right-padded with '0' to length 4.
///
/// A multi-word input is encoded per word and the codes are joined with a
/// single space.
pub fn soundex_code(word: &str, language: Language) -> Result<String, MetricError> {
    let word = word.trim();
    if word.contains(' ') {
        let codes: Result<Vec<String>, MetricError> = word
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(|w| soundex_code(w, language))
            .collect();
        return Ok(codes?.join(" "));
    }

    let upper: Vec<char> = word.to_uppercase().chars().collect();
    if upper.is_empty() {
        return Err(MetricError::InputCoercion {
            metric: "soundex",
            value: word.to_string(),
        });
    }
    for &c in &upper {
        if !c.is_ascii_alphabetic() {
            return Err(MetricError::InputCoercion {
                metric: "soundex",
                value: word.to_string(),
            });
        }
    }

    // Keep the first letter, then every consonant surviving the collapse
    // rules; codes are substituted afterwards.
    let mut kept: Vec<char> = vec![upper[0]];
    for i in 1..upper.len() {
        let c = upper[i];
        if VOWELS.contains(c) {
            continue;
        }
        let code = consonant_code(c, language);
        if !VOWELS.contains(upper[i - 1]) && code == consonant_code(*kept.last().unwrap(), language)
        {
            continue;
        }
        if i + 2 < upper.len()
            && (upper[i + 1] == 'W' || upper[i + 1] == 'H')
            && code == consonant_code(upper[i + 2], language)
        {
            continue;
        }
        kept.push(c);
    }

    let mut code = String::with_capacity(4);
    code.push(kept[0]);
    for &c in &kept[1..] {
        // Consonant codes exist for every kept letter by construction.
        if let Some(digit) = consonant_code(c, language) {
            code.push(digit);
        }
    }
    code.truncate(4);
    while code.len() < 4 {
        code.push('0');
    }
    Ok(code)
}

/// Match-indicator distance over Soundex codes: 0 when both words share a
/// code, 1 otherwise. Multi-word pairs reduce through the token matrix.
pub fn soundex(stra: &str, strb: &str, language: Language) -> Result<f64, MetricError> {
    if stra.contains(' ') && strb.contains(' ') {
        return token_matrix_reduction(stra, strb, |a, b| soundex(a, b, language));
    }
    let code_a = soundex_code(stra, language)?;
    let code_b = soundex_code(strb, language)?;
    Ok(if code_a == code_b { 0.0 } else { 1.0 })
}
