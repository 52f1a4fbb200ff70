// temporal.rs - Distance between date strings

use chrono::NaiveDate;

use super::Language;
use crate::error::MetricError;

/// Granularity of the temporal distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Days,
    Months,
    Years,
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "days" => Ok(Granularity::Days),
            "months" => Ok(Granularity::Months),
            "years" => Ok(Granularity::Years),
            _ => Err(format!(
                "Unknown granularity: {}. Use: days, months, years",
                s
            )),
        }
    }
}

/// Return the distance between two strings read as dates: the absolute day
/// difference divided by 1, 30.5 or 365.25 depending on the granularity.
///
/// `day_first` and `year_first` disambiguate all-numeric dates such as
/// 09/09/09; by default day/month/year is assumed. Inputs must be
/// accent-free; clean them with a normalizer first.
pub fn temporal(
    stra: &str,
    strb: &str,
    granularity: Granularity,
    language: Language,
    day_first: bool,
    year_first: bool,
) -> Result<f64, MetricError> {
    let date_a = parse_date(stra, language, day_first, year_first)?;
    let date_b = parse_date(strb, language, day_first, year_first)?;
    let days = (date_a - date_b).num_days().abs() as f64;
    Ok(match granularity {
        Granularity::Days => days,
        Granularity::Months => days / 30.5,
        Granularity::Years => days / 365.25,
    })
}

// Month tables: (abbreviation, full name), unaccented, lower case.
const FRENCH_MONTHS: [(&str, &str); 12] = [
    ("jan", "janvier"),
    ("fev", "fevrier"),
    ("mar", "mars"),
    ("avr", "avril"),
    ("mai", "mai"),
    ("jun", "juin"),
    ("jui", "juillet"),
    ("aou", "aout"),
    ("sep", "septembre"),
    ("oct", "octobre"),
    ("nov", "novembre"),
    ("dec", "decembre"),
];

const ENGLISH_MONTHS: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

const FRENCH_WEEKDAYS: [(&str, &str); 7] = [
    ("lun", "lundi"),
    ("mar", "mardi"),
    ("mer", "mercredi"),
    ("jeu", "jeudi"),
    ("ven", "vendredi"),
    ("sam", "samedi"),
    ("dim", "dimanche"),
];

const ENGLISH_WEEKDAYS: [(&str, &str); 7] = [
    ("mon", "monday"),
    ("tue", "tuesday"),
    ("wed", "wednesday"),
    ("thu", "thursday"),
    ("fri", "friday"),
    ("sat", "saturday"),
    ("sun", "sunday"),
];

// Tokens jumped over without meaning, per language.
const FRENCH_JUMP: [&str; 7] = ["a", "le", "et", "er", "de", "du", "au"];
const ENGLISH_JUMP: [&str; 8] = ["of", "the", "on", "at", "st", "nd", "rd", "th"];

#[derive(Debug)]
enum DateToken {
    Number { value: i64, digits: usize },
    Month(u32),
}

fn coercion_error(value: &str) -> MetricError {
    MetricError::InputCoercion {
        metric: "temporal",
        value: value.to_string(),
    }
}

fn month_number(word: &str, language: Language) -> Option<u32> {
    let months = match language {
        Language::French => &FRENCH_MONTHS,
        Language::English => &ENGLISH_MONTHS,
    };
    months
        .iter()
        .position(|(abbr, full)| word == *abbr || word == *full)
        .map(|i| i as u32 + 1)
}

fn is_weekday(word: &str, language: Language) -> bool {
    let weekdays = match language {
        Language::French => &FRENCH_WEEKDAYS,
        Language::English => &ENGLISH_WEEKDAYS,
    };
    weekdays.iter().any(|(abbr, full)| word == *abbr || word == *full)
}

/// Scan the string into number and month-name tokens. Weekdays, jump words
/// and unrecognized words are ignored (the parser is permissive, like the
/// fuzzy mode of the original).
fn scan_tokens(s: &str, language: Language) -> Vec<DateToken> {
    let jump: &[&str] = match language {
        Language::French => &FRENCH_JUMP,
        Language::English => &ENGLISH_JUMP,
    };
    let mut tokens = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits = i - start;
            let text: String = chars[start..i].iter().collect();
            if let Ok(value) = text.parse::<i64>() {
                tokens.push(DateToken::Number { value, digits });
            }
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect::<String>().to_lowercase();
            if let Some(month) = month_number(&word, language) {
                tokens.push(DateToken::Month(month));
            } else if !jump.contains(&word.as_str()) && !is_weekday(&word, language) {
                // Permissive scan: unknown words are skipped.
            }
        } else {
            i += 1;
            continue;
        }
    }
    tokens
}

fn is_year_like(value: i64, digits: usize) -> bool {
    digits == 4 || value > 31
}

fn expand_year(value: i64, digits: usize) -> i64 {
    if digits <= 2 && value < 100 {
        if value < 70 {
            2000 + value
        } else {
            1900 + value
        }
    } else {
        value
    }
}

/// Permissive date parsing seeded with the locale tables. The day defaults
/// to 1 when absent; a missing month or year cannot be recovered and raises
/// an input-coercion failure.
pub fn parse_date(
    s: &str,
    language: Language,
    day_first: bool,
    year_first: bool,
) -> Result<NaiveDate, MetricError> {
    let tokens = scan_tokens(s, language);
    let named_month: Option<u32> = tokens.iter().find_map(|t| match t {
        DateToken::Month(m) => Some(*m),
        _ => None,
    });
    let numbers: Vec<(i64, usize)> = tokens
        .iter()
        .filter_map(|t| match t {
            DateToken::Number { value, digits } => Some((*value, *digits)),
            _ => None,
        })
        .collect();

    let (year, month, day) = if let Some(month) = named_month {
        match numbers.len() {
            0 => return Err(coercion_error(s)),
            1 => {
                let (value, digits) = numbers[0];
                if is_year_like(value, digits) {
                    (expand_year(value, digits), month, 1)
                } else {
                    return Err(coercion_error(s));
                }
            }
            _ => {
                let year_pos = numbers
                    .iter()
                    .position(|&(v, d)| is_year_like(v, d))
                    .or({
                        // Two small numbers around a named month: the order
                        // follows the yearfirst convention.
                        if year_first {
                            Some(0)
                        } else {
                            Some(1)
                        }
                    })
                    .unwrap();
                let (year_value, year_digits) = numbers[year_pos];
                let day_value = numbers
                    .iter()
                    .enumerate()
                    .find(|&(i, _)| i != year_pos)
                    .map(|(_, &(v, _))| v)
                    .unwrap();
                (expand_year(year_value, year_digits), month, day_value)
            }
        }
    } else {
        match numbers.len() {
            3 => {
                let (n1, n2, n3) = (numbers[0], numbers[1], numbers[2]);
                if year_first || is_year_like(n1.0, n1.1) {
                    // year / month / day
                    let (month, day) = if n2.0 > 12 { (n3.0, n2.0) } else { (n2.0, n3.0) };
                    (expand_year(n1.0, n1.1), month as u32, day)
                } else {
                    let (day, month) = if day_first {
                        (n1.0, n2.0)
                    } else if n1.0 > 12 {
                        // An impossible month slot can only be the day.
                        (n1.0, n2.0)
                    } else {
                        (n2.0, n1.0)
                    };
                    let (day, month) = if month > 12 && day <= 12 {
                        (month, day)
                    } else {
                        (day, month)
                    };
                    (expand_year(n3.0, n3.1), month as u32, day)
                }
            }
            2 => {
                // month/year or year/month, the day defaults to 1
                let (n1, n2) = (numbers[0], numbers[1]);
                if is_year_like(n1.0, n1.1) && !is_year_like(n2.0, n2.1) {
                    (expand_year(n1.0, n1.1), n2.0 as u32, 1)
                } else if is_year_like(n2.0, n2.1) && !is_year_like(n1.0, n1.1) {
                    (expand_year(n2.0, n2.1), n1.0 as u32, 1)
                } else {
                    return Err(coercion_error(s));
                }
            }
            _ => return Err(coercion_error(s)),
        }
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(coercion_error(s));
    }
    NaiveDate::from_ymd_opt(year as i32, month, day as u32).ok_or_else(|| coercion_error(s))
}
