// mod.rs - Distance functions

pub mod geographical;
pub mod levenshtein;
pub mod numeric;
pub mod soundex;
pub mod temporal;

pub use geographical::{geographical, Units};
pub use levenshtein::levenshtein;
pub use numeric::{euclidean, jaccard};
pub use soundex::{soundex, soundex_code};
pub use temporal::{temporal, Granularity};

use crate::data::Value;
use crate::error::MetricError;

/// Languages supported by the soundex tables and the date parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    French,
    English,
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "french" | "fr" => Ok(Language::French),
            "english" | "en" => Ok(Language::English),
            _ => Err(format!("Unknown language: {}. Use: french, english", s)),
        }
    }
}

/// A distance metric, dispatched once per processing rather than per cell.
///
/// Every metric is total over its value domain and returns a non-negative
/// distance; inputs it cannot coerce raise [`MetricError::InputCoercion`],
/// which the matrix engine localizes to the cell default.
#[derive(Debug, Clone)]
pub enum Metric {
    Levenshtein,
    Soundex {
        language: Language,
    },
    Jaccard,
    Temporal {
        granularity: Granularity,
        language: Language,
        day_first: bool,
        year_first: bool,
    },
    Geographical {
        in_radians: bool,
        planet_radius: f64,
        units: Units,
    },
    Euclidean,
    Custom {
        name: &'static str,
        func: fn(&Value, &Value) -> Result<f64, MetricError>,
    },
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Levenshtein => "levenshtein",
            Metric::Soundex { .. } => "soundex",
            Metric::Jaccard => "jaccard",
            Metric::Temporal { .. } => "temporal",
            Metric::Geographical { .. } => "geographical",
            Metric::Euclidean => "euclidean",
            Metric::Custom { name, .. } => name,
        }
    }

    /// Compute the distance between two attribute values.
    pub fn distance(&self, a: &Value, b: &Value) -> Result<f64, MetricError> {
        match self {
            Metric::Levenshtein => {
                let (sa, sb) = (text_input(a, "levenshtein")?, text_input(b, "levenshtein")?);
                Ok(levenshtein(&sa, &sb))
            }
            Metric::Soundex { language } => {
                let (sa, sb) = (text_input(a, "soundex")?, text_input(b, "soundex")?);
                soundex(&sa, &sb, *language)
            }
            Metric::Jaccard => {
                let (sa, sb) = (text_input(a, "jaccard")?, text_input(b, "jaccard")?);
                Ok(jaccard(&sa, &sb))
            }
            Metric::Temporal {
                granularity,
                language,
                day_first,
                year_first,
            } => {
                let (sa, sb) = (text_input(a, "temporal")?, text_input(b, "temporal")?);
                temporal(&sa, &sb, *granularity, *language, *day_first, *year_first)
            }
            Metric::Geographical {
                in_radians,
                planet_radius,
                units,
            } => {
                let pa = coords_input(a)?;
                let pb = coords_input(b)?;
                geographical(&pa, &pb, *in_radians, *planet_radius, *units)
            }
            Metric::Euclidean => euclidean(a, b),
            Metric::Custom { func, .. } => func(a, b),
        }
    }
}

fn text_input(value: &Value, metric: &'static str) -> Result<String, MetricError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        other => Err(MetricError::InputCoercion {
            metric,
            value: other.to_string(),
        }),
    }
}

fn coords_input(value: &Value) -> Result<Vec<f64>, MetricError> {
    value.as_coords().ok_or_else(|| MetricError::InputCoercion {
        metric: "geographical",
        value: value.to_string(),
    })
}

/// Token-matrix reduction for multi-word inputs.
///
/// Both strings are split on spaces, an MxN matrix of per-token distances is
/// built, and the maximum over the combined row minima and column minima is
/// returned. This departs from the classical single-string definitions;
/// callers who want the vanilla metric must pre-join or strip whitespace.
pub(crate) fn token_matrix_reduction<F>(
    stra: &str,
    strb: &str,
    distance: F,
) -> Result<f64, MetricError>
where
    F: Fn(&str, &str) -> Result<f64, MetricError>,
{
    let toka: Vec<&str> = stra.split(' ').filter(|t| !t.is_empty()).collect();
    let tokb: Vec<&str> = strb.split(' ').filter(|t| !t.is_empty()).collect();
    if toka.is_empty() || tokb.is_empty() {
        return distance(stra, strb);
    }

    let mut matrix = vec![0f64; toka.len() * tokb.len()];
    for (i, ta) in toka.iter().enumerate() {
        for (j, tb) in tokb.iter().enumerate() {
            matrix[i * tokb.len() + j] = distance(ta, tb)?;
        }
    }

    let mut minima = Vec::with_capacity(toka.len() + tokb.len());
    for i in 0..toka.len() {
        let row = &matrix[i * tokb.len()..(i + 1) * tokb.len()];
        minima.push(row.iter().cloned().fold(f64::INFINITY, f64::min));
    }
    for j in 0..tokb.len() {
        let col_min = (0..toka.len())
            .map(|i| matrix[i * tokb.len() + j])
            .fold(f64::INFINITY, f64::min);
        minima.push(col_min);
    }
    Ok(minima.into_iter().fold(0.0, f64::max))
}
