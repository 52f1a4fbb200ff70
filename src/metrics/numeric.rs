// numeric.rs - Jaccard and Euclidean distances

use std::collections::HashSet;

use crate::data::Value;
use crate::error::MetricError;

/// Jaccard distance over the character sets of both strings:
/// `1 - |A intersect B| / |A union B|`.
pub fn jaccard(stra: &str, strb: &str) -> f64 {
    let seta: HashSet<char> = stra.chars().collect();
    let setb: HashSet<char> = strb.chars().collect();
    let union = seta.union(&setb).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = seta.intersection(&setb).count();
    1.0 - intersection as f64 / union as f64
}

/// Absolute difference between two numeric values; strings are coerced
/// through a float parse.
pub fn euclidean(a: &Value, b: &Value) -> Result<f64, MetricError> {
    let fa = a.as_f64().ok_or_else(|| MetricError::InputCoercion {
        metric: "euclidean",
        value: a.to_string(),
    })?;
    let fb = b.as_f64().ok_or_else(|| MetricError::InputCoercion {
        metric: "euclidean",
        value: b.to_string(),
    })?;
    Ok((fa - fb).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard("bonjour", "bonjour"), 0.0);
        assert!((jaccard("boujour", "bonjour") - 0.166).abs() < 0.01);
        assert!((jaccard("rubert", "robert") - 0.333).abs() < 0.01);
    }

    #[test]
    fn test_jaccard_symmetry() {
        assert_eq!(jaccard("rubert", "robert"), jaccard("robert", "rubert"));
        assert_eq!(jaccard("", ""), 0.0);
    }

    #[test]
    fn test_euclidean() {
        assert_eq!(euclidean(&Value::Int(10), &Value::Int(3)).unwrap(), 7.0);
        assert_eq!(
            euclidean(&Value::from("21.9"), &Value::Float(1.9)).unwrap(),
            20.0
        );
        assert!(euclidean(&Value::from("abc"), &Value::Int(1)).is_err());
    }

    #[test]
    fn test_euclidean_identity() {
        assert_eq!(euclidean(&Value::Float(2.5), &Value::Float(2.5)).unwrap(), 0.0);
    }
}
