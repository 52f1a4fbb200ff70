// validation.rs - Configuration validation and job building

use std::path::PathBuf;
use std::str::FromStr;

use crate::blocking::{
    Blocking, KdTreeBlocking, KmeansBlocking, MinHashingBlocking, NGramBlocking,
    SortedNeighborhoodBlocking, SoundexBlocking,
};
use crate::cli::config::{BlockingConfig, Config, ProcessingConfig};
use crate::data::{ColumnSpec, ParseSpec};
use crate::matrix::Processing;
use crate::metrics::geographical::EARTH_RADIUS_M;
use crate::metrics::{Granularity, Language, Metric, Units};

/// The fully resolved alignment job.
pub struct Job {
    pub ref_file: PathBuf,
    pub target_file: PathBuf,
    pub output: Option<PathBuf>,
    pub ref_spec: ParseSpec,
    pub target_spec: ParseSpec,
    pub threshold: f32,
    pub unique: bool,
    pub processings: Vec<Processing>,
    pub blocking: Option<Box<dyn Blocking>>,
    pub page_size: Option<usize>,
    pub equality_threshold: f32,
    pub cache_file: Option<PathBuf>,
    pub threads: Option<usize>,
}

/// Validate the merged configuration and build the runnable job.
pub fn validate_config(config: &Config) -> Result<Job, String> {
    let ref_file = config
        .ref_file
        .as_ref()
        .ok_or("--ref-file is required")?;
    let target_file = config
        .target_file
        .as_ref()
        .ok_or("--target-file is required")?;
    let threshold = config.threshold.ok_or("--threshold is required")?;
    if threshold < 0.0 {
        return Err("Threshold must be non-negative".to_string());
    }
    let equality_threshold = config.equality_threshold.unwrap_or(0.01);
    if equality_threshold > threshold {
        return Err(format!(
            "Equality threshold {} exceeds the alignment threshold {}",
            equality_threshold, threshold
        ));
    }

    let delimiter = match config.delimiter.as_deref() {
        None | Some("\\t") | Some("\t") => b'\t',
        Some(d) if d.len() == 1 => d.as_bytes()[0],
        Some(d) => return Err(format!("Delimiter must be a single character, got '{}'", d)),
    };
    let skip_header = config.skip_header.unwrap_or(false);
    let ref_spec = ParseSpec {
        indexes: parse_column_specs(config.ref_indexes.as_deref().unwrap_or(&[]))?,
        delimiter,
        skip_header,
        ..ParseSpec::default()
    };
    let target_spec = ParseSpec {
        indexes: parse_column_specs(config.target_indexes.as_deref().unwrap_or(&[]))?,
        delimiter,
        skip_header,
        ..ParseSpec::default()
    };

    let processing_configs = config
        .processings
        .as_ref()
        .filter(|p| !p.is_empty())
        .ok_or("At least one [[processings]] entry is required")?;
    let processings = processing_configs
        .iter()
        .map(build_processing)
        .collect::<Result<Vec<Processing>, String>>()?;

    let blocking = config.blocking.as_ref().map(build_blocking).transpose()?;

    Ok(Job {
        ref_file: PathBuf::from(ref_file),
        target_file: PathBuf::from(target_file),
        output: config.output.as_ref().map(PathBuf::from),
        ref_spec,
        target_spec,
        threshold,
        unique: config.unique.unwrap_or(false),
        processings,
        blocking,
        page_size: config.page_size,
        equality_threshold,
        cache_file: config.cache_file.as_ref().map(PathBuf::from),
        threads: config.threads,
    })
}

/// Parse column specs of the form "3" (single column) or "2,3" (tuple).
pub fn parse_column_specs(specs: &[String]) -> Result<Vec<ColumnSpec>, String> {
    specs
        .iter()
        .map(|spec| {
            if spec.contains(',') {
                let indexes = spec
                    .split(',')
                    .map(|part| {
                        part.trim()
                            .parse::<usize>()
                            .map_err(|_| format!("Invalid column index '{}' in '{}'", part, spec))
                    })
                    .collect::<Result<Vec<usize>, String>>()?;
                Ok(ColumnSpec::Tuple(indexes))
            } else {
                spec.trim()
                    .parse::<usize>()
                    .map(ColumnSpec::Index)
                    .map_err(|_| format!("Invalid column index '{}'", spec))
            }
        })
        .collect()
}

fn language_of(config_language: Option<&str>) -> Result<Language, String> {
    Language::from_str(config_language.unwrap_or("french"))
}

fn build_processing(config: &ProcessingConfig) -> Result<Processing, String> {
    let metric = match config.metric.to_lowercase().as_str() {
        "levenshtein" => Metric::Levenshtein,
        "soundex" => Metric::Soundex {
            language: language_of(config.language.as_deref())?,
        },
        "jaccard" => Metric::Jaccard,
        "temporal" => Metric::Temporal {
            granularity: Granularity::from_str(config.granularity.as_deref().unwrap_or("days"))?,
            language: language_of(config.language.as_deref())?,
            day_first: config.day_first.unwrap_or(true),
            year_first: config.year_first.unwrap_or(false),
        },
        "geographical" => Metric::Geographical {
            in_radians: config.in_radians.unwrap_or(false),
            planet_radius: config.planet_radius.unwrap_or(EARTH_RADIUS_M),
            units: Units::from_str(config.units.as_deref().unwrap_or("m"))?,
        },
        "euclidean" => Metric::Euclidean,
        other => {
            return Err(format!(
                "Unknown metric '{}'. Use: levenshtein, soundex, jaccard, temporal, geographical, euclidean",
                other
            ))
        }
    };
    let mut processing = Processing::new(config.ref_index, config.target_index, metric)
        .with_weight(config.weight.unwrap_or(1.0))
        .with_default(config.default_value.unwrap_or(1.0));
    if !config.normalized.unwrap_or(true) {
        processing = processing.raw();
    }
    Ok(processing)
}

fn build_blocking(config: &BlockingConfig) -> Result<Box<dyn Blocking>, String> {
    let ref_index = config.ref_index.unwrap_or(1);
    let target_index = config.target_index.unwrap_or(1);
    let blocking: Box<dyn Blocking> = match config.kind.to_lowercase().as_str() {
        "soundex" => Box::new(SoundexBlocking::new(
            ref_index,
            target_index,
            language_of(config.language.as_deref())?,
        )),
        "ngram" => Box::new(NGramBlocking::with_params(
            ref_index,
            target_index,
            config.ngram_size.unwrap_or(2),
            config.depth.unwrap_or(2),
        )),
        "sorted-neighborhood" => Box::new(SortedNeighborhoodBlocking::new(
            ref_index,
            target_index,
            config.window_width.unwrap_or(20),
        )),
        "kmeans" => Box::new(KmeansBlocking::new(
            ref_index,
            target_index,
            config.n_clusters,
        )),
        "kdtree" => Box::new(KdTreeBlocking::new(
            ref_index,
            target_index,
            config.threshold.unwrap_or(0.1),
        )),
        "minhash" => Box::new(MinHashingBlocking::with_params(
            ref_index,
            target_index,
            config.threshold.unwrap_or(0.1),
            config.kwordsgram.unwrap_or(1),
            config.siglen.unwrap_or(200),
        )),
        other => {
            return Err(format!(
                "Unknown blocking '{}'. Use: soundex, ngram, sorted-neighborhood, kmeans, kdtree, minhash",
                other
            ))
        }
    };
    Ok(blocking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_specs() {
        let specs = vec!["0".to_string(), "1".to_string(), "2,3".to_string()];
        let parsed = parse_column_specs(&specs).unwrap();
        assert_eq!(
            parsed,
            vec![
                ColumnSpec::Index(0),
                ColumnSpec::Index(1),
                ColumnSpec::Tuple(vec![2, 3]),
            ]
        );
        assert!(parse_column_specs(&["x".to_string()]).is_err());
    }

    #[test]
    fn test_validate_sample_config() {
        let sample = Config::generate_sample();
        let config: Config = toml::from_str(&sample).unwrap();
        let job = validate_config(&config).unwrap();
        assert_eq!(job.threshold, 30.0);
        assert!(job.unique);
        assert_eq!(job.processings.len(), 1);
        assert!(job.blocking.is_some());
        assert_eq!(job.ref_spec.indexes.len(), 3);
    }

    #[test]
    fn test_validate_rejects_missing_threshold() {
        let mut config = Config::default();
        config.ref_file = Some("a.csv".to_string());
        config.target_file = Some("b.csv".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_equality_threshold() {
        let sample = Config::generate_sample();
        let mut config: Config = toml::from_str(&sample).unwrap();
        config.equality_threshold = Some(100.0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let sample = Config::generate_sample();
        let mut config: Config = toml::from_str(&sample).unwrap();
        config.processings.as_mut().unwrap()[0].metric = "cosine".to_string();
        assert!(validate_config(&config).is_err());
    }
}
