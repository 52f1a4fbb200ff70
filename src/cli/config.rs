// config.rs - TOML job configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One processing entry: a metric bound to attribute indexes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingConfig {
    /// levenshtein, soundex, jaccard, temporal, geographical, euclidean
    pub metric: String,
    pub ref_index: usize,
    pub target_index: usize,
    pub weight: Option<f32>,
    /// squash distances into [0, 1) (default: true)
    pub normalized: Option<bool>,
    /// distance written for missing values (default: 1.0)
    pub default_value: Option<f32>,

    // metric parameters
    pub language: Option<String>,
    pub granularity: Option<String>,
    pub day_first: Option<bool>,
    pub year_first: Option<bool>,
    pub units: Option<String>,
    pub in_radians: Option<bool>,
    pub planet_radius: Option<f64>,
}

/// The blocking entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockingConfig {
    /// soundex, ngram, sorted-neighborhood, kmeans, kdtree, minhash
    pub kind: String,
    pub ref_index: Option<usize>,
    pub target_index: Option<usize>,
    pub language: Option<String>,
    pub ngram_size: Option<usize>,
    pub depth: Option<usize>,
    pub window_width: Option<usize>,
    pub n_clusters: Option<usize>,
    pub threshold: Option<f64>,
    pub kwordsgram: Option<usize>,
    pub siglen: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub ref_file: Option<String>,
    pub target_file: Option<String>,
    pub output: Option<String>,

    // Parsing
    pub delimiter: Option<String>,
    pub skip_header: Option<bool>,
    /// Column specs: "3" keeps column 3, "2,3" builds a tuple attribute.
    pub ref_indexes: Option<Vec<String>>,
    pub target_indexes: Option<Vec<String>>,

    // Alignment
    pub threshold: Option<f32>,
    pub unique: Option<bool>,
    pub processings: Option<Vec<ProcessingConfig>>,
    pub blocking: Option<BlockingConfig>,

    // External-memory driver
    pub page_size: Option<usize>,
    pub equality_threshold: Option<f32>,
    pub cache_file: Option<String>,

    // Performance
    pub threads: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;
        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;
        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments.
    pub fn generate_sample() -> String {
        r#"# reclink.toml - Configuration file for reclink
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Reference and target record files; the first kept column is the record id
ref_file = "/path/to/reference.csv"
target_file = "/path/to/target.csv"

# Output result file (aligned;targetted;distance)
output = "results.csv"

# =============================================================================
# PARSING
# =============================================================================

# Field delimiter (default: TAB)
delimiter = "\t"

# Skip a header line in both input files
skip_header = false

# Kept columns: "3" keeps column 3 as one attribute, "2,3" builds a
# tuple-valued attribute from columns 2 and 3 (e.g. latitude/longitude).
# Omit to keep every column.
ref_indexes = ["0", "1", "2,3"]
target_indexes = ["0", "1", "2,3"]

# =============================================================================
# ALIGNMENT
# =============================================================================

# Composite distance threshold for a match
threshold = 30.0

# Keep only the best target per reference record
unique = true

# One [[processings]] block per compared attribute
[[processings]]
metric = "geographical"       # levenshtein, soundex, jaccard, temporal,
                              # geographical, euclidean
ref_index = 2
target_index = 2
weight = 1.0
normalized = false            # keep raw distances (kilometers here)
units = "km"

# [[processings]]
# metric = "levenshtein"
# ref_index = 1
# target_index = 1
# weight = 1.0

# Candidate-reduction technique (omit to compare the full product)
[blocking]
kind = "kdtree"               # soundex, ngram, sorted-neighborhood, kmeans,
                              # kdtree, minhash
ref_index = 2
target_index = 2
threshold = 0.3

# =============================================================================
# EXTERNAL-MEMORY DRIVER
# =============================================================================

# Page size in lines; set it to align huge files page by page
# page_size = 10000

# Distance at which an alignment is considered perfect
# equality_threshold = 0.01

# Cache file for reuse across driver runs (.lz4)
# cache_file = "align-cache.lz4"

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
# threads = 8
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let sample = Config::generate_sample();
        let config: Config = toml::from_str(&sample).unwrap();
        assert_eq!(config.threshold, Some(30.0));
        assert_eq!(config.unique, Some(true));
        let processings = config.processings.unwrap();
        assert_eq!(processings.len(), 1);
        assert_eq!(processings[0].metric, "geographical");
        assert_eq!(config.blocking.unwrap().kind, "kdtree");
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");
        let mut config = Config::default();
        config.threshold = Some(0.3);
        config.ref_file = Some("ref.csv".to_string());
        config.to_file(&path).unwrap();
        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.threshold, Some(0.3));
        assert_eq!(reloaded.ref_file.as_deref(), Some("ref.csv"));
    }
}
