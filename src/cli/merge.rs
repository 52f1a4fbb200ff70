// merge.rs - Merge command line arguments over the configuration file

use crate::cli::args::Args;
use crate::cli::config::Config;

/// Resolve the effective configuration: file values first, command line
/// arguments override.
pub fn merge_args(args: &Args, mut config: Config) -> Config {
    if args.ref_file.is_some() {
        config.ref_file = args.ref_file.clone();
    }
    if args.target_file.is_some() {
        config.target_file = args.target_file.clone();
    }
    if args.output.is_some() {
        config.output = args.output.clone();
    }
    if args.threshold.is_some() {
        config.threshold = args.threshold;
    }
    if args.delimiter.is_some() {
        config.delimiter = args.delimiter.clone();
    }
    if args.skip_header {
        config.skip_header = Some(true);
    }
    if args.unique {
        config.unique = Some(true);
    }
    if args.page_size.is_some() {
        config.page_size = args.page_size;
    }
    if args.equality_threshold.is_some() {
        config.equality_threshold = args.equality_threshold;
    }
    if args.cache_file.is_some() {
        config.cache_file = args.cache_file.clone();
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> Args {
        Args {
            config: None,
            ref_file: None,
            target_file: None,
            output: None,
            threshold: None,
            delimiter: None,
            skip_header: false,
            unique: false,
            page_size: None,
            equality_threshold: None,
            cache_file: None,
            threads: None,
            generate_config: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_args_override_config() {
        let mut config = Config::default();
        config.threshold = Some(10.0);
        config.ref_file = Some("from-config.csv".to_string());

        let mut args = empty_args();
        args.threshold = Some(25.0);

        let merged = merge_args(&args, config);
        assert_eq!(merged.threshold, Some(25.0));
        assert_eq!(merged.ref_file.as_deref(), Some("from-config.csv"));
    }

    #[test]
    fn test_switches_only_enable() {
        let mut config = Config::default();
        config.unique = Some(true);
        let merged = merge_args(&empty_args(), config);
        // an absent switch never disables a config value
        assert_eq!(merged.unique, Some(true));
    }
}
