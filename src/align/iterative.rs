// iterative.rs - External-memory driver for huge input files

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use super::aligner::BaseAligner;
use crate::data::{parse_file, split_file, Key, ParseSpec};
use crate::error::DriverError;

/// The driver's cross-run cache: best known alignment per reference id.
pub type AlignCache = HashMap<Key, (Key, f32)>;

/// Options of [`alignall_iterative`].
pub struct IterativeOptions {
    /// Page size, in input lines.
    pub size: usize,
    /// Distance at or under which an alignment is considered perfect and
    /// the reference record drops out of later comparisons. Must not exceed
    /// the aligner's threshold.
    pub equality_threshold: f32,
    /// A cache from a previous run, to resume or refine.
    pub cache: Option<AlignCache>,
    pub show_progress: bool,
}

impl Default for IterativeOptions {
    fn default() -> Self {
        IterativeOptions {
            size: 10_000,
            equality_threshold: 0.01,
            cache: None,
            show_progress: true,
        }
    }
}

/// Align two huge record files page by page: both inputs are split into
/// pages of `size` lines inside scratch directories, the page product is
/// aligned with the configured aligner, and the best distance per reference
/// id is maintained in the returned cache. References whose best distance
/// reaches the equality threshold are never compared again.
///
/// The scratch directories are removed on every exit path; cancellation is
/// honored between pages.
pub fn alignall_iterative(
    aligner: &mut BaseAligner,
    ref_file: &Path,
    target_file: &Path,
    ref_spec: &ParseSpec,
    target_spec: &ParseSpec,
    options: IterativeOptions,
    cancel: Option<&AtomicBool>,
) -> Result<AlignCache, DriverError> {
    // RAII scratch directories: dropped (and deleted) on success and on the
    // failure path alike.
    let ref_dir = tempfile::tempdir()?;
    let target_dir = tempfile::tempdir()?;
    let ref_pages = split_file(ref_file, ref_dir.path(), options.size)?;
    let target_pages = split_file(target_file, target_dir.path(), options.size)?;

    let nb_iterations = (ref_pages.len() * target_pages.len()) as u64;
    info!(
        "iterative alignment: {} x {} pages of {} lines",
        ref_pages.len(),
        target_pages.len(),
        options.size
    );
    let progress = if options.show_progress {
        let bar = ProgressBar::new(nb_iterations);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut cache = options.cache.unwrap_or_default();
    // ids already aligned perfectly
    let mut done_ids: HashSet<Key> = cache
        .iter()
        .filter(|(_, (_, distance))| *distance <= options.equality_threshold)
        .map(|(id, _)| id.clone())
        .collect();

    for ref_page in &ref_pages {
        let mut refset: Vec<_> = parse_file(ref_page, ref_spec)?
            .into_iter()
            .filter(|r| !done_ids.contains(&r.id()))
            .collect();

        for target_page in &target_pages {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(DriverError::Cancelled);
                }
            }
            if let Some(bar) = &progress {
                bar.inc(1);
            }
            if refset.is_empty() {
                // every record of this page is already aligned
                continue;
            }
            let targetset = parse_file(target_page, target_spec)?;
            if targetset.is_empty() {
                continue;
            }
            let (_, matched) = aligner.align(&refset, &targetset, false)?;

            for ((_, ref_id), entries) in matched {
                let best = entries.iter().min_by(|a, b| {
                    (a.1, &a.0)
                        .partial_cmp(&(b.1, &b.0))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                let Some(((_, target_id), distance)) = best else {
                    continue;
                };
                let known = cache.get(&ref_id).map(|(_, d)| *d);
                if known.map_or(true, |d| d > *distance) {
                    cache.insert(ref_id.clone(), (target_id.clone(), *distance));
                    if *distance <= options.equality_threshold {
                        done_ids.insert(ref_id);
                    }
                }
            }
            refset.retain(|r| !done_ids.contains(&r.id()));
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    Ok(cache)
}

/// Persist a driver cache (lz4-compressed bincode).
pub fn save_cache<P: AsRef<Path>>(cache: &AlignCache, path: P) -> Result<(), DriverError> {
    let encoded = bincode::serialize(cache).map_err(|e| DriverError::Codec(e.to_string()))?;
    std::fs::write(path, lz4_flex::compress_prepend_size(&encoded))?;
    Ok(())
}

/// Reload a cache written by [`save_cache`].
pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<AlignCache, DriverError> {
    let compressed = std::fs::read(path)?;
    let decoded = lz4_flex::decompress_size_prepended(&compressed)
        .map_err(|e| DriverError::Codec(e.to_string()))?;
    bincode::deserialize(&decoded).map_err(|e| DriverError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnSpec;
    use crate::matrix::Processing;
    use crate::metrics::{Metric, Units};
    use std::io::Write;

    fn write_city_files(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let ref_path = dir.join("alignfile.csv");
        let target_path = dir.join("targetfile.csv");
        let mut f = std::fs::File::create(&ref_path).unwrap();
        write!(
            f,
            "V1\tlabel1\t6.14194444444\t48.67\nV2\tlabel2\t6.2\t49\nV3\tlabel3\t5.1\t48\nV4\tlabel4\t5.2\t48.1\n"
        )
        .unwrap();
        let mut f = std::fs::File::create(&target_path).unwrap();
        write!(
            f,
            "T1\tlabelt1\t6.17\t48.7\nT2\tlabelt2\t5.3\t48.2\nT3\tlabelt3\t6.25\t48.91\n"
        )
        .unwrap();
        (ref_path, target_path)
    }

    fn city_spec() -> ParseSpec {
        ParseSpec {
            indexes: vec![
                ColumnSpec::Index(0),
                ColumnSpec::Index(1),
                ColumnSpec::Tuple(vec![2, 3]),
            ],
            ..ParseSpec::default()
        }
    }

    fn geo_aligner() -> BaseAligner {
        BaseAligner::new(
            30.0,
            vec![Processing::new(
                2,
                2,
                Metric::Geographical {
                    in_radians: false,
                    planet_radius: crate::metrics::geographical::EARTH_RADIUS_M,
                    units: Units::Kilometers,
                },
            )
            .raw()],
        )
    }

    #[test]
    fn test_alignall_iterative() {
        let dir = tempfile::tempdir().unwrap();
        let (ref_path, target_path) = write_city_files(dir.path());
        let mut aligner = geo_aligner();
        let cache = alignall_iterative(
            &mut aligner,
            &ref_path,
            &target_path,
            &city_spec(),
            &city_spec(),
            IterativeOptions {
                size: 2, // very small pages ;)
                equality_threshold: 0.01,
                cache: None,
                show_progress: false,
            },
            None,
        )
        .unwrap();

        let matched: Vec<(Key, Key)> = cache
            .iter()
            .map(|(r, (t, _))| (r.clone(), t.clone()))
            .collect();
        assert_eq!(matched.len(), 3);
        for pair in [
            (Key::from("V1"), Key::from("T1")),
            (Key::from("V2"), Key::from("T3")),
            (Key::from("V4"), Key::from("T2")),
        ] {
            assert!(matched.contains(&pair), "missing {:?}", pair);
        }
    }

    #[test]
    fn test_cache_monotonicity() {
        let dir = tempfile::tempdir().unwrap();
        let (ref_path, target_path) = write_city_files(dir.path());
        let mut aligner = geo_aligner();
        let options = |cache| IterativeOptions {
            size: 2,
            equality_threshold: 0.01,
            cache,
            show_progress: false,
        };
        let first = alignall_iterative(
            &mut aligner,
            &ref_path,
            &target_path,
            &city_spec(),
            &city_spec(),
            options(None),
            None,
        )
        .unwrap();
        let second = alignall_iterative(
            &mut aligner,
            &ref_path,
            &target_path,
            &city_spec(),
            &city_spec(),
            options(Some(first.clone())),
            None,
        )
        .unwrap();
        for (ref_id, (_, distance)) in &first {
            assert!(second[ref_id].1 <= *distance);
        }
    }

    #[test]
    fn test_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let (ref_path, target_path) = write_city_files(dir.path());
        let mut aligner = geo_aligner();
        let cancel = AtomicBool::new(true);
        let result = alignall_iterative(
            &mut aligner,
            &ref_path,
            &target_path,
            &city_spec(),
            &city_spec(),
            IterativeOptions {
                size: 2,
                equality_threshold: 0.01,
                cache: None,
                show_progress: false,
            },
            Some(&cancel),
        );
        assert!(matches!(result, Err(DriverError::Cancelled)));
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.lz4");
        let mut cache = AlignCache::new();
        cache.insert(Key::from("V1"), (Key::from("T1"), 4.5));
        save_cache(&cache, &path).unwrap();
        assert_eq!(load_cache(&path).unwrap(), cache);
    }
}
