// main.rs - CLI entry point

use std::time::Instant;

use reclink::align::{aligned_pairs_of, alignall_iterative, load_cache, save_cache, BaseAligner, IterativeOptions, MatchedMap};
use reclink::cli::{merge_args, validate_config, Args, Config, Job};
use reclink::data::parse_file;
use reclink::output::write_results;

fn main() {
    env_logger::init();
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let args: Args = argh::from_env();

    // Handle generate config first
    if args.generate_config {
        println!("{}", Config::generate_sample());
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified, then let arguments override
    let config = match args.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let config = merge_args(&args, config);
    let job = validate_config(&config)?;

    println!("🚀 reclink v{}", env!("CARGO_PKG_VERSION"));

    // Configure thread pool
    if let Some(n) = job.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        println!("🧵 Threads: {} (auto-detected)", rayon::current_num_threads());
    }

    if args.dry_run {
        let refset = parse_file(&job.ref_file, &job.ref_spec)
            .map_err(|e| format!("Failed to parse '{}': {}", job.ref_file.display(), e))?;
        let targetset = parse_file(&job.target_file, &job.target_spec)
            .map_err(|e| format!("Failed to parse '{}': {}", job.target_file.display(), e))?;
        println!("✅ Dry run completed successfully");
        println!(
            "📊 {} reference records, {} target records, {} processings",
            refset.len(),
            targetset.len(),
            job.processings.len()
        );
        return Ok(());
    }

    let total_start = Instant::now();
    if job.page_size.is_some() {
        run_iterative(job)?;
    } else {
        run_in_memory(job)?;
    }
    println!("⏱️  Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

/// Whole-dataset alignment: both files fit in memory.
fn run_in_memory(job: Job) -> Result<(), String> {
    let Job {
        ref_file,
        target_file,
        output,
        ref_spec,
        target_spec,
        threshold,
        unique,
        processings,
        blocking,
        ..
    } = job;

    let refset = parse_file(&ref_file, &ref_spec)
        .map_err(|e| format!("Failed to parse '{}': {}", ref_file.display(), e))?;
    let targetset = parse_file(&target_file, &target_spec)
        .map_err(|e| format!("Failed to parse '{}': {}", target_file.display(), e))?;
    println!(
        "📊 Aligning {} reference records onto {} target records (threshold {})",
        refset.len(),
        targetset.len(),
        threshold
    );

    let mut aligner = BaseAligner::new(threshold, processings);
    if let Some(blocking) = blocking {
        aligner.register_blocking(blocking);
    }
    let (_, matched) = aligner
        .align(&refset, &targetset, false)
        .map_err(|e| format!("Alignment failed: {}", e))?;
    println!(
        "✅ {} reference records matched ({} comparisons)",
        matched.len(),
        aligner.nb_comparisons()
    );

    let matched = if unique {
        let mut uniq = MatchedMap::new();
        for (ref_addr, target_addr, distance) in aligned_pairs_of(&matched, true) {
            uniq.entry(ref_addr).or_default().push((target_addr, distance));
        }
        uniq
    } else {
        matched
    };

    if let Some(output) = output {
        write_results(&matched, &output)?;
        println!("💾 Results written to: {}", output.display());
    }
    Ok(())
}

/// Page-by-page alignment through the external-memory driver.
fn run_iterative(job: Job) -> Result<(), String> {
    let Job {
        ref_file,
        target_file,
        output,
        ref_spec,
        target_spec,
        threshold,
        processings,
        blocking,
        page_size,
        equality_threshold,
        cache_file,
        ..
    } = job;

    let cache = match &cache_file {
        Some(path) if path.exists() => {
            let cache = load_cache(path)
                .map_err(|e| format!("Failed to load cache '{}': {}", path.display(), e))?;
            println!("📂 Loaded {} cached alignments from {}", cache.len(), path.display());
            Some(cache)
        }
        _ => None,
    };

    let mut aligner = BaseAligner::new(threshold, processings);
    if let Some(blocking) = blocking {
        aligner.register_blocking(blocking);
    }
    let options = IterativeOptions {
        size: page_size.unwrap_or(10_000),
        equality_threshold,
        cache,
        show_progress: true,
    };
    let cache = alignall_iterative(
        &mut aligner,
        &ref_file,
        &target_file,
        &ref_spec,
        &target_spec,
        options,
        None,
    )
    .map_err(|e| format!("Iterative alignment failed: {}", e))?;
    println!("✅ {} reference records aligned", cache.len());

    if let Some(path) = &cache_file {
        save_cache(&cache, path)
            .map_err(|e| format!("Failed to save cache '{}': {}", path.display(), e))?;
        println!("💾 Cache saved to: {}", path.display());
    }
    if let Some(output) = output {
        let file = std::fs::File::create(&output)
            .map_err(|e| format!("Failed to create '{}': {}", output.display(), e))?;
        use std::io::Write;
        let mut writer = std::io::BufWriter::new(file);
        writeln!(writer, "aligned;targetted;distance").map_err(|e| format!("Write error: {}", e))?;
        let mut entries: Vec<_> = cache.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (ref_id, (target_id, distance)) in entries {
            writeln!(writer, "{};{};{}", ref_id, target_id, distance)
                .map_err(|e| format!("Write error: {}", e))?;
        }
        writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        println!("💾 Results written to: {}", output.display());
    }
    Ok(())
}
