// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs, Debug)]
/// reclink - Record-linkage toolkit: align two record files under a
/// distance threshold
pub struct Args {
    /// path to TOML job configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// reference record file (.csv or .tsv)
    #[argh(option)]
    pub ref_file: Option<String>,

    /// target record file (.csv or .tsv)
    #[argh(option)]
    pub target_file: Option<String>,

    /// output result file (aligned;targetted;distance)
    #[argh(option)]
    pub output: Option<String>,

    /// composite distance threshold for a match
    #[argh(option)]
    pub threshold: Option<f32>,

    /// field delimiter of the input files (default: TAB)
    #[argh(option)]
    pub delimiter: Option<String>,

    /// skip a header line in both input files
    #[argh(switch)]
    pub skip_header: bool,

    /// keep only the best target per reference record
    #[argh(switch)]
    pub unique: bool,

    /// page size in lines for the external-memory driver (omit to align
    /// in memory)
    #[argh(option)]
    pub page_size: Option<usize>,

    /// distance at which a driver alignment is considered perfect
    #[argh(option)]
    pub equality_threshold: Option<f32>,

    /// driver cache file for reuse across runs (.lz4)
    #[argh(option)]
    pub cache_file: Option<String>,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// generate a sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,
}
