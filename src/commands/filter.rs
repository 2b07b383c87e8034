use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

use rnapileup_lib::filter::{FilterStats, SiteFilter};
use rnapileup_lib::record::PileupRecord;
use rnapileup_lib::utils;

/// CLI arguments for the `filter` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "filter")]
pub struct FilterArgs {
    /// Pileup input (`-` = stdin; `.gz` input is decompressed).
    pub pileup: PathBuf,

    /// Minimum base quality for an observation to be kept.
    pub min_q: u8,

    /// Minimum post-filter depth required to keep a record.
    pub min_coverage: u32,

    /// Drop observations at a read's first or last unclipped base.
    #[structopt(long)]
    pub remove_ends: bool,

    /// Output path (`-` or omitted = stdout; `.gz` output is compressed).
    #[structopt(long, short = "o")]
    pub output: Option<PathBuf>,
}

/// Execute the `filter` command end-to-end.
pub fn run_filter(args: FilterArgs) -> Result<()> {
    info!("Filtering pileup {:?}", args.pileup);
    if args.remove_ends {
        info!("removing read-end observations");
    }

    let mut reader = utils::get_reader(&Some(&args.pileup), utils::is_bgzipped(&args.pileup))?;
    if let Some(output) = &args.output {
        utils::make_parent_dirs(output)?;
    }
    let gzipped = args
        .output
        .as_ref()
        .map(utils::is_bgzipped)
        .unwrap_or(false);
    let mut writer = utils::get_writer(&args.output, gzipped, 6)?;

    let site_filter = SiteFilter::new(args.min_q, args.min_coverage, args.remove_ends);
    let mut stats = FilterStats::new();

    for (line, result) in reader.byte_records().enumerate() {
        let raw = result.with_context(|| format!("Failed to read pileup line {}", line + 1))?;
        let record = PileupRecord::from_byte_record(&raw)
            .with_context(|| format!("Malformed pileup line {}", line + 1))?;
        if let Some(kept) = site_filter.apply(record, &mut stats) {
            writer.write_byte_record(&kept.to_byte_record())?;
        }
    }

    writer.flush()?;
    stats.log_summary();
    Ok(())
}
