use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

use rnapileup_lib::mismatch::mismatch_rows;
use rnapileup_lib::record::PileupRecord;
use rnapileup_lib::utils;

/// CLI arguments for the `mismatch-bed` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "mismatch-bed")]
pub struct MismatchArgs {
    /// Pileup input (`-` = stdin; `.gz` input is decompressed).
    pub pileup: PathBuf,

    /// Output path (`-` or omitted = stdout; `.gz` output is compressed).
    #[structopt(long, short = "o")]
    pub output: Option<PathBuf>,
}

/// Execute the `mismatch-bed` command end-to-end.
pub fn run_mismatch(args: MismatchArgs) -> Result<()> {
    info!("Decoding pileup {:?} into mismatch BED", args.pileup);

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

    let mut sites: u64 = 0;
    for (line, result) in reader.byte_records().enumerate() {
        let raw = result.with_context(|| format!("Failed to read pileup line {}", line + 1))?;
        let record = PileupRecord::from_byte_record(&raw)
            .with_context(|| format!("Malformed pileup line {}", line + 1))?;
        for row in mismatch_rows(&record) {
            writer.serialize(&row)?;
        }
        sites += 1;
    }

    writer.flush()?;
    info!("decoded {sites} pileup sites");
    Ok(())
}
