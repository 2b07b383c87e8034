//! rnapileup - strand-aware pileup analysis for RNA-seq alignments
//!
//! Three subcommands form a streaming pipeline over a line-oriented pileup
//! record format:
//!
//! - `pileup`: generate per-site pileup records from a position-sorted BAM
//!   and an indexed reference FASTA, with built-in quality/coverage filtering
//! - `filter`: re-filter an existing pileup stream by quality, coverage, and
//!   read-end status
//! - `mismatch-bed`: decode a pileup stream into strand-resolved per-site
//!   mismatch counts with read-position histograms, in BED format
//!
//! # Usage
//!
//! ```bash
//! # Generate a filtered pileup
//! rnapileup pileup reads.bam ref.fasta --min-q 15 --min-coverage 10 > out.pileup
//!
//! # Re-filter an existing pileup, also dropping read-end observations
//! rnapileup filter out.pileup 20 10 --remove-ends > strict.pileup
//!
//! # Decode into per-nucleotide mismatch statistics
//! rnapileup mismatch-bed strict.pileup > mismatches.bed
//! ```
//!
//! Stages compose over pipes: `filter` and `mismatch-bed` read `-` as stdin.

extern crate rnapileup_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use rnapileup_lib::utils;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Commands for strand-aware pileup generation and mismatch analysis
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Generate per-site pileup records from a position-sorted BAM
    Pileup(commands::PileupArgs),
    /// Filter pileup records by quality, coverage, and read-end status
    Filter(commands::FilterArgs),
    /// Decode pileup records into per-site mismatch BED lines
    MismatchBed(commands::MismatchArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Pileup(args) => commands::run_pileup(args)?,
            Subcommand::Filter(args) => commands::run_filter(args)?,
            Subcommand::MismatchBed(args) => commands::run_mismatch(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
