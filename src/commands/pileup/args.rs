use std::path::PathBuf;
use structopt::StructOpt;

/// CLI arguments for the `pileup` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "pileup")]
pub struct PileupArgs {
    /// Input BAM, sorted by position.
    pub reads: PathBuf,

    /// Reference FASTA (a samtools faidx `.fai` index must sit next to it).
    pub reference: PathBuf,

    /// Output path (`-` or omitted = stdout; `.gz` output is compressed).
    #[structopt(long, short = "o")]
    pub output: Option<PathBuf>,

    /// Treat every read as forward-strand (collapse both strands onto `+`).
    #[structopt(long)]
    pub not_strand_specific: bool,

    /// Drop observations at a read's first or last unclipped base.
    #[structopt(long)]
    pub exclude_ends: bool,

    /// Minimum base quality for an observation to be kept.
    #[structopt(long = "min-q", short = "q", default_value = "15")]
    pub min_q: u8,

    /// Minimum post-filter depth required to emit a site.
    #[structopt(long = "min-coverage", short = "d", default_value = "10")]
    pub min_coverage: u32,
}

/// Normalised configuration derived from [`PileupArgs`].
#[derive(Debug, Clone)]
pub struct PileupConfig {
    pub reads: PathBuf,
    pub reference: PathBuf,
    pub output: Option<PathBuf>,
    pub strand_specific: bool,
    pub exclude_ends: bool,
    pub min_q: u8,
    pub min_coverage: u32,
}

impl From<PileupArgs> for PileupConfig {
    fn from(args: PileupArgs) -> PileupConfig {
        PileupConfig {
            reads: args.reads,
            reference: args.reference,
            output: args.output,
            strand_specific: !args.not_strand_specific,
            exclude_ends: args.exclude_ends,
            min_q: args.min_q,
            min_coverage: args.min_coverage,
        }
    }
}
