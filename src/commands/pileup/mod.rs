mod args;

use anyhow::{Context, Result};
use log::info;
use rust_htslib::bam::{self, Read};

use rnapileup_lib::filter::{percent, FilterStats, SiteFilter};
use rnapileup_lib::pileup::{decode_read, ContigReference, DecodedRead, Encoder};
use rnapileup_lib::record::PileupRecord;
use rnapileup_lib::utils;

pub use args::{PileupArgs, PileupConfig};

/// Execute the `pileup` command end-to-end.
pub fn run_pileup(args: PileupArgs) -> Result<()> {
    let config: PileupConfig = args.into();

    info!("Generating pileup for {:?}", config.reads);
    if let Some(output) = &config.output {
        utils::make_parent_dirs(output)?;
    }
    let gzipped = config
        .output
        .as_ref()
        .map(utils::is_bgzipped)
        .unwrap_or(false);
    let mut writer = utils::get_writer(&config.output, gzipped, 6)?;

    let mut reference = ContigReference::open(&config.reference)?;
    let mut bam = bam::Reader::from_path(&config.reads)
        .with_context(|| format!("Failed to open {}", config.reads.display()))?;
    let header = bam.header().clone();

    let site_filter = SiteFilter::new(config.min_q, config.min_coverage, config.exclude_ends);
    let mut filter_stats = FilterStats::new();
    let mut encoder = Encoder::new(config.strand_specific);
    let mut sealed: Vec<PileupRecord> = Vec::new();

    let mut reads_total: u64 = 0;
    let mut reads_unmapped: u64 = 0;
    let mut reads_gapped: u64 = 0;

    for result in bam.records() {
        let record = result.context("Failed to read BAM record")?;
        reads_total += 1;

        if record.is_unmapped() || record.tid() < 0 {
            reads_unmapped += 1;
            continue;
        }

        let contig = std::str::from_utf8(header.tid2name(record.tid() as u32))
            .context("BAM contig name is not UTF-8")?;
        if encoder.contig_name() != Some(contig) {
            info!("Encountered new ref: {contig}; loading");
            let seq = reference.contig(contig)?;
            encoder.begin_contig(contig, seq, &mut sealed);
        }

        match decode_read(&record) {
            DecodedRead::Aligned(read) => encoder.push_read(&read, &mut sealed)?,
            DecodedRead::Gapped => {
                reads_gapped += 1;
                continue;
            }
        }

        emit(&mut sealed, &site_filter, &mut filter_stats, &mut writer)?;
    }

    encoder.finish(&mut sealed);
    emit(&mut sealed, &site_filter, &mut filter_stats, &mut writer)?;
    writer.flush()?;

    info!(
        "reads processed: {reads_total}; unmapped skipped: {reads_unmapped} ({}); \
         indel/splice skipped: {reads_gapped} ({})",
        percent(reads_unmapped, reads_total),
        percent(reads_gapped, reads_total),
    );
    filter_stats.log_summary();
    Ok(())
}

fn emit(
    sealed: &mut Vec<PileupRecord>,
    site_filter: &SiteFilter,
    stats: &mut FilterStats,
    writer: &mut csv::Writer<Box<dyn std::io::Write>>,
) -> Result<()> {
    for record in sealed.drain(..) {
        if let Some(kept) = site_filter.apply(record, stats) {
            writer.write_byte_record(&kept.to_byte_record())?;
        }
    }
    Ok(())
}
