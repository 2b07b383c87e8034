//! Line-oriented readers and writers for the pileup and BED streams.
//!
//! Both formats are plain tab-separated text. Quoting is disabled on every
//! reader and writer: Phred+33 quality and read-offset strings legitimately
//! contain `"` (quality 1) and `,`, which CSV quoting rules would mangle.

use anyhow::Result;
use grep_cli::stdout;
use gzp::{deflate::Gzip, BgzfSyncReader, Compression, ZBuilder};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use termcolor::ColorChoice;

use super::fs::is_stdio;

/// Build a TSV reader over a file, BGZF file, or stdin (`-`).
pub fn get_reader<P: AsRef<Path>>(
    path: &Option<P>,
    bgzipped: bool,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let raw_reader: Box<dyn Read> = match path {
        Some(path) if !is_stdio(path) => {
            let reader = BufReader::new(File::open(path)?);
            if bgzipped {
                Box::new(BgzfSyncReader::new(reader))
            } else {
                Box::new(reader)
            }
        }
        _ => {
            let reader = io::stdin();
            if bgzipped {
                Box::new(BgzfSyncReader::new(reader))
            } else {
                Box::new(reader)
            }
        }
    };

    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        // Field-count validation happens at the record parser, where the
        // error can name the offending line.
        .flexible(true)
        .from_reader(raw_reader))
}

/// Build a TSV writer targeting a file or stdout with optional gzip compression.
pub fn get_writer<P: AsRef<Path>>(
    path: &Option<P>,
    gzipped: bool,
    compression_level: u32,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let raw_writer: Box<dyn Write> = match path {
        Some(path) if !is_stdio(path) => {
            let writer = BufWriter::new(File::create(path)?);
            if gzipped {
                Box::new(
                    ZBuilder::<Gzip, _>::new()
                        .num_threads(1)
                        .compression_level(Compression::new(compression_level))
                        .from_writer(writer),
                )
            } else {
                Box::new(writer)
            }
        }
        _ => Box::new(stdout(ColorChoice::Never)),
    };

    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(raw_writer))
}
