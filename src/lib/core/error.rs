//! Error types shared across the rnapileup library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PileupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("BAM error: {0}")]
    Bam(#[from] rust_htslib::errors::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("reference genome error: {0}")]
    ReferenceGenome(String),

    #[error(
        "position desync: read covers {read_pos} but the window front is {window_pos}; \
         is the input position-sorted?"
    )]
    PositionDesync { read_pos: i64, window_pos: i64 },

    #[error("genomic position {pos} is beyond the end of reference {contig} (length {len})")]
    BeyondReference {
        contig: String,
        pos: i64,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, PileupError>;

/// Returns `true` if the error originated from a broken pipe.
#[inline]
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.root_cause()
        .downcast_ref::<std::io::Error>()
        .map(|io_err| io_err.kind() == std::io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}
