//! rnapileup: strand-aware pileup generation and mismatch analysis for
//! RNA-seq alignments.
//!
//! The library backs a three-stage streaming pipeline over a line-oriented
//! pileup record format:
//!
//! 1. [`pileup`]: encode position-sorted aligned reads plus a reference into
//!    one record per covered genomic site.
//! 2. [`filter`]: rewrite records in place, dropping low-quality and
//!    read-end observations and under-covered sites.
//! 3. [`mismatch`]: decode records into strand-resolved per-nucleotide
//!    mismatch counts with read-position histograms.
//!
//! Every stage is single-threaded and single-pass; the encoder's only buffer
//! is a sliding window bounded by the span of overlapping reads.
//!
//! # Modules
//!
//! - [`record`]: the pileup record format (parse/render, structural markers)
//! - [`pileup`]: the encoder, its sliding window, and BAM/FASTA input
//! - [`filter`]: quality/coverage/read-end filtering and run statistics
//! - [`mismatch`]: the decoder/aggregator producing BED rows
//! - [`core`]: errors, IO plumbing, filesystem helpers

pub mod core;
pub mod filter;
pub mod mismatch;
pub mod pileup;
pub mod record;
pub mod utils;
