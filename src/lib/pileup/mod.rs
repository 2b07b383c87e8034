//! The pileup encoder: turns a position-sorted stream of aligned reads into
//! per-site pileup records.
//!
//! Sites live in a [`SiteWindow`] keyed by genomic position. Each incoming
//! read first flushes every site it can no longer touch, then walks its
//! unclipped bases in lock-step with the window. A site is sealed the moment
//! the window moves past it and is never mutated again.
//!
//! Strand is folded into the calls channel: reverse-strand observations use
//! `,`/lower-case symbols and mirrored structural markers, and their read
//! offsets count from the read's 5' end (`L-1-i`). Only forward read-start
//! markers carry a mapping-quality byte; it is hardcoded to `~` on both
//! strands, a quirk kept from the original format.

pub mod reads;
pub mod reference;
pub mod site;
pub mod window;

pub use reads::{decode_read, AlignedRead, DecodedRead};
pub use reference::ContigReference;
pub use site::PileupSite;
pub use window::SiteWindow;

use smartstring::{alias::String as SmartStr, LazyCompact, SmartString};

use crate::core::error::{PileupError, Result};
use crate::record::{Marker, Observation, PileupRecord};

/// Mapping-quality byte emitted inside `^` escapes.
const MARKER_MAPQ: u8 = b'~';

/// Longest read the offset channel can carry: offsets are one Phred+33 byte,
/// so 33 + 222 = 255 is the last encodable value.
const MAX_READ_LEN: usize = 223;

struct Contig {
    name: SmartString<LazyCompact>,
    seq: Vec<u8>,
}

/// Streaming pileup encoder over one BAM's worth of reads.
///
/// Sealed records are appended to the `out` buffer passed to each call, in
/// strictly increasing position order per contig.
pub struct Encoder {
    window: SiteWindow,
    strand_specific: bool,
    contig: Option<Contig>,
}

impl Encoder {
    /// `strand_specific = false` collapses every read onto the forward
    /// strand (`--not-strand-specific`).
    pub fn new(strand_specific: bool) -> Self {
        Encoder {
            window: SiteWindow::new(),
            strand_specific,
            contig: None,
        }
    }

    pub fn contig_name(&self) -> Option<&str> {
        self.contig.as_ref().map(|c| c.name.as_str())
    }

    /// Switch to a new contig, flushing every pending site under the
    /// previous contig's name first.
    pub fn begin_contig(&mut self, name: &str, seq: Vec<u8>, out: &mut Vec<PileupRecord>) {
        self.flush_all(out);
        self.contig = Some(Contig {
            name: SmartStr::from(name),
            seq,
        });
    }

    /// Feed one soft-clip-stripped read. Reads must arrive position-sorted
    /// within a contig; anything else surfaces as a fatal desync.
    pub fn push_read(&mut self, read: &AlignedRead, out: &mut Vec<PileupRecord>) -> Result<()> {
        let contig = self.contig.as_ref().ok_or_else(|| {
            PileupError::InvalidInput("read encountered before any contig was loaded".into())
        })?;

        for sealed in self.window.pop_front_while(|site| site.pos < read.pos) {
            out.push(sealed.into_record(&contig.name));
        }

        let len = read.bases.len();
        if len == 0 {
            // Fully soft-clipped read; touches no site.
            return Ok(());
        }
        if len > MAX_READ_LEN {
            return Err(PileupError::InvalidInput(format!(
                "read has {len} unclipped bases; single-byte offsets cap read length at {MAX_READ_LEN}"
            )));
        }
        let reverse = read.reverse && self.strand_specific;

        for i in 0..len {
            let g = read.pos + i as i64;
            if g < 0 || g as usize >= contig.seq.len() {
                return Err(PileupError::BeyondReference {
                    contig: contig.name.to_string(),
                    pos: g,
                    len: contig.seq.len(),
                });
            }
            let ref_base = contig.seq[g as usize];
            let base = read.bases[i];

            let call = if base == ref_base {
                if reverse {
                    b','
                } else {
                    b'.'
                }
            } else if reverse {
                base.to_ascii_lowercase()
            } else {
                base
            };
            // Offsets count 5'->3' along the original read regardless of the
            // genomic strand it aligned to.
            let offset = if reverse { (len - 1 - i) as u8 } else { i as u8 };

            let mut ob = Observation::new(
                call,
                33u8.wrapping_add(read.quals[i]),
                33u8.wrapping_add(offset),
            );
            if i == 0 {
                ob.leading.push(if reverse {
                    Marker::End
                } else {
                    Marker::Start { mapq: MARKER_MAPQ }
                });
            }
            if i == len - 1 {
                ob.trailing.push(if reverse {
                    Marker::Start { mapq: MARKER_MAPQ }
                } else {
                    Marker::End
                });
            }

            let site = self.window.get_or_create(g)?;
            site.ref_base = ref_base;
            site.push(ob);
        }

        Ok(())
    }

    /// Flush everything still pending; call at end of input.
    pub fn finish(mut self, out: &mut Vec<PileupRecord>) {
        self.flush_all(out);
    }

    fn flush_all(&mut self, out: &mut Vec<PileupRecord>) {
        if let Some(contig) = &self.contig {
            for sealed in self.window.drain_all() {
                out.push(sealed.into_record(&contig.name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(pos: i64, bases: &[u8], reverse: bool) -> AlignedRead {
        AlignedRead {
            pos,
            reverse,
            bases: bases.to_vec(),
            quals: vec![40; bases.len()],
        }
    }

    fn encode_all(seq: &[u8], reads: &[AlignedRead]) -> Vec<PileupRecord> {
        let mut encoder = Encoder::new(true);
        let mut out = Vec::new();
        encoder.begin_contig("chr1", seq.to_vec(), &mut out);
        for r in reads {
            encoder.push_read(r, &mut out).unwrap();
        }
        encoder.finish(&mut out);
        out
    }

    fn calls_of(record: &PileupRecord) -> Vec<u8> {
        record.render_channels().0
    }

    #[test]
    fn forward_single_base_match() {
        let records = encode_all(b"ACGT", &[read(0, b"A", false)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pos, 0);
        assert_eq!(records[0].ref_base, b'A');
        assert_eq!(calls_of(&records[0]), b"^~.$");
        assert_eq!(records[0].obs[0].offset_value(), 0);
    }

    #[test]
    fn reverse_single_base_mismatch() {
        let records = encode_all(b"ACGT", &[read(0, b"G", true)]);
        assert_eq!(calls_of(&records[0]), b"$g^~");
        assert_eq!(records[0].obs[0].offset_value(), 0);
    }

    #[test]
    fn reverse_offsets_count_from_five_prime() {
        let records = encode_all(b"ACGTACGT", &[read(2, b"GTA", true)]);
        let offsets: Vec<u8> = records.iter().map(|r| r.obs[0].offset_value()).collect();
        assert_eq!(offsets, vec![2, 1, 0]);
        // Leftmost base of a reverse read is its 3' end: `$` before, and the
        // rightmost carries the `^~` after.
        assert_eq!(calls_of(&records[0]), b"$,");
        assert_eq!(calls_of(&records[2]), b",^~");
    }

    #[test]
    fn mismatch_case_encodes_strand() {
        let records = encode_all(b"AAAA", &[read(0, b"AG", false), read(0, b"AG", true)]);
        // Site 1 holds both reads' second base: G mismatch, fwd then rev.
        assert_eq!(records[1].obs[0].call, b'G');
        assert_eq!(records[1].obs[1].call, b'g');
        assert_eq!(records[0].obs[0].call, b'.');
        assert_eq!(records[0].obs[1].call, b',');
    }

    #[test]
    fn not_strand_specific_collapses_to_forward() {
        let mut encoder = Encoder::new(false);
        let mut out = Vec::new();
        encoder.begin_contig("chr1", b"ACGT".to_vec(), &mut out);
        encoder.push_read(&read(0, b"G", true), &mut out).unwrap();
        encoder.finish(&mut out);
        assert_eq!(calls_of(&out[0]), b"^~G$");
        assert_eq!(out[0].obs[0].offset_value(), 0);
    }

    #[test]
    fn emits_in_strictly_increasing_position_order() {
        let records = encode_all(
            b"ACGTACGTACGT",
            &[read(0, b"ACGT", false), read(2, b"GTAC", false), read(6, b"GT", false)],
        );
        let positions: Vec<i64> = records.iter().map(|r| r.pos).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn sites_seal_once_no_read_can_touch_them() {
        let mut encoder = Encoder::new(true);
        let mut out = Vec::new();
        encoder.begin_contig("chr1", b"ACGTACGT".to_vec(), &mut out);
        encoder.push_read(&read(0, b"ACG", false), &mut out).unwrap();
        assert!(out.is_empty());
        encoder.push_read(&read(2, b"GTA", false), &mut out).unwrap();
        // Positions 0 and 1 are behind the new read's start.
        assert_eq!(out.iter().map(|r| r.pos).collect::<Vec<_>>(), vec![0, 1]);
        encoder.finish(&mut out);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn overlap_depth_and_channel_invariant() {
        let records = encode_all(
            b"ACGTACGT",
            &[read(0, b"ACGT", false), read(2, b"GTAC", true)],
        );
        for record in &records {
            let (_, quals, offsets) = record.render_channels();
            assert_eq!(quals.len() as u32, record.depth());
            assert_eq!(offsets.len() as u32, record.depth());
        }
        let depths: Vec<u32> = records.iter().map(|r| r.depth()).collect();
        assert_eq!(depths, vec![1, 1, 2, 2, 1, 1]);
    }

    #[test]
    fn contig_change_flushes_under_previous_name() {
        let mut encoder = Encoder::new(true);
        let mut out = Vec::new();
        encoder.begin_contig("chr1", b"ACGT".to_vec(), &mut out);
        encoder.push_read(&read(0, b"AC", false), &mut out).unwrap();
        encoder.begin_contig("chr2", b"GGGG".to_vec(), &mut out);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.contig.as_str() == "chr1"));
        encoder.push_read(&read(1, b"GG", false), &mut out).unwrap();
        encoder.finish(&mut out);
        assert_eq!(out[2].contig.as_str(), "chr2");
        assert_eq!(out[2].pos, 1);
    }

    #[test]
    fn unsorted_input_is_a_fatal_desync() {
        let mut encoder = Encoder::new(true);
        let mut out = Vec::new();
        encoder.begin_contig("chr1", b"ACGTACGT".to_vec(), &mut out);
        encoder.push_read(&read(5, b"CG", false), &mut out).unwrap();
        let err = encoder.push_read(&read(3, b"TA", false), &mut out).unwrap_err();
        assert!(matches!(err, PileupError::PositionDesync { .. }));
    }

    #[test]
    fn read_past_reference_end_is_fatal() {
        let mut encoder = Encoder::new(true);
        let mut out = Vec::new();
        encoder.begin_contig("chr1", b"ACG".to_vec(), &mut out);
        let err = encoder.push_read(&read(1, b"CGT", false), &mut out).unwrap_err();
        assert!(matches!(err, PileupError::BeyondReference { .. }));
    }

    #[test]
    fn overlong_reads_are_rejected() {
        let mut encoder = Encoder::new(true);
        let mut out = Vec::new();
        encoder.begin_contig("chr1", vec![b'A'; 300], &mut out);
        encoder
            .push_read(&read(0, &vec![b'A'; 223], false), &mut out)
            .unwrap();
        let err = encoder
            .push_read(&read(0, &vec![b'A'; 224], false), &mut out)
            .unwrap_err();
        assert!(matches!(err, PileupError::InvalidInput(_)));
    }

    #[test]
    fn fully_clipped_read_touches_nothing() {
        let records = encode_all(b"ACGT", &[read(0, b"", false), read(1, b"C", false)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pos, 1);
    }

    #[test]
    fn reference_base_recorded_idempotently() {
        let records = encode_all(b"ACGT", &[read(1, b"C", false), read(1, b"G", true)]);
        assert_eq!(records[0].ref_base, b'C');
        assert_eq!(records[0].obs[0].call, b'.');
        assert_eq!(records[0].obs[1].call, b'g');
    }
}
