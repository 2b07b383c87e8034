//! Decoding of BAM records into the encoder's read representation.

use rust_htslib::bam::record::{Cigar, Record};

/// An aligned read with soft-clipped bases already stripped.
///
/// The remaining bases align contiguously to the reference starting at `pos`,
/// so base `i` sits at genomic position `pos + i`.
#[derive(Debug, Clone)]
pub struct AlignedRead {
    /// 0-based leftmost reference position of the first unclipped base.
    pub pos: i64,
    pub reverse: bool,
    pub bases: Vec<u8>,
    /// Raw Phred scores, index-aligned with `bases`.
    pub quals: Vec<u8>,
}

/// Outcome of decoding one mapped BAM record.
#[derive(Debug)]
pub enum DecodedRead {
    Aligned(AlignedRead),
    /// The CIGAR contains an insertion, deletion, or splice gap; such reads
    /// cannot contribute to a contiguous site walk and are dropped whole.
    Gapped,
}

/// Decode a mapped record, stripping leading/trailing soft clips.
pub fn decode_read(record: &Record) -> DecodedRead {
    let cigar = record.cigar();
    let mut clip_start = 0usize;
    let mut clip_end = 0usize;
    let mut seen_aligned = false;

    for op in cigar.iter() {
        match op {
            Cigar::Ins(_) | Cigar::Del(_) | Cigar::RefSkip(_) => return DecodedRead::Gapped,
            Cigar::SoftClip(len) => {
                if seen_aligned {
                    clip_end += *len as usize;
                } else {
                    clip_start += *len as usize;
                }
            }
            Cigar::Match(_) | Cigar::Equal(_) | Cigar::Diff(_) => seen_aligned = true,
            Cigar::HardClip(_) | Cigar::Pad(_) => {}
        }
    }

    let seq = record.seq().as_bytes();
    let quals = record.qual();
    let end = seq.len() - clip_end;

    DecodedRead::Aligned(AlignedRead {
        pos: record.pos(),
        reverse: record.is_reverse(),
        bases: seq[clip_start..end].to_vec(),
        quals: quals[clip_start..end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::bam::record::CigarString;

    fn make_record(cigar: Vec<Cigar>, seq: &[u8], pos: i64, reverse: bool) -> Record {
        let mut record = Record::new();
        let quals = vec![30u8; seq.len()];
        record.set(b"read1", Some(&CigarString(cigar)), seq, &quals);
        record.set_pos(pos);
        if reverse {
            record.set_reverse();
        }
        record
    }

    #[test]
    fn strips_soft_clips_on_both_ends() {
        let record = make_record(
            vec![Cigar::SoftClip(2), Cigar::Match(3), Cigar::SoftClip(1)],
            b"AACGTT",
            100,
            false,
        );
        match decode_read(&record) {
            DecodedRead::Aligned(read) => {
                assert_eq!(read.pos, 100);
                assert_eq!(read.bases, b"CGT");
                assert_eq!(read.quals.len(), 3);
            }
            DecodedRead::Gapped => panic!("soft-clipped read should decode"),
        }
    }

    #[test]
    fn drops_reads_with_indels() {
        let record = make_record(
            vec![Cigar::Match(2), Cigar::Ins(1), Cigar::Match(2)],
            b"ACGTA",
            10,
            false,
        );
        assert!(matches!(decode_read(&record), DecodedRead::Gapped));

        let record = make_record(
            vec![Cigar::Match(2), Cigar::Del(3), Cigar::Match(3)],
            b"ACGTA",
            10,
            false,
        );
        assert!(matches!(decode_read(&record), DecodedRead::Gapped));
    }

    #[test]
    fn drops_spliced_reads() {
        let record = make_record(
            vec![Cigar::Match(2), Cigar::RefSkip(50), Cigar::Match(3)],
            b"ACGTA",
            10,
            false,
        );
        assert!(matches!(decode_read(&record), DecodedRead::Gapped));
    }

    #[test]
    fn preserves_strand_flag() {
        let record = make_record(vec![Cigar::Match(4)], b"ACGT", 5, true);
        match decode_read(&record) {
            DecodedRead::Aligned(read) => assert!(read.reverse),
            DecodedRead::Gapped => panic!("plain match should decode"),
        }
    }
}
