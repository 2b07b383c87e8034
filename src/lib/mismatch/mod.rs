//! Decoding pileup records into strand-resolved per-nucleotide mismatch
//! counts with read-position histograms (BED output).

use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::record::{MismatchRow, PileupRecord};

/// The observation symbols reported, in output enumeration order.
pub const SYMBOLS: [u8; 12] = [
    b',', b'.', b'A', b'C', b'G', b'T', b'N', b'a', b'c', b'g', b't', b'n',
];

/// Lower-case letters and `,` come from reverse-strand reads.
#[inline]
pub fn is_reverse_symbol(sym: u8) -> bool {
    matches!(sym, b'a' | b'c' | b'g' | b't' | b'n' | b',')
}

/// Case-preserving complement; match punctuation folds to `.`, anything
/// unrecognised to `N`.
#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        b'N' => b'N',
        b'n' => b'n',
        b'.' | b',' => b'.',
        _ => b'N',
    }
}

/// Aggregate one record into BED rows: one row per symbol with a nonzero
/// count, enumerated in [`SYMBOLS`] order.
///
/// Match symbols report the site as `ref>ref` on their strand. Reverse
/// mismatches complement both the reference base and the observed symbol, so
/// the pair always reads in the originating read's orientation.
pub fn mismatch_rows(record: &PileupRecord) -> Vec<MismatchRow> {
    let mut offsets_by_symbol: FxHashMap<u8, Vec<u8>> = FxHashMap::default();
    for ob in &record.obs {
        offsets_by_symbol
            .entry(ob.call)
            .or_default()
            .push(ob.offset_value());
    }

    let mut rows = Vec::new();
    for &sym in SYMBOLS.iter() {
        let Some(offsets) = offsets_by_symbol.get(&sym) else {
            continue;
        };

        let (strand, ref_out, obs_out) = if is_reverse_symbol(sym) {
            if sym == b',' {
                ('-', record.ref_base, record.ref_base)
            } else {
                ('-', complement(record.ref_base), complement(sym))
            }
        } else if sym == b'.' {
            ('+', record.ref_base, record.ref_base)
        } else {
            ('+', record.ref_base, sym)
        };

        let mut histogram: BTreeMap<u8, u32> = BTreeMap::new();
        for &offset in offsets {
            *histogram.entry(offset).or_insert(0) += 1;
        }
        let stat = format!(
            "{};{}",
            offsets.len(),
            histogram
                .iter()
                .map(|(offset, count)| format!("{offset}:{count}"))
                .join(",")
        );

        rows.push(MismatchRow {
            contig: record.contig.clone(),
            start: record.pos,
            end: record.pos + 1,
            change: format!("{}>{}", ref_out as char, obs_out as char),
            stat,
            strand,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Observation;

    fn record(ref_base: u8, obs: &[(u8, u8)]) -> PileupRecord {
        let observations = obs
            .iter()
            .map(|&(call, offset)| Observation::new(call, 33 + 40, 33 + offset))
            .collect();
        PileupRecord::new("chr1", 99, ref_base, observations)
    }

    #[test]
    fn decodes_reference_example() {
        // chr1 100 A 3 .,g III !"#
        let rows = mismatch_rows(&record(b'A', &[(b'.', 0), (b',', 1), (b'g', 2)]));
        assert_eq!(rows.len(), 3);

        // Enumeration order: ',' then '.' then letters.
        assert_eq!(rows[0].change, "A>A");
        assert_eq!(rows[0].strand, '-');
        assert_eq!(rows[0].stat, "1;1:1");

        assert_eq!(rows[1].change, "A>A");
        assert_eq!(rows[1].strand, '+');
        assert_eq!(rows[1].stat, "1;0:1");

        assert_eq!(rows[2].change, "T>c");
        assert_eq!(rows[2].strand, '-');
        assert_eq!(rows[2].stat, "1;2:1");

        for row in &rows {
            assert_eq!((row.start, row.end), (99, 100));
            assert_eq!(row.contig.as_str(), "chr1");
        }
    }

    #[test]
    fn forward_mismatch_keeps_reference_orientation() {
        let rows = mismatch_rows(&record(b'A', &[(b'G', 5), (b'G', 5), (b'G', 9)]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].change, "A>G");
        assert_eq!(rows[0].strand, '+');
        assert_eq!(rows[0].stat, "3;5:2,9:1");
    }

    #[test]
    fn histogram_orders_offsets_ascending() {
        let rows = mismatch_rows(&record(b'C', &[(b'T', 9), (b'T', 0), (b'T', 4), (b'T', 0)]));
        assert_eq!(rows[0].stat, "4;0:2,4:1,9:1");
    }

    #[test]
    fn rows_follow_symbol_enumeration_not_count() {
        let rows = mismatch_rows(&record(b'A', &[(b'g', 0), (b'g', 0), (b'.', 1)]));
        // '.' precedes 'g' in the alphabet despite the lower count.
        assert_eq!(rows[0].change, "A>A");
        assert_eq!(rows[1].change, "T>c");
    }

    #[test]
    fn symbols_outside_alphabet_are_ignored() {
        let rows = mismatch_rows(&record(b'A', &[(b'*', 0), (b'.', 1)]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].change, "A>A");
    }

    #[test]
    fn complement_is_case_preserving() {
        assert_eq!(complement(b'g'), b'c');
        assert_eq!(complement(b'G'), b'C');
        assert_eq!(complement(b'n'), b'n');
        assert_eq!(complement(b','), b'.');
        assert_eq!(complement(b'X'), b'N');
    }
}
