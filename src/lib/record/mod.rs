//! The pileup record format shared by the encoder, filter, and decoder.
//!
//! A pileup line carries seven tab-separated fields:
//!
//! ```text
//! contig  1-based-pos  ref-base  depth  calls  quals  read-offsets
//! ```
//!
//! `quals` and `read-offsets` hold exactly one Phred+33 byte per contributing
//! read. `calls` holds one symbol per read (`.`/`,` for matches, a base letter
//! for mismatches, case and punctuation encoding strand) interleaved with
//! structural markers: `^` followed by a mapping-quality byte, or `$`. Markers
//! flag observations at a read's first or last unclipped base.
//!
//! All channels are treated as raw bytes. Offsets on long reads encode above
//! `~` (0x7e), so these fields are not guaranteed UTF-8.

use crate::core::error::{PileupError, Result};
use csv::ByteRecord;
use serde::Serialize;
use smartstring::{alias::String as SmartStr, LazyCompact, SmartString};

/// A structural marker attached to an observation in the calls channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `^` plus one mapping-quality byte.
    Start { mapq: u8 },
    /// `$`.
    End,
}

impl Marker {
    fn render(&self, out: &mut Vec<u8>) {
        match self {
            Marker::Start { mapq } => {
                out.push(b'^');
                out.push(*mapq);
            }
            Marker::End => out.push(b'$'),
        }
    }
}

/// One read's contribution to a site: an encoded call symbol, its quality and
/// read-offset bytes, and any structural markers around the symbol.
///
/// `qual` and `read_offset` are stored as they appear on the wire (Phred+33).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub call: u8,
    pub qual: u8,
    pub read_offset: u8,
    pub leading: Vec<Marker>,
    pub trailing: Vec<Marker>,
}

impl Observation {
    /// A plain mid-read observation with no markers.
    pub fn new(call: u8, qual: u8, read_offset: u8) -> Self {
        Observation {
            call,
            qual,
            read_offset,
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// Decoded quality score (`byte - 33`).
    #[inline]
    pub fn qual_score(&self) -> u8 {
        self.qual.wrapping_sub(33)
    }

    /// Decoded 5'-relative read offset (`byte - 33`).
    #[inline]
    pub fn offset_value(&self) -> u8 {
        self.read_offset.wrapping_sub(33)
    }

    /// `true` when this base was the first or last unclipped base of its read.
    #[inline]
    pub fn is_read_boundary(&self) -> bool {
        !self.leading.is_empty() || !self.trailing.is_empty()
    }
}

/// A fully decoded pileup record. Positions are 0-based internally and
/// emitted 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PileupRecord {
    pub contig: SmartString<LazyCompact>,
    pub pos: i64,
    pub ref_base: u8,
    pub obs: Vec<Observation>,
}

impl PileupRecord {
    pub fn new(contig: &str, pos: i64, ref_base: u8, obs: Vec<Observation>) -> Self {
        PileupRecord {
            contig: SmartStr::from(contig),
            pos,
            ref_base,
            obs,
        }
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.obs.len() as u32
    }

    /// Render the three encoded channels (calls, quals, read offsets).
    pub fn render_channels(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut calls = Vec::with_capacity(self.obs.len() + 4);
        let mut quals = Vec::with_capacity(self.obs.len());
        let mut offsets = Vec::with_capacity(self.obs.len());
        for ob in &self.obs {
            for marker in &ob.leading {
                marker.render(&mut calls);
            }
            calls.push(ob.call);
            for marker in &ob.trailing {
                marker.render(&mut calls);
            }
            quals.push(ob.qual);
            offsets.push(ob.read_offset);
        }
        (calls, quals, offsets)
    }

    /// Serialize into the 7-field tab-separated wire form.
    pub fn to_byte_record(&self) -> ByteRecord {
        let (calls, quals, offsets) = self.render_channels();
        let mut rec = ByteRecord::new();
        rec.push_field(self.contig.as_bytes());
        rec.push_field((self.pos + 1).to_string().as_bytes());
        rec.push_field(&[self.ref_base]);
        rec.push_field(self.depth().to_string().as_bytes());
        rec.push_field(&calls);
        rec.push_field(&quals);
        rec.push_field(&offsets);
        rec
    }

    /// Parse a pileup line. Rejects malformed rows outright: wrong field
    /// count, non-numeric position or depth, and channels whose lengths
    /// disagree with the depth field.
    pub fn from_byte_record(rec: &ByteRecord) -> Result<Self> {
        if rec.len() != 7 {
            return Err(PileupError::Parse(format!(
                "expected 7 tab-separated fields, found {}",
                rec.len()
            )));
        }

        let contig = std::str::from_utf8(&rec[0])
            .map_err(|_| PileupError::Parse("contig name is not UTF-8".into()))?;
        let pos: i64 = parse_int(&rec[1], "position")?;
        if pos < 1 {
            return Err(PileupError::Parse(format!(
                "position must be 1-based and positive, found {pos}"
            )));
        }
        let ref_base = match &rec[2] {
            &[base] => base,
            field => {
                return Err(PileupError::Parse(format!(
                    "reference base field must be a single byte, found {:?}",
                    String::from_utf8_lossy(field)
                )))
            }
        };
        let depth: usize = parse_int(&rec[3], "depth")? as usize;

        let quals = &rec[5];
        let offsets = &rec[6];
        if quals.len() != depth || offsets.len() != depth {
            return Err(PileupError::Parse(format!(
                "depth {} does not match quality ({}) and read-offset ({}) channel lengths",
                depth,
                quals.len(),
                offsets.len()
            )));
        }

        let obs = parse_channels(&rec[4], quals, offsets)?;
        if obs.len() != depth {
            return Err(PileupError::Parse(format!(
                "calls channel decodes to {} observations but depth is {}",
                obs.len(),
                depth
            )));
        }

        Ok(PileupRecord {
            contig: SmartStr::from(contig),
            pos: pos - 1,
            ref_base,
            obs,
        })
    }
}

fn parse_int(field: &[u8], what: &str) -> Result<i64> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            PileupError::Parse(format!(
                "{what} field is not numeric: {:?}",
                String::from_utf8_lossy(field)
            ))
        })
}

/// `true` for symbols only forward-strand reads produce (`.` or upper-case).
#[inline]
fn is_forward_symbol(byte: u8) -> bool {
    byte == b'.' || byte.is_ascii_uppercase()
}

/// Decode the calls channel against its index-aligned quality and offset
/// channels.
///
/// Marker attribution: `^q` binds to the *following* symbol, and a marker run
/// closing the string binds to the last symbol as trailing markers. A `$`
/// followed by a forward-class symbol binds to the *previous* observation as
/// trailing, since forward symbols never carry a leading `$`; a `$` before a
/// reverse-class symbol stays a leading reverse read-start by convention (the
/// `forward-symbol $ reverse-symbol` shape is inherently ambiguous on this
/// wire). Serialization preserves the recorded placement, so parse/render
/// round-trips byte-exactly.
pub fn parse_channels(calls: &[u8], quals: &[u8], offsets: &[u8]) -> Result<Vec<Observation>> {
    let mut obs: Vec<Observation> = Vec::with_capacity(quals.len());
    let mut pending: Vec<Marker> = Vec::new();
    let mut i = 0;

    while i < calls.len() {
        match calls[i] {
            b'^' => {
                let mapq = *calls.get(i + 1).ok_or_else(|| {
                    PileupError::Parse("calls channel ends inside a ^ escape".into())
                })?;
                pending.push(Marker::Start { mapq });
                i += 2;
            }
            b'$' => {
                let closes_previous = pending.is_empty()
                    && calls.get(i + 1).is_some_and(|&next| is_forward_symbol(next));
                match obs.last_mut() {
                    Some(last) if closes_previous => last.trailing.push(Marker::End),
                    _ => pending.push(Marker::End),
                }
                i += 1;
            }
            call => {
                let idx = obs.len();
                let (qual, read_offset) = match (quals.get(idx), offsets.get(idx)) {
                    (Some(&q), Some(&p)) => (q, p),
                    _ => {
                        return Err(PileupError::Parse(format!(
                            "calls channel has more symbols than the depth {} allows",
                            quals.len()
                        )))
                    }
                };
                obs.push(Observation {
                    call,
                    qual,
                    read_offset,
                    leading: std::mem::take(&mut pending),
                    trailing: Vec::new(),
                });
                i += 1;
            }
        }
    }

    if !pending.is_empty() {
        match obs.last_mut() {
            Some(last) => last.trailing = pending,
            None => {
                return Err(PileupError::Parse(
                    "calls channel contains markers but no symbols".into(),
                ))
            }
        }
    }

    Ok(obs)
}

/// One BED line of the mismatch output: contig, 0-based start, 1-based end,
/// `REF>OBS`, `count;offset:count,...`, strand.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MismatchRow {
    pub contig: SmartString<LazyCompact>,
    pub start: i64,
    pub end: i64,
    pub change: String,
    pub stat: String,
    pub strand: char,
}
