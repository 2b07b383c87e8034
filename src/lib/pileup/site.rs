//! A single genomic site accumulating read observations inside the window.

use crate::record::{Observation, PileupRecord};

/// Window entry for one genomic position. Depth is implicit in the
/// observation list, so the channel-length invariant holds by construction.
#[derive(Debug, Clone)]
pub struct PileupSite {
    /// 0-based genomic position.
    pub pos: i64,
    /// Reference base, `N` until the first overlapping read sets it.
    pub ref_base: u8,
    pub obs: Vec<Observation>,
}

impl PileupSite {
    pub fn new(pos: i64) -> Self {
        PileupSite {
            pos,
            ref_base: b'N',
            obs: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, ob: Observation) {
        self.obs.push(ob);
    }

    /// Seal the site under its contig's name once the window moves past it.
    pub fn into_record(self, contig: &str) -> PileupRecord {
        PileupRecord::new(contig, self.pos, self.ref_base, self.obs)
    }
}
