//! The bounded sliding window of pending pileup sites.
//!
//! Sites are kept in a deque ordered by strictly increasing position and,
//! because reads are walked base by base from their leftmost position, the
//! positions they hold are always contiguous. Lookup is therefore an index
//! computation from the front, never an iterator scan.

use std::collections::VecDeque;

use crate::core::error::{PileupError, Result};

use super::site::PileupSite;

#[derive(Debug, Default)]
pub struct SiteWindow {
    sites: VecDeque<PileupSite>,
}

impl SiteWindow {
    pub fn new() -> Self {
        SiteWindow {
            sites: VecDeque::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Fetch the site at `pos`, appending a fresh one when the window has not
    /// reached that position yet.
    ///
    /// A `pos` before the window front can only mean the read stream is not
    /// position-sorted; that is a fatal desync, not a recoverable state.
    pub fn get_or_create(&mut self, pos: i64) -> Result<&mut PileupSite> {
        let front_pos = match self.sites.front() {
            Some(front) => front.pos,
            None => {
                self.sites.push_back(PileupSite::new(pos));
                return Ok(self.sites.back_mut().expect("site just appended"));
            }
        };

        if pos < front_pos {
            return Err(PileupError::PositionDesync {
                read_pos: pos,
                window_pos: front_pos,
            });
        }

        let idx = (pos - front_pos) as usize;
        if idx == self.sites.len() {
            self.sites.push_back(PileupSite::new(pos));
        } else if idx > self.sites.len() {
            return Err(PileupError::PositionDesync {
                read_pos: pos,
                window_pos: front_pos + self.sites.len() as i64,
            });
        }

        let site = &mut self.sites[idx];
        if site.pos != pos {
            return Err(PileupError::PositionDesync {
                read_pos: pos,
                window_pos: site.pos,
            });
        }
        Ok(site)
    }

    /// Pop sites from the front while `pred` holds, in increasing position
    /// order.
    pub fn pop_front_while<F>(&mut self, mut pred: F) -> Vec<PileupSite>
    where
        F: FnMut(&PileupSite) -> bool,
    {
        let mut popped = Vec::new();
        while let Some(front) = self.sites.front() {
            if !pred(front) {
                break;
            }
            popped.push(self.sites.pop_front().expect("front checked above"));
        }
        popped
    }

    /// Drain every pending site, front to back.
    pub fn drain_all(&mut self) -> Vec<PileupSite> {
        self.sites.drain(..).collect()
    }
}
