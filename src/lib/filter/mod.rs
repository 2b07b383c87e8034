//! Quality, read-end, and coverage filtering of pileup records.
//!
//! The same [`SiteFilter`] backs the standalone `filter` subcommand and the
//! encoder's built-in filtering, so the two stages stay composable and
//! behave identically.

use log::info;

use crate::record::PileupRecord;

/// Per-observation and per-site thresholds.
#[derive(Debug, Clone, Copy)]
pub struct SiteFilter {
    /// Minimum decoded quality score; observations below it are dropped.
    pub min_qual: u8,
    /// Minimum post-filter depth; records below it are dropped whole.
    pub min_coverage: u32,
    /// Drop observations at a read's first or last unclipped base.
    pub remove_ends: bool,
}

impl SiteFilter {
    pub fn new(min_qual: u8, min_coverage: u32, remove_ends: bool) -> Self {
        SiteFilter {
            min_qual,
            min_coverage,
            remove_ends,
        }
    }

    /// Rewrite one record in place, dropping failing observations from all
    /// three channels in lock-step (markers travel with their symbol).
    /// Returns `None` when the record falls below the coverage floor.
    ///
    /// Quality filtering runs before end filtering; an observation failing
    /// both is tallied against quality, matching the reference pipeline's
    /// pass order.
    pub fn apply(
        &self,
        mut record: PileupRecord,
        stats: &mut FilterStats,
    ) -> Option<PileupRecord> {
        stats.sites += 1;

        if record.depth() < self.min_coverage {
            stats.sites_low_coverage += 1;
            return None;
        }

        stats.bases += record.obs.len() as u64;
        record.obs.retain(|ob| {
            if ob.qual_score() < self.min_qual {
                stats.bases_low_quality += 1;
                return false;
            }
            if self.remove_ends && ob.is_read_boundary() {
                stats.bases_read_end += 1;
                return false;
            }
            true
        });

        if record.depth() < self.min_coverage {
            stats.sites_low_coverage += 1;
            return None;
        }
        Some(record)
    }
}

/// Counters behind the run-end diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterStats {
    /// Observations examined (in records that reached per-base filtering).
    pub bases: u64,
    pub bases_low_quality: u64,
    pub bases_read_end: u64,
    /// Records examined.
    pub sites: u64,
    /// Records dropped for arriving or falling below the coverage floor.
    pub sites_low_coverage: u64,
}

impl FilterStats {
    pub fn new() -> Self {
        FilterStats::default()
    }

    /// Log the exclusion summary at `info` level (stderr).
    pub fn log_summary(&self) {
        info!(
            "bases excluded for low quality: {} / {} ({})",
            self.bases_low_quality,
            self.bases,
            percent(self.bases_low_quality, self.bases)
        );
        info!(
            "bases excluded at read ends: {} / {} ({})",
            self.bases_read_end,
            self.bases,
            percent(self.bases_read_end, self.bases)
        );
        info!(
            "sites excluded for low coverage: {} / {} ({})",
            self.sites_low_coverage,
            self.sites,
            percent(self.sites_low_coverage, self.sites)
        );
    }
}

/// Render `part` out of `whole` as a percentage, or `n/a` when nothing was
/// counted.
pub fn percent(part: u64, whole: u64) -> String {
    if whole == 0 {
        "n/a".to_string()
    } else {
        format!("{:.2}%", part as f64 * 100.0 / whole as f64)
    }
}
