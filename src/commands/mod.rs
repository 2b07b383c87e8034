pub mod filter;
pub mod mismatch;
pub mod pileup;

pub use filter::{run_filter, FilterArgs};
pub use mismatch::{run_mismatch, MismatchArgs};
pub use pileup::{run_pileup, PileupArgs};
