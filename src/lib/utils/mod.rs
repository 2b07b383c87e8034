//! Shared helper re-exports.
//!
//! Commands reach for these through `rnapileup_lib::utils`; the
//! implementations live under `crate::core`.

pub use crate::core::error::is_broken_pipe;
pub use crate::core::fs::{is_bgzipped, is_stdio, make_parent_dirs};
pub use crate::core::io::{get_reader, get_writer};
