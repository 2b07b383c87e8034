pub mod error;
pub mod fs;
pub mod io;

pub mod prelude {
    pub use super::error::{is_broken_pipe, PileupError, Result};
    pub use super::fs::{is_bgzipped, is_stdio, make_parent_dirs};
    pub use super::io::{get_reader, get_writer};
}
