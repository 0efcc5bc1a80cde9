//! Flat re-exports of the shared helpers under `crate::core`, used by the
//! command-line tool.

pub use crate::core::errors::is_broken_pipe;
pub use crate::core::fs::{contig_file_name, is_bgzipped, make_parent_dirs};
pub use crate::core::io::{create_table, open_table};
