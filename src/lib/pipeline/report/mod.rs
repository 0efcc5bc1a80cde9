//! File-backed collaborators for the command-line tool.
//!
//! - [`positions`]: tab-delimited position tables as position sources
//! - [`matrix`]: per-contig matrix sinks
//! - [`stats`]: general and sample statistics tables

pub mod matrix;
pub mod positions;
pub mod stats;

pub use matrix::{MatrixKind, MatrixSink, MatrixSinkFactory};
pub use positions::TsvPositionTable;
pub use stats::{write_general_stats, write_sample_stats};
