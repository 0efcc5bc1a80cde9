//! VTM: variant tracking matrix
//!
//! VTM aggregates per-locus genotype calls from many independent sequence
//! analyses (aligner and variant caller combinations, grouped by biological
//! sample) into consensus statistics relative to a reference genome.
//! For every position of every contig it decides whether the position is
//! reliably called, whether the analyses of each sample agree with each other
//! and with the reference, and whether it qualifies as a high-confidence SNP.
//!
//! # Modules
//!
//! The main modules are:
//! - [`core`]: error types and shared filesystem/TSV helpers
//! - [`engine`]: position records, threshold filters, source synchronization and counters
//! - [`pipeline`]: locus and contig analysis, sinks, and file-backed collaborators
//! - [`utils`]: flat re-exports of the `core` helpers
//!
//! # Example
//!
//! ```rust
//! use vtm_lib::engine::{DuplicatesMarker, FilterValue, Position};
//! use vtm_lib::pipeline::analyze::GenomeAnalysis;
//!
//! let analysis = GenomeAnalysis::new(5.0, 0.8).unwrap();
//! let call = Position::new('G', FilterValue::Value(10.0), FilterValue::Value(0.9));
//! let info = analysis
//!     .analyze_position(&Position::reference('A'), DuplicatesMarker(false), &[vec![call]])
//!     .unwrap();
//! assert!(info.is_best_snp);
//! assert_eq!(info.pattern_string(), "12");
//! ```

pub mod core;
pub mod engine;
pub mod pipeline;
pub mod utils;
