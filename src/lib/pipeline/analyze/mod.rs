//! Consensus analysis of synchronized loci.
//!
//! [`GenomeAnalysis`] owns the coverage and proportion thresholds. It analyzes
//! one locus at a time ([`GenomeAnalysis::analyze_position`]), folds a whole
//! contig ([`GenomeAnalysis::analyze_contig`]) while streaming each
//! [`PositionInfo`] to the contig's sinks, and drives every reference contig in
//! turn ([`GenomeAnalysis::analyze_genome`]).

pub mod contig;
pub mod genome;
pub mod locus;
pub mod sink;

pub use contig::ContigStats;
pub use genome::{GenomeAnalysis, GenomeStats};
pub use locus::{PatternToken, PositionInfo};
pub use sink::{NoSinks, PositionSink, SinkFactory};
