//! Leaf components of the consensus engine.
//!
//! - [`position`]: per-locus records supplied by the parsing collaborators
//! - [`filter`]: coverage/proportion threshold evaluation with sentinel handling
//! - [`source`]: per-contig position providers and sample grouping
//! - [`synchronizer`]: lock-step traversal of all sources of a contig
//! - [`stats`]: per-analysis, per-sample and base-tally counters

pub mod filter;
pub mod position;
pub mod source;
pub mod stats;
pub mod synchronizer;

pub use filter::{FilterOutcome, FilterValue, ThresholdFilter};
pub use position::{Base, DuplicatesMarker, Position, ReferencePosition};
pub use source::{
    ContigInfo, MemorySource, NoDuplicates, PositionIter, PositionSource, ReferenceContig,
    ReferenceSource, SampleGroup,
};
pub use stats::{AllSampleStats, AnalysisStats, BaseCounts, SampleStats, SummaryStats};
pub use synchronizer::{PositionSynchronizer, SampleLocus, SourceCursor};
