//! Whole-contig aggregation of locus results.

use crate::core::error::Result;
use crate::engine::position::DuplicatesMarker;
use crate::engine::source::{PositionSource, ReferenceContig, SampleGroup};
use crate::engine::stats::AllSampleStats;
use crate::engine::synchronizer::{PositionSynchronizer, SourceCursor};
use crate::pipeline::analyze::genome::GenomeAnalysis;
use crate::pipeline::analyze::locus::PositionInfo;
use crate::pipeline::analyze::sink::SinkFactory;
use log::{debug, info};
use serde::Serialize;
use smartstring::{LazyCompact, SmartString};
use std::ops::AddAssign;

/// Running totals across all loci of a contig.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContigStats {
    #[serde(rename = "Contig")]
    pub contig: SmartString<LazyCompact>,
    pub reference_length: u64,
    pub reference_clean: u64,
    pub reference_duplicated: u64,
    pub all_called: u64,
    pub all_passed_coverage: u64,
    pub all_passed_proportion: u64,
    pub all_passed_consensus: u64,
    pub quality_breadth: u64,
    pub any_snps: u64,
    pub best_snps: u64,
}

impl ContigStats {
    pub fn new(contig: &str, reference_length: u64) -> Self {
        ContigStats {
            contig: SmartString::from(contig),
            reference_length,
            ..Default::default()
        }
    }

    /// Fold one locus into the totals.
    #[inline]
    pub fn record(&mut self, info: &PositionInfo) {
        self.reference_clean += info.is_reference_clean as u64;
        self.reference_duplicated += info.is_reference_duplicated as u64;
        self.all_called += info.is_all_called as u64;
        self.all_passed_coverage += info.is_all_passed_coverage as u64;
        self.all_passed_proportion += info.is_all_passed_proportion as u64;
        self.all_passed_consensus += info.is_all_passed_consensus as u64;
        self.quality_breadth += info.is_all_quality_breadth as u64;
        self.any_snps += (info.called_snp > 0) as u64;
        self.best_snps += info.is_best_snp as u64;
    }
}

/// Counts are summed; the contig name of the left side is kept.
impl AddAssign<&ContigStats> for ContigStats {
    fn add_assign(&mut self, other: &ContigStats) {
        self.reference_length += other.reference_length;
        self.reference_clean += other.reference_clean;
        self.reference_duplicated += other.reference_duplicated;
        self.all_called += other.all_called;
        self.all_passed_coverage += other.all_passed_coverage;
        self.all_passed_proportion += other.all_passed_proportion;
        self.all_passed_consensus += other.all_passed_consensus;
        self.quality_breadth += other.quality_breadth;
        self.any_snps += other.any_snps;
        self.best_snps += other.best_snps;
    }
}

impl GenomeAnalysis {
    /// Analyze every locus of one reference contig.
    ///
    /// The reference, the duplicates source and every analysis are read in
    /// lock-step for exactly `reference.length` loci. Each [`PositionInfo`] is
    /// folded into the contig totals and then forwarded to every sink produced
    /// by `sink_factory` for this contig, in registration order.
    ///
    /// # Returns
    ///
    /// The per-sample counters summed over the contig, and the contig totals.
    ///
    /// # Errors
    ///
    /// Any source shorter than the reference contig, an empty sample nesting, or a sink failure.
    pub fn analyze_contig<F>(
        &self,
        sink_factory: &mut F,
        sample_groups: &[SampleGroup],
        duplicates: &dyn PositionSource,
        reference: ReferenceContig<'_>,
    ) -> Result<(AllSampleStats, ContigStats)>
    where
        F: SinkFactory + ?Sized,
    {
        let ReferenceContig {
            name,
            length,
            positions,
        } = reference;
        info!("Analyzing contig {} ({} positions)", name, length);

        let mut sinks = sink_factory.open(&name)?;
        for sink in sinks.iter_mut() {
            sink.prime()?;
        }
        debug!("Primed {} sinks for contig {}", sinks.len(), name);

        let mut reference_cursor = SourceCursor::new("reference", &name, length, positions);
        let mut duplicates_cursor = SourceCursor::new(
            duplicates.identifier(),
            &name,
            length,
            duplicates.contig_positions(&name)?,
        );
        let mut synchronizer = PositionSynchronizer::new(&name, length, sample_groups)?;

        let mut contig_stats = ContigStats::new(&name, length as u64);
        let mut sample_stats: Option<AllSampleStats> = None;

        for _ in 0..length {
            let reference_position = reference_cursor.advance()?;
            let marker = DuplicatesMarker::from(&duplicates_cursor.advance()?);
            let samples = synchronizer.advance()?;
            let position = self.analyze_position(&reference_position, marker, &samples)?;

            contig_stats.record(&position);

            // The first locus seeds the running totals.
            match sample_stats.as_mut() {
                None => sample_stats = Some(position.all_sample_stats.clone()),
                Some(totals) => totals.merge(&position.all_sample_stats)?,
            }

            for sink in sinks.iter_mut() {
                sink.accept(&position)?;
            }
        }

        for sink in sinks.iter_mut() {
            sink.close()?;
        }
        debug!("Closed {} sinks for contig {}", sinks.len(), name);

        info!(
            "Contig {} complete: {} quality breadth, {} best SNPs",
            name, contig_stats.quality_breadth, contig_stats.best_snps
        );

        let sample_stats = sample_stats.unwrap_or_else(|| {
            let shape: Vec<usize> = sample_groups.iter().map(SampleGroup::len).collect();
            AllSampleStats::zeroed(&shape)
        });
        Ok((sample_stats, contig_stats))
    }
}
