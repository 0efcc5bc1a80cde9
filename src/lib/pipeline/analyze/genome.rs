//! Genome-wide driver holding the filter thresholds.

use crate::core::error::Result;
use crate::engine::filter::ThresholdFilter;
use crate::engine::source::{PositionSource, ReferenceContig, ReferenceSource, SampleGroup};
use crate::engine::stats::AllSampleStats;
use crate::pipeline::analyze::contig::ContigStats;
use crate::pipeline::analyze::sink::SinkFactory;
use log::{debug, info, warn};

/// Collects statistics across a collection of sample analyses relative to a reference.
///
/// The two thresholds are fixed for the lifetime of the instance.
#[derive(Debug, Clone)]
pub struct GenomeAnalysis {
    coverage_filter: ThresholdFilter,
    proportion_filter: ThresholdFilter,
}

/// Results of [`GenomeAnalysis::analyze_genome`].
#[derive(Debug, Clone, Default)]
pub struct GenomeStats {
    /// One entry per reference contig, in processing order.
    pub contigs: Vec<ContigStats>,
    /// Per-sample counters summed over every contig.
    pub sample_stats: AllSampleStats,
}

impl GenomeStats {
    /// Sum of every contig's statistics.
    pub fn whole_genome(&self) -> ContigStats {
        let mut total = ContigStats::new("Whole Genome", 0);
        for contig in &self.contigs {
            total += contig;
        }
        total
    }
}

impl GenomeAnalysis {
    /// # Arguments
    ///
    /// * `coverage_threshold` - minimum depth for an analysis call to be significant
    /// * `proportion_threshold` - minimum fraction of reads supporting the call
    ///
    /// # Errors
    ///
    /// Both thresholds must be finite and positive.
    pub fn new(coverage_threshold: f64, proportion_threshold: f64) -> Result<Self> {
        let coverage_filter = ThresholdFilter::new("coverage_threshold", coverage_threshold)?;
        let proportion_filter = ThresholdFilter::new("proportion_threshold", proportion_threshold)?;
        if proportion_threshold > 1.0 {
            warn!(
                "proportion_threshold {} exceeds 1.0; only not-applicable proportions will pass",
                proportion_threshold
            );
        }
        let analysis = GenomeAnalysis {
            coverage_filter,
            proportion_filter,
        };
        debug!(
            "Filters: coverage >= {}, proportion >= {}",
            analysis.coverage_filter.threshold(),
            analysis.proportion_filter.threshold()
        );
        Ok(analysis)
    }

    #[inline]
    pub fn coverage_filter(&self) -> &ThresholdFilter {
        &self.coverage_filter
    }

    #[inline]
    pub fn proportion_filter(&self) -> &ThresholdFilter {
        &self.proportion_filter
    }

    /// Analyze every reference contig in order, one contig at a time.
    ///
    /// Per-sample counters are folded across contigs in sample/analysis order.
    pub fn analyze_genome<F, R>(
        &self,
        sink_factory: &mut F,
        sample_groups: &[SampleGroup],
        duplicates: &dyn PositionSource,
        reference: &R,
    ) -> Result<GenomeStats>
    where
        F: SinkFactory + ?Sized,
        R: ReferenceSource + ?Sized,
    {
        let shape: Vec<usize> = sample_groups.iter().map(SampleGroup::len).collect();
        let mut stats = GenomeStats {
            contigs: Vec::new(),
            sample_stats: AllSampleStats::zeroed(&shape),
        };

        let contigs = reference.contigs();
        info!(
            "Analyzing {} contigs across {} samples ({} analyses)",
            contigs.len(),
            sample_groups.len(),
            shape.iter().sum::<usize>()
        );

        for contig in &contigs {
            let reference_contig = ReferenceContig::open(reference, contig)?;
            let (sample_stats, contig_stats) =
                self.analyze_contig(sink_factory, sample_groups, duplicates, reference_contig)?;
            stats.sample_stats.merge(&sample_stats)?;
            stats.contigs.push(contig_stats);
        }

        let total = stats.whole_genome();
        info!(
            "Genome complete: {} positions, {} quality breadth, {} best SNPs",
            total.reference_length, total.quality_breadth, total.best_snps
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::VtmError;
    use crate::engine::filter::FilterValue;
    use crate::engine::position::Position;
    use crate::engine::source::{MemorySource, NoDuplicates};
    use crate::pipeline::analyze::sink::NoSinks;

    fn called(calls: &str) -> Vec<Position> {
        calls
            .chars()
            .map(|c| Position::new(c, FilterValue::Value(20.0), FilterValue::Value(1.0)))
            .collect()
    }

    #[test]
    fn rejects_non_positive_thresholds() {
        assert!(matches!(
            GenomeAnalysis::new(0.0, 0.9),
            Err(VtmError::ThresholdValidation { .. })
        ));
        assert!(GenomeAnalysis::new(10.0, -0.1).is_err());
        let analysis = GenomeAnalysis::new(10.0, 0.9).unwrap();
        assert_eq!(analysis.coverage_filter().threshold(), 10.0);
        assert_eq!(analysis.proportion_filter().threshold(), 0.9);
    }

    #[test]
    fn folds_sample_stats_across_contigs() {
        let reference = MemorySource::new("reference")
            .with_calls("chr1", "ACGT")
            .with_calls("chr2", "GG");
        let sample = MemorySource::new("s1::bwa")
            .with_contig("chr1", called("ACGA"))
            .with_contig("chr2", called("GC"));
        let groups = vec![SampleGroup::new("s1", vec![Box::new(sample) as Box<dyn PositionSource>]).unwrap()];

        let analysis = GenomeAnalysis::new(10.0, 0.9).unwrap();
        let stats = analysis
            .analyze_genome(&mut NoSinks, &groups, &NoDuplicates, &reference)
            .unwrap();

        assert_eq!(stats.contigs.len(), 2);
        assert_eq!(stats.contigs[0].contig.as_str(), "chr1");
        assert_eq!(stats.contigs[0].best_snps, 1);
        assert_eq!(stats.contigs[1].best_snps, 1);

        let analysis_stats = &stats.sample_stats.samples[0].analyses[0];
        assert_eq!(analysis_stats.was_called, 6);
        assert_eq!(analysis_stats.called_reference, 4);
        assert_eq!(analysis_stats.called_snp, 2);
        assert_eq!(stats.sample_stats.summary.any.called_snp, 2);

        let total = stats.whole_genome();
        assert_eq!(total.reference_length, 6);
        assert_eq!(total.any_snps, 2);
        assert_eq!(total.quality_breadth, 6);
    }

    #[test]
    fn short_analysis_aborts_the_genome() {
        let reference = MemorySource::new("reference").with_calls("chr1", "ACGT");
        let sample = MemorySource::new("s1::bwa").with_contig("chr1", called("AC"));
        let groups = vec![SampleGroup::new("s1", vec![Box::new(sample) as Box<dyn PositionSource>]).unwrap()];

        let err = GenomeAnalysis::new(10.0, 0.9)
            .unwrap()
            .analyze_genome(&mut NoSinks, &groups, &NoDuplicates, &reference)
            .unwrap_err();
        assert!(err.is_input_shape());
    }
}
