//! Counters shared by the locus analyzer and the contig aggregator.
//!
//! At a single locus every [`AnalysisStats`] field is 0 or 1. Folding loci
//! together sums the fields elementwise, so after a contig each field counts
//! the loci where the flag held. [`SummaryStats`] keeps the "any"/"all"
//! tripwires for a group of analyses: "any" starts cleared and is set by the
//! first analysis with the flag; "all" starts set and is cleared by the first
//! analysis without it.

use crate::core::error::{Result, VtmError};
use crate::engine::position::Base;
use serde::Serialize;
use std::ops::AddAssign;

/// Per-analysis counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub was_called: u64,
    pub passed_coverage_filter: u64,
    pub passed_proportion_filter: u64,
    pub quality_breadth: u64,
    pub called_reference: u64,
    pub called_snp: u64,
    pub called_degen: u64,
}

impl AnalysisStats {
    /// Counter names in column order.
    pub const KEYS: [&'static str; 7] = [
        "was_called",
        "passed_coverage_filter",
        "passed_proportion_filter",
        "quality_breadth",
        "called_reference",
        "called_snp",
        "called_degen",
    ];

    /// Every flag set; the starting point of an "all" tripwire.
    pub fn all_set() -> Self {
        AnalysisStats {
            was_called: 1,
            passed_coverage_filter: 1,
            passed_proportion_filter: 1,
            quality_breadth: 1,
            called_reference: 1,
            called_snp: 1,
            called_degen: 1,
        }
    }

    /// Counter values in [`AnalysisStats::KEYS`] order.
    pub fn values(&self) -> [u64; 7] {
        [
            self.was_called,
            self.passed_coverage_filter,
            self.passed_proportion_filter,
            self.quality_breadth,
            self.called_reference,
            self.called_snp,
            self.called_degen,
        ]
    }

    fn values_mut(&mut self) -> [&mut u64; 7] {
        [
            &mut self.was_called,
            &mut self.passed_coverage_filter,
            &mut self.passed_proportion_filter,
            &mut self.quality_breadth,
            &mut self.called_reference,
            &mut self.called_snp,
            &mut self.called_degen,
        ]
    }
}

impl AddAssign<&AnalysisStats> for AnalysisStats {
    fn add_assign(&mut self, other: &AnalysisStats) {
        for (sum, value) in self.values_mut().into_iter().zip(other.values()) {
            *sum += value;
        }
    }
}

/// "any"/"all" summary over a group of analyses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryStats {
    pub any: AnalysisStats,
    pub all: AnalysisStats,
}

impl SummaryStats {
    /// A fresh tripwire: nothing seen for "any", everything assumed for "all".
    pub fn tripwire() -> Self {
        SummaryStats {
            any: AnalysisStats::default(),
            all: AnalysisStats::all_set(),
        }
    }

    /// Trip the flags according to one analysis at one locus.
    pub fn record(&mut self, analysis: &AnalysisStats) {
        let any = self.any.values_mut();
        let all = self.all.values_mut();
        for ((any, all), value) in any.into_iter().zip(all).zip(analysis.values()) {
            if value > 0 {
                *any = 1;
            } else {
                *all = 0;
            }
        }
    }
}

impl AddAssign<&SummaryStats> for SummaryStats {
    fn add_assign(&mut self, other: &SummaryStats) {
        self.any += &other.any;
        self.all += &other.all;
    }
}

/// Counters for one sample: its summary plus one entry per analysis in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleStats {
    pub summary: SummaryStats,
    pub analyses: Vec<AnalysisStats>,
}

impl SampleStats {
    /// Zeroed counters for a sample with `analyses` analyses.
    pub fn zeroed(analyses: usize) -> Self {
        SampleStats {
            summary: SummaryStats::default(),
            analyses: vec![AnalysisStats::default(); analyses],
        }
    }
}

/// Counters for every sample at a locus (or summed over loci), preceded by the
/// summary across all analyses of all samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllSampleStats {
    pub summary: SummaryStats,
    pub samples: Vec<SampleStats>,
}

impl AllSampleStats {
    /// Zeroed counters mirroring `shape`, the analysis count of each sample.
    pub fn zeroed(shape: &[usize]) -> Self {
        AllSampleStats {
            summary: SummaryStats::default(),
            samples: shape.iter().map(|&n| SampleStats::zeroed(n)).collect(),
        }
    }

    /// Analysis count of each sample, in order.
    pub fn shape(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.analyses.len()).collect()
    }

    /// Add `other` elementwise, preserving sample and analysis order.
    ///
    /// Both sides must describe the same samples with the same analysis counts.
    pub fn merge(&mut self, other: &AllSampleStats) -> Result<()> {
        let (expected, actual) = (self.shape(), other.shape());
        if expected != actual {
            return Err(VtmError::DimensionMismatch {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", actual),
            });
        }
        self.summary += &other.summary;
        for (sum, sample) in self.samples.iter_mut().zip(&other.samples) {
            sum.summary += &sample.summary;
            for (sum, analysis) in sum.analyses.iter_mut().zip(&sample.analyses) {
                *sum += analysis;
            }
        }
        Ok(())
    }
}

/// Tally of simple calls at a locus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BaseCounts {
    pub a: u32,
    pub c: u32,
    pub g: u32,
    pub t: u32,
    pub n: u32,
}

impl BaseCounts {
    #[inline]
    pub fn record(&mut self, base: Base) {
        match base {
            Base::A => self.a += 1,
            Base::C => self.c += 1,
            Base::G => self.g += 1,
            Base::T => self.t += 1,
            Base::N => self.n += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stats_from(values: [u64; 7]) -> AnalysisStats {
        let mut stats = AnalysisStats::default();
        for (slot, value) in stats.values_mut().into_iter().zip(values) {
            *slot = value;
        }
        stats
    }

    #[test]
    fn tripwire_flips_once() {
        let mut summary = SummaryStats::tripwire();
        let mut called = AnalysisStats::default();
        called.was_called = 1;
        summary.record(&called);
        summary.record(&AnalysisStats::default());
        summary.record(&called);

        assert_eq!(summary.any.was_called, 1);
        assert_eq!(summary.all.was_called, 0);
        assert_eq!(summary.any.called_snp, 0);
        assert_eq!(summary.all.called_snp, 0);
    }

    #[test]
    fn all_survives_when_every_analysis_agrees() {
        let mut summary = SummaryStats::tripwire();
        summary.record(&AnalysisStats::all_set());
        summary.record(&AnalysisStats::all_set());
        assert_eq!(summary.all, AnalysisStats::all_set());
        assert_eq!(summary.any, AnalysisStats::all_set());
    }

    #[test]
    fn merge_rejects_different_shapes() {
        let mut left = AllSampleStats::zeroed(&[2, 1]);
        let right = AllSampleStats::zeroed(&[1, 2]);
        assert!(matches!(
            left.merge(&right),
            Err(VtmError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn base_counts_tally_simple_calls() {
        let mut counts = BaseCounts::default();
        for base in [Base::A, Base::A, Base::T, Base::N] {
            counts.record(base);
        }
        assert_eq!((counts.a, counts.t, counts.n, counts.c), (2, 1, 1, 0));
    }

    fn arb_locus(shape: Vec<usize>) -> impl Strategy<Value = AllSampleStats> {
        let total: usize = shape.iter().sum::<usize>() + 1;
        prop::collection::vec(prop::array::uniform7(0u64..2), total * 3).prop_map(move |flags| {
            let mut flags = flags.into_iter().map(stats_from);
            let mut next = || flags.next().unwrap_or_default();
            let summary = SummaryStats { any: next(), all: next() };
            let samples = shape
                .iter()
                .map(|&n| SampleStats {
                    summary: SummaryStats { any: next(), all: next() },
                    analyses: (0..n).map(|_| next()).collect(),
                })
                .collect();
            AllSampleStats { summary, samples }
        })
    }

    fn arb_loci() -> impl Strategy<Value = Vec<AllSampleStats>> {
        prop::collection::vec(1usize..4, 1..4).prop_flat_map(|shape| {
            prop::collection::vec(arb_locus(shape), 3)
        })
    }

    proptest! {
        #[test]
        fn fold_is_associative(loci in arb_loci()) {
            let mut sequential = loci[0].clone();
            sequential.merge(&loci[1]).unwrap();
            sequential.merge(&loci[2]).unwrap();

            let mut tail = loci[1].clone();
            tail.merge(&loci[2]).unwrap();
            let mut grouped = loci[0].clone();
            grouped.merge(&tail).unwrap();

            prop_assert_eq!(sequential, grouped);
        }
    }
}
