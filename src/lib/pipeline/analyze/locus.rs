//! Analysis of a single locus across all samples and analyses.

use crate::core::error::{Result, VtmError};
use crate::engine::position::{Base, DuplicatesMarker, Position, ReferencePosition};
use crate::engine::stats::{AllSampleStats, AnalysisStats, BaseCounts, SampleStats, SummaryStats};
use crate::pipeline::analyze::genome::GenomeAnalysis;
use smallvec::SmallVec;
use std::fmt;

/// One pattern entry: identical alleles at a locus share a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternToken {
    /// 1-based allele number in first-seen order.
    Allele(u8),
    /// Uncalled, degenerate or filtered out.
    N,
}

impl fmt::Display for PatternToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternToken::Allele(n) => write!(f, "{}", n),
            PatternToken::N => write!(f, "N"),
        }
    }
}

/// Allele numbering for one locus, in insertion order.
#[derive(Debug, Default)]
struct PatternLegend {
    alleles: SmallVec<[Base; 4]>,
}

impl PatternLegend {
    fn token(&mut self, base: Base) -> PatternToken {
        let index = match self.alleles.iter().position(|&seen| seen == base) {
            Some(index) => index,
            None => {
                self.alleles.push(base);
                self.alleles.len() - 1
            }
        };
        // At most four distinct simple calls receive a number.
        PatternToken::Allele(index as u8 + 1)
    }
}

/// Everything collected for a single locus across all analyses.
///
/// Per-analysis sequences (`call_str` after its first entry, the filter strings
/// and `pattern` after its first entry) follow the sample-group order and,
/// within a group, the analysis order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionInfo {
    /// Every analysis made a call (not `X` or `N`).
    pub is_all_called: bool,
    /// The reference call is A/C/G/T.
    pub is_reference_clean: bool,
    /// The reference coordinate lies in a duplicated region.
    pub is_reference_duplicated: bool,
    pub is_all_passed_coverage: bool,
    pub is_all_passed_proportion: bool,
    /// Analyses of every sample agree with each other.
    pub is_all_passed_consensus: bool,
    /// The strictest pass condition: all of the above plus clean per-analysis calls.
    pub is_all_quality_breadth: bool,
    /// Quality breadth and at least one SNP call.
    pub is_best_snp: bool,

    pub all_sample_stats: AllSampleStats,

    /// At least one analysis has a quality SNP call in a non-duplicated region.
    pub is_missing_matrix: bool,

    pub called_reference: u32,
    pub called_snp: u32,
    pub called_degen: u32,
    pub was_called: u32,
    pub passed_coverage_filter: u32,
    pub passed_proportion_filter: u32,
    pub base_counts: BaseCounts,

    /// Reference call followed by each analysis call.
    pub call_str: Vec<char>,
    /// As `call_str`, with called but filtered-out analyses replaced by `N`.
    pub masked_call_str: Vec<char>,
    /// `Y`/`N` per analysis.
    pub call_was_made: String,
    /// Coverage filter symbol per analysis: `Y`, `N`, `-` or `?`.
    pub passed_depth_filter: String,
    /// Proportion filter symbol per analysis: `Y`, `N`, `-` or `?`.
    pub passed_proportion_filter_str: String,
    /// Reference token followed by one token per analysis.
    pub pattern: Vec<PatternToken>,
}

impl PositionInfo {
    /// Number of analyses contributing to this locus.
    pub fn analysis_count(&self) -> usize {
        self.call_str.len().saturating_sub(1)
    }

    /// The pattern rendered as one string, e.g. `"12N1"`.
    pub fn pattern_string(&self) -> String {
        self.pattern.iter().map(|token| token.to_string()).collect()
    }
}

impl GenomeAnalysis {
    /// Compare all analyses at a single locus.
    ///
    /// # Arguments
    ///
    /// * `reference` - the reference genome's position
    /// * `duplicates` - whether the reference coordinate is in a duplicated region
    /// * `samples` - one position per analysis, grouped by sample
    ///
    /// # Errors
    ///
    /// Fails only when there are no sample groups or a group has no analyses.
    pub fn analyze_position(
        &self,
        reference: &ReferencePosition,
        duplicates: DuplicatesMarker,
        samples: &[Vec<Position>],
    ) -> Result<PositionInfo> {
        if samples.is_empty() {
            return Err(VtmError::EmptyGroup("no sample groups at locus".to_string()));
        }

        let is_reference_clean = !reference.simple_call.is_n();
        let is_reference_duplicated = duplicates.is_duplicated();
        let mut is_all_called = true;
        let mut is_all_passed_coverage = true;
        let mut is_all_passed_proportion = true;
        // Analyses of the same sample must match; different samples may differ.
        let mut is_all_sample_consensus = true;
        let mut is_all_quality_breadth = true;
        let mut is_missing_matrix = false;

        let analysis_count: usize = samples.iter().map(Vec::len).sum();

        let mut called_reference = 0;
        let mut called_snp = 0;
        let mut called_degen = 0;
        let mut was_called = 0;
        let mut passed_coverage_filter = 0;
        let mut passed_proportion_filter = 0;
        let mut base_counts = BaseCounts::default();

        let mut call_str = Vec::with_capacity(analysis_count + 1);
        let mut masked_call_str = Vec::with_capacity(analysis_count + 1);
        let mut call_was_made = String::with_capacity(analysis_count);
        let mut passed_depth_filter = String::with_capacity(analysis_count);
        let mut passed_proportion_filter_str = String::with_capacity(analysis_count);
        let mut pattern = Vec::with_capacity(analysis_count + 1);

        let mut legend = PatternLegend::default();
        pattern.push(if is_reference_clean {
            legend.token(reference.simple_call)
        } else {
            PatternToken::N
        });
        call_str.push(reference.call);
        masked_call_str.push(reference.call);

        let mut all_sample_stats = AllSampleStats {
            summary: SummaryStats::tripwire(),
            samples: Vec::with_capacity(samples.len()),
        };

        for (sample_index, sample) in samples.iter().enumerate() {
            if sample.is_empty() {
                return Err(VtmError::EmptyGroup(format!(
                    "sample group {} has no analyses at locus",
                    sample_index
                )));
            }

            let mut sample_stats = SampleStats {
                summary: SummaryStats::tripwire(),
                analyses: Vec::with_capacity(sample.len()),
            };
            // The first analysis of the sample is the call the others must match.
            let mut consensus_call: Option<Base> = None;

            for analysis in sample {
                let mut analysis_stats = AnalysisStats::default();

                call_str.push(analysis.call);

                let coverage = self.coverage_filter().evaluate(analysis.coverage);
                passed_depth_filter.push(coverage.symbol);
                if coverage.passed {
                    analysis_stats.passed_coverage_filter = 1;
                    passed_coverage_filter += 1;
                } else {
                    is_all_passed_coverage = false;
                    is_all_quality_breadth = false;
                }

                let proportion = self.proportion_filter().evaluate(analysis.proportion);
                passed_proportion_filter_str.push(proportion.symbol);
                if proportion.passed {
                    analysis_stats.passed_proportion_filter = 1;
                    passed_proportion_filter += 1;
                } else {
                    is_all_passed_proportion = false;
                    is_all_quality_breadth = false;
                }
                let is_pass_filters = coverage.passed && proportion.passed;

                match consensus_call {
                    None => consensus_call = Some(analysis.simple_call),
                    Some(first) if first != analysis.simple_call => {
                        is_all_sample_consensus = false;
                        is_all_quality_breadth = false;
                    }
                    Some(_) => {}
                }

                let is_called = analysis.is_called();
                if is_called {
                    analysis_stats.was_called = 1;
                    was_called += 1;
                    call_was_made.push('Y');
                } else {
                    call_was_made.push('N');
                    is_all_called = false;
                    is_all_quality_breadth = false;
                }

                // No-calls are never masked.
                if !is_called || is_pass_filters {
                    masked_call_str.push(analysis.call);
                } else {
                    masked_call_str.push('N');
                    is_all_sample_consensus = false;
                    is_all_quality_breadth = false;
                }

                if analysis.simple_call.is_n() {
                    is_all_sample_consensus = false;
                    is_all_quality_breadth = false;
                }

                pattern.push(if !analysis.simple_call.is_n() && is_pass_filters {
                    legend.token(analysis.simple_call)
                } else {
                    PatternToken::N
                });

                base_counts.record(analysis.simple_call);

                if is_called && is_pass_filters && is_reference_clean {
                    analysis_stats.quality_breadth = 1;
                    if analysis.simple_call.is_n() {
                        called_degen += 1;
                        analysis_stats.called_degen = 1;
                    } else if analysis.call == reference.call {
                        called_reference += 1;
                        analysis_stats.called_reference = 1;
                    } else if !is_reference_duplicated {
                        called_snp += 1;
                        analysis_stats.called_snp = 1;
                        is_missing_matrix = true;
                    }

                    // Duplicated loci still count toward the matrices but never
                    // toward per-analysis quality statistics.
                    if is_reference_duplicated {
                        analysis_stats.quality_breadth = 0;
                        analysis_stats.called_degen = 0;
                        analysis_stats.called_reference = 0;
                        is_all_quality_breadth = false;
                    }
                } else {
                    is_all_quality_breadth = false;
                }

                sample_stats.summary.record(&analysis_stats);
                all_sample_stats.summary.record(&analysis_stats);
                sample_stats.analyses.push(analysis_stats);
            }

            all_sample_stats.samples.push(sample_stats);
        }

        Ok(PositionInfo {
            is_all_called,
            is_reference_clean,
            is_reference_duplicated,
            is_all_passed_coverage,
            is_all_passed_proportion,
            is_all_passed_consensus: is_all_sample_consensus,
            is_all_quality_breadth,
            is_best_snp: is_all_quality_breadth && called_snp > 0,
            all_sample_stats,
            is_missing_matrix,
            called_reference,
            called_snp,
            called_degen,
            was_called,
            passed_coverage_filter,
            passed_proportion_filter,
            base_counts,
            call_str,
            masked_call_str,
            call_was_made,
            passed_depth_filter,
            passed_proportion_filter_str,
            pattern,
        })
    }
}
