//! Lock-step traversal of many per-contig position streams.
//!
//! Synchronization is purely ordinal: the k-th position of every stream is taken
//! to describe the same coordinate. No coordinate alignment happens here, so
//! every source must cover exactly the reference contig in reference order.
//! A stream that ends before the reference length is an input-shape error.

use crate::core::error::{Result, VtmError};
use crate::engine::position::Position;
use crate::engine::source::{PositionIter, SampleGroup};

/// Positions at one locus grouped by sample, mirroring the sample-group nesting.
pub type SampleLocus = Vec<Vec<Position>>;

/// A single stream with an explicit advance and length accounting.
pub struct SourceCursor<'a> {
    identifier: &'a str,
    contig: &'a str,
    expected: usize,
    consumed: usize,
    positions: PositionIter<'a>,
}

impl<'a> SourceCursor<'a> {
    pub fn new(
        identifier: &'a str,
        contig: &'a str,
        expected: usize,
        positions: PositionIter<'a>,
    ) -> Self {
        SourceCursor {
            identifier,
            contig,
            expected,
            consumed: 0,
            positions,
        }
    }

    /// Take the next position, failing if the stream is exhausted.
    #[inline]
    pub fn advance(&mut self) -> Result<Position> {
        match self.positions.next() {
            Some(position) => {
                self.consumed += 1;
                position
            }
            None => Err(VtmError::short_source(
                self.identifier,
                self.contig,
                self.expected,
                self.consumed,
            )),
        }
    }
}

/// Advances every analysis of every sample group together.
///
/// As an iterator it yields at most `length` loci and stops after the first
/// error; use [`PositionSynchronizer::advance`] for an unbounded explicit step.
pub struct PositionSynchronizer<'a> {
    length: usize,
    emitted: usize,
    failed: bool,
    groups: Vec<Vec<SourceCursor<'a>>>,
}

impl<'a> PositionSynchronizer<'a> {
    /// Open `contig` on every analysis of `sample_groups`.
    pub fn new(contig: &'a str, length: usize, sample_groups: &'a [SampleGroup]) -> Result<Self> {
        if sample_groups.is_empty() {
            return Err(VtmError::EmptyGroup("no sample groups given".to_string()));
        }
        let mut groups = Vec::with_capacity(sample_groups.len());
        for group in sample_groups {
            if group.is_empty() {
                return Err(VtmError::EmptyGroup(format!(
                    "sample {} has no analyses",
                    group.name()
                )));
            }
            let mut cursors = Vec::with_capacity(group.len());
            for analysis in group.analyses() {
                cursors.push(SourceCursor::new(
                    analysis.identifier(),
                    contig,
                    length,
                    analysis.contig_positions(contig)?,
                ));
            }
            groups.push(cursors);
        }
        Ok(PositionSynchronizer {
            length,
            emitted: 0,
            failed: false,
            groups,
        })
    }

    /// Take the next position of every stream.
    ///
    /// Nothing is returned for a locus unless every stream produced it.
    pub fn advance(&mut self) -> Result<SampleLocus> {
        let mut locus = Vec::with_capacity(self.groups.len());
        for group in self.groups.iter_mut() {
            let mut positions = Vec::with_capacity(group.len());
            for cursor in group.iter_mut() {
                positions.push(cursor.advance()?);
            }
            locus.push(positions);
        }
        self.emitted += 1;
        Ok(locus)
    }
}

impl Iterator for PositionSynchronizer<'_> {
    type Item = Result<SampleLocus>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.emitted >= self.length {
            return None;
        }
        let locus = self.advance();
        self.failed = locus.is_err();
        Some(locus)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.length.saturating_sub(self.emitted);
        (0, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::source::{MemorySource, PositionSource};

    fn group(name: &str, analyses: &[(&str, &str)]) -> SampleGroup {
        let sources: Vec<Box<dyn PositionSource>> = analyses
            .iter()
            .map(|(id, calls)| {
                Box::new(MemorySource::new(id).with_calls("chr1", calls)) as Box<dyn PositionSource>
            })
            .collect();
        SampleGroup::new(name, sources).unwrap()
    }

    #[test]
    fn yields_kth_position_of_every_leaf() {
        let groups = vec![
            group("s1", &[("s1::a", "ACG"), ("s1::b", "ACT")]),
            group("s2", &[("s2::a", "AGG")]),
        ];
        let loci: Vec<SampleLocus> = PositionSynchronizer::new("chr1", 3, &groups)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();

        assert_eq!(loci.len(), 3);
        let calls = |locus: &SampleLocus| -> Vec<Vec<char>> {
            locus
                .iter()
                .map(|g| g.iter().map(|p| p.call).collect())
                .collect()
        };
        assert_eq!(calls(&loci[1]), vec![vec!['C', 'C'], vec!['G']]);
        assert_eq!(calls(&loci[2]), vec![vec!['G', 'T'], vec!['G']]);
    }

    #[test]
    fn short_stream_is_an_error() {
        let groups = vec![group("s1", &[("s1::a", "ACG"), ("s1::b", "AC")])];
        let results: Vec<Result<SampleLocus>> = PositionSynchronizer::new("chr1", 3, &groups)
            .unwrap()
            .collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        match &results[2] {
            Err(VtmError::ShortSource {
                source_name,
                expected,
                actual,
                ..
            }) => {
                assert_eq!(source_name, "s1::b");
                assert_eq!((*expected, *actual), (3, 2));
            }
            other => panic!("expected short source error, got {:?}", other.as_ref().map(|_| ())),
        }
    }

    #[test]
    fn iteration_stops_after_first_error() {
        let groups = vec![group("s1", &[("s1::a", "A")])];
        let mut sync = PositionSynchronizer::new("chr1", 3, &groups).unwrap();
        assert!(matches!(sync.next(), Some(Ok(_))));
        assert!(matches!(sync.next(), Some(Err(VtmError::ShortSource { .. }))));
        assert!(sync.next().is_none());
        assert_eq!(sync.size_hint(), (0, Some(0)));

        let sync = PositionSynchronizer::new("chr1", 3, &groups).unwrap();
        assert_eq!(sync.take(1000).count(), 2);
    }

    #[test]
    fn missing_contig_fails_on_first_locus() {
        let groups = vec![group("s1", &[("s1::a", "ACG")])];
        let mut sync = PositionSynchronizer::new("chr2", 1, &groups).unwrap();
        assert!(matches!(sync.advance(), Err(VtmError::ShortSource { .. })));
    }

    #[test]
    fn requires_sample_groups() {
        assert!(matches!(
            PositionSynchronizer::new("chr1", 1, &[]),
            Err(VtmError::EmptyGroup(_))
        ));
    }
}
