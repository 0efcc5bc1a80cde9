//! Interfaces to the parsing collaborators that supply per-contig positions.

use crate::core::error::{Result, VtmError};
use crate::engine::position::Position;
use smartstring::alias::String;

/// An ordered stream of positions for one contig.
pub type PositionIter<'a> = Box<dyn Iterator<Item = Result<Position>> + 'a>;

/// A restartable provider of per-contig positions.
///
/// Every call to [`PositionSource::contig_positions`] starts again at the first
/// coordinate of the contig. Sources lacking the contig return an empty stream.
pub trait PositionSource {
    /// Identifier used in error messages and report headers.
    fn identifier(&self) -> &str;

    /// Positions of `contig` in reference coordinate order.
    fn contig_positions(&self, contig: &str) -> Result<PositionIter<'_>>;
}

/// Name and length of a reference contig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContigInfo {
    pub name: String,
    pub length: usize,
}

/// The reference genome: a position source that also knows its contigs.
pub trait ReferenceSource: PositionSource {
    /// Contigs in processing order.
    fn contigs(&self) -> Vec<ContigInfo>;
}

/// One reference contig ready for analysis.
pub struct ReferenceContig<'a> {
    pub name: String,
    pub length: usize,
    pub positions: PositionIter<'a>,
}

impl<'a> ReferenceContig<'a> {
    pub fn new(name: &str, length: usize, positions: PositionIter<'a>) -> Self {
        ReferenceContig {
            name: String::from(name),
            length,
            positions,
        }
    }

    /// Open `info` from `reference`.
    pub fn open<R: ReferenceSource + ?Sized>(reference: &'a R, info: &ContigInfo) -> Result<Self> {
        Ok(Self::new(
            &info.name,
            info.length,
            reference.contig_positions(&info.name)?,
        ))
    }
}

/// Duplicates source used when no duplicates file is given: nothing is duplicated.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDuplicates;

impl PositionSource for NoDuplicates {
    fn identifier(&self) -> &str {
        "duplicates"
    }

    fn contig_positions(&self, _contig: &str) -> Result<PositionIter<'_>> {
        Ok(Box::new(std::iter::repeat_with(|| Ok(Position::reference('0')))))
    }
}

/// All analyses run on one biological sample, in a fixed order.
pub struct SampleGroup {
    name: String,
    analyses: Vec<Box<dyn PositionSource>>,
}

impl SampleGroup {
    /// A sample must have at least one analysis.
    pub fn new(name: &str, analyses: Vec<Box<dyn PositionSource>>) -> Result<Self> {
        if analyses.is_empty() {
            return Err(VtmError::EmptyGroup(format!(
                "sample {} has no analyses",
                name
            )));
        }
        Ok(SampleGroup {
            name: String::from(name),
            analyses,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn analyses(&self) -> &[Box<dyn PositionSource>] {
        &self.analyses
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

/// In-memory source, mainly for tests and small inputs.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    identifier: String,
    contigs: Vec<(String, Vec<Position>)>,
}

impl MemorySource {
    pub fn new(identifier: &str) -> Self {
        MemorySource {
            identifier: String::from(identifier),
            contigs: Vec::new(),
        }
    }

    /// Append a contig. Contig order is preserved for [`ReferenceSource::contigs`].
    pub fn with_contig(mut self, name: &str, positions: Vec<Position>) -> Self {
        self.contigs.push((String::from(name), positions));
        self
    }

    /// Append a contig built from a string of calls with no depth information.
    pub fn with_calls(self, name: &str, calls: &str) -> Self {
        let positions = calls.chars().map(Position::reference).collect();
        self.with_contig(name, positions)
    }
}

impl PositionSource for MemorySource {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn contig_positions(&self, contig: &str) -> Result<PositionIter<'_>> {
        let positions = self
            .contigs
            .iter()
            .find(|(name, _)| name.as_str() == contig)
            .map(|(_, positions)| positions.as_slice())
            .unwrap_or(&[]);
        Ok(Box::new(positions.iter().copied().map(Ok)))
    }
}

impl ReferenceSource for MemorySource {
    fn contigs(&self) -> Vec<ContigInfo> {
        self.contigs
            .iter()
            .map(|(name, positions)| ContigInfo {
                name: name.clone(),
                length: positions.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_restarts_each_contig() {
        let source = MemorySource::new("ref").with_calls("chr1", "ACG");
        let first: Vec<char> = source
            .contig_positions("chr1")
            .unwrap()
            .map(|p| p.unwrap().call)
            .collect();
        let second: Vec<char> = source
            .contig_positions("chr1")
            .unwrap()
            .map(|p| p.unwrap().call)
            .collect();
        assert_eq!(first, vec!['A', 'C', 'G']);
        assert_eq!(first, second);
        assert_eq!(source.contig_positions("chr2").unwrap().count(), 0);
    }

    #[test]
    fn sample_group_requires_an_analysis() {
        assert!(matches!(
            SampleGroup::new("s1", Vec::new()),
            Err(VtmError::EmptyGroup(_))
        ));
    }

    #[test]
    fn no_duplicates_never_flags() {
        let source = NoDuplicates;
        assert!(source
            .contig_positions("any")
            .unwrap()
            .take(5)
            .all(|p| p.unwrap().call == '0'));
    }
}
