//! General and per-sample statistics tables.

use crate::core::error::{Result, VtmError};
use crate::core::fs::make_parent_dirs;
use crate::core::io::create_table;
use crate::engine::source::SampleGroup;
use crate::engine::stats::{AllSampleStats, AnalysisStats};
use crate::pipeline::analyze::genome::GenomeStats;
use std::path::Path;

/// Write one row per contig followed by the whole-genome total.
pub fn write_general_stats<P: AsRef<Path>>(path: P, stats: &GenomeStats) -> Result<()> {
    make_parent_dirs(path.as_ref())?;
    let mut writer = create_table(path.as_ref(), false, true)?;
    for contig in &stats.contigs {
        writer.serialize(contig)?;
    }
    writer.serialize(stats.whole_genome())?;
    writer.flush()?;
    Ok(())
}

/// Write the folded per-sample counters.
///
/// Rows appear in sample-group order: the summary across all samples, then for
/// each sample its `any`/`all` summary followed by each analysis.
pub fn write_sample_stats<P: AsRef<Path>>(
    path: P,
    sample_groups: &[SampleGroup],
    stats: &AllSampleStats,
) -> Result<()> {
    if stats.samples.len() != sample_groups.len() {
        return Err(VtmError::DimensionMismatch {
            expected: format!("{} samples", sample_groups.len()),
            actual: format!("{} samples", stats.samples.len()),
        });
    }

    make_parent_dirs(path.as_ref())?;
    let mut writer = create_table(path.as_ref(), false, false)?;

    let mut header = vec!["Sample".to_string(), "Analysis".to_string()];
    header.extend(AnalysisStats::KEYS.iter().map(|key| key.to_string()));
    writer.write_record(&header)?;

    let mut write_row = |sample: &str, analysis: &str, counters: &AnalysisStats| -> Result<()> {
        let mut row = vec![sample.to_string(), analysis.to_string()];
        row.extend(counters.values().iter().map(u64::to_string));
        writer.write_record(&row)?;
        Ok(())
    };

    write_row("[All Samples]", "[any]", &stats.summary.any)?;
    write_row("[All Samples]", "[all]", &stats.summary.all)?;
    for (group, sample) in sample_groups.iter().zip(&stats.samples) {
        if group.len() != sample.analyses.len() {
            return Err(VtmError::DimensionMismatch {
                expected: format!("{} analyses for {}", group.len(), group.name()),
                actual: format!("{} analyses", sample.analyses.len()),
            });
        }
        write_row(group.name(), "[any]", &sample.summary.any)?;
        write_row(group.name(), "[all]", &sample.summary.all)?;
        for (source, counters) in group.analyses().iter().zip(&sample.analyses) {
            write_row(group.name(), source.identifier(), counters)?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::source::{MemorySource, PositionSource};
    use crate::pipeline::analyze::contig::ContigStats;
    use tempfile::tempdir;

    #[test]
    fn general_stats_end_with_whole_genome() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("general_stats.tsv");
        let mut chr1 = ContigStats::new("chr1", 10);
        chr1.quality_breadth = 7;
        let mut chr2 = ContigStats::new("chr2", 5);
        chr2.quality_breadth = 2;
        let stats = GenomeStats {
            contigs: vec![chr1, chr2],
            sample_stats: AllSampleStats::default(),
        };

        write_general_stats(&path, &stats).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Contig\treference_length\treference_clean"));
        assert!(lines[3].starts_with("Whole Genome\t15\t"));
        let quality_column = lines[0].split('\t').position(|h| h == "quality_breadth").unwrap();
        assert_eq!(lines[3].split('\t').nth(quality_column), Some("9"));
    }

    #[test]
    fn sample_stats_rows_follow_group_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample_stats.tsv");
        let groups = vec![SampleGroup::new(
            "s1",
            vec![
                Box::new(MemorySource::new("s1::bwa")) as Box<dyn PositionSource>,
                Box::new(MemorySource::new("s1::bowtie")) as Box<dyn PositionSource>,
            ],
        )
        .unwrap()];
        let mut stats = AllSampleStats::zeroed(&[2]);
        stats.samples[0].analyses[1].called_snp = 3;

        write_sample_stats(&path, &groups, &stats).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1].split('\t').next(), Some("[All Samples]"));
        assert!(lines[3].starts_with("s1\t[any]\t"));
        assert_eq!(lines[6], "s1\ts1::bowtie\t0\t0\t0\t0\t0\t3\t0");
    }

    #[test]
    fn sample_stats_shape_must_match_groups() {
        let dir = tempdir().unwrap();
        let groups = vec![SampleGroup::new(
            "s1",
            vec![Box::new(MemorySource::new("s1::bwa")) as Box<dyn PositionSource>],
        )
        .unwrap()];
        let stats = AllSampleStats::zeroed(&[1, 1]);
        assert!(write_sample_stats(dir.path().join("x.tsv"), &groups, &stats).is_err());
    }
}
