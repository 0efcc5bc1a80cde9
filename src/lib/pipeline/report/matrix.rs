//! Per-contig matrix files written as loci stream through the analyzer.

use crate::core::error::{Result, VtmError};
use crate::core::fs::{contig_file_name, make_parent_dirs};
use crate::core::io::create_table;
use crate::pipeline::analyze::locus::PositionInfo;
use crate::pipeline::analyze::sink::{PositionSink, SinkFactory};
use log::debug;
use rustc_hash::FxHashMap;
use std::io::Write;
use std::path::PathBuf;

/// Which loci a matrix keeps and which call string it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    /// Every locus with the raw calls.
    Master,
    /// Loci with a quality SNP call, with filtered calls masked.
    MissingData,
    /// Best-SNP loci only.
    BestSnp,
}

impl MatrixKind {
    pub fn label(self) -> &'static str {
        match self {
            MatrixKind::Master => "master",
            MatrixKind::MissingData => "missingdata",
            MatrixKind::BestSnp => "bestsnp",
        }
    }

    fn selects(self, info: &PositionInfo) -> bool {
        match self {
            MatrixKind::Master => true,
            MatrixKind::MissingData => info.is_missing_matrix,
            MatrixKind::BestSnp => info.is_best_snp,
        }
    }

    fn calls(self, info: &PositionInfo) -> &[char] {
        match self {
            MatrixKind::MissingData => &info.masked_call_str,
            MatrixKind::Master | MatrixKind::BestSnp => &info.call_str,
        }
    }
}

/// Writes one matrix file for one contig.
pub struct MatrixSink {
    kind: MatrixKind,
    contig: String,
    path: PathBuf,
    compress: bool,
    analyses: Vec<String>,
    writer: Option<csv::Writer<Box<dyn Write>>>,
    locus: usize,
    written: usize,
}

impl MatrixSink {
    pub fn new(
        kind: MatrixKind,
        contig: &str,
        path: PathBuf,
        compress: bool,
        analyses: Vec<String>,
    ) -> Self {
        MatrixSink {
            kind,
            contig: contig.to_string(),
            path,
            compress,
            analyses,
            writer: None,
            locus: 0,
            written: 0,
        }
    }

    fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.analyses.len() + 12);
        header.push("LocusID".to_string());
        header.push("Reference".to_string());
        header.extend(self.analyses.iter().cloned());
        for column in [
            "#SNPcall",
            "#A",
            "#C",
            "#G",
            "#T",
            "#N",
            "CallWasMade",
            "PassedDepthFilter",
            "PassedProportionFilter",
            "Pattern",
        ] {
            header.push(column.to_string());
        }
        header
    }

    fn row(&self, info: &PositionInfo) -> Vec<String> {
        let counts = &info.base_counts;
        let mut row = Vec::with_capacity(self.analyses.len() + 12);
        row.push(format!("{}::{}", self.contig, self.locus));
        row.extend(self.kind.calls(info).iter().map(|c| c.to_string()));
        row.push(info.called_snp.to_string());
        row.push(counts.a.to_string());
        row.push(counts.c.to_string());
        row.push(counts.g.to_string());
        row.push(counts.t.to_string());
        row.push(counts.n.to_string());
        row.push(info.call_was_made.clone());
        row.push(info.passed_depth_filter.clone());
        row.push(info.passed_proportion_filter_str.clone());
        row.push(info.pattern_string());
        row
    }
}

impl PositionSink for MatrixSink {
    fn prime(&mut self) -> Result<()> {
        make_parent_dirs(&self.path)?;
        let mut writer = create_table(&self.path, self.compress, false)?;
        writer.write_record(self.header())?;
        self.writer = Some(writer);
        debug!("Opened {} matrix {:?}", self.kind.label(), self.path);
        Ok(())
    }

    fn accept(&mut self, info: &PositionInfo) -> Result<()> {
        self.locus += 1;
        if !self.kind.selects(info) {
            return Ok(());
        }
        if info.analysis_count() != self.analyses.len() {
            return Err(VtmError::DimensionMismatch {
                expected: format!("{} analyses", self.analyses.len()),
                actual: format!("{} analyses", info.analysis_count()),
            });
        }
        let row = self.row(info);
        let writer = self.writer.as_mut().ok_or_else(|| {
            VtmError::InvalidInput(format!("{:?} received a locus before prime", self.path))
        })?;
        writer.write_record(row)?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        debug!(
            "Wrote {} of {} loci to {:?}",
            self.written, self.locus, self.path
        );
        Ok(())
    }
}

/// Creates the configured matrices for every contig under one directory.
#[derive(Debug, Clone)]
pub struct MatrixSinkFactory {
    out_dir: PathBuf,
    kinds: Vec<MatrixKind>,
    analyses: Vec<String>,
    compress: bool,
    /// Path-safe contig name to the contig that owns it.
    claimed: FxHashMap<String, String>,
}

impl MatrixSinkFactory {
    /// `analyses` are the column labels, in sample-group then analysis order.
    pub fn new(out_dir: PathBuf, kinds: Vec<MatrixKind>, analyses: Vec<String>, compress: bool) -> Self {
        MatrixSinkFactory {
            out_dir,
            kinds,
            analyses,
            compress,
            claimed: FxHashMap::default(),
        }
    }

    pub fn path_for(&self, contig: &str, kind: MatrixKind) -> PathBuf {
        self.out_dir
            .join(contig_file_name(contig, kind.label(), self.compress))
    }

    /// Distinct contigs whose names sanitize to the same file name would
    /// overwrite each other's matrices.
    fn claim(&mut self, contig: &str) -> Result<()> {
        let key = contig_file_name(contig, "matrix", false);
        if let Some(owner) = self.claimed.get(&key) {
            if owner != contig {
                return Err(VtmError::InvalidInput(format!(
                    "contigs {} and {} would share the matrix file {}",
                    owner, contig, key
                )));
            }
        }
        self.claimed.insert(key, contig.to_string());
        Ok(())
    }
}

impl SinkFactory for MatrixSinkFactory {
    fn open(&mut self, contig: &str) -> Result<Vec<Box<dyn PositionSink>>> {
        self.claim(contig)?;
        Ok(self
            .kinds
            .iter()
            .map(|&kind| {
                Box::new(MatrixSink::new(
                    kind,
                    contig,
                    self.path_for(contig, kind),
                    self.compress,
                    self.analyses.clone(),
                )) as Box<dyn PositionSink>
            })
            .collect())
    }
}
