use anyhow::{anyhow, Error};
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

/// One `--analysis` value: `SAMPLE:ANALYSIS:PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSpec {
    pub sample: String,
    pub analysis: String,
    pub path: PathBuf,
}

impl AnalysisSpec {
    /// Column label used in matrix headers and sample statistics.
    pub fn identifier(&self) -> String {
        format!("{}::{}", self.sample, self.analysis)
    }
}

impl FromStr for AnalysisSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(sample), Some(analysis), Some(path))
                if !sample.is_empty() && !analysis.is_empty() && !path.is_empty() =>
            {
                Ok(AnalysisSpec {
                    sample: sample.to_string(),
                    analysis: analysis.to_string(),
                    path: PathBuf::from(path),
                })
            }
            _ => Err(anyhow!(
                "expected SAMPLE:ANALYSIS:PATH for --analysis, got {:?}",
                s
            )),
        }
    }
}

/// CLI arguments for the `analyze` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "analyze")]
pub struct AnalyzeArgs {
    /// Reference position table (`contig`, `call` columns).
    #[structopt(long, short = "r")]
    pub reference: PathBuf,

    /// Duplicated-region table; a call of `1` marks a duplicated position.
    #[structopt(long, short = "d")]
    pub duplicates: Option<PathBuf>,

    /// Analysis position table as `SAMPLE:ANALYSIS:PATH`. Repeat for every analysis.
    #[structopt(long = "analysis", short = "a", required = true, number_of_values = 1)]
    pub analyses: Vec<AnalysisSpec>,

    /// Minimum coverage for an analysis call to pass the depth filter.
    #[structopt(long, short = "c", default_value = "10")]
    pub coverage: f64,

    /// Minimum proportion of reads supporting the call.
    #[structopt(long, short = "p", default_value = "0.9")]
    pub proportion: f64,

    /// Output directory for matrices and statistics.
    #[structopt(long, short = "o")]
    pub output: PathBuf,

    /// Also write a best-SNP matrix per contig.
    #[structopt(long)]
    pub best_snps: bool,

    /// Gzip the per-contig matrices.
    #[structopt(long, short = "z")]
    pub compress: bool,
}

/// Analyses of one sample in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSpec {
    pub name: String,
    pub analyses: Vec<AnalysisSpec>,
}

/// Normalised configuration derived from [`AnalyzeArgs`].
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub reference: PathBuf,
    pub duplicates: Option<PathBuf>,
    /// Samples in first-seen order.
    pub samples: Vec<SampleSpec>,
    pub coverage_threshold: f64,
    pub proportion_threshold: f64,
    pub output: PathBuf,
    pub best_snps: bool,
    pub compress: bool,
}

impl From<AnalyzeArgs> for AnalyzeConfig {
    fn from(args: AnalyzeArgs) -> AnalyzeConfig {
        let mut samples: Vec<SampleSpec> = Vec::new();
        for spec in args.analyses {
            match samples.iter_mut().find(|s| s.name == spec.sample) {
                Some(sample) => sample.analyses.push(spec),
                None => samples.push(SampleSpec {
                    name: spec.sample.clone(),
                    analyses: vec![spec],
                }),
            }
        }

        AnalyzeConfig {
            reference: args.reference,
            duplicates: args.duplicates,
            samples,
            coverage_threshold: args.coverage,
            proportion_threshold: args.proportion,
            output: args.output,
            best_snps: args.best_snps,
            compress: args.compress,
        }
    }
}

impl AnalyzeConfig {
    /// Analysis identifiers in sample-group then analysis order.
    pub fn identifiers(&self) -> Vec<String> {
        self.samples
            .iter()
            .flat_map(|s| s.analyses.iter().map(AnalysisSpec::identifier))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analysis_spec_keeping_colons_in_path() {
        let spec: AnalysisSpec = "s1:bwa-gatk:C:/data/s1.tsv".parse().unwrap();
        assert_eq!(spec.sample, "s1");
        assert_eq!(spec.analysis, "bwa-gatk");
        assert_eq!(spec.path, PathBuf::from("C:/data/s1.tsv"));
        assert_eq!(spec.identifier(), "s1::bwa-gatk");

        assert!("s1:bwa".parse::<AnalysisSpec>().is_err());
        assert!("s1::path.tsv".parse::<AnalysisSpec>().is_err());
    }

    #[test]
    fn groups_analyses_by_sample_in_first_seen_order() {
        let args = AnalyzeArgs::from_iter(&[
            "analyze",
            "-r",
            "ref.tsv",
            "-o",
            "out",
            "-a",
            "s2:bwa:a.tsv",
            "-a",
            "s1:bwa:b.tsv",
            "-a",
            "s2:bowtie:c.tsv",
        ]);
        let config = AnalyzeConfig::from(args);

        assert_eq!(config.samples.len(), 2);
        assert_eq!(config.samples[0].name, "s2");
        assert_eq!(config.samples[0].analyses.len(), 2);
        assert_eq!(
            config.identifiers(),
            vec!["s2::bwa", "s2::bowtie", "s1::bwa"]
        );
        assert_eq!(config.coverage_threshold, 10.0);
        assert_eq!(config.proportion_threshold, 0.9);
        assert!(!config.best_snps);
    }
}
