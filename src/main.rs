//! VTM - Variant Tracking Matrix
//!
//! VTM compares the genotype calls of many aligner/variant-caller analyses,
//! grouped by sample, against a reference genome one locus at a time. It
//! reports which positions are reliably called, where the analyses of each
//! sample agree, and which positions are high-confidence SNPs.
//!
//! # Tools
//!
//! - `analyze`: build per-contig matrices plus general and per-sample statistics
//!
//! # Usage
//!
//! ```bash
//! vtm analyze --reference reference.tsv --duplicates duplicates.tsv \
//!     --analysis sample1:bwa-gatk:sample1.bwa.gatk.tsv \
//!     --analysis sample1:bowtie-gatk:sample1.bowtie.gatk.tsv \
//!     --analysis sample2:bwa-gatk:sample2.bwa.gatk.tsv \
//!     --coverage 10 --proportion 0.9 --best-snps --output results/
//! ```

extern crate vtm_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use structopt::StructOpt;
use vtm_lib::utils;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Consensus statistics across many sequence analyses
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Analyze every locus of every contig and write matrices and statistics
    Analyze(commands::AnalyzeArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Analyze(args) => commands::run_analyze(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
