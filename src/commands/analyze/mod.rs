mod args;

use anyhow::{Context, Result};
use log::info;
use std::fs;
use vtm_lib::engine::{NoDuplicates, PositionSource, SampleGroup};
use vtm_lib::pipeline::analyze::GenomeAnalysis;
use vtm_lib::pipeline::report::{
    write_general_stats, write_sample_stats, MatrixKind, MatrixSinkFactory, TsvPositionTable,
};

pub use args::{AnalysisSpec, AnalyzeArgs, AnalyzeConfig, SampleSpec};

/// Load every analysis table, grouped by sample.
fn load_sample_groups(config: &AnalyzeConfig) -> Result<Vec<SampleGroup>> {
    let mut groups = Vec::with_capacity(config.samples.len());
    for sample in &config.samples {
        let mut analyses: Vec<Box<dyn PositionSource>> = Vec::with_capacity(sample.analyses.len());
        for spec in &sample.analyses {
            let table = TsvPositionTable::from_path(&spec.path, &spec.identifier())
                .with_context(|| format!("Failed to load analysis {}", spec.path.display()))?;
            analyses.push(Box::new(table));
        }
        groups.push(SampleGroup::new(&sample.name, analyses)?);
    }
    Ok(groups)
}

/// Execute the `analyze` command end-to-end.
pub fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config: AnalyzeConfig = args.into();

    info!(
        "Running vtm analyze on {:?} with {} samples",
        config.reference,
        config.samples.len()
    );
    let analysis = GenomeAnalysis::new(config.coverage_threshold, config.proportion_threshold)?;

    fs::create_dir_all(&config.output)
        .with_context(|| format!("Failed to create {}", config.output.display()))?;

    let reference = TsvPositionTable::from_path(&config.reference, "reference")
        .with_context(|| format!("Failed to load reference {}", config.reference.display()))?;
    let duplicates: Box<dyn PositionSource> = match &config.duplicates {
        Some(path) => Box::new(
            TsvPositionTable::from_path(path, "duplicates")
                .with_context(|| format!("Failed to load duplicates {}", path.display()))?,
        ),
        None => Box::new(NoDuplicates),
    };
    let sample_groups = load_sample_groups(&config)?;

    let mut kinds = vec![MatrixKind::Master, MatrixKind::MissingData];
    if config.best_snps {
        kinds.push(MatrixKind::BestSnp);
    }
    let mut sinks = MatrixSinkFactory::new(
        config.output.clone(),
        kinds,
        config.identifiers(),
        config.compress,
    );

    let stats = analysis.analyze_genome(
        &mut sinks,
        &sample_groups,
        duplicates.as_ref(),
        &reference,
    )?;

    let general_path = config.output.join("general_stats.tsv");
    write_general_stats(&general_path, &stats)?;
    let sample_path = config.output.join("sample_stats.tsv");
    write_sample_stats(&sample_path, &sample_groups, &stats.sample_stats)?;

    info!("Analysis complete -> {:?}", config.output);
    Ok(())
}
