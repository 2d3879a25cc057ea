use crate::aggregate::{fold_merged, fold_sample, MergedCountTable};
use crate::cli::Args;
use crate::config::Config;
use crate::counting::{CountDispatcher, Strategy};
use crate::export::counts::{save_merged_table, save_sample_table};
use crate::export::{merged_output_path, sample_output_path};
use crate::library::LibraryTable;
use crate::samples::resolve_samples;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Everything a counting run needs, after merging flags over the config file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub library: PathBuf,
    pub fastq: Vec<PathBuf>,
    pub names: Option<Vec<String>>,
    pub threads: usize,
    pub output_prefix: String,
    pub strategy: Strategy,
    pub sample_suffixes: Vec<String>,
    pub show_progress: bool,
}

impl RunOptions {
    pub fn resolve(args: Args, config: Config) -> Self {
        Self {
            library: args.library,
            fastq: args.fastq,
            names: args.names,
            threads: args.ncpu.unwrap_or(config.threads),
            output_prefix: args.output.unwrap_or(config.output_prefix),
            strategy: args.strategy.unwrap_or(config.strategy),
            sample_suffixes: config.sample_suffixes,
            show_progress: !args.quiet,
        }
    }
}

/// Files written by a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sample_tables: Vec<(String, PathBuf)>,
    pub merged_table: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let options = RunOptions::resolve(args, config);
    execute(&options)?;
    Ok(())
}

/// Load the library, count each sample in turn, writing its table as soon as
/// it is done, then write the merged table. A failing sample stops the run;
/// tables already written stay on disk.
pub fn execute(options: &RunOptions) -> Result<RunSummary> {
    let dispatcher = CountDispatcher::new(options.threads)?
        .with_strategy(options.strategy)
        .with_progress(options.show_progress);
    let samples = resolve_samples(
        &options.fastq,
        options.names.as_deref(),
        &options.sample_suffixes,
    )?;

    let library = LibraryTable::load(&options.library)
        .with_context(|| format!("Failed to load library {}", options.library.display()))?;
    let targets = library.unique_targets();
    info!(
        "Loaded {} library entries ({} distinct sequences)",
        library.len(),
        targets.len()
    );

    let mut merged = MergedCountTable::new(&library);
    let mut sample_tables = Vec::with_capacity(samples.len());

    for sample in &samples {
        info!("Processing {} ({})", sample.name, sample.path.display());

        let results = dispatcher
            .run(&sample.path, &targets)
            .with_context(|| format!("Failed to count sample {}", sample.name))?;
        let table = fold_sample(&library, results)?;

        let output = sample_output_path(&options.output_prefix, &sample.name);
        save_sample_table(&output, &table, &sample.name)?;
        info!("Wrote {}", output.display());

        merged = fold_merged(merged, &table, &sample.name)?;
        sample_tables.push((sample.name.clone(), output));
    }

    let merged_table = merged_output_path(&options.output_prefix);
    save_merged_table(&merged_table, &merged)?;
    info!("Wrote {}", merged_table.display());
    info!("Analysis completed!");

    Ok(RunSummary {
        sample_tables,
        merged_table,
    })
}
