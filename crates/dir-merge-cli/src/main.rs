mod commands;
mod logging;
mod materialize;
mod progress;
mod prompt;

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, Strategy};
use dir_merge_core::analysis::RelationKind;
use dir_merge_core::merge::AutoResolver;
use dir_merge_core::{report, Analysis, AppConfig, MergeEngine};
use dotenv::dotenv;
use progress::CliReporter;
use prompt::InteractiveResolver;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let loaded = match &args.config {
        Some(path) => dir_merge_core::config::load_configuration_from(path),
        None => dir_merge_core::config::load_configuration(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Analyze { dirs }) => run_analyze(config, &dirs),
        Some(Commands::Merge {
            dirs,
            output,
            strategy,
            dry_run,
        }) => run_merge(config, &dirs, &output, strategy, dry_run),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => Cli::command()
            .print_long_help()
            .context("Could not print help"),
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

/// Roots from the command line, the configuration, or stdin, in that order.
fn collect_roots(engine: &MergeEngine, dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut roots = engine.resolve_roots(dirs);
    if roots.is_empty() {
        let entered = prompt::prompt_roots().context("Could not read directories")?;
        roots = engine.resolve_roots(&entered);
    }
    if roots.is_empty() {
        bail!("No directories to compare");
    }
    Ok(roots)
}

fn analyze(engine: &MergeEngine, dirs: &[PathBuf]) -> Result<Analysis> {
    let roots = collect_roots(engine, dirs)?;
    let reporter = CliReporter::new();
    let analysis = engine.analyze(&roots, &reporter)?;
    print_summary(&analysis);

    let output_dir = &engine.config().output_dir;
    let written = analysis
        .write_reports(output_dir)
        .with_context(|| format!("Could not write reports to {}", output_dir.display()))?;
    info!(
        "{} reports written to {}",
        written.len(),
        output_dir.display().to_string().cyan()
    );
    Ok(analysis)
}

fn run_analyze(config: AppConfig, dirs: &[PathBuf]) -> Result<()> {
    let engine = MergeEngine::new(config);
    analyze(&engine, dirs)?;
    Ok(())
}

fn run_merge(
    config: AppConfig,
    dirs: &[PathBuf],
    output: &Path,
    strategy: Strategy,
    dry_run: bool,
) -> Result<()> {
    if output.exists() && !dry_run {
        bail!("Output directory {} already exists", output.display());
    }

    let engine = MergeEngine::new(config);
    let analysis = analyze(&engine, dirs)?;

    let plan = match strategy {
        Strategy::Interactive => {
            let mut resolver = InteractiveResolver::new(io::stdin().lock(), io::stdout());
            analysis.merge_plan(&mut resolver)
        }
        Strategy::KeepFirst => analysis.merge_plan(&mut AutoResolver::KeepFirst),
        Strategy::KeepAll => analysis.merge_plan(&mut AutoResolver::KeepAll),
    }
    .context("Could not build the merge plan; reports were still written")?;

    let plan_path = engine.config().output_dir.join("merge-plan.toml");
    report::write_merge_plan(&analysis.index, &plan, &plan_path)?;
    info!(
        "Merge plan: {} files kept, {} dropped, written to {}",
        format!("{}", plan.len()).green(),
        format!("{}", analysis.index.len().saturating_sub(plan.len())).red(),
        plan_path.display().to_string().cyan(),
    );

    if dry_run {
        info!("Dry run: nothing copied");
        return Ok(());
    }

    if strategy == Strategy::Interactive {
        let question = format!("Copy {} files into {}?", plan.len(), output.display());
        if !prompt::prompt_confirm(&question, Some(true))? {
            warn!("Merge cancelled; plan kept at {}", plan_path.display());
            return Ok(());
        }
    }

    let copied = materialize::materialize(&analysis.index, &plan, output)?;
    info!(
        "{} files copied into {}",
        format!("{}", copied).green(),
        output.display().to_string().cyan()
    );
    Ok(())
}

fn print_summary(analysis: &Analysis) {
    println!();
    info!(
        "Index: {}, Compare: {}",
        format!("{:.2}s", analysis.index_duration.as_secs_f64()).green(),
        format!("{:.2}s", analysis.classify_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files, {} pairs compared, {} prefix reads, {} full reads",
        format!("{}", analysis.index.len()).cyan(),
        format!("{}", analysis.cache.len()).cyan(),
        format!("{}", analysis.hash_stats.prefix_reads).cyan(),
        format!("{}", analysis.hash_stats.full_reads).cyan(),
    );
    for (kind, count) in analysis.registry.kind_counts() {
        if count == 0 {
            continue;
        }
        let count = format!("{}", count);
        let count = if kind == RelationKind::Match {
            count.green()
        } else {
            count.red()
        };
        info!("{:>16}: {} groups", kind.as_str(), count);
    }
    info!(
        "{:>16}: {} files",
        RelationKind::Unique.as_str(),
        format!("{}", analysis.registry.unique().len()).cyan()
    );
}
