use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::analysis::{find_relations, Classifier, ComparisonCache, RelationRegistry};
use crate::config::{self, AppConfig};
use crate::error::Error;
use crate::hasher::{Fingerprinter, HashStats};
use crate::index::TraitIndex;
use crate::merge::{build_merge_plan, MergePlan, Resolver};
use crate::progress::ProgressReporter;
use crate::report;

pub struct MergeEngine {
    config: AppConfig,
}

/// Everything computed for one set of roots. The registry stays usable for
/// reporting even if building a merge plan fails.
#[derive(Debug)]
pub struct Analysis {
    pub index: TraitIndex,
    pub registry: RelationRegistry,
    pub cache: ComparisonCache,
    pub hash_stats: HashStats,
    pub index_duration: Duration,
    pub classify_duration: Duration,
}

impl MergeEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Roots from the command line, or the configured ones if none were given.
    pub fn resolve_roots(&self, cli_roots: &[PathBuf]) -> Vec<PathBuf> {
        let roots: Vec<String> = if cli_roots.is_empty() {
            self.config.root_paths.clone()
        } else {
            cli_roots
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect()
        };
        let requested = roots.len();
        let non_overlapping = config::non_overlapping_directories(roots);
        if non_overlapping.len() < requested {
            warn!(
                "Dropped {} nested root(s); using {:?}",
                requested - non_overlapping.len(),
                non_overlapping
            );
        }
        non_overlapping.into_iter().map(PathBuf::from).collect()
    }

    /// Index `roots` and classify every candidate pair:
    /// 1. Walk each root, building the name and size maps (no hashing)
    /// 2. Compare each file against its name group and size group, hashing
    ///    lazily and caching every pair
    pub fn analyze(
        &self,
        roots: &[PathBuf],
        reporter: &dyn ProgressReporter,
    ) -> Result<Analysis, Error> {
        info!("Processing directories: {:?}", roots);

        // Phase 1: Index
        info!("Indexing files...");
        reporter.on_index_start();
        let index_start = Instant::now();
        let index = TraitIndex::build(roots, &self.config.ignore_patterns, reporter)?;
        let index_duration = index_start.elapsed();
        reporter.on_index_complete(index.len(), index_duration.as_secs_f64());
        debug!(
            "Index completed in {:.2}s: {} files",
            index_duration.as_secs_f64(),
            index.len()
        );

        // Phase 2: Classify
        info!("Comparing candidate files...");
        let classify_start = Instant::now();
        let fingerprinter = Fingerprinter::new();
        let mut cache = ComparisonCache::new();
        let registry = {
            let classifier =
                Classifier::new(&index, &fingerprinter).strict(self.config.strict_taxonomy);
            find_relations(&classifier, &mut cache, reporter)?
        };
        let classify_duration = classify_start.elapsed();
        reporter.on_classify_complete(
            registry.len(),
            registry.unique().len(),
            classify_duration.as_secs_f64(),
        );
        let hash_stats = fingerprinter.stats();
        debug!(
            "Classify completed in {:.2}s: {} pairs, {} cache hits, {} prefix reads, {} full reads",
            classify_duration.as_secs_f64(),
            cache.len(),
            cache.hits(),
            hash_stats.prefix_reads,
            hash_stats.full_reads,
        );

        Ok(Analysis {
            index,
            registry,
            cache,
            hash_stats,
            index_duration,
            classify_duration,
        })
    }
}

impl Analysis {
    pub fn merge_plan(&self, resolver: &mut dyn Resolver) -> Result<MergePlan, Error> {
        build_merge_plan(&self.index, &self.registry, resolver)
    }

    /// Trait index dumps, one report per relation kind, and `relations.csv`.
    pub fn write_reports(&self, output_dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let mut written = report::write_trait_index_reports(&self.index, output_dir)?;
        written.extend(report::write_relation_reports(
            &self.index,
            &self.registry,
            output_dir,
        )?);
        let csv_path = output_dir.join("relations.csv");
        report::write_relations_csv(&self.index, &self.registry, &csv_path)?;
        written.push(csv_path);
        Ok(written)
    }
}
