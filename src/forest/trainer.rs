//! Parallel forest growth.
//!
//! The trainer partitions the tree-index space into contiguous per-worker
//! ranges. Each worker grows its trees sequentially with generators
//! derived from the forest seed, so the grown forest is identical for any
//! thread count. The only cross-worker state is the importance
//! accumulator, which every worker owns privately and the trainer sums
//! after the join.

use std::ops::Range;

use derive_builder::Builder;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::data::Dataset;
use crate::error::ForestError;
use crate::importance::{GiniImportance, ImportanceMode};
use crate::logging::{LogSink, TrainingLogger, Verbosity};
use crate::parallel::{contiguous_ranges, resolve_threads};
use crate::random;
use crate::sampling;
use crate::tree::{GrowParams, Tree, TreeGrower};

use super::evaluate::{self, OobEvaluation, TreeOobPredictions};
use super::Forest;

/// Configuration for growing a forest.
///
/// Use [`ForestTrainer::builder()`] for a fluent API, or
/// [`ForestTrainer::default()`] for the defaults.
///
/// # Example
///
/// ```ignore
/// use canopy::{Dataset, DenseMatrix, ForestTrainer, ImportanceMode};
///
/// let dataset = Dataset::new(matrix, response_column)?;
/// let trainer = ForestTrainer::builder()
///     .num_trees(500usize)
///     .seed(42u64)
///     .importance_mode(ImportanceMode::Gini)
///     .build()
///     .unwrap();
/// let fit = trainer.fit(&dataset)?;
/// println!("OOB error: {}", fit.oob.overall_error);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct ForestTrainer {
    /// Number of trees to grow.
    #[builder(default = "100")]
    pub num_trees: usize,

    /// Candidate variables drawn per split; `0` selects
    /// `max(1, floor(sqrt(P - 1)))`.
    #[builder(default = "0")]
    pub mtry: usize,

    /// Nodes at or below this sample count become leaves; `0` selects 1.
    #[builder(default = "0")]
    pub min_node_size: usize,

    /// Worker threads: `1` grows strictly sequentially, `0` uses rayon's
    /// current thread count.
    #[builder(default = "1")]
    pub num_threads: usize,

    /// Seed behind every random decision in the forest.
    #[builder(default = "0")]
    pub seed: u64,

    /// Variable importance to accumulate during growth.
    #[builder(default)]
    pub importance_mode: ImportanceMode,

    /// Variables never offered to the splitter, sorted ascending.
    #[builder(default)]
    pub no_split_variables: Vec<usize>,

    /// Progress output threshold.
    #[builder(default)]
    pub verbosity: Verbosity,

    /// Destination for progress output.
    #[builder(default)]
    pub log_sink: LogSink,
}

impl Default for ForestTrainer {
    fn default() -> Self {
        Self {
            num_trees: 100,
            mtry: 0,
            min_node_size: 0,
            num_threads: 1,
            seed: 0,
            importance_mode: ImportanceMode::default(),
            no_split_variables: Vec::new(),
            verbosity: Verbosity::default(),
            log_sink: LogSink::default(),
        }
    }
}

/// A trained forest together with its training-time evaluation.
#[derive(Debug, Clone)]
pub struct ForestFit {
    /// The grown forest.
    pub forest: Forest,
    /// Out-of-bag evaluation over the training samples.
    pub oob: OobEvaluation,
    /// Per-tree OOB bookkeeping (held-out sample IDs and their predicted
    /// values), in tree-index order.
    pub per_tree_oob: Vec<TreeOobPredictions>,
    /// Gini importance per splittable variable, in compressed column
    /// order; present in `Gini` importance mode.
    pub importance: Option<Vec<f64>>,
}

/// Configuration resolved against a concrete dataset.
struct ResolvedParams {
    num_threads: usize,
    mtry: usize,
    min_node_size: usize,
    split_candidates: Vec<usize>,
    excluded: Vec<usize>,
}

/// One worker's share of the forest.
struct WorkerOutput {
    trees: Vec<Tree>,
    oob: Vec<TreeOobPredictions>,
    importance: Option<GiniImportance>,
}

impl ForestTrainer {
    /// Trainer with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for configuring a trainer.
    pub fn builder() -> ForestTrainerBuilder {
        ForestTrainerBuilder::default()
    }

    /// Grow, evaluate, and return a forest.
    ///
    /// # Panics
    ///
    /// Panics if a dedicated thread pool cannot be created (rare OS-level
    /// failure).
    pub fn fit(&self, dataset: &Dataset) -> Result<ForestFit, ForestError> {
        let plan = self.resolve(dataset)?;
        match plan.num_threads {
            1 => Ok(self.fit_with_plan(dataset, &plan)),
            n => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .expect("Failed to create thread pool");
                Ok(pool.install(|| self.fit_with_plan(dataset, &plan)))
            }
        }
    }

    /// Validate the configuration against `dataset` and fill in defaults.
    fn resolve(&self, dataset: &Dataset) -> Result<ResolvedParams, ForestError> {
        if self.num_trees == 0 {
            return Err(ForestError::InvalidConfig(
                "num_trees must be at least 1".to_string(),
            ));
        }

        let num_variables = dataset.num_variables();
        for pair in self.no_split_variables.windows(2) {
            if pair[0] >= pair[1] {
                return Err(ForestError::InvalidConfig(
                    "no_split_variables must be sorted ascending without duplicates".to_string(),
                ));
            }
        }
        if let Some(&var) = self.no_split_variables.last() {
            if var >= num_variables {
                return Err(ForestError::InvalidConfig(format!(
                    "no-split variable {} out of range for {} columns",
                    var, num_variables
                )));
            }
        }

        let mut excluded = self.no_split_variables.clone();
        if let Err(position) = excluded.binary_search(&dataset.dependent_var_id()) {
            excluded.insert(position, dataset.dependent_var_id());
        }
        let split_candidates: Vec<usize> =
            (0..num_variables).filter(|v| excluded.binary_search(v).is_err()).collect();
        if split_candidates.is_empty() {
            return Err(ForestError::InvalidConfig(
                "no variables available for splitting".to_string(),
            ));
        }

        let mtry = if self.mtry == 0 {
            (((num_variables - 1) as f64).sqrt().floor() as usize).max(1)
        } else {
            self.mtry
        };
        if mtry > split_candidates.len() {
            return Err(ForestError::InvalidConfig(format!(
                "mtry {} exceeds the {} available split variables",
                mtry,
                split_candidates.len()
            )));
        }

        let min_node_size = if self.min_node_size == 0 { 1 } else { self.min_node_size };

        Ok(ResolvedParams {
            num_threads: resolve_threads(self.num_threads),
            mtry,
            min_node_size,
            split_candidates,
            excluded,
        })
    }

    fn fit_with_plan(&self, dataset: &Dataset, plan: &ResolvedParams) -> ForestFit {
        let logger = TrainingLogger::new(self.log_sink.clone(), self.verbosity);
        logger.info(format_args!(
            "growing {} classification trees (mtry {}, min node size {}, {} threads)",
            self.num_trees, plan.mtry, plan.min_node_size, plan.num_threads
        ));

        let worker = |range: Range<usize>| -> WorkerOutput {
            let mut grower = TreeGrower::new(
                dataset,
                GrowParams {
                    split_candidates: &plan.split_candidates,
                    mtry: plan.mtry,
                    min_node_size: plan.min_node_size,
                },
            );
            let mut importance = match self.importance_mode {
                ImportanceMode::Gini => Some(GiniImportance::new(
                    dataset.num_variables(),
                    &plan.excluded,
                )),
                ImportanceMode::None => None,
            };

            let mut trees = Vec::with_capacity(range.len());
            let mut oob = Vec::with_capacity(range.len());
            for tree_index in range.clone() {
                let mut rng = random::tree_rng(self.seed, tree_index);
                let sample = sampling::bootstrap(dataset.num_samples(), &mut rng);
                let tree = grower.grow(sample.in_bag, &mut rng, importance.as_mut());

                let predicted = sample
                    .oob
                    .iter()
                    .map(|&sample_id| tree.predict(dataset.matrix(), sample_id))
                    .collect();
                oob.push(TreeOobPredictions {
                    sample_ids: sample.oob,
                    predicted,
                });
                trees.push(tree);
            }
            logger.debug(format_args!(
                "worker finished trees {}..{}",
                range.start, range.end
            ));
            WorkerOutput {
                trees,
                oob,
                importance,
            }
        };

        let ranges = contiguous_ranges(self.num_trees, plan.num_threads);
        let outputs: Vec<WorkerOutput> = if plan.num_threads == 1 {
            ranges.into_iter().map(worker).collect()
        } else {
            ranges.into_par_iter().map(worker).collect()
        };

        // Stitch per-range results back in tree-index order and sum the
        // worker-private importance accumulators.
        let mut trees = Vec::with_capacity(self.num_trees);
        let mut per_tree_oob = Vec::with_capacity(self.num_trees);
        let mut importance: Option<GiniImportance> = None;
        for output in outputs {
            trees.extend(output.trees);
            per_tree_oob.extend(output.oob);
            if let Some(part) = output.importance {
                match &mut importance {
                    Some(total) => total.merge(&part),
                    None => importance = Some(part),
                }
            }
        }

        let mut rng = random::forest_rng(self.seed);
        let oob = evaluate::evaluate_oob(dataset, &per_tree_oob, &mut rng);
        logger.info(format_args!(
            "finished: OOB prediction error {:.6} over {} defined samples",
            oob.overall_error, oob.num_defined
        ));

        let forest = Forest::new(
            trees,
            dataset.class_values().to_vec(),
            dataset.num_variables(),
            dataset.dependent_var_id(),
            self.seed,
        );
        ForestFit {
            forest,
            oob,
            per_tree_oob,
            importance: importance.map(GiniImportance::into_values),
        }
    }
}
