// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Parallel evaluation of a population
//!
//! Evaluators are never shared: every rayon job builds its own through the
//! factory, so each worker owns an independent model and simulator.

use rayon::prelude::*;
use synfit_circuit::ParameterValues;
use tracing::info;

use crate::error::{EvoError, EvoResult};
use crate::evaluator::{CellEvaluator, Evaluation};

/// Evaluate `candidates` on `workers` threads (0 = one per core)
///
/// Results are returned in candidate order. A candidate whose evaluator
/// could not be built gets `EvoError::Worker`.
///
/// # Errors
///
/// `EvoError::Worker` if the thread pool cannot be created.
pub fn evaluate_population<F>(
    factory: F,
    candidates: &[ParameterValues],
    workers: usize,
) -> EvoResult<Vec<EvoResult<Evaluation>>>
where
    F: Fn() -> EvoResult<CellEvaluator> + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("synfit-worker-{}", i))
        .build()
        .map_err(|e| EvoError::Worker(e.to_string()))?;

    info!(
        target: "synfit-evolutionary",
        "Evaluating {} candidates on {} workers",
        candidates.len(),
        pool.current_num_threads()
    );

    let results = pool.install(|| {
        candidates
            .par_iter()
            .map_init(
                || factory().map_err(|e| e.to_string()),
                |evaluator, values| match evaluator {
                    Ok(evaluator) => evaluator.evaluate_with_dicts(values),
                    Err(reason) => Err(EvoError::Worker(format!(
                        "evaluator construction failed: {}",
                        reason
                    ))),
                },
            )
            .collect()
    });
    Ok(results)
}
