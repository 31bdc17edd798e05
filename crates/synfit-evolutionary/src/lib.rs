// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Synfit Evaluation

Scores candidate parameter vectors for an external optimizer:

- `protocol` - simulation runs and recordings
- `features` - eFeatures extracted from recorded traces
- `objectives` - feature scores combined into objectives and a fitness
- `evaluator` - `CellEvaluator`, one candidate at a time
- `batch` - a population across worker threads

## Evaluation

```text
values → freeze → (instantiate → run → destroy) per protocol → unfreeze → score
```

Failed candidates come back as `Fitness::Invalid`, never as a number.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod batch;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod objectives;
pub mod protocol;

pub use batch::evaluate_population;
pub use error::{EvoError, EvoResult};
pub use evaluator::{CellEvaluator, Evaluation, EvaluationPhase, Fitness};
pub use features::{EFeature, FeatureKind, DEFAULT_THRESHOLD};
pub use objectives::{
    MaxObjective, Objective, ObjectivesCalculator, SingletonObjective, WeightedSumObjective,
    DEFAULT_MAX_SCORE,
};
pub use protocol::{CompRecording, Protocol, SweepProtocol};
