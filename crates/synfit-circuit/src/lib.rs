// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Synfit Circuit

Dynamic-topology circuit lifecycle: the object graph an optimizer candidate is
instantiated into, simulated in, and destroyed from again.

## Components (leaves first)

- **`SpikeEventSource`**: lazy, restartable event times from an `IntervalGenerator`
- **`PointProcess`**: one mechanism instance at one compartment
- **`EntityGroup`**: `round(n)` point processes sharing parameters and one source
- **`ParameterBinding`**: a named value written into targets, with lifecycle
- **`CircuitModel`**: morphology + static mechanisms + groups, addressed by parameter name

## Lifecycle

Every candidate gets a fresh object graph:

```text
freeze(values) → instantiate → run → destroy → unfreeze
```

`CircuitModel::instantiate_scoped` returns a guard that destroys the circuit
on every exit path.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod error;
pub mod group;
pub mod interval;
pub mod lifecycle;
pub mod mechanism;
pub mod model;
pub mod parameter;
pub mod point_process;
pub mod spike_source;

pub use error::{CircuitError, CircuitResult};
pub use group::{EntityGroup, COUNT_ATTRIBUTE, MAX_ENTITIES};
pub use interval::{FixedIntervals, IntervalGenerator, PoissonIntervals, SequenceIntervals};
pub use lifecycle::{BindingTarget, Destroyable, Instantiable};
pub use mechanism::{DistributedMechanism, SectionListTarget};
pub use model::{CircuitModel, InstantiatedCircuit, ParameterValues, TargetRef};
pub use parameter::{ParameterBinding, ParameterRecord, ParameterSpec};
pub use point_process::PointProcess;
pub use spike_source::{SpikeEventSource, SpikeTimes};
