// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Opaque handles for simulator-native objects
//!
//! Handles are issued by a simulator and are only meaningful to the simulator
//! that issued them. The circuit layer stores and forwards them, never inspects them.

use core::fmt;

/// Instantiated cell (morphology realised in the simulator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellHandle(pub u32);

impl fmt::Display for CellHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({})", self.0)
    }
}

/// Distributed mechanism inserted on a section list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MechanismHandle(pub u32);

impl fmt::Display for MechanismHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mechanism({})", self.0)
    }
}

/// Point process (e.g. a synapse) attached to one compartment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointProcessHandle(pub u32);

impl fmt::Display for PointProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointProcess({})", self.0)
    }
}

/// Connection delivering events to a point process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(pub u32);

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection({})", self.0)
    }
}
