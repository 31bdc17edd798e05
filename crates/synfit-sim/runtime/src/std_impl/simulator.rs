// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Standard simulator implementation
//!
//! Handle arenas keyed by monotonically increasing ids. Ids are never reused,
//! so a stale handle always fails with an `Unknown*` error instead of aliasing
//! a newer object.

use ahash::AHashMap;
use synfit_sim_neural::models::membrane::{conductance_density, exponential_euler};
use synfit_sim_neural::{
    CellHandle, CompLocation, ConnectionHandle, ExpSynModel, ExpSynParameters, MechanismHandle,
    ModelParameters, Morphology, PassiveParameters, PointProcessHandle, Responses,
    SeclistLocation, SectionProperties, SimError, SimResult, Trace,
};
use tracing::{debug, trace};

use crate::traits::{LiveHandles, RunRequest, Simulator};

/// Events within this distance (ms) of a step boundary are delivered at that step
const TIME_EPSILON: f64 = 1e-9;

/// Built-in mechanism kinds a suffix can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanismKind {
    /// Passive leak, distributed over sections
    Passive,
    /// Exponential synapse, point process
    ExpSyn,
}

impl MechanismKind {
    pub fn is_point_process(&self) -> bool {
        matches!(self, MechanismKind::ExpSyn)
    }
}

struct SectionState {
    area: f64,
    props: SectionProperties,
    passive: Option<PassiveParameters>,
    /// Number of live `pas` insertions covering this section
    passive_refs: u32,
}

struct CellState {
    morphology: Morphology,
    sections: Vec<SectionState>,
}

impl CellState {
    fn resolve_seclist(&self, cell: CellHandle, seclist: &str) -> SimResult<Vec<usize>> {
        let indices: Vec<usize> = self.morphology.section_indices(seclist).collect();
        if indices.is_empty() {
            return Err(SimError::UnknownSectionList {
                cell,
                seclist: seclist.to_string(),
            });
        }
        Ok(indices)
    }

    fn resolve_compartment(&self, cell: CellHandle, location: &CompLocation) -> SimResult<usize> {
        if !self.morphology.has_seclist(&location.seclist_name) {
            return Err(SimError::UnknownSectionList {
                cell,
                seclist: location.seclist_name.clone(),
            });
        }
        self.morphology
            .section_index(&location.seclist_name, location.sec_index)
            .ok_or_else(|| {
                SimError::InvalidLocation(format!(
                    "{}: section index {} is out of range",
                    location, location.sec_index
                ))
            })
    }
}

struct MechanismState {
    cell: CellHandle,
    sections: Vec<usize>,
}

struct PointProcessState {
    cell: CellHandle,
    section: usize,
    params: ExpSynParameters,
}

struct ConnectionState {
    target: PointProcessHandle,
    weight: f64,
    events: Vec<f64>,
}

/// Reference single-compartment-per-section simulator
pub struct StdSimulator {
    suffixes: AHashMap<String, MechanismKind>,
    cells: AHashMap<CellHandle, CellState>,
    mechanisms: AHashMap<MechanismHandle, MechanismState>,
    point_processes: AHashMap<PointProcessHandle, PointProcessState>,
    connections: AHashMap<ConnectionHandle, ConnectionState>,
    next_id: u32,
}

impl StdSimulator {
    pub fn new() -> Self {
        let mut suffixes = AHashMap::new();
        suffixes.insert("pas".to_string(), MechanismKind::Passive);
        suffixes.insert("ExpSyn".to_string(), MechanismKind::ExpSyn);
        suffixes.insert("MyExpSyn".to_string(), MechanismKind::ExpSyn);

        Self {
            suffixes,
            cells: AHashMap::new(),
            mechanisms: AHashMap::new(),
            point_processes: AHashMap::new(),
            connections: AHashMap::new(),
            next_id: 0,
        }
    }

    /// Register `suffix` as another name for a built-in mechanism kind
    pub fn register_suffix(&mut self, suffix: impl Into<String>, kind: MechanismKind) {
        let suffix = suffix.into();
        debug!(target: "synfit-sim", "Registered mechanism suffix '{}' as {:?}", suffix, kind);
        self.suffixes.insert(suffix, kind);
    }

    /// Register `alias` as another name for an already registered suffix
    pub fn register_alias(&mut self, alias: impl Into<String>, existing: &str) -> SimResult<()> {
        let kind = self.kind_of(existing)?;
        self.register_suffix(alias, kind);
        Ok(())
    }

    pub fn kind_of(&self, suffix: &str) -> SimResult<MechanismKind> {
        self.suffixes
            .get(suffix)
            .copied()
            .ok_or_else(|| SimError::UnknownSuffix(suffix.to_string()))
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn cell(&self, cell: CellHandle) -> SimResult<&CellState> {
        self.cells.get(&cell).ok_or(SimError::UnknownCell(cell))
    }

    fn cell_mut(&mut self, cell: CellHandle) -> SimResult<&mut CellState> {
        self.cells.get_mut(&cell).ok_or(SimError::UnknownCell(cell))
    }
}

impl Default for StdSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for StdSimulator {
    fn create_cell(&mut self, morphology: &Morphology) -> SimResult<CellHandle> {
        if morphology.sections.is_empty() {
            return Err(SimError::Backend(format!(
                "morphology '{}' has no sections",
                morphology.name
            )));
        }
        let mut sections = Vec::with_capacity(morphology.sections.len());
        for section in &morphology.sections {
            let area = section.area();
            if !area.is_finite() || area <= 0.0 {
                return Err(SimError::Backend(format!(
                    "section '{}' has non-positive area",
                    section.name
                )));
            }
            sections.push(SectionState {
                area,
                props: SectionProperties::default(),
                passive: None,
                passive_refs: 0,
            });
        }

        let handle = CellHandle(self.next_id());
        self.cells.insert(
            handle,
            CellState {
                morphology: morphology.clone(),
                sections,
            },
        );
        debug!(target: "synfit-sim", "Created {} from morphology '{}'", handle, morphology.name);
        Ok(handle)
    }

    fn destroy_cell(&mut self, cell: CellHandle) -> SimResult<()> {
        self.cells.remove(&cell).ok_or(SimError::UnknownCell(cell))?;
        debug!(target: "synfit-sim", "Destroyed {}", cell);
        Ok(())
    }

    fn insert_mechanism(
        &mut self,
        cell: CellHandle,
        location: &SeclistLocation,
        suffix: &str,
    ) -> SimResult<MechanismHandle> {
        let kind = self.kind_of(suffix)?;
        if kind.is_point_process() {
            return Err(SimError::Backend(format!(
                "'{}' is a point process and cannot be inserted on a section list",
                suffix
            )));
        }

        let state = self.cell_mut(cell)?;
        let sections = state.resolve_seclist(cell, &location.seclist_name)?;
        for &i in &sections {
            let section = &mut state.sections[i];
            if section.passive_refs == 0 {
                section.passive = Some(PassiveParameters::default());
            }
            section.passive_refs += 1;
        }

        let handle = MechanismHandle(self.next_id());
        self.mechanisms
            .insert(handle, MechanismState { cell, sections });
        trace!(target: "synfit-sim", "Inserted '{}' on {} of {}", suffix, location, cell);
        Ok(handle)
    }

    fn remove_mechanism(&mut self, mechanism: MechanismHandle) -> SimResult<()> {
        let record = self
            .mechanisms
            .remove(&mechanism)
            .ok_or(SimError::UnknownMechanism(mechanism))?;
        // The owning cell may already be gone; the mechanism record is released either way
        if let Some(state) = self.cells.get_mut(&record.cell) {
            for i in record.sections {
                let section = &mut state.sections[i];
                section.passive_refs = section.passive_refs.saturating_sub(1);
                if section.passive_refs == 0 {
                    section.passive = None;
                }
            }
        }
        Ok(())
    }

    fn set_section_attribute(
        &mut self,
        cell: CellHandle,
        location: &SeclistLocation,
        attribute: &str,
        value: f64,
    ) -> SimResult<()> {
        let state = self.cell_mut(cell)?;
        let sections = state.resolve_seclist(cell, &location.seclist_name)?;

        if SectionProperties::attribute_names().contains(&attribute) {
            let mut updated = Vec::with_capacity(sections.len());
            for &i in &sections {
                let mut props = state.sections[i].props;
                props.set(attribute, value)?;
                updated.push(props);
            }
            for (&i, props) in sections.iter().zip(updated) {
                state.sections[i].props = props;
            }
            return Ok(());
        }

        if PassiveParameters::attribute_names().contains(&attribute) {
            let mut updated = Vec::with_capacity(sections.len());
            for &i in &sections {
                let section = &state.sections[i];
                let mut params = section.passive.ok_or_else(|| SimError::UnknownAttribute {
                    object: state.morphology.sections[i].name.clone(),
                    attribute: attribute.to_string(),
                })?;
                params.set(attribute, value)?;
                updated.push(params);
            }
            for (&i, params) in sections.iter().zip(updated) {
                state.sections[i].passive = Some(params);
            }
            return Ok(());
        }

        Err(SimError::UnknownAttribute {
            object: location.to_string(),
            attribute: attribute.to_string(),
        })
    }

    fn create_point_process(
        &mut self,
        cell: CellHandle,
        location: &CompLocation,
        suffix: &str,
    ) -> SimResult<PointProcessHandle> {
        let kind = self.kind_of(suffix)?;
        if !kind.is_point_process() {
            return Err(SimError::Backend(format!(
                "'{}' is a distributed mechanism, not a point process",
                suffix
            )));
        }
        let section = self.cell(cell)?.resolve_compartment(cell, location)?;

        let handle = PointProcessHandle(self.next_id());
        self.point_processes.insert(
            handle,
            PointProcessState {
                cell,
                section,
                params: ExpSynParameters::default(),
            },
        );
        trace!(target: "synfit-sim", "Created {} '{}' at {}", handle, suffix, location);
        Ok(handle)
    }

    fn set_point_process_attribute(
        &mut self,
        point_process: PointProcessHandle,
        attribute: &str,
        value: f64,
    ) -> SimResult<()> {
        let state = self
            .point_processes
            .get_mut(&point_process)
            .ok_or(SimError::UnknownPointProcess(point_process))?;
        state.params.set(attribute, value)
    }

    fn point_process_attribute(
        &self,
        point_process: PointProcessHandle,
        attribute: &str,
    ) -> SimResult<f64> {
        let state = self
            .point_processes
            .get(&point_process)
            .ok_or(SimError::UnknownPointProcess(point_process))?;
        state.params.get(attribute)
    }

    fn destroy_point_process(&mut self, point_process: PointProcessHandle) -> SimResult<()> {
        self.point_processes
            .remove(&point_process)
            .ok_or(SimError::UnknownPointProcess(point_process))?;
        Ok(())
    }

    fn connect(&mut self, target: PointProcessHandle, weight: f64) -> SimResult<ConnectionHandle> {
        if !self.point_processes.contains_key(&target) {
            return Err(SimError::UnknownPointProcess(target));
        }
        if !weight.is_finite() {
            return Err(SimError::InvalidParameter {
                attribute: "weight".to_string(),
                value: weight,
                reason: "connection weight must be finite",
            });
        }
        let handle = ConnectionHandle(self.next_id());
        self.connections.insert(
            handle,
            ConnectionState {
                target,
                weight,
                events: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn schedule_event(&mut self, connection: ConnectionHandle, time: f64) -> SimResult<()> {
        if !time.is_finite() || time < 0.0 {
            return Err(SimError::InvalidParameter {
                attribute: "event time".to_string(),
                value: time,
                reason: "event times must be finite and >= 0",
            });
        }
        let state = self
            .connections
            .get_mut(&connection)
            .ok_or(SimError::UnknownConnection(connection))?;
        state.events.push(time);
        Ok(())
    }

    fn disconnect(&mut self, connection: ConnectionHandle) -> SimResult<()> {
        self.connections
            .remove(&connection)
            .ok_or(SimError::UnknownConnection(connection))?;
        Ok(())
    }

    fn run(&mut self, cell: CellHandle, request: &RunRequest) -> SimResult<Responses> {
        request.validate()?;
        let state = self.cell(cell)?;

        // Recording probes: (name, section)
        let mut probes = Vec::with_capacity(request.recordings.len());
        for recording in &request.recordings {
            if recording.variable != "v" {
                return Err(SimError::UnknownAttribute {
                    object: recording.name.clone(),
                    attribute: recording.variable.clone(),
                });
            }
            let section = state.resolve_compartment(cell, &recording.location)?;
            probes.push((recording.name.clone(), section));
        }

        // Synapses on this cell, in handle order so summation order is reproducible
        let mut synapses: Vec<(PointProcessHandle, usize, ExpSynParameters)> = self
            .point_processes
            .iter()
            .filter(|(_, pp)| pp.cell == cell)
            .map(|(handle, pp)| (*handle, pp.section, pp.params))
            .collect();
        synapses.sort_by_key(|(handle, _, _)| *handle);

        let slot_of: AHashMap<PointProcessHandle, usize> = synapses
            .iter()
            .enumerate()
            .map(|(slot, (handle, _, _))| (*handle, slot))
            .collect();

        let mut by_section: Vec<Vec<usize>> = vec![Vec::new(); state.sections.len()];
        for (slot, (_, section, _)) in synapses.iter().enumerate() {
            by_section[*section].push(slot);
        }

        // (time, synapse slot, weight), delivered in time order
        let mut events: Vec<(f64, usize, f64)> = self
            .connections
            .values()
            .filter_map(|conn| slot_of.get(&conn.target).map(|slot| (conn, *slot)))
            .flat_map(|(conn, slot)| conn.events.iter().map(move |t| (*t, slot, conn.weight)))
            .collect();
        events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let steps = request.step_count();
        let dt = request.dt;
        let model = ExpSynModel::new();
        let mut v = vec![request.v_init; state.sections.len()];
        let mut g = vec![0.0f64; synapses.len()];

        let mut traces: Vec<Trace> = probes
            .iter()
            .map(|_| Trace::with_capacity(steps + 1))
            .collect();
        for (trace, (_, section)) in traces.iter_mut().zip(&probes) {
            trace.push(0.0, v[*section]);
        }

        debug!(
            target: "synfit-sim",
            "Running {} for {} ms ({} steps, {} synapses, {} events, {} °C)",
            cell,
            request.tstop,
            steps,
            synapses.len(),
            events.len(),
            request.celsius
        );

        let mut next_event = 0;
        for step in 0..steps {
            let t = step as f64 * dt;
            while next_event < events.len() && events[next_event].0 <= t + TIME_EPSILON {
                let (_, slot, weight) = events[next_event];
                g[slot] = model.on_event(g[slot], weight, &synapses[slot].2);
                next_event += 1;
            }

            for (i, section) in state.sections.iter().enumerate() {
                let mut g_total = 0.0;
                let mut ge_total = 0.0;
                if let Some(pas) = &section.passive {
                    g_total += pas.g;
                    ge_total += pas.g * pas.e;
                }
                for &slot in &by_section[i] {
                    let density = conductance_density(g[slot], section.area);
                    g_total += density;
                    ge_total += density * synapses[slot].2.e;
                }
                v[i] = exponential_euler(v[i], g_total, ge_total, section.props.cm, dt);
            }

            for (slot, (_, _, params)) in synapses.iter().enumerate() {
                g[slot] = model.decay(g[slot], dt, params);
            }

            let t_next = (step + 1) as f64 * dt;
            for (trace, (_, section)) in traces.iter_mut().zip(&probes) {
                trace.push(t_next, v[*section]);
            }
        }

        Ok(probes
            .into_iter()
            .map(|(name, _)| name)
            .zip(traces)
            .collect())
    }

    fn live_handles(&self) -> LiveHandles {
        LiveHandles {
            cells: self.cells.len(),
            mechanisms: self.mechanisms.len(),
            point_processes: self.point_processes.len(),
            connections: self.connections.len(),
        }
    }

    fn name(&self) -> &'static str {
        "Std Simulator"
    }
}
