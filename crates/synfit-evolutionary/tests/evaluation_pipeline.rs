// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Integration Tests: Evaluation Pipeline
//!
//! Candidate evaluation against the reference simulator:
//! - valid candidates score and leave nothing allocated
//! - failed candidates are invalid, never a low score
//! - name mismatches are rejected before any allocation
//! - parallel evaluation matches sequential evaluation

mod common;

use common::{evaluator, evaluator_with, max_voltage_feature, values, FailingRunSimulator, RESPONSE};
use synfit_circuit::{CircuitError, ParameterValues};
use synfit_evolutionary::{
    evaluate_population, CellEvaluator, EvaluationPhase, EvoError, Fitness, ObjectivesCalculator,
    SingletonObjective,
};
use synfit_sim_runtime::StdSimulator;

// ═══════════════════════════════════════════════════════════
// Valid candidates
// ═══════════════════════════════════════════════════════════

#[test]
fn test_valid_candidate_scores_and_cleans_up() {
    let mut evaluator = evaluator();
    let evaluation = evaluator.evaluate_with_dicts(&values(15.0, 0.001)).unwrap();

    assert!(evaluation.fitness.is_valid());
    assert_eq!(evaluation.scores.len(), 2);
    assert_eq!(evaluation.scores[0].0, "maximum_voltage");
    let total: f64 = evaluation.scores.iter().map(|(_, s)| s).sum();
    assert_eq!(evaluation.fitness, Fitness::Valid(total));

    let responses = evaluation.responses.unwrap();
    // 65 ms at dt = 0.1 plus the sample at t = 0
    assert_eq!(responses[RESPONSE].len(), 651);

    assert!(evaluator.simulator().live_handles().is_empty());
    assert!(!evaluator.model().is_instantiated());
    assert_eq!(evaluator.phase(), EvaluationPhase::Idle);
    assert_eq!(evaluator.model().parameter("syn_circ_nsyn").unwrap().value(), None);
    assert_eq!(evaluator.evaluation_count(), 1);
}

#[test]
fn test_repeated_evaluation_is_deterministic() {
    let mut evaluator = evaluator();
    let first = evaluator.evaluate_with_dicts(&values(7.0, 0.004)).unwrap();
    let other = evaluator.evaluate_with_dicts(&values(30.0, 0.002)).unwrap();
    let second = evaluator.evaluate_with_dicts(&values(7.0, 0.004)).unwrap();

    assert_eq!(first.fitness, second.fitness);
    assert_ne!(first.fitness, other.fitness);
    assert_eq!(first.responses, second.responses);
}

#[test]
fn test_synapse_free_circuit_stays_at_rest() {
    let mut evaluator = evaluator();
    let unstimulated = evaluator.evaluate_with_dicts(&values(0.0, 0.001)).unwrap();
    let stimulated = evaluator.evaluate_with_dicts(&values(15.0, 0.001)).unwrap();

    let feature = max_voltage_feature();
    let rest = feature
        .calculate_feature(unstimulated.responses.as_ref().unwrap())
        .unwrap();
    let peak = feature
        .calculate_feature(stimulated.responses.as_ref().unwrap())
        .unwrap();

    assert!(unstimulated.fitness.is_valid());
    assert!((rest - -70.0).abs() < 0.1, "resting maximum {}", rest);
    assert!(peak > rest + 1.0, "peak {} vs rest {}", peak, rest);
}

#[test]
fn test_list_values_follow_parameter_order() {
    let mut evaluator = evaluator();
    assert_eq!(
        evaluator.param_names(),
        vec!["syn_circ_nsyn".to_string(), "syn_circ_gmax".to_string()]
    );
    assert_eq!(
        evaluator.param_bounds(),
        vec![
            ("syn_circ_nsyn".to_string(), 0.0, 100.0),
            ("syn_circ_gmax".to_string(), 0.0, 0.01)
        ]
    );

    let from_list = evaluator.evaluate_with_lists(&[15.0, 0.001]).unwrap();
    let from_dict = evaluator.evaluate_with_dicts(&values(15.0, 0.001)).unwrap();
    assert_eq!(from_list.fitness, from_dict.fitness);

    assert!(matches!(
        evaluator.evaluate_with_lists(&[15.0]),
        Err(EvoError::Circuit(CircuitError::ParameterMismatch { .. }))
    ));
}

// ═══════════════════════════════════════════════════════════
// Failed candidates
// ═══════════════════════════════════════════════════════════

#[test]
fn test_out_of_bounds_candidate_is_invalid() {
    let mut evaluator = evaluator();
    let evaluation = evaluator.evaluate_with_dicts(&values(150.0, 0.001)).unwrap();

    assert!(!evaluation.fitness.is_valid());
    assert!(evaluation.scores.is_empty());
    assert_eq!(evaluator.fitness_value(&evaluation), 1.0e9);
    assert_eq!(evaluator.objective_values(&evaluation), vec![1.0e9, 1.0e9]);
    assert!(evaluator.simulator().live_handles().is_empty());

    // The evaluator stays usable
    assert!(evaluator
        .evaluate_with_dicts(&values(15.0, 0.001))
        .unwrap()
        .fitness
        .is_valid());
}

#[test]
fn test_simulator_failure_is_invalid_and_releases_everything() {
    let mut evaluator = evaluator_with(Box::new(FailingRunSimulator::new()), false).unwrap();
    let evaluation = evaluator.evaluate_with_dicts(&values(15.0, 0.001)).unwrap();

    match &evaluation.fitness {
        Fitness::Invalid { reason } => assert!(reason.contains("integration diverged")),
        Fitness::Valid(v) => panic!("expected invalid fitness, got {}", v),
    }
    assert!(evaluator.simulator().live_handles().is_empty());
    assert!(!evaluator.model().is_instantiated());
    assert_eq!(evaluator.phase(), EvaluationPhase::Idle);

    assert!(evaluator.run_protocols(&values(15.0, 0.001)).is_err());
    assert!(evaluator.simulator().live_handles().is_empty());
}

#[test]
fn test_missing_key_allocates_nothing() {
    let mut evaluator = evaluator();
    let mut partial: ParameterValues = values(15.0, 0.001);
    partial.remove("syn_circ_gmax");

    match evaluator.evaluate_with_dicts(&partial) {
        Err(EvoError::Circuit(CircuitError::ParameterMismatch { missing, unknown })) => {
            assert_eq!(missing, vec!["syn_circ_gmax".to_string()]);
            assert!(unknown.is_empty());
        }
        other => panic!("expected a parameter mismatch, got {:?}", other.map(|e| e.fitness)),
    }
    assert_eq!(evaluator.evaluation_count(), 0);
    assert!(evaluator.simulator().live_handles().is_empty());

    let mut extra = values(15.0, 0.001);
    extra.insert("syn_circ_tau".to_string(), 5.0);
    assert!(evaluator.evaluate_with_dicts(&extra).is_err());
}

#[test]
fn test_feature_without_recording_is_rejected() {
    let stray = synfit_evolutionary::EFeature::new(
        "dend_max",
        synfit_evolutionary::FeatureKind::MaximumVoltage,
        "step.dend.v",
        (20.0, 65.0),
        -60.0,
        1.0,
    )
    .unwrap();
    let result = CellEvaluator::new(
        common::synapse_circuit_model(),
        Box::new(StdSimulator::new()),
        vec![Box::new(common::step_protocol())],
        ObjectivesCalculator::new(vec![Box::new(SingletonObjective::new("dend", stray))]),
    );
    assert!(matches!(result, Err(EvoError::UnknownRecording(name)) if name == "step.dend.v"));
}

// ═══════════════════════════════════════════════════════════
// Populations
// ═══════════════════════════════════════════════════════════

#[test]
fn test_population_matches_sequential_evaluation() {
    let candidates: Vec<ParameterValues> = vec![
        values(0.0, 0.001),
        values(15.0, 0.001),
        values(150.0, 0.001),
        values(4.0, 0.008),
        values(15.0, 0.001),
    ];

    let parallel = evaluate_population(
        || evaluator_with(Box::new(StdSimulator::new()), false),
        &candidates,
        2,
    )
    .unwrap();

    let mut sequential = evaluator();
    assert_eq!(parallel.len(), candidates.len());
    for (candidate, result) in candidates.iter().zip(parallel) {
        let expected = sequential.evaluate_with_dicts(candidate).unwrap();
        assert_eq!(result.unwrap().fitness, expected.fitness);
    }
}

#[test]
fn test_population_reports_factory_failures() {
    let results = evaluate_population(
        || Err(EvoError::InvalidObjective("no objectives".to_string())),
        &[values(1.0, 0.001)],
        1,
    )
    .unwrap();
    assert!(matches!(&results[0], Err(EvoError::Worker(reason)) if reason.contains("no objectives")));
}
