// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Isopotential compartment update
//!
//! Units follow the usual conventions: conductance densities in S/cm²,
//! capacitance in µF/cm², time in ms, potentials in mV.

/// Convert a point conductance (µS) into a density (S/cm²) over `area` µm²
#[inline]
pub fn conductance_density(g_us: f64, area_um2: f64) -> f64 {
    g_us * 100.0 / area_um2
}

/// Exponential-Euler step of `cm dV/dt = -Σ g_i (V - e_i)`
///
/// `g_total` is `Σ g_i` and `ge_total` is `Σ g_i e_i`. The update is exact for
/// conductances held constant over the step.
#[inline]
pub fn exponential_euler(v: f64, g_total: f64, ge_total: f64, cm: f64, dt: f64) -> f64 {
    if g_total <= 0.0 {
        return v;
    }
    let v_inf = ge_total / g_total;
    let tau = cm / (1000.0 * g_total);
    v_inf + (v - v_inf) * (-dt / tau).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relaxes_to_reversal() {
        let mut v = -65.0;
        for _ in 0..1000 {
            v = exponential_euler(v, 0.001, 0.001 * -70.0, 1.0, 0.025);
        }
        assert!((v - -70.0).abs() < 1e-6);
    }

    #[test]
    fn test_one_time_constant() {
        // tau = cm / (1000 g) = 1 ms
        let v = exponential_euler(0.0, 0.001, 0.001 * -10.0, 1.0, 1.0);
        let expected = -10.0 + 10.0 * (-1.0f64).exp();
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn test_no_conductance_holds_voltage() {
        assert_eq!(exponential_euler(-42.0, 0.0, 0.0, 1.0, 0.1), -42.0);
    }

    #[test]
    fn test_conductance_density() {
        // 1 µS over 100 µm² is 1 S/cm²
        assert!((conductance_density(1.0, 100.0) - 1.0).abs() < 1e-12);
    }
}
