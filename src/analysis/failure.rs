//! Ply failure criteria and laminate-level failure evaluation

use log::debug;

use crate::analysis::{FailureCriterion, FailureOptions};
use crate::elements::{Laminate, StrengthLimits};
use crate::error::{CltError, CltResult};
use crate::loads::LoadCase;
use crate::results::{DesignStatus, FailureResult, PlyFailure, PlyStressResult, ReserveRating};

use super::stress::recover_ply_stresses;

/// Safety factor reported when a ply is practically unloaded
pub const SAFETY_FACTOR_CAP: f64 = 999.0;

/// Upper end of the load scale bracket searched by [`find_allowable_load_scale`]
pub const ALLOWABLE_SCALE_MAX: f64 = 10.0;

/// Bracket width at which the allowable-load bisection stops
pub const ALLOWABLE_SCALE_TOLERANCE: f64 = 0.001;

const INDEX_EPSILON: f64 = 1e-6;

/// Tsai-Wu failure index for material-axis stresses in MPa.
///
/// `f12` is the normalized interaction coefficient; the interaction term is
/// −2·f12·σ1·σ2 / √(F1t·F1c·F2t·F2c), so a positive `f12` relieves
/// same-sign biaxial stress. Failure when the index reaches 1.
pub fn tsai_wu_index(sigma_1: f64, sigma_2: f64, tau_12: f64, s: &StrengthLimits, f12: f64) -> f64 {
    let quadratic = sigma_1 * sigma_1 / (s.f1t * s.f1c)
        + sigma_2 * sigma_2 / (s.f2t * s.f2c)
        + (tau_12 / s.f12s).powi(2);
    let linear = sigma_1 * (1.0 / s.f1t - 1.0 / s.f1c) + sigma_2 * (1.0 / s.f2t - 1.0 / s.f2c);
    let interaction = -2.0 * f12 * sigma_1 * sigma_2 / (s.f1t * s.f1c * s.f2t * s.f2c).sqrt();

    quadratic + linear + interaction
}

/// Maximum-stress failure index: the largest stress/strength ratio.
///
/// Normal stresses use the tensile or compressive strength matching their
/// sign; shear is compared by magnitude.
pub fn max_stress_index(sigma_1: f64, sigma_2: f64, tau_12: f64, s: &StrengthLimits) -> f64 {
    let ratio = |sigma: f64, tension: f64, compression: f64| {
        if sigma >= 0.0 {
            sigma / tension
        } else {
            -sigma / compression
        }
    };

    ratio(sigma_1, s.f1t, s.f1c)
        .max(ratio(sigma_2, s.f2t, s.f2c))
        .max(tau_12.abs() / s.f12s)
}

/// Safety factor 1/index, capped at [`SAFETY_FACTOR_CAP`] for indices below 1e-6
pub fn safety_factor(failure_index: f64) -> f64 {
    if failure_index < INDEX_EPSILON {
        SAFETY_FACTOR_CAP
    } else {
        1.0 / failure_index
    }
}

fn evaluate_ply(stress: PlyStressResult, strength: &StrengthLimits, options: &FailureOptions) -> PlyFailure {
    let tsai_wu = tsai_wu_index(
        stress.sigma_1,
        stress.sigma_2,
        stress.tau_12,
        strength,
        options.interaction_coefficient,
    );
    let max_stress = max_stress_index(stress.sigma_1, stress.sigma_2, stress.tau_12, strength);

    let governing = match options.criterion {
        FailureCriterion::TsaiWu => tsai_wu,
        FailureCriterion::MaxStress => max_stress,
    };

    PlyFailure {
        stress,
        tsai_wu_index: tsai_wu,
        max_stress_index: max_stress,
        safety_factor: safety_factor(governing),
        passed: governing < 1.0,
    }
}

/// Governing index of an evaluated ply under `criterion`
fn governing_index(ply: &PlyFailure, criterion: FailureCriterion) -> f64 {
    match criterion {
        FailureCriterion::TsaiWu => ply.tsai_wu_index,
        FailureCriterion::MaxStress => ply.max_stress_index,
    }
}

/// Evaluate every ply of `laminate` under `load`.
///
/// The critical ply is the one with the largest governing index (the first
/// one on ties). The reported maximum index is never below 0.
pub fn analyze_failure(
    laminate: &Laminate,
    load: &LoadCase,
    options: &FailureOptions,
) -> CltResult<FailureResult> {
    options.validate()?;

    let stresses = recover_ply_stresses(laminate, load)?;
    let plies: Vec<PlyFailure> = stresses
        .into_iter()
        .zip(laminate.plies())
        .map(|(stress, ply)| evaluate_ply(stress, &ply.strength, options))
        .collect();

    if plies.is_empty() {
        return Err(CltError::SingularStiffness);
    }

    let mut critical_ply = 0;
    let mut max_failure_index = f64::NEG_INFINITY;
    let mut min_safety_factor = SAFETY_FACTOR_CAP;
    for (i, ply) in plies.iter().enumerate() {
        let index = governing_index(ply, options.criterion);
        if index > max_failure_index {
            max_failure_index = index;
            critical_ply = i;
        }
        min_safety_factor = min_safety_factor.min(ply.safety_factor);
    }
    let max_failure_index = max_failure_index.max(0.0);

    Ok(FailureResult {
        criterion: options.criterion,
        plies,
        critical_ply,
        min_safety_factor,
        max_failure_index,
        passed: max_failure_index < 1.0,
        reserve_strength_percent: ((1.0 - max_failure_index) * 100.0).max(0.0),
        reserve_rating: ReserveRating::from_safety_factor(min_safety_factor),
        design_status: DesignStatus::from_safety_factor(min_safety_factor),
    })
}

/// Load scale at which the laminate's minimum safety factor reaches `target_sf`.
///
/// Bisection of the proportional scale on [0, 10] until the bracket is
/// narrower than 0.001; the upper end of the final bracket is returned.
pub fn find_allowable_load_scale(
    laminate: &Laminate,
    reference_load: &LoadCase,
    target_sf: f64,
    options: &FailureOptions,
) -> CltResult<f64> {
    if !(target_sf.is_finite() && target_sf > 0.0) {
        return Err(CltError::out_of_range(
            "target_sf",
            target_sf,
            "target safety factor must be positive",
        ));
    }

    let mut low = 0.0;
    let mut high = ALLOWABLE_SCALE_MAX;
    let mut iterations = 0;

    while high - low > ALLOWABLE_SCALE_TOLERANCE {
        let mid = 0.5 * (low + high);
        let result = analyze_failure(laminate, &reference_load.scaled(mid), options)?;
        if result.min_safety_factor < target_sf {
            high = mid;
        } else {
            low = mid;
        }
        iterations += 1;
    }

    debug!(
        "Allowable load scale for SF {:.3}: {:.4} ({} iterations)",
        target_sf, high, iterations
    );

    Ok(high)
}
