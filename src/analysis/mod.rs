//! Analysis types and options

mod failure;
mod sensitivity;
mod stress;
mod tolerance;

pub use failure::{
    analyze_failure, find_allowable_load_scale, max_stress_index, safety_factor, tsai_wu_index,
    ALLOWABLE_SCALE_MAX, ALLOWABLE_SCALE_TOLERANCE, SAFETY_FACTOR_CAP,
};
pub use sensitivity::{
    analyze_sensitivity, PropertySensitivity, SensitivityParameter, SensitivityResult,
};
pub use stress::{midplane_strain, recover_ply_stresses};
pub use tolerance::{
    FailureToleranceResult, SampleSet, ToleranceResult, ToleranceSample, ToleranceStudy,
    TrackedProperty,
};

use serde::{Deserialize, Serialize};

use crate::error::{CltError, CltResult};
use crate::loads::LoadCase;

/// Upper limit on Monte-Carlo trials per study
pub const MAX_SAMPLES: usize = 5000;

/// Failure criterion that governs safety factors and pass/fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCriterion {
    /// Quadratic interaction criterion
    TsaiWu,
    /// Independent component-wise strength check
    MaxStress,
}

impl Default for FailureCriterion {
    fn default() -> Self {
        Self::TsaiWu
    }
}

/// Options for laminate failure evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureOptions {
    /// Governing criterion
    pub criterion: FailureCriterion,
    /// Normalized Tsai-Wu interaction coefficient f12, |f12| < 1
    pub interaction_coefficient: f64,
}

impl Default for FailureOptions {
    fn default() -> Self {
        Self {
            criterion: FailureCriterion::TsaiWu,
            interaction_coefficient: 0.0,
        }
    }
}

impl FailureOptions {
    /// Options for a given governing criterion
    pub fn new(criterion: FailureCriterion) -> Self {
        Self {
            criterion,
            ..Self::default()
        }
    }

    /// Set the Tsai-Wu interaction coefficient
    pub fn with_interaction(mut self, f12: f64) -> Self {
        self.interaction_coefficient = f12;
        self
    }

    pub fn validate(&self) -> CltResult<()> {
        let f12 = self.interaction_coefficient;
        if !(f12.is_finite() && f12.abs() < 1.0) {
            return Err(CltError::out_of_range(
                "interaction_coefficient",
                f12,
                "normalized f12 must lie in (-1, 1)",
            ));
        }
        Ok(())
    }
}

/// Options for Monte-Carlo tolerance studies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceOptions {
    /// Number of trials including the nominal one
    pub sample_count: usize,
    /// Standard deviation of ply angle scatter in degrees
    pub angle_tolerance_deg: f64,
    /// Standard deviation of ply thickness scatter in percent
    pub thickness_tolerance_pct: f64,
    /// Standard deviation of E1/E2/G12 scatter in percent
    pub material_variation_pct: f64,
    /// Base seed for the per-trial random streams
    pub seed: u64,
    /// Load case for failure tolerance studies
    pub reference_load: Option<LoadCase>,
    /// Failure evaluation options used with `reference_load`
    pub failure: FailureOptions,
}

impl Default for ToleranceOptions {
    fn default() -> Self {
        Self {
            sample_count: 500,
            angle_tolerance_deg: 1.0,
            thickness_tolerance_pct: 5.0,
            material_variation_pct: 5.0,
            seed: 42,
            reference_load: None,
            failure: FailureOptions::default(),
        }
    }
}

impl ToleranceOptions {
    /// Set the number of trials
    pub fn with_samples(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Set the ply angle standard deviation in degrees
    pub fn with_angle_tolerance(mut self, deg: f64) -> Self {
        self.angle_tolerance_deg = deg;
        self
    }

    /// Set the ply thickness standard deviation in percent
    pub fn with_thickness_tolerance(mut self, pct: f64) -> Self {
        self.thickness_tolerance_pct = pct;
        self
    }

    /// Set the material modulus standard deviation in percent
    pub fn with_material_variation(mut self, pct: f64) -> Self {
        self.material_variation_pct = pct;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Evaluate failure against `load` in every trial
    pub fn with_reference_load(mut self, load: LoadCase) -> Self {
        self.reference_load = Some(load);
        self
    }

    pub fn with_failure_options(mut self, failure: FailureOptions) -> Self {
        self.failure = failure;
        self
    }

    /// No scatter at all; every trial reproduces the nominal laminate
    pub fn without_scatter(self) -> Self {
        self.with_angle_tolerance(0.0)
            .with_thickness_tolerance(0.0)
            .with_material_variation(0.0)
    }

    /// Check ranges before sampling
    pub fn validate(&self) -> CltResult<()> {
        if self.sample_count == 0 || self.sample_count > MAX_SAMPLES {
            return Err(CltError::out_of_range(
                "sample_count",
                self.sample_count as f64,
                format!("must be between 1 and {}", MAX_SAMPLES),
            ));
        }

        let angle = self.angle_tolerance_deg;
        if !(angle.is_finite() && angle >= 0.0) {
            return Err(CltError::out_of_range(
                "angle_tolerance_deg",
                angle,
                "must be a non-negative number of degrees",
            ));
        }

        for (name, pct) in [
            ("thickness_tolerance_pct", self.thickness_tolerance_pct),
            ("material_variation_pct", self.material_variation_pct),
        ] {
            if !(pct.is_finite() && (0.0..=100.0).contains(&pct)) {
                return Err(CltError::out_of_range(name, pct, "must be between 0 and 100 %"));
            }
        }

        self.failure.validate()
    }
}
