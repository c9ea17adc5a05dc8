//! Result types for laminate analysis

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::FailureCriterion;
use crate::math::{stats, Mat3, Mat6};

/// In-plane engineering constants in GPa
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineeringConstants {
    /// Modulus along x
    pub ex: f64,
    /// Modulus along y
    pub ey: f64,
    /// In-plane shear modulus
    pub gxy: f64,
    /// Poisson's ratio νxy
    pub nu_xy: f64,
}

/// Laminate-averaged effective properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveProperties {
    /// Membrane modulus along x in GPa
    pub ex: f64,
    /// Membrane modulus along y in GPa
    pub ey: f64,
    /// Membrane shear modulus in GPa
    pub gxy: f64,
    /// Poisson's ratio νxy
    pub nu_xy: f64,
    /// Total thickness in mm
    pub thickness_mm: f64,
    /// Number of physical plies
    pub ply_count: usize,
}

/// Laminate stiffness matrices in SI units
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StiffnessMatrices {
    /// Membrane stiffness A in N/m
    pub a: Mat3,
    /// Coupling stiffness B in N
    pub b: Mat3,
    /// Bending stiffness D in N·m
    pub d: Mat3,
    /// Combined [A B; B D]
    pub abd: Mat6,
}

/// Stress state of one ply under a membrane load case (MPa)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlyStressResult {
    /// Position in stacking order (0-based)
    pub ply_index: usize,
    /// Material id
    pub material: String,
    /// Orientation in degrees
    pub angle_deg: f64,
    /// Mid-plane z coordinate in mm
    pub z_mid_mm: f64,
    /// Laminate-axis normal stress σx
    pub sigma_x: f64,
    /// Laminate-axis normal stress σy
    pub sigma_y: f64,
    /// Laminate-axis shear stress τxy
    pub tau_xy: f64,
    /// Fiber-direction stress σ1
    pub sigma_1: f64,
    /// Transverse stress σ2
    pub sigma_2: f64,
    /// In-plane shear stress τ12
    pub tau_12: f64,
}

/// Classification of a reserve (safety) factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReserveRating {
    Critical,
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl ReserveRating {
    /// Band a safety factor: <1.0, <1.5, <2.0, <3.0, otherwise excellent
    pub fn from_safety_factor(sf: f64) -> Self {
        if sf < 1.0 {
            Self::Critical
        } else if sf < 1.5 {
            Self::Poor
        } else if sf < 2.0 {
            Self::Acceptable
        } else if sf < 3.0 {
            Self::Good
        } else {
            Self::Excellent
        }
    }
}

/// Coarse design verdict for a minimum safety factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesignStatus {
    /// SF above 1.5
    Safe,
    /// SF above 1.0 but not above 1.5
    Warning,
    /// SF of 1.0 or less
    Critical,
}

impl DesignStatus {
    pub fn from_safety_factor(sf: f64) -> Self {
        if sf > 1.5 {
            Self::Safe
        } else if sf > 1.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

/// Failure evaluation of one ply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlyFailure {
    /// Stresses this evaluation is based on
    pub stress: PlyStressResult,
    /// Tsai-Wu failure index
    pub tsai_wu_index: f64,
    /// Maximum-stress failure index
    pub max_stress_index: f64,
    /// Safety factor from the governing criterion
    pub safety_factor: f64,
    /// True when the governing index is below 1
    pub passed: bool,
}

/// Laminate failure evaluation under one load case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResult {
    /// Criterion used for safety factors and the critical ply
    pub criterion: FailureCriterion,
    /// Per-ply evaluation in stacking order
    pub plies: Vec<PlyFailure>,
    /// Index of the ply with the largest governing index
    pub critical_ply: usize,
    /// Smallest ply safety factor
    pub min_safety_factor: f64,
    /// Largest governing failure index
    pub max_failure_index: f64,
    /// True when no ply reaches an index of 1
    pub passed: bool,
    /// max(0, (1 − max index) · 100)
    pub reserve_strength_percent: f64,
    /// Rating of the minimum safety factor
    pub reserve_rating: ReserveRating,
    /// Design verdict of the minimum safety factor
    pub design_status: DesignStatus,
}

impl FailureResult {
    /// The critical ply's evaluation
    pub fn critical(&self) -> &PlyFailure {
        &self.plies[self.critical_ply]
    }

    /// Orientation of the critical ply in degrees
    pub fn critical_angle_deg(&self) -> f64 {
        self.critical().stress.angle_deg
    }
}

/// Summary statistics of one Monte-Carlo output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// First sample (the unperturbed baseline)
    pub nominal: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q05: f64,
    pub q25: f64,
    pub q75: f64,
    pub q95: f64,
    /// Coefficient of variation std/mean (0 when mean ≤ 0)
    pub cv: f64,
}

impl Statistics {
    /// Aggregate samples; `None` when there are none
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let nominal = *samples.first()?;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = stats::mean(samples);
        let std_dev = stats::std_dev(samples);
        let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };

        Some(Self {
            nominal,
            mean,
            median: stats::percentile(&sorted, 50.0),
            std_dev,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            q05: stats::percentile(&sorted, 5.0),
            q25: stats::percentile(&sorted, 25.0),
            q75: stats::percentile(&sorted, 75.0),
            q95: stats::percentile(&sorted, 95.0),
            cv,
        })
    }
}

/// Two-sided confidence interval around a sample mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub level: f64,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Which ply governed failure across Monte-Carlo trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPlyDistribution {
    /// Ply index that was critical most often (lowest index on ties)
    pub most_critical_ply: usize,
    /// Ply index → number of trials in which it was critical
    pub frequency: BTreeMap<usize, usize>,
    /// Mean critical ply index
    pub mean_critical_ply: f64,
}

impl CriticalPlyDistribution {
    pub fn from_indices(indices: &[usize]) -> Option<Self> {
        if indices.is_empty() {
            return None;
        }

        let mut frequency = BTreeMap::new();
        for &i in indices {
            *frequency.entry(i).or_insert(0) += 1;
        }

        let (&most_critical_ply, _) = frequency
            .iter()
            .max_by(|(ia, ca), (ib, cb)| ca.cmp(cb).then(ib.cmp(ia)))?;

        let mean_critical_ply =
            indices.iter().map(|&i| i as f64).sum::<f64>() / indices.len() as f64;

        Some(Self {
            most_critical_ply,
            frequency,
            mean_critical_ply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reserve_rating_bands() {
        assert_eq!(ReserveRating::from_safety_factor(0.99), ReserveRating::Critical);
        assert_eq!(ReserveRating::from_safety_factor(1.0), ReserveRating::Poor);
        assert_eq!(ReserveRating::from_safety_factor(1.5), ReserveRating::Acceptable);
        assert_eq!(ReserveRating::from_safety_factor(2.5), ReserveRating::Good);
        assert_eq!(ReserveRating::from_safety_factor(3.0), ReserveRating::Excellent);
        assert_eq!(ReserveRating::from_safety_factor(999.0), ReserveRating::Excellent);
    }

    #[test]
    fn test_design_status() {
        assert_eq!(DesignStatus::from_safety_factor(1.6), DesignStatus::Safe);
        assert_eq!(DesignStatus::from_safety_factor(1.5), DesignStatus::Warning);
        assert_eq!(DesignStatus::from_safety_factor(1.0), DesignStatus::Critical);
    }

    #[test]
    fn test_statistics_from_samples() {
        let stats = Statistics::from_samples(&[3.0, 1.0, 2.0, 4.0]).unwrap();
        assert_eq!(stats.nominal, 3.0);
        assert_relative_eq!(stats.mean, 2.5);
        assert_relative_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_relative_eq!(stats.q25, 1.75);
        assert_relative_eq!(stats.q75, 3.25);
        assert_relative_eq!(stats.cv, stats.std_dev / 2.5);
        assert!(Statistics::from_samples(&[]).is_none());
    }

    #[test]
    fn test_cv_zero_for_non_positive_mean() {
        let stats = Statistics::from_samples(&[-1.0, -2.0, -3.0]).unwrap();
        assert_eq!(stats.cv, 0.0);
    }

    #[test]
    fn test_critical_ply_distribution() {
        let dist = CriticalPlyDistribution::from_indices(&[0, 7, 0, 7, 3]).unwrap();
        assert_eq!(dist.most_critical_ply, 0);
        assert_eq!(dist.frequency[&7], 2);
        assert_eq!(dist.frequency.len(), 3);
        assert_relative_eq!(dist.mean_critical_ply, 17.0 / 5.0);
        assert!(CriticalPlyDistribution::from_indices(&[]).is_none());
    }
}
