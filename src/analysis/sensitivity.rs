//! One-at-a-time sensitivity of the effective properties
//!
//! A single manufacturing parameter is shifted by a fixed amount across the
//! whole stack, the laminate is rebuilt and every effective constant is
//! compared against the nominal build. Angle shifts are in degrees, thickness
//! and material shifts in percent.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::TrackedProperty;
use crate::elements::{Laminate, MaterialDatabase, PlyAngleSpec};
use crate::error::{CltError, CltResult};
use crate::results::EffectiveProperties;

/// Manufacturing parameter shifted by a sensitivity run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensitivityParameter {
    /// Rigid rotation of every ply, in degrees
    Angle,
    /// Every ply thickness, in percent
    Thickness,
    /// E1, E2 and G12 of every material used, in percent
    Material,
}

impl SensitivityParameter {
    pub const ALL: [SensitivityParameter; 3] = [Self::Angle, Self::Thickness, Self::Material];

    /// Shift used when the caller has no preference
    pub fn default_perturbation(self) -> f64 {
        match self {
            Self::Angle => 1.0,
            Self::Thickness | Self::Material => 10.0,
        }
    }

    fn validate(self, perturbation: f64) -> CltResult<()> {
        let (ok, reason) = match self {
            Self::Angle => (
                perturbation != 0.0 && perturbation.abs() <= 90.0,
                "angle shift must be non-zero and within ±90°",
            ),
            Self::Thickness | Self::Material => (
                perturbation != 0.0 && perturbation > -100.0 && perturbation <= 100.0,
                "percentage shift must be non-zero, above -100 % and at most 100 %",
            ),
        };
        if ok && perturbation.is_finite() {
            Ok(())
        } else {
            Err(CltError::out_of_range("perturbation", perturbation, reason))
        }
    }
}

/// Response of one property to the shift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertySensitivity {
    pub nominal: f64,
    pub perturbed: f64,
    /// (perturbed − nominal) / nominal; 0 when the nominal value is 0
    pub relative_change: f64,
    /// Relative change per unit of shift (per degree or per percent)
    pub coefficient: f64,
}

impl PropertySensitivity {
    fn new(nominal: f64, perturbed: f64, perturbation: f64) -> Self {
        let relative_change = if nominal != 0.0 {
            (perturbed - nominal) / nominal
        } else {
            0.0
        };
        Self {
            nominal,
            perturbed,
            relative_change,
            coefficient: relative_change / perturbation,
        }
    }
}

/// Outcome of a one-at-a-time sensitivity run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub parameter: SensitivityParameter,
    /// Applied shift in degrees or percent
    pub perturbation: f64,
    pub nominal: EffectiveProperties,
    pub perturbed: EffectiveProperties,
    pub ex: PropertySensitivity,
    pub ey: PropertySensitivity,
    pub gxy: PropertySensitivity,
    pub nu_xy: PropertySensitivity,
    pub thickness_mm: PropertySensitivity,
}

impl SensitivityResult {
    /// Sensitivity of a stiffness or thickness property; `None` for failure outputs
    pub fn property(&self, property: TrackedProperty) -> Option<&PropertySensitivity> {
        match property {
            TrackedProperty::Ex => Some(&self.ex),
            TrackedProperty::Ey => Some(&self.ey),
            TrackedProperty::Gxy => Some(&self.gxy),
            TrackedProperty::NuXy => Some(&self.nu_xy),
            TrackedProperty::ThicknessMm => Some(&self.thickness_mm),
            TrackedProperty::SafetyFactor | TrackedProperty::FailureIndex => None,
        }
    }

    /// Stiffness property with the largest relative response
    pub fn dominant_property(&self) -> TrackedProperty {
        [
            (TrackedProperty::Ex, &self.ex),
            (TrackedProperty::Ey, &self.ey),
            (TrackedProperty::Gxy, &self.gxy),
            (TrackedProperty::NuXy, &self.nu_xy),
        ]
        .iter()
        .fold((TrackedProperty::Ex, 0.0_f64), |best, (property, s)| {
            if s.relative_change.abs() > best.1 {
                (*property, s.relative_change.abs())
            } else {
                best
            }
        })
        .0
    }
}

/// Shift `parameter` by `perturbation` across the stack and compare the
/// rebuilt laminate with the nominal one.
///
/// `specs` is the half-stack when `symmetric` is set, exactly as for
/// [`Laminate::build`]. The database is not modified.
pub fn analyze_sensitivity(
    db: &MaterialDatabase,
    specs: &[PlyAngleSpec],
    ply_thickness_mm: f64,
    symmetric: bool,
    parameter: SensitivityParameter,
    perturbation: f64,
) -> CltResult<SensitivityResult> {
    parameter.validate(perturbation)?;
    let nominal = *Laminate::build(db, specs, ply_thickness_mm, symmetric)?.properties();

    let perturbed = match parameter {
        SensitivityParameter::Angle => {
            let shifted: Vec<PlyAngleSpec> = specs
                .iter()
                .map(|spec| PlyAngleSpec {
                    angle_deg: spec.angle_deg + perturbation,
                    ..spec.clone()
                })
                .collect();
            Laminate::build(db, &shifted, ply_thickness_mm, symmetric)?
        }
        SensitivityParameter::Thickness => {
            let factor = 1.0 + perturbation / 100.0;
            let scaled: Vec<PlyAngleSpec> = specs
                .iter()
                .map(|spec| spec.clone().with_thickness(spec.ply_thickness_mm(ply_thickness_mm) * factor))
                .collect();
            Laminate::build(db, &scaled, ply_thickness_mm, symmetric)?
        }
        SensitivityParameter::Material => {
            let factor = 1.0 + perturbation / 100.0;
            let mut scaled_db = db.clone();
            let ids: HashSet<&str> = specs.iter().map(|spec| spec.material.as_str()).collect();
            for id in ids {
                let mut material = db.resolve(id)?.clone();
                material.e1 *= factor;
                material.e2 *= factor;
                material.g12 *= factor;
                scaled_db = scaled_db.with_material(material);
            }
            Laminate::build(&scaled_db, specs, ply_thickness_mm, symmetric)?
        }
    };
    let perturbed = *perturbed.properties();

    let result = SensitivityResult {
        parameter,
        perturbation,
        nominal,
        perturbed,
        ex: PropertySensitivity::new(nominal.ex, perturbed.ex, perturbation),
        ey: PropertySensitivity::new(nominal.ey, perturbed.ey, perturbation),
        gxy: PropertySensitivity::new(nominal.gxy, perturbed.gxy, perturbation),
        nu_xy: PropertySensitivity::new(nominal.nu_xy, perturbed.nu_xy, perturbation),
        thickness_mm: PropertySensitivity::new(nominal.thickness_mm, perturbed.thickness_mm, perturbation),
    };

    debug!(
        "Sensitivity to {:?} ({:+}): Ex {:+.4}%, Ey {:+.4}%, Gxy {:+.4}%, νxy {:+.4}%",
        parameter,
        perturbation,
        result.ex.relative_change * 100.0,
        result.ey.relative_change * 100.0,
        result.gxy.relative_change * 100.0,
        result.nu_xy.relative_change * 100.0
    );

    Ok(result)
}
