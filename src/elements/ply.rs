//! Stacking-sequence entries and physical plies

use serde::{Deserialize, Serialize};

use crate::elements::StrengthLimits;
use crate::math::Mat3;

/// Compact stacking description: `count` plies of `material` at `angle_deg`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlyAngleSpec {
    /// Material id in the material database
    pub material: String,
    /// Fiber orientation relative to the laminate x-axis in degrees
    pub angle_deg: f64,
    /// Number of consecutive identical plies
    pub count: usize,
    /// Per-entry ply thickness in mm; falls back to the laminate's uniform thickness
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness_mm: Option<f64>,
}

impl PlyAngleSpec {
    pub fn new(material: &str, angle_deg: f64, count: usize) -> Self {
        Self {
            material: material.to_string(),
            angle_deg,
            count,
            thickness_mm: None,
        }
    }

    /// A single ply
    pub fn single(material: &str, angle_deg: f64) -> Self {
        Self::new(material, angle_deg, 1)
    }

    /// Override the ply thickness for this entry
    pub fn with_thickness(mut self, thickness_mm: f64) -> Self {
        self.thickness_mm = Some(thickness_mm);
        self
    }

    /// Ply thickness to use given the laminate default
    pub fn ply_thickness_mm(&self, default_mm: f64) -> f64 {
        self.thickness_mm.unwrap_or(default_mm)
    }
}

/// One physical lamina inside a built laminate.
///
/// Thickness and z-coordinate are stored in metres; `q_bar` is the
/// transformed reduced stiffness in Pa, cached at assembly time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ply {
    /// Material id
    pub material: String,
    /// Orientation in degrees
    pub angle_deg: f64,
    /// Thickness in m
    pub thickness: f64,
    /// Mid-plane z coordinate of this ply in m (laminate midplane at z = 0)
    pub z_mid: f64,
    /// Transformed stiffness Q̄(θ) in Pa
    pub q_bar: Mat3,
    /// Strength limits of the ply material in MPa
    pub strength: StrengthLimits,
}

impl Ply {
    /// Bottom surface z coordinate in m
    pub fn z_bottom(&self) -> f64 {
        self.z_mid - self.thickness / 2.0
    }

    /// Top surface z coordinate in m
    pub fn z_top(&self) -> f64 {
        self.z_mid + self.thickness / 2.0
    }

    pub fn thickness_mm(&self) -> f64 {
        self.thickness * 1000.0
    }
}
