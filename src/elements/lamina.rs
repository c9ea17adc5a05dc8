//! Single-ply stiffness in material and laminate axes

use serde::{Deserialize, Serialize};

use crate::elements::{MaterialDatabase, MaterialSpec, StrengthLimits};
use crate::error::{CltError, CltResult};
use crate::math::{self, Mat3, GPA};
use crate::results::EngineeringConstants;

/// Lower bound applied to off-axis moduli in GPa
pub const MODULUS_FLOOR_GPA: f64 = 0.1;

/// A unidirectional ply's constitutive matrices in material axes (1-2).
///
/// Compliance is stored in 1/Pa and reduced stiffness in Pa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lamina {
    material: String,
    compliance: Mat3,
    stiffness: Mat3,
    strength: StrengthLimits,
}

impl Lamina {
    /// Build the lamina for a material
    pub fn new(material: &MaterialSpec) -> CltResult<Self> {
        material.validate()?;

        let e1 = material.e1 * GPA;
        let e2 = material.e2 * GPA;
        let g12 = material.g12 * GPA;
        let nu12 = material.nu12;
        let nu21 = material.nu21();

        let compliance = Mat3::new(
            1.0 / e1,     -nu12 / e1,  0.0,
            -nu21 / e2,   1.0 / e2,    0.0,
            0.0,          0.0,         1.0 / g12,
        );

        let stiffness = compliance
            .try_inverse()
            .ok_or(CltError::SingularStiffness)?;

        Ok(Self {
            material: material.id.clone(),
            compliance,
            stiffness,
            strength: material.strength,
        })
    }

    /// Build the lamina for a material id in the database
    pub fn from_database(db: &MaterialDatabase, id: &str) -> CltResult<Self> {
        Self::new(db.resolve(id)?)
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    /// Compliance matrix S in material axes (1/Pa)
    pub fn compliance(&self) -> &Mat3 {
        &self.compliance
    }

    /// Reduced stiffness matrix Q = S⁻¹ in material axes (Pa)
    pub fn stiffness(&self) -> &Mat3 {
        &self.stiffness
    }

    /// Strength limits in MPa, as given by the material
    pub fn strength(&self) -> StrengthLimits {
        self.strength
    }

    /// Transformed reduced stiffness Q̄(θ) = T_σ⁻¹ · Q · T_ε in laminate axes (Pa)
    pub fn q_bar(&self, angle_deg: f64) -> Mat3 {
        math::stress_transform(-angle_deg) * self.stiffness * math::strain_transform(angle_deg)
    }

    /// Off-axis engineering constants at `angle_deg`, in GPa.
    ///
    /// Closed-form from the compliance terms. Moduli are clamped to
    /// [`MODULUS_FLOOR_GPA`].
    pub fn effective_properties(&self, angle_deg: f64) -> EngineeringConstants {
        let s = &self.compliance;
        let s11 = s[(0, 0)];
        let s12 = s[(0, 1)];
        let s22 = s[(1, 1)];
        let s66 = s[(2, 2)];

        let (sn, c) = angle_deg.to_radians().sin_cos();
        let c2 = c * c;
        let s2 = sn * sn;
        let c4 = c2 * c2;
        let s4 = s2 * s2;
        let c2s2 = c2 * s2;

        let ex = 1.0 / (s11 * c4 + (2.0 * s12 + s66) * c2s2 + s22 * s4);
        let ey = 1.0 / (s11 * s4 + (2.0 * s12 + s66) * c2s2 + s22 * c4);
        let gxy = 1.0 / (4.0 * (s11 + s22 - 2.0 * s12) * c2s2 + s66 * (c2 - s2).powi(2));
        let s12_bar = s12 * (c4 + s4) + (s11 + s22 - s66) * c2s2;
        let nu_xy = -s12_bar * ex;

        EngineeringConstants {
            ex: (ex / GPA).max(MODULUS_FLOOR_GPA),
            ey: (ey / GPA).max(MODULUS_FLOOR_GPA),
            gxy: (gxy / GPA).max(MODULUS_FLOOR_GPA),
            nu_xy,
        }
    }
}
