//! Laminate stack assembly and ABD stiffness synthesis

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::elements::{Lamina, MaterialDatabase, Ply, PlyAngleSpec};
use crate::error::{CltError, CltResult};
use crate::math::{self, Mat2, Mat3, Mat6, GPA, MM};
use crate::results::{EffectiveProperties, StiffnessMatrices};

/// Upper limit on physical plies in one laminate, after mirroring and repeats
pub const MAX_PLIES: usize = 1000;

/// An immutable stack of plies with its A, B and D stiffness matrices.
///
/// Plies are ordered from the bottom face (z = −h/2) to the top face
/// (z = +h/2). A is in N/m, B in N, D in N·m.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laminate {
    plies: Vec<Ply>,
    a: Mat3,
    b: Mat3,
    d: Mat3,
    properties: EffectiveProperties,
    symmetric: bool,
}

impl Laminate {
    /// Build a laminate from a compact stacking description.
    ///
    /// # Arguments
    /// * `db` - Material database used to resolve material ids
    /// * `specs` - Stacking entries; the half-stack when `symmetric` is set
    /// * `ply_thickness_mm` - Uniform ply thickness for entries without an override
    /// * `symmetric` - Mirror `specs` about the midplane before expansion
    pub fn build(
        db: &MaterialDatabase,
        specs: &[PlyAngleSpec],
        ply_thickness_mm: f64,
        symmetric: bool,
    ) -> CltResult<Self> {
        let stack = if symmetric {
            mirror_stack(specs)
        } else {
            specs.to_vec()
        };
        let plies = expand_plies(db, &stack, ply_thickness_mm)?;
        Self::from_plies(plies, symmetric)
    }

    /// Integrate already positioned plies into a laminate
    pub fn from_plies(plies: Vec<Ply>, symmetric: bool) -> CltResult<Self> {
        let mut a = Mat3::zeros();
        let mut b = Mat3::zeros();
        let mut d = Mat3::zeros();

        for ply in &plies {
            let t = ply.thickness;
            let z = ply.z_mid;
            a += ply.q_bar * t;
            b += ply.q_bar * (z * t);
            d += ply.q_bar * ((z * z + t * t / 12.0) * t);
        }

        let thickness: f64 = plies.iter().map(|p| p.thickness).sum();
        let properties = effective_properties(&a, thickness, plies.len())?;

        debug!(
            "Assembled laminate: {} plies, h = {:.4} mm, Ex = {:.3} GPa, Ey = {:.3} GPa",
            properties.ply_count, properties.thickness_mm, properties.ex, properties.ey
        );

        Ok(Self {
            plies,
            a,
            b,
            d,
            properties,
            symmetric,
        })
    }

    /// Physical plies in stacking order
    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    pub fn ply_count(&self) -> usize {
        self.plies.len()
    }

    /// Total thickness in m
    pub fn thickness(&self) -> f64 {
        self.properties.thickness_mm * MM
    }

    /// Whether the laminate was built by mirroring a half-stack
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Membrane stiffness A (N/m)
    pub fn a(&self) -> &Mat3 {
        &self.a
    }

    /// Membrane-bending coupling B (N)
    pub fn b(&self) -> &Mat3 {
        &self.b
    }

    /// Bending stiffness D (N·m)
    pub fn d(&self) -> &Mat3 {
        &self.d
    }

    /// Combined 6x6 [A B; B D]
    pub fn abd(&self) -> Mat6 {
        math::assemble_abd(&self.a, &self.b, &self.d)
    }

    pub fn stiffness_matrices(&self) -> StiffnessMatrices {
        StiffnessMatrices {
            a: self.a,
            b: self.b,
            d: self.d,
            abd: self.abd(),
        }
    }

    /// Laminate-averaged engineering constants
    pub fn properties(&self) -> &EffectiveProperties {
        &self.properties
    }
}

/// Append the mirror image of a half-stack: reversed order, same angles
pub fn mirror_stack(half: &[PlyAngleSpec]) -> Vec<PlyAngleSpec> {
    half.iter().chain(half.iter().rev()).cloned().collect()
}

/// Expand repeat counts into plies centered on z = 0
fn expand_plies(
    db: &MaterialDatabase,
    stack: &[PlyAngleSpec],
    default_thickness_mm: f64,
) -> CltResult<Vec<Ply>> {
    if !(default_thickness_mm.is_finite() && default_thickness_mm > 0.0) {
        return Err(CltError::out_of_range(
            "ply_thickness_mm",
            default_thickness_mm,
            "ply thickness must be positive",
        ));
    }

    let ply_count = stack
        .iter()
        .fold(0usize, |acc, spec| acc.saturating_add(spec.count));
    if ply_count > MAX_PLIES {
        return Err(CltError::out_of_range(
            "ply_count",
            ply_count as f64,
            format!("a laminate holds at most {} plies", MAX_PLIES),
        ));
    }

    let mut laminae: HashMap<&str, Lamina> = HashMap::new();
    let mut layers: Vec<(&PlyAngleSpec, &Lamina, f64)> = Vec::with_capacity(ply_count);

    for spec in stack {
        if !spec.angle_deg.is_finite() {
            return Err(CltError::out_of_range(
                "angle_deg",
                spec.angle_deg,
                "ply angle must be finite",
            ));
        }
        let t_mm = spec.ply_thickness_mm(default_thickness_mm);
        if !(t_mm.is_finite() && t_mm > 0.0) {
            return Err(CltError::out_of_range(
                "thickness_mm",
                t_mm,
                "ply thickness must be positive",
            ));
        }
        if !laminae.contains_key(spec.material.as_str()) {
            laminae.insert(
                spec.material.as_str(),
                Lamina::from_database(db, &spec.material)?,
            );
        }
    }

    for spec in stack {
        let lamina = &laminae[spec.material.as_str()];
        let t = spec.ply_thickness_mm(default_thickness_mm) * MM;
        for _ in 0..spec.count {
            layers.push((spec, lamina, t));
        }
    }

    let total: f64 = layers.iter().map(|(_, _, t)| t).sum();
    let mut z = -total / 2.0;

    let plies = layers
        .into_iter()
        .map(|(spec, lamina, t)| {
            let ply = Ply {
                material: spec.material.clone(),
                angle_deg: spec.angle_deg,
                thickness: t,
                z_mid: z + t / 2.0,
                q_bar: lamina.q_bar(spec.angle_deg),
                strength: lamina.strength(),
            };
            z += t;
            ply
        })
        .collect();

    Ok(plies)
}

/// Effective membrane constants from the in-plane block of A.
///
/// Ex, Ey and νxy come from the inverted 2x2 block, Gxy from A66.
fn effective_properties(a: &Mat3, thickness: f64, ply_count: usize) -> CltResult<EffectiveProperties> {
    if !(thickness > 0.0) {
        return Err(CltError::SingularStiffness);
    }

    let in_plane = Mat2::new(a[(0, 0)], a[(0, 1)], a[(1, 0)], a[(1, 1)]);
    let inv = in_plane.try_inverse().ok_or(CltError::SingularStiffness)?;
    if inv[(0, 0)] <= 0.0 || inv[(1, 1)] <= 0.0 || a[(2, 2)] <= 0.0 {
        return Err(CltError::SingularStiffness);
    }

    Ok(EffectiveProperties {
        ex: 1.0 / (thickness * inv[(0, 0)]) / GPA,
        ey: 1.0 / (thickness * inv[(1, 1)]) / GPA,
        gxy: a[(2, 2)] / thickness / GPA,
        nu_xy: -inv[(0, 1)] / inv[(0, 0)],
        thickness_mm: thickness / MM,
        ply_count,
    })
}
