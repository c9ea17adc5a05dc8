//! Midplane strain and ply stress recovery under membrane loads

use crate::elements::Laminate;
use crate::error::{CltError, CltResult};
use crate::loads::LoadCase;
use crate::math::{self, Vec3, MM, MPA};
use crate::results::PlyStressResult;

/// Solve A·ε⁰ = N for the midplane strain [εx, εy, γxy]
pub fn midplane_strain(laminate: &Laminate, load: &LoadCase) -> CltResult<Vec3> {
    math::solve3(laminate.a(), &load.as_vector()).ok_or(CltError::SingularStiffness)
}

/// Stresses in every ply, in stacking order, under a pure membrane load.
///
/// Laminate-axis stresses are Q̄·ε⁰; material-axis stresses are T_σ(θ)
/// applied to those. All values in MPa.
pub fn recover_ply_stresses(laminate: &Laminate, load: &LoadCase) -> CltResult<Vec<PlyStressResult>> {
    let strain = midplane_strain(laminate, load)?;

    let results = laminate
        .plies()
        .iter()
        .enumerate()
        .map(|(i, ply)| {
            let global = ply.q_bar * strain;
            let local = math::stress_transform(ply.angle_deg) * global;
            PlyStressResult {
                ply_index: i,
                material: ply.material.clone(),
                angle_deg: ply.angle_deg,
                z_mid_mm: ply.z_mid / MM,
                sigma_x: global[0] / MPA,
                sigma_y: global[1] / MPA,
                tau_xy: global[2] / MPA,
                sigma_1: local[0] / MPA,
                sigma_2: local[1] / MPA,
                tau_12: local[2] / MPA,
            }
        })
        .collect();

    Ok(results)
}
