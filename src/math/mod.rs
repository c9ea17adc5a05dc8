//! Mathematical utilities for laminate calculations

pub mod stats;

use nalgebra::{Matrix2, Matrix3, Matrix6, Vector3};

pub type Mat2 = Matrix2<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Mat6 = Matrix6<f64>;
pub type Vec3 = Vector3<f64>;

/// Pascals per GPa
pub const GPA: f64 = 1e9;
/// Pascals per MPa
pub const MPA: f64 = 1e6;
/// Metres per mm
pub const MM: f64 = 1e-3;

/// Stress transformation matrix T_σ(θ)
///
/// Rotates laminate-axis stresses [σx, σy, τxy] into material-axis
/// stresses [σ1, σ2, τ12]. Its inverse is T_σ(−θ).
///
/// # Arguments
/// * `angle_deg` - Ply orientation in degrees
pub fn stress_transform(angle_deg: f64) -> Mat3 {
    let (s, c) = angle_deg.to_radians().sin_cos();
    let c2 = c * c;
    let s2 = s * s;
    let cs = c * s;

    Mat3::new(
        c2,  s2,  2.0 * cs,
        s2,  c2,  -2.0 * cs,
        -cs, cs,  c2 - s2,
    )
}

/// Strain transformation matrix T_ε(θ) for engineering shear strain
///
/// Same rotation as [`stress_transform`] with the factor of 2 moved onto the
/// shear row, since γxy = 2εxy.
pub fn strain_transform(angle_deg: f64) -> Mat3 {
    let (s, c) = angle_deg.to_radians().sin_cos();
    let c2 = c * c;
    let s2 = s * s;
    let cs = c * s;

    Mat3::new(
        c2,        s2,       cs,
        s2,        c2,       -cs,
        -2.0 * cs, 2.0 * cs, c2 - s2,
    )
}

/// Assemble the 6x6 ABD matrix [A B; B D]
pub fn assemble_abd(a: &Mat3, b: &Mat3, d: &Mat3) -> Mat6 {
    let mut abd = Mat6::zeros();
    abd.fixed_view_mut::<3, 3>(0, 0).copy_from(a);
    abd.fixed_view_mut::<3, 3>(0, 3).copy_from(b);
    abd.fixed_view_mut::<3, 3>(3, 0).copy_from(b);
    abd.fixed_view_mut::<3, 3>(3, 3).copy_from(d);
    abd
}

/// Solve a 3x3 linear system using LU decomposition
pub fn solve3(a: &Mat3, b: &Vec3) -> Option<Vec3> {
    a.lu().solve(b)
}
