//! In-plane membrane load cases

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Membrane force resultants per unit width (N/m)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadCase {
    /// Normal force resultant along x
    pub nx: f64,
    /// Normal force resultant along y
    pub ny: f64,
    /// In-plane shear force resultant
    pub nxy: f64,
}

impl LoadCase {
    /// Create a new load case
    pub fn new(nx: f64, ny: f64, nxy: f64) -> Self {
        Self { nx, ny, nxy }
    }

    /// Uniaxial load along x
    pub fn uniaxial_x(nx: f64) -> Self {
        Self::new(nx, 0.0, 0.0)
    }

    /// Uniaxial load along y
    pub fn uniaxial_y(ny: f64) -> Self {
        Self::new(0.0, ny, 0.0)
    }

    /// Pure in-plane shear
    pub fn shear(nxy: f64) -> Self {
        Self::new(0.0, 0.0, nxy)
    }

    /// Equal biaxial load
    pub fn biaxial(n: f64) -> Self {
        Self::new(n, n, 0.0)
    }

    /// Proportionally scaled copy
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.nx * factor, self.ny * factor, self.nxy * factor)
    }

    /// Force vector [Nx, Ny, Nxy]
    pub fn as_vector(&self) -> Vec3 {
        Vec3::new(self.nx, self.ny, self.nxy)
    }

    /// True when every component is zero
    pub fn is_zero(&self) -> bool {
        self.nx == 0.0 && self.ny == 0.0 && self.nxy == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled() {
        let load = LoadCase::new(1000.0, -200.0, 50.0).scaled(2.5);
        assert_eq!(load, LoadCase::new(2500.0, -500.0, 125.0));
    }

    #[test]
    fn test_constructors() {
        assert_eq!(LoadCase::uniaxial_x(5.0).as_vector(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(LoadCase::shear(3.0).nxy, 3.0);
        assert!(LoadCase::default().is_zero());
        assert!(!LoadCase::biaxial(1.0).is_zero());
    }
}
