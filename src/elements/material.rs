//! Orthotropic ply materials and the material database

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CltError, CltResult};

/// Strength limits of a unidirectional ply in material axes (MPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthLimits {
    /// Tensile strength along the fibers
    pub f1t: f64,
    /// Compressive strength along the fibers (positive value)
    pub f1c: f64,
    /// Tensile strength transverse to the fibers
    pub f2t: f64,
    /// Compressive strength transverse to the fibers (positive value)
    pub f2c: f64,
    /// In-plane shear strength
    pub f12s: f64,
}

impl StrengthLimits {
    pub fn new(f1t: f64, f1c: f64, f2t: f64, f2c: f64, f12s: f64) -> Self {
        Self {
            f1t,
            f1c,
            f2t,
            f2c,
            f12s,
        }
    }

    /// Typical carbon/epoxy values (AS4/3501-6 class)
    pub fn carbon_epoxy() -> Self {
        Self::new(2250.0, 1500.0, 50.0, 250.0, 100.0)
    }
}

/// Orthotropic material properties of a single ply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Short identifier used in stacking sequences (e.g. "M40J")
    pub id: String,
    /// Display name
    pub name: String,
    /// Longitudinal modulus E1 in GPa
    pub e1: f64,
    /// Transverse modulus E2 in GPa
    pub e2: f64,
    /// Major Poisson's ratio ν12
    pub nu12: f64,
    /// In-plane shear modulus G12 in GPa
    pub g12: f64,
    /// Density in g/cm³
    pub density: f64,
    /// Strength limits in MPa
    pub strength: StrengthLimits,
}

impl MaterialSpec {
    /// Create a material with the default carbon/epoxy strength set
    pub fn new(id: &str, name: &str, e1: f64, e2: f64, nu12: f64, g12: f64, density: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            e1,
            e2,
            nu12,
            g12,
            density,
            strength: StrengthLimits::carbon_epoxy(),
        }
    }

    /// Replace the strength limits
    pub fn with_strength(mut self, strength: StrengthLimits) -> Self {
        self.strength = strength;
        self
    }

    /// Minor Poisson's ratio from reciprocity: ν21 = ν12 · E2 / E1
    pub fn nu21(&self) -> f64 {
        self.nu12 * self.e2 / self.e1
    }

    /// Check that the constants describe a physically admissible ply
    pub fn validate(&self) -> CltResult<()> {
        for (name, value) in [("e1", self.e1), ("e2", self.e2), ("g12", self.g12)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CltError::out_of_range(name, value, "modulus must be positive"));
            }
        }

        let s = &self.strength;
        for (name, value) in [
            ("f1t", s.f1t),
            ("f1c", s.f1c),
            ("f2t", s.f2t),
            ("f2c", s.f2c),
            ("f12s", s.f12s),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CltError::out_of_range(name, value, "strength must be positive"));
            }
        }

        // Positive-definite compliance requires ν12·ν21 < 1
        if !self.nu12.is_finite() || self.nu12 * self.nu21() >= 1.0 {
            return Err(CltError::out_of_range(
                "nu12",
                self.nu12,
                "ν12·ν21 must be below 1",
            ));
        }

        Ok(())
    }

    pub fn m40j() -> Self {
        Self::new("M40J", "Torayca M40J 12K / 3900-2B", 231.0, 15.2, 0.20, 7.2, 1.60)
    }

    pub fn im7() -> Self {
        Self::new("IM7", "Hexcel IM7 / 8552", 171.0, 10.3, 0.32, 7.2, 1.58)
    }

    pub fn mr70() -> Self {
        Self::new("MR70", "Mitsubishi MR70 12K", 230.0, 14.8, 0.21, 7.0, 1.61)
    }

    pub fn t700s() -> Self {
        Self::new("T700S", "Toray T700S / 2592", 230.0, 13.4, 0.20, 6.4, 1.59)
    }
}

/// Read-only lookup table of ply materials keyed by id.
///
/// The database is built once and then shared by reference; every analysis
/// entry point takes it as an argument rather than reaching for a global.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialDatabase {
    materials: HashMap<String, MaterialSpec>,
}

impl MaterialDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Database with the standard fiber materials
    pub fn builtin() -> Self {
        Self::new()
            .with_material(MaterialSpec::m40j())
            .with_material(MaterialSpec::im7())
            .with_material(MaterialSpec::mr70())
            .with_material(MaterialSpec::t700s())
    }

    /// Add (or replace) a material
    pub fn with_material(mut self, material: MaterialSpec) -> Self {
        self.materials.insert(material.id.clone(), material);
        self
    }

    /// Load a database from a JSON object keyed by material id.
    ///
    /// Every entry is validated; the object key wins over the `id` field.
    pub fn from_json(json: &str) -> CltResult<Self> {
        let raw: HashMap<String, MaterialSpec> = serde_json::from_str(json)?;
        let mut db = Self::new();
        for (key, mut material) in raw {
            material.validate()?;
            material.id = key;
            db = db.with_material(material);
        }
        Ok(db)
    }

    /// Serialize the database to pretty JSON
    pub fn to_json(&self) -> CltResult<String> {
        Ok(serde_json::to_string_pretty(&self.materials)?)
    }

    /// Look up a material by id
    pub fn get(&self, id: &str) -> Option<&MaterialSpec> {
        self.materials.get(id)
    }

    /// Look up a material by id, failing with `UnknownMaterial`
    pub fn resolve(&self, id: &str) -> CltResult<&MaterialSpec> {
        self.get(id)
            .ok_or_else(|| CltError::UnknownMaterial(id.to_string()))
    }

    /// Sorted list of material ids
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.materials.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_materials() {
        let db = MaterialDatabase::builtin();
        assert_eq!(db.ids(), vec!["IM7", "M40J", "MR70", "T700S"]);

        let m40j = db.resolve("M40J").unwrap();
        assert_eq!(m40j.e1, 231.0);
        assert_eq!(m40j.strength.f1t, 2250.0);
        for id in db.ids() {
            db.resolve(&id).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn test_unknown_material() {
        let db = MaterialDatabase::builtin();
        assert!(matches!(db.resolve("XYZ"), Err(CltError::UnknownMaterial(id)) if id == "XYZ"));
    }

    #[test]
    fn test_reciprocity() {
        let m = MaterialSpec::m40j();
        assert_relative_eq!(m.nu21() / m.e2, m.nu12 / m.e1, epsilon = 1e-15);
    }

    #[test]
    fn test_validate_rejects_bad_constants() {
        let mut m = MaterialSpec::im7();
        m.e2 = 0.0;
        assert!(matches!(
            m.validate(),
            Err(CltError::OutOfRangeParameter { name: "e2", .. })
        ));

        let m = MaterialSpec::im7().with_strength(StrengthLimits::new(1.0, 1.0, -1.0, 1.0, 1.0));
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_substitutes_material_set() {
        let db = MaterialDatabase::new().with_material(MaterialSpec::t700s());
        let json = db.to_json().unwrap();
        let loaded = MaterialDatabase::from_json(&json).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.resolve("T700S").unwrap(), &MaterialSpec::t700s());
        assert!(loaded.resolve("M40J").is_err());
    }

    #[test]
    fn test_json_rejects_invalid_material() {
        let json = r#"{"BAD": {"id": "BAD", "name": "Bad", "e1": -1.0, "e2": 10.0,
            "nu12": 0.3, "g12": 5.0, "density": 1.5,
            "strength": {"f1t": 1.0, "f1c": 1.0, "f2t": 1.0, "f2c": 1.0, "f12s": 1.0}}}"#;
        assert!(matches!(
            MaterialDatabase::from_json(json),
            Err(CltError::OutOfRangeParameter { name: "e1", .. })
        ));
        assert!(matches!(
            MaterialDatabase::from_json("not json"),
            Err(CltError::SerializationError(_))
        ));
    }
}
