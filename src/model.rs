//! CLT solver - entry point tying the material database to the analyses

use crate::analysis::{
    self, FailureCriterion, FailureOptions, FailureToleranceResult, SensitivityParameter,
    SensitivityResult, ToleranceOptions, ToleranceResult, ToleranceStudy,
};
use crate::elements::{Lamina, Laminate, MaterialDatabase, MaterialSpec, PlyAngleSpec};
use crate::error::{CltError, CltResult};
use crate::loads::LoadCase;
use crate::results::{
    EffectiveProperties, EngineeringConstants, FailureResult, PlyStressResult, StiffnessMatrices,
};
use crate::sequence::{self, ParsedSequence};

/// Laminate analysis front end.
///
/// Owns the material database every analysis resolves ids against. The
/// solver itself is stateless beyond that, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct CltSolver {
    materials: MaterialDatabase,
    failure: FailureOptions,
}

impl Default for CltSolver {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CltSolver {
    /// Create a solver over a material database
    pub fn new(materials: MaterialDatabase) -> Self {
        Self {
            materials,
            failure: FailureOptions::default(),
        }
    }

    /// Solver over the built-in material set
    pub fn builtin() -> Self {
        Self::new(MaterialDatabase::builtin())
    }

    /// Set the failure options used by [`find_allowable_load_scale`](Self::find_allowable_load_scale)
    /// and as the base for [`analyze_failure`](Self::analyze_failure)
    pub fn with_failure_options(mut self, options: FailureOptions) -> Self {
        self.failure = options;
        self
    }

    pub fn materials(&self) -> &MaterialDatabase {
        &self.materials
    }

    pub fn failure_options(&self) -> &FailureOptions {
        &self.failure
    }

    // ========================
    // Materials and plies
    // ========================

    /// Look up a material by id
    pub fn resolve_material(&self, id: &str) -> CltResult<&MaterialSpec> {
        self.materials.resolve(id)
    }

    /// Lamina matrices for a material
    pub fn lamina(&self, material: &str) -> CltResult<Lamina> {
        Lamina::from_database(&self.materials, material)
    }

    /// Off-axis engineering constants of a single ply
    pub fn lamina_properties(&self, material: &str, angle_deg: f64) -> CltResult<EngineeringConstants> {
        Ok(self.lamina(material)?.effective_properties(angle_deg))
    }

    // ========================
    // Laminates
    // ========================

    /// Build a laminate; `plies` is the half-stack when `symmetric`
    pub fn build_laminate(
        &self,
        plies: &[PlyAngleSpec],
        ply_thickness_mm: f64,
        symmetric: bool,
    ) -> CltResult<Laminate> {
        Laminate::build(&self.materials, plies, ply_thickness_mm, symmetric)
    }

    pub fn stiffness_matrices(&self, laminate: &Laminate) -> StiffnessMatrices {
        laminate.stiffness_matrices()
    }

    pub fn effective_properties(&self, laminate: &Laminate) -> EffectiveProperties {
        *laminate.properties()
    }

    /// Parse stacking notation, checking the material exists
    pub fn parse_sequence(&self, text: &str, material: &str) -> CltResult<ParsedSequence> {
        self.materials.resolve(material)?;
        sequence::parse_sequence(text, material)
    }

    /// Parse stacking notation and build the laminate it describes
    pub fn analyze_sequence(
        &self,
        text: &str,
        material: &str,
        ply_thickness_mm: f64,
    ) -> CltResult<Laminate> {
        let parsed = self.parse_sequence(text, material)?;
        self.build_laminate(&parsed.plies, ply_thickness_mm, parsed.symmetric)
    }

    // ========================
    // Stress and failure
    // ========================

    /// Ply stresses in stacking order under a membrane load
    pub fn recover_ply_stresses(
        &self,
        laminate: &Laminate,
        load: &LoadCase,
    ) -> CltResult<Vec<PlyStressResult>> {
        analysis::recover_ply_stresses(laminate, load)
    }

    /// Failure evaluation with the given governing criterion
    pub fn analyze_failure(
        &self,
        laminate: &Laminate,
        load: &LoadCase,
        criterion: FailureCriterion,
    ) -> CltResult<FailureResult> {
        let options = FailureOptions {
            criterion,
            ..self.failure
        };
        analysis::analyze_failure(laminate, load, &options)
    }

    /// Scale of `reference_load` at which the minimum safety factor equals `target_sf`
    pub fn find_allowable_load_scale(
        &self,
        laminate: &Laminate,
        reference_load: &LoadCase,
        target_sf: f64,
    ) -> CltResult<f64> {
        analysis::find_allowable_load_scale(laminate, reference_load, target_sf, &self.failure)
    }

    // ========================
    // Tolerance studies
    // ========================

    /// Monte-Carlo scatter of the effective properties around a nominal stack
    pub fn run_tolerance_study(
        &self,
        nominal: &[PlyAngleSpec],
        ply_thickness_mm: f64,
        symmetric: bool,
        options: &ToleranceOptions,
    ) -> CltResult<ToleranceResult> {
        ToleranceStudy::new(nominal.to_vec(), ply_thickness_mm, symmetric, options.clone())?
            .sample(&self.materials)?
            .aggregate()
    }

    /// Monte-Carlo scatter of the failure response under `reference_load`,
    /// evaluated with the solver's failure options
    pub fn run_failure_tolerance_study(
        &self,
        nominal: &[PlyAngleSpec],
        ply_thickness_mm: f64,
        symmetric: bool,
        reference_load: &LoadCase,
        options: &ToleranceOptions,
    ) -> CltResult<FailureToleranceResult> {
        let options = options
            .clone()
            .with_reference_load(*reference_load)
            .with_failure_options(self.failure);

        self.run_tolerance_study(nominal, ply_thickness_mm, symmetric, &options)?
            .failure
            .ok_or(CltError::NoValidSamples(options.sample_count))
    }

    /// One-at-a-time response of the effective properties to a shift in `parameter`
    /// (degrees for angle, percent for thickness and material)
    pub fn run_sensitivity(
        &self,
        nominal: &[PlyAngleSpec],
        ply_thickness_mm: f64,
        symmetric: bool,
        parameter: SensitivityParameter,
        perturbation: f64,
    ) -> CltResult<SensitivityResult> {
        analysis::analyze_sensitivity(
            &self.materials,
            nominal,
            ply_thickness_mm,
            symmetric,
            parameter,
            perturbation,
        )
    }

    /// Sensitivity to every parameter at its default shift
    pub fn run_sensitivity_sweep(
        &self,
        nominal: &[PlyAngleSpec],
        ply_thickness_mm: f64,
        symmetric: bool,
    ) -> CltResult<Vec<SensitivityResult>> {
        SensitivityParameter::ALL
            .iter()
            .map(|&parameter| {
                self.run_sensitivity(
                    nominal,
                    ply_thickness_mm,
                    symmetric,
                    parameter,
                    parameter.default_perturbation(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_analyze_sequence_matches_build() {
        let solver = CltSolver::builtin();
        let from_text = solver.analyze_sequence("[0/±45/90]s", "M40J", 0.125).unwrap();
        let specs: Vec<_> = [0.0, 45.0, -45.0, 90.0]
            .iter()
            .map(|&a| PlyAngleSpec::single("M40J", a))
            .collect();
        let built = solver.build_laminate(&specs, 0.125, true).unwrap();

        assert_eq!(from_text.ply_count(), 8);
        assert_relative_eq!(*from_text.a(), *built.a(), max_relative = 1e-12);
    }

    #[test]
    fn test_unknown_material_everywhere() {
        let solver = CltSolver::builtin();
        let specs = vec![PlyAngleSpec::single("XYZ", 0.0)];

        assert!(matches!(solver.resolve_material("XYZ"), Err(CltError::UnknownMaterial(_))));
        assert!(matches!(solver.lamina_properties("XYZ", 0.0), Err(CltError::UnknownMaterial(_))));
        assert!(matches!(solver.build_laminate(&specs, 0.125, false), Err(CltError::UnknownMaterial(_))));
        assert!(matches!(solver.parse_sequence("[0/90]", "XYZ"), Err(CltError::UnknownMaterial(_))));
        assert!(matches!(
            solver.run_tolerance_study(&specs, 0.125, false, &ToleranceOptions::default()),
            Err(CltError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_failure_options_carry_into_analysis() {
        let solver = CltSolver::builtin()
            .with_failure_options(FailureOptions::default().with_interaction(-0.5));
        let lam = solver.analyze_sequence("[0/90]s", "IM7", 0.125).unwrap();
        let load = LoadCase::biaxial(50_000.0);

        let with = solver.analyze_failure(&lam, &load, FailureCriterion::TsaiWu).unwrap();
        let without = CltSolver::builtin()
            .analyze_failure(&lam, &load, FailureCriterion::TsaiWu)
            .unwrap();
        // equal biaxial tension puts every ply in same-sign σ1/σ2
        assert!(with.max_failure_index > without.max_failure_index);
        assert_eq!(with.criterion, FailureCriterion::TsaiWu);
    }

    #[test]
    fn test_sensitivity_sweep() {
        let solver = CltSolver::builtin();
        let parsed = solver.parse_sequence("[0/±45/90]s", "M40J").unwrap();
        let sweep = solver
            .run_sensitivity_sweep(&parsed.plies, 0.125, parsed.symmetric)
            .unwrap();

        assert_eq!(sweep.len(), 3);
        assert_eq!(sweep[0].parameter, SensitivityParameter::Angle);
        assert_relative_eq!(sweep[2].ex.relative_change, 0.1, max_relative = 1e-9);
        assert!(sweep.iter().all(|s| s.nominal.ply_count == 8));
    }

    #[test]
    fn test_failure_tolerance_study() {
        let solver = CltSolver::builtin();
        let specs = vec![PlyAngleSpec::new("T700S", 0.0, 4)];
        let result = solver
            .run_failure_tolerance_study(
                &specs,
                0.125,
                true,
                &LoadCase::uniaxial_x(10_000.0),
                &ToleranceOptions::default().with_samples(30),
            )
            .unwrap();
        assert_eq!(result.requested, 30);
        assert_eq!(result.valid, 30);
        assert!(result.safety_factor.mean > 1.0);
    }
}
