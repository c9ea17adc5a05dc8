use approx::assert_relative_eq;
use clt_solver::prelude::*;

fn env_usize(name: &str, default_val: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default_val)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn quasi_isotropic_half() -> Vec<PlyAngleSpec> {
    [0.0, 45.0, -45.0, 90.0]
        .iter()
        .map(|&angle| PlyAngleSpec::single("M40J", angle))
        .collect()
}

#[test]
fn quasi_isotropic_m40j_properties() {
    init_logging();
    let solver = CltSolver::builtin();
    let laminate = solver.analyze_sequence("[0/45/-45/90]s", "M40J", 0.125).unwrap();
    let props = solver.effective_properties(&laminate);

    assert_eq!(props.ply_count, 8);
    assert_relative_eq!(props.thickness_mm, 1.0, epsilon = 1e-12);
    assert_relative_eq!(props.ex, props.ey, max_relative = 0.03);
    assert!(props.nu_xy > 0.3 && props.nu_xy < 0.4, "nu_xy = {}", props.nu_xy);

    // Quasi-isotropic: Gxy = Ex / (2 (1 + νxy))
    assert_relative_eq!(props.gxy, props.ex / (2.0 * (1.0 + props.nu_xy)), max_relative = 1e-6);
}

#[test]
fn symmetric_laminates_have_no_coupling() {
    let solver = CltSolver::builtin();
    for text in ["[0/±45/90]s", "[30/-60/15x2]s", "[±20/90x3/0]s", "[5]s"] {
        let laminate = solver.analyze_sequence(text, "IM7", 0.15).unwrap();
        let m = solver.stiffness_matrices(&laminate);
        let scale = m.a.norm() * laminate.thickness();
        assert!(m.b.norm() <= 1e-6 * scale, "{}: ‖B‖ = {}", text, m.b.norm());
    }
}

#[test]
fn unidirectional_ex_equals_e1_for_any_ply_count() {
    let solver = CltSolver::builtin();
    let e1 = solver.resolve_material("T700S").unwrap().e1;
    for count in [1, 2, 7, 32] {
        let laminate = solver
            .build_laminate(&[PlyAngleSpec::new("T700S", 0.0, count)], 0.2, false)
            .unwrap();
        assert_relative_eq!(solver.effective_properties(&laminate).ex, e1, max_relative = 1e-9);
    }
}

#[test]
fn rotating_by_90_swaps_ex_and_ey() {
    let solver = CltSolver::builtin();
    let lamina = solver.lamina_properties("MR70", 0.0).unwrap();
    let rotated = solver.lamina_properties("MR70", 90.0).unwrap();
    assert_relative_eq!(rotated.ex, lamina.ey, max_relative = 1e-9);
    assert_relative_eq!(rotated.ey, lamina.ex, max_relative = 1e-9);

    let lam0 = solver.analyze_sequence("[0x4]", "MR70", 0.125).unwrap();
    let lam90 = solver.analyze_sequence("[90x4]", "MR70", 0.125).unwrap();
    assert_relative_eq!(lam90.properties().ex, lam0.properties().ey, max_relative = 1e-9);
    assert_relative_eq!(lam90.properties().ey, lam0.properties().ex, max_relative = 1e-9);
}

#[test]
fn unidirectional_laminate_survives_moderate_axial_load() {
    let solver = CltSolver::builtin();
    let laminate = solver.analyze_sequence("[0]x8", "M40J", 0.125).unwrap();
    assert_eq!(laminate.ply_count(), 8);
    let result = solver
        .analyze_failure(&laminate, &LoadCase::uniaxial_x(5000.0), FailureCriterion::TsaiWu)
        .unwrap();
    assert!(result.passed);
    assert!(result.min_safety_factor > 1.0);

    let max_stress = solver
        .analyze_failure(&laminate, &LoadCase::uniaxial_x(5000.0), FailureCriterion::MaxStress)
        .unwrap();
    // 5 MPa against F1t = 2250 MPa
    assert_relative_eq!(max_stress.min_safety_factor, 450.0, max_relative = 1e-6);
}

#[test]
fn malformed_sequences_are_rejected() {
    let solver = CltSolver::builtin();
    for text in ["[0/4a/90]s", "[0/90", "", "[]", "±x2", "[0/90]x0"] {
        assert!(
            matches!(solver.analyze_sequence(text, "M40J", 0.125), Err(CltError::InvalidSequence(_))),
            "accepted '{}'",
            text
        );
    }
}

#[test]
fn safety_factor_is_reciprocal_of_index() {
    let solver = CltSolver::builtin();
    let laminate = solver.analyze_sequence("[0/±30/90]s", "IM7", 0.125).unwrap();
    let result = solver
        .analyze_failure(&laminate, &LoadCase::new(60_000.0, -15_000.0, 8_000.0), FailureCriterion::TsaiWu)
        .unwrap();

    for ply in &result.plies {
        if ply.tsai_wu_index > 1e-6 {
            assert_relative_eq!(ply.safety_factor, 1.0 / ply.tsai_wu_index, max_relative = 1e-12);
        } else {
            assert_eq!(ply.safety_factor, 999.0);
        }
    }

    let unloaded = solver
        .analyze_failure(&laminate, &LoadCase::default(), FailureCriterion::TsaiWu)
        .unwrap();
    assert!(unloaded.plies.iter().all(|p| p.safety_factor == 999.0));
    assert_eq!(unloaded.reserve_strength_percent, 100.0);
}

#[test]
fn allowable_scale_decreases_with_target() {
    let solver = CltSolver::builtin();
    let laminate = solver.analyze_sequence("[0/±45/90]s", "M40J", 0.125).unwrap();
    let load = LoadCase::new(40_000.0, 10_000.0, 2_000.0);

    let mut target = 0.25;
    let mut previous = solver.find_allowable_load_scale(&laminate, &load, target).unwrap();
    for _ in 0..5 {
        target *= 2.0;
        let scale = solver.find_allowable_load_scale(&laminate, &load, target).unwrap();
        assert!(scale <= previous, "SF {} gave {} after {}", target, scale, previous);
        previous = scale;
    }
}

#[test]
fn unknown_material_is_reported() {
    let solver = CltSolver::builtin();
    let specs = vec![PlyAngleSpec::single("XYZ", 0.0)];

    assert!(matches!(solver.resolve_material("XYZ"), Err(CltError::UnknownMaterial(id)) if id == "XYZ"));
    assert!(matches!(solver.build_laminate(&specs, 0.125, true), Err(CltError::UnknownMaterial(_))));
    assert!(matches!(solver.analyze_sequence("[0/90]s", "XYZ", 0.125), Err(CltError::UnknownMaterial(_))));
    assert!(matches!(
        solver.run_failure_tolerance_study(
            &specs,
            0.125,
            false,
            &LoadCase::uniaxial_x(1000.0),
            &ToleranceOptions::default()
        ),
        Err(CltError::UnknownMaterial(_))
    ));
}

#[test]
fn tolerance_nominal_matches_direct_build() {
    init_logging();
    let solver = CltSolver::builtin();
    let half = quasi_isotropic_half();
    let laminate = solver.build_laminate(&half, 0.125, true).unwrap();
    let props = solver.effective_properties(&laminate);

    let study = solver
        .run_tolerance_study(&half, 0.125, true, &ToleranceOptions::default().with_samples(25))
        .unwrap();

    assert_relative_eq!(study.ex.nominal, props.ex, max_relative = 1e-12);
    assert_relative_eq!(study.ey.nominal, props.ey, max_relative = 1e-12);
    assert_relative_eq!(study.gxy.nominal, props.gxy, max_relative = 1e-12);
    assert_relative_eq!(study.nu_xy.nominal, props.nu_xy, max_relative = 1e-12);
    assert_relative_eq!(study.thickness_mm.nominal, props.thickness_mm, max_relative = 1e-12);
}

#[test]
fn confidence_interval_narrows_with_more_samples() {
    let solver = CltSolver::builtin();
    let half = quasi_isotropic_half();
    let large = env_usize("CLT_TEST_SAMPLES", 1000).min(5000);

    let width = |n: usize| {
        solver
            .run_tolerance_study(&half, 0.125, true, &ToleranceOptions::default().with_samples(n))
            .unwrap()
            .confidence_interval(TrackedProperty::Ex, 0.95)
            .unwrap()
            .width()
    };

    let small_width = width(30);
    let large_width = width(large);
    assert!(
        large_width < small_width,
        "N=30 width {} vs N={} width {}",
        small_width,
        large,
        large_width
    );
}

#[test]
fn same_seed_gives_identical_studies() {
    let solver = CltSolver::builtin();
    let half = quasi_isotropic_half();
    let options = ToleranceOptions::default()
        .with_samples(120)
        .with_seed(2024)
        .with_reference_load(LoadCase::uniaxial_x(150_000.0));

    let a = solver.run_tolerance_study(&half, 0.125, true, &options).unwrap();
    let b = solver.run_tolerance_study(&half, 0.125, true, &options).unwrap();
    assert_eq!(a.samples, b.samples);
    assert_eq!(a.ex, b.ex);
    assert_eq!(
        a.failure.as_ref().unwrap().critical_plies,
        b.failure.as_ref().unwrap().critical_plies
    );
}

#[cfg(feature = "parallel")]
#[test]
fn study_does_not_depend_on_thread_count() {
    let solver = CltSolver::builtin();
    let half = quasi_isotropic_half();
    let options = ToleranceOptions::default().with_samples(200).with_seed(99);

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| solver.run_tolerance_study(&half, 0.125, true, &options).unwrap());
    let many = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| solver.run_tolerance_study(&half, 0.125, true, &options).unwrap());

    assert_eq!(single.samples, many.samples);
}

#[test]
fn failure_tolerance_study_reports_probability_of_failure() {
    let solver = CltSolver::builtin();
    let half = quasi_isotropic_half();
    let nominal = solver.build_laminate(&half, 0.125, true).unwrap();
    let load = LoadCase::uniaxial_x(100_000.0);
    let options = ToleranceOptions::default().with_samples(200);

    // Scale the load to sit right at the nominal failure point
    let scale = solver.find_allowable_load_scale(&nominal, &load, 1.0).unwrap();
    let at_limit = load.scaled(scale);

    let result = solver
        .run_failure_tolerance_study(&half, 0.125, true, &at_limit, &options)
        .unwrap();
    assert_eq!(result.valid, 200);
    assert!(result.probability_of_failure > 0.05 && result.probability_of_failure < 0.95);
    assert!(result.safety_factor.min < 1.0 && result.safety_factor.max > 1.0);

    let frequency_total: usize = result.critical_plies.frequency.values().sum();
    assert_eq!(frequency_total, result.valid);
}

#[test]
fn alternate_material_database_from_json() {
    let json = r#"{
        "GLASS": {
            "id": "ignored",
            "name": "E-glass / epoxy",
            "e1": 39.0, "e2": 8.6, "nu12": 0.28, "g12": 3.8, "density": 2.1,
            "strength": { "f1t": 1080.0, "f1c": 620.0, "f2t": 39.0, "f2c": 128.0, "f12s": 89.0 }
        }
    }"#;
    let db = MaterialDatabase::from_json(json).unwrap();
    let solver = CltSolver::new(db);

    assert_eq!(solver.resolve_material("GLASS").unwrap().id, "GLASS");
    assert!(matches!(solver.resolve_material("M40J"), Err(CltError::UnknownMaterial(_))));

    let laminate = solver.analyze_sequence("[0/90]s", "GLASS", 0.25).unwrap();
    let result = solver
        .analyze_failure(&laminate, &LoadCase::uniaxial_x(1000.0), FailureCriterion::MaxStress)
        .unwrap();
    assert!(result.passed);
}

#[test]
fn invalid_material_json_is_rejected() {
    assert!(matches!(
        MaterialDatabase::from_json("{ not json"),
        Err(CltError::SerializationError(_))
    ));

    let negative = r#"{
        "BAD": {
            "id": "BAD", "name": "bad", "e1": -1.0, "e2": 8.6, "nu12": 0.28, "g12": 3.8, "density": 2.1,
            "strength": { "f1t": 1.0, "f1c": 1.0, "f2t": 1.0, "f2c": 1.0, "f12s": 1.0 }
        }
    }"#;
    assert!(matches!(
        MaterialDatabase::from_json(negative),
        Err(CltError::OutOfRangeParameter { name: "e1", .. })
    ));
}

#[test]
fn results_serialize_to_json() {
    let solver = CltSolver::builtin();
    let laminate = solver.analyze_sequence("[0/±45/90]s", "M40J", 0.125).unwrap();
    let failure = solver
        .analyze_failure(&laminate, &LoadCase::uniaxial_x(10_000.0), FailureCriterion::TsaiWu)
        .unwrap();

    let json = serde_json::to_string(&failure).unwrap();
    assert!(json.contains("\"critical_ply\""));
    let back: FailureResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.critical_ply, failure.critical_ply);
    assert_eq!(back.design_status, failure.design_status);
}

#[test]
fn sensitivity_of_cross_ply_laminate() {
    init_logging();
    let solver = CltSolver::builtin();
    let parsed = solver.parse_sequence("[0/90]s", "IM7").unwrap();

    let softer = solver
        .run_sensitivity(&parsed.plies, 0.125, true, SensitivityParameter::Material, -10.0)
        .unwrap();
    assert_relative_eq!(softer.ex.relative_change, -0.1, max_relative = 1e-9);
    assert_relative_eq!(softer.perturbed.ex, softer.nominal.ex * 0.9, max_relative = 1e-9);

    // shear stiffness of a cross-ply is lowest when aligned
    let rotated = solver
        .run_sensitivity(&parsed.plies, 0.125, true, SensitivityParameter::Angle, 1.0)
        .unwrap();
    assert!(rotated.gxy.relative_change > 0.0);
    assert!(rotated.ex.relative_change < 0.0);

    assert!(matches!(
        solver.run_sensitivity(&parsed.plies, 0.125, true, SensitivityParameter::Thickness, 0.0),
        Err(CltError::OutOfRangeParameter { name: "perturbation", .. })
    ));

    let json = serde_json::to_string(&rotated).unwrap();
    assert!(json.contains("\"relative_change\""));
}
