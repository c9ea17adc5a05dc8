//! CLT Solver Example - Quasi-isotropic M40J laminate
//!
//! Environment overrides:
//! - `CLT_SAMPLES` - Monte-Carlo trials (default 500)
//! - `CLT_SEED` - base seed for the tolerance study (default 42)
//! - `RUST_LOG` - log level, e.g. `info` or `debug`

use anyhow::Context;
use clt_solver::prelude::*;

fn env_or<T: std::str::FromStr>(name: &str, default_val: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default_val)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let samples: usize = env_or("CLT_SAMPLES", 500);
    let seed: u64 = env_or("CLT_SEED", 42);

    println!("=== CLT Solver Example: [0/±45/90]s M40J ===\n");

    let solver = CltSolver::builtin();
    let material = solver.resolve_material("M40J")?;
    println!(
        "Material {} ({}): E1={} GPa, E2={} GPa, ν12={}, G12={} GPa",
        material.id, material.name, material.e1, material.e2, material.nu12, material.g12
    );

    let sequence = solver.parse_sequence("[0/±45/90]s", "M40J")?;
    let laminate = solver
        .build_laminate(&sequence.plies, 0.125, sequence.symmetric)
        .context("Failed to build laminate")?;

    // Effective properties
    let props = solver.effective_properties(&laminate);
    println!("\nEffective Properties ({}):", format_sequence(&sequence.plies, sequence.symmetric));
    println!("  Plies: {}, thickness: {:.3} mm", props.ply_count, props.thickness_mm);
    println!("  Ex  = {:.2} GPa", props.ex);
    println!("  Ey  = {:.2} GPa", props.ey);
    println!("  Gxy = {:.2} GPa", props.gxy);
    println!("  νxy = {:.4}", props.nu_xy);

    // Stiffness matrices
    let abd = solver.stiffness_matrices(&laminate);
    println!("\nA matrix (kN/m):");
    for i in 0..3 {
        println!(
            "  {:12.1} {:12.1} {:12.1}",
            abd.a[(i, 0)] / 1000.0,
            abd.a[(i, 1)] / 1000.0,
            abd.a[(i, 2)] / 1000.0
        );
    }
    println!("D matrix (N·m):");
    for i in 0..3 {
        println!(
            "  {:12.4} {:12.4} {:12.4}",
            abd.d[(i, 0)],
            abd.d[(i, 1)],
            abd.d[(i, 2)]
        );
    }
    println!("‖B‖ = {:.3e} N", abd.b.norm());

    // Ply stresses and failure
    let load = LoadCase::new(100_000.0, 20_000.0, 5_000.0);
    println!(
        "\nLoad case: Nx={:.1} kN/m, Ny={:.1} kN/m, Nxy={:.1} kN/m",
        load.nx / 1000.0,
        load.ny / 1000.0,
        load.nxy / 1000.0
    );

    let failure = solver.analyze_failure(&laminate, &load, FailureCriterion::TsaiWu)?;
    println!("\nPly Results:");
    println!(
        "  {:>3} {:>6} {:>9} {:>9} {:>9} {:>8} {:>8} {:>8}",
        "#", "angle", "σ1 MPa", "σ2 MPa", "τ12 MPa", "TW", "MS", "SF"
    );
    for ply in &failure.plies {
        let s = &ply.stress;
        println!(
            "  {:>3} {:>6.1} {:>9.2} {:>9.2} {:>9.2} {:>8.4} {:>8.4} {:>8.2}",
            s.ply_index,
            s.angle_deg,
            s.sigma_1,
            s.sigma_2,
            s.tau_12,
            ply.tsai_wu_index,
            ply.max_stress_index,
            ply.safety_factor
        );
    }

    println!("\nFailure Summary:");
    println!(
        "  Critical ply: {} ({:.0}°)",
        failure.critical_ply,
        failure.critical_angle_deg()
    );
    println!("  Min safety factor: {:.3}", failure.min_safety_factor);
    println!("  Reserve strength: {:.1}%", failure.reserve_strength_percent);
    println!("  Rating: {:?}, status: {:?}", failure.reserve_rating, failure.design_status);

    let scale = solver.find_allowable_load_scale(&laminate, &load, 1.5)?;
    let allowable = load.scaled(scale);
    println!(
        "  Allowable load at SF 1.5: scale {:.3} → Nx={:.1} kN/m",
        scale,
        allowable.nx / 1000.0
    );

    // Tolerance study
    let options = ToleranceOptions::default()
        .with_samples(samples)
        .with_seed(seed);
    println!(
        "\nTolerance Study ({} samples, seed {}, angle ±{}°, thickness ±{}%, material ±{}%):",
        options.sample_count,
        options.seed,
        options.angle_tolerance_deg,
        options.thickness_tolerance_pct,
        options.material_variation_pct
    );

    let study = solver.run_tolerance_study(&sequence.plies, 0.125, sequence.symmetric, &options)?;
    println!("  Valid samples: {}/{}", study.valid, study.requested);
    for (label, property) in [
        ("Ex ", TrackedProperty::Ex),
        ("Ey ", TrackedProperty::Ey),
        ("Gxy", TrackedProperty::Gxy),
        ("νxy", TrackedProperty::NuXy),
    ] {
        if let Some(stats) = study.statistics(property) {
            println!(
                "  {}: nominal {:.4}, mean {:.4}, std {:.4}, 5-95% [{:.4}, {:.4}], CV {:.2}%",
                label,
                stats.nominal,
                stats.mean,
                stats.std_dev,
                stats.q05,
                stats.q95,
                stats.cv * 100.0
            );
        }
    }
    if let Ok(ci) = study.confidence_interval(TrackedProperty::Ex, 0.95) {
        println!("  Ex 95% CI of the mean: [{:.4}, {:.4}] GPa", ci.lower, ci.upper);
    }

    let failure_study = solver.run_failure_tolerance_study(
        &sequence.plies,
        0.125,
        sequence.symmetric,
        &load,
        &options,
    )?;
    println!("\nFailure Tolerance Study:");
    println!(
        "  SF: mean {:.3}, min {:.3}, 5% {:.3}",
        failure_study.safety_factor.mean,
        failure_study.safety_factor.min,
        failure_study.safety_factor.q05
    );
    println!(
        "  Probability of failure: {:.2}%",
        failure_study.probability_of_failure * 100.0
    );
    println!(
        "  Most critical ply: {} (mean index {:.2})",
        failure_study.critical_plies.most_critical_ply,
        failure_study.critical_plies.mean_critical_ply
    );

    println!("\nSensitivity (one at a time):");
    for s in solver.run_sensitivity_sweep(&sequence.plies, 0.125, sequence.symmetric)? {
        let unit = if s.parameter == SensitivityParameter::Angle { "°" } else { "%" };
        println!(
            "  {:?} {:+}{}: Ex {:+.3}%, Ey {:+.3}%, Gxy {:+.3}%, νxy {:+.3}%, h {:+.3}%",
            s.parameter,
            s.perturbation,
            unit,
            s.ex.relative_change * 100.0,
            s.ey.relative_change * 100.0,
            s.gxy.relative_change * 100.0,
            s.nu_xy.relative_change * 100.0,
            s.thickness_mm.relative_change * 100.0
        );
    }

    println!("\n=== Analysis Complete ===");
    Ok(())
}
