//! Monte-Carlo tolerance studies
//!
//! A study moves through three stages, each its own type:
//! [`ToleranceStudy`] (configured) → [`SampleSet`] (trials evaluated) →
//! [`ToleranceResult`] (aggregated). Every trial draws from its own ChaCha
//! stream selected by (seed, trial index), so results are identical whether
//! trials run sequentially or on the rayon pool.

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_failure, ToleranceOptions};
use crate::elements::{Laminate, MaterialDatabase, PlyAngleSpec};
use crate::error::{CltError, CltResult};
use crate::math::stats;
use crate::results::{ConfidenceInterval, CriticalPlyDistribution, Statistics};

/// Scalar output of a trial that can be summarized or bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackedProperty {
    Ex,
    Ey,
    Gxy,
    NuXy,
    ThicknessMm,
    SafetyFactor,
    FailureIndex,
}

/// Outputs of one Monte-Carlo trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSample {
    /// Trial index; 0 is the unperturbed laminate
    pub trial: usize,
    /// GPa
    pub ex: f64,
    /// GPa
    pub ey: f64,
    /// GPa
    pub gxy: f64,
    pub nu_xy: f64,
    pub thickness_mm: f64,
    /// Minimum safety factor under the reference load
    pub safety_factor: Option<f64>,
    /// Maximum failure index under the reference load
    pub failure_index: Option<f64>,
    /// Critical ply under the reference load
    pub critical_ply: Option<usize>,
}

impl ToleranceSample {
    fn value(&self, property: TrackedProperty) -> Option<f64> {
        match property {
            TrackedProperty::Ex => Some(self.ex),
            TrackedProperty::Ey => Some(self.ey),
            TrackedProperty::Gxy => Some(self.gxy),
            TrackedProperty::NuXy => Some(self.nu_xy),
            TrackedProperty::ThicknessMm => Some(self.thickness_mm),
            TrackedProperty::SafetyFactor => self.safety_factor,
            TrackedProperty::FailureIndex => self.failure_index,
        }
    }
}

/// A configured study that has not sampled yet
#[derive(Debug, Clone)]
pub struct ToleranceStudy {
    specs: Vec<PlyAngleSpec>,
    ply_thickness_mm: f64,
    symmetric: bool,
    options: ToleranceOptions,
}

impl ToleranceStudy {
    /// Configure a study around a nominal stacking sequence.
    ///
    /// `specs` is the half-stack when `symmetric` is set, exactly as for
    /// [`Laminate::build`].
    pub fn new(
        specs: Vec<PlyAngleSpec>,
        ply_thickness_mm: f64,
        symmetric: bool,
        options: ToleranceOptions,
    ) -> CltResult<Self> {
        options.validate()?;
        if !(ply_thickness_mm.is_finite() && ply_thickness_mm > 0.0) {
            return Err(CltError::out_of_range(
                "ply_thickness_mm",
                ply_thickness_mm,
                "ply thickness must be positive",
            ));
        }

        Ok(Self {
            specs,
            ply_thickness_mm,
            symmetric,
            options,
        })
    }

    pub fn options(&self) -> &ToleranceOptions {
        &self.options
    }

    /// Run every trial.
    ///
    /// Material ids are resolved before any trial runs; trials that fail
    /// afterwards are logged and dropped.
    pub fn sample(&self, db: &MaterialDatabase) -> CltResult<SampleSet> {
        for spec in &self.specs {
            db.resolve(&spec.material)?;
        }

        let n = self.options.sample_count;
        info!(
            "Starting tolerance study: {} trials, seed {}, angle ±{}°, thickness ±{}%, material ±{}%{}",
            n,
            self.options.seed,
            self.options.angle_tolerance_deg,
            self.options.thickness_tolerance_pct,
            self.options.material_variation_pct,
            if self.options.reference_load.is_some() { ", with failure analysis" } else { "" }
        );

        #[cfg(feature = "parallel")]
        let outcomes: Vec<(usize, CltResult<ToleranceSample>)> = (0..n)
            .into_par_iter()
            .map(|trial| (trial, self.run_trial(db, trial)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<(usize, CltResult<ToleranceSample>)> = (0..n)
            .map(|trial| (trial, self.run_trial(db, trial)))
            .collect();

        let mut samples = Vec::with_capacity(n);
        for (trial, outcome) in outcomes {
            match outcome {
                Ok(sample) => samples.push(sample),
                Err(e) => warn!("Tolerance trial {} dropped: {}", trial, e),
            }
        }

        Ok(SampleSet {
            requested: n,
            samples,
            options: self.options.clone(),
        })
    }

    /// Random stream for one trial
    fn trial_rng(&self, trial: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.options.seed);
        rng.set_stream(trial as u64);
        rng
    }

    fn run_trial(&self, db: &MaterialDatabase, trial: usize) -> CltResult<ToleranceSample> {
        let opts = &self.options;
        let mut rng = self.trial_rng(trial);
        let perturb = trial > 0;

        let mut draw = |sigma: f64| {
            if perturb {
                sigma * standard_normal(&mut rng)
            } else {
                0.0
            }
        };

        let specs: Vec<PlyAngleSpec> = self
            .specs
            .iter()
            .map(|spec| {
                let angle = spec.angle_deg + draw(opts.angle_tolerance_deg);
                let thickness = spec.ply_thickness_mm(self.ply_thickness_mm)
                    * (1.0 + draw(opts.thickness_tolerance_pct / 100.0));
                PlyAngleSpec {
                    angle_deg: angle,
                    thickness_mm: Some(thickness),
                    ..spec.clone()
                }
            })
            .collect();

        let material_sigma = opts.material_variation_pct / 100.0;
        let e1_factor = 1.0 + draw(material_sigma);
        let e2_factor = 1.0 + draw(material_sigma);
        let g12_factor = 1.0 + draw(material_sigma);

        let laminate = Laminate::build(db, &specs, self.ply_thickness_mm, self.symmetric)?;
        let props = laminate.properties();

        let mut sample = ToleranceSample {
            trial,
            ex: props.ex * e1_factor,
            ey: props.ey * e2_factor,
            gxy: props.gxy * g12_factor,
            nu_xy: props.nu_xy,
            thickness_mm: props.thickness_mm,
            safety_factor: None,
            failure_index: None,
            critical_ply: None,
        };

        if let Some(load) = &opts.reference_load {
            let failure = analyze_failure(&laminate, load, &opts.failure)?;
            sample.safety_factor = Some(failure.min_safety_factor);
            sample.failure_index = Some(failure.max_failure_index);
            sample.critical_ply = Some(failure.critical_ply);
        }

        Ok(sample)
    }
}

/// Standard normal deviate (Box-Muller)
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Evaluated trials awaiting aggregation
#[derive(Debug, Clone)]
pub struct SampleSet {
    requested: usize,
    samples: Vec<ToleranceSample>,
    options: ToleranceOptions,
}

impl SampleSet {
    /// Number of trials requested
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Valid trials in trial order
    pub fn samples(&self) -> &[ToleranceSample] {
        &self.samples
    }

    /// Summarize the valid trials
    pub fn aggregate(self) -> CltResult<ToleranceResult> {
        let requested = self.requested;
        let column = |property: TrackedProperty| -> Vec<f64> {
            self.samples.iter().filter_map(|s| s.value(property)).collect()
        };
        let summarize = |values: &[f64]| {
            Statistics::from_samples(values).ok_or(CltError::NoValidSamples(requested))
        };

        let ex = summarize(&column(TrackedProperty::Ex))?;
        let ey = summarize(&column(TrackedProperty::Ey))?;
        let gxy = summarize(&column(TrackedProperty::Gxy))?;
        let nu_xy = summarize(&column(TrackedProperty::NuXy))?;
        let thickness_mm = summarize(&column(TrackedProperty::ThicknessMm))?;

        let failure = if self.options.reference_load.is_some() {
            let safety_factors = column(TrackedProperty::SafetyFactor);
            let failure_indices = column(TrackedProperty::FailureIndex);
            let critical: Vec<usize> = self.samples.iter().filter_map(|s| s.critical_ply).collect();

            let failed = safety_factors.iter().filter(|&&sf| sf < 1.0).count();
            Some(FailureToleranceResult {
                requested,
                valid: safety_factors.len(),
                safety_factor: summarize(&safety_factors)?,
                failure_index: summarize(&failure_indices)?,
                probability_of_failure: failed as f64 / safety_factors.len() as f64,
                critical_plies: CriticalPlyDistribution::from_indices(&critical)
                    .ok_or(CltError::NoValidSamples(requested))?,
                safety_factors,
                failure_indices,
            })
        } else {
            None
        };

        info!(
            "Tolerance study complete: {}/{} valid trials, Ex = {:.3} ± {:.3} GPa",
            self.samples.len(),
            requested,
            ex.mean,
            ex.std_dev
        );

        Ok(ToleranceResult {
            options: self.options,
            requested,
            valid: self.samples.len(),
            ex,
            ey,
            gxy,
            nu_xy,
            thickness_mm,
            failure,
            samples: self.samples,
        })
    }
}

/// Failure statistics of a tolerance study run against a reference load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureToleranceResult {
    pub requested: usize,
    pub valid: usize,
    /// Minimum safety factor per trial
    pub safety_factor: Statistics,
    /// Maximum failure index per trial
    pub failure_index: Statistics,
    /// Fraction of valid trials with a safety factor below 1
    pub probability_of_failure: f64,
    pub critical_plies: CriticalPlyDistribution,
    /// Raw per-trial safety factors
    pub safety_factors: Vec<f64>,
    /// Raw per-trial failure indices
    pub failure_indices: Vec<f64>,
}

/// Aggregated outcome of a tolerance study
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceResult {
    /// Options the study ran with
    pub options: ToleranceOptions,
    pub requested: usize,
    pub valid: usize,
    pub ex: Statistics,
    pub ey: Statistics,
    pub gxy: Statistics,
    pub nu_xy: Statistics,
    pub thickness_mm: Statistics,
    /// Present when the study ran with a reference load
    pub failure: Option<FailureToleranceResult>,
    /// Raw valid trials in trial order
    pub samples: Vec<ToleranceSample>,
}

impl ToleranceResult {
    /// Raw values of one property across the valid trials
    pub fn values(&self, property: TrackedProperty) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.value(property)).collect()
    }

    pub fn statistics(&self, property: TrackedProperty) -> Option<&Statistics> {
        match property {
            TrackedProperty::Ex => Some(&self.ex),
            TrackedProperty::Ey => Some(&self.ey),
            TrackedProperty::Gxy => Some(&self.gxy),
            TrackedProperty::NuXy => Some(&self.nu_xy),
            TrackedProperty::ThicknessMm => Some(&self.thickness_mm),
            TrackedProperty::SafetyFactor => self.failure.as_ref().map(|f| &f.safety_factor),
            TrackedProperty::FailureIndex => self.failure.as_ref().map(|f| &f.failure_index),
        }
    }

    /// Student-t confidence interval for the mean of `property`.
    ///
    /// mean ± t((1 + level)/2, N − 1) · s/√N with s the sample standard
    /// deviation. Needs at least two values and 0 < level < 1.
    pub fn confidence_interval(
        &self,
        property: TrackedProperty,
        level: f64,
    ) -> CltResult<ConfidenceInterval> {
        if !(level > 0.0 && level < 1.0) {
            return Err(CltError::out_of_range(
                "confidence_level",
                level,
                "must lie strictly between 0 and 1",
            ));
        }

        let values = self.values(property);
        let n = values.len();
        if n < 2 {
            return Err(CltError::out_of_range(
                "sample_count",
                n as f64,
                "a confidence interval needs at least two samples",
            ));
        }

        let mean = stats::mean(&values);
        let sem = stats::sample_std_dev(&values) / (n as f64).sqrt();
        let t = stats::student_t_quantile((1.0 + level) / 2.0, (n - 1) as f64);

        Ok(ConfidenceInterval {
            level,
            mean,
            lower: mean - t * sem,
            upper: mean + t * sem,
        })
    }
}
