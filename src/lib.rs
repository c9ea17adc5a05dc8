//! CLT Solver - Classical Laminate Theory for fiber-reinforced composites
//!
//! This library analyzes thin laminated plates under in-plane loads:
//! - Lamina stiffness and off-axis engineering constants
//! - Laminate ABD stiffness and effective membrane properties
//! - Ply stress recovery under membrane force resultants
//! - Tsai-Wu and maximum-stress failure, allowable load search
//! - Monte-Carlo tolerance studies with confidence intervals
//!
//! Inputs use GPa for moduli, MPa for strengths and stresses, mm for
//! thickness, N/m for force resultants and degrees for ply angles.
//!
//! ## Example
//! ```rust
//! use clt_solver::prelude::*;
//!
//! let solver = CltSolver::builtin();
//!
//! // [0/±45/90]s quasi-isotropic M40J laminate, 0.125 mm plies
//! let laminate = solver.analyze_sequence("[0/±45/90]s", "M40J", 0.125).unwrap();
//! let props = solver.effective_properties(&laminate);
//! assert_eq!(props.ply_count, 8);
//!
//! // Failure under 5 kN/m axial tension
//! let load = LoadCase::uniaxial_x(5000.0);
//! let failure = solver
//!     .analyze_failure(&laminate, &load, FailureCriterion::TsaiWu)
//!     .unwrap();
//! assert!(failure.passed);
//!
//! // Allowable load at a safety factor of 1.5
//! let scale = solver.find_allowable_load_scale(&laminate, &load, 1.5).unwrap();
//! assert!(scale > 1.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;
pub mod sequence;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        FailureCriterion, FailureOptions, FailureToleranceResult, PropertySensitivity,
        SensitivityParameter, SensitivityResult, ToleranceOptions, ToleranceResult,
        ToleranceStudy, TrackedProperty,
    };
    pub use crate::elements::{
        Lamina, Laminate, MaterialDatabase, MaterialSpec, Ply, PlyAngleSpec, StrengthLimits,
    };
    pub use crate::error::{CltError, CltResult};
    pub use crate::loads::LoadCase;
    pub use crate::model::CltSolver;
    pub use crate::results::{
        ConfidenceInterval, DesignStatus, EffectiveProperties, EngineeringConstants,
        FailureResult, PlyStressResult, ReserveRating, Statistics, StiffnessMatrices,
    };
    pub use crate::sequence::{format_sequence, parse_sequence, ParsedSequence};
}
