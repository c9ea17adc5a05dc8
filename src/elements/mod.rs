//! Laminate building blocks module

mod lamina;
mod laminate;
mod material;
mod ply;

pub use lamina::{Lamina, MODULUS_FLOOR_GPA};
pub use laminate::{mirror_stack, Laminate, MAX_PLIES};
pub use material::{MaterialDatabase, MaterialSpec, StrengthLimits};
pub use ply::{Ply, PlyAngleSpec};
