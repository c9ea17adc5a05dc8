//! Loads module

mod load_case;

pub use load_case::LoadCase;
