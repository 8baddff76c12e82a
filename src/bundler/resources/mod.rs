//! Platform-agnostic resource handling.

pub mod icons;
