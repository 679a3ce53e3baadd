//! Unit tests, one module per crate area.

pub mod config;
pub mod core;
