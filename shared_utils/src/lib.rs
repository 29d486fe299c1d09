//! Small helpers shared by the workspace crates: environment lookups and
//! TOML configuration loading.

pub mod config;
pub mod env;
