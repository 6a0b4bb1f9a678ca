//! Utilities Module
//!
//! Logging and configuration shared across the crate.

pub mod logging;
pub mod tss_config;

pub use tss_config::{global_config, TssConfig, TssLevel, TssSettings};
