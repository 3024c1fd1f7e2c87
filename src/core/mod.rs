//! Core types: errors, configuration, formatting, path helpers.

pub mod config;
pub mod errors;
pub mod format;
pub mod paths;
