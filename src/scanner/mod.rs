//! Artifact scanner: pattern registry, recursive walk, subtree aggregation, filters, deletion.

pub mod aggregate;
pub mod deletion;
pub mod engine;
pub mod filter;
pub mod patterns;
