//! Activity logging: JSONL append-only writer with graceful degradation.

pub mod activity;
pub mod jsonl;
