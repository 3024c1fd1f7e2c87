//! Terminal front end: interactive selector, scan spinner, signal handling.

pub mod interrupt;
pub mod selector;
pub mod spinner;
pub mod terminal_guard;
