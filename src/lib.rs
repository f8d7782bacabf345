//! Libris application library
//!
//! Project-specific modules mounted on the Libris runtime.

pub mod modules;
