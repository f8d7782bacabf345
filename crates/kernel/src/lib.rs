//! Core traits, settings, and module registry for Libris.

pub mod module;
pub mod registry;
pub mod settings;

pub use libris_db::SchemaStatement;
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
