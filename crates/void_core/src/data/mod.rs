//! Data structures for unit templates.
//!
//! Templates are static stat profiles keyed by a string identifier. They
//! deserialize from RON and are validated once at load time; the frame loop
//! assumes validated data.
//!
//! **Note:** This module contains no file IO. Reading files is handled by
//! `void_headless`.

mod registry;
mod templates;

pub use registry::TemplateRegistry;
pub use templates::{AllyTemplate, EnemyTemplate};
