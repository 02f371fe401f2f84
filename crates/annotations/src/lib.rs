//! # User Annotations
//!
//! Extra pareto columns (comments, owners, ETAs...) written by users against
//! group names or register keys, optionally scoped to a configuration (`$x8`)
//! and/or a step (`*CFIN`).
//!
//! Scope tokens are parsed once, at load time, into a [`Scope`]; lookups never
//! re-parse key strings.

pub mod error;
pub mod parser;
pub mod resolver;

pub use error::AnnotationError;
pub use parser::{Annotation, Scope, FIELD_SEPARATOR};
pub use resolver::AnnotationSet;
