// src/errors/mod.rs
//! Structured error reporting for the Tern semantic layer.
//!
//! This module provides error types using miette for fancy diagnostics.

pub mod report;
pub mod sema;

pub use report::render_to_string;
pub use sema::{SemaResult, SemanticError};
