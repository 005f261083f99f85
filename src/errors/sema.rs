// src/errors/sema.rs
//! Semantic analysis errors (E21xx).
//!
//! Every variant is fatal to the unit being processed: partial type
//! soundness cannot be trusted, so the type system raises the diagnostic
//! and aborts the current compile. The surrounding driver aggregates
//! diagnostics across files.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Result alias used throughout the semantic layer.
pub type SemaResult<T> = Result<T, SemanticError>;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("'{name}' specialized with {found} type arguments, expected {expected}")]
    #[diagnostic(code(E2101))]
    SpecializationArity {
        name: String,
        expected: usize,
        found: usize,
        #[label("wrong number of type arguments")]
        span: SourceSpan,
    },

    #[error("'{name}' cannot be specialized")]
    #[diagnostic(
        code(E2102),
        help("only generic class, enum, interface, and function declarations take type arguments")
    )]
    NotSpecializable {
        name: String,
        #[label("not a generic declaration")]
        span: SourceSpan,
    },

    #[error("undefined type or symbol '{name}'")]
    #[diagnostic(code(E2103))]
    UnresolvedName {
        name: String,
        #[label("not found in any enclosing scope")]
        span: SourceSpan,
    },

    #[error("'{implementer}' does not implement '{interface}': missing {signature}")]
    #[diagnostic(
        code(E2104),
        help("declare a function matching the interface signature")
    )]
    MissingInterfaceFunction {
        implementer: String,
        interface: String,
        signature: String,
        #[label("required by '{interface}'")]
        span: SourceSpan,
    },

    #[error("'{implementer}' has {count} candidates for '{interface}' function {signature}")]
    #[diagnostic(
        code(E2105),
        help("interface dispatch does not tie-break; remove or rename the extra overloads")
    )]
    AmbiguousInterfaceFunction {
        implementer: String,
        interface: String,
        signature: String,
        count: usize,
        #[label("ambiguous implementation")]
        span: SourceSpan,
    },

    #[error("'{name}' recursively specializes itself while still being elaborated")]
    #[diagnostic(
        code(E2106),
        help("a generic declaration cannot specialize itself with its own unresolved parameter")
    )]
    ReentrantSpecialization {
        name: String,
        #[label("cycle detected here")]
        span: SourceSpan,
    },
}

impl SemanticError {
    /// The miette error code for this diagnostic, for driver-side grouping.
    pub fn code_str(&self) -> &'static str {
        match self {
            SemanticError::SpecializationArity { .. } => "E2101",
            SemanticError::NotSpecializable { .. } => "E2102",
            SemanticError::UnresolvedName { .. } => "E2103",
            SemanticError::MissingInterfaceFunction { .. } => "E2104",
            SemanticError::AmbiguousInterfaceFunction { .. } => "E2105",
            SemanticError::ReentrantSpecialization { .. } => "E2106",
        }
    }
}
