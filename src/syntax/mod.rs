// src/syntax/mod.rs
//
// Declaration nodes consumed from the external parser.
//
// tern-sema does not own a grammar or lexer; the parser hands us one
// `Program` per source file, made of the declaration nodes below. Only
// data needed by semantic analysis is represented: names, generic
// parameter lists, type annotations, and child declarations.

pub mod name;

pub use name::{ParsedName, parse_qualified_name};

use miette::SourceSpan;

/// Byte range in the original source, carried on every declaration for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// A type annotation as written in source, before resolution.
/// `base` may be dotted (`Ns.List`); `args` are the applied generic
/// arguments; `mutable` is the `mut` qualifier on the usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub base: String,
    pub args: Vec<TypeExpr>,
    pub mutable: bool,
    pub span: Span,
}

impl TypeExpr {
    /// Convenience constructor for a bare, immutable type name.
    pub fn named(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            args: Vec::new(),
            mutable: false,
            span: Span::default(),
        }
    }

    /// Convenience constructor for an applied generic name.
    pub fn applied(base: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self {
            base: base.into(),
            args,
            mutable: false,
            span: Span::default(),
        }
    }

    /// Same annotation with the `mut` qualifier set.
    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }
}

/// One parsed source file.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone)]
pub enum Declaration {
    Namespace(NamespaceDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
    Interface(InterfaceDecl),
    Function(FunctionDecl),
}

#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    pub name: String,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    /// Ordered generic parameter names; empty for concrete classes.
    pub generic_params: Vec<String>,
    pub implements: Vec<TypeExpr>,
    pub fields: Vec<FieldDecl>,
    pub functions: Vec<FunctionDecl>,
    pub routines: Vec<RoutineDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub generic_params: Vec<String>,
    pub implements: Vec<TypeExpr>,
    pub members: Vec<EnumMemberDecl>,
    pub functions: Vec<FunctionDecl>,
    pub routines: Vec<RoutineDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumMemberDecl {
    pub name: String,
    /// Explicit discriminant; assigned sequentially when absent.
    pub discriminant: Option<i64>,
    pub payload: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub generic_params: Vec<String>,
    pub extends: Vec<TypeExpr>,
    pub functions: Vec<FunctionDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub generic_params: Vec<String>,
    pub params: Vec<ParamDecl>,
    /// None means void.
    pub return_type: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Startup,
    EventHandler,
}

#[derive(Debug, Clone)]
pub struct RoutineDecl {
    pub name: String,
    pub kind: RoutineKind,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_into_source_span() {
        let span = Span::new(10, 14);
        let ss: SourceSpan = span.into();
        assert_eq!(ss.offset(), 10);
        assert_eq!(ss.len(), 4);
    }

    #[test]
    fn type_expr_builders() {
        let t = TypeExpr::applied("List", vec![TypeExpr::named("i32")]).mutable();
        assert_eq!(t.base, "List");
        assert_eq!(t.args.len(), 1);
        assert!(t.mutable);
        assert!(!t.args[0].mutable);
    }
}
