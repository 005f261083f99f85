// src/sema/types/mod.rs
//
// Qualified type values: the unit all type checking operates on.
//
// A qualified type pairs exactly one type declaration with one mutability
// qualifier. Declarations are never duplicated to change mutability;
// `with_mutability` re-qualifies the same declaration id.

pub mod tag;

pub use tag::{PRIMITIVE_TAGS, TypeTag};

use crate::sema::registry::{TypeDefId, TypeRegistry};

/// Two-state qualifier on a type usage, independent of the declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    Mutable,
    Immutable,
}

impl Mutability {
    /// Rendering prefix used in type display strings.
    pub fn prefix(self) -> &'static str {
        match self {
            Mutability::Mutable => "mut ",
            Mutability::Immutable => "!mut ",
        }
    }
}

/// A mutability-qualified type value.
///
/// Equality derives over (declaration id, mutability), which is correct
/// whenever both ids came from the deduplicating registry. The full
/// comparison is [`Type::equals`], which compares rendered full names
/// through the registry and also covers independently created
/// declarations for the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive { decl: TypeDefId, mutability: Mutability },
    Class { decl: TypeDefId, mutability: Mutability },
    Enum { decl: TypeDefId, mutability: Mutability },
    Interface { decl: TypeDefId, mutability: Mutability },
    /// A type name carried as a value; wraps the referenced type.
    TypeReference { inner: Box<Type>, mutability: Mutability },
}

impl Type {
    /// Wrap a type as a type-reference value (used by type-test
    /// expressions where a type name flows as data).
    pub fn reference(inner: Type) -> Type {
        Type::TypeReference {
            inner: Box::new(inner),
            mutability: Mutability::Immutable,
        }
    }

    /// The underlying declaration, if this value has one directly.
    /// Type references answer `None`; their declaration belongs to the
    /// wrapped type.
    pub fn decl(&self) -> Option<TypeDefId> {
        match self {
            Type::Primitive { decl, .. }
            | Type::Class { decl, .. }
            | Type::Enum { decl, .. }
            | Type::Interface { decl, .. } => Some(*decl),
            Type::TypeReference { .. } => None,
        }
    }

    pub fn mutability(&self) -> Mutability {
        match self {
            Type::Primitive { mutability, .. }
            | Type::Class { mutability, .. }
            | Type::Enum { mutability, .. }
            | Type::Interface { mutability, .. }
            | Type::TypeReference { mutability, .. } => *mutability,
        }
    }

    /// Re-qualify this value. Returns the same value when the qualifier
    /// already matches; otherwise the same declaration under the new
    /// qualifier.
    pub fn with_mutability(&self, mutability: Mutability) -> Type {
        if self.mutability() == mutability {
            return self.clone();
        }
        let mut out = self.clone();
        match &mut out {
            Type::Primitive { mutability: m, .. }
            | Type::Class { mutability: m, .. }
            | Type::Enum { mutability: m, .. }
            | Type::Interface { mutability: m, .. }
            | Type::TypeReference { mutability: m, .. } => *m = mutability,
        }
        out
    }

    /// The kind tag of this value.
    pub fn tag(&self, registry: &TypeRegistry) -> TypeTag {
        match self {
            Type::TypeReference { .. } => TypeTag::TypeReference,
            Type::Class { .. } => TypeTag::Class,
            Type::Enum { .. } => TypeTag::Enum,
            Type::Interface { .. } => TypeTag::Interface,
            Type::Primitive { decl, .. } => registry.get(*decl).tag,
        }
    }

    /// The declaration's full name, without the mutability prefix.
    /// Used for signature rendering and specialization cache keys.
    pub fn name_in(&self, registry: &TypeRegistry) -> String {
        match self {
            Type::TypeReference { inner, .. } => format!("type<{}>", inner.name_in(registry)),
            other => match other.decl() {
                Some(decl) => registry.get(decl).full_name.to_string(),
                None => "<unknown>".to_string(),
            },
        }
    }

    /// Human-readable rendering: mutability prefix plus the declaration's
    /// full name.
    pub fn display(&self, registry: &TypeRegistry) -> String {
        format!("{}{}", self.mutability().prefix(), self.name_in(registry))
    }

    /// Name-level equality: declaration full names and mutability both
    /// match. Holds across independently created declaration entries for
    /// the same declared name.
    pub fn equals(&self, other: &Type, registry: &TypeRegistry) -> bool {
        if self.mutability() != other.mutability() {
            return false;
        }
        match (self, other) {
            (Type::TypeReference { inner: a, .. }, Type::TypeReference { inner: b, .. }) => {
                a.equals(b, registry)
            }
            (a, b) => match (a.decl(), b.decl()) {
                (Some(a_decl), Some(b_decl)) => {
                    registry.get(a_decl).full_name == registry.get(b_decl).full_name
                }
                _ => false,
            },
        }
    }

    /// Check if a value of this type can be implicitly converted to
    /// `target`. See `sema::compatibility` for the rules.
    pub fn can_implicitly_cast_to(&self, target: &Type, registry: &TypeRegistry) -> bool {
        crate::sema::compatibility::can_implicitly_cast(self, target, registry)
    }
}
