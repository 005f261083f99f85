// src/sema/compatibility.rs
//
// The implicit-conversion lattice.
//
// Pure functions deciding whether a value of one qualified type can be
// assigned where another is expected. An implicit cast needs both
// structural compatibility (kind-specific rules below) and mutability
// compatibility.

use crate::sema::registry::TypeRegistry;
use crate::sema::types::{Mutability, Type};

/// Check qualifier compatibility. Matching qualifiers are fine; a
/// mutable source narrowing to an immutable target is always safe; and
/// primitive value types are copied on assignment, so their qualifier
/// never restricts a cast.
pub fn mutability_compatible(from: &Type, to: &Type, registry: &TypeRegistry) -> bool {
    if from.mutability() == to.mutability() {
        return true;
    }
    if from.mutability() == Mutability::Mutable && to.mutability() == Mutability::Immutable {
        return true;
    }
    from.tag(registry).is_primitive()
}

/// Kind-specific structural compatibility, ignoring qualifiers.
pub fn structurally_compatible(from: &Type, to: &Type, registry: &TypeRegistry) -> bool {
    // Type-reference values never implicitly cast to anything.
    if matches!(from, Type::TypeReference { .. }) {
        return false;
    }

    let from_tag = from.tag(registry);
    let to_tag = to.tag(registry);

    if from_tag.is_primitive() && to_tag.is_primitive() {
        let (Some(from_decl), Some(to_decl)) = (from.decl(), to.decl()) else {
            return false;
        };
        if registry.get(from_decl).full_name == registry.get(to_decl).full_name {
            return true;
        }
        return from_tag.can_widen_to(to_tag);
    }

    match (from, to) {
        // Same-named class or enum.
        (Type::Class { decl: a, .. }, Type::Class { decl: b, .. })
        | (Type::Enum { decl: a, .. }, Type::Enum { decl: b, .. }) => {
            registry.get(*a).full_name == registry.get(*b).full_name
        }
        // Class/enum to an implemented interface. Generic arguments are
        // part of the full name, so distinct instantiations stay distinct.
        (Type::Class { decl: a, .. }, Type::Interface { decl: b, .. })
        | (Type::Enum { decl: a, .. }, Type::Interface { decl: b, .. }) => {
            registry.implements_interface(*a, *b)
        }
        // Interface to interface: identity or an extended parent.
        (Type::Interface { decl: a, .. }, Type::Interface { decl: b, .. }) => {
            registry.get(*a).full_name == registry.get(*b).full_name
                || registry.implements_interface(*a, *b)
        }
        _ => false,
    }
}

/// The full implicit-cast check: structural AND mutability compatible.
pub fn can_implicitly_cast(from: &Type, to: &Type, registry: &TypeRegistry) -> bool {
    structurally_compatible(from, to, registry) && mutability_compatible(from, to, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::basic::BasicTypes;
    use crate::sema::registry::new_type_def;
    use crate::sema::types::TypeTag;
    use crate::syntax::Span;

    fn setup() -> (TypeRegistry, BasicTypes) {
        let mut registry = TypeRegistry::new();
        let basic = BasicTypes::install(&mut registry);
        (registry, basic)
    }

    #[test]
    fn primitive_identity_and_widening() {
        let (registry, basic) = setup();
        let u8_t = basic.immutable(TypeTag::U8);
        let i32_t = basic.immutable(TypeTag::I32);
        let string_t = basic.immutable(TypeTag::String);

        assert!(can_implicitly_cast(&u8_t, &u8_t, &registry));
        assert!(can_implicitly_cast(&u8_t, &i32_t, &registry));
        assert!(can_implicitly_cast(&i32_t, &string_t, &registry));
        assert!(!can_implicitly_cast(&i32_t, &u8_t, &registry));
        assert!(!can_implicitly_cast(&string_t, &i32_t, &registry));
    }

    #[test]
    fn primitives_ignore_mutability() {
        let (registry, basic) = setup();
        let imm = basic.immutable(TypeTag::I16);
        let mutable = imm.with_mutability(Mutability::Mutable);
        // Value types are copied either direction.
        assert!(can_implicitly_cast(&imm, &mutable, &registry));
        assert!(can_implicitly_cast(&mutable, &imm, &registry));
    }

    #[test]
    fn class_casts_to_implemented_interface_only() {
        let (mut registry, _basic) = setup();
        let iface = registry.register(new_type_def(
            TypeTag::Interface,
            "Printable",
            "Printable",
            Vec::new(),
            Span::default(),
        ));
        let other = registry.register(new_type_def(
            TypeTag::Interface,
            "Closable",
            "Closable",
            Vec::new(),
            Span::default(),
        ));
        let class = registry.register(new_type_def(
            TypeTag::Class,
            "Logger",
            "Logger",
            Vec::new(),
            Span::default(),
        ));
        registry.get_mut(class).implements.push(iface);

        let class_t = registry.qualified(class, Mutability::Immutable);
        let iface_t = registry.qualified(iface, Mutability::Immutable);
        let other_t = registry.qualified(other, Mutability::Immutable);

        assert!(can_implicitly_cast(&class_t, &iface_t, &registry));
        assert!(!can_implicitly_cast(&class_t, &other_t, &registry));
        assert!(!can_implicitly_cast(&iface_t, &class_t, &registry));
    }

    #[test]
    fn interface_casts_through_extends() {
        let (mut registry, _basic) = setup();
        let base = registry.register(new_type_def(
            TypeTag::Interface,
            "Readable",
            "Readable",
            Vec::new(),
            Span::default(),
        ));
        let derived = registry.register(new_type_def(
            TypeTag::Interface,
            "Stream",
            "Stream",
            Vec::new(),
            Span::default(),
        ));
        registry.get_mut(derived).implements.push(base);

        let base_t = registry.qualified(base, Mutability::Immutable);
        let derived_t = registry.qualified(derived, Mutability::Immutable);

        assert!(can_implicitly_cast(&derived_t, &base_t, &registry));
        assert!(!can_implicitly_cast(&base_t, &derived_t, &registry));
    }

    #[test]
    fn reference_mutability_narrows_but_never_widens() {
        let (mut registry, _basic) = setup();
        let class = registry.register(new_type_def(
            TypeTag::Class,
            "Buf",
            "Buf",
            Vec::new(),
            Span::default(),
        ));
        let imm = registry.qualified(class, Mutability::Immutable);
        let mutable = registry.qualified(class, Mutability::Mutable);

        assert!(can_implicitly_cast(&mutable, &imm, &registry));
        assert!(!can_implicitly_cast(&imm, &mutable, &registry));
    }

    #[test]
    fn type_references_never_cast() {
        let (registry, basic) = setup();
        let r = Type::reference(basic.immutable(TypeTag::I32));
        assert!(!can_implicitly_cast(&r, &basic.immutable(TypeTag::I32), &registry));
        assert!(!can_implicitly_cast(&r, &r.clone(), &registry));
    }
}
