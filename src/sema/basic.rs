// src/sema/basic.rs
//
// Basic type table: the canonical declaration node for every primitive
// tag, plus literal-to-type inference.
//
// One instance per compilation; installed into the registry before any
// user declaration is lowered so primitive ids are stable.

use rustc_hash::FxHashMap;

use crate::sema::registry::{TypeDefId, TypeRegistry, new_type_def};
use crate::sema::types::{Mutability, PRIMITIVE_TAGS, Type, TypeTag};
use crate::syntax::Span;

/// Fixed registry of primitive type declarations.
#[derive(Debug, Clone)]
pub struct BasicTypes {
    by_name: FxHashMap<&'static str, TypeDefId>,
    by_tag: FxHashMap<TypeTag, TypeDefId>,
}

impl BasicTypes {
    /// Register the canonical primitive declarations into `registry`.
    pub fn install(registry: &mut TypeRegistry) -> Self {
        let mut by_name = FxHashMap::default();
        let mut by_tag = FxHashMap::default();
        for (tag, name) in PRIMITIVE_TAGS {
            let id = registry.register(new_type_def(tag, name, name, Vec::new(), Span::default()));
            by_name.insert(name, id);
            by_tag.insert(tag, id);
        }
        Self { by_name, by_tag }
    }

    /// Name to canonical declaration node. `None` for unknown names;
    /// callers raise `UnresolvedName` with their span.
    pub fn lookup(&self, name: &str) -> Option<TypeDefId> {
        self.by_name.get(name).copied()
    }

    /// The canonical declaration for a primitive tag.
    pub fn decl(&self, tag: TypeTag) -> TypeDefId {
        self.by_tag[&tag]
    }

    /// The void declaration, used as the unresolved placeholder.
    pub fn void(&self) -> TypeDefId {
        self.decl(TypeTag::Void)
    }

    /// An immutable qualified value over a primitive tag.
    pub fn immutable(&self, tag: TypeTag) -> Type {
        Type::Primitive {
            decl: self.decl(tag),
            mutability: Mutability::Immutable,
        }
    }

    /// Infer the type of a literal from its source text.
    ///
    /// Candidates are tried in fixed priority order: quoted string,
    /// unsigned widths smallest-first, signed widths smallest-first,
    /// boolean keywords, single-quoted char, float, double. The first
    /// parse wins, so an unsuffixed integer literal lands on the
    /// narrowest representable primitive ("200" is u8, not i32) and
    /// widening only happens at use sites.
    pub fn infer_literal(&self, text: &str) -> Option<Type> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            return Some(self.immutable(TypeTag::String));
        }

        if text.parse::<u8>().is_ok() {
            return Some(self.immutable(TypeTag::U8));
        }
        if text.parse::<u16>().is_ok() {
            return Some(self.immutable(TypeTag::U16));
        }
        if text.parse::<u32>().is_ok() {
            return Some(self.immutable(TypeTag::U32));
        }
        if text.parse::<u64>().is_ok() {
            return Some(self.immutable(TypeTag::U64));
        }

        if text.parse::<i8>().is_ok() {
            return Some(self.immutable(TypeTag::I8));
        }
        if text.parse::<i16>().is_ok() {
            return Some(self.immutable(TypeTag::I16));
        }
        if text.parse::<i32>().is_ok() {
            return Some(self.immutable(TypeTag::I32));
        }
        if text.parse::<i64>().is_ok() {
            return Some(self.immutable(TypeTag::I64));
        }

        if text == "true" || text == "false" {
            return Some(self.immutable(TypeTag::Bool));
        }

        if text.len() >= 3
            && text.starts_with('\'')
            && text.ends_with('\'')
            && text[1..text.len() - 1].chars().count() == 1
        {
            return Some(self.immutable(TypeTag::Char));
        }

        // Overflowing parses yield infinity rather than an error; a
        // finite check keeps double reachable for wide exponents.
        if let Ok(f) = text.parse::<f32>()
            && f.is_finite()
        {
            return Some(self.immutable(TypeTag::Float));
        }
        if let Ok(d) = text.parse::<f64>()
            && d.is_finite()
        {
            return Some(self.immutable(TypeTag::Double));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TypeRegistry, BasicTypes) {
        let mut registry = TypeRegistry::new();
        let basic = BasicTypes::install(&mut registry);
        (registry, basic)
    }

    fn tag_of(basic: &BasicTypes, registry: &TypeRegistry, text: &str) -> Option<TypeTag> {
        basic.infer_literal(text).map(|t| t.tag(registry))
    }

    #[test]
    fn lookup_primitives_by_name() {
        let (registry, basic) = setup();
        let i32_id = basic.lookup("i32").unwrap();
        assert_eq!(registry.get(i32_id).tag, TypeTag::I32);
        assert_eq!(&*registry.get(i32_id).full_name, "i32");
        assert!(basic.lookup("quux").is_none());
    }

    #[test]
    fn integer_literals_land_on_narrowest_tier() {
        let (registry, basic) = setup();
        assert_eq!(tag_of(&basic, &registry, "5"), Some(TypeTag::U8));
        assert_eq!(tag_of(&basic, &registry, "200"), Some(TypeTag::U8));
        assert_eq!(tag_of(&basic, &registry, "300"), Some(TypeTag::U16));
        assert_eq!(tag_of(&basic, &registry, "70000"), Some(TypeTag::U32));
        assert_eq!(tag_of(&basic, &registry, "5000000000"), Some(TypeTag::U64));
        assert_eq!(tag_of(&basic, &registry, "-5"), Some(TypeTag::I8));
        assert_eq!(tag_of(&basic, &registry, "-200"), Some(TypeTag::I16));
        assert_eq!(tag_of(&basic, &registry, "-40000"), Some(TypeTag::I32));
        assert_eq!(tag_of(&basic, &registry, "-5000000000"), Some(TypeTag::I64));
    }

    #[test]
    fn string_bool_char_literals() {
        let (registry, basic) = setup();
        assert_eq!(tag_of(&basic, &registry, "\"abc\""), Some(TypeTag::String));
        assert_eq!(tag_of(&basic, &registry, "true"), Some(TypeTag::Bool));
        assert_eq!(tag_of(&basic, &registry, "false"), Some(TypeTag::Bool));
        assert_eq!(tag_of(&basic, &registry, "'x'"), Some(TypeTag::Char));
    }

    #[test]
    fn float_literals() {
        let (registry, basic) = setup();
        assert_eq!(tag_of(&basic, &registry, "3.5"), Some(TypeTag::Float));
        // Too wide for f32, still finite as f64.
        assert_eq!(tag_of(&basic, &registry, "1e60"), Some(TypeTag::Double));
    }

    #[test]
    fn inference_results_are_immutable() {
        let (_registry, basic) = setup();
        let t = basic.infer_literal("42").unwrap();
        assert_eq!(t.mutability(), Mutability::Immutable);
    }

    #[test]
    fn unparsable_text_has_no_match() {
        let (_registry, basic) = setup();
        assert!(basic.infer_literal("").is_none());
        assert!(basic.infer_literal("hello").is_none());
        assert!(basic.infer_literal("''").is_none());
        assert!(basic.infer_literal("'ab'").is_none());
    }
}
