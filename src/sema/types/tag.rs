// src/sema/types/tag.rs
//
// The closed tag set for Tern types. Tags drive dispatch for the
// implicit-cast rules and primitive lookup; everything else about a type
// lives on its declaration node in the registry.

/// Kind tag for every type the semantic layer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    // Signed integers
    I8,
    I16,
    I32,
    I64,
    // Unsigned integers
    U8,
    U16,
    U32,
    U64,
    // Floating point
    Float,
    Double,
    Char,
    String,
    Void,
    /// Function signature; never a declaration node.
    Fun,
    Class,
    Enum,
    Interface,
    /// A type name carried as a value (type-test expressions).
    TypeReference,
}

/// Tags that own a canonical declaration node in the basic type table,
/// paired with their source-level names.
pub const PRIMITIVE_TAGS: [(TypeTag, &str); 14] = [
    (TypeTag::Bool, "bool"),
    (TypeTag::I8, "i8"),
    (TypeTag::I16, "i16"),
    (TypeTag::I32, "i32"),
    (TypeTag::I64, "i64"),
    (TypeTag::U8, "u8"),
    (TypeTag::U16, "u16"),
    (TypeTag::U32, "u32"),
    (TypeTag::U64, "u64"),
    (TypeTag::Float, "float"),
    (TypeTag::Double, "double"),
    (TypeTag::Char, "char"),
    (TypeTag::String, "string"),
    (TypeTag::Void, "void"),
];

impl TypeTag {
    /// Check if this tag is a signed integer.
    pub fn is_signed(self) -> bool {
        matches!(self, TypeTag::I8 | TypeTag::I16 | TypeTag::I32 | TypeTag::I64)
    }

    /// Check if this tag is an unsigned integer.
    pub fn is_unsigned(self) -> bool {
        matches!(self, TypeTag::U8 | TypeTag::U16 | TypeTag::U32 | TypeTag::U64)
    }

    /// Check if this tag is an integer (signed or unsigned).
    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    /// Check if this tag is a floating point type.
    pub fn is_float(self) -> bool {
        matches!(self, TypeTag::Float | TypeTag::Double)
    }

    /// Check if this tag has a canonical declaration in the basic type
    /// table. Primitives are value types: copied on every assignment, so
    /// mutability never restricts casting between them.
    pub fn is_primitive(self) -> bool {
        !matches!(
            self,
            TypeTag::Fun | TypeTag::Class | TypeTag::Enum | TypeTag::Interface | TypeTag::TypeReference
        )
    }

    /// Check if this tag can be implicitly widened to `target`.
    ///
    /// The table lists every reachable wider tier explicitly; lookup is a
    /// single membership test, never a transitive traversal. Unsigned
    /// integers have no same-width signed edge (u8 widens to i16, not i8):
    /// the same-width conversion can overflow, so it stays explicit.
    pub fn can_widen_to(self, target: TypeTag) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            // Signed to wider signed, floats, and string
            (
                TypeTag::I8,
                TypeTag::I16 | TypeTag::I32 | TypeTag::I64 | TypeTag::Float | TypeTag::Double | TypeTag::String,
            ) => true,
            (
                TypeTag::I16,
                TypeTag::I32 | TypeTag::I64 | TypeTag::Float | TypeTag::Double | TypeTag::String,
            ) => true,
            (TypeTag::I32, TypeTag::I64 | TypeTag::Float | TypeTag::Double | TypeTag::String) => true,
            (TypeTag::I64, TypeTag::Float | TypeTag::Double | TypeTag::String) => true,
            // Unsigned to wider unsigned, wide-enough signed, floats, string
            (
                TypeTag::U8,
                TypeTag::U16
                | TypeTag::U32
                | TypeTag::U64
                | TypeTag::I16
                | TypeTag::I32
                | TypeTag::I64
                | TypeTag::Float
                | TypeTag::Double
                | TypeTag::String,
            ) => true,
            (
                TypeTag::U16,
                TypeTag::U32
                | TypeTag::U64
                | TypeTag::I32
                | TypeTag::I64
                | TypeTag::Float
                | TypeTag::Double
                | TypeTag::String,
            ) => true,
            (
                TypeTag::U32,
                TypeTag::U64 | TypeTag::I64 | TypeTag::Float | TypeTag::Double | TypeTag::String,
            ) => true,
            (TypeTag::U64, TypeTag::Float | TypeTag::Double | TypeTag::String) => true,
            // Bool widens only to string
            (TypeTag::Bool, TypeTag::String) => true,
            _ => false,
        }
    }

    /// Get the tag name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::I8 => "i8",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::U8 => "u8",
            TypeTag::U16 => "u16",
            TypeTag::U32 => "u32",
            TypeTag::U64 => "u64",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Char => "char",
            TypeTag::String => "string",
            TypeTag::Void => "void",
            TypeTag::Fun => "fun",
            TypeTag::Class => "class",
            TypeTag::Enum => "enum",
            TypeTag::Interface => "interface",
            TypeTag::TypeReference => "type reference",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_predicates() {
        assert!(TypeTag::I32.is_signed());
        assert!(!TypeTag::U32.is_signed());
        assert!(TypeTag::U8.is_unsigned());
        assert!(TypeTag::I8.is_integer());
        assert!(TypeTag::U64.is_integer());
        assert!(TypeTag::Float.is_float());
        assert!(TypeTag::Double.is_float());
        assert!(!TypeTag::I64.is_float());
        assert!(TypeTag::Void.is_primitive());
        assert!(!TypeTag::Class.is_primitive());
        assert!(!TypeTag::TypeReference.is_primitive());
    }

    #[test]
    fn widening_is_reflexive() {
        for (tag, _) in PRIMITIVE_TAGS {
            assert!(tag.can_widen_to(tag), "{} should widen to itself", tag);
        }
    }

    #[test]
    fn signed_widening() {
        assert!(TypeTag::I8.can_widen_to(TypeTag::I16));
        assert!(TypeTag::I8.can_widen_to(TypeTag::I64));
        assert!(TypeTag::I32.can_widen_to(TypeTag::Double));
        assert!(TypeTag::I64.can_widen_to(TypeTag::String));
        assert!(!TypeTag::I64.can_widen_to(TypeTag::I32));
        assert!(!TypeTag::I32.can_widen_to(TypeTag::U64));
    }

    #[test]
    fn unsigned_widening() {
        assert!(TypeTag::U8.can_widen_to(TypeTag::U16));
        assert!(TypeTag::U8.can_widen_to(TypeTag::I32));
        assert!(TypeTag::U32.can_widen_to(TypeTag::I64));
        assert!(TypeTag::U64.can_widen_to(TypeTag::Double));
        // No same-width signed edge
        assert!(!TypeTag::U8.can_widen_to(TypeTag::I8));
        assert!(!TypeTag::U64.can_widen_to(TypeTag::I64));
        assert!(!TypeTag::I32.can_widen_to(TypeTag::U8));
    }

    #[test]
    fn bool_widens_only_to_string() {
        assert!(TypeTag::Bool.can_widen_to(TypeTag::String));
        assert!(!TypeTag::Bool.can_widen_to(TypeTag::I8));
        assert!(!TypeTag::Bool.can_widen_to(TypeTag::Double));
    }

    #[test]
    fn no_float_or_char_edges() {
        assert!(!TypeTag::Float.can_widen_to(TypeTag::Double));
        assert!(!TypeTag::Char.can_widen_to(TypeTag::String));
        assert!(!TypeTag::String.can_widen_to(TypeTag::Bool));
    }
}
