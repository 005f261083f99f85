// src/sema/registry.rs
//
// Arena registry for type-declaration nodes and function declarations.
//
// IDs are indices into plain vectors; a full-name index provides the
// collision-free identity the rest of the compiler keys on. A template
// owns its specializations through its instance cache; an instance holds
// a non-owning id back to its template.

use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::sema::types::{Mutability, Type, TypeTag};
use crate::sema::vtable::VTable;
use crate::syntax::{ClassDecl, EnumDecl, FunctionDecl, InterfaceDecl, Span};

/// Identifier for a type declaration node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefId(u32);

impl TypeDefId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identifier for a function declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(u32);

impl FunctionId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Most types implement 0-2 interfaces; keep the list inline.
pub type ImplementsVec = SmallVec<[TypeDefId; 2]>;

/// Shared handle to the syntax declaration a type was lowered from.
/// Specialized clones share the same handle, so catch-up re-elaborates
/// the instance from the original declaration under its own bindings.
#[derive(Debug, Clone)]
pub enum TypeOrigin {
    Class(Rc<ClassDecl>),
    Enum(Rc<EnumDecl>),
    Interface(Rc<InterfaceDecl>),
}

/// One enum member. The payload starts as void and is rewritten exactly
/// once during the type pass; the discriminant is unique within the enum.
#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub discriminant: i64,
    pub payload: Type,
    pub span: Span,
}

/// An unqualified, possibly-generic named type declaration.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub id: TypeDefId,
    pub tag: TypeTag,
    /// Bare declared name.
    pub name: String,
    /// Rendered name including scope path and, once specialized, the
    /// bracketed argument list. Unique per fully elaborated node.
    pub full_name: Arc<str>,
    /// Ordered generic parameter names; empty for concrete declarations.
    pub generic_params: Vec<String>,
    /// Bound concrete arguments; empty unless specialized.
    pub generic_args: Vec<Type>,
    /// Non-owning back-reference to the template this was specialized from.
    pub template: Option<TypeDefId>,
    /// The template's owning cache of every specialization it produced,
    /// keyed by rendered full name.
    pub instances: FxHashMap<Arc<str>, TypeDefId>,
    /// Directly implemented interfaces (extends, for interfaces),
    /// resolved during the type pass.
    pub implements: ImplementsVec,
    /// Enum members; rebuilt per instance so clones never alias the
    /// template's list.
    pub members: Vec<EnumMember>,
    /// Dispatch tables, class/enum only; rebuilt per specialization.
    pub vtables: Vec<VTable>,
    /// The scope this declaration defines, for class/enum/interface.
    pub scope: Option<crate::sema::scope::ScopeId>,
    pub origin: Option<TypeOrigin>,
    pub span: Span,
    /// Pass cursor: number of pipeline passes completed on this node.
    pub passes_done: usize,
    /// Set while a pass runs on this node; re-entry is a compile error.
    pub in_progress: bool,
}

impl TypeDef {
    /// A generic declaration whose parameters are still unbound.
    pub fn is_generic_template(&self) -> bool {
        !self.generic_params.is_empty() && self.generic_args.is_empty()
    }

    /// A concrete instance produced by the specialization engine.
    pub fn is_specialized(&self) -> bool {
        !self.generic_args.is_empty()
    }

    /// Parameter-name to bound-argument pairs for a specialized instance.
    pub fn generic_binding(&self) -> FxHashMap<String, Type> {
        self.generic_params
            .iter()
            .cloned()
            .zip(self.generic_args.iter().cloned())
            .collect()
    }
}

/// One function parameter with its resolved type.
#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

/// A function declaration with its resolved signature.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub id: FunctionId,
    pub name: String,
    pub generic_params: Vec<String>,
    pub params: Vec<FunctionParam>,
    pub return_type: Type,
    /// The scope this function defines (its parameters live there).
    pub scope: crate::sema::scope::ScopeId,
    /// The scope that declared it.
    pub owner: crate::sema::scope::ScopeId,
    pub origin: Rc<FunctionDecl>,
    pub template: Option<FunctionId>,
    /// Specializations of this generic function, keyed by rendered name.
    pub instances: FxHashMap<Arc<str>, FunctionId>,
    pub span: Span,
}

impl FunctionDef {
    pub fn is_generic_template(&self) -> bool {
        !self.generic_params.is_empty() && self.template.is_none()
    }
}

/// Registry of every type and function declaration in one compilation.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    defs: Vec<TypeDef>,
    functions: Vec<FunctionDef>,
    by_full_name: FxHashMap<Arc<str>, TypeDefId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type declaration and index it by full name.
    pub fn register(&mut self, mut def: TypeDef) -> TypeDefId {
        let id = TypeDefId::new(self.defs.len() as u32);
        def.id = id;
        self.by_full_name.insert(def.full_name.clone(), id);
        self.defs.push(def);
        id
    }

    pub fn get(&self, id: TypeDefId) -> &TypeDef {
        &self.defs[id.index() as usize]
    }

    pub fn get_mut(&mut self, id: TypeDefId) -> &mut TypeDef {
        &mut self.defs[id.index() as usize]
    }

    /// Look up a fully elaborated declaration by rendered full name.
    /// This is how a specialization created under one path is found from
    /// another.
    pub fn by_full_name(&self, full_name: &str) -> Option<TypeDefId> {
        self.by_full_name.get(full_name).copied()
    }

    pub fn register_function(&mut self, mut def: FunctionDef) -> FunctionId {
        let id = FunctionId::new(self.functions.len() as u32);
        def.id = id;
        self.functions.push(def);
        id
    }

    pub fn function(&self, id: FunctionId) -> &FunctionDef {
        &self.functions[id.index() as usize]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionDef {
        &mut self.functions[id.index() as usize]
    }

    /// Qualify a declaration with a mutability, picking the value variant
    /// from the declaration's tag.
    pub fn qualified(&self, decl: TypeDefId, mutability: Mutability) -> Type {
        match self.get(decl).tag {
            TypeTag::Class => Type::Class { decl, mutability },
            TypeTag::Enum => Type::Enum { decl, mutability },
            TypeTag::Interface => Type::Interface { decl, mutability },
            _ => Type::Primitive { decl, mutability },
        }
    }

    /// Render the full name a specialization of `template` with `args`
    /// would carry.
    pub fn render_specialized_name(&self, template: TypeDefId, args: &[Type]) -> String {
        let base = &self.get(template).full_name;
        let rendered: Vec<String> = args.iter().map(|a| a.name_in(self)).collect();
        format!("{}<{}>", base, rendered.join(", "))
    }

    /// Render a function signature for diagnostics:
    /// `name(i32, string) -> bool`.
    pub fn render_signature(&self, id: FunctionId) -> String {
        let def = self.function(id);
        let params: Vec<String> = def.params.iter().map(|p| p.ty.name_in(self)).collect();
        format!(
            "{}({}) -> {}",
            def.name,
            params.join(", "),
            def.return_type.name_in(self)
        )
    }

    /// The transitive implemented-interface closure of a declaration:
    /// direct entries plus everything reachable through interface extends.
    pub fn implements_closure(&self, id: TypeDefId) -> Vec<TypeDefId> {
        let mut out: Vec<TypeDefId> = Vec::new();
        let mut queue: Vec<TypeDefId> = self.get(id).implements.to_vec();
        while let Some(next) = queue.pop() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            queue.extend(self.get(next).implements.iter().copied());
        }
        out
    }

    /// Whether `id`'s implemented-interface set contains an entry whose
    /// full name matches `interface`'s. Generic arguments are part of the
    /// name, so distinct instantiations are distinct targets.
    pub fn implements_interface(&self, id: TypeDefId, interface: TypeDefId) -> bool {
        let target = &self.get(interface).full_name;
        self.implements_closure(id)
            .iter()
            .any(|&i| self.get(i).full_name == *target)
    }

    pub fn type_count(&self) -> usize {
        self.defs.len()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeDefId> + '_ {
        (0..self.defs.len() as u32).map(TypeDefId::new)
    }
}

/// Build an unregistered declaration node with empty semantic state.
/// The caller fills scope/origin before registering.
pub fn new_type_def(
    tag: TypeTag,
    name: impl Into<String>,
    full_name: impl Into<Arc<str>>,
    generic_params: Vec<String>,
    span: Span,
) -> TypeDef {
    TypeDef {
        id: TypeDefId::new(0),
        tag,
        name: name.into(),
        full_name: full_name.into(),
        generic_params,
        generic_args: Vec::new(),
        template: None,
        instances: FxHashMap::default(),
        implements: ImplementsVec::new(),
        members: Vec::new(),
        vtables: Vec::new(),
        scope: None,
        origin: None,
        span,
        passes_done: 0,
        in_progress: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::basic::BasicTypes;

    #[test]
    fn register_and_lookup_by_full_name() {
        let mut registry = TypeRegistry::new();
        let def = new_type_def(TypeTag::Class, "Box", "Box", vec!["T".into()], Span::default());
        let id = registry.register(def);

        assert_eq!(registry.by_full_name("Box"), Some(id));
        assert!(registry.get(id).is_generic_template());
        assert!(!registry.get(id).is_specialized());
    }

    #[test]
    fn full_name_equality_spans_duplicate_entries() {
        let mut registry = TypeRegistry::new();
        let a = registry.register(new_type_def(
            TypeTag::Class,
            "Point",
            "Point",
            Vec::new(),
            Span::default(),
        ));
        let b = registry.register(new_type_def(
            TypeTag::Class,
            "Point",
            "Point",
            Vec::new(),
            Span::default(),
        ));
        assert_ne!(a, b);

        let ta = registry.qualified(a, Mutability::Immutable);
        let tb = registry.qualified(b, Mutability::Immutable);
        // Different ids, same rendered name: identity is the name.
        assert!(ta.equals(&tb, &registry));
    }

    #[test]
    fn render_specialized_name_brackets_arguments() {
        let mut registry = TypeRegistry::new();
        let basic = BasicTypes::install(&mut registry);
        let tmpl = registry.register(new_type_def(
            TypeTag::Class,
            "Map",
            "Map",
            vec!["K".into(), "V".into()],
            Span::default(),
        ));
        let name = registry.render_specialized_name(
            tmpl,
            &[basic.immutable(TypeTag::String), basic.immutable(TypeTag::I32)],
        );
        assert_eq!(name, "Map<string, i32>");
    }

    #[test]
    fn implements_closure_walks_extends() {
        let mut registry = TypeRegistry::new();
        let base = registry.register(new_type_def(
            TypeTag::Interface,
            "Base",
            "Base",
            Vec::new(),
            Span::default(),
        ));
        let mid = registry.register(new_type_def(
            TypeTag::Interface,
            "Mid",
            "Mid",
            Vec::new(),
            Span::default(),
        ));
        let class = registry.register(new_type_def(
            TypeTag::Class,
            "C",
            "C",
            Vec::new(),
            Span::default(),
        ));
        registry.get_mut(mid).implements.push(base);
        registry.get_mut(class).implements.push(mid);

        assert!(registry.implements_interface(class, mid));
        assert!(registry.implements_interface(class, base));
        assert!(!registry.implements_interface(mid, class));
    }
}
