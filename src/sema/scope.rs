// src/sema/scope.rs
//
// The semantic scope tree.
//
// Any declaration that is also a definition site (class, enum,
// interface) is simultaneously a scope; namespaces and functions are
// scopes but not types. Scopes link parent to children and supply the
// fully qualified names used as cache keys and lookup paths. Nodes are
// created during syntax lowering or specialization and live for the
// whole compilation.

use rustc_hash::FxHashMap;

use crate::sema::registry::TypeDefId;
use crate::sema::types::Type;
use crate::syntax::{RoutineKind, Span};

/// Identifier for a scope node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Namespace,
    Class,
    Enum,
    Interface,
    Function,
    Routine,
}

/// A name bound to a qualified type and a declaration site. Immutable
/// after creation, except enum-member symbols which start as void and
/// are rewritten exactly once by the type pass.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// The one-time payload rewrite for enum-member symbols.
    pub fn rewrite_type(&mut self, name: &str, ty: Type) {
        if let Some(symbol) = self.symbols.get_mut(name) {
            symbol.ty = ty;
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

/// A start-up or event-handler routine collected on a class/enum scope.
#[derive(Debug, Clone)]
pub struct Routine {
    pub name: String,
    pub kind: RoutineKind,
    pub span: Span,
}

#[derive(Debug)]
pub struct ScopeNode {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub name: String,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Member type declarations by bare name. Specialized instances are
    /// not listed here; they are reached through their template's cache.
    pub types: FxHashMap<String, TypeDefId>,
    pub symbols: SymbolTable,
    pub functions: Vec<crate::sema::registry::FunctionId>,
    pub routines: Vec<Routine>,
    /// Back-link to the type this scope defines, for definition sites.
    pub type_def: Option<TypeDefId>,
}

// Capability traits: optional composable behavior on semantic nodes.
// A namespace, a class, and a function share only the traits they need;
// vtables live on the type declaration, not the scope.

pub trait HasSymbols {
    fn symbols(&self) -> &SymbolTable;
    fn symbols_mut(&mut self) -> &mut SymbolTable;
}

pub trait HasRoutines {
    fn routines(&self) -> &[Routine];
    fn add_routine(&mut self, routine: Routine);
}

pub trait HasVTables {
    fn vtables(&self) -> &[crate::sema::vtable::VTable];
}

impl HasSymbols for ScopeNode {
    fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }
}

impl HasRoutines for ScopeNode {
    fn routines(&self) -> &[Routine] {
        &self.routines
    }

    fn add_routine(&mut self, routine: Routine) {
        debug_assert!(
            matches!(self.kind, ScopeKind::Class | ScopeKind::Enum),
            "routines belong to class/enum scopes"
        );
        self.routines.push(routine);
    }
}

impl HasVTables for crate::sema::registry::TypeDef {
    fn vtables(&self) -> &[crate::sema::vtable::VTable] {
        &self.vtables
    }
}

/// Arena of scope nodes; node 0 is the root.
#[derive(Debug)]
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
}

impl ScopeTree {
    pub fn new() -> Self {
        let root = ScopeNode {
            id: ScopeId::new(0),
            kind: ScopeKind::Root,
            name: String::new(),
            parent: None,
            children: Vec::new(),
            types: FxHashMap::default(),
            symbols: SymbolTable::new(),
            functions: Vec::new(),
            routines: Vec::new(),
            type_def: None,
        };
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId::new(0)
    }

    pub fn new_scope(&mut self, kind: ScopeKind, name: impl Into<String>, parent: ScopeId) -> ScopeId {
        let id = ScopeId::new(self.nodes.len() as u32);
        self.nodes.push(ScopeNode {
            id,
            kind,
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
            types: FxHashMap::default(),
            symbols: SymbolTable::new(),
            functions: Vec::new(),
            routines: Vec::new(),
            type_def: None,
        });
        self.get_mut(parent).children.push(id);
        id
    }

    pub fn get(&self, id: ScopeId) -> &ScopeNode {
        &self.nodes[id.index() as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut ScopeNode {
        &mut self.nodes[id.index() as usize]
    }

    /// Dotted path from the root to `id`, e.g. `Ns.Outer.Inner`. Used as
    /// the prefix of type full names and for debugger display.
    pub fn full_path(&self, id: ScopeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get(current);
            if node.kind != ScopeKind::Root {
                parts.push(&node.name);
            }
            cursor = node.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Walk the parent chain looking for a member type with this bare
    /// name.
    pub fn lookup_type(&self, from: ScopeId, name: &str) -> Option<TypeDefId> {
        let mut cursor = Some(from);
        while let Some(current) = cursor {
            let node = self.get(current);
            if let Some(&id) = node.types.get(name) {
                return Some(id);
            }
            cursor = node.parent;
        }
        None
    }

    /// Walk the parent chain looking for a symbol.
    pub fn lookup_symbol(&self, from: ScopeId, name: &str) -> Option<&Symbol> {
        let mut cursor = Some(from);
        while let Some(current) = cursor {
            let node = self.get(current);
            if let Some(symbol) = node.symbols.get(name) {
                return Some(symbol);
            }
            cursor = node.parent;
        }
        None
    }

    /// Find a child namespace of `scope` by name.
    pub fn child_namespace(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.get(scope)
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).kind == ScopeKind::Namespace && self.get(c).name == name)
    }

    /// Resolve a dotted path: leading segments are namespaces (searched
    /// up the parent chain for the first), the final segment is a member
    /// type of the last namespace.
    pub fn resolve_dotted(&self, from: ScopeId, segments: &[&str]) -> Option<TypeDefId> {
        match segments {
            [] => None,
            [single] => self.lookup_type(from, single),
            [first, rest @ ..] => {
                // Find the opening namespace anywhere up the chain.
                let mut ns = None;
                let mut cursor = Some(from);
                while let Some(current) = cursor {
                    if let Some(found) = self.child_namespace(current, first) {
                        ns = Some(found);
                        break;
                    }
                    cursor = self.get(current).parent;
                }
                let mut ns = ns?;
                let (last, mids) = rest.split_last()?;
                for mid in mids {
                    ns = self.child_namespace(ns, mid)?;
                }
                self.get(ns).types.get(*last).copied()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        (0..self.nodes.len() as u32).map(ScopeId::new)
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
