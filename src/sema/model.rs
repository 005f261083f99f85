// src/sema/model.rs
//
// The compilation session: one object owning the registry, scope tree,
// basic type table, and diagnostics, plus the pass pipeline and the
// catch-up driver.
//
// The pipeline is synchronous and single-threaded. Nodes created lazily
// mid-pipeline (specialization requested while elaborating another
// declaration) are driven through every pass the session has already
// completed, tracked by a per-node pass cursor, so callers always see a
// fully elaborated instance.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::errors::{SemaResult, SemanticError};
use crate::sema::basic::BasicTypes;
use crate::sema::registry::{
    EnumMember, FunctionDef, FunctionId, FunctionParam, ImplementsVec, TypeDefId, TypeOrigin,
    TypeRegistry, new_type_def,
};
use crate::sema::resolve::resolve_type_expr;
use crate::sema::scope::{HasRoutines, HasSymbols, Routine, ScopeId, ScopeKind, ScopeTree, Symbol};
use crate::sema::types::{Type, TypeTag};
use crate::syntax::{ClassDecl, Declaration, EnumDecl, FunctionDecl, InterfaceDecl, Program};

/// The semantic passes, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Member scopes, functions, routines, enum-member symbols.
    CollectSymbols,
    /// Implements/extends, field symbols, signatures, enum payloads.
    ResolveTypes,
    /// Interface dispatch tables.
    BuildVTables,
}

impl Pass {
    pub const ALL: [Pass; 3] = [Pass::CollectSymbols, Pass::ResolveTypes, Pass::BuildVTables];
    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        match self {
            Pass::CollectSymbols => 0,
            Pass::ResolveTypes => 1,
            Pass::BuildVTables => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pass::CollectSymbols => "collect-symbols",
            Pass::ResolveTypes => "resolve-types",
            Pass::BuildVTables => "build-vtables",
        }
    }
}

/// One compilation from lowered declarations to resolved types and
/// vtables. All shared mutable state (template caches, the global pass
/// cursor) lives here, never in ambient globals.
pub struct Compilation {
    pub registry: TypeRegistry,
    pub scopes: ScopeTree,
    pub basic: BasicTypes,
    /// Diagnostics gathered before the fatal one; the driver aggregates
    /// these across files.
    pub diagnostics: Vec<SemanticError>,
    /// The cursor every reachable node must currently be advanced to:
    /// `pass index + 1` while a pass is in flight, `Pass::COUNT` after
    /// the pipeline finishes.
    pass_goal: usize,
    /// Type declarations in lowering order; grows as specializations
    /// are created.
    analyzed: Vec<TypeDefId>,
    /// Templates whose instances are mid-catch-up, outermost first. A
    /// cache miss for a template already on this stack is an expansive
    /// cycle and reported as re-entrant specialization.
    pub(crate) specializing: Vec<TypeDefId>,
}

impl Compilation {
    pub fn new() -> Self {
        let mut registry = TypeRegistry::new();
        let basic = BasicTypes::install(&mut registry);
        Self {
            registry,
            scopes: ScopeTree::new(),
            basic,
            diagnostics: Vec::new(),
            pass_goal: 0,
            analyzed: Vec::new(),
            specializing: Vec::new(),
        }
    }

    /// Lower a program and run the full pipeline. The first fatal error
    /// aborts semantic analysis; earlier diagnostics stay available in
    /// `self.diagnostics`.
    pub fn compile(&mut self, program: &Program) -> SemaResult<()> {
        self.lower_program(program);
        self.run_passes()
    }

    /// The global pass cursor (number of passes every declared node has
    /// been driven through, or is being driven through right now).
    pub fn pass_goal(&self) -> usize {
        self.pass_goal
    }

    /// The void type, used as the unresolved placeholder.
    pub fn void_type(&self) -> Type {
        self.basic.immutable(TypeTag::Void)
    }

    // =========================================================================
    // Syntax lowering
    // =========================================================================

    /// Create scope nodes and declaration entries for a parsed program.
    /// One scope per declaration; nothing is resolved yet.
    pub fn lower_program(&mut self, program: &Program) {
        let root = self.scopes.root();
        for decl in &program.declarations {
            self.lower_declaration(root, decl);
        }
    }

    fn lower_declaration(&mut self, parent: ScopeId, decl: &Declaration) {
        match decl {
            Declaration::Namespace(ns) => {
                // Re-declared namespaces merge into one scope.
                let scope = self
                    .scopes
                    .child_namespace(parent, &ns.name)
                    .unwrap_or_else(|| self.scopes.new_scope(ScopeKind::Namespace, &ns.name, parent));
                for child in &ns.declarations {
                    self.lower_declaration(scope, child);
                }
            }
            Declaration::Class(class) => {
                self.lower_type_decl(parent, TypeTag::Class, class.name.clone(), class);
            }
            Declaration::Enum(decl) => {
                self.lower_enum_decl(parent, decl);
            }
            Declaration::Interface(decl) => {
                self.lower_interface_decl(parent, decl);
            }
            Declaration::Function(func) => {
                self.register_function(parent, Rc::new(func.clone()));
            }
        }
    }

    fn lower_type_decl(
        &mut self,
        parent: ScopeId,
        tag: TypeTag,
        name: String,
        class: &ClassDecl,
    ) -> TypeDefId {
        self.install_type(
            parent,
            tag,
            name,
            class.generic_params.clone(),
            TypeOrigin::Class(Rc::new(class.clone())),
            class.span,
        )
    }

    fn lower_enum_decl(&mut self, parent: ScopeId, decl: &EnumDecl) -> TypeDefId {
        self.install_type(
            parent,
            TypeTag::Enum,
            decl.name.clone(),
            decl.generic_params.clone(),
            TypeOrigin::Enum(Rc::new(decl.clone())),
            decl.span,
        )
    }

    fn lower_interface_decl(&mut self, parent: ScopeId, decl: &InterfaceDecl) -> TypeDefId {
        self.install_type(
            parent,
            TypeTag::Interface,
            decl.name.clone(),
            decl.generic_params.clone(),
            TypeOrigin::Interface(Rc::new(decl.clone())),
            decl.span,
        )
    }

    fn install_type(
        &mut self,
        parent: ScopeId,
        tag: TypeTag,
        name: String,
        generic_params: Vec<String>,
        origin: TypeOrigin,
        span: crate::syntax::Span,
    ) -> TypeDefId {
        let kind = match tag {
            TypeTag::Enum => ScopeKind::Enum,
            TypeTag::Interface => ScopeKind::Interface,
            _ => ScopeKind::Class,
        };
        let scope = self.scopes.new_scope(kind, &name, parent);
        let full_name = self.scopes.full_path(scope);
        let mut def = new_type_def(tag, &name, full_name, generic_params, span);
        def.scope = Some(scope);
        def.origin = Some(origin);
        let id = self.registry.register(def);
        self.scopes.get_mut(scope).type_def = Some(id);
        self.scopes.get_mut(parent).types.insert(name, id);
        self.analyzed.push(id);
        id
    }

    /// Create a function declaration with an unresolved signature and
    /// its own scope under `owner`.
    pub(crate) fn register_function(
        &mut self,
        owner: ScopeId,
        decl: Rc<FunctionDecl>,
    ) -> FunctionId {
        let scope = self.scopes.new_scope(ScopeKind::Function, &decl.name, owner);
        let void = self.void_type();
        let params = decl
            .params
            .iter()
            .map(|p| FunctionParam {
                name: p.name.clone(),
                ty: void.clone(),
                span: p.span,
            })
            .collect();
        let id = self.registry.register_function(FunctionDef {
            id: FunctionId::new(0),
            name: decl.name.clone(),
            generic_params: decl.generic_params.clone(),
            params,
            return_type: void,
            scope,
            owner,
            span: decl.span,
            origin: decl,
            template: None,
            instances: FxHashMap::default(),
        });
        self.scopes.get_mut(owner).functions.push(id);
        id
    }

    // =========================================================================
    // Pass pipeline & catch-up
    // =========================================================================

    /// Run every pass over every declared node, in pipeline order.
    pub fn run_passes(&mut self) -> SemaResult<()> {
        for pass in Pass::ALL {
            self.pass_goal = pass.index() + 1;
            tracing::debug!(pass = pass.name(), "running semantic pass");
            let goal = self.pass_goal;
            let mut next = 0;
            // `analyzed` grows while iterating: specializations created
            // by this pass append themselves and are already caught up.
            while next < self.analyzed.len() {
                let def = self.analyzed[next];
                next += 1;
                if let Err(err) = self.advance_to(def, goal) {
                    self.diagnostics.push(err.clone());
                    return Err(err);
                }
            }
            if pass == Pass::ResolveTypes
                && let Err(err) = self.resolve_free_functions()
            {
                self.diagnostics.push(err.clone());
                return Err(err);
            }
        }
        Ok(())
    }

    /// Drive one node through the already-completed passes. Used by the
    /// specialization engine for freshly created instances.
    pub(crate) fn catch_up(&mut self, def: TypeDefId) -> SemaResult<()> {
        self.advance_to(def, self.pass_goal)
    }

    /// Ensure `def` has completed `pass` before reading its results.
    pub(crate) fn require_elaborated(&mut self, def: TypeDefId, pass: Pass) -> SemaResult<()> {
        self.advance_to(def, pass.index() + 1)
    }

    /// Advance one node's pass cursor to `goal`, running each missing
    /// pass on that node alone. Re-entering a node that is mid-
    /// elaboration is the re-entrant-specialization error: recursing
    /// through it could never terminate.
    pub(crate) fn advance_to(&mut self, def_id: TypeDefId, goal: usize) -> SemaResult<()> {
        let def = self.registry.get(def_id);
        if def.passes_done >= goal {
            return Ok(());
        }
        if def.in_progress {
            return Err(SemanticError::ReentrantSpecialization {
                name: def.full_name.to_string(),
                span: def.span.into(),
            });
        }
        if def.is_generic_template() {
            // Templates are registered and named but never elaborated;
            // only concrete instances run the pipeline.
            self.registry.get_mut(def_id).passes_done = goal;
            return Ok(());
        }

        self.registry.get_mut(def_id).in_progress = true;
        let mut result = Ok(());
        while self.registry.get(def_id).passes_done < goal {
            let pass = self.registry.get(def_id).passes_done;
            if let Err(err) = self.run_pass(def_id, pass) {
                result = Err(err);
                break;
            }
            self.registry.get_mut(def_id).passes_done = pass + 1;
        }
        self.registry.get_mut(def_id).in_progress = false;
        result
    }

    fn run_pass(&mut self, def_id: TypeDefId, pass: usize) -> SemaResult<()> {
        tracing::trace!(
            def = %self.registry.get(def_id).full_name,
            pass,
            "advancing node"
        );
        match pass {
            0 => self.collect_symbols(def_id),
            1 => self.resolve_types(def_id),
            2 => crate::sema::vtable::build_vtables(self, def_id),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Pass bodies
    // =========================================================================

    fn collect_symbols(&mut self, def_id: TypeDefId) -> SemaResult<()> {
        let def = self.registry.get(def_id);
        let (Some(origin), Some(scope)) = (def.origin.clone(), def.scope) else {
            return Ok(());
        };
        match origin {
            TypeOrigin::Class(decl) => {
                self.collect_functions(scope, &decl.functions);
                self.collect_routines(scope, &decl.routines);
            }
            TypeOrigin::Enum(decl) => {
                self.collect_functions(scope, &decl.functions);
                self.collect_routines(scope, &decl.routines);
                self.collect_enum_members(def_id, scope, &decl);
            }
            TypeOrigin::Interface(decl) => {
                self.collect_functions(scope, &decl.functions);
            }
        }
        Ok(())
    }

    fn collect_functions(&mut self, scope: ScopeId, decls: &[FunctionDecl]) {
        for decl in decls {
            self.register_function(scope, Rc::new(decl.clone()));
        }
    }

    fn collect_routines(&mut self, scope: ScopeId, decls: &[crate::syntax::RoutineDecl]) {
        for decl in decls {
            self.scopes.get_mut(scope).add_routine(Routine {
                name: decl.name.clone(),
                kind: decl.kind,
                span: decl.span,
            });
        }
    }

    /// Build the member list from the origin, assigning discriminants
    /// sequentially where not explicit. Each instance rebuilds its own
    /// members, so specialized clones never alias the template's list.
    fn collect_enum_members(&mut self, def_id: TypeDefId, scope: ScopeId, decl: &EnumDecl) {
        let void = self.void_type();
        let mut members: Vec<EnumMember> = Vec::with_capacity(decl.members.len());
        let mut next = 0i64;
        for member in &decl.members {
            let discriminant = member.discriminant.unwrap_or(next);
            next = discriminant + 1;
            debug_assert!(
                members.iter().all(|m| m.discriminant != discriminant),
                "duplicate enum discriminant {discriminant}; the parser owns literal validation"
            );
            self.scopes.get_mut(scope).symbols_mut().insert(Symbol {
                name: member.name.clone(),
                ty: void.clone(),
                span: member.span,
            });
            members.push(EnumMember {
                name: member.name.clone(),
                discriminant,
                payload: void.clone(),
                span: member.span,
            });
        }
        self.registry.get_mut(def_id).members = members;
    }

    fn resolve_types(&mut self, def_id: TypeDefId) -> SemaResult<()> {
        let def = self.registry.get(def_id);
        let (Some(origin), Some(scope)) = (def.origin.clone(), def.scope) else {
            return Ok(());
        };
        let binding = def.generic_binding();
        match origin {
            TypeOrigin::Class(decl) => {
                self.resolve_implements(def_id, scope, &decl.implements, &binding)?;
                for field in &decl.fields {
                    let ty = resolve_type_expr(self, scope, &field.ty, &binding)?;
                    self.scopes.get_mut(scope).symbols_mut().insert(Symbol {
                        name: field.name.clone(),
                        ty,
                        span: field.span,
                    });
                }
                self.resolve_scope_functions(scope, &binding)
            }
            TypeOrigin::Enum(decl) => {
                self.resolve_implements(def_id, scope, &decl.implements, &binding)?;
                for (index, member) in decl.members.iter().enumerate() {
                    let payload = match &member.payload {
                        Some(expr) => resolve_type_expr(self, scope, expr, &binding)?,
                        None => self.void_type(),
                    };
                    // The one allowed symbol rewrite: member payloads
                    // start as void and resolve here, exactly once.
                    self.registry.get_mut(def_id).members[index].payload = payload.clone();
                    self.scopes
                        .get_mut(scope)
                        .symbols_mut()
                        .rewrite_type(&member.name, payload);
                }
                self.resolve_scope_functions(scope, &binding)
            }
            TypeOrigin::Interface(decl) => {
                self.resolve_implements(def_id, scope, &decl.extends, &binding)?;
                self.resolve_scope_functions(scope, &binding)
            }
        }
    }

    fn resolve_implements(
        &mut self,
        def_id: TypeDefId,
        scope: ScopeId,
        exprs: &[crate::syntax::TypeExpr],
        binding: &FxHashMap<String, Type>,
    ) -> SemaResult<()> {
        let mut implements = ImplementsVec::new();
        for expr in exprs {
            let ty = resolve_type_expr(self, scope, expr, binding)?;
            match ty {
                Type::Interface { decl, .. } => implements.push(decl),
                _ => {
                    return Err(SemanticError::UnresolvedName {
                        name: expr.base.clone(),
                        span: expr.span.into(),
                    });
                }
            }
        }
        self.registry.get_mut(def_id).implements = implements;
        Ok(())
    }

    /// Resolve the signatures of every concrete function a scope owns.
    /// Generic function templates wait for specialization.
    fn resolve_scope_functions(
        &mut self,
        scope: ScopeId,
        binding: &FxHashMap<String, Type>,
    ) -> SemaResult<()> {
        let functions = self.scopes.get(scope).functions.clone();
        for id in functions {
            if self.registry.function(id).is_generic_template() {
                continue;
            }
            self.resolve_function_signature(id, binding)?;
        }
        Ok(())
    }

    pub(crate) fn resolve_function_signature(
        &mut self,
        id: FunctionId,
        binding: &FxHashMap<String, Type>,
    ) -> SemaResult<()> {
        let origin = self.registry.function(id).origin.clone();
        let scope = self.registry.function(id).scope;
        let mut params = Vec::with_capacity(origin.params.len());
        for param in &origin.params {
            let ty = resolve_type_expr(self, scope, &param.ty, binding)?;
            self.scopes.get_mut(scope).symbols_mut().insert(Symbol {
                name: param.name.clone(),
                ty: ty.clone(),
                span: param.span,
            });
            params.push(FunctionParam {
                name: param.name.clone(),
                ty,
                span: param.span,
            });
        }
        let return_type = match &origin.return_type {
            Some(expr) => resolve_type_expr(self, scope, expr, binding)?,
            None => self.void_type(),
        };
        let def = self.registry.function_mut(id);
        def.params = params;
        def.return_type = return_type;
        Ok(())
    }

    /// Resolve signatures of namespace-level functions. These belong to
    /// no type node, so the global type pass picks them up directly.
    fn resolve_free_functions(&mut self) -> SemaResult<()> {
        let namespaces: Vec<ScopeId> = self
            .scopes
            .ids()
            .filter(|&s| matches!(self.scopes.get(s).kind, ScopeKind::Root | ScopeKind::Namespace))
            .collect();
        let binding = FxHashMap::default();
        for scope in namespaces {
            self.resolve_scope_functions(scope, &binding)?;
        }
        Ok(())
    }

    // =========================================================================
    // Queries (IR generator and debugger surface)
    // =========================================================================

    /// Stable, collision-free identifier lookup for run-time type tags.
    pub fn type_by_full_name(&self, full_name: &str) -> Option<TypeDefId> {
        self.registry.by_full_name(full_name)
    }

    /// Human-readable scope path for stack-frame display.
    pub fn scope_display(&self, scope: ScopeId) -> String {
        self.scopes.full_path(scope)
    }

    /// Resolved type of a symbol visible from `scope`.
    pub fn symbol_type(&self, scope: ScopeId, name: &str) -> Option<&Type> {
        self.scopes.lookup_symbol(scope, name).map(|s| &s.ty)
    }

    pub(crate) fn record_instance(&mut self, id: TypeDefId) {
        self.analyzed.push(id);
    }
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{FieldDecl, Span, TypeExpr};

    fn class(name: &str, fields: Vec<FieldDecl>) -> Declaration {
        Declaration::Class(ClassDecl {
            name: name.into(),
            generic_params: Vec::new(),
            implements: Vec::new(),
            fields,
            functions: Vec::new(),
            routines: Vec::new(),
            span: Span::default(),
        })
    }

    fn field(name: &str, ty: &str) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            ty: TypeExpr::named(ty),
            span: Span::default(),
        }
    }

    #[test]
    fn compile_resolves_field_symbols() {
        let mut comp = Compilation::new();
        let program = Program {
            declarations: vec![class("Point", vec![field("x", "i32"), field("y", "i32")])],
        };
        comp.compile(&program).unwrap();

        let id = comp.type_by_full_name("Point").unwrap();
        let scope = comp.registry.get(id).scope.unwrap();
        let x = comp.symbol_type(scope, "x").unwrap();
        assert_eq!(x.tag(&comp.registry), TypeTag::I32);
        assert_eq!(comp.scope_display(scope), "Point");
    }

    #[test]
    fn unknown_field_type_is_fatal() {
        let mut comp = Compilation::new();
        let program = Program {
            declarations: vec![class("Broken", vec![field("x", "Mystery")])],
        };
        let err = comp.compile(&program).unwrap_err();
        assert!(matches!(err, SemanticError::UnresolvedName { ref name, .. } if name == "Mystery"));
        assert_eq!(comp.diagnostics.len(), 1);
    }

    #[test]
    fn namespaces_merge_and_qualify_names() {
        let mut comp = Compilation::new();
        let ns = |decls: Vec<Declaration>| {
            Declaration::Namespace(crate::syntax::NamespaceDecl {
                name: "Geo".into(),
                declarations: decls,
                span: Span::default(),
            })
        };
        let program = Program {
            declarations: vec![
                ns(vec![class("Point", vec![field("x", "i32")])]),
                ns(vec![class("Line", vec![field("a", "Point")])]),
            ],
        };
        comp.compile(&program).unwrap();

        assert!(comp.type_by_full_name("Geo.Point").is_some());
        let line = comp.type_by_full_name("Geo.Line").unwrap();
        let scope = comp.registry.get(line).scope.unwrap();
        let a = comp.symbol_type(scope, "a").unwrap();
        assert_eq!(a.name_in(&comp.registry), "Geo.Point");
    }

    #[test]
    fn reentrant_advance_is_reported() {
        let mut comp = Compilation::new();
        let program = Program {
            declarations: vec![class("C", Vec::new())],
        };
        comp.lower_program(&program);
        let id = comp.type_by_full_name("C").unwrap();
        comp.registry.get_mut(id).in_progress = true;
        let err = comp.advance_to(id, 1).unwrap_err();
        assert!(matches!(err, SemanticError::ReentrantSpecialization { .. }));
    }

    #[test]
    fn enum_members_get_discriminants_and_payload_rewrite() {
        let mut comp = Compilation::new();
        let decl = Declaration::Enum(EnumDecl {
            name: "Shape".into(),
            generic_params: Vec::new(),
            implements: Vec::new(),
            members: vec![
                crate::syntax::EnumMemberDecl {
                    name: "Dot".into(),
                    discriminant: None,
                    payload: None,
                    span: Span::default(),
                },
                crate::syntax::EnumMemberDecl {
                    name: "Square".into(),
                    discriminant: Some(10),
                    payload: Some(TypeExpr::named("double")),
                    span: Span::default(),
                },
            ],
            functions: Vec::new(),
            routines: Vec::new(),
            span: Span::default(),
        });
        comp.compile(&Program {
            declarations: vec![decl],
        })
        .unwrap();

        let id = comp.type_by_full_name("Shape").unwrap();
        let def = comp.registry.get(id);
        assert_eq!(def.members[0].discriminant, 0);
        assert_eq!(def.members[1].discriminant, 10);
        assert_eq!(def.members[0].payload.tag(&comp.registry), TypeTag::Void);
        assert_eq!(def.members[1].payload.tag(&comp.registry), TypeTag::Double);

        let scope = def.scope.unwrap();
        let square = comp.symbol_type(scope, "Square").unwrap();
        assert_eq!(square.tag(&comp.registry), TypeTag::Double);
    }
}
