// src/sema/specialize.rs
//
// Specialization of generic templates. An instance is a clone of its
// template's declaration node, registered under the rendered name
// (`Ns.Box<i32>`), cached on the template, and immediately driven
// through every pass the session has already completed ("catch-up").
// Requesting the same (template, args) pair again returns the cached
// node, so instances are identity-stable across the compilation.
//
// Argument qualifiers are normalized to immutable before rendering and
// binding: `Box<mut i32>` and `Box<i32>` are one instance with one
// deterministic binding. Mutability belongs to use sites, which apply
// their own qualifier to the returned instance.

use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::errors::{SemaResult, SemanticError};
use crate::sema::model::Compilation;
use crate::sema::registry::{FunctionId, TypeDefId, new_type_def};
use crate::sema::scope::ScopeKind;
use crate::sema::types::{Mutability, Type, TypeTag};
use crate::syntax::Span;
use crate::syntax::name::parse_qualified_name;

impl Compilation {
    /// Produce (or fetch) the concrete instance of `template` bound to
    /// `args`. `span` is the use site, for diagnostics.
    pub fn specialize(
        &mut self,
        template: TypeDefId,
        args: &[Type],
        span: Span,
    ) -> SemaResult<TypeDefId> {
        let def = self.registry.get(template);
        let name = def.full_name.to_string();
        let specializable = matches!(def.tag, TypeTag::Class | TypeTag::Enum | TypeTag::Interface);
        if !specializable || def.generic_params.is_empty() || def.is_specialized() {
            return Err(SemanticError::NotSpecializable {
                name,
                span: span.into(),
            });
        }
        if args.is_empty() || args.len() != def.generic_params.len() {
            return Err(SemanticError::SpecializationArity {
                name,
                expected: def.generic_params.len(),
                found: args.len(),
                span: span.into(),
            });
        }

        // Canonical argument qualifier; see the module header.
        let args: Vec<Type> = args
            .iter()
            .map(|a| a.with_mutability(Mutability::Immutable))
            .collect();
        let rendered: Arc<str> = self.registry.render_specialized_name(template, &args).into();
        if let Some(&hit) = self.registry.get(template).instances.get(&rendered) {
            return Ok(hit);
        }
        // The same instance may already exist under another request path;
        // the global full-name index is the cross-path deduplicator.
        if let Some(parsed) = parse_qualified_name(&rendered)
            && parsed.is_specialized()
            && let Some(existing) = self.registry.by_full_name(&rendered)
        {
            self.registry
                .get_mut(template)
                .instances
                .insert(rendered, existing);
            return Ok(existing);
        }
        // A cache miss while this template is already elaborating one of
        // its own instances is an expansive cycle (`Gen<T>` holding a
        // `Gen<Gen<T>>`): every step would mint a fresh instance and the
        // chain never closes.
        if self.specializing.contains(&template) {
            return Err(SemanticError::ReentrantSpecialization {
                name,
                span: span.into(),
            });
        }

        tracing::debug!(template = %name, instance = %rendered, "specializing");

        let (tag, base_name, generic_params, origin, decl_span, template_scope) = {
            let def = self.registry.get(template);
            (
                def.tag,
                def.name.clone(),
                def.generic_params.clone(),
                def.origin.clone(),
                def.span,
                def.scope,
            )
        };
        // The instance's scope sits next to the template's, so member
        // lookups from inside the instance see the same surroundings.
        let parent = template_scope
            .and_then(|s| self.scopes.get(s).parent)
            .unwrap_or_else(|| self.scopes.root());
        let kind = match tag {
            TypeTag::Enum => ScopeKind::Enum,
            TypeTag::Interface => ScopeKind::Interface,
            _ => ScopeKind::Class,
        };
        let arg_names: Vec<String> = args.iter().map(|a| a.name_in(&self.registry)).collect();
        let scope_name = format!("{}<{}>", base_name, arg_names.join(", "));
        let scope = self.scopes.new_scope(kind, scope_name, parent);

        let mut instance = new_type_def(tag, base_name, rendered.clone(), generic_params, decl_span);
        instance.generic_args = args;
        instance.template = Some(template);
        instance.origin = origin;
        instance.scope = Some(scope);
        let id = self.registry.register(instance);
        self.scopes.get_mut(scope).type_def = Some(id);
        // Register before catch-up: a self-referential template (`Node<T>`
        // holding a `Node<T>` field) hits the cache instead of recursing.
        self.registry
            .get_mut(template)
            .instances
            .insert(rendered, id);
        self.record_instance(id);

        self.specializing.push(template);
        let caught = self.catch_up(id);
        self.specializing.pop();
        caught?;
        Ok(id)
    }

    /// Specialize a generic function: clone the declaration, bind its
    /// parameters over the owner's binding, and resolve the signature
    /// immediately. Instances are not appended to the owner scope's
    /// function list; dispatch finds them through the template's cache.
    pub fn specialize_function(
        &mut self,
        template: FunctionId,
        args: &[Type],
        span: Span,
    ) -> SemaResult<FunctionId> {
        let def = self.registry.function(template);
        let label = self.scopes.full_path(def.scope);
        if !def.is_generic_template() {
            return Err(SemanticError::NotSpecializable {
                name: label,
                span: span.into(),
            });
        }
        if args.is_empty() || args.len() != def.generic_params.len() {
            return Err(SemanticError::SpecializationArity {
                name: label,
                expected: def.generic_params.len(),
                found: args.len(),
                span: span.into(),
            });
        }

        // Same canonical qualifier as type specialization.
        let args: Vec<Type> = args
            .iter()
            .map(|a| a.with_mutability(Mutability::Immutable))
            .collect();
        let arg_names: Vec<String> = args.iter().map(|a| a.name_in(&self.registry)).collect();
        let rendered: Arc<str> = format!("{}<{}>", label, arg_names.join(", ")).into();
        if let Some(&hit) = self.registry.function(template).instances.get(&rendered) {
            return Ok(hit);
        }

        tracing::debug!(template = %label, instance = %rendered, "specializing function");

        let (owner, origin, name) = {
            let def = self.registry.function(template);
            (def.owner, Rc::clone(&def.origin), def.name.clone())
        };
        let scope_name = format!("{}<{}>", name, arg_names.join(", "));
        let scope = self.scopes.new_scope(ScopeKind::Function, scope_name, owner);
        let void = self.void_type();
        let generic_params = self.registry.function(template).generic_params.clone();
        let id = self.registry.register_function(crate::sema::registry::FunctionDef {
            id: FunctionId::new(0),
            name,
            generic_params: generic_params.clone(),
            params: Vec::new(),
            return_type: void,
            scope,
            owner,
            span,
            origin,
            template: Some(template),
            instances: FxHashMap::default(),
        });
        self.registry
            .function_mut(template)
            .instances
            .insert(rendered, id);

        // The function's own parameters bind over the owning type's
        // binding, so a method of `Box<i32>` can still mention `T`.
        let mut binding = self
            .scopes
            .get(owner)
            .type_def
            .map(|t| self.registry.get(t).generic_binding())
            .unwrap_or_default();
        for (param, arg) in generic_params.iter().zip(args) {
            binding.insert(param.clone(), arg);
        }
        self.resolve_function_signature(id, &binding)?;
        Ok(id)
    }
}
