// src/sema/resolve.rs
//
// Syntax type expressions to qualified type values. Resolution order:
// generic parameter bindings, then the scope chain / dotted namespace
// path, then the basic type table. Applied generic names route through
// the specialization engine.

use rustc_hash::FxHashMap;

use crate::errors::{SemaResult, SemanticError};
use crate::sema::model::Compilation;
use crate::sema::scope::ScopeId;
use crate::sema::types::{Mutability, Type};
use crate::syntax::TypeExpr;

pub fn resolve_type_expr(
    comp: &mut Compilation,
    scope: ScopeId,
    expr: &TypeExpr,
    binding: &FxHashMap<String, Type>,
) -> SemaResult<Type> {
    let mutability = if expr.mutable {
        Mutability::Mutable
    } else {
        Mutability::Immutable
    };

    // Generic parameter bindings shadow named declarations. A bare `T`
    // keeps the bound argument's own qualifier unless the expression
    // forces `mut`.
    if expr.args.is_empty()
        && !expr.base.contains('.')
        && let Some(bound) = binding.get(&expr.base)
    {
        return Ok(if expr.mutable {
            bound.with_mutability(Mutability::Mutable)
        } else {
            bound.clone()
        });
    }

    let segments: Vec<&str> = expr.base.split('.').collect();
    let decl = comp.scopes.resolve_dotted(scope, &segments).or_else(|| {
        if segments.len() == 1 {
            comp.basic.lookup(&expr.base)
        } else {
            None
        }
    });
    let Some(decl) = decl else {
        return Err(SemanticError::UnresolvedName {
            name: expr.base.clone(),
            span: expr.span.into(),
        });
    };

    let def = comp.registry.get(decl);
    if def.is_generic_template() {
        if expr.args.is_empty() {
            // A template used bare: every use site must supply arguments.
            return Err(SemanticError::SpecializationArity {
                name: def.full_name.to_string(),
                expected: def.generic_params.len(),
                found: 0,
                span: expr.span.into(),
            });
        }
        let mut args = Vec::with_capacity(expr.args.len());
        for arg in &expr.args {
            args.push(resolve_type_expr(comp, scope, arg, binding)?);
        }
        let instance = comp.specialize(decl, &args, expr.span)?;
        return Ok(comp.registry.qualified(instance, mutability));
    }

    if !expr.args.is_empty() {
        return Err(SemanticError::NotSpecializable {
            name: def.full_name.to_string(),
            span: expr.span.into(),
        });
    }
    Ok(comp.registry.qualified(decl, mutability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::types::TypeTag;

    fn empty_binding() -> FxHashMap<String, Type> {
        FxHashMap::default()
    }

    #[test]
    fn bare_primitive_resolves_from_basic_table() {
        let mut comp = Compilation::new();
        let root = comp.scopes.root();
        let ty = resolve_type_expr(&mut comp, root, &TypeExpr::named("u16"), &empty_binding())
            .unwrap();
        assert_eq!(ty.tag(&comp.registry), TypeTag::U16);
        assert_eq!(ty.mutability(), Mutability::Immutable);
    }

    #[test]
    fn mut_annotation_qualifies_the_value() {
        let mut comp = Compilation::new();
        let root = comp.scopes.root();
        let ty = resolve_type_expr(
            &mut comp,
            root,
            &TypeExpr::named("string").mutable(),
            &empty_binding(),
        )
        .unwrap();
        assert_eq!(ty.mutability(), Mutability::Mutable);
        assert_eq!(ty.display(&comp.registry), "mut string");
    }

    #[test]
    fn binding_shadows_declarations() {
        let mut comp = Compilation::new();
        let root = comp.scopes.root();
        let mut binding = empty_binding();
        binding.insert("T".into(), comp.basic.immutable(TypeTag::I64));
        let ty =
            resolve_type_expr(&mut comp, root, &TypeExpr::named("T"), &binding).unwrap();
        assert_eq!(ty.tag(&comp.registry), TypeTag::I64);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let mut comp = Compilation::new();
        let root = comp.scopes.root();
        let err = resolve_type_expr(&mut comp, root, &TypeExpr::named("Ghost"), &empty_binding())
            .unwrap_err();
        assert!(matches!(err, SemanticError::UnresolvedName { ref name, .. } if name == "Ghost"));
    }

    #[test]
    fn arguments_on_a_primitive_are_rejected() {
        let mut comp = Compilation::new();
        let root = comp.scopes.root();
        let expr = TypeExpr::applied("i32", vec![TypeExpr::named("bool")]);
        let err = resolve_type_expr(&mut comp, root, &expr, &empty_binding()).unwrap_err();
        assert!(matches!(err, SemanticError::NotSpecializable { .. }));
    }
}
