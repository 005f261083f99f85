// src/sema/vtable.rs
//
// Interface dispatch tables. The final pass builds, for every concrete
// class or enum, one table per interface in its implemented closure:
// each interface function maps to exactly one member function whose
// signature conforms. Zero candidates or more than one is a compile
// error, and no table is recorded for that pair.

use crate::errors::{SemaResult, SemanticError};
use crate::sema::model::{Compilation, Pass};
use crate::sema::registry::{FunctionId, TypeDefId};
use crate::sema::types::TypeTag;

/// One interface-function to member-function mapping.
#[derive(Debug, Clone, Copy)]
pub struct VTableSlot {
    pub interface_fn: FunctionId,
    pub target_fn: FunctionId,
}

/// Dispatch table for one (implementer, interface) pair. Slots are in
/// the interface's declaration order, so call sites can index by the
/// interface function's position.
#[derive(Debug, Clone)]
pub struct VTable {
    pub interface: TypeDefId,
    pub slots: Vec<VTableSlot>,
}

impl VTable {
    pub fn slot_for(&self, interface_fn: FunctionId) -> Option<FunctionId> {
        self.slots
            .iter()
            .find(|s| s.interface_fn == interface_fn)
            .map(|s| s.target_fn)
    }
}

pub(crate) fn build_vtables(comp: &mut Compilation, def_id: TypeDefId) -> SemaResult<()> {
    let def = comp.registry.get(def_id);
    if !matches!(def.tag, TypeTag::Class | TypeTag::Enum) {
        return Ok(());
    }
    let implementer = def.full_name.to_string();
    let span = def.span;
    let Some(scope) = def.scope else {
        return Ok(());
    };

    let interfaces = comp.registry.implements_closure(def_id);
    let member_fns = comp.scopes.get(scope).functions.clone();
    let mut tables = Vec::with_capacity(interfaces.len());
    for interface in interfaces {
        // Lazily created interface instances may not have resolved
        // signatures yet.
        comp.require_elaborated(interface, Pass::ResolveTypes)?;
        let interface_name = comp.registry.get(interface).full_name.to_string();
        let Some(interface_scope) = comp.registry.get(interface).scope else {
            continue;
        };
        let interface_fns = comp.scopes.get(interface_scope).functions.clone();

        let mut slots = Vec::with_capacity(interface_fns.len());
        for interface_fn in interface_fns {
            let candidates: Vec<FunctionId> = member_fns
                .iter()
                .copied()
                .filter(|&candidate| conforms(comp, interface_fn, candidate))
                .collect();
            match candidates.as_slice() {
                [] => {
                    return Err(SemanticError::MissingInterfaceFunction {
                        implementer,
                        interface: interface_name,
                        signature: comp.registry.render_signature(interface_fn),
                        span: span.into(),
                    });
                }
                [target] => slots.push(VTableSlot {
                    interface_fn,
                    target_fn: *target,
                }),
                many => {
                    return Err(SemanticError::AmbiguousInterfaceFunction {
                        implementer,
                        interface: interface_name,
                        signature: comp.registry.render_signature(interface_fn),
                        count: many.len(),
                        span: span.into(),
                    });
                }
            }
        }
        tracing::trace!(
            implementer = %implementer,
            interface = %interface_name,
            slots = slots.len(),
            "built dispatch table"
        );
        tables.push(VTable { interface, slots });
    }
    comp.registry.get_mut(def_id).vtables = tables;
    Ok(())
}

/// Whether `candidate` can stand in for `interface_fn`: same name, same
/// arity, every interface parameter implicitly casts to the candidate's
/// (callers hold interface-typed values), and the candidate's return
/// implicitly casts back to the interface's.
fn conforms(comp: &Compilation, interface_fn: FunctionId, candidate: FunctionId) -> bool {
    let spec = comp.registry.function(interface_fn);
    let imp = comp.registry.function(candidate);
    if spec.name != imp.name || spec.params.len() != imp.params.len() {
        return false;
    }
    let params_ok = spec
        .params
        .iter()
        .zip(&imp.params)
        .all(|(s, i)| s.ty.can_implicitly_cast_to(&i.ty, &comp.registry));
    params_ok
        && imp
            .return_type
            .can_implicitly_cast_to(&spec.return_type, &comp.registry)
}
