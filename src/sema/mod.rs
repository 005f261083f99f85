// src/sema/mod.rs
//
// Semantic analysis: the basic type table, the declaration registry,
// scope tree, the pass pipeline, generic specialization, implicit-cast
// compatibility, and interface dispatch tables.

pub mod basic;
pub mod compatibility;
pub mod model;
pub mod registry;
pub mod resolve;
pub mod scope;
pub mod specialize;
pub mod types;
pub mod vtable;

pub use basic::BasicTypes;
pub use compatibility::can_implicitly_cast;
pub use model::{Compilation, Pass};
pub use registry::{FunctionDef, FunctionId, TypeDef, TypeDefId, TypeRegistry};
pub use resolve::resolve_type_expr;
pub use scope::{ScopeId, ScopeKind, ScopeTree, Symbol};
pub use types::{Mutability, Type, TypeTag};
pub use vtable::{VTable, VTableSlot};
