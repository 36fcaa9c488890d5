//! Parameter type algebra for SPIR name mangling.
//!
//! This crate models the types that appear in the parameter lists of SPIR
//! builtin and kernel functions:
//!
//! - Scalars, pseudo types and opaque objects (`PrimitiveType`)
//! - Pointers with address space and qualifiers (`PointerType`)
//! - Fixed-length vectors of scalars (`VectorType`)
//! - Named opaque or struct types (`UserDefinedType`)
//!
//! # Type Interning
//!
//! Types are shared through `RefParamType` (`Rc<ParamType>`) handles. A
//! `TypePool` canonicalizes structurally equal shapes into one node, so types
//! built from the same description in one session compare with `Rc::ptr_eq`.
//!
//! # Visitors
//!
//! `ParamType::accept` dispatches to one method of a `TypeVisitor`. The
//! readable rendering (`ParamType::render`) and the mangler in `spir_mangle`
//! are both visitors.

mod attr;
mod error;
mod pool;
mod ty;
pub mod visit;

pub use attr::{AddressSpace, PrimitiveKind, Qualifier, Qualifiers, TypeKind};
pub use error::TypeError;
pub use pool::{PoolStats, TypePool};
pub use ty::{
    ParamType, PointerType, PrimitiveType, RefParamType, TypeVariant, UserDefinedType, VectorType,
};
pub use visit::{TypeRenderer, TypeVisitor};
