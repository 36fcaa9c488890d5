//! Construction and access errors.

use crate::TypeKind;

/// A violated construction or access contract.
///
/// All of these are caller errors: the offending call has no effect.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// Raw value outside `PrimitiveKind::FIRST..=PrimitiveKind::LAST`.
    #[error("primitive kind {raw} is out of range")]
    PrimitiveOutOfRange { raw: u8 },
    /// Raw value outside `AddressSpace::FIRST..=AddressSpace::LAST`.
    #[error("address space {raw} is out of range")]
    AddressSpaceOutOfRange { raw: u8 },
    /// Raw value outside `Qualifier::FIRST..=Qualifier::LAST`.
    #[error("qualifier {raw} is out of range")]
    QualifierOutOfRange { raw: u8 },
    /// Vectors need at least one element.
    #[error("vector length must be positive, found {len}")]
    InvalidVectorLength { len: u32 },
    /// Vector elements must be scalar primitives.
    #[error("vector element must be a scalar primitive, found `{found}`")]
    InvalidVectorElement { found: String },
    /// User-defined types need a name.
    #[error("user-defined type name must not be empty")]
    EmptyTypeName,
    /// A variant-specific access on a node of another kind.
    #[error("expected a {expected} type, found a {found} type")]
    KindMismatch { expected: TypeKind, found: TypeKind },
}
