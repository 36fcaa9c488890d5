//! Mangling and demangling errors.

use spir_types::TypeError;

/// Error when mangling a function descriptor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MangleError {
    /// Function names are length-prefixed and cannot be empty.
    #[error("cannot mangle a function with an empty name")]
    EmptyName,
}

/// Error when parsing a mangled name. Offsets are byte positions in the input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DemangleError {
    #[error("mangled name must start with `_Z`")]
    MissingPrefix,
    /// `_Z0...`: a function name of length zero.
    #[error("mangled function name is empty")]
    EmptyName,
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("expected a length at offset {offset}")]
    ExpectedLength { offset: usize },
    #[error("expected `{expected}` at offset {offset}")]
    Expected { expected: char, offset: usize },
    #[error("unknown type code `{code}` at offset {offset}")]
    UnknownCode { code: char, offset: usize },
    /// A back-reference past the end of the table, or to a qualified
    /// component where a complete type is required.
    #[error("invalid substitution at offset {offset}")]
    InvalidSubstitution { offset: usize },
    #[error("invalid type at offset {offset}: {source}")]
    Type {
        offset: usize,
        #[source]
        source: TypeError,
    },
}
