//! Attribute model: type kinds, primitive kinds, address spaces and qualifiers.
//!
//! Every enumeration here is laid out over a contiguous numeric range with
//! named first/last boundaries, so membership tests are a single range check.
//!
//! # Primitive Ranges
//!
//! - `FIRST..=VarArg`: scalar and pseudo types (bool through `...`)
//! - `OPAQUE_FIRST..=OPAQUE_LAST`: opaque object types (images, event)
//! - `Sampler`: last valid kind
//! - `COUNT`: the "none" sentinel, never a valid kind

use std::fmt;

use bitflags::bitflags;

use crate::TypeError;

/// Discriminant of a [`ParamType`](crate::ParamType).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TypeKind {
    Primitive = 0,
    Pointer = 1,
    Vector = 2,
    UserDefined = 3,
}

impl TypeKind {
    /// Lowercase name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Pointer => "pointer",
            Self::Vector => "vector",
            Self::UserDefined => "user-defined",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builtin scalar, pseudo and opaque object kinds.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PrimitiveKind {
    Bool = 0,
    UChar = 1,
    Char = 2,
    UShort = 3,
    Short = 4,
    UInt = 5,
    Int = 6,
    ULong = 7,
    Long = 8,
    Half = 9,
    Float = 10,
    Double = 11,
    Void = 12,
    /// The `...` marker of a variadic parameter list.
    VarArg = 13,

    // === Opaque objects (14-20) ===
    Image1d = 14,
    Image2d = 15,
    Image3d = 16,
    Image1dBuffer = 17,
    Image1dArray = 18,
    Image2dArray = 19,
    Event = 20,

    Sampler = 21,
}

impl PrimitiveKind {
    pub const FIRST: Self = Self::Bool;
    pub const LAST: Self = Self::Sampler;
    pub const OPAQUE_FIRST: Self = Self::Image1d;
    pub const OPAQUE_LAST: Self = Self::Event;

    /// Number of valid kinds; also the raw value of the "none" sentinel.
    pub const COUNT: u8 = Self::LAST as u8 + 1;

    /// Every kind in declaration order.
    pub const ALL: [Self; Self::COUNT as usize] = [
        Self::Bool,
        Self::UChar,
        Self::Char,
        Self::UShort,
        Self::Short,
        Self::UInt,
        Self::Int,
        Self::ULong,
        Self::Long,
        Self::Half,
        Self::Float,
        Self::Double,
        Self::Void,
        Self::VarArg,
        Self::Image1d,
        Self::Image2d,
        Self::Image3d,
        Self::Image1dBuffer,
        Self::Image1dArray,
        Self::Image2dArray,
        Self::Event,
        Self::Sampler,
    ];

    /// Convert a raw value, rejecting the sentinel and anything past it.
    pub fn from_raw(raw: u8) -> Result<Self, TypeError> {
        Self::ALL
            .get(usize::from(raw))
            .copied()
            .ok_or(TypeError::PrimitiveOutOfRange { raw })
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Check if this is an opaque object kind (image or event).
    #[inline]
    pub const fn is_opaque(self) -> bool {
        let raw = self as u8;
        raw >= Self::OPAQUE_FIRST as u8 && raw <= Self::OPAQUE_LAST as u8
    }

    /// Check if this kind may be a vector element.
    #[inline]
    pub const fn is_scalar(self) -> bool {
        (self as u8) <= Self::Double as u8
    }

    /// Readable OpenCL C spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::UChar => "uchar",
            Self::Char => "char",
            Self::UShort => "ushort",
            Self::Short => "short",
            Self::UInt => "uint",
            Self::Int => "int",
            Self::ULong => "ulong",
            Self::Long => "long",
            Self::Half => "half",
            Self::Float => "float",
            Self::Double => "double",
            Self::Void => "void",
            Self::VarArg => "...",
            Self::Image1d => "image1d_t",
            Self::Image2d => "image2d_t",
            Self::Image3d => "image3d_t",
            Self::Image1dBuffer => "image1d_buffer_t",
            Self::Image1dArray => "image1d_array_t",
            Self::Image2dArray => "image2d_array_t",
            Self::Event => "event_t",
            Self::Sampler => "sampler_t",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Memory region a pointer refers into. Raw values are the SPIR numbering.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AddressSpace {
    #[default]
    Private = 0,
    Global = 1,
    Constant = 2,
    Local = 3,
}

impl AddressSpace {
    pub const FIRST: Self = Self::Private;
    pub const LAST: Self = Self::Local;

    pub const ALL: [Self; 4] = [Self::Private, Self::Global, Self::Constant, Self::Local];

    pub fn from_raw(raw: u8) -> Result<Self, TypeError> {
        Self::ALL
            .get(usize::from(raw))
            .copied()
            .ok_or(TypeError::AddressSpaceOutOfRange { raw })
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Private)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Private => "__private",
            Self::Global => "__global",
            Self::Constant => "__constant",
            Self::Local => "__local",
        }
    }
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single pointer qualifier slot.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Qualifier {
    Restrict = 0,
    Volatile = 1,
    Const = 2,
}

impl Qualifier {
    pub const FIRST: Self = Self::Restrict;
    pub const LAST: Self = Self::Const;

    pub const ALL: [Self; 3] = [Self::Restrict, Self::Volatile, Self::Const];

    pub fn from_raw(raw: u8) -> Result<Self, TypeError> {
        Self::ALL
            .get(usize::from(raw))
            .copied()
            .ok_or(TypeError::QualifierOutOfRange { raw })
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// The bit this slot occupies in a [`Qualifiers`] set.
    #[inline]
    pub const fn flag(self) -> Qualifiers {
        match self {
            Self::Restrict => Qualifiers::RESTRICT,
            Self::Volatile => Qualifiers::VOLATILE,
            Self::Const => Qualifiers::CONST,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Restrict => "restrict",
            Self::Volatile => "volatile",
            Self::Const => "const",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of qualifiers attached to a pointer, one bit per [`Qualifier`].
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Qualifiers: u8 {
        const RESTRICT = 1 << Qualifier::Restrict as u8;
        const VOLATILE = 1 << Qualifier::Volatile as u8;
        const CONST = 1 << Qualifier::Const as u8;
    }
}

impl Qualifiers {
    /// Enabled qualifiers in slot order.
    pub fn qualifiers(self) -> impl Iterator<Item = Qualifier> {
        Qualifier::ALL
            .into_iter()
            .filter(move |q| self.contains(q.flag()))
    }
}

impl From<Qualifier> for Qualifiers {
    fn from(qual: Qualifier) -> Self {
        qual.flag()
    }
}
