//! Type construction helpers for the pool.
//!
//! Every constructor routes through [`TypePool::intern`], so calling one twice
//! with equal arguments returns the same handle.

use crate::{
    AddressSpace, ParamType, PointerType, PrimitiveKind, Qualifiers, RefParamType, TypeError,
    TypePool, UserDefinedType, VectorType,
};

/// Generate shortcuts for frequently used primitive kinds.
macro_rules! primitive_shortcuts {
    ($( ($method:ident, $kind:ident) ),+ $(,)?) => {
        $(
            #[doc = concat!("Canonical `", stringify!($method), "` type.")]
            pub fn $method(&mut self) -> RefParamType {
                self.primitive(PrimitiveKind::$kind)
            }
        )+
    };
}

impl TypePool {
    // === Primitives ===

    pub fn primitive(&mut self, kind: PrimitiveKind) -> RefParamType {
        self.intern(ParamType::primitive(kind))
    }

    primitive_shortcuts!(
        (bool, Bool),
        (char, Char),
        (uchar, UChar),
        (short, Short),
        (ushort, UShort),
        (int, Int),
        (uint, UInt),
        (long, Long),
        (ulong, ULong),
        (half, Half),
        (float, Float),
        (double, Double),
        (void, Void),
    );

    // === Pointers ===

    /// Private, unqualified pointer to `pointee`.
    pub fn pointer(&mut self, pointee: RefParamType) -> RefParamType {
        self.intern(PointerType::new(pointee).into())
    }

    /// Pointer with explicit address space and qualifiers.
    pub fn pointer_with(
        &mut self,
        pointee: RefParamType,
        address_space: AddressSpace,
        qualifiers: Qualifiers,
    ) -> RefParamType {
        let ptr = PointerType::new(pointee)
            .with_address_space(address_space)
            .with_qualifiers(qualifiers);
        self.intern(ptr.into())
    }

    // === Vectors ===

    /// Vector of `len` scalar elements.
    pub fn vector(&mut self, element: RefParamType, len: u32) -> Result<RefParamType, TypeError> {
        let vec = VectorType::new(element, len)?;
        Ok(self.intern(vec.into()))
    }

    // === Named Types ===

    /// Opaque or struct type referenced by name.
    pub fn user_defined(&mut self, name: &str) -> Result<RefParamType, TypeError> {
        let named = UserDefinedType::new(name)?;
        Ok(self.intern(named.into()))
    }
}
