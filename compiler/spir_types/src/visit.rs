//! Double-dispatch visitor over parameter types.
//!
//! [`ParamType::accept`](crate::ParamType::accept) calls exactly one method of
//! a [`TypeVisitor`]. There are no default methods: adding a type shape is a
//! breaking change for every implementer.
//!
//! Visitors reach nested types through `PointerType::pointee` and
//! `VectorType::scalar_type` and call `accept` on them when they want to
//! recurse. Pointer chains can be arbitrarily deep, so recursive visitors
//! wrap that call in [`spir_stack::ensure_sufficient_stack`].

use spir_stack::ensure_sufficient_stack;

use crate::{PointerType, PrimitiveType, UserDefinedType, VectorType};

/// Visitor over the four type shapes.
pub trait TypeVisitor {
    fn visit_primitive(&mut self, ty: &PrimitiveType);
    fn visit_vector(&mut self, ty: &VectorType);
    fn visit_pointer(&mut self, ty: &PointerType);
    fn visit_user_defined(&mut self, ty: &UserDefinedType);
}

/// Renders the readable form of a type into a buffer.
///
/// Pointers render as `[restrict ][volatile ][const ][<space> ]<pointee>*`,
/// where the private address space is left implicit.
pub struct TypeRenderer<'a> {
    buf: &'a mut String,
}

impl<'a> TypeRenderer<'a> {
    pub fn new(buf: &'a mut String) -> Self {
        Self { buf }
    }
}

impl TypeVisitor for TypeRenderer<'_> {
    fn visit_primitive(&mut self, ty: &PrimitiveType) {
        self.buf.push_str(ty.primitive().name());
    }

    fn visit_vector(&mut self, ty: &VectorType) {
        ty.scalar_type().accept(self);
        self.buf.push_str(&ty.length().to_string());
    }

    fn visit_pointer(&mut self, ty: &PointerType) {
        for qual in ty.qualifiers().qualifiers() {
            self.buf.push_str(qual.name());
            self.buf.push(' ');
        }
        if !ty.address_space().is_default() {
            self.buf.push_str(ty.address_space().name());
            self.buf.push(' ');
        }
        ensure_sufficient_stack(|| ty.pointee().accept(self));
        self.buf.push('*');
    }

    fn visit_user_defined(&mut self, ty: &UserDefinedType) {
        self.buf.push_str(ty.name());
    }
}
