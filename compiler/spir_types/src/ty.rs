//! Parameter type nodes.
//!
//! `ParamType` is a closed sum over the four type shapes. Each variant owns
//! only the data valid for its shape:
//!
//! - `Primitive`: a [`PrimitiveKind`]
//! - `Pointer`: pointee, address space and qualifier set
//! - `Vector`: scalar element and length
//! - `UserDefined`: a name (opaque builtin objects and structs)
//!
//! Composite shapes share their children through [`RefParamType`] handles.
//! Children always exist before their parent, so the graph is acyclic.
//!
//! Every node has at most one child, so a type is a chain. Equality, hashing
//! and dropping walk that chain in a loop; pointer chains of any depth are
//! handled without growing the call stack.

use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::{fmt, mem};

use spir_stack::ensure_sufficient_stack;

use crate::visit::{TypeRenderer, TypeVisitor};
use crate::{AddressSpace, PrimitiveKind, Qualifier, Qualifiers, TypeError, TypeKind};

/// Shared handle to a type node.
pub type RefParamType = Rc<ParamType>;

/// A parameter type node.
///
/// Equality and hashing are structural: two nodes are equal iff they have the
/// same kind and equal variant data all the way down the chain.
#[derive(Clone)]
pub enum ParamType {
    Primitive(PrimitiveType),
    Pointer(PointerType),
    Vector(VectorType),
    UserDefined(UserDefinedType),
}

impl ParamType {
    /// Shorthand for `ParamType::Primitive(PrimitiveType::new(kind))`.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::Primitive(PrimitiveType::new(kind))
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive(_) => TypeKind::Primitive,
            Self::Pointer(_) => TypeKind::Pointer,
            Self::Vector(_) => TypeKind::Vector,
            Self::UserDefined(_) => TypeKind::UserDefined,
        }
    }

    /// Structural equality; same as `==`.
    #[inline]
    pub fn equals(&self, other: &ParamType) -> bool {
        self == other
    }

    /// Dispatch to the visitor method matching this node's kind.
    pub fn accept<V: TypeVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Self::Primitive(ty) => visitor.visit_primitive(ty),
            Self::Pointer(ty) => visitor.visit_pointer(ty),
            Self::Vector(ty) => visitor.visit_vector(ty),
            Self::UserDefined(ty) => visitor.visit_user_defined(ty),
        }
    }

    /// Readable canonical form, e.g. `int`, `float4`, `const __global float*`.
    ///
    /// This is a diagnostic rendering, not the mangled encoding.
    pub fn render(&self) -> String {
        let mut buf = String::new();
        self.render_into(&mut buf);
        buf
    }

    /// Render into an existing buffer.
    pub fn render_into(&self, buf: &mut String) {
        self.accept(&mut TypeRenderer::new(buf));
    }

    /// The pointee or vector element, if this is a composite node.
    pub fn child(&self) -> Option<&RefParamType> {
        match self {
            Self::Pointer(ptr) => Some(ptr.pointee()),
            Self::Vector(vec) => Some(vec.scalar_type()),
            Self::Primitive(_) | Self::UserDefined(_) => None,
        }
    }

    /// Number of pointee/element links below this node.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(child) = current.child() {
            current = child.as_ref();
            depth += 1;
        }
        depth
    }

    /// Downcast to a variant, or `None` if the kind differs.
    #[inline]
    pub fn dyn_cast<T: TypeVariant>(&self) -> Option<&T> {
        T::from_type(self)
    }

    /// Downcast to a variant, reporting a kind mismatch as an error.
    pub fn cast<T: TypeVariant>(&self) -> Result<&T, TypeError> {
        T::from_type(self).ok_or(TypeError::KindMismatch {
            expected: T::KIND,
            found: self.kind(),
        })
    }

    #[inline]
    pub fn as_primitive(&self) -> Option<&PrimitiveType> {
        self.dyn_cast()
    }

    #[inline]
    pub fn as_pointer(&self) -> Option<&PointerType> {
        self.dyn_cast()
    }

    #[inline]
    pub fn as_vector(&self) -> Option<&VectorType> {
        self.dyn_cast()
    }

    #[inline]
    pub fn as_user_defined(&self) -> Option<&UserDefinedType> {
        self.dyn_cast()
    }

    /// Check if this is the given primitive kind.
    pub fn is_primitive_kind(&self, kind: PrimitiveKind) -> bool {
        self.as_primitive().is_some_and(|p| p.primitive() == kind)
    }

    /// This node with its child replaced by `child`. Leaves are cloned as is.
    pub(crate) fn relinked(&self, child: Option<RefParamType>) -> ParamType {
        match (self, child) {
            (Self::Pointer(ptr), Some(pointee)) => Self::Pointer(ptr.with_pointee(pointee)),
            (Self::Vector(vec), Some(element)) => Self::Vector(vec.with_element(element)),
            _ => self.clone(),
        }
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            if std::ptr::eq(a, b) {
                return true;
            }
            let (next_a, next_b) = match (a, b) {
                (Self::Primitive(x), Self::Primitive(y)) => return x == y,
                (Self::UserDefined(x), Self::UserDefined(y)) => return x == y,
                (Self::Pointer(x), Self::Pointer(y)) => {
                    if x.address_space != y.address_space || x.qualifiers != y.qualifiers {
                        return false;
                    }
                    (&x.pointee, &y.pointee)
                }
                (Self::Vector(x), Self::Vector(y)) => {
                    if x.len != y.len {
                        return false;
                    }
                    (&x.element, &y.element)
                }
                _ => return false,
            };
            a = next_a.as_ref();
            b = next_b.as_ref();
        }
    }
}

impl Eq for ParamType {}

impl Hash for ParamType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut current = self;
        loop {
            mem::discriminant(current).hash(state);
            match current {
                Self::Primitive(prim) => return prim.hash(state),
                Self::UserDefined(named) => return named.hash(state),
                Self::Pointer(ptr) => {
                    ptr.address_space.hash(state);
                    ptr.qualifiers.hash(state);
                    current = ptr.pointee.as_ref();
                }
                Self::Vector(vec) => {
                    vec.len.hash(state);
                    current = vec.element.as_ref();
                }
            }
        }
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Self::Primitive(ty) => f.debug_tuple("Primitive").field(ty).finish(),
            Self::Pointer(ty) => f.debug_tuple("Pointer").field(ty).finish(),
            Self::Vector(ty) => f.debug_tuple("Vector").field(ty).finish(),
            Self::UserDefined(ty) => f.debug_tuple("UserDefined").field(ty).finish(),
        })
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::PrimitiveType {}
    impl Sealed for super::PointerType {}
    impl Sealed for super::VectorType {}
    impl Sealed for super::UserDefinedType {}
}

/// Implemented by the four variant payloads to support kind-checked downcasts.
pub trait TypeVariant: sealed::Sealed + Sized {
    const KIND: TypeKind;

    fn from_type(ty: &ParamType) -> Option<&Self>;
}

macro_rules! impl_type_variant {
    ($( $variant:ident($payload:ident) ),+ $(,)?) => {
        $(
            impl TypeVariant for $payload {
                const KIND: TypeKind = TypeKind::$variant;

                #[inline]
                fn from_type(ty: &ParamType) -> Option<&Self> {
                    match ty {
                        ParamType::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$payload> for ParamType {
                fn from(inner: $payload) -> Self {
                    ParamType::$variant(inner)
                }
            }
        )+
    };
}

impl_type_variant!(
    Primitive(PrimitiveType),
    Pointer(PointerType),
    Vector(VectorType),
    UserDefined(UserDefinedType),
);

/// A builtin scalar, pseudo or opaque object type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PrimitiveType {
    primitive: PrimitiveKind,
}

impl PrimitiveType {
    pub const fn new(primitive: PrimitiveKind) -> Self {
        Self { primitive }
    }

    #[inline]
    pub const fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }
}

/// A pointer with address space and qualifiers.
///
/// Address space and qualifiers are part of the structural identity, so they
/// must be settled before the pointer is interned.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PointerType {
    pointee: RefParamType,
    address_space: AddressSpace,
    qualifiers: Qualifiers,
}

impl PointerType {
    /// A private, unqualified pointer to `pointee`.
    pub fn new(pointee: RefParamType) -> Self {
        Self {
            pointee,
            address_space: AddressSpace::default(),
            qualifiers: Qualifiers::empty(),
        }
    }

    #[inline]
    pub fn pointee(&self) -> &RefParamType {
        &self.pointee
    }

    #[inline]
    pub fn address_space(&self) -> AddressSpace {
        self.address_space
    }

    pub fn set_address_space(&mut self, address_space: AddressSpace) {
        self.address_space = address_space;
    }

    #[inline]
    pub fn qualifiers(&self) -> Qualifiers {
        self.qualifiers
    }

    #[inline]
    pub fn has_qualifier(&self, qual: Qualifier) -> bool {
        self.qualifiers.contains(qual.flag())
    }

    /// Add or remove one qualifier, leaving the others untouched.
    pub fn set_qualifier(&mut self, qual: Qualifier, enabled: bool) {
        self.qualifiers.set(qual.flag(), enabled);
    }

    #[must_use]
    pub fn with_address_space(mut self, address_space: AddressSpace) -> Self {
        self.set_address_space(address_space);
        self
    }

    #[must_use]
    pub fn with_qualifier(mut self, qual: Qualifier) -> Self {
        self.set_qualifier(qual, true);
        self
    }

    #[must_use]
    pub fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    /// Same attributes, different pointee.
    pub(crate) fn with_pointee(&self, pointee: RefParamType) -> Self {
        Self {
            pointee,
            address_space: self.address_space,
            qualifiers: self.qualifiers,
        }
    }
}

thread_local! {
    /// Stand-in pointee left behind by a pointer being torn down.
    static UNLINKED: RefParamType = Rc::new(ParamType::primitive(PrimitiveKind::Void));
}

fn unlinked() -> RefParamType {
    UNLINKED
        .try_with(Rc::clone)
        .unwrap_or_else(|_| Rc::new(ParamType::primitive(PrimitiveKind::Void)))
}

impl Drop for PointerType {
    /// Releases a uniquely owned pointee chain one link at a time.
    fn drop(&mut self) {
        if Rc::strong_count(&self.pointee) > 1 {
            return;
        }
        let mut link = mem::replace(&mut self.pointee, unlinked());
        while let Ok(mut node) = Rc::try_unwrap(link) {
            let ParamType::Pointer(ptr) = &mut node else {
                break;
            };
            link = mem::replace(&mut ptr.pointee, unlinked());
        }
    }
}

/// A fixed-length vector of scalar primitives.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VectorType {
    element: RefParamType,
    len: u32,
}

impl VectorType {
    /// Create a vector type.
    ///
    /// The element must be a scalar primitive and `len` must be positive.
    pub fn new(element: RefParamType, len: u32) -> Result<Self, TypeError> {
        if len == 0 {
            return Err(TypeError::InvalidVectorLength { len });
        }
        match element.as_primitive() {
            Some(prim) if prim.primitive().is_scalar() => Ok(Self { element, len }),
            _ => Err(TypeError::InvalidVectorElement {
                found: element.render(),
            }),
        }
    }

    #[inline]
    pub fn scalar_type(&self) -> &RefParamType {
        &self.element
    }

    #[inline]
    pub fn length(&self) -> u32 {
        self.len
    }

    /// Same length, different (already validated) element.
    pub(crate) fn with_element(&self, element: RefParamType) -> Self {
        Self {
            element,
            len: self.len,
        }
    }
}

/// A named type: an opaque builtin object or a struct.
///
/// Equality compares names only. Two structs with the same name but
/// different members are the same type here; producers are expected to emit
/// unique names.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct UserDefinedType {
    name: Box<str>,
}

impl UserDefinedType {
    pub fn new(name: impl Into<Box<str>>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::EmptyTypeName);
        }
        Ok(Self { name })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}
