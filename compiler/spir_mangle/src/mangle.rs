//! Itanium-style mangling of SPIR function descriptors.
//!
//! # Encoding
//!
//! ```text
//! <mangled>   ::= _Z <length> <name> <params>
//! <params>    ::= v                                  # no parameters
//!               | <type>+
//! <type>      ::= <builtin>                          # i, f, Dh, 11ocl_image2d, ...
//!               | P <qualifiers> <type>              # pointer
//!               | Dv <length> _ <type>               # vector
//!               | <length> <name>                    # user-defined
//!               | S [<seq-id>] _                     # substitution
//! <qualifiers> ::= [U3AS <digit>] [r] [V] [K]
//! ```
//!
//! Pointers, qualified pointees, vectors and user-defined types become
//! substitution candidates once fully mangled. A repeated candidate is
//! written as `S_` for the first, then `S0_`, `S1_`, ... in base 36.

use std::fmt::Write as _;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use spir_stack::ensure_sufficient_stack;
use spir_types::{
    AddressSpace, ParamType, PointerType, PrimitiveKind, PrimitiveType, Qualifier, Qualifiers,
    RefParamType, TypePool, TypeVisitor, UserDefinedType, VectorType,
};

use crate::{FunctionDescriptor, MangleError};

/// Mangling of every primitive kind, indexed by `PrimitiveKind::raw`.
const PRIMITIVE_CODES: [&str; PrimitiveKind::COUNT as usize] = [
    "b",
    "h",
    "c",
    "t",
    "s",
    "j",
    "i",
    "m",
    "l",
    "Dh",
    "f",
    "d",
    "v",
    "z",
    "11ocl_image1d",
    "11ocl_image2d",
    "11ocl_image3d",
    "17ocl_image1dbuffer",
    "16ocl_image1darray",
    "16ocl_image2darray",
    "9ocl_event",
    "11ocl_sampler",
];

/// Mangled encoding of a primitive kind.
#[inline]
pub fn primitive_code(kind: PrimitiveKind) -> &'static str {
    PRIMITIVE_CODES[usize::from(kind.raw())]
}

/// Vendor qualifier for a non-default address space.
fn address_space_code(space: AddressSpace) -> Option<&'static str> {
    match space {
        AddressSpace::Private => None,
        AddressSpace::Global => Some("U3AS1"),
        AddressSpace::Constant => Some("U3AS2"),
        AddressSpace::Local => Some("U3AS3"),
    }
}

fn qualifier_code(qual: Qualifier) -> char {
    match qual {
        Qualifier::Restrict => 'r',
        Qualifier::Volatile => 'V',
        Qualifier::Const => 'K',
    }
}

/// Address of a node canonical in the mangler's own pool. Structurally
/// equal types share one canonical node, so the address identifies the shape.
type NodeAddr = *const ParamType;

/// A component that later occurrences may refer back to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Substitutable {
    /// A complete type (pointer, vector or user-defined).
    Type(NodeAddr),
    /// The attributed pointee of a pointer, e.g. `U3AS1Kf`.
    Qualified {
        address_space: AddressSpace,
        qualifiers: Qualifiers,
        pointee: NodeAddr,
    },
}

/// Write the substitution reference for table index `idx`.
fn write_substitution(out: &mut String, idx: usize) {
    out.push('S');
    if idx > 0 {
        write_base36(out, idx - 1);
    }
    out.push('_');
}

fn write_base36(out: &mut String, mut value: usize) {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut buf = [0u8; 16];
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = DIGITS[value % 36];
        value /= 36;
        if value == 0 {
            break;
        }
    }
    for &digit in &buf[pos..] {
        out.push(char::from(digit));
    }
}

/// Visitor that appends the mangled encoding of each visited type.
///
/// One `Mangler` covers one function: its substitution table spans every
/// parameter. Visited types are canonicalized into a private pool, so
/// repeated components are found by identity in O(1).
pub struct Mangler<'a> {
    out: &'a mut String,
    pool: TypePool,
    substitutions: FxHashMap<Substitutable, usize>,
}

impl<'a> Mangler<'a> {
    pub fn new(out: &'a mut String) -> Self {
        Self {
            out,
            pool: TypePool::new(),
            substitutions: FxHashMap::default(),
        }
    }

    /// Number of substitution candidates recorded so far.
    pub fn candidates(&self) -> usize {
        self.substitutions.len()
    }

    /// Mangle one parameter, sharing the table with earlier ones.
    pub fn mangle_param(&mut self, ty: &RefParamType) {
        let canonical = self.pool.intern_ref(ty);
        canonical.accept(self);
    }

    /// Write a back-reference if `candidate` was already mangled.
    fn substitute(&mut self, candidate: Substitutable) -> bool {
        match self.substitutions.get(&candidate) {
            Some(&idx) => {
                write_substitution(self.out, idx);
                true
            }
            None => false,
        }
    }

    fn record(&mut self, candidate: Substitutable) {
        let idx = self.substitutions.len();
        self.substitutions.entry(candidate).or_insert(idx);
    }

    /// Candidate key for a complete type.
    fn type_key(&mut self, ty: ParamType) -> Substitutable {
        Substitutable::Type(Rc::as_ptr(&self.pool.intern(ty)))
    }
}

impl TypeVisitor for Mangler<'_> {
    fn visit_primitive(&mut self, ty: &PrimitiveType) {
        self.out.push_str(primitive_code(ty.primitive()));
    }

    fn visit_vector(&mut self, ty: &VectorType) {
        let candidate = self.type_key(ParamType::Vector(ty.clone()));
        if self.substitute(candidate) {
            return;
        }
        let _ = write!(self.out, "Dv{}_", ty.length());
        // Elements are scalar primitives: no further nesting.
        ty.scalar_type().accept(self);
        self.record(candidate);
    }

    fn visit_pointer(&mut self, ty: &PointerType) {
        let candidate = self.type_key(ParamType::Pointer(ty.clone()));
        if self.substitute(candidate) {
            return;
        }
        self.out.push('P');

        let pointee = self.pool.intern_ref(ty.pointee());
        let space = address_space_code(ty.address_space());
        if space.is_none() && ty.qualifiers().is_empty() {
            ensure_sufficient_stack(|| pointee.accept(self));
        } else {
            let qualified = Substitutable::Qualified {
                address_space: ty.address_space(),
                qualifiers: ty.qualifiers(),
                pointee: Rc::as_ptr(&pointee),
            };
            if !self.substitute(qualified) {
                if let Some(space) = space {
                    self.out.push_str(space);
                }
                for qual in ty.qualifiers().qualifiers() {
                    self.out.push(qualifier_code(qual));
                }
                ensure_sufficient_stack(|| pointee.accept(self));
                self.record(qualified);
            }
        }

        self.record(candidate);
    }

    fn visit_user_defined(&mut self, ty: &UserDefinedType) {
        let candidate = self.type_key(ParamType::UserDefined(ty.clone()));
        if self.substitute(candidate) {
            return;
        }
        let _ = write!(self.out, "{}{}", ty.name().len(), ty.name());
        self.record(candidate);
    }
}

/// Mangle a function descriptor.
///
/// `fract(float4, __global float4*)` becomes `_Z5fractDv4_fPU3AS1S_`.
#[tracing::instrument(level = "debug", skip_all, fields(name = descriptor.name()))]
pub fn mangle(descriptor: &FunctionDescriptor) -> Result<String, MangleError> {
    let name = descriptor.name();
    if name.is_empty() {
        return Err(MangleError::EmptyName);
    }

    let mut out = format!("_Z{}{}", name.len(), name);
    if descriptor.is_empty() {
        out.push('v');
    } else {
        let mut mangler = Mangler::new(&mut out);
        for param in descriptor.parameters() {
            mangler.mangle_param(param);
        }
        tracing::trace!(candidates = mangler.candidates(), "substitution table");
    }

    tracing::debug!(mangled = %out, "mangled");
    Ok(out)
}

/// Mangle a single type with a fresh substitution table.
pub fn mangle_type(ty: &ParamType) -> String {
    let mut out = String::new();
    let mut mangler = Mangler::new(&mut out);
    let canonical = mangler.pool.intern(ty.clone());
    canonical.accept(&mut mangler);
    out
}
