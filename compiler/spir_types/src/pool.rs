//! Session-scoped type interning pool.
//!
//! The pool maps every structural type shape to one canonical shared node.
//! Two structurally equal candidates interned into the same pool come back as
//! `Rc::ptr_eq` handles, so downstream identity checks are O(1).
//!
//! # Lifecycle
//!
//! - Created per compilation or mangling session
//! - Populated lazily: a shape is stored the first time it is interned
//! - Entries are never removed while the pool is alive
//!
//! Stored nodes are immutable. Changing a pointer's address space or
//! qualifiers goes through [`TypePool::with_address_space`] or
//! [`TypePool::with_qualifier`], which intern the modified shape.
//!
//! # Lookup Keys
//!
//! A canonical node's children are canonical too, so a node is keyed by its
//! own data plus the address of its canonical child (a [`Shape`]). Interning
//! one level costs one hash lookup regardless of how deep the chain below it
//! is. Chains built outside the pool are canonicalized bottom-up in a loop.
//!
//! The pool uses `Rc` handles and is therefore confined to one thread.
//! Concurrent sessions each need their own pool.

mod construct;

use std::fmt;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    AddressSpace, ParamType, PointerType, PrimitiveKind, Qualifier, Qualifiers, RefParamType,
    TypeError,
};

/// Lookup counters, mostly useful for tests and tracing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Lookups answered by an existing canonical node.
    pub hits: u64,
    /// Lookups that stored a new canonical node.
    pub misses: u64,
}

/// Node identity. Only compared and hashed, never dereferenced; the pool
/// keeps every canonical node alive, so addresses are never reused.
type NodeAddr = *const ParamType;

/// One level of a type with its child replaced by the canonical child's address.
#[derive(Clone, PartialEq, Eq, Hash)]
enum Shape {
    Primitive(PrimitiveKind),
    Pointer {
        pointee: NodeAddr,
        address_space: AddressSpace,
        qualifiers: Qualifiers,
    },
    Vector {
        element: NodeAddr,
        len: u32,
    },
    UserDefined(Box<str>),
}

impl Shape {
    /// Key of a node whose child is already canonical.
    fn of(ty: &ParamType) -> Self {
        match ty {
            ParamType::Primitive(prim) => Self::Primitive(prim.primitive()),
            ParamType::Pointer(ptr) => Self::Pointer {
                pointee: Rc::as_ptr(ptr.pointee()),
                address_space: ptr.address_space(),
                qualifiers: ptr.qualifiers(),
            },
            ParamType::Vector(vec) => Self::Vector {
                element: Rc::as_ptr(vec.scalar_type()),
                len: vec.length(),
            },
            ParamType::UserDefined(named) => Self::UserDefined(named.name().into()),
        }
    }
}

/// Deduplicating store of canonical type nodes.
#[derive(Default)]
pub struct TypePool {
    /// Canonical node for each shape.
    shapes: FxHashMap<Shape, RefParamType>,
    /// Addresses of canonical nodes.
    canonical: FxHashSet<NodeAddr>,
    /// Canonical nodes in insertion order.
    types: Vec<RefParamType>,
    stats: PoolStats,
}

impl TypePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical node structurally equal to `ty`, storing it
    /// first if this shape has not been seen.
    ///
    /// Children of newly stored composites are replaced by their canonical
    /// handles, so every node reachable from the pool is canonical.
    pub fn intern(&mut self, ty: ParamType) -> RefParamType {
        self.intern_chain(&ty)
    }

    /// Canonical handle for an existing handle.
    ///
    /// Cheap when `ty` is already canonical: no node is cloned.
    pub fn intern_ref(&mut self, ty: &RefParamType) -> RefParamType {
        if self.is_canonical(ty) {
            self.stats.hits += 1;
            return Rc::clone(ty);
        }
        self.intern_chain(ty)
    }

    /// Links below `ty` that are not canonical yet, top to bottom, and the
    /// canonical handle the lowest of them (or `ty` itself) hangs from.
    fn pending_links<'t>(&self, ty: &'t ParamType) -> (Vec<&'t ParamType>, Option<RefParamType>) {
        let mut pending = Vec::new();
        let mut current = ty;
        while let Some(child) = current.child() {
            if self.is_canonical(child) {
                return (pending, Some(Rc::clone(child)));
            }
            pending.push(child.as_ref());
            current = child;
        }
        (pending, None)
    }

    fn intern_chain(&mut self, ty: &ParamType) -> RefParamType {
        let (pending, mut below) = self.pending_links(ty);
        for link in pending.into_iter().rev() {
            below = Some(self.find_or_insert(link, below));
        }
        self.find_or_insert(ty, below)
    }

    fn find_or_insert(&mut self, ty: &ParamType, child: Option<RefParamType>) -> RefParamType {
        let candidate = ty.relinked(child);
        let shape = Shape::of(&candidate);
        if let Some(existing) = self.shapes.get(&shape) {
            self.stats.hits += 1;
            return Rc::clone(existing);
        }
        self.insert(shape, candidate)
    }

    #[cold]
    #[inline(never)]
    fn insert(&mut self, shape: Shape, ty: ParamType) -> RefParamType {
        let handle = Rc::new(ty);
        self.stats.misses += 1;
        tracing::trace!(
            kind = %handle.kind(),
            index = self.types.len(),
            "interned new type"
        );
        self.canonical.insert(Rc::as_ptr(&handle));
        self.shapes.insert(shape, Rc::clone(&handle));
        self.types.push(Rc::clone(&handle));
        handle
    }

    /// Canonical node for `ty`, without storing anything.
    pub fn get(&self, ty: &ParamType) -> Option<RefParamType> {
        let (pending, mut below) = self.pending_links(ty);
        for link in pending.into_iter().rev() {
            below = Some(self.find(link, below)?);
        }
        self.find(ty, below)
    }

    fn find(&self, ty: &ParamType, child: Option<RefParamType>) -> Option<RefParamType> {
        self.shapes.get(&Shape::of(&ty.relinked(child))).cloned()
    }

    pub fn contains(&self, ty: &ParamType) -> bool {
        self.get(ty).is_some()
    }

    /// Check if `ty` is the canonical handle of this pool (not merely equal).
    pub fn is_canonical(&self, ty: &RefParamType) -> bool {
        self.canonical.contains(&Rc::as_ptr(ty))
    }

    /// Re-intern a pointer with a different address space.
    pub fn with_address_space(
        &mut self,
        ty: &RefParamType,
        address_space: AddressSpace,
    ) -> Result<RefParamType, TypeError> {
        let ptr = ty
            .cast::<PointerType>()?
            .clone()
            .with_address_space(address_space);
        Ok(self.intern(ptr.into()))
    }

    /// Re-intern a pointer with one qualifier added or removed.
    pub fn with_qualifier(
        &mut self,
        ty: &RefParamType,
        qual: Qualifier,
        enabled: bool,
    ) -> Result<RefParamType, TypeError> {
        let mut ptr = ty.cast::<PointerType>()?.clone();
        ptr.set_qualifier(qual, enabled);
        Ok(self.intern(ptr.into()))
    }

    /// Canonical nodes in the order they were first interned.
    pub fn iter(&self) -> std::slice::Iter<'_, RefParamType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl fmt::Debug for TypePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypePool")
            .field("len", &self.types.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<'a> IntoIterator for &'a TypePool {
    type Item = &'a RefParamType;
    type IntoIter = std::slice::Iter<'a, RefParamType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests;
