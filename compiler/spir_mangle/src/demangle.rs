//! Parsing mangled names back into function descriptors.
//!
//! Accepts the grammar produced by [`mangle`](crate::mangle). Every type is
//! rebuilt through a [`TypePool`], so demangled parameters are canonical
//! handles of that pool.

use spir_types::{AddressSpace, PrimitiveKind, Qualifiers, RefParamType, TypePool};

use crate::mangle::primitive_code;
use crate::{DemangleError, FunctionDescriptor};

/// A back-reference target recorded while parsing.
#[derive(Clone)]
enum Candidate {
    Type(RefParamType),
    Qualified {
        address_space: AddressSpace,
        qualifiers: Qualifiers,
        pointee: RefParamType,
    },
}

/// Primitive kind for a single-letter builtin code.
fn builtin_kind(code: u8) -> Option<PrimitiveKind> {
    let kind = match code {
        b'b' => PrimitiveKind::Bool,
        b'h' => PrimitiveKind::UChar,
        b'c' => PrimitiveKind::Char,
        b't' => PrimitiveKind::UShort,
        b's' => PrimitiveKind::Short,
        b'j' => PrimitiveKind::UInt,
        b'i' => PrimitiveKind::Int,
        b'm' => PrimitiveKind::ULong,
        b'l' => PrimitiveKind::Long,
        b'f' => PrimitiveKind::Float,
        b'd' => PrimitiveKind::Double,
        b'v' => PrimitiveKind::Void,
        b'z' => PrimitiveKind::VarArg,
        _ => return None,
    };
    Some(kind)
}

/// Primitive kind whose encoding is the source name `name` (`ocl_image2d`, ...).
fn opaque_kind(name: &str) -> Option<PrimitiveKind> {
    PrimitiveKind::ALL.into_iter().find(|&kind| {
        let code = primitive_code(kind);
        code.starts_with(|c: char| c.is_ascii_digit())
            && code.trim_start_matches(|c: char| c.is_ascii_digit()) == name
    })
}

/// A pointer or vector prefix whose inner type has not been parsed yet.
enum Prefix {
    Pointer {
        address_space: AddressSpace,
        qualifiers: Qualifiers,
        /// Whether an address space or qualifier was spelled out.
        attributed: bool,
    },
    Vector {
        offset: usize,
        len: u32,
    },
}

struct Demangler<'s, 'p> {
    input: &'s str,
    pos: usize,
    pool: &'p mut TypePool,
    candidates: Vec<Candidate>,
}

impl<'s, 'p> Demangler<'s, 'p> {
    fn new(input: &'s str, pool: &'p mut TypePool) -> Self {
        Self {
            input,
            pos: 0,
            pool,
            candidates: Vec::new(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'s str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), DemangleError> {
        if self.eat(expected) {
            Ok(())
        } else if self.at_end() {
            Err(DemangleError::UnexpectedEnd { offset: self.pos })
        } else {
            Err(DemangleError::Expected {
                expected: char::from(expected),
                offset: self.pos,
            })
        }
    }

    /// Decimal length prefix.
    fn parse_length(&mut self) -> Result<usize, DemangleError> {
        let start = self.pos;
        let digits = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return Err(if self.at_end() {
                DemangleError::UnexpectedEnd { offset: start }
            } else {
                DemangleError::ExpectedLength { offset: start }
            });
        }
        self.pos += digits;
        self.input[start..self.pos]
            .parse()
            .map_err(|_| DemangleError::ExpectedLength { offset: start })
    }

    /// `<length> <name>`
    fn parse_source_name(&mut self) -> Result<&'s str, DemangleError> {
        let len = self.parse_length()?;
        let start = self.pos;
        let name = start
            .checked_add(len)
            .and_then(|end| self.input.get(start..end))
            .ok_or(DemangleError::UnexpectedEnd {
                offset: self.input.len(),
            })?;
        self.pos += len;
        Ok(name)
    }

    /// `S_` or `S <base-36> _`, resolved to a table entry.
    fn parse_substitution(&mut self) -> Result<Candidate, DemangleError> {
        let start = self.pos;
        self.expect(b'S')?;
        let mut idx = 0usize;
        if !self.eat(b'_') {
            let mut seq = 0usize;
            let mut digits = 0;
            while let Some(digit) = self
                .peek()
                .filter(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
                .and_then(|b| char::from(b).to_digit(36))
            {
                seq = seq
                    .checked_mul(36)
                    .and_then(|s| s.checked_add(usize::try_from(digit).ok()?))
                    .ok_or(DemangleError::InvalidSubstitution { offset: start })?;
                self.pos += 1;
                digits += 1;
            }
            if digits == 0 {
                return Err(DemangleError::InvalidSubstitution { offset: start });
            }
            self.expect(b'_')?;
            idx = seq + 1;
        }
        self.candidates
            .get(idx)
            .cloned()
            .ok_or(DemangleError::InvalidSubstitution { offset: start })
    }

    /// `<type>`
    ///
    /// Pointer and vector prefixes are stacked and closed innermost first, so
    /// nesting depth costs heap, not call stack.
    fn parse_type(&mut self) -> Result<RefParamType, DemangleError> {
        let mut open = Vec::new();
        let mut ty = loop {
            if self.rest().starts_with("Dv") {
                open.push(self.parse_vector_prefix()?);
            } else if self.peek() == Some(b'P') {
                self.pos += 1;
                if self.peek() == Some(b'S') {
                    break self.parse_substituted_pointer()?;
                }
                let (address_space, qualifiers, attributed) = self.parse_qualifiers()?;
                open.push(Prefix::Pointer {
                    address_space,
                    qualifiers,
                    attributed,
                });
            } else {
                break self.parse_leaf()?;
            }
        };

        while let Some(prefix) = open.pop() {
            ty = match prefix {
                Prefix::Pointer {
                    address_space,
                    qualifiers,
                    attributed,
                } => {
                    if attributed {
                        self.candidates.push(Candidate::Qualified {
                            address_space,
                            qualifiers,
                            pointee: RefParamType::clone(&ty),
                        });
                    }
                    self.pool.pointer_with(ty, address_space, qualifiers)
                }
                Prefix::Vector { offset, len } => self
                    .pool
                    .vector(ty, len)
                    .map_err(|source| DemangleError::Type { offset, source })?,
            };
            self.candidates.push(Candidate::Type(RefParamType::clone(&ty)));
        }
        Ok(ty)
    }

    /// A type with no pointer or vector prefix: builtin, name or substitution.
    fn parse_leaf(&mut self) -> Result<RefParamType, DemangleError> {
        let start = self.pos;
        let Some(code) = self.peek() else {
            return Err(DemangleError::UnexpectedEnd { offset: start });
        };
        match code {
            b'S' => match self.parse_substitution()? {
                Candidate::Type(ty) => Ok(ty),
                Candidate::Qualified { .. } => {
                    Err(DemangleError::InvalidSubstitution { offset: start })
                }
            },
            b'D' => {
                self.pos += 1;
                if self.eat(b'h') {
                    Ok(self.pool.half())
                } else {
                    Err(self.unknown_code())
                }
            }
            b'0'..=b'9' => {
                let name = self.parse_source_name()?;
                if let Some(kind) = opaque_kind(name) {
                    return Ok(self.pool.primitive(kind));
                }
                let ty = self
                    .pool
                    .user_defined(name)
                    .map_err(|source| DemangleError::Type {
                        offset: start,
                        source,
                    })?;
                self.candidates.push(Candidate::Type(RefParamType::clone(&ty)));
                Ok(ty)
            }
            _ => match builtin_kind(code) {
                Some(kind) => {
                    self.pos += 1;
                    Ok(self.pool.primitive(kind))
                }
                None => Err(self.unknown_code()),
            },
        }
    }

    fn unknown_code(&self) -> DemangleError {
        match self.rest().chars().next() {
            Some(code) => DemangleError::UnknownCode {
                code,
                offset: self.pos,
            },
            None => DemangleError::UnexpectedEnd { offset: self.pos },
        }
    }

    /// `Dv <length> _`
    fn parse_vector_prefix(&mut self) -> Result<Prefix, DemangleError> {
        let offset = self.pos;
        self.pos += 2;
        let len_offset = self.pos;
        let len = self.parse_length()?;
        let len = u32::try_from(len)
            .map_err(|_| DemangleError::ExpectedLength { offset: len_offset })?;
        self.expect(b'_')?;
        Ok(Prefix::Vector { offset, len })
    }

    /// `P S <seq-id> _`, positioned after `P`. The referenced component is
    /// either a complete pointee or an attributed one.
    fn parse_substituted_pointer(&mut self) -> Result<RefParamType, DemangleError> {
        let ty = match self.parse_substitution()? {
            Candidate::Type(pointee) => self.pool.pointer(pointee),
            Candidate::Qualified {
                address_space,
                qualifiers,
                pointee,
            } => self.pool.pointer_with(pointee, address_space, qualifiers),
        };
        self.candidates.push(Candidate::Type(RefParamType::clone(&ty)));
        Ok(ty)
    }

    /// `[U3AS <digit>] [r] [V] [K]`; the flag reports whether any were present.
    fn parse_qualifiers(&mut self) -> Result<(AddressSpace, Qualifiers, bool), DemangleError> {
        let mut attributed = false;
        let mut address_space = AddressSpace::default();

        if self.eat_str("U3AS") {
            let offset = self.pos;
            let raw = self
                .peek()
                .filter(u8::is_ascii_digit)
                .ok_or(DemangleError::ExpectedLength { offset })?;
            self.pos += 1;
            address_space = AddressSpace::from_raw(raw - b'0')
                .map_err(|source| DemangleError::Type { offset, source })?;
            attributed = true;
        }

        let mut qualifiers = Qualifiers::empty();
        for (code, flag) in [
            (b'r', Qualifiers::RESTRICT),
            (b'V', Qualifiers::VOLATILE),
            (b'K', Qualifiers::CONST),
        ] {
            if self.eat(code) {
                qualifiers |= flag;
                attributed = true;
            }
        }

        Ok((address_space, qualifiers, attributed))
    }
}

/// Parse a mangled name produced by [`mangle`](crate::mangle).
///
/// Parameter types are interned into `pool`.
#[tracing::instrument(level = "debug", skip(pool))]
pub fn demangle(mangled: &str, pool: &mut TypePool) -> Result<FunctionDescriptor, DemangleError> {
    let mut parser = Demangler::new(mangled, pool);
    if !parser.eat_str("_Z") {
        return Err(DemangleError::MissingPrefix);
    }

    let name = parser.parse_source_name()?;
    if name.is_empty() {
        return Err(DemangleError::EmptyName);
    }

    let mut descriptor = FunctionDescriptor::new(name);
    if parser.rest() == "v" {
        return Ok(descriptor);
    }
    if parser.at_end() {
        return Err(DemangleError::UnexpectedEnd { offset: parser.pos });
    }

    while !parser.at_end() {
        descriptor.push(parser.parse_type()?);
    }

    tracing::debug!(params = descriptor.parameters().len(), "demangled");
    Ok(descriptor)
}
