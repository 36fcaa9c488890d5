//! Function descriptors: a name plus an ordered parameter list.

use std::fmt;

use spir_types::RefParamType;

use crate::MangleError;

/// A function signature as seen by the mangler.
///
/// The return type is not part of a mangled SPIR name and is not modeled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionDescriptor {
    name: String,
    parameters: Vec<RefParamType>,
}

impl FunctionDescriptor {
    /// Descriptor with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = RefParamType>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[RefParamType] {
        &self.parameters
    }

    /// Append a parameter.
    pub fn push(&mut self, param: RefParamType) {
        self.parameters.push(param);
    }

    /// Whether the function takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Shorthand for [`mangle`](crate::mangle).
    pub fn mangle(&self) -> Result<String, MangleError> {
        crate::mangle(self)
    }
}

impl fmt::Display for FunctionDescriptor {
    /// `name(float4, __global int*)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}
