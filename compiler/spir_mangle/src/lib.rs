//! SPIR function name mangling.
//!
//! Encodes a [`FunctionDescriptor`] (a function name plus its parameter
//! types) into the Itanium-style symbol used by SPIR 1.2 builtins, and parses
//! such symbols back into descriptors whose types live in a
//! [`TypePool`](spir_types::TypePool).
//!
//! ```text
//! fract(float4, __global float4*)  <->  _Z5fractDv4_fPU3AS1S_
//! ```
//!
//! # Tracing
//!
//! `mangle` and `demangle` emit `debug` spans. Call [`init_tracing`] and set
//! `RUST_LOG=spir_mangle=debug` to see them.

mod demangle;
mod descriptor;
mod error;
mod mangle;

use std::sync::Once;

pub use demangle::demangle;
pub use descriptor::FunctionDescriptor;
pub use error::{DemangleError, MangleError};
pub use mangle::{mangle, mangle_type, primitive_code, Mangler};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .try_init();
        }
    });
}
