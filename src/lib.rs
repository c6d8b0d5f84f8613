//! # errclass
//!
//! Error classification and exception values over a message-passing
//! runtime's native error model.
//!
//! ## Model
//!
//! 1. **Codes and classes**: every error is an integer code. A *class* is a
//!    code that classifies to itself; every other registered code is owned by
//!    exactly one class. `SUCCESS = 0` means "no error".
//! 2. **Built-in classes** are fixed at startup and lie in
//!    `SUCCESS..ERR_LASTCODE`.
//! 3. **Dynamic classes and codes** are allocated at run time above
//!    `ERR_LASTCODE`, strictly increasing, never reused.
//! 4. **Descriptions** are attached per code; a code nobody described
//!    resolves to `""`.
//! 5. **Exception values** wrap one code and derive class and description on
//!    demand. They never fail to construct.
//!
//! ## Layers
//!
//! - [`NativeErrorModel`]: the runtime primitives (classification,
//!   allocation, descriptions). [`InProcessRuntime`] implements them in
//!   software.
//! - [`ErrorRegistry`]: frontier, ownership and descriptions over the native
//!   layer. [`SharedRegistry`] shares one registry across handles and threads.
//! - [`ExceptionValue`]: the value type; [`RaisedError`] carries one through
//!   `?`.
//! - [`CommHandle`]: registry state as read-only attributes.
//!
//! ## Quick Start
//!
//! ```rust
//! use errclass::{ErrorRegistry, ExceptionValue, InProcessRuntime, Result};
//!
//! fn register(registry: &mut ErrorRegistry) -> Result<ExceptionValue> {
//!     let class = registry.allocate_class()?;
//!     registry.set_string(class, "storage errors")?;
//!
//!     let code = registry.allocate_code(class)?;
//!     registry.set_string(code, "checkpoint file is corrupt")?;
//!     Ok(ExceptionValue::new(code))
//! }
//!
//! let mut registry = ErrorRegistry::new(InProcessRuntime::new());
//! let e = register(&mut registry).unwrap();
//!
//! assert_eq!(e.describe(&registry).to_string(), "checkpoint file is corrupt");
//! assert_eq!(registry.get_string(e.error_class(&registry)), "storage errors");
//! ```
//!
//! ## Propagating native status codes
//!
//! ```rust
//! use errclass::{ErrorRegistry, InProcessRuntime, RaisedError, check, definitions};
//!
//! fn send(registry: &ErrorRegistry, status: i32) -> Result<(), RaisedError> {
//!     check(registry, status)?;
//!     Ok(())
//! }
//!
//! let registry = ErrorRegistry::new(InProcessRuntime::new());
//! assert!(send(&registry, 0).is_ok());
//!
//! let err = send(&registry, 13).unwrap_err();
//! assert_eq!(err.class(), definitions::ERR_ARG);
//! assert_eq!(err.to_public(), "ERR_ARG");
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: unabridged log formatting for trusted environments (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::fmt;
use std::result;

pub mod attributes;
pub mod codes;
pub mod convenience;
pub mod definitions;
pub mod exception;
pub mod journal;
pub mod logging;
pub mod native;
pub mod registry;
pub mod strings;

pub use attributes::*;
pub use codes::*;
pub use convenience::*;
pub use exception::*;
pub use journal::*;
pub use logging::*;
pub use native::*;
pub use registry::*;
pub use strings::*;

/// Type alias for Results using the registry error type.
pub type Result<T> = result::Result<T, RegistryError>;

// ============================================================================
// Registry Errors
// ============================================================================

/// Failure of a registry write.
///
/// Reads never fail, so this only comes out of `allocate_class`,
/// `allocate_code` and `set_string`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "errors should be handled or logged"]
pub enum RegistryError {
    /// The runtime has no dynamic class registration. Expected, not a fault.
    CapabilityUnavailable,
    /// `allocate_code` was given a code that is not a registered class.
    InvalidErrorClass {
        /// The rejected value.
        class: ErrorCode,
    },
    /// The native layer refused the request.
    Native(NativeFault),
}

impl RegistryError {
    /// Whether this is the soft "feature absent" signal.
    #[inline]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable)
    }

    /// Short, stable message without any values.
    pub fn to_public(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable => "Dynamic error classes not supported",
            Self::InvalidErrorClass { .. } => "Invalid error class",
            Self::Native(fault) => fault.to_public(),
        }
    }
}

impl From<NativeFault> for RegistryError {
    fn from(fault: NativeFault) -> Self {
        match fault {
            NativeFault::Unsupported => Self::CapabilityUnavailable,
            NativeFault::UnknownClass { class } => Self::InvalidErrorClass { class },
            other => Self::Native(other),
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityUnavailable => {
                f.write_str("dynamic error class registration is unavailable")
            }
            Self::InvalidErrorClass { class } => {
                write!(f, "{} is not a registered error class", class)
            }
            Self::Native(fault) => write!(f, "native error model refused: {}", fault),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Native(fault) => Some(fault),
            _ => None,
        }
    }
}

// ============================================================================
// Raised Errors
// ============================================================================

/// An [`ExceptionValue`] in flight.
///
/// Captures class and description from the registry when raised, so it can
/// travel through `?` after the registry borrow ends.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "errors should be handled or logged"]
pub struct RaisedError {
    exception: ExceptionValue,
    class: ErrorCode,
    class_name: &'static str,
    message: String,
}

impl RaisedError {
    /// Public name for classes outside the built-in set.
    pub const DYNAMIC_CLASS_NAME: &'static str = "ERR_DYNAMIC";

    /// Raise `exception`, capturing its derivations from `registry`.
    pub fn new(exception: impl Into<ExceptionValue>, registry: &ErrorRegistry) -> Self {
        let exception = exception.into();
        let class = exception.error_class(registry);
        let class_name = registry
            .builtin_classes()
            .iter()
            .find(|builtin| builtin.code() == class)
            .map_or(Self::DYNAMIC_CLASS_NAME, |builtin| builtin.name());

        Self {
            exception,
            class,
            class_name,
            message: exception.error_string(registry).to_owned(),
        }
    }

    /// The carried value.
    #[inline]
    pub const fn exception(&self) -> ExceptionValue {
        self.exception
    }

    /// The carried code.
    #[inline]
    pub const fn code(&self) -> ErrorCode {
        self.exception.code()
    }

    /// Class at the time of raising.
    #[inline]
    pub const fn class(&self) -> ErrorCode {
        self.class
    }

    /// Description at the time of raising.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Symbolic class name, or [`DYNAMIC_CLASS_NAME`](Self::DYNAMIC_CLASS_NAME).
    #[inline]
    pub const fn to_public(&self) -> &'static str {
        self.class_name
    }
}

impl From<RaisedError> for ExceptionValue {
    fn from(raised: RaisedError) -> Self {
        raised.exception
    }
}

impl fmt::Display for RaisedError {
    /// Descriptions are caller-supplied; control characters are neutralised.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "error {} [{}]", self.code(), self.class_name)
        } else {
            write!(
                f,
                "{} (error {} [{}])",
                sanitized!(self.message),
                self.code(),
                self.class_name
            )
        }
    }
}

impl std::error::Error for RaisedError {}

/// Turn a native status code into a `Result`.
///
/// `SUCCESS` is `Ok`; every other code is raised against `registry`.
pub fn check(registry: &ErrorRegistry, status: impl Into<ErrorCode>) -> result::Result<(), RaisedError> {
    let exception = ExceptionValue::new(status);
    if exception.is_error() {
        Err(RaisedError::new(exception, registry))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::definitions::{ERR_ARG, ERR_UNKNOWN, SUCCESS};

    fn registry() -> ErrorRegistry {
        ErrorRegistry::new(InProcessRuntime::new())
    }

    #[test]
    fn native_faults_map_to_registry_errors() {
        assert!(RegistryError::from(NativeFault::Unsupported).is_unsupported());

        let class = ErrorCode::new(99);
        assert_eq!(
            RegistryError::from(NativeFault::UnknownClass { class }),
            RegistryError::InvalidErrorClass { class }
        );
        assert_eq!(
            RegistryError::from(NativeFault::CodeSpaceExhausted),
            RegistryError::Native(NativeFault::CodeSpaceExhausted)
        );
    }

    #[test]
    fn registry_error_source_is_native_fault() {
        use std::error::Error;

        let err = RegistryError::Native(NativeFault::DescriptionTooLong { len: 300, max: 256 });
        assert!(err.source().is_some());
        assert!(RegistryError::CapabilityUnavailable.source().is_none());
        assert!(!err.to_public().contains("300"));
    }

    #[test]
    fn check_passes_success() {
        assert_eq!(check(&registry(), SUCCESS), Ok(()));
        assert_eq!(check(&registry(), 0), Ok(()));
    }

    #[test]
    fn check_raises_builtin_code() {
        let registry = registry();
        let err = check(&registry, ERR_ARG).unwrap_err();

        assert_eq!(err.exception(), ExceptionValue::new(ERR_ARG));
        assert_eq!(err.class(), ERR_ARG);
        assert_eq!(err.message(), registry.get_string(ERR_ARG));
        assert_eq!(err.to_public(), "ERR_ARG");
        assert_eq!(
            err.to_string(),
            "Invalid argument of some other kind (error 13 [ERR_ARG])"
        );
    }

    #[test]
    fn raised_dynamic_code_keeps_captured_message() {
        let mut registry = registry();
        let class = registry.allocate_class().unwrap();
        let code = registry.allocate_code(class).unwrap();
        registry.set_string(code, "first").unwrap();

        let err = RaisedError::new(code, &registry);
        registry.set_string(code, "second").unwrap();

        assert_eq!(err.message(), "first");
        assert_eq!(err.class(), class);
        assert_eq!(err.to_public(), RaisedError::DYNAMIC_CLASS_NAME);
        assert_eq!(ExceptionValue::from(err), code);
    }

    #[test]
    fn raised_unknown_code_falls_back() {
        let err = check(&registry(), -7).unwrap_err();
        assert_eq!(err.class(), ERR_UNKNOWN);
        assert_eq!(err.to_public(), "ERR_UNKNOWN");
        assert_eq!(err.to_string(), "error -7 [ERR_UNKNOWN]");
    }

    #[test]
    fn raised_display_neutralises_control_characters() {
        let mut registry = registry();
        let class = registry.allocate_class().unwrap();
        registry.set_string(class, "line one\nline two").unwrap();

        let rendered = check(&registry, class).unwrap_err().to_string();
        assert!(!rendered.contains('\n'));
        assert!(rendered.starts_with("line one?line two"));
    }
}
