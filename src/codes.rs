//! Error code identity - the integer every other layer is keyed on.
//!
//! An error code plays two overlapping roles:
//!
//! - **Class code**: the representative of a category. A class is itself a
//!   valid code and classifies to itself.
//! - **Specific code**: owned by exactly one class.
//!
//! `ErrorCode` is a `Copy` newtype over `i32`. It accepts any integer,
//! including negative values: validation happens where a code is *derived*
//! (classified, described), never where it is constructed.
//!
//! # Ordering and Hashing
//!
//! Ordering, equality and hashing are those of the wrapped integer. Hashing an
//! `ErrorCode` feeds exactly the bytes of its `i32` into the hasher, so an
//! `ErrorCode` and its raw integer always hash identically.
//!
//! ```rust
//! use errclass::{ErrorCode, definitions};
//!
//! let code = ErrorCode::new(13);
//! assert_eq!(code, definitions::ERR_ARG);
//! assert!(code > 0);
//! assert_eq!(i32::from(code), 13);
//! ```

use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Error Code (Primary Identity Type)
// ============================================================================

/// A raw error code or error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ErrorCode(i32);

impl ErrorCode {
    /// Wrap a raw integer. Never fails.
    #[inline]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Get the raw integer.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Borrow the raw integer.
    #[inline]
    pub const fn as_raw(&self) -> &i32 {
        &self.0
    }

    /// The next code above this one, or `None` when the integer space is exhausted.
    #[inline]
    pub const fn successor(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ErrorCode {
    #[inline]
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<ErrorCode> for i32 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

impl PartialEq<i32> for ErrorCode {
    #[inline]
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}

impl PartialEq<ErrorCode> for i32 {
    #[inline]
    fn eq(&self, other: &ErrorCode) -> bool {
        *self == other.0
    }
}

impl PartialOrd<i32> for ErrorCode {
    #[inline]
    fn partial_cmp(&self, other: &i32) -> Option<Ordering> {
        Some(self.0.cmp(other))
    }
}

impl PartialOrd<ErrorCode> for i32 {
    #[inline]
    fn partial_cmp(&self, other: &ErrorCode) -> Option<Ordering> {
        Some(self.cmp(&other.0))
    }
}

// ============================================================================
// Built-in Class Descriptor (Frozen Identity)
// ============================================================================

/// A built-in error class known to the runtime at start-up.
///
/// Descriptors only exist as const statics (see [`crate::definitions`]); the
/// built-in set is fixed for the lifetime of the process.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BuiltinClass {
    name: &'static str,
    code: ErrorCode,
    description: &'static str,
}

impl BuiltinClass {
    #[doc(hidden)]
    pub const fn __internal_new(name: &'static str, code: ErrorCode, description: &'static str) -> Self {
        assert!(code.value() >= 0, "Built-in error classes must be non-negative");
        Self {
            name,
            code,
            description,
        }
    }

    /// Symbolic name, e.g. `ERR_ARG`.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The class code.
    #[inline]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Runtime-provided description.
    #[inline]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Display for BuiltinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
