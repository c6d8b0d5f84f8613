//! Boundary to the runtime's native error facility.
//!
//! The registry never talks to a runtime directly; it consumes the primitives
//! of [`NativeErrorModel`]. A binding to a real message-passing library
//! implements the trait over its C entry points. [`InProcessRuntime`] is a
//! software implementation carrying the built-in table from
//! [`crate::definitions`]; it backs the tests, benches and demos, and
//! stands in for the native layer wherever no library is linked.
//!
//! # Capability
//!
//! Dynamic class registration is optional. A runtime without it reports
//! `supports_dynamic_classes() == false` and answers allocation requests with
//! [`NativeFault::Unsupported`].

use crate::{BuiltinClass, ErrorCode, ErrorStringTable, definitions};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Native Faults
// ============================================================================

/// A refusal reported by the native layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeFault {
    /// Dynamic class/code registration is not available.
    Unsupported,
    /// `allocate_code` was given something that is not a class.
    UnknownClass {
        /// The rejected value.
        class: ErrorCode,
    },
    /// Description exceeds the runtime's maximum error string length.
    DescriptionTooLong {
        /// Length of the rejected description in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },
    /// An allocation returned a value that is not above every earlier allocation.
    StaleAllocation {
        /// The value the runtime returned.
        value: ErrorCode,
        /// The lowest value that would have been fresh.
        frontier: ErrorCode,
    },
    /// The integer code space is used up.
    CodeSpaceExhausted,
}

impl NativeFault {
    /// Short, stable message without any values.
    pub fn to_public(&self) -> &'static str {
        match self {
            Self::Unsupported => "Dynamic error classes not supported",
            Self::UnknownClass { .. } => "Invalid error class",
            Self::DescriptionTooLong { .. } => "Error string too long",
            Self::StaleAllocation { .. } => "Runtime returned a reused error code",
            Self::CodeSpaceExhausted => "Error code space exhausted",
        }
    }
}

impl fmt::Display for NativeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("dynamic error class registration is not supported"),
            Self::UnknownClass { class } => write!(f, "{} is not a registered error class", class),
            Self::DescriptionTooLong { len, max } => {
                write!(f, "error string of {} bytes exceeds maximum of {}", len, max)
            }
            Self::StaleAllocation { value, frontier } => write!(
                f,
                "runtime allocated {} but the next fresh code is {}",
                value, frontier
            ),
            Self::CodeSpaceExhausted => f.write_str("error code space exhausted"),
        }
    }
}

impl std::error::Error for NativeFault {}

// ============================================================================
// Collaborator Trait
// ============================================================================

/// Primitives the registry consumes from the runtime.
///
/// Read operations take `&self` and never fail. Allocation and description
/// writes take `&mut self`; callers serialize them.
pub trait NativeErrorModel: Send + Sync {
    /// Exclusive upper bound on the built-in classes.
    fn last_code(&self) -> ErrorCode;

    /// The built-in class set, in code order.
    fn builtin_classes(&self) -> &'static [BuiltinClass];

    /// Class of `code`, or `None` when the runtime does not recognize it.
    fn classify(&self, code: ErrorCode) -> Option<ErrorCode>;

    /// Description of `code`, or `None` when the runtime has none.
    fn describe(&self, code: ErrorCode) -> Option<&str>;

    /// Whether dynamic class registration is available.
    fn supports_dynamic_classes(&self) -> bool;

    /// Allocate a fresh error class.
    fn allocate_class(&mut self) -> Result<ErrorCode, NativeFault>;

    /// Allocate a fresh error code owned by `class`.
    fn allocate_code(&mut self, class: ErrorCode) -> Result<ErrorCode, NativeFault>;

    /// Attach a description to `code`.
    fn set_description(&mut self, code: ErrorCode, description: &str) -> Result<(), NativeFault>;
}

// ============================================================================
// In-Process Runtime
// ============================================================================

/// Software implementation of the native error facility.
///
/// Allocation hands out consecutive integers starting just above
/// [`definitions::ERR_LASTCODE`]; classes and codes share one counter.
#[derive(Debug)]
pub struct InProcessRuntime {
    dynamic_classes: bool,
    next: Option<ErrorCode>,
    owners: HashMap<ErrorCode, ErrorCode>,
    descriptions: ErrorStringTable,
}

impl InProcessRuntime {
    /// Runtime with dynamic class registration.
    pub fn new() -> Self {
        Self {
            dynamic_classes: true,
            next: definitions::ERR_LASTCODE.successor(),
            owners: HashMap::new(),
            descriptions: ErrorStringTable::from_builtin(definitions::BUILTIN_CLASSES),
        }
    }

    /// Runtime that only knows its built-in classes.
    pub fn without_dynamic_classes() -> Self {
        Self {
            dynamic_classes: false,
            ..Self::new()
        }
    }

    fn is_class(&self, code: ErrorCode) -> bool {
        definitions::builtin_class(code).is_some() || self.owners.get(&code) == Some(&code)
    }

    fn take_next(&mut self) -> Result<ErrorCode, NativeFault> {
        let value = self.next.ok_or(NativeFault::CodeSpaceExhausted)?;
        self.next = value.successor();
        Ok(value)
    }
}

impl Default for InProcessRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeErrorModel for InProcessRuntime {
    fn last_code(&self) -> ErrorCode {
        definitions::ERR_LASTCODE
    }

    fn builtin_classes(&self) -> &'static [BuiltinClass] {
        definitions::BUILTIN_CLASSES
    }

    fn classify(&self, code: ErrorCode) -> Option<ErrorCode> {
        if definitions::builtin_class(code).is_some() {
            return Some(code);
        }
        self.owners.get(&code).copied()
    }

    fn describe(&self, code: ErrorCode) -> Option<&str> {
        self.descriptions.lookup(code)
    }

    fn supports_dynamic_classes(&self) -> bool {
        self.dynamic_classes
    }

    fn allocate_class(&mut self) -> Result<ErrorCode, NativeFault> {
        if !self.dynamic_classes {
            return Err(NativeFault::Unsupported);
        }
        let class = self.take_next()?;
        self.owners.insert(class, class);
        Ok(class)
    }

    fn allocate_code(&mut self, class: ErrorCode) -> Result<ErrorCode, NativeFault> {
        if !self.dynamic_classes {
            return Err(NativeFault::Unsupported);
        }
        if class == definitions::SUCCESS || !self.is_class(class) {
            return Err(NativeFault::UnknownClass { class });
        }
        let code = self.take_next()?;
        self.owners.insert(code, class);
        Ok(code)
    }

    fn set_description(&mut self, code: ErrorCode, description: &str) -> Result<(), NativeFault> {
        if description.len() > definitions::MAX_ERROR_STRING {
            return Err(NativeFault::DescriptionTooLong {
                len: description.len(),
                max: definitions::MAX_ERROR_STRING,
            });
        }
        self.descriptions.set(code, description.to_owned());
        Ok(())
    }
}
