//! Exception values - an immutable wrapper around one error code.
//!
//! An `ExceptionValue` stores nothing but its code. Class and description are
//! derived on demand from a registry, so construction never fails and unknown
//! codes degrade only when derived (class `ERR_UNKNOWN`, description `""`).
//!
//! # Value laws
//!
//! - Equality, ordering and hashing are those of the code; comparisons with a
//!   bare `i32` work in both directions and sets keyed by exception values
//!   can be queried with a raw code
//! - Truthiness: `bool::from(e)` is `true` for every code except `SUCCESS`
//! - The canonical representation `Exception(<code>)` (the `Debug` output)
//!   parses back to an equal value
//!
//! ```rust
//! use errclass::{ErrorRegistry, ExceptionValue, InProcessRuntime, definitions};
//! use std::collections::HashSet;
//!
//! let registry = ErrorRegistry::new(InProcessRuntime::new());
//! let e = ExceptionValue::new(definitions::ERR_ARG);
//!
//! assert_eq!(e, 13);
//! assert_eq!(e.error_class(&registry), definitions::ERR_ARG);
//! assert_eq!(e.describe(&registry).to_string(), registry.get_string(definitions::ERR_ARG));
//! assert_eq!(format!("{:?}", e).parse::<ExceptionValue>(), Ok(e));
//!
//! let seen: HashSet<ExceptionValue> = [e].into_iter().collect();
//! assert!(seen.contains(&13_i32));
//! ```

use crate::definitions::SUCCESS;
use crate::{ErrorCode, ErrorRegistry};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

const REPR_PREFIX: &str = "Exception(";
const REPR_SUFFIX: &str = ")";

/// Immutable error value keyed by its code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExceptionValue {
    code: ErrorCode,
}

impl ExceptionValue {
    /// Wrap any code. Never fails.
    #[inline]
    pub fn new(code: impl Into<ErrorCode>) -> Self {
        Self { code: code.into() }
    }

    /// Wrap a code in const context.
    #[inline]
    pub const fn from_code(code: ErrorCode) -> Self {
        Self { code }
    }

    /// The wrapped code.
    #[inline]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Alias for [`code`](Self::code).
    #[inline]
    pub const fn error_code(&self) -> ErrorCode {
        self.code
    }

    /// Owning class, derived from `registry`.
    #[inline]
    pub fn error_class(&self, registry: &ErrorRegistry) -> ErrorCode {
        registry.classify(self.code)
    }

    /// Description, derived from `registry`.
    #[inline]
    pub fn error_string<'r>(&self, registry: &'r ErrorRegistry) -> &'r str {
        registry.get_string(self.code)
    }

    /// Display view rendering the description.
    #[inline]
    pub fn describe<'r>(&self, registry: &'r ErrorRegistry) -> Described<'r> {
        Described {
            code: self.code,
            registry,
        }
    }

    /// Whether this value denotes an error (any code but `SUCCESS`).
    #[inline]
    pub fn is_error(&self) -> bool {
        self.code != SUCCESS
    }
}

impl fmt::Debug for ExceptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", REPR_PREFIX, self.code, REPR_SUFFIX)
    }
}

impl From<ErrorCode> for ExceptionValue {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}

impl From<i32> for ExceptionValue {
    fn from(code: i32) -> Self {
        Self::new(code)
    }
}

impl From<ExceptionValue> for ErrorCode {
    fn from(value: ExceptionValue) -> Self {
        value.code
    }
}

impl From<ExceptionValue> for i32 {
    fn from(value: ExceptionValue) -> Self {
        value.code.value()
    }
}

impl From<ExceptionValue> for bool {
    fn from(value: ExceptionValue) -> Self {
        value.is_error()
    }
}

impl Borrow<i32> for ExceptionValue {
    fn borrow(&self) -> &i32 {
        self.code.as_raw()
    }
}

// ============================================================================
// Comparisons With Bare Codes
// ============================================================================

impl PartialEq<i32> for ExceptionValue {
    fn eq(&self, other: &i32) -> bool {
        self.code.value() == *other
    }
}

impl PartialEq<ExceptionValue> for i32 {
    fn eq(&self, other: &ExceptionValue) -> bool {
        *self == other.code.value()
    }
}

impl PartialEq<ErrorCode> for ExceptionValue {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.code == *other
    }
}

impl PartialEq<ExceptionValue> for ErrorCode {
    fn eq(&self, other: &ExceptionValue) -> bool {
        *self == other.code
    }
}

impl PartialOrd<i32> for ExceptionValue {
    fn partial_cmp(&self, other: &i32) -> Option<Ordering> {
        self.code.value().partial_cmp(other)
    }
}

impl PartialOrd<ExceptionValue> for i32 {
    fn partial_cmp(&self, other: &ExceptionValue) -> Option<Ordering> {
        self.partial_cmp(&other.code.value())
    }
}

impl PartialOrd<ErrorCode> for ExceptionValue {
    fn partial_cmp(&self, other: &ErrorCode) -> Option<Ordering> {
        self.code.partial_cmp(other)
    }
}

impl PartialOrd<ExceptionValue> for ErrorCode {
    fn partial_cmp(&self, other: &ExceptionValue) -> Option<Ordering> {
        self.partial_cmp(&other.code)
    }
}

// ============================================================================
// Canonical Representation
// ============================================================================

/// Failure to parse `Exception(<code>)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseExceptionError {
    /// Input is not of the form `Exception(...)`.
    Malformed,
    /// The code between the parentheses is not an `i32`.
    InvalidCode(ParseIntError),
}

impl fmt::Display for ParseExceptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("expected Exception(<code>)"),
            Self::InvalidCode(e) => write!(f, "invalid error code: {}", e),
        }
    }
}

impl std::error::Error for ParseExceptionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed => None,
            Self::InvalidCode(e) => Some(e),
        }
    }
}

impl FromStr for ExceptionValue {
    type Err = ParseExceptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix(REPR_PREFIX)
            .and_then(|rest| rest.strip_suffix(REPR_SUFFIX))
            .ok_or(ParseExceptionError::Malformed)?;

        inner
            .trim()
            .parse::<i32>()
            .map(|raw| Self::from_code(ErrorCode::new(raw)))
            .map_err(ParseExceptionError::InvalidCode)
    }
}

// ============================================================================
// Display View
// ============================================================================

/// Borrowed view of an exception value that displays its description.
///
/// Cannot outlive the registry it was derived from.
#[derive(Clone, Copy)]
pub struct Described<'r> {
    code: ErrorCode,
    registry: &'r ErrorRegistry,
}

impl<'r> Described<'r> {
    /// The described code.
    #[inline]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Owning class.
    #[inline]
    pub fn class(&self) -> ErrorCode {
        self.registry.classify(self.code)
    }

    /// The description itself.
    #[inline]
    pub fn as_str(&self) -> &'r str {
        self.registry.get_string(self.code)
    }
}

impl fmt::Display for Described<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Described<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Described")
            .field("code", &self.code)
            .field("description", &self.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InProcessRuntime;
    use crate::definitions::{ERR_LASTCODE, ERR_UNKNOWN};
    use std::collections::hash_map::DefaultHasher;
    use std::collections::{BTreeSet, HashSet};
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn builtin_derivations_match_registry() {
        let registry = ErrorRegistry::new(InProcessRuntime::new());
        for class in registry.builtin_classes() {
            let e = ExceptionValue::new(class.code());

            assert_eq!(e.error_code(), class.code());
            assert_eq!(e.error_class(&registry), registry.classify(class.code()));
            assert_eq!(e.error_string(&registry), registry.get_string(class.code()));
            assert_eq!(e.describe(&registry).to_string(), e.error_string(&registry));
            assert_eq!(i32::from(e), class.code().value());
        }
    }

    #[test]
    fn hash_matches_raw_code() {
        for raw in [-1, 0, 13, 58, 59, i32::MAX] {
            assert_eq!(hash_of(&ExceptionValue::new(raw)), hash_of(&raw));
        }
    }

    #[test]
    fn truthiness() {
        let success = ExceptionValue::new(SUCCESS);
        assert!(!bool::from(success));
        assert_eq!(success, 0);
        assert_eq!(0, success);

        assert!(bool::from(ExceptionValue::new(ERR_LASTCODE)));
        assert!(ExceptionValue::new(-1).is_error());
    }

    #[test]
    fn ordering_against_bare_codes() {
        let low = ExceptionValue::new(SUCCESS);
        let high = ExceptionValue::new(ERR_LASTCODE);
        let arg = ExceptionValue::new(13);

        assert!(low <= arg && arg < high);
        assert!(0 <= arg && arg < 58);
        assert!(low <= 13 && 13 < high);
        assert!(ExceptionValue::new(-1) < ExceptionValue::new(0));
    }

    #[test]
    fn ordering_against_error_codes_both_ways() {
        let low = ExceptionValue::new(SUCCESS);
        let high = ExceptionValue::new(ERR_LASTCODE);
        let code = ErrorCode::new(13);
        let e = ExceptionValue::new(code);

        assert!(low <= code && code < high);
        assert!(SUCCESS <= e && e < ERR_LASTCODE);
        assert!(code == e && e == code);
        assert!(ERR_LASTCODE != e);
        assert!(ERR_LASTCODE > e && e < ERR_LASTCODE);
    }

    #[test]
    fn out_of_range_codes_degrade_on_derivation() {
        let registry = ErrorRegistry::new(InProcessRuntime::new());
        for raw in [-1, ERR_LASTCODE.value() + 1] {
            let e = ExceptionValue::new(raw);
            assert!(bool::from(e));
            assert_eq!(e.error_class(&registry), ERR_UNKNOWN);
            assert_eq!(e.describe(&registry).to_string(), "");
        }
    }

    #[test]
    fn usable_as_set_key() {
        let hashed: HashSet<ExceptionValue> = [1, 2, 3].into_iter().map(ExceptionValue::new).collect();
        assert!(hashed.contains(&2_i32));
        assert!(hashed.contains(&ExceptionValue::new(3)));
        assert!(!hashed.contains(&4_i32));

        let ordered: BTreeSet<ExceptionValue> = [5, -5, 0].into_iter().map(ExceptionValue::new).collect();
        assert!(ordered.contains(&-5_i32));
        assert_eq!(ordered.iter().next(), Some(&ExceptionValue::new(-5)));
    }

    #[test]
    fn repr_round_trip() {
        for raw in [-1, 0, 13, 4096] {
            let e = ExceptionValue::new(raw);
            let repr = format!("{:?}", e);
            assert_eq!(repr, format!("Exception({})", raw));
            assert_eq!(repr.parse::<ExceptionValue>(), Ok(e));
        }
    }

    #[test]
    fn malformed_repr_is_rejected() {
        assert_eq!("13".parse::<ExceptionValue>(), Err(ParseExceptionError::Malformed));
        assert_eq!("Exception(13".parse::<ExceptionValue>(), Err(ParseExceptionError::Malformed));
        assert!(matches!(
            "Exception(abc)".parse::<ExceptionValue>(),
            Err(ParseExceptionError::InvalidCode(_))
        ));
        assert!(matches!(
            "Exception(99999999999)".parse::<ExceptionValue>(),
            Err(ParseExceptionError::InvalidCode(_))
        ));
    }

    #[test]
    fn described_view_follows_registry_updates() {
        let mut registry = ErrorRegistry::new(InProcessRuntime::new());
        let class = registry.allocate_class().unwrap();
        let e = ExceptionValue::new(class);

        assert_eq!(e.describe(&registry).as_str(), "");
        registry.set_string(class, "late description").unwrap();
        assert_eq!(e.describe(&registry).to_string(), "late description");
        assert_eq!(e.describe(&registry).class(), class);
    }
}
