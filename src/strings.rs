//! Error string table - code to human-readable description.
//!
//! Lookups never fail: a code that was never described resolves to `""`.
//! Writes are unconditional overwrites with no ownership check, so a specific
//! code may carry a description independent of its class's description.
//!
//! Descriptions are stored as `Cow<'static, str>`: the built-in table is
//! seeded with borrowed statics (no allocation) and only run-time
//! registrations own their text.

use crate::{BuiltinClass, ErrorCode};
use std::borrow::Cow;
use std::collections::HashMap;

/// Mapping from error code to description.
#[derive(Debug, Default, Clone)]
pub struct ErrorStringTable {
    entries: HashMap<ErrorCode, Cow<'static, str>>,
}

impl ErrorStringTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding the descriptions of a built-in class set.
    ///
    /// Zero-allocation for the strings themselves: every entry borrows.
    pub fn from_builtin(classes: &'static [BuiltinClass]) -> Self {
        let entries = classes
            .iter()
            .map(|class| (class.code(), Cow::Borrowed(class.description())))
            .collect();
        Self { entries }
    }

    /// Description of `code`, or `""` when none was ever set.
    #[inline]
    pub fn get(&self, code: ErrorCode) -> &str {
        self.lookup(code).unwrap_or("")
    }

    /// Description of `code` if one was set.
    ///
    /// Distinguishes "set to the empty string" from "never set".
    #[inline]
    pub fn lookup(&self, code: ErrorCode) -> Option<&str> {
        self.entries.get(&code).map(|s| s.as_ref())
    }

    /// Overwrite the description of `code`.
    pub fn set(&mut self, code: ErrorCode, description: impl Into<Cow<'static, str>>) {
        self.entries.insert(code, description.into());
    }

    /// Forget the description of `code`, returning it.
    pub fn remove(&mut self, code: ErrorCode) -> Option<Cow<'static, str>> {
        self.entries.remove(&code)
    }

    /// Whether `code` has a description.
    #[inline]
    pub fn contains(&self, code: ErrorCode) -> bool {
        self.entries.contains_key(&code)
    }

    /// Number of described codes.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no code is described.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;

    #[test]
    fn absent_entries_resolve_to_empty() {
        let table = ErrorStringTable::new();
        assert_eq!(table.get(ErrorCode::new(99)), "");
        assert_eq!(table.get(ErrorCode::new(-1)), "");
        assert!(table.lookup(ErrorCode::new(99)).is_none());
    }

    #[test]
    fn set_overwrites() {
        let mut table = ErrorStringTable::new();
        let code = ErrorCode::new(60);

        table.set(code, "first");
        table.set(code, String::from("second"));

        assert_eq!(table.get(code), "second");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn empty_description_is_distinct_from_absent() {
        let mut table = ErrorStringTable::new();
        let code = ErrorCode::new(61);
        table.set(code, "");

        assert!(table.contains(code));
        assert_eq!(table.lookup(code), Some(""));
    }

    #[test]
    fn builtin_seed_borrows() {
        let table = ErrorStringTable::from_builtin(definitions::BUILTIN_CLASSES);

        assert_eq!(table.len(), definitions::BUILTIN_CLASSES.len());
        assert_eq!(table.get(definitions::ERR_UNKNOWN), "Unknown error");
        assert!(matches!(
            table.entries.get(&definitions::SUCCESS),
            Some(Cow::Borrowed(_))
        ));
    }

    #[test]
    fn remove_returns_previous() {
        let mut table = ErrorStringTable::new();
        let code = ErrorCode::new(62);
        table.set(code, "gone soon");

        assert_eq!(table.remove(code).as_deref(), Some("gone soon"));
        assert!(table.is_empty());
    }
}
