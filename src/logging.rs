//! Structured log record for registry mutations.
//!
//! # Properties
//!
//! - Borrows from the mutation that produced it with an explicit lifetime
//! - Consumed immediately by the journal or an external logger
//! - NO heap allocations in accessors or in `write_to`
//!
//! The registry builds one `RegistryLog` per successful write
//! (`allocate_class`, `allocate_code`, `set_string`) and hands it to the
//! [`AllocationJournal`](crate::AllocationJournal) and, when one is installed,
//! to the sink registered with `ErrorRegistry::set_log_sink`.

use crate::ErrorCode;
use std::borrow::Cow;
use std::fmt;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Kind of registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new error class was allocated.
    ClassAllocated,
    /// A new error code was allocated under an existing class.
    CodeAllocated,
    /// A description was attached to a code.
    DescriptionSet,
}

impl EventKind {
    /// Stable label for log output.
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ClassAllocated => "class_allocated",
            Self::CodeAllocated => "code_allocated",
            Self::DescriptionSet => "description_set",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured record of one registry mutation.
///
/// # Example
///
/// ```rust
/// # use errclass::{ErrorRegistry, InProcessRuntime};
/// use std::sync::{Arc, Mutex};
///
/// let lines = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&lines);
///
/// let mut registry = ErrorRegistry::new(InProcessRuntime::new());
/// registry.set_log_sink(move |log| {
///     let mut line = String::new();
///     if log.write_to(&mut line).is_ok() {
///         sink.lock().unwrap().push(line);
///     }
/// });
/// registry.allocate_class().unwrap();
///
/// assert!(lines.lock().unwrap()[0].starts_with("[class_allocated]"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RegistryLog<'a> {
    /// What happened.
    pub kind: EventKind,
    /// The code that was allocated or described.
    pub code: ErrorCode,
    /// Class owning `code` at the time of the event.
    pub class: ErrorCode,
    /// Registry frontier after the event.
    pub frontier: ErrorCode,
    /// Description, for `DescriptionSet` events.
    pub description: Option<&'a str>,
}

impl<'a> RegistryLog<'a> {
    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Only available with the `trusted_debug` feature in debug builds.
    /// Unlike `write_to`, the description is not truncated.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = format!(
            "[{}] code={} class={} frontier={}",
            self.kind, self.code, self.class, self.frontier
        );
        if let Some(description) = self.description {
            output.push_str(&format!(" description={:?}", description));
        }
        output
    }

    /// Write the record to a formatter.
    ///
    /// Long descriptions are truncated on a UTF-8 boundary; only that path
    /// allocates.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] code={} class={} frontier={}",
            self.kind, self.code, self.class, self.frontier
        )?;

        if let Some(description) = self.description {
            write!(f, " description='{}'", truncate_with_indicator(description))?;
        }

        Ok(())
    }

    /// Which mutation this record describes.
    #[inline]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Code that was allocated or described.
    #[inline]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Class owning the code.
    #[inline]
    pub const fn class(&self) -> ErrorCode {
        self.class
    }

    /// Registry frontier after the mutation.
    #[inline]
    pub const fn frontier(&self) -> ErrorCode {
        self.frontier
    }

    /// Description written by a `DescriptionSet`, `None` for allocations.
    #[inline]
    pub const fn description(&self) -> Option<&'a str> {
        self.description
    }
}

/// Truncate a string for display.
///
/// Returns a Cow<str> to avoid allocation when no truncation is needed.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let mut idx = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(description: Option<&str>) -> RegistryLog<'_> {
        RegistryLog {
            kind: EventKind::DescriptionSet,
            code: ErrorCode::new(60),
            class: ErrorCode::new(59),
            frontier: ErrorCode::new(61),
            description,
        }
    }

    #[test]
    fn write_to_renders_all_fields() {
        let mut out = String::new();
        record(Some("error code 1")).write_to(&mut out).unwrap();
        assert_eq!(
            out,
            "[description_set] code=60 class=59 frontier=61 description='error code 1'"
        );
    }

    #[test]
    fn accessors_expose_the_record() {
        let log = record(Some("error code 1"));
        assert_eq!(log.kind(), EventKind::DescriptionSet);
        assert_eq!(log.code(), 60);
        assert_eq!(log.class(), 59);
        assert_eq!(log.frontier(), 61);
        assert_eq!(log.description(), Some("error code 1"));
        assert_eq!(record(None).description(), None);
    }

    #[test]
    fn write_to_omits_missing_description() {
        let mut out = String::new();
        let mut log = record(None);
        log.kind = EventKind::CodeAllocated;
        log.write_to(&mut out).unwrap();
        assert_eq!(out, "[code_allocated] code=60 class=59 frontier=61");
    }

    #[test]
    fn truncate_ascii() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN + 10);
        let truncated = truncate_with_indicator(&s);

        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn exactly_at_limit() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);

        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert_eq!(truncated.len(), MAX_FIELD_OUTPUT_LEN);
    }

    #[test]
    fn truncate_utf8_boundary() {
        let s = "й".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);

        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    #[test]
    fn trusted_debug_keeps_full_description() {
        let long = "b".repeat(MAX_FIELD_OUTPUT_LEN * 2);
        let formatted = record(Some(&long)).format_for_trusted_debug();
        assert!(formatted.contains(&long));
    }
}
