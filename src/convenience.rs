//! Convenience macros for defining error classes and sanitizing text.
//!
//! # Definitions
//!
//! `define_error_class!` and `define_error_classes!` produce `ErrorCode`
//! const statics plus a `BuiltinClass` table in code order. The table is what
//! a runtime advertises as its built-in set.
//!
//! # Sanitization
//!
//! Descriptions registered at run time come from callers and may contain
//! anything. Before a description is copied into the allocation journal it is
//! passed through `sanitized!()`:
//!
//! - Control characters become `?`
//! - ANSI escape sequences collapse to a single `?`
//! - Output is bounded to [`MAX_SANITIZED_LEN`] bytes, cut on a UTF-8
//!   boundary and marked with `...[TRUNCATED]`
//!
//! The string table itself stores descriptions verbatim; sanitization only
//! applies to what is logged or rendered by `RaisedError`.
//!
//! ```rust
//! # use errclass::sanitized;
//! assert_eq!(sanitized!("bad\nline"), "bad?line");
//! assert_eq!(sanitized!(42), "42");
//! ```

/// Maximum length in bytes for sanitized strings.
pub const MAX_SANITIZED_LEN: usize = 256;

const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Sanitize untrusted text for inclusion in log output.
///
/// Empty input stays empty: an empty description is meaningful.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_SANITIZED_LEN));
    let mut chars = input.chars();
    let mut truncated = false;

    while let Some(c) = chars.next() {
        let replacement = if c == '\u{1b}' {
            // Swallow the sequence up to its final letter.
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            '?'
        } else if c.is_control() {
            '?'
        } else {
            c
        };

        if out.len() + replacement.len_utf8() > MAX_SANITIZED_LEN {
            truncated = true;
            break;
        }
        out.push(replacement);
    }

    if truncated {
        let mut cut = MAX_SANITIZED_LEN.saturating_sub(TRUNCATION_INDICATOR.len());
        while cut > 0 && !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str(TRUNCATION_INDICATOR);
    }

    out
}

/// Sanitize any `Display` value for log output.
///
/// # Example
///
/// ```rust
/// # use errclass::sanitized;
/// let long = "A".repeat(300);
/// let san = sanitized!(long);
/// assert!(san.len() <= 256);
/// assert!(san.ends_with("[TRUNCATED]"));
/// ```
#[macro_export]
macro_rules! sanitized {
    ($expr:expr) => {
        $crate::convenience::sanitize(&$expr.to_string())
    };
}

/// Define a single error class constant.
///
/// ```rust
/// # use errclass::{define_error_class, ErrorCode};
/// define_error_class!(ERR_VENDOR, 90);
/// assert_eq!(ERR_VENDOR, ErrorCode::new(90));
/// ```
#[macro_export]
macro_rules! define_error_class {
    ($name:ident, $code:expr) => {
        #[allow(missing_docs)]
        pub const $name: $crate::ErrorCode = $crate::ErrorCode::new($code);
    };
}

/// Define a table of built-in error classes.
///
/// Each entry becomes an `ErrorCode` constant documented with its description,
/// and the whole set is collected, in declaration order, into a static
/// `&[BuiltinClass]` under the given table name.
///
/// ```rust
/// mod vendor {
///     errclass::define_error_classes! {
///         VENDOR_CLASSES => {
///             OK = (0, "No errors"),
///             ERR_LINK = (1, "Link down"),
///         }
///     }
/// }
/// assert_eq!(vendor::VENDOR_CLASSES.len(), 2);
/// assert_eq!(vendor::VENDOR_CLASSES[1].name(), "ERR_LINK");
/// assert_eq!(vendor::ERR_LINK.value(), 1);
/// ```
#[macro_export]
macro_rules! define_error_classes {
    ($table:ident => { $( $name:ident = ($code:expr, $desc:literal) ),+ $(,)? }) => {
        $(
            #[doc = $desc]
            pub const $name: $crate::ErrorCode = $crate::ErrorCode::new($code);
        )+

        /// Built-in classes in code order.
        pub static $table: &[$crate::BuiltinClass] = &[
            $( $crate::BuiltinClass::__internal_new(stringify!($name), $name, $desc), )+
        ];
    };
}

// ============================================================================
// Tests
// ============================================================================
