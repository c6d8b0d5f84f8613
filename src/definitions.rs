//! Built-in error classes of the runtime.
//!
//! # Taxonomy
//!
//! The built-in set is contiguous: `SUCCESS` (0) is the least code and every
//! built-in class lies strictly below [`ERR_LASTCODE`]. Dynamically allocated
//! classes and codes start just above `ERR_LASTCODE`.
//!
//! `ERR_LASTCODE` is a sentinel, not a class. It is deliberately absent from
//! [`BUILTIN_CLASSES`].
//!
//! # Governance
//!
//! Contiguity and ordering of the table are enforced by the `tests` module at
//! the bottom of this file. Adding a class means appending it with the next
//! number and bumping `ERR_LASTCODE`.

use crate::{BuiltinClass, ErrorCode, define_error_classes};

/// Exclusive upper bound on all built-in classes.
pub const ERR_LASTCODE: ErrorCode = ErrorCode::new(58);

/// Longest description (in bytes) the runtime accepts for a dynamic code.
pub const MAX_ERROR_STRING: usize = 256;

// -----------------------------------------------------------------------------
// 0-19: point-to-point, collective and argument classes
// 20-57: I/O, info, naming and one-sided classes
// -----------------------------------------------------------------------------
define_error_classes! {
    BUILTIN_CLASSES => {
        SUCCESS                   = (0, "No errors"),
        ERR_BUFFER                = (1, "Invalid buffer pointer"),
        ERR_COUNT                 = (2, "Invalid count argument"),
        ERR_TYPE                  = (3, "Invalid datatype argument"),
        ERR_TAG                   = (4, "Invalid tag argument"),
        ERR_COMM                  = (5, "Invalid communicator"),
        ERR_RANK                  = (6, "Invalid rank"),
        ERR_REQUEST               = (7, "Invalid request (handle)"),
        ERR_ROOT                  = (8, "Invalid root"),
        ERR_GROUP                 = (9, "Invalid group"),
        ERR_OP                    = (10, "Invalid reduce operation"),
        ERR_TOPOLOGY              = (11, "Invalid topology"),
        ERR_DIMS                  = (12, "Invalid dimension argument"),
        ERR_ARG                   = (13, "Invalid argument of some other kind"),
        ERR_UNKNOWN               = (14, "Unknown error"),
        ERR_TRUNCATE              = (15, "Message truncated on receive"),
        ERR_OTHER                 = (16, "Known error not in this list"),
        ERR_INTERN                = (17, "Internal error"),
        ERR_IN_STATUS             = (18, "Error code is in status"),
        ERR_PENDING               = (19, "Pending request"),
        ERR_ACCESS                = (20, "Permission denied"),
        ERR_AMODE                 = (21, "Error related to the amode passed to file open"),
        ERR_ASSERT                = (22, "Invalid assert argument"),
        ERR_BAD_FILE              = (23, "Invalid file name"),
        ERR_BASE                  = (24, "Invalid base passed to memory free"),
        ERR_CONVERSION            = (25, "Error in user data conversion function"),
        ERR_DISP                  = (26, "Invalid displacement argument"),
        ERR_DUP_DATAREP           = (27, "Data representation identifier already registered"),
        ERR_FILE_EXISTS           = (28, "File exists"),
        ERR_FILE_IN_USE           = (29, "File operation could not be completed, file in use"),
        ERR_FILE                  = (30, "Invalid file handle"),
        ERR_INFO_KEY              = (31, "Key longer than the maximum info key length"),
        ERR_INFO_NOKEY            = (32, "Invalid key passed to info delete"),
        ERR_INFO_VALUE            = (33, "Value longer than the maximum info value length"),
        ERR_INFO                  = (34, "Invalid info argument"),
        ERR_IO                    = (35, "Other I/O error"),
        ERR_KEYVAL                = (36, "Invalid keyval"),
        ERR_LOCKTYPE              = (37, "Invalid lock type"),
        ERR_NAME                  = (38, "Invalid service name passed to name lookup"),
        ERR_NO_MEM                = (39, "Memory exhausted"),
        ERR_NOT_SAME              = (40, "Collective argument not identical on all processes"),
        ERR_NO_SPACE              = (41, "Not enough space"),
        ERR_NO_SUCH_FILE          = (42, "File does not exist"),
        ERR_PORT                  = (43, "Invalid port name"),
        ERR_QUOTA                 = (44, "Quota exceeded"),
        ERR_READ_ONLY             = (45, "Read-only file or file system"),
        ERR_RMA_CONFLICT          = (46, "Conflicting accesses to window"),
        ERR_RMA_SYNC              = (47, "Wrong synchronization of one-sided calls"),
        ERR_SERVICE               = (48, "Invalid service name passed to unpublish"),
        ERR_SIZE                  = (49, "Invalid size argument"),
        ERR_SPAWN                 = (50, "Error spawning processes"),
        ERR_UNSUPPORTED_DATAREP   = (51, "Unsupported data representation"),
        ERR_UNSUPPORTED_OPERATION = (52, "Unsupported operation"),
        ERR_WIN                   = (53, "Invalid window"),
        ERR_RMA_RANGE             = (54, "Target memory is not part of the window"),
        ERR_RMA_ATTACH            = (55, "Memory cannot be attached"),
        ERR_RMA_SHARED            = (56, "Memory cannot be shared"),
        ERR_RMA_FLAVOR            = (57, "Window has the wrong flavor for the called function"),
    }
}

/// Look up a built-in class by code.
///
/// The table is contiguous from `SUCCESS`, so this is an index, not a search.
#[inline]
pub fn builtin_class(code: ErrorCode) -> Option<&'static BuiltinClass> {
    usize::try_from(code.value())
        .ok()
        .and_then(|idx| BUILTIN_CLASSES.get(idx))
}

/// Look up a built-in class by symbolic name (`"ERR_ARG"`).
pub fn builtin_class_by_name(name: &str) -> Option<&'static BuiltinClass> {
    BUILTIN_CLASSES.iter().find(|class| class.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The table must stay contiguous and ordered so `builtin_class` can index it.
    #[test]
    fn enforce_contiguous_table() {
        for (idx, class) in BUILTIN_CLASSES.iter().enumerate() {
            assert_eq!(class.code().value() as usize, idx, "{} out of place", class.name());
        }
        assert_eq!(BUILTIN_CLASSES.len() as i32, ERR_LASTCODE.value());
    }

    #[test]
    fn enforce_sentinel_bounds() {
        assert_eq!(BUILTIN_CLASSES[0].code(), SUCCESS);
        assert_eq!(SUCCESS, 0);
        for class in BUILTIN_CLASSES {
            assert!(class.code() >= SUCCESS);
            assert!(class.code() < ERR_LASTCODE);
        }
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in BUILTIN_CLASSES.iter().enumerate() {
            for b in &BUILTIN_CLASSES[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(builtin_class(ERR_ARG).map(BuiltinClass::name), Some("ERR_ARG"));
        assert_eq!(builtin_class_by_name("ERR_UNKNOWN").map(BuiltinClass::code), Some(ERR_UNKNOWN));
        assert!(builtin_class(ERR_LASTCODE).is_none());
        assert!(builtin_class(ErrorCode::new(-1)).is_none());
        assert!(builtin_class_by_name("ERR_LASTCODE").is_none());
    }
}
