//! Error class registry - the code/class bookkeeping over the native layer.
//!
//! # Model
//!
//! - **Built-in classes** are fixed when the registry is constructed. For every
//!   built-in class `c`: `SUCCESS <= c < last_code()` and `classify(c) == c`.
//! - **Frontier**: the next value to hand out. Starts just above
//!   `last_code()` and only moves up.
//! - **Ownership**: every dynamically allocated code is owned by exactly one
//!   class; dynamically allocated classes own themselves.
//!
//! Reads (`classify`, `get_string`, `frontier`) never fail. Only allocation
//! and description writes can fail, and they fail synchronously.
//!
//! # Capability
//!
//! Whether the runtime supports dynamic classes is resolved once, at
//! construction, into a [`Capability`]. Allocation on an `Unsupported`
//! registry returns [`RegistryError::CapabilityUnavailable`] without calling
//! into the runtime. Callers treat that as "feature absent", not as a fault:
//!
//! ```rust
//! use errclass::{ErrorRegistry, InProcessRuntime};
//!
//! let mut registry = ErrorRegistry::new(InProcessRuntime::without_dynamic_classes());
//! match registry.allocate_class() {
//!     Ok(class) => println!("registered {}", class),
//!     Err(e) if e.is_unsupported() => { /* skip, feature absent */ }
//!     Err(e) => panic!("runtime fault: {}", e),
//! }
//! ```
//!
//! # Sharing
//!
//! The registry is process-wide state. `ErrorRegistry` takes `&mut self` for
//! every write; [`SharedRegistry`] wraps it in `Arc<RwLock<_>>` for use from
//! several handles and threads, each write being one step under the lock.

use crate::definitions::{ERR_UNKNOWN, SUCCESS};
use crate::{
    AllocationJournal, BuiltinClass, ErrorCode, ErrorStringTable, EventKind, NativeErrorModel,
    NativeFault, RegistryError, RegistryLog, Result,
};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Log sink invoked with every mutation record.
type LogSink = Arc<dyn Fn(&RegistryLog<'_>) + Send + Sync>;

/// A sink call held back until the registry lock is released.
struct PendingLog {
    sink: LogSink,
    kind: EventKind,
    code: ErrorCode,
    class: ErrorCode,
    frontier: ErrorCode,
    description: Option<Cow<'static, str>>,
}

impl PendingLog {
    fn dispatch(self) {
        let log = RegistryLog {
            kind: self.kind,
            code: self.code,
            class: self.class,
            frontier: self.frontier,
            description: self.description.as_deref(),
        };
        (self.sink)(&log);
    }
}

fn dispatch(pending: Option<PendingLog>) {
    if let Some(pending) = pending {
        pending.dispatch();
    }
}

// ============================================================================
// Capability & Configuration
// ============================================================================

/// Whether the runtime supports dynamic error class registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `allocate_class` / `allocate_code` are forwarded to the runtime.
    Supported,
    /// Allocation reports `CapabilityUnavailable`.
    Unsupported,
}

impl Capability {
    fn detect(native: &dyn NativeErrorModel) -> Self {
        if native.supports_dynamic_classes() {
            Self::Supported
        } else {
            Self::Unsupported
        }
    }

    /// Whether dynamic registration is available.
    #[inline]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Supported)
    }
}

/// Registry construction options.
///
/// ```rust
/// # use errclass::{ErrorRegistry, InProcessRuntime, RegistryConfig};
/// let config = RegistryConfig::default()
///     .with_journal_capacity(16)
///     .with_journal_entry_bytes(128);
/// let registry = ErrorRegistry::with_config(InProcessRuntime::new(), config);
/// assert_eq!(registry.journal().capacity(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Entries kept by the allocation journal (at least 1).
    pub journal_capacity: usize,
    /// Byte cap on the journaled description of one entry.
    pub journal_entry_bytes: usize,
}

impl RegistryConfig {
    /// Default journal capacity.
    pub const DEFAULT_JOURNAL_CAPACITY: usize = 256;
    /// Default per-entry byte cap.
    pub const DEFAULT_JOURNAL_ENTRY_BYTES: usize = 512;

    /// Set the journal capacity.
    #[must_use]
    pub const fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal_capacity = capacity;
        self
    }

    /// Set the per-entry byte cap.
    #[must_use]
    pub const fn with_journal_entry_bytes(mut self, bytes: usize) -> Self {
        self.journal_entry_bytes = bytes;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            journal_capacity: Self::DEFAULT_JOURNAL_CAPACITY,
            journal_entry_bytes: Self::DEFAULT_JOURNAL_ENTRY_BYTES,
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Error class registry over a native error facility.
pub struct ErrorRegistry {
    native: Box<dyn NativeErrorModel>,
    capability: Capability,
    last_code: ErrorCode,
    last_used: ErrorCode,
    owners: HashMap<ErrorCode, ErrorCode>,
    members: HashMap<ErrorCode, SmallVec<[ErrorCode; 4]>>,
    strings: ErrorStringTable,
    journal: AllocationJournal,
    sink: Option<LogSink>,
}

impl ErrorRegistry {
    /// Registry with default configuration.
    pub fn new(native: impl NativeErrorModel + 'static) -> Self {
        Self::with_config(native, RegistryConfig::default())
    }

    /// Registry with explicit configuration.
    pub fn with_config(native: impl NativeErrorModel + 'static, config: RegistryConfig) -> Self {
        let capability = Capability::detect(&native);
        let last_code = native.last_code();
        Self {
            native: Box::new(native),
            capability,
            last_code,
            last_used: last_code,
            owners: HashMap::new(),
            members: HashMap::new(),
            strings: ErrorStringTable::new(),
            journal: AllocationJournal::new(config.journal_capacity, config.journal_entry_bytes),
            sink: None,
        }
    }

    /// Install a sink receiving every mutation record after the journal.
    ///
    /// Writes made through [`SharedRegistry`] call the sink after the write
    /// lock is released, so the sink may read the registry through another
    /// handle. A write made on a guard from [`SharedRegistry::write`] still
    /// holds the lock while the sink runs.
    pub fn set_log_sink<F>(&mut self, sink: F)
    where
        F: Fn(&RegistryLog<'_>) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Class owning `code`.
    ///
    /// A class returns itself. Codes nobody recognizes, including negative
    /// ones, classify to `ERR_UNKNOWN`. Above the built-in range only
    /// allocations this registry accepted count; a value the runtime handed
    /// out but the registry rejected as stale is unknown.
    pub fn classify(&self, code: ErrorCode) -> ErrorCode {
        if let Some(&class) = self.owners.get(&code) {
            return class;
        }
        if code >= self.last_code {
            return ERR_UNKNOWN;
        }
        self.native.classify(code).unwrap_or(ERR_UNKNOWN)
    }

    /// Description of `code`, or `""`.
    ///
    /// Descriptions set through this registry win over the runtime's own.
    pub fn get_string(&self, code: ErrorCode) -> &str {
        self.strings
            .lookup(code)
            .or_else(|| self.native.describe(code))
            .unwrap_or("")
    }

    /// Next value to be allocated.
    #[inline]
    pub fn frontier(&self) -> ErrorCode {
        ErrorCode::new(self.last_used.value().saturating_add(1))
    }

    /// Most recently allocated class or code; `last_code()` before any allocation.
    #[inline]
    pub fn last_used_code(&self) -> ErrorCode {
        self.last_used
    }

    /// Exclusive upper bound on the built-in classes.
    #[inline]
    pub fn last_code(&self) -> ErrorCode {
        self.last_code
    }

    /// Capability resolved at construction.
    #[inline]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// The built-in class set, `SUCCESS` first.
    pub fn builtin_classes(&self) -> &'static [BuiltinClass] {
        self.native.builtin_classes()
    }

    /// Whether `code` is a built-in class.
    pub fn is_builtin_class(&self, code: ErrorCode) -> bool {
        code >= SUCCESS && code < self.last_code && self.native.classify(code) == Some(code)
    }

    /// Whether `code` is a built-in or dynamically allocated class.
    pub fn is_class(&self, code: ErrorCode) -> bool {
        self.owners.get(&code) == Some(&code) || self.is_builtin_class(code)
    }

    /// Codes allocated under `class`, in allocation order.
    pub fn codes_of(&self, class: ErrorCode) -> &[ErrorCode] {
        self.members.get(&class).map(|codes| codes.as_slice()).unwrap_or(&[])
    }

    /// Dynamically allocated classes, ascending.
    pub fn dynamic_classes(&self) -> Vec<ErrorCode> {
        let mut classes: Vec<ErrorCode> = self
            .owners
            .iter()
            .filter(|(code, class)| code == class)
            .map(|(code, _)| *code)
            .collect();
        classes.sort_unstable();
        classes
    }

    /// Descriptions set through this registry.
    #[inline]
    pub fn strings(&self) -> &ErrorStringTable {
        &self.strings
    }

    /// Journal of mutations.
    #[inline]
    pub fn journal(&self) -> &AllocationJournal {
        &self.journal
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Allocate a fresh error class.
    ///
    /// # Errors
    ///
    /// - `CapabilityUnavailable` when the runtime lacks dynamic classes
    /// - `Native` when the runtime refuses or returns a reused value
    pub fn allocate_class(&mut self) -> Result<ErrorCode> {
        let (class, pending) = self.allocate_class_deferred()?;
        dispatch(pending);
        Ok(class)
    }

    fn allocate_class_deferred(&mut self) -> Result<(ErrorCode, Option<PendingLog>)> {
        self.require_dynamic()?;

        let class = self.native.allocate_class()?;
        self.accept_fresh(class)?;
        self.owners.insert(class, class);
        self.members.entry(class).or_default();

        Ok((class, self.record(EventKind::ClassAllocated, class, class, None)))
    }

    /// Allocate a fresh error code owned by `class`.
    ///
    /// `class` must be a built-in class other than `SUCCESS`, or a class
    /// previously returned by [`allocate_class`](Self::allocate_class).
    ///
    /// # Errors
    ///
    /// - `CapabilityUnavailable` when the runtime lacks dynamic classes
    /// - `InvalidErrorClass` when `class` is not registered
    /// - `Native` when the runtime refuses or returns a reused value
    pub fn allocate_code(&mut self, class: ErrorCode) -> Result<ErrorCode> {
        let (code, pending) = self.allocate_code_deferred(class)?;
        dispatch(pending);
        Ok(code)
    }

    fn allocate_code_deferred(&mut self, class: ErrorCode) -> Result<(ErrorCode, Option<PendingLog>)> {
        self.require_dynamic()?;
        if class == SUCCESS || !self.is_class(class) {
            return Err(RegistryError::InvalidErrorClass { class });
        }

        let code = self.native.allocate_code(class)?;
        self.accept_fresh(code)?;
        self.owners.insert(code, class);
        self.members.entry(class).or_default().push(code);

        Ok((code, self.record(EventKind::CodeAllocated, code, class, None)))
    }

    /// Attach a description to `code`, overwriting any previous one.
    ///
    /// No ownership check: any code may be described.
    ///
    /// # Errors
    ///
    /// `Native` when the runtime refuses the description.
    pub fn set_string(&mut self, code: ErrorCode, description: impl Into<Cow<'static, str>>) -> Result<()> {
        let pending = self.set_string_deferred(code, description.into())?;
        dispatch(pending);
        Ok(())
    }

    fn set_string_deferred(&mut self, code: ErrorCode, description: Cow<'static, str>) -> Result<Option<PendingLog>> {
        self.native.set_description(code, &description)?;

        let pending = self.record(EventKind::DescriptionSet, code, self.classify(code), Some(&description));
        self.strings.set(code, description);
        Ok(pending)
    }

    fn require_dynamic(&self) -> Result<()> {
        if self.capability.is_supported() {
            Ok(())
        } else {
            Err(RegistryError::CapabilityUnavailable)
        }
    }

    fn accept_fresh(&mut self, value: ErrorCode) -> Result<()> {
        if value <= self.last_used {
            return Err(NativeFault::StaleAllocation {
                value,
                frontier: self.frontier(),
            }
            .into());
        }
        self.last_used = value;
        Ok(())
    }

    /// Journal a mutation and prepare the sink call, if a sink is installed.
    fn record(
        &self,
        kind: EventKind,
        code: ErrorCode,
        class: ErrorCode,
        description: Option<&Cow<'static, str>>,
    ) -> Option<PendingLog> {
        let frontier = self.frontier();
        self.journal.log(&RegistryLog {
            kind,
            code,
            class,
            frontier,
            description: description.map(|d| d.as_ref()),
        });

        self.sink.as_ref().map(|sink| PendingLog {
            sink: Arc::clone(sink),
            kind,
            code,
            class,
            frontier,
            description: description.cloned(),
        })
    }
}

impl fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRegistry")
            .field("capability", &self.capability)
            .field("last_code", &self.last_code)
            .field("frontier", &self.frontier())
            .field("allocated", &self.owners.len())
            .field("strings", &self.strings.len())
            .field("sink", &self.sink.as_ref().map(|_| "<PRESENT>"))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Shared Registry
// ============================================================================

/// Process-wide handle to one registry.
///
/// Cloning shares the registry. Writes hold the write lock for the whole
/// allocation, so each one is a single atomic step to every reader. A
/// poisoned lock is recovered: the registry never half-applies a write.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<ErrorRegistry>>,
}

impl SharedRegistry {
    /// Share `registry`.
    pub fn new(registry: ErrorRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Read access for derivations that borrow from the registry.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, ErrorRegistry> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Exclusive access.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, ErrorRegistry> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// See [`ErrorRegistry::classify`].
    pub fn classify(&self, code: ErrorCode) -> ErrorCode {
        self.read().classify(code)
    }

    /// See [`ErrorRegistry::get_string`]. Returns an owned copy.
    pub fn get_string(&self, code: ErrorCode) -> String {
        self.read().get_string(code).to_owned()
    }

    /// See [`ErrorRegistry::frontier`].
    pub fn frontier(&self) -> ErrorCode {
        self.read().frontier()
    }

    /// See [`ErrorRegistry::last_used_code`].
    pub fn last_used_code(&self) -> ErrorCode {
        self.read().last_used_code()
    }

    /// See [`ErrorRegistry::capability`].
    pub fn capability(&self) -> Capability {
        self.read().capability()
    }

    // The log sink runs after the write guard is dropped.

    /// See [`ErrorRegistry::allocate_class`].
    pub fn allocate_class(&self) -> Result<ErrorCode> {
        let (class, pending) = self.write().allocate_class_deferred()?;
        dispatch(pending);
        Ok(class)
    }

    /// See [`ErrorRegistry::allocate_code`].
    pub fn allocate_code(&self, class: ErrorCode) -> Result<ErrorCode> {
        let (code, pending) = self.write().allocate_code_deferred(class)?;
        dispatch(pending);
        Ok(code)
    }

    /// See [`ErrorRegistry::set_string`].
    pub fn set_string(&self, code: ErrorCode, description: impl Into<Cow<'static, str>>) -> Result<()> {
        let pending = self.write().set_string_deferred(code, description.into())?;
        dispatch(pending);
        Ok(())
    }
}

impl From<ErrorRegistry> for SharedRegistry {
    fn from(registry: ErrorRegistry) -> Self {
        Self::new(registry)
    }
}

impl fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegistry")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}
