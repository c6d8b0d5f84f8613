//! Ring buffer journal of registry mutations.
//!
//! Every successful class allocation, code allocation and description write is
//! recorded here. The journal has a fixed capacity with FIFO eviction, so a
//! long-running process that keeps registering codes never grows it.
//!
//! # Design Principles
//!
//! - **Bounded memory**: fixed maximum size regardless of registration volume
//! - **FIFO eviction**: oldest entries dropped first
//! - **Per-entry size caps**: descriptions are sanitized and truncated
//! - **RwLock-based**: concurrent readers, exclusive writers
//!
//! # Example
//!
//! ```rust
//! use errclass::{EventKind, ErrorRegistry, InProcessRuntime};
//!
//! let mut registry = ErrorRegistry::new(InProcessRuntime::new());
//! let class = registry.allocate_class().unwrap();
//! registry.set_string(class, "error class").unwrap();
//!
//! let recent = registry.journal().get_recent(2);
//! assert_eq!(recent[0].kind, EventKind::DescriptionSet);
//! assert_eq!(recent[1].kind, EventKind::ClassAllocated);
//! ```

use crate::{ErrorCode, EventKind, RegistryLog, sanitized};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single journaled mutation.
///
/// Descriptions are `Arc<str>` so handing out entries is a refcount bump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEntry {
    /// Position in the journal since creation, starting at 0.
    pub sequence: u64,
    /// Unix timestamp (seconds) of the mutation
    pub timestamp: u64,
    /// What happened
    pub kind: EventKind,
    /// Code that was allocated or described
    pub code: ErrorCode,
    /// Class owning `code`
    pub class: ErrorCode,
    /// Registry frontier after the mutation
    pub frontier: ErrorCode,
    /// Sanitized, truncated description for `DescriptionSet`
    pub description: Option<Arc<str>>,
}

/// Fixed-size ring buffer with exact allocation (no growth).
#[derive(Debug)]
struct RingBuffer {
    entries: Box<[Option<JournalEntry>]>,
    tail: usize,
    head: usize,
    len: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: std::iter::repeat_with(|| None)
                .take(capacity)
                .collect::<Box<[Option<JournalEntry>]>>(),
            tail: 0,
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, entry: JournalEntry) -> Option<JournalEntry> {
        let evicted = self.entries[self.tail].replace(entry);
        self.tail = (self.tail + 1) % self.entries.len();

        if self.len < self.entries.len() {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % self.entries.len();
        }

        evicted
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn iter(&self) -> impl DoubleEndedIterator<Item = &JournalEntry> {
        let head = self.head;
        let cap = self.entries.len();

        (0..self.len).filter_map(move |i| self.entries[(head + i) % cap].as_ref())
    }

    fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

/// Bounded journal of registry mutations.
///
/// Cloning shares the underlying buffer and counters.
#[derive(Debug, Clone)]
pub struct AllocationJournal {
    buffer: Arc<RwLock<RingBuffer>>,
    max_entries: usize,
    max_entry_bytes: usize,
    eviction_count: Arc<AtomicU64>,
    sequence: Arc<AtomicU64>,
}

impl AllocationJournal {
    /// Create a journal.
    ///
    /// * `max_entries` - entries kept before FIFO eviction (at least 1)
    /// * `max_entry_bytes` - cap on the journaled description of one entry
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        let bounded_entries = max_entries.max(1);
        Self {
            buffer: Arc::new(RwLock::new(RingBuffer::new(bounded_entries))),
            max_entries: bounded_entries,
            max_entry_bytes,
            eviction_count: Arc::new(AtomicU64::new(0)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn read_buffer(&self) -> RwLockReadGuard<'_, RingBuffer> {
        match self.buffer.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_buffer(&self) -> RwLockWriteGuard<'_, RingBuffer> {
        match self.buffer.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record a mutation, evicting the oldest entry if the journal is full.
    pub fn log(&self, log: &RegistryLog<'_>) {
        let entry = self.create_entry(log);

        let mut buffer = self.write_buffer();
        if buffer.push(entry).is_some() {
            self.eviction_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn create_entry(&self, log: &RegistryLog<'_>) -> JournalEntry {
        let description = log.description().map(|d| {
            let clean = sanitized!(d);
            let bounded = truncate_to_bytes(&clean, self.max_entry_bytes);
            Arc::<str>::from(bounded.as_ref())
        });

        JournalEntry {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
            kind: log.kind(),
            code: log.code(),
            class: log.class(),
            frontier: log.frontier(),
            description,
        }
    }

    /// The `count` most recent entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<JournalEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().take(count).cloned().collect()
    }

    /// All entries, newest first.
    pub fn get_all(&self) -> Vec<JournalEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().cloned().collect()
    }

    /// Entries matching a predicate, oldest first.
    ///
    /// ```rust
    /// # use errclass::{ErrorRegistry, EventKind, InProcessRuntime};
    /// # let mut registry = ErrorRegistry::new(InProcessRuntime::new());
    /// # let class = registry.allocate_class().unwrap();
    /// # registry.allocate_code(class).unwrap();
    /// let codes = registry
    ///     .journal()
    ///     .get_filtered(|entry| entry.kind == EventKind::CodeAllocated && entry.class == class);
    /// assert_eq!(codes.len(), 1);
    /// ```
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<JournalEntry>
    where
        F: Fn(&JournalEntry) -> bool,
    {
        let buffer = self.read_buffer();
        buffer.iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.read_buffer().len()
    }

    /// Whether the journal is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries evicted since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Relaxed)
    }

    /// Drop all entries. Sequence numbers keep counting.
    pub fn clear(&self) {
        self.write_buffer().clear();
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Whether the journal is at capacity.
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_entries
    }
}

/// Truncate string to maximum byte length, respecting UTF-8 boundaries.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }

    let indicator = "...[TRUNC]";
    if max_bytes <= indicator.len() {
        return Cow::Borrowed(&indicator[..max_bytes]);
    }

    let mut idx = max_bytes - indicator.len();
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    let mut out = String::with_capacity(idx + indicator.len());
    out.push_str(&s[..idx]);
    out.push_str(indicator);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation(code: i32) -> RegistryLog<'static> {
        RegistryLog {
            kind: EventKind::CodeAllocated,
            code: ErrorCode::new(code),
            class: ErrorCode::new(59),
            frontier: ErrorCode::new(code + 1),
            description: None,
        }
    }

    #[test]
    fn entry_mirrors_logged_record() {
        let journal = AllocationJournal::new(2, 128);
        journal.log(&allocation(60));

        let JournalEntry {
            sequence,
            timestamp: _,
            kind,
            code,
            class,
            frontier,
            description,
        } = journal.get_recent(1).remove(0);
        assert_eq!(sequence, 0);
        assert_eq!(kind, EventKind::CodeAllocated);
        assert_eq!(code, 60);
        assert_eq!(class, 59);
        assert_eq!(frontier, 61);
        assert!(description.is_none());
    }

    #[test]
    fn journal_evicts_oldest() {
        let journal = AllocationJournal::new(3, 128);
        for code in 60..65 {
            journal.log(&allocation(code));
        }

        assert_eq!(journal.len(), 3);
        assert_eq!(journal.eviction_count(), 2);

        let entries = journal.get_all();
        assert_eq!(entries[0].code, 64);
        assert_eq!(entries[2].code, 62);
        assert_eq!(entries[0].sequence, 4);
    }

    #[test]
    fn description_is_sanitized_and_bounded() {
        let journal = AllocationJournal::new(4, 32);
        let long = format!("line\nbreak {}", "A".repeat(200));
        journal.log(&RegistryLog {
            kind: EventKind::DescriptionSet,
            description: Some(&long),
            ..allocation(60)
        });

        let entry = &journal.get_recent(1)[0];
        let description = entry.description.as_deref().unwrap();
        assert!(description.starts_with("line?break"));
        assert!(description.len() <= 32);
        assert!(description.ends_with("[TRUNC]"));
    }

    #[test]
    fn filtering_by_class() {
        let journal = AllocationJournal::new(16, 128);
        for code in 60..70 {
            let mut log = allocation(code);
            if code % 2 == 0 {
                log.class = ErrorCode::new(13);
            }
            journal.log(&log);
        }

        let under_arg = journal.get_filtered(|e| e.class == 13);
        assert_eq!(under_arg.len(), 5);
        assert!(under_arg.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    #[test]
    fn clone_shares_state() {
        let journal = AllocationJournal::new(8, 128);
        let other = journal.clone();

        journal.log(&allocation(60));

        assert_eq!(other.len(), 1);
        other.clear();
        assert!(journal.is_empty());
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let journal = AllocationJournal::new(0, 128);
        journal.log(&allocation(60));
        journal.log(&allocation(61));

        assert_eq!(journal.capacity(), 1);
        assert!(journal.is_full());
        assert_eq!(journal.get_recent(5)[0].code, 61);
    }

    #[test]
    fn truncate_respects_utf8() {
        let emoji = "🔥".repeat(100);
        let truncated = truncate_to_bytes(&emoji, 50);

        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
        assert!(truncated.len() <= 50);
    }

    #[test]
    fn concurrent_logging() {
        use std::thread;

        let journal = AllocationJournal::new(64, 128);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let journal = journal.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        journal.log(&allocation(100 + t * 50 + i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(journal.len(), 64);
        assert_eq!(journal.eviction_count(), 200 - 64);
    }
}
