//! Registry state exposed as read-only attributes of a communication handle.
//!
//! Message-passing runtimes publish the most recently allocated error code as
//! a predefined attribute of their world communicator. [`CommHandle`] is that
//! bridge: every `get_attr` is a pass-through read of the shared registry, so
//! all handles over one registry observe the same values.
//!
//! ```rust
//! use errclass::{Attribute, ErrorRegistry, InProcessRuntime, SharedRegistry};
//!
//! let shared = SharedRegistry::new(ErrorRegistry::new(InProcessRuntime::new()));
//! let world = shared.world();
//!
//! let class = shared.allocate_class().unwrap();
//! assert_eq!(world.get_attr(Attribute::LastUsedCode), class);
//! assert_eq!(world.get_attr_by_name("LASTUSEDCODE"), Some(class));
//! ```

use crate::{ErrorCode, SharedRegistry};
use std::borrow::Cow;
use std::fmt;

/// Read-only attribute backed by registry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Most recently allocated class or code.
    LastUsedCode,
    /// Next value the registry will allocate.
    Frontier,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 2] = [Attribute::LastUsedCode, Attribute::Frontier];

    /// Attribute key as published by the runtime.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LastUsedCode => "LASTUSEDCODE",
            Self::Frontier => "FRONTIER",
        }
    }

    /// Look up an attribute by key. Accepts the `MPI_` prefixed spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.strip_prefix("MPI_").unwrap_or(name);
        Self::ALL.into_iter().find(|attr| attr.name() == key)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Communication handle carrying registry attributes.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct CommHandle {
    name: Cow<'static, str>,
    registry: SharedRegistry,
}

impl CommHandle {
    /// Name of the process-wide handle.
    pub const WORLD: &'static str = "WORLD";

    /// Handle named `name` over `registry`.
    pub fn named(name: impl Into<Cow<'static, str>>, registry: &SharedRegistry) -> Self {
        Self {
            name: name.into(),
            registry: registry.clone(),
        }
    }

    /// The process-wide handle over `registry`.
    pub fn world(registry: &SharedRegistry) -> Self {
        Self::named(Self::WORLD, registry)
    }

    /// Handle name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry behind this handle.
    #[inline]
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Current value of `attribute`.
    pub fn get_attr(&self, attribute: Attribute) -> ErrorCode {
        match attribute {
            Attribute::LastUsedCode => self.registry.last_used_code(),
            Attribute::Frontier => self.registry.frontier(),
        }
    }

    /// Current value of the attribute keyed `name`, if there is one.
    pub fn get_attr_by_name(&self, name: &str) -> Option<ErrorCode> {
        Attribute::from_name(name).map(|attribute| self.get_attr(attribute))
    }
}

impl SharedRegistry {
    /// The process-wide [`CommHandle`] over this registry.
    pub fn world(&self) -> CommHandle {
        CommHandle::world(self)
    }
}
