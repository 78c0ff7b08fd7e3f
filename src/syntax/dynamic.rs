//! Process-wide registry of dynamic highlighting contexts
//!
//! A dynamic context is a lexer state created at runtime from a rule
//! template and text captured by the rule's start pattern, e.g. the end
//! delimiter of a Rust raw string `r##"..."##`. Line states only hold a
//! [`ContextId`]; the registry owns the compiled patterns.
//!
//! Contexts are shared by every buffer, so they can only be dropped all at
//! once. The registry also tracks the open buffers so that a reset can make
//! each of them rebuild its highlighting.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use regex::Regex;

use crate::config::Config;

/// Handle to a dynamic context. Ids are never reused, so a handle that
/// survived a reset simply fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

/// Per-buffer registration token
#[derive(Debug, Default)]
pub struct BufferSlot {
    rebuild_pending: Cell<bool>,
}

impl BufferSlot {
    /// Consume a pending rebuild request
    pub fn take_rebuild(&self) -> bool {
        self.rebuild_pending.replace(false)
    }

    /// Whether a rebuild has been requested and not yet handled
    pub fn rebuild_pending(&self) -> bool {
        self.rebuild_pending.get()
    }
}

/// Registry of dynamic contexts shared by all buffers
#[derive(Debug)]
pub struct ContextRegistry {
    by_pattern: RefCell<HashMap<String, ContextId>>,
    patterns: RefCell<HashMap<ContextId, Rc<Regex>>>,
    next_id: Cell<u64>,
    suppress_reset: Cell<bool>,
    reset_delay: Duration,
    last_reset: Cell<Option<Instant>>,
    buffers: RefCell<Vec<Weak<BufferSlot>>>,
}

impl ContextRegistry {
    /// Create a registry that refuses resets closer together than `reset_delay`
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            by_pattern: RefCell::new(HashMap::new()),
            patterns: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            suppress_reset: Cell::new(false),
            reset_delay,
            last_reset: Cell::new(None),
            buffers: RefCell::new(Vec::new()),
        }
    }

    /// Create a shared registry from configuration
    pub fn shared(config: &Config) -> Rc<Self> {
        Rc::new(Self::new(config.dynamic_reset_delay))
    }

    /// Number of live dynamic contexts
    pub fn live_count(&self) -> usize {
        self.patterns.borrow().len()
    }

    /// Get the context for an end pattern, creating it on first use.
    /// Returns None if the pattern does not compile.
    pub fn intern(&self, pattern: &str) -> Option<ContextId> {
        if let Some(id) = self.by_pattern.borrow().get(pattern) {
            return Some(*id);
        }

        let regex = Regex::new(pattern).ok()?;
        let id = ContextId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.by_pattern.borrow_mut().insert(pattern.to_string(), id);
        self.patterns.borrow_mut().insert(id, Rc::new(regex));
        Some(id)
    }

    /// Resolve a context handle
    pub fn lookup(&self, id: ContextId) -> Option<Rc<Regex>> {
        self.patterns.borrow().get(&id).cloned()
    }

    /// Drop every dynamic context.
    ///
    /// Returns false without touching anything while resets are suppressed
    /// or when the previous reset is more recent than the reset delay.
    pub fn reset_all(&self) -> bool {
        if self.suppress_reset.get() {
            return false;
        }

        if let Some(last) = self.last_reset.get() {
            if last.elapsed() < self.reset_delay {
                return false;
            }
        }

        let dropped = self.live_count();
        self.by_pattern.borrow_mut().clear();
        self.patterns.borrow_mut().clear();
        self.last_reset.set(Some(Instant::now()));
        tracing::info!(dropped, "dynamic contexts reset");
        true
    }

    /// Guard against nested resets while buffers recover from one
    pub fn set_suppress_reset(&self, suppress: bool) {
        self.suppress_reset.set(suppress);
    }

    pub fn reset_suppressed(&self) -> bool {
        self.suppress_reset.get()
    }

    /// Register a new buffer. The registration ends when the returned slot
    /// is dropped.
    pub fn register_buffer(&self) -> Rc<BufferSlot> {
        let slot = Rc::new(BufferSlot::default());
        let mut buffers = self.buffers.borrow_mut();
        buffers.retain(|weak| weak.strong_count() > 0);
        buffers.push(Rc::downgrade(&slot));
        slot
    }

    /// Number of registered buffers still alive
    pub fn open_buffers(&self) -> usize {
        self.buffers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Ask every open buffer to rebuild its highlighting
    pub fn request_rebuild(&self) {
        for slot in self.buffers.borrow().iter().filter_map(Weak::upgrade) {
            slot.rebuild_pending.set(true);
        }
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DYNAMIC_RESET_DELAY)
    }
}
