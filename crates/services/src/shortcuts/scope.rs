use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct ScopeInner {
    id: u64,
    name: String,
}

/// Activation context for triggers, e.g. the main window or a dialog.
///
/// The UI element that owns the context keeps this handle alive. Triggers only
/// observe it, so dropping the last clone retires every trigger scoped to it.
#[derive(Debug, Clone)]
pub struct ShortcutScope {
    inner: Arc<ScopeInner>,
}

impl ShortcutScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
                name: name.into(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn observe(&self) -> ScopeRef {
        ScopeRef {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for ShortcutScope {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ShortcutScope {}

/// Non-owning reference from a trigger to its scope.
#[derive(Debug, Clone)]
pub(crate) struct ScopeRef {
    id: u64,
    inner: Weak<ScopeInner>,
}

impl ScopeRef {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub(crate) fn refers_to(&self, scope: &ShortcutScope) -> bool {
        self.is_alive() && self.id == scope.id()
    }
}
