//! Lifecycle tracking for constructed components.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::component::Component;

/// Teardown closure registered alongside a component.
pub type Teardown = Box<dyn FnOnce() + Send>;

/// Trait for synchronous resource disposal.
///
/// Implement this for components that need structured teardown (flushing
/// caches, closing connections) and declare it with
/// [`DescriptorBuilder::disposable`](crate::DescriptorBuilder::disposable).
/// Disposal runs when the owning [`LifecycleLedger`] is closed.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::Dispose;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache: {}", self.name);
///     }
/// }
/// ```
pub trait Dispose: Send + Sync + 'static {
    fn dispose(&self);
}

#[derive(Default)]
struct LedgerInner {
    components: Vec<Component>,
    teardown: Vec<Teardown>,
}

impl Drop for LedgerInner {
    fn drop(&mut self) {
        if !self.teardown.is_empty() {
            tracing::warn!(
                pending = self.teardown.len(),
                "lifecycle ledger dropped with pending teardown, call close() first"
            );
        }
    }
}

/// Records every component constructed through a class satisfaction.
///
/// Registration never fails. Components with pre-destroy hooks carry a
/// teardown, run in reverse registration order by [`close`](Self::close).
/// The ledger is cheap to clone; clones share state and may be used from
/// several threads.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Component, LifecycleLedger};
/// use std::sync::{Arc, Mutex};
///
/// let ledger = LifecycleLedger::new();
/// let order = Arc::new(Mutex::new(Vec::new()));
///
/// for name in ["first", "second"] {
///     let order = order.clone();
///     ledger.register_with_teardown(
///         Component::new(Arc::new(name)),
///         Some(Box::new(move || order.lock().unwrap().push(name))),
///     );
/// }
///
/// assert_eq!(ledger.len(), 2);
/// ledger.close();
/// assert_eq!(*order.lock().unwrap(), vec!["second", "first"]);
/// ```
#[derive(Clone, Default)]
pub struct LifecycleLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl LifecycleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly constructed component.
    pub fn register(&self, component: Component) {
        self.register_with_teardown(component, None);
    }

    /// Records a component together with its teardown.
    pub fn register_with_teardown(&self, component: Component, teardown: Option<Teardown>) {
        tracing::trace!(component = %component.type_key(), "registered with lifecycle ledger");
        let mut inner = self.inner.lock();
        inner.components.push(component);
        if let Some(teardown) = teardown {
            inner.teardown.push(teardown);
        }
    }

    /// Number of components recorded so far.
    pub fn len(&self) -> usize {
        self.inner.lock().components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().components.is_empty()
    }

    /// Snapshot of the recorded components, in registration order.
    pub fn components(&self) -> Vec<Component> {
        self.inner.lock().components.clone()
    }

    /// Teardowns not yet run.
    pub fn pending_teardown(&self) -> usize {
        self.inner.lock().teardown.len()
    }

    /// Runs every pending teardown in LIFO order.
    ///
    /// Each teardown runs once. The lock is released before teardown starts,
    /// so hooks may register further components; those are torn down by the
    /// next call.
    pub fn close(&self) {
        let mut pending = std::mem::take(&mut self.inner.lock().teardown);
        tracing::debug!(count = pending.len(), "closing lifecycle ledger");
        while let Some(teardown) = pending.pop() {
            teardown();
        }
    }
}

impl fmt::Debug for LifecycleLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LifecycleLedger")
            .field("components", &inner.components.len())
            .field("pending_teardown", &inner.teardown.len())
            .finish()
    }
}
