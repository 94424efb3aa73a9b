//! Observers of resolution events.
//!
//! Observers are told about every desire the resolver starts, finishes or
//! fails on, which is enough to trace a resolution chain or time it.

use std::sync::Arc;
use std::time::Duration;

use crate::desire::Desire;
use crate::error::DiError;
use crate::key::TypeKey;

/// Observer trait for resolution events.
///
/// Calls are made synchronously while the graph is being resolved. Keep
/// implementations lightweight.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Desire, ResolutionObserver, TypeKey};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting {
///     resolved: AtomicUsize,
/// }
///
/// impl ResolutionObserver for Counting {
///     fn resolved(&self, _desire: &Desire, _produced: TypeKey, _duration: Duration) {
///         self.resolved.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called before rules are applied to `desire`.
    fn resolving(&self, _desire: &Desire) {}

    /// Called once `desire` and all its dependencies resolved.
    fn resolved(&self, _desire: &Desire, _produced: TypeKey, _duration: Duration) {}

    /// Called when resolving `desire` failed.
    fn failed(&self, _desire: &Desire, _error: &DiError) {}
}

/// Container for registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, desire: &Desire) {
        for observer in &self.observers {
            observer.resolving(desire);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, desire: &Desire, produced: TypeKey, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(desire, produced, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, desire: &Desire, error: &DiError) {
        for observer in &self.observers {
            observer.failed(desire, error);
        }
    }
}

/// Built-in observer forwarding events to `tracing`.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Injector, TracingObserver};
/// use std::sync::Arc;
///
/// let injector = Injector::builder()
///     .observer(Arc::new(TracingObserver::new()))
///     .build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct TracingObserver {
    target: Option<&'static str>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer tagging every event with `target` as its `observer` field.
    pub fn with_target(target: &'static str) -> Self {
        Self {
            target: Some(target),
        }
    }
}

impl ResolutionObserver for TracingObserver {
    fn resolving(&self, desire: &Desire) {
        tracing::debug!(observer = self.target, desire = %desire, "resolving");
    }

    fn resolved(&self, desire: &Desire, produced: TypeKey, duration: Duration) {
        tracing::debug!(
            observer = self.target,
            desire = %desire,
            produced = %produced,
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn failed(&self, desire: &Desire, error: &DiError) {
        tracing::warn!(observer = self.target, desire = %desire, error = %error, "resolution failed");
    }
}
