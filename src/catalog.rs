//! The component catalog: descriptors, superclass relations and conversions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::component::Component;
use crate::descriptor::{CastFn, ComponentDescriptor};
use crate::error::DiResult;
use crate::key::TypeKey;
use crate::satisfaction::Satisfaction;
use crate::types::TypeHierarchy;

// Vec lookup below this many descriptors, HashMap above
const SMALL_THRESHOLD: usize = 16;

/// Metadata source for the resolver.
///
/// The catalog answers three questions: which descriptor describes a type,
/// which type is the declared superclass of another, and how a produced
/// value converts to a declared type (typically a trait object).
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ComponentCatalog, ComponentDescriptor, TypeKey};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let mut catalog = ComponentCatalog::new();
/// catalog.register(ComponentDescriptor::builder::<Clock>().default_constructor().build().unwrap());
///
/// assert!(catalog.contains(&TypeKey::of::<Clock>()));
/// assert!(catalog.default_satisfaction(&TypeKey::of::<Clock>()).unwrap().is_some());
/// assert!(catalog.default_satisfaction(&TypeKey::of::<String>()).unwrap().is_none());
/// ```
#[derive(Clone, Default)]
pub struct ComponentCatalog {
    small: Vec<(TypeKey, Arc<ComponentDescriptor>)>,
    large: HashMap<TypeKey, Arc<ComponentDescriptor>>,
    superclasses: HashMap<TypeKey, TypeKey>,
    casts: HashMap<(TypeKey, TypeKey), CastFn>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a descriptor, together with its superclass chain.
    pub fn register(&mut self, descriptor: Arc<ComponentDescriptor>) -> &mut Self {
        let mut current = Some(&descriptor);
        while let Some(d) = current {
            if let Some(parent) = d.superclass() {
                self.superclasses.insert(d.type_key(), parent.type_key());
            }
            current = d.superclass();
        }

        let key = descriptor.type_key();
        if let Some(pos) = self.small.iter().position(|(k, _)| *k == key) {
            self.small[pos].1 = descriptor;
        } else if self.small.len() < SMALL_THRESHOLD {
            self.small.push((key, descriptor));
        } else {
            self.large.insert(key, descriptor);
        }
        self
    }

    #[inline]
    pub fn get(&self, ty: &TypeKey) -> Option<&Arc<ComponentDescriptor>> {
        for (k, d) in &self.small {
            if k == ty {
                return Some(d);
            }
        }
        self.large.get(ty)
    }

    #[inline]
    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.get(ty).is_some()
    }

    pub fn len(&self) -> usize {
        self.small.len() + self.large.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ComponentDescriptor>> {
        self.small.iter().map(|(_, d)| d).chain(self.large.values())
    }

    /// Declares `C` a subclass of `P` for types without descriptors.
    pub fn declare_superclass<C: ?Sized + 'static, P: ?Sized + 'static>(&mut self) -> &mut Self {
        self.superclasses
            .insert(TypeKey::of::<C>(), TypeKey::of::<P>());
        self
    }

    /// Registers a conversion from values of `F` to values of `T`.
    pub fn declare_cast<F, T, C>(&mut self, cast: C) -> &mut Self
    where
        F: ?Sized + Send + Sync + 'static,
        T: ?Sized + Send + Sync + 'static,
        C: Fn(Arc<F>) -> Arc<T> + Send + Sync + 'static,
    {
        let cast: CastFn = Arc::new(move |component: &Component| {
            Ok(Component::new(cast(component.downcast::<F>()?)))
        });
        self.casts
            .insert((TypeKey::of::<F>(), TypeKey::of::<T>()), cast);
        self
    }

    /// Conversion from `from` values to `to`, descriptor conversions first.
    pub(crate) fn cast(&self, from: &TypeKey, to: &TypeKey) -> Option<CastFn> {
        self.get(from)
            .and_then(|d| d.cast_to(to))
            .or_else(|| self.casts.get(&(*from, *to)).cloned())
    }

    /// The satisfaction used when no rule applies to `ty`.
    ///
    /// Provider descriptors yield a provider-class satisfaction. Types without
    /// a descriptor have no default; a registered descriptor without a usable
    /// constructor is a [`NotInstantiable`](crate::DiError::NotInstantiable) error.
    pub fn default_satisfaction(&self, ty: &TypeKey) -> DiResult<Option<Satisfaction>> {
        let Some(descriptor) = self.get(ty) else {
            return Ok(None);
        };
        let satisfaction = if descriptor.is_provider() {
            Satisfaction::provider_class(descriptor.clone())?
        } else {
            Satisfaction::class(descriptor.clone())?
        };
        Ok(Some(satisfaction))
    }
}

impl TypeHierarchy for ComponentCatalog {
    fn superclass(&self, ty: &TypeKey) -> Option<TypeKey> {
        self.superclasses
            .get(ty)
            .copied()
            .or_else(|| self.get(ty)?.superclass().map(|s| s.type_key()))
    }
}

impl fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCatalog")
            .field("descriptors", &self.len())
            .field("superclasses", &self.superclasses.len())
            .field("casts", &self.casts.len())
            .finish()
    }
}
