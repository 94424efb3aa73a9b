use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache_policy::CachePolicy;
use crate::component::{AnyBox, Component};
use crate::desire::{InjectionKind, InjectionPoint};
use crate::error::{BoxError, DiError, DiResult};
use crate::key::TypeKey;
use crate::lifecycle::Dispose;
use crate::provider::Provider;

use super::{
    Arguments, CastFn, ComponentDescriptor, ConstructorDescriptor, DestroyHook, HookDescriptor,
    MemberDescriptor, ProviderOutput,
};

/// Typed builder for a [`ComponentDescriptor`].
///
/// Every closure receives the concrete `T`, the builder erases it. Problems
/// found while describing (such as a member whose injection point names a
/// different type) are collected and reported by [`build`](Self::build).
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ComponentDescriptor, InjectionPoint};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Metrics;
///
/// #[derive(Default)]
/// struct Service {
///     metrics: Option<Arc<Metrics>>,
///     started: bool,
/// }
///
/// let descriptor = ComponentDescriptor::builder::<Service>()
///     .default_constructor()
///     .field::<Metrics, _>("metrics", InjectionPoint::of::<Metrics>().optional(), |s, m| {
///         s.metrics = m;
///     })
///     .post_construct("start", |s| {
///         s.started = true;
///         Ok(())
///     })
///     .singleton()
///     .build()
///     .unwrap();
///
/// assert_eq!(descriptor.members().len(), 1);
/// assert_eq!(descriptor.post_construct_hooks()[0].name(), "start");
/// ```
pub struct DescriptorBuilder<T> {
    ty: TypeKey,
    superclass: Option<Arc<ComponentDescriptor>>,
    constructors: Vec<ConstructorDescriptor>,
    inherited_members: Vec<MemberDescriptor>,
    members: Vec<MemberDescriptor>,
    inherited_hooks: Vec<HookDescriptor>,
    hooks: Vec<HookDescriptor>,
    inherited_destroy: Vec<DestroyHook>,
    destroy_hooks: Vec<DestroyHook>,
    casts: Vec<(TypeKey, CastFn)>,
    cache_policy: CachePolicy,
    provider: Option<ProviderOutput>,
    errors: Vec<String>,
    _marker: PhantomData<fn() -> T>,
}

fn mismatch<T>() -> BoxError {
    Box::new(DiError::TypeMismatch(std::any::type_name::<T>()))
}

fn freeze<T: Any + Send + Sync>(obj: AnyBox) -> DiResult<Component> {
    obj.downcast::<T>()
        .map(|boxed| Component::new(Arc::<T>::from(boxed)))
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

impl<T: Any + Send + Sync> DescriptorBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            ty: TypeKey::of::<T>(),
            superclass: None,
            constructors: Vec::new(),
            inherited_members: Vec::new(),
            members: Vec::new(),
            inherited_hooks: Vec::new(),
            hooks: Vec::new(),
            inherited_destroy: Vec::new(),
            destroy_hooks: Vec::new(),
            casts: Vec::new(),
            cache_policy: CachePolicy::NoPreference,
            provider: None,
            errors: Vec::new(),
            _marker: PhantomData,
        }
    }

    fn push_constructor<F>(mut self, params: Vec<InjectionPoint>, injectable: bool, f: F) -> Self
    where
        F: Fn(&Arguments<'_>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let params = params
            .into_iter()
            .enumerate()
            .map(|(index, p)| p.placed(self.ty, InjectionKind::ConstructorParameter { index }))
            .collect();
        self.constructors.push(ConstructorDescriptor {
            params,
            injectable,
            invoke: Arc::new(move |args: &Arguments<'_>| f(args).map(|t| Box::new(t) as AnyBox)),
        });
        self
    }

    /// Adds an unmarked constructor.
    pub fn constructor<F>(self, params: Vec<InjectionPoint>, f: F) -> Self
    where
        F: Fn(&Arguments<'_>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.push_constructor(params, false, f)
    }

    /// Adds a constructor carrying the injectable marker.
    pub fn inject_constructor<F>(self, params: Vec<InjectionPoint>, f: F) -> Self
    where
        F: Fn(&Arguments<'_>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.push_constructor(params, true, f)
    }

    /// Adds an unmarked zero-parameter constructor using `Default`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.push_constructor(Vec::new(), false, |_| Ok(T::default()))
    }

    fn check_point<D: ?Sized + 'static>(&mut self, name: &str, point: &InjectionPoint) {
        if point.declared_type() != TypeKey::of::<D>() {
            self.errors.push(format!(
                "member `{}` of {} declares {} but receives {}",
                name,
                self.ty,
                point.declared_type(),
                std::any::type_name::<D>()
            ));
        }
    }

    /// Injectable field. The closure stores the value and cannot fail.
    pub fn field<D, F>(self, name: &'static str, point: InjectionPoint, f: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Option<Arc<D>>) + Send + Sync + 'static,
    {
        self.setter::<D, _>(name, point, move |t, value| {
            f(t, value);
            Ok(())
        })
    }

    /// Injectable setter. A failure aborts construction.
    pub fn setter<D, F>(mut self, name: &'static str, point: InjectionPoint, f: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Option<Arc<D>>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.check_point::<D>(name, &point);
        self.members.push(MemberDescriptor {
            name,
            point,
            declared_by: self.ty,
            apply: Arc::new(move |obj: &mut (dyn Any + Send + Sync), value: Option<Component>| {
                let this = obj.downcast_mut::<T>().ok_or_else(mismatch::<T>)?;
                let value = value.map(|c| c.downcast::<D>()).transpose()?;
                f(this, value)
            }),
        });
        self
    }

    /// Hook run after every member has been injected.
    pub fn post_construct<F>(mut self, name: &'static str, f: F) -> Self
    where
        F: Fn(&mut T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks.push(HookDescriptor {
            name,
            declared_by: self.ty,
            invoke: Arc::new(move |obj: &mut (dyn Any + Send + Sync)| {
                let this = obj.downcast_mut::<T>().ok_or_else(mismatch::<T>)?;
                f(this)
            }),
        });
        self
    }

    /// Hook run when the owning lifecycle ledger is closed.
    pub fn pre_destroy<F>(mut self, name: &'static str, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.destroy_hooks.push(DestroyHook {
            name,
            invoke: Arc::new(move |obj: &(dyn Any + Send + Sync)| {
                if let Some(this) = obj.downcast_ref::<T>() {
                    f(this);
                }
            }),
        });
        self
    }

    /// Registers [`Dispose::dispose`] as a pre-destroy hook.
    pub fn disposable(self) -> Self
    where
        T: Dispose,
    {
        self.pre_destroy("dispose", |t: &T| t.dispose())
    }

    /// Inherits members and hooks declared by the superclass `P`.
    ///
    /// Inherited members and hooks run before the ones declared on `T`.
    /// Constructors are not inherited.
    pub fn extends<P>(mut self, parent: &Arc<ComponentDescriptor>) -> Self
    where
        P: Any + Send + Sync,
        T: AsRef<P> + AsMut<P>,
    {
        if parent.ty != TypeKey::of::<P>() {
            self.errors.push(format!(
                "{} extends {} but the descriptor describes {}",
                self.ty,
                std::any::type_name::<P>(),
                parent.ty
            ));
            return self;
        }
        if let Some(existing) = &self.superclass {
            self.errors.push(format!(
                "{} already extends {}",
                self.ty, existing.ty
            ));
            return self;
        }

        for member in &parent.members {
            let apply = member.apply.clone();
            self.inherited_members.push(MemberDescriptor {
                name: member.name,
                point: member.point.clone(),
                declared_by: member.declared_by,
                apply: Arc::new(move |obj: &mut (dyn Any + Send + Sync), value: Option<Component>| {
                    let this = obj.downcast_mut::<T>().ok_or_else(mismatch::<T>)?;
                    apply(AsMut::<P>::as_mut(this), value)
                }),
            });
        }
        for hook in &parent.hooks {
            let invoke = hook.invoke.clone();
            self.inherited_hooks.push(HookDescriptor {
                name: hook.name,
                declared_by: hook.declared_by,
                invoke: Arc::new(move |obj: &mut (dyn Any + Send + Sync)| {
                    let this = obj.downcast_mut::<T>().ok_or_else(mismatch::<T>)?;
                    invoke(AsMut::<P>::as_mut(this))
                }),
            });
        }
        for hook in &parent.destroy_hooks {
            let invoke = hook.invoke.clone();
            self.inherited_destroy.push(DestroyHook {
                name: hook.name,
                invoke: Arc::new(move |obj: &(dyn Any + Send + Sync)| {
                    if let Some(this) = obj.downcast_ref::<T>() {
                        invoke(AsRef::<P>::as_ref(this));
                    }
                }),
            });
        }
        self.superclass = Some(parent.clone());
        self
    }

    /// Allows injecting `T` where `I` is declared, typically a trait object.
    pub fn implements<I, F>(mut self, cast: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let cast: CastFn = Arc::new(move |component: &Component| {
            Ok(Component::new(cast(component.downcast::<T>()?)))
        });
        self.casts.push((TypeKey::of::<I>(), cast));
        self
    }

    /// Marks `T` as a provider of `T::Output`.
    pub fn provides(mut self) -> Self
    where
        T: Provider,
    {
        self.provider = Some(ProviderOutput {
            provided: TypeKey::of::<T::Output>(),
            get: Arc::new(|obj: &(dyn Any + Send + Sync)| {
                let this = obj.downcast_ref::<T>().ok_or_else(mismatch::<T>)?;
                Ok(this.get()?.map(Component::new))
            }),
        });
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Shorthand for a [`CachePolicy::Memoize`] default.
    pub fn singleton(self) -> Self {
        self.cache_policy(CachePolicy::Memoize)
    }

    /// Finishes the descriptor.
    ///
    /// Member ordinals are assigned over the flattened member list, so
    /// inherited members come first.
    pub fn build(self) -> DiResult<Arc<ComponentDescriptor>> {
        if !self.errors.is_empty() {
            return Err(DiError::configuration(self.errors.join("; ")));
        }

        let members = self
            .inherited_members
            .into_iter()
            .chain(self.members)
            .enumerate()
            .map(|(ordinal, mut m)| {
                let kind = InjectionKind::Member { name: m.name, ordinal };
                m.point = m.point.placed(m.declared_by, kind);
                m
            })
            .collect();

        Ok(Arc::new(ComponentDescriptor {
            ty: self.ty,
            superclass: self.superclass,
            constructors: self.constructors,
            members,
            hooks: self.inherited_hooks.into_iter().chain(self.hooks).collect(),
            destroy_hooks: self
                .inherited_destroy
                .into_iter()
                .chain(self.destroy_hooks)
                .collect(),
            casts: self.casts,
            cache_policy: self.cache_policy,
            provider: self.provider,
            freeze: freeze::<T>,
            view: Component::view::<T>,
        }))
    }
}
