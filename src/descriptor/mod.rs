//! Component metadata: constructors, injectable members and lifecycle hooks.
//!
//! A [`ComponentDescriptor`] is the reflective description of one component
//! type. Descriptors are built once through [`ComponentDescriptor::builder`]
//! and shared behind an `Arc`.

mod arguments;
mod builder;

pub use arguments::Arguments;
pub use builder::DescriptorBuilder;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::cache_policy::CachePolicy;
use crate::component::{AnyBox, Component};
use crate::desire::InjectionPoint;
use crate::error::{BoxError, DiError, DiResult};
use crate::key::TypeKey;

pub(crate) type CtorFn = Arc<dyn Fn(&Arguments<'_>) -> Result<AnyBox, BoxError> + Send + Sync>;
pub(crate) type MemberFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Option<Component>) -> Result<(), BoxError> + Send + Sync>;
pub(crate) type HookFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync)) -> Result<(), BoxError> + Send + Sync>;
pub(crate) type DestroyFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;
pub(crate) type ProvideFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Result<Option<Component>, BoxError> + Send + Sync>;
pub(crate) type CastFn = Arc<dyn Fn(&Component) -> DiResult<Component> + Send + Sync>;
pub(crate) type FreezeFn = fn(AnyBox) -> DiResult<Component>;
pub(crate) type ViewFn = fn(&Component) -> Option<&(dyn Any + Send + Sync)>;

/// One constructor of a component.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    pub(crate) params: Vec<InjectionPoint>,
    pub(crate) injectable: bool,
    pub(crate) invoke: CtorFn,
}

impl ConstructorDescriptor {
    pub fn params(&self) -> &[InjectionPoint] {
        &self.params
    }

    /// Whether the constructor carries the injectable marker.
    pub fn is_injectable(&self) -> bool {
        self.injectable
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("params", &self.params.len())
            .field("injectable", &self.injectable)
            .finish()
    }
}

/// An injectable field or setter.
#[derive(Clone)]
pub struct MemberDescriptor {
    pub(crate) name: &'static str,
    pub(crate) point: InjectionPoint,
    pub(crate) declared_by: TypeKey,
    pub(crate) apply: MemberFn,
}

impl MemberDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn injection_point(&self) -> &InjectionPoint {
        &self.point
    }

    /// The type that declared the member, a superclass for inherited members.
    pub fn declared_by(&self) -> TypeKey {
        self.declared_by
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("declared_by", &self.declared_by)
            .finish()
    }
}

/// A post-construct hook.
#[derive(Clone)]
pub struct HookDescriptor {
    pub(crate) name: &'static str,
    pub(crate) declared_by: TypeKey,
    pub(crate) invoke: HookFn,
}

impl HookDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_by(&self) -> TypeKey {
        self.declared_by
    }
}

impl fmt::Debug for HookDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HookDescriptor({} of {})", self.name, self.declared_by.short_name())
    }
}

#[derive(Clone)]
pub(crate) struct DestroyHook {
    pub(crate) name: &'static str,
    pub(crate) invoke: DestroyFn,
}

#[derive(Clone)]
pub(crate) struct ProviderOutput {
    pub(crate) provided: TypeKey,
    pub(crate) get: ProvideFn,
}

/// Reflective description of a component type.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ComponentDescriptor, InjectionPoint};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Database { url: String }
///
/// let descriptor = ComponentDescriptor::builder::<Database>()
///     .inject_constructor(vec![InjectionPoint::of::<Config>()], |args| {
///         let config = args.get::<Config>(0)?;
///         Ok(Database { url: config.url.clone() })
///     })
///     .build()
///     .unwrap();
///
/// let ctor = descriptor.injectable_constructor().unwrap();
/// assert_eq!(ctor.params().len(), 1);
/// assert_eq!(descriptor.injection_points().unwrap().len(), 1);
/// ```
pub struct ComponentDescriptor {
    pub(crate) ty: TypeKey,
    pub(crate) superclass: Option<Arc<ComponentDescriptor>>,
    pub(crate) constructors: Vec<ConstructorDescriptor>,
    // Flattened, supertype members first
    pub(crate) members: Vec<MemberDescriptor>,
    pub(crate) hooks: Vec<HookDescriptor>,
    pub(crate) destroy_hooks: Vec<DestroyHook>,
    pub(crate) casts: Vec<(TypeKey, CastFn)>,
    pub(crate) cache_policy: CachePolicy,
    pub(crate) provider: Option<ProviderOutput>,
    pub(crate) freeze: FreezeFn,
    pub(crate) view: ViewFn,
}

impl ComponentDescriptor {
    /// Starts describing the component type `T`.
    pub fn builder<T: Any + Send + Sync>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new()
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Declared superclass descriptor, if any.
    pub fn superclass(&self) -> Option<&Arc<ComponentDescriptor>> {
        self.superclass.as_ref()
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// Picks the constructor used for injection.
    ///
    /// A single constructor carrying the injectable marker wins. Without any
    /// marker, the type must declare exactly one constructor and it must take
    /// no parameters. More than one marked constructor is a configuration
    /// error; anything else means the type cannot be instantiated.
    pub fn injectable_constructor(&self) -> DiResult<&ConstructorDescriptor> {
        let mut marked = self.constructors.iter().filter(|c| c.injectable);
        match (marked.next(), marked.next()) {
            (Some(ctor), None) => return Ok(ctor),
            (Some(_), Some(_)) => {
                let count = self.constructors.iter().filter(|c| c.injectable).count();
                return Err(DiError::configuration(format!(
                    "{} declares {} injectable constructors",
                    self.ty, count
                )));
            }
            _ => {}
        }

        match self.constructors.as_slice() {
            [ctor] if ctor.params.is_empty() => Ok(ctor),
            _ => Err(DiError::NotInstantiable(self.ty.display_name())),
        }
    }

    /// Every member, supertype members first.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Post-construct hooks in invocation order.
    pub fn post_construct_hooks(&self) -> &[HookDescriptor] {
        &self.hooks
    }

    /// Names of the pre-destroy hooks in invocation order, subtype first.
    pub fn pre_destroy_hooks(&self) -> Vec<&'static str> {
        self.destroy_hooks.iter().rev().map(|h| h.name).collect()
    }

    /// Parameters of the injectable constructor followed by member points.
    pub fn injection_points(&self) -> DiResult<Vec<InjectionPoint>> {
        let ctor = self.injectable_constructor()?;
        Ok(ctor
            .params
            .iter()
            .cloned()
            .chain(self.members.iter().map(|m| m.point.clone()))
            .collect())
    }

    pub fn default_cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Type produced by this component when it is a provider.
    pub fn provided_type(&self) -> Option<TypeKey> {
        self.provider.as_ref().map(|p| p.provided)
    }

    pub fn is_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Types this component can be injected as, besides its own.
    pub fn implemented_types(&self) -> Vec<TypeKey> {
        self.casts.iter().map(|(ty, _)| *ty).collect()
    }

    pub(crate) fn cast_to(&self, target: &TypeKey) -> Option<CastFn> {
        self.casts
            .iter()
            .find(|(ty, _)| ty == target)
            .map(|(_, cast)| cast.clone())
    }

    /// Teardown running the pre-destroy hooks on `component`, subtype first.
    pub(crate) fn teardown(&self, component: &Component) -> Option<Box<dyn FnOnce() + Send>> {
        if self.destroy_hooks.is_empty() {
            return None;
        }
        let hooks = self.destroy_hooks.clone();
        let view = self.view;
        let component = component.clone();
        let ty = self.ty;
        Some(Box::new(move || {
            let Some(obj) = view(&component) else {
                tracing::warn!(component = %ty, "pre-destroy skipped, component type changed");
                return;
            };
            for hook in hooks.iter().rev() {
                tracing::trace!(component = %ty, hook = hook.name, "running pre-destroy hook");
                (hook.invoke)(obj);
            }
        }))
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("type", &self.ty)
            .field("superclass", &self.superclass.as_ref().map(|s| s.ty))
            .field("constructors", &self.constructors)
            .field("members", &self.members)
            .field("hooks", &self.hooks)
            .field("cache_policy", &self.cache_policy)
            .field("provides", &self.provided_type())
            .finish()
    }
}
