use std::sync::Arc;

use crate::component::Component;
use crate::descriptor::{ComponentDescriptor, ProvideFn, ViewFn};
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::provider::ErasedProvider;

use super::{guarded, ClassInstantiator, Instantiator};

enum Source {
    // Provider object supplied by the caller
    Fixed(Arc<dyn ErasedProvider>),
    // Provider component built on every invocation
    Built {
        factory: ClassInstantiator,
        get: ProvideFn,
        view: ViewFn,
    },
}

/// Obtains a provider, then asks it for one value.
pub(crate) struct ProviderInstantiator {
    source: Source,
    produced: TypeKey,
    catch_panics: bool,
}

impl ProviderInstantiator {
    pub(crate) fn fixed(provider: Arc<dyn ErasedProvider>, catch_panics: bool) -> Self {
        Self {
            produced: provider.provided_type(),
            source: Source::Fixed(provider),
            catch_panics,
        }
    }

    pub(crate) fn built(
        descriptor: Arc<ComponentDescriptor>,
        factory: ClassInstantiator,
        catch_panics: bool,
    ) -> DiResult<Self> {
        let output = descriptor.provider.as_ref().ok_or_else(|| {
            DiError::configuration(format!("{} is not a provider", descriptor.type_key()))
        })?;
        Ok(Self {
            produced: output.provided,
            source: Source::Built {
                factory,
                get: output.get.clone(),
                view: descriptor.view,
            },
            catch_panics,
        })
    }

    fn check_type(&self, value: Option<Component>) -> DiResult<Option<Component>> {
        match value {
            Some(c) if c.type_key() != self.produced => {
                Err(DiError::TypeMismatch(self.produced.display_name()))
            }
            other => Ok(other),
        }
    }
}

impl Instantiator for ProviderInstantiator {
    fn produced_type(&self) -> TypeKey {
        self.produced
    }

    fn instantiate(&self) -> DiResult<Option<Component>> {
        let member = || format!("provider of {}", self.produced);
        let value = match &self.source {
            Source::Fixed(provider) => guarded(self.catch_panics, || provider.provide())
                .map_err(|e| DiError::construction(member(), e))?,
            Source::Built { factory, get, view } => {
                let Some(provider) = factory.instantiate()? else {
                    return Err(DiError::NullDependency(member()));
                };
                let obj = view(&provider)
                    .ok_or(DiError::TypeMismatch(factory.produced_type().display_name()))?;
                guarded(self.catch_panics, || get(obj))
                    .map_err(|e| DiError::construction(member(), e))?
            }
        };
        self.check_type(value)
    }
}
