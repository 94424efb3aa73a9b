use std::sync::Arc;

use crate::component::Component;
use crate::descriptor::{Arguments, ComponentDescriptor};
use crate::desire::InjectionPoint;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::lifecycle::LifecycleLedger;

use super::{guarded, Instantiator};

/// Builds a component through its injectable constructor.
///
/// Construction runs in phases: constructor arguments are produced and
/// null-checked, the constructor is invoked, members are injected in
/// declaration order, post-construct hooks run supertype first, and the
/// finished component is recorded with the lifecycle ledger.
pub(crate) struct ClassInstantiator {
    descriptor: Arc<ComponentDescriptor>,
    params: Vec<Arc<dyn Instantiator>>,
    members: Vec<Arc<dyn Instantiator>>,
    ledger: Option<LifecycleLedger>,
    catch_panics: bool,
}

fn check_null(point: &InjectionPoint, value: &Option<Component>) -> DiResult<()> {
    if value.is_none() && !point.is_optional() {
        return Err(DiError::NullDependency(point.to_string()));
    }
    Ok(())
}

impl ClassInstantiator {
    /// `dependencies` holds the constructor parameters then the members.
    pub(crate) fn new(
        descriptor: Arc<ComponentDescriptor>,
        mut dependencies: Vec<Arc<dyn Instantiator>>,
        ledger: Option<LifecycleLedger>,
        catch_panics: bool,
    ) -> DiResult<Self> {
        let param_count = descriptor.injectable_constructor()?.params().len();
        let expected = param_count + descriptor.members().len();
        if dependencies.len() != expected {
            return Err(DiError::configuration(format!(
                "{} needs {} dependencies, got {}",
                descriptor.type_key(),
                expected,
                dependencies.len()
            )));
        }
        let members = dependencies.split_off(param_count);
        Ok(Self {
            descriptor,
            params: dependencies,
            members,
            ledger,
            catch_panics,
        })
    }
}

impl Instantiator for ClassInstantiator {
    fn produced_type(&self) -> TypeKey {
        self.descriptor.type_key()
    }

    fn instantiate(&self) -> DiResult<Option<Component>> {
        let ty = self.descriptor.type_key();
        let _span = tracing::trace_span!("construct", component = ty.short_name()).entered();

        let ctor = self.descriptor.injectable_constructor()?;
        let mut values = Vec::with_capacity(self.params.len());
        for (point, dependency) in ctor.params().iter().zip(&self.params) {
            let value = dependency.instantiate()?;
            check_null(point, &value)?;
            values.push(value);
        }

        let args = Arguments::new(ctor.params(), values);
        let mut obj = guarded(self.catch_panics, || (ctor.invoke)(&args))
            .map_err(|e| DiError::construction(format!("constructor of {}", ty), e))?;

        for (member, dependency) in self.descriptor.members().iter().zip(&self.members) {
            let value = dependency.instantiate()?;
            check_null(member.injection_point(), &value)?;
            guarded(self.catch_panics, || (member.apply)(&mut *obj, value)).map_err(|e| {
                DiError::construction(format!("member `{}` of {}", member.name, member.declared_by), e)
            })?;
        }

        for hook in self.descriptor.post_construct_hooks() {
            tracing::trace!(component = %ty, hook = hook.name, "running post-construct hook");
            guarded(self.catch_panics, || (hook.invoke)(&mut *obj)).map_err(|e| {
                DiError::construction(
                    format!("post-construct hook `{}` of {}", hook.name, hook.declared_by),
                    e,
                )
            })?;
        }

        let component = (self.descriptor.freeze)(obj)?;
        if let Some(ledger) = &self.ledger {
            ledger.register_with_teardown(component.clone(), self.descriptor.teardown(&component));
        }
        Ok(Some(component))
    }
}
