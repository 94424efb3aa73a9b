//! Resolved constructor arguments.

use std::sync::Arc;

use crate::component::Component;
use crate::desire::InjectionPoint;
use crate::error::{DiError, DiResult};

/// Constructor arguments, placed by parameter index.
///
/// Required parameters have already been checked for null values before the
/// constructor runs; optional parameters may be absent.
pub struct Arguments<'a> {
    points: &'a [InjectionPoint],
    values: Vec<Option<Component>>,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(points: &'a [InjectionPoint], values: Vec<Option<Component>>) -> Self {
        debug_assert_eq!(points.len(), values.len());
        Self { points, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The injection point declared for parameter `index`.
    pub fn point(&self, index: usize) -> Option<&InjectionPoint> {
        self.points.get(index)
    }

    /// Required argument at `index`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.optional(index)?.ok_or_else(|| {
            let point = self.points.get(index).map(ToString::to_string);
            DiError::NullDependency(point.unwrap_or_default())
        })
    }

    /// Argument at `index`, `None` when a null was injected.
    pub fn optional<T: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> DiResult<Option<Arc<T>>> {
        let slot = self.values.get(index).ok_or_else(|| {
            DiError::configuration(format!(
                "argument index {} out of range ({} parameters)",
                index,
                self.values.len()
            ))
        })?;
        slot.as_ref().map(Component::downcast::<T>).transpose()
    }
}
