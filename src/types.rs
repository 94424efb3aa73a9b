//! Type relation queries over declared superclass chains.

use crate::key::TypeKey;

// Bound on chain walks, guards against malformed (cyclic) declarations
const MAX_CHAIN: usize = 256;

/// Source of linear superclass relations between types.
///
/// Only the single declared superclass is followed. Trait implementations are
/// not part of the chain.
pub trait TypeHierarchy {
    /// Direct superclass of `ty`, if one was declared.
    fn superclass(&self, ty: &TypeKey) -> Option<TypeKey>;
}

/// A hierarchy with no declared relations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatHierarchy;

impl TypeHierarchy for FlatHierarchy {
    fn superclass(&self, _ty: &TypeKey) -> Option<TypeKey> {
        None
    }
}

/// Number of superclass steps from `child` up to `ancestor`.
///
/// Returns `Some(0)` for equal types and `None` when `ancestor` is not on the
/// superclass chain of `child`.
pub fn type_distance<H>(hierarchy: &H, child: &TypeKey, ancestor: &TypeKey) -> Option<usize>
where
    H: TypeHierarchy + ?Sized,
{
    let mut current = *child;
    for distance in 0..MAX_CHAIN {
        if current == *ancestor {
            return Some(distance);
        }
        current = hierarchy.superclass(&current)?;
    }
    None
}
