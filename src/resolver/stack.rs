//! Cycle and depth detection for one resolution.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::satisfaction::SatisfactionKey;

/// The satisfactions currently being resolved, outermost first.
///
/// Each `resolve` call owns its stack, so concurrent resolutions never see
/// each other's frames.
pub(crate) struct ResolutionStack {
    frames: RefCell<Vec<(SatisfactionKey, &'static str)>>,
    max_depth: usize,
}

/// Pops its frame when dropped, including on early error returns.
pub(crate) struct StackGuard<'a> {
    stack: &'a ResolutionStack,
    key: SatisfactionKey,
}

impl ResolutionStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
            max_depth,
        }
    }

    /// Pushes a frame for `key`.
    ///
    /// Fails with the full path when `key` is already on the stack, or when
    /// the maximum depth is reached.
    pub(crate) fn enter(&self, key: SatisfactionKey, name: &'static str) -> DiResult<StackGuard<'_>> {
        let mut frames = self.frames.borrow_mut();

        // Circular detection before pushing the new frame
        if frames.iter().any(|(k, _)| *k == key) {
            let mut path: Vec<&'static str> = frames.iter().map(|(_, n)| *n).collect();
            path.push(name);
            return Err(DiError::Cyclic(path));
        }

        if frames.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(frames.len()));
        }

        frames.push((key, name));
        Ok(StackGuard { stack: self, key })
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        if let Some((last, _)) = self.stack.frames.borrow_mut().pop() {
            debug_assert_eq!(last, self.key);
        }
    }
}
