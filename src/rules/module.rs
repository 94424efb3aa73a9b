use crate::error::DiResult;

use super::RuleSets;

/// A reusable group of bindings.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{DiResult, RuleModule, RuleSets, RuleSetsExt};
/// use std::sync::Arc;
///
/// struct PortModule(u16);
///
/// impl RuleModule for PortModule {
///     fn configure(self, rules: &mut RuleSets) -> DiResult<()> {
///         rules.bind::<u16>().to_instance(Arc::new(self.0));
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut rules = RuleSets::new();
/// rules.install(PortModule(8080))?;
/// assert_eq!(rules.len(), 1);
/// # Ok(())
/// # }
/// ```
pub trait RuleModule {
    /// Adds this module's bindings to `rules`.
    fn configure(self, rules: &mut RuleSets) -> DiResult<()>;
}

/// Module installation on [`RuleSets`].
pub trait RuleSetsExt {
    /// Installs `module`, returning the rule sets for chaining.
    fn install<M: RuleModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl RuleSetsExt for RuleSets {
    fn install<M: RuleModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.configure(self)?;
        Ok(self)
    }
}

impl<F> RuleModule for F
where
    F: FnOnce(&mut RuleSets) -> DiResult<()>,
{
    fn configure(self, rules: &mut RuleSets) -> DiResult<()> {
        self(rules)
    }
}
