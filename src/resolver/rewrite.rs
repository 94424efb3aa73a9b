//! Rule selection and the rewrite chain.

use crate::cache_policy::CachePolicy;
use crate::catalog::ComponentCatalog;
use crate::context::{Context, ContextMatch};
use crate::desire::Desire;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::rules::{BindRule, RuleSets};
use crate::satisfaction::Satisfaction;

type RuleId = (usize, usize);

/// Outcome of rewriting a desire to its final form.
pub(crate) struct Rewritten {
    pub(crate) desire: Desire,
    pub(crate) satisfaction: Satisfaction,
    pub(crate) policy: CachePolicy,
}

/// Best rule for `desire` among the applicable scopes.
///
/// Candidates are ordered by context match first, then by weight (lowest
/// first), then by the specificity of the rule's qualifier matcher. Two
/// distinct rules tying on all of these make the binding ambiguous.
fn select<'r>(
    rules: &'r RuleSets,
    scopes: &[(usize, ContextMatch)],
    desire: &Desire,
    applied: &[RuleId],
) -> DiResult<Option<(RuleId, &'r BindRule)>> {
    let mut best: Option<(ContextMatch, RuleId, &'r BindRule)> = None;
    let mut tie: Option<&'r BindRule> = None;

    for &(scope, context_match) in scopes {
        for (index, rule) in rules.scopes()[scope].rules().iter().enumerate() {
            let id = (scope, index);
            if applied.contains(&id) || !rule.matches(desire) {
                continue;
            }
            let Some((best_match, _, best_rule)) = best else {
                best = Some((context_match, id, rule));
                continue;
            };
            let order = context_match
                .cmp(&best_match)
                .then_with(|| rule.weight().cmp(&best_rule.weight()))
                .then_with(|| rule.qualifier().compare(best_rule.qualifier()));
            match order {
                std::cmp::Ordering::Less => {
                    best = Some((context_match, id, rule));
                    tie = None;
                }
                std::cmp::Ordering::Equal if rule != best_rule => {
                    tie.get_or_insert(rule);
                }
                _ => {}
            }
        }
    }

    match (best, tie) {
        (Some((_, _, first)), Some(second)) => Err(DiError::AmbiguousBinding {
            desire: desire.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }),
        (best, _) => Ok(best.map(|(_, id, rule)| (id, rule))),
    }
}

/// Applies rules to `desire` until none is left or a terminating rule fires.
///
/// Each rule is applied at most once per chain. Reaching a type already seen
/// earlier in the chain is a cycle; rebinding a type to itself is not.
pub(crate) fn rewrite(
    rules: &RuleSets,
    catalog: &ComponentCatalog,
    desire: &Desire,
    context: &Context,
) -> DiResult<Rewritten> {
    let scopes = rules.applicable(context, catalog);
    let mut applied: Vec<RuleId> = Vec::new();
    let mut chain: Vec<TypeKey> = vec![desire.desired_type()];
    let mut current = desire.clone();
    let mut policy = CachePolicy::NoPreference;
    let mut terminated = false;

    while let Some((id, rule)) = select(rules, &scopes, &current, &applied)? {
        tracing::trace!(rule = %rule, desire = %current, "applying bind rule");
        applied.push(id);
        let next = rule.apply(&current);
        policy = rule.cache_policy().or(policy);

        let next_type = next.desired_type();
        if next_type != current.desired_type() {
            if chain.contains(&next_type) {
                let mut path: Vec<&'static str> = chain.iter().map(|t| t.display_name()).collect();
                path.push(next_type.display_name());
                return Err(DiError::Cyclic(path));
            }
            chain.push(next_type);
        }
        current = next;

        if rule.terminates_chain() {
            terminated = true;
            break;
        }
    }

    let satisfaction = match current.satisfaction() {
        Some(s) => s.clone(),
        None => catalog
            .default_satisfaction(&current.desired_type())?
            .ok_or_else(|| {
                let reason = if terminated { ", chain terminated" } else { "" };
                DiError::Unresolvable(format!("{}{}", current, reason))
            })?,
    };

    Ok(Rewritten {
        desire: current,
        satisfaction,
        policy,
    })
}
