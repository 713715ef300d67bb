//! Alias-chain value resolution over JSON dictionaries.
//!
//! A [`Resolver`] looks up a key in a dictionary and threads the raw value
//! through a fixed pipeline of stages:
//!
//! ```text
//! dictionary[key] ──▶ alias ──▶ map ──▶ flatten ──▶ middlewares... ──▶ Resolution
//!                       │         │
//!                       └─────────┴─ recursive lookups for string values
//! ```
//!
//! Every [`Resolution`] carries provenance: the alias keys visited while
//! resolving (`aliases_used`) and the root cause of a dangling chain
//! (`aliases_not_found`).
//!
//! # Example
//! ```
//! use serde_json::json;
//! use value_mappr::{Options, Resolver};
//!
//! let dictionary = json!({ "a": "b", "b": "c", "c": 42 });
//! let dictionary = dictionary.as_object().unwrap();
//!
//! let resolver = Resolver::new(dictionary, Options::new().with_alias()).unwrap();
//! let res = resolver.lookup("a").unwrap();
//!
//! assert_eq!(res.value, Some(json!(42)));
//! assert_eq!(res.aliases_used, vec!["a", "b", "c"]);
//! assert!(res.aliases_not_found.is_empty());
//! ```

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

mod api;
mod engine;
mod stages;

pub use api::{FlattenDepth, Middleware, Options, OptionsConfig, map_all, resolve};
pub use engine::{
    LookupDetails, Pipeline, Resolver, StageFlags, StageMetrics, register_stage, registered_names, registered_stage,
};
pub use serde_json::Value;

/// The mapping a [`Resolver`] reads from. Insertion ordered.
pub type Dictionary = serde_json::Map<String, Value>;

// --- Resolution --------------------------------------------------------------

/// Outcome of resolving a key: the value plus how it was derived.
///
/// `value` is `None` when the key (or the end of its alias chain) is absent
/// from the dictionary. Serializes with camelCase field names and omits a
/// missing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Alias keys visited, in visitation order.
    pub aliases_used: Vec<String>,
    /// At most one key per chain: the deepest alias whose lookup produced nothing.
    pub aliases_not_found: Vec<String>,
}

impl Resolution {
    /// A resolution that carries `value` untouched and records no provenance.
    pub fn passthrough(value: Option<Value>) -> Self {
        Resolution { value, aliases_used: Vec::new(), aliases_not_found: Vec::new() }
    }

    /// True when a value was found.
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    /// True when the resolution visited an alias or reported one missing.
    pub fn has_provenance(&self) -> bool {
        !self.aliases_used.is_empty() || !self.aliases_not_found.is_empty()
    }

    /// Append `other`'s provenance to ours (order preserved, no dedup) and
    /// hand back its value.
    pub fn absorb(&mut self, other: Resolution) -> Option<Value> {
        self.aliases_used.extend(other.aliases_used);
        self.aliases_not_found.extend(other.aliases_not_found);
        other.value
    }
}

// --- Context -----------------------------------------------------------------

/// Per-call bookkeeping for one activation of a lookup.
///
/// Contexts form a chain on the call stack: each recursive lookup links to the
/// activation that triggered it. Nothing here outlives the outermost call.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    key: &'a str,
    parent: Option<&'a Context<'a>>,
}

impl<'a> Context<'a> {
    pub(crate) fn root(key: &'a str) -> Self {
        Context { key, parent: None }
    }

    pub(crate) fn child(&'a self, key: &'a str) -> Context<'a> {
        Context { key, parent: Some(self) }
    }

    /// Key currently being resolved.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// The activation that triggered this one, if any.
    pub fn parent(&self) -> Option<&'a Context<'a>> {
        self.parent
    }

    /// True for the outermost activation (the key passed to `lookup`).
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of enclosing activations; the root has depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = self.parent;
        while let Some(ctx) = cur {
            depth += 1;
            cur = ctx.parent;
        }
        depth
    }

    /// True if `key` is being resolved by this activation or one enclosing it.
    pub fn contains(&self, key: &str) -> bool {
        let mut cur = Some(self);
        while let Some(ctx) = cur {
            if ctx.key == key {
                return true;
            }
            cur = ctx.parent;
        }
        false
    }

    /// Keys from the outermost activation down to this one.
    pub fn chain(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.depth() + 1);
        let mut cur = Some(self);
        while let Some(ctx) = cur {
            keys.push(ctx.key.to_string());
            cur = ctx.parent;
        }
        keys.reverse();
        keys
    }
}

// --- Stages ------------------------------------------------------------------

/// Signature shared by every stage: built-ins, registered and ad-hoc ones.
pub type StageFn = dyn Fn(&Resolver<'_>, &Context<'_>, Option<Value>) -> Result<Resolution, Error> + Send + Sync;

/// A named pipeline step.
///
/// A stage receives the previous stage's value and returns the transformed
/// value plus its provenance delta. It may call back into
/// [`Resolver::lookup_in`] to resolve other keys.
#[derive(Clone)]
pub struct Stage {
    name: Cow<'static, str>,
    func: Arc<StageFn>,
}

impl Stage {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&Resolver<'_>, &Context<'_>, Option<Value>) -> Result<Resolution, Error> + Send + Sync + 'static,
    {
        Stage { name: name.into(), func: Arc::new(func) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the stage on `value` in `context`.
    pub fn apply(
        &self,
        resolver: &Resolver<'_>,
        context: &Context<'_>,
        value: Option<Value>,
    ) -> Result<Resolution, Error> {
        (self.func)(resolver, context, value)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).field("func", &"<function>").finish()
    }
}

// --- Errors ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A middleware was referenced by name but nothing is registered under it.
    #[error("no stage registered under \"{0}\"")]
    UnknownStage(String),
    /// An alias chain came back to a key that is still being resolved.
    /// `chain` lists the keys from the outermost lookup to the repeated one.
    #[error("alias cycle: {}", chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_chain_and_depth() {
        let root = Context::root("a");
        let b = root.child("b");
        let c = b.child("c");

        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(c.depth(), 2);
        assert_eq!(c.chain(), vec!["a", "b", "c"]);
        assert!(c.contains("a"));
        assert!(!b.contains("c"));
        assert_eq!(c.parent().map(|p| p.key()), Some("b"));
    }

    #[test]
    fn absorb_concatenates_without_dedup() {
        let mut acc = Resolution::passthrough(None);
        acc.aliases_used.push("a".into());
        let value = acc.absorb(Resolution {
            value: Some(json!(1)),
            aliases_used: vec!["a".into(), "b".into()],
            aliases_not_found: vec!["z".into()],
        });

        assert_eq!(value, Some(json!(1)));
        assert_eq!(acc.aliases_used, vec!["a", "a", "b"]);
        assert_eq!(acc.aliases_not_found, vec!["z"]);
    }

    #[test]
    fn serialization_omits_missing_value() {
        let res = Resolution { value: None, aliases_used: vec!["c".into()], aliases_not_found: vec!["c".into()] };
        let out = serde_json::to_value(&res).unwrap();
        assert_eq!(out, json!({ "aliasesUsed": ["c"], "aliasesNotFound": ["c"] }));
    }

    #[test]
    fn error_messages() {
        assert_eq!(Error::UnknownStage("upper".into()).to_string(), "no stage registered under \"upper\"");
        let cycle = Error::AliasCycle { chain: vec!["a".into(), "b".into(), "a".into()] };
        assert_eq!(cycle.to_string(), "alias cycle: a -> b -> a");
    }
}
