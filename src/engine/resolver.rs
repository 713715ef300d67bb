//! The resolver.
//!
//! A `Resolver` pairs a borrowed dictionary with an assembled [`Pipeline`]
//! and answers `lookup(key)` queries. It keeps no per-call state: each lookup
//! lives entirely in its own activation, described by a [`Context`] that
//! links back to the activation that triggered it.
//!
//! ```text
//! lookup("a")                      Context { key: "a", parent: None }
//!   └─ alias stage: "b"
//!        └─ lookup_in(ctx, "b")    Context { key: "b", parent: "a" }
//!             └─ alias stage: "c"
//!                  └─ lookup_in    Context { key: "c", parent: "b" }
//! ```
//!
//! ## Cycles
//!
//! Before descending, `lookup_in` checks whether the key is already being
//! resolved by an enclosing activation. A repeat fails with
//! [`Error::AliasCycle`] instead of recursing forever. Only ancestors count:
//! the same key resolved twice side by side (for example two equal array
//! elements) is fine.

use super::metrics::{LookupDetails, StageMetrics};
use super::pipeline::Pipeline;
use crate::api::Options;
use crate::{Context, Dictionary, Error, Resolution, Value};
use std::time::Instant;

/// Resolves keys of one dictionary with one fixed pipeline.
///
/// Create it once per dictionary/options pair and reuse it for any number of
/// lookups. The dictionary is only ever read.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    dictionary: &'a Dictionary,
    options: Options,
    pipeline: Pipeline,
}

impl<'a> Resolver<'a> {
    /// Assemble the pipeline for `options` and bind it to `dictionary`.
    ///
    /// Fails only when a named middleware is not registered.
    pub fn new(dictionary: &'a Dictionary, options: Options) -> Result<Self, Error> {
        let pipeline = Pipeline::assemble(&options)?;
        Ok(Resolver { dictionary, options, pipeline })
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dictionary
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Resolve `key`.
    ///
    /// An absent key is not an error: it resolves to `value: None`. The only
    /// failure is an alias cycle.
    pub fn lookup(&self, key: &str) -> Result<Resolution, Error> {
        let context = Context::root(key);
        self.run(&context, None)
    }

    /// Resolve `key` on behalf of the activation `parent`.
    ///
    /// This is the recursive entry point stages use.
    pub fn lookup_in(&self, parent: &Context<'_>, key: &str) -> Result<Resolution, Error> {
        if parent.contains(key) {
            let mut chain = parent.chain();
            chain.push(key.to_string());
            if super::debug_enabled() {
                eprintln!("[lookup:cycle] chain={:?}", chain);
            }
            return Err(Error::AliasCycle { chain });
        }

        let context = parent.child(key);
        self.run(&context, None)
    }

    /// Like [`lookup`](Self::lookup), but also reports the raw value and how
    /// long each stage of the outermost activation took.
    pub fn lookup_verbose(&self, key: &str) -> Result<LookupDetails, Error> {
        let total_start = Instant::now();
        let context = Context::root(key);
        let mut stages = Vec::with_capacity(self.pipeline.len());
        let resolution = self.run(&context, Some(&mut stages))?;

        Ok(LookupDetails {
            key: key.to_string(),
            raw: self.dictionary.get(key).cloned(),
            resolution,
            total: total_start.elapsed(),
            stages,
        })
    }

    /// Thread the raw value for `context.key()` through every stage.
    ///
    /// ```text
    /// raw ──▶ stage[0] ──▶ stage[1] ──▶ ... ──▶ value
    ///            │            │
    ///            └── provenance concatenated in stage order
    /// ```
    fn run(&self, context: &Context<'_>, mut metrics: Option<&mut Vec<StageMetrics>>) -> Result<Resolution, Error> {
        let mut value: Option<Value> = self.dictionary.get(context.key()).cloned();
        let debug = super::debug_enabled();

        if debug {
            eprintln!("[lookup] key=\"{}\" depth={} raw={}", context.key(), context.depth(), preview(&value));
        }

        let mut out = Resolution::default();
        for stage in self.pipeline.stages() {
            let stage_start = Instant::now();
            let before = metrics.is_some().then(|| value.clone());

            let delta = stage.apply(self, context, value)?;

            if let Some(metrics) = metrics.as_mut() {
                metrics.push(StageMetrics {
                    stage: stage.name().to_string(),
                    duration: stage_start.elapsed(),
                    aliases_used: delta.aliases_used.len(),
                    aliases_not_found: delta.aliases_not_found.len(),
                    changed: before.as_ref() != Some(&delta.value),
                });
            }
            if debug && delta.has_provenance() {
                eprintln!(
                    "[lookup:stage] key=\"{}\" stage=\"{}\" used={:?} not_found={:?}",
                    context.key(),
                    stage.name(),
                    delta.aliases_used,
                    delta.aliases_not_found
                );
            }

            value = out.absorb(delta);
        }

        if debug {
            eprintln!("[lookup:done] key=\"{}\" depth={} value={}", context.key(), context.depth(), preview(&value));
        }

        out.value = value;
        Ok(out)
    }
}

fn preview(value: &Option<Value>) -> String {
    match value {
        Some(v) => v.to_string().chars().take(80).collect(),
        None => "<undefined>".to_string(),
    }
}
