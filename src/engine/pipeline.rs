//! Pipeline assembly.
//!
//! This module holds the *static* side of the engine: the ordered list of
//! stages a [`Resolver`](super::Resolver) runs for every lookup. It is built
//! once, at resolver construction, and never changes afterwards.
//!
//! ## Ordering
//!
//! ```text
//! [alias] -> [map] -> [flatten] -> middlewares (in the order supplied)
//! ```
//!
//! - `alias` runs before `map` so a single string alias and an array of
//!   aliases are handled the same way.
//! - `flatten` runs after `map` so arrays produced by resolving element
//!   aliases get collapsed.
//!
//! Built-ins are enabled through [`StageFlags`]. Middlewares are either
//! stages passed by value or names looked up in the registry (see
//! `registry.rs`); an unknown name fails assembly.

use super::registry;
use crate::api::{Middleware, Options};
use crate::{Error, Stage, stages};

bitflags::bitflags! {
    /// Built-in stages that a pipeline includes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StageFlags: u8 {
        /// Follow string values as keys, recursively.
        const ALIAS   = 1 << 0;
        /// Resolve each element of an array value as an alias.
        const MAP     = 1 << 1;
        /// Flatten nested arrays.
        const FLATTEN = 1 << 2;
    }
}

impl Default for StageFlags {
    fn default() -> Self {
        StageFlags::empty()
    }
}

/// Ordered, immutable stage sequence.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Build the pipeline described by `options`.
    ///
    /// Fails with [`Error::UnknownStage`] when a named middleware is not
    /// registered. Built-ins always come from the crate itself, so
    /// re-registering `"alias"` only affects pipelines that name it as a
    /// middleware.
    pub fn assemble(options: &Options) -> Result<Self, Error> {
        let mut ordered = Vec::with_capacity(3 + options.middlewares.len());

        if options.stages.contains(StageFlags::ALIAS) {
            ordered.push(stages::alias_stage());
        }
        if options.stages.contains(StageFlags::MAP) {
            ordered.push(stages::map_stage());
        }
        if options.stages.contains(StageFlags::FLATTEN) {
            ordered.push(stages::flatten_stage());
        }

        for middleware in &options.middlewares {
            let stage = match middleware {
                Middleware::Stage(stage) => stage.clone(),
                Middleware::Named(name) => {
                    registry::registered_stage(name).ok_or_else(|| Error::UnknownStage(name.clone()))?
                }
            };
            ordered.push(stage);
        }

        let pipeline = Pipeline { stages: ordered };
        if super::debug_enabled() {
            eprintln!("[pipeline] stages={:?}", pipeline.names());
        }
        Ok(pipeline)
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Resolution, register_stage};

    #[test]
    fn builtins_follow_fixed_order() {
        let options = Options::new().with_flatten().with_alias().with_map();
        let pipeline = Pipeline::assemble(&options).unwrap();
        assert_eq!(pipeline.names(), vec!["alias", "map", "flatten"]);
    }

    #[test]
    fn empty_options_build_empty_pipeline() {
        let pipeline = Pipeline::assemble(&Options::new()).unwrap();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.len(), 0);
    }

    #[test]
    fn middlewares_are_appended_in_order() {
        register_stage("pipeline_test_noop", |_, _, value| Ok(Resolution::passthrough(value)));
        let direct = Stage::new("direct", |_, _, value| Ok(Resolution::passthrough(value)));

        let options = Options::new()
            .with_map()
            .with_middleware(direct)
            .with_middleware("pipeline_test_noop")
            .with_middleware("flatten");
        let pipeline = Pipeline::assemble(&options).unwrap();

        assert_eq!(pipeline.names(), vec!["map", "direct", "pipeline_test_noop", "flatten"]);
    }

    #[test]
    fn unknown_named_middleware_fails() {
        let options = Options::new().with_alias().with_middleware("definitely_not_registered");
        let err = Pipeline::assemble(&options).unwrap_err();
        assert_eq!(err, Error::UnknownStage("definitely_not_registered".into()));
    }
}
