//! Process-wide stage registry.
//!
//! Lets options refer to middlewares by name. The table starts with the three
//! built-ins (`alias`, `map`, `flatten`) and only grows through
//! [`register_stage`].
//!
//! Registering an existing name replaces the old entry without complaint; the
//! replaced stage is returned so callers can detect the overwrite. Pipelines
//! copy stages out at assembly time, so a later registration never changes a
//! resolver that already exists.

use crate::{Context, Error, Resolution, Resolver, Stage, Value, stages};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

static REGISTRY: Lazy<RwLock<HashMap<String, Stage>>> = Lazy::new(|| {
    let builtins = [stages::alias_stage(), stages::map_stage(), stages::flatten_stage()];
    RwLock::new(builtins.into_iter().map(|stage| (stage.name().to_string(), stage)).collect())
});

/// Register `func` under `name`, returning the stage it replaced, if any.
pub fn register_stage<F>(name: impl Into<String>, func: F) -> Option<Stage>
where
    F: Fn(&Resolver<'_>, &Context<'_>, Option<Value>) -> Result<Resolution, Error> + Send + Sync + 'static,
{
    let name = name.into();
    let stage = Stage::new(name.clone(), func);

    let mut table = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    let previous = table.insert(name.clone(), stage);

    if super::debug_enabled() {
        eprintln!("[registry] registered=\"{}\" replaced={}", name, previous.is_some());
    }
    previous
}

/// Look up a stage by name.
pub fn registered_stage(name: &str) -> Option<Stage> {
    REGISTRY.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
}

/// All registered names, sorted.
pub fn registered_names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_preregistered() {
        let names = registered_names();
        for builtin in ["alias", "map", "flatten"] {
            assert!(names.iter().any(|n| n == builtin), "missing {builtin}");
            assert_eq!(registered_stage(builtin).map(|s| s.name().to_string()), Some(builtin.to_string()));
        }
    }

    #[test]
    fn registering_twice_overwrites_and_returns_previous() {
        let first = register_stage("registry_test_overwrite", |_, _, _| Ok(Resolution::passthrough(None)));
        assert!(first.is_none());

        let second = register_stage("registry_test_overwrite", |_, _, value| Ok(Resolution::passthrough(value)));
        assert_eq!(second.map(|s| s.name().to_string()), Some("registry_test_overwrite".to_string()));
        assert!(registered_stage("registry_test_overwrite").is_some());
    }

    #[test]
    fn concurrent_registration_and_lookup() {
        std::thread::scope(|scope| {
            for i in 0..4 {
                scope.spawn(move || {
                    register_stage(format!("registry_test_concurrent_{i}"), |_, _, value| Ok(Resolution::passthrough(value)))
                });
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert!(registered_stage("map").is_some());
                    }
                });
            }
        });

        let names = registered_names();
        for i in 0..4 {
            let name = format!("registry_test_concurrent_{i}");
            assert!(names.contains(&name), "missing {name}");
        }
    }

    #[test]
    fn unknown_names_are_absent() {
        assert!(registered_stage("registry_test_never_registered").is_none());
    }
}
