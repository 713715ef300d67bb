//! Resolution engine.
//!
//! This module is the entry point for everything between "here is a
//! dictionary and some options" and "here is a [`Resolution`](crate::Resolution)". It is split
//! into focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! Options ──┐
//!           │  Pipeline::assemble            (pipeline.rs)
//!           │    - built-ins by StageFlags
//!           │    - middlewares by value or by name
//!           │                 │
//!           │                 └─ registry lookups (registry.rs)
//!           v
//! Resolver::new(dictionary, options)         (resolver.rs)
//!           │
//! key ──────┼─ Resolver::lookup
//!           │    - fetch raw value
//!           │    - thread through stages, left to right
//!           │    - alias stages re-enter via lookup_in (child Context)
//!           v
//!      Resolution
//! ```
//!
//! ## Responsibilities by module
//!
//! - `pipeline.rs`: `StageFlags` and the ordered `Pipeline` built from options.
//! - `registry.rs`: the process-wide `name -> Stage` table.
//! - `resolver.rs`: `Resolver`, recursion bookkeeping and cycle detection.
//! - `metrics.rs`: opt-in timing data returned by `Resolver::lookup_verbose`.
//!
//! ## Debugging
//!
//! Set `VALUE_MAPPR_DEBUG=1` to print pipeline assembly, registry writes and
//! every lookup hop to stderr.

#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/pipeline.rs"]
mod pipeline;
#[path = "engine/registry.rs"]
mod registry;
#[path = "engine/resolver.rs"]
mod resolver;


pub use metrics::{LookupDetails, StageMetrics};
pub use pipeline::{Pipeline, StageFlags};
pub use registry::{register_stage, registered_names, registered_stage};
pub use resolver::Resolver;

/// Environment variable that switches on stderr tracing.
pub(crate) const DEBUG_ENV: &str = "VALUE_MAPPR_DEBUG";

pub(crate) fn debug_enabled() -> bool {
    std::env::var_os(DEBUG_ENV).is_some()
}
