//! Built-in stages.
//!
//! Each stage is a plain function with the [`StageFn`](crate::StageFn)
//! signature, wrapped into a named [`Stage`] here:
//!
//! ```text
//! Option<Value> ──┬─ alias   -> string: recursive lookup, else passthrough
//!                 ├─ map     -> array: alias per element, else passthrough
//!                 └─ flatten -> array: collapse nesting, else passthrough
//! ```
//!
//! Values are dispatched on their `serde_json::Value` variant; nothing is
//! coerced.

mod alias;
mod flatten;
mod map;

use crate::Stage;

pub(crate) const ALIAS: &str = "alias";
pub(crate) const MAP: &str = "map";
pub(crate) const FLATTEN: &str = "flatten";

pub(crate) fn alias_stage() -> Stage {
    Stage::new(ALIAS, alias::alias)
}

pub(crate) fn map_stage() -> Stage {
    Stage::new(MAP, map::map)
}

pub(crate) fn flatten_stage() -> Stage {
    Stage::new(FLATTEN, flatten::flatten)
}
