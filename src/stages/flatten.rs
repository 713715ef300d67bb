//! Flatten stage: collapse nested arrays.
//!
//! Purely structural, so it never records provenance. How far it flattens is
//! taken from the resolver's options ([`FlattenDepth`]).

use crate::api::FlattenDepth;
use crate::{Context, Error, Resolution, Resolver, Value};

pub(super) fn flatten(resolver: &Resolver<'_>, _context: &Context<'_>, value: Option<Value>) -> Result<Resolution, Error> {
    match value {
        Some(Value::Array(items)) => {
            let flat = flatten_values(items, resolver.options().flatten_depth);
            Ok(Resolution::passthrough(Some(Value::Array(flat))))
        }
        other => Ok(Resolution::passthrough(other)),
    }
}

/// Flatten `items` by `depth`.
///
/// ```text
/// [[1, [2]], 3]  Shallow -> [1, [2], 3]
///                Deep    -> [1, 2, 3]
/// ```
fn flatten_values(items: Vec<Value>, depth: FlattenDepth) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match (item, depth) {
            (Value::Array(inner), FlattenDepth::Shallow) => out.extend(inner),
            (Value::Array(inner), FlattenDepth::Deep) => out.extend(flatten_values(inner, depth)),
            (other, _) => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dictionary, Options};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn array(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            other => panic!("expected array, got {other}"),
        }
    }

    #[test]
    fn shallow_removes_one_level() {
        let flat = flatten_values(array(json!([[1, [2]], 3, []])), FlattenDepth::Shallow);
        assert_eq!(Value::Array(flat), json!([1, [2], 3]));
    }

    #[test]
    fn deep_removes_every_level() {
        let flat = flatten_values(array(json!([[1, [2, [[3]]]], 4, [[]]])), FlattenDepth::Deep);
        assert_eq!(Value::Array(flat), json!([1, 2, 3, 4]));
    }

    #[test]
    fn objects_inside_arrays_are_kept() {
        let flat = flatten_values(array(json!([[{ "a": [1] }], "s"])), FlattenDepth::Deep);
        assert_eq!(Value::Array(flat), json!([{ "a": [1] }, "s"]));
    }

    #[test]
    fn stage_flattens_without_provenance() {
        let dict: Dictionary = json!({ "x": [[1, 2], [3]] }).as_object().cloned().unwrap();
        let resolver = Resolver::new(&dict, Options::new().with_flatten()).unwrap();

        let res = resolver.lookup("x").unwrap();
        assert_eq!(res.value, Some(json!([1, 2, 3])));
        assert!(!res.has_provenance());
    }

    #[test]
    fn stage_passes_scalars_through() {
        let dict: Dictionary = json!({ "x": 3 }).as_object().cloned().unwrap();
        let resolver = Resolver::new(&dict, Options::new().with_flatten()).unwrap();

        assert_eq!(resolver.lookup("x").unwrap().value, Some(json!(3)));
        assert_eq!(resolver.lookup("missing").unwrap().value, None);
    }
}
