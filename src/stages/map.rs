//! Map stage: resolve every element of an array as an alias.
//!
//! Only alias resolution is applied per element; `map` and `flatten` are not
//! re-entered, so nested arrays inside the array are left as they are.
//! An element that resolves to nothing becomes `null`.

use super::alias::follow;
use crate::{Context, Error, Resolution, Resolver, Value};

pub(super) fn map(resolver: &Resolver<'_>, context: &Context<'_>, value: Option<Value>) -> Result<Resolution, Error> {
    let items = match value {
        Some(Value::Array(items)) => items,
        other => return Ok(Resolution::passthrough(other)),
    };

    let mut out = Resolution::default();
    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        let element = follow(resolver, context, Some(item))?;
        mapped.push(out.absorb(element).unwrap_or(Value::Null));
    }

    out.value = Some(Value::Array(mapped));
    Ok(out)
}
