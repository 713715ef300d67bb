//! Alias stage: a string value names another key.
//!
//! ```text
//! "b" ──lookup_in──▶ Resolution(b)
//!   aliases_used      = [b] ++ used(b)
//!   aliases_not_found = [b] if value(b) is None and not_found(b) is empty
//!                       ++ not_found(b)
//! ```
//!
//! The not-found rule keeps only the deepest failing key of a chain: once a
//! nested activation has reported the root cause, enclosing ones pass it on
//! without adding themselves.

use crate::{Context, Error, Resolution, Resolver, Value};

/// Stage entry point.
///
/// At the outermost activation the key being looked up is recorded first, so
/// `a -> "b" -> "c"` reports `[a, b, c]`.
pub(super) fn alias(resolver: &Resolver<'_>, context: &Context<'_>, value: Option<Value>) -> Result<Resolution, Error> {
    if !matches!(value, Some(Value::String(_))) {
        return Ok(Resolution::passthrough(value));
    }

    let mut out = Resolution::default();
    if context.is_root() {
        out.aliases_used.push(context.key().to_string());
    }
    let followed = follow(resolver, context, value)?;
    out.value = out.absorb(followed);
    Ok(out)
}

/// Resolve one value as an alias, without recording the current key.
///
/// Shared with the map stage, which applies it to every array element.
pub(super) fn follow(resolver: &Resolver<'_>, context: &Context<'_>, value: Option<Value>) -> Result<Resolution, Error> {
    let key = match value {
        Some(Value::String(key)) => key,
        other => return Ok(Resolution::passthrough(other)),
    };

    let nested = resolver.lookup_in(context, &key)?;

    let mut out = Resolution::default();
    out.aliases_used.push(key.clone());
    if nested.value.is_none() && nested.aliases_not_found.is_empty() {
        out.aliases_not_found.push(key);
    }
    out.value = out.absorb(nested);
    Ok(out)
}
