//! Envelope removal and identifier backfill for parsed model output.

use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The top-level JSON type a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Object,
}

/// Coerce a parsed reply into the expected shape.
///
/// For arrays, vendors sometimes wrap the list in an object under a key of
/// their own choosing; the first array-valued entry (in key order) is taken.
/// Anything that cannot be coerced becomes an empty array or `null`. This
/// function never fails.
pub fn normalize(value: Value, shape: Shape) -> Value {
    match (shape, value) {
        (Shape::Array, Value::Array(items)) => Value::Array(items),
        (Shape::Array, Value::Object(map)) => {
            let found = map.into_iter().find_map(|(key, v)| match v {
                Value::Array(items) => {
                    tracing::debug!(key = %key, "unwrapped array from object envelope");
                    Some(items)
                }
                _ => None,
            });
            Value::Array(found.unwrap_or_else(|| {
                tracing::warn!("expected an array but the reply had none");
                Vec::new()
            }))
        }
        (Shape::Array, other) => {
            tracing::warn!(kind = json_kind(&other), "expected an array");
            Value::Array(Vec::new())
        }
        (Shape::Object, Value::Object(map)) => Value::Object(map),
        (Shape::Object, other) => {
            tracing::warn!(kind = json_kind(&other), "expected an object");
            Value::Null
        }
    }
}

/// Give every object element without an `id` a fresh one.
///
/// Ids have the form `<prefix>-<stamp>-<index>`. The stamp is a millisecond
/// timestamp that is strictly increasing across calls in this process, so two
/// batches never mint the same id. Ids are not stable across calls.
///
/// An empty-string `id` counts as missing: strict decoding fills absent
/// fields with placeholders.
pub fn backfill_ids(items: &mut [Value], prefix: &str) {
    let stamp = batch_stamp();
    for (index, item) in items.iter_mut().enumerate() {
        let Value::Object(map) = item else {
            continue;
        };
        let has_id = match map.get("id") {
            Some(Value::String(id)) => !id.trim().is_empty(),
            Some(Value::Number(_)) => true,
            _ => false,
        };
        if !has_id {
            map.insert(
                "id".to_string(),
                Value::String(format!("{prefix}-{stamp}-{index}")),
            );
        }
    }
}

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

fn batch_stamp() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default();
    let previous = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
