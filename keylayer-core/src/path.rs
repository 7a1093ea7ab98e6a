//! Dot-path traversal over nested JSON value trees.
//!
//! All three operations descend a [`serde_json::Value`] tree one path
//! segment at a time, consuming the path left to right exactly once. A
//! segment landing on a sequence maps the remaining path over every
//! element, so a single path can address zero, one or many values
//! depending on how many arrays it crosses.
//!
//! Missing data is never an error here: absent nodes short-circuit to
//! `None`, empty collections, or a silent no-op. The functions are fully
//! generic over the tree shape (scalar, sequence, mapping) and never
//! reflect over concrete document types.

use serde_json::Value;
use std::collections::HashMap;

/// Reads the value addressed by `path`, in its denormalized shape.
///
/// Crossing a sequence yields a `Value::Array` of the per-element results
/// with nulls compacted away; a path that never crosses a sequence yields
/// the addressed value itself. Absent or null nodes yield `None`.
pub fn get(root: &Value, path: &str) -> Option<Value> {
    let segments: Vec<&str> = path.split('.').collect();

    get_inner(root, &segments)
}

fn get_inner(node: &Value, segments: &[&str]) -> Option<Value> {
    if segments.is_empty() {
        return match node {
            Value::Null => None,
            other => Some(other.clone()),
        };
    }

    match node {
        // A sequence mid-path: map the remaining path over every element,
        // compacting elements that resolve to nothing.
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| get_inner(item, segments))
                .collect(),
        )),
        Value::Object(map) => match map.get(segments[0]) {
            Some(child) => get_inner(child, &segments[1..]),
            None => None,
        },
        _ => None,
    }
}

/// Collects every non-null leaf value addressed by `path`, fully
/// flattened across any sequences the path crosses.
///
/// This is the reference-id collection step of populate: unlike [`get`] it
/// never nests results, no matter how many arrays sit along the path.
pub fn collect(root: &Value, path: &str) -> Vec<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();

    collect_inner(root, &segments, &mut out);
    out
}

fn collect_inner(node: &Value, segments: &[&str], out: &mut Vec<Value>) {
    match node {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                collect_inner(item, segments, out);
            }
        }
        Value::Object(map) => {
            if segments.is_empty() {
                out.push(node.clone());
            } else if let Some(child) = map.get(segments[0]) {
                collect_inner(child, &segments[1..], out);
            }
        }
        scalar => {
            if segments.is_empty() {
                out.push(scalar.clone());
            }
        }
    }
}

/// Replaces the field addressed by `path` in place, looking replacements up
/// in `source` by the stringified identifier of the current field value.
///
/// At the final segment, a sequence field maps every element through
/// `source` (a missing entry becomes `Null`); a scalar field is replaced
/// wholesale, or left untouched when it is already `Null`. Intermediate
/// sequences recurse into each element; absent intermediates are a no-op.
///
/// Takes exclusive mutable access to the tree for the duration of the call.
pub fn replace(root: &mut Value, source: &HashMap<String, Value>, path: &str) {
    let segments: Vec<&str> = path.split('.').collect();

    replace_inner(root, source, &segments);
}

fn replace_inner(node: &mut Value, source: &HashMap<String, Value>, segments: &[&str]) {
    match node {
        Value::Array(items) => {
            for item in items {
                replace_inner(item, source, segments);
            }
        }
        Value::Object(map) => {
            let [segment, rest @ ..] = segments else {
                return;
            };

            let Some(child) = map.get_mut(*segment) else {
                return;
            };

            if rest.is_empty() {
                match child {
                    Value::Null => {}
                    Value::Array(items) => {
                        for item in items.iter_mut() {
                            let replacement = source
                                .get(&crate::document::ref_key(item))
                                .cloned()
                                .unwrap_or(Value::Null);
                            *item = replacement;
                        }
                    }
                    field => {
                        let replacement = source
                            .get(&crate::document::ref_key(field))
                            .cloned()
                            .unwrap_or(Value::Null);
                        *field = replacement;
                    }
                }
            } else {
                replace_inner(child, source, rest);
            }
        }
        _ => {}
    }
}
