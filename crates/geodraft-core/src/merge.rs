//! Deep merge of JSON option trees.
//!
//! Option bundles arrive as loosely shaped JSON and are layered over typed
//! defaults before deserialization. The merge walks both trees with an
//! explicit worklist of disjoint `(target, origin)` slot pairs.

use serde_json::Value;

/// Merge `origin` into `target`.
///
/// - objects merge key by key and arrays index by index;
/// - a `null` or missing target slot takes a copy of the origin value;
/// - a `null` origin value never overwrites an existing target value;
/// - when both sides are present but of different JSON types, the target wins;
/// - scalars from `origin` overwrite scalars in `target`.
pub fn merge(target: &mut Value, origin: &Value) {
    let mut stack: Vec<(&mut Value, &Value)> = vec![(target, origin)];

    while let Some((target, origin)) = stack.pop() {
        if origin.is_null() {
            continue;
        }
        if target.is_null() {
            *target = origin.clone();
            continue;
        }

        match (target, origin) {
            (Value::Object(target_map), Value::Object(origin_map)) => {
                for key in origin_map.keys() {
                    if !target_map.contains_key(key) {
                        target_map.insert(key.clone(), Value::Null);
                    }
                }
                for (key, slot) in target_map.iter_mut() {
                    if let Some(value) = origin_map.get(key) {
                        stack.push((slot, value));
                    }
                }
            }
            (Value::Array(target_items), Value::Array(origin_items)) => {
                if target_items.len() < origin_items.len() {
                    target_items.resize(origin_items.len(), Value::Null);
                }
                for (slot, value) in target_items.iter_mut().zip(origin_items) {
                    stack.push((slot, value));
                }
            }
            (target, origin) if is_scalar(target) && is_scalar(origin) => {
                *target = origin.clone();
            }
            _ => {}
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_are_merged_not_replaced() {
        let mut target = json!({ "point": { "pixel_size": 8.0, "color": { "r": 255 } }, "show": true });
        merge(&mut target, &json!({ "point": { "pixel_size": 12.0 } }));
        assert_eq!(target, json!({ "point": { "pixel_size": 12.0, "color": { "r": 255 } }, "show": true }));
    }

    #[test]
    fn test_null_origin_keeps_target() {
        let mut target = json!({ "show": true });
        merge(&mut target, &json!({ "show": null }));
        assert_eq!(target, json!({ "show": true }));
    }

    #[test]
    fn test_null_target_takes_origin() {
        let mut target = json!({ "label": null });
        merge(&mut target, &json!({ "label": { "text": "A" } }));
        assert_eq!(target, json!({ "label": { "text": "A" } }));
    }

    #[test]
    fn test_type_mismatch_keeps_target() {
        let mut target = json!({ "point": { "pixel_size": 8.0 } });
        merge(&mut target, &json!({ "point": 3 }));
        assert_eq!(target, json!({ "point": { "pixel_size": 8.0 } }));

        let mut root = json!([1, 2]);
        merge(&mut root, &json!({ "a": 1 }));
        assert_eq!(root, json!([1, 2]));
    }

    #[test]
    fn test_arrays_merge_by_index_and_grow() {
        let mut target = json!([[0.0, 0.0, 0.0]]);
        merge(&mut target, &json!([[1.0], [2.0, 2.0, 2.0]]));
        assert_eq!(target, json!([[1.0, 0.0, 0.0], [2.0, 2.0, 2.0]]));
    }
}
