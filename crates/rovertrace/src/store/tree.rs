//! Path addressing inside a JSON tree, Realtime-Database style:
//! `/` is the root, `a/b` the key `b` of the object under `a`.

use serde_json::{Map, Value};

pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

pub(crate) fn value_at<'a>(root: &'a Value, segments: &[&str]) -> &'a Value {
    let mut node = root;
    for segment in segments {
        match node.get(*segment) {
            Some(child) => node = child,
            None => return &Value::Null,
        }
    }
    node
}

/// Write `value` at `segments`, creating objects on the way.
/// Writing `Null` removes the key, and empty parents with it.
pub(crate) fn set_at(root: &mut Value, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    if value.is_null() {
        remove_at(root, parents, last);
        return;
    }

    let mut node = root;
    for segment in parents {
        node = object_mut(node)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    object_mut(node).insert(last.to_string(), value);
}

fn remove_at(node: &mut Value, parents: &[&str], key: &str) {
    match parents.split_first() {
        None => {
            if let Value::Object(map) = node {
                map.remove(key);
            }
        }
        Some((head, rest)) => {
            let Value::Object(map) = node else {
                return;
            };
            let Some(child) = map.get_mut(*head) else {
                return;
            };
            remove_at(child, rest, key);
            if child.is_null() {
                map.remove(*head);
            }
        }
    }
    if node.as_object().is_some_and(Map::is_empty) {
        *node = Value::Null;
    }
}

fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced by an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_path_has_no_segments() {
        assert!(segments("/").is_empty());
        assert_eq!(segments("/lastData/position/"), vec!["lastData", "position"]);
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut root = Value::Null;
        set_at(&mut root, &["lastData", "sensors", "left"], json!(true));
        assert_eq!(root, json!({ "lastData": { "sensors": { "left": true } } }));
        assert_eq!(value_at(&root, &["lastData", "sensors", "left"]), &json!(true));
        assert_eq!(value_at(&root, &["lastData", "missing"]), &Value::Null);
    }

    #[test]
    fn writing_null_prunes_empty_parents() {
        let mut root = json!({ "lastData": { "sensors": { "left": true } }, "other": 1 });
        set_at(&mut root, &["lastData", "sensors", "left"], Value::Null);
        assert_eq!(root, json!({ "other": 1 }));
    }

    #[test]
    fn writing_null_at_root_clears_everything() {
        let mut root = json!({ "lastData": { "timestamp": 5 } });
        set_at(&mut root, &[], Value::Null);
        assert!(root.is_null());
    }
}
