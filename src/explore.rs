use crate::models::GraphQlResponse;
use serde::de::IgnoredAny;
use serde_json::Value;

/// Callbacks for [`walk`], one per shape a JSON node can take.
pub trait ShapeVisitor {
    fn object(&mut self, key: &str, depth: usize);
    /// Called before the walk descends into the first element as a sample.
    fn object_array(&mut self, key: &str, depth: usize);
    fn scalar_array(&mut self, key: &str, sample: &Value, depth: usize);
    fn empty_array(&mut self, key: &str, depth: usize);
    fn scalar(&mut self, key: &str, value: &Value, depth: usize);
}

/// Depth-first walk. Arrays of objects are only explored through their
/// first element.
pub fn walk<V: ShapeVisitor>(value: &Value, key: &str, depth: usize, visitor: &mut V) {
    match value {
        Value::Object(map) => {
            visitor.object(key, depth);
            for (child_key, child) in map {
                walk(child, child_key, depth + 1, visitor);
            }
        }
        Value::Array(items) => match items.first() {
            Some(first @ Value::Object(_)) => {
                visitor.object_array(key, depth);
                walk(first, "Item", depth + 1, visitor);
            }
            Some(sample) => visitor.scalar_array(key, sample, depth),
            None => visitor.empty_array(key, depth),
        },
        scalar => visitor.scalar(key, scalar, depth),
    }
}

/// Indented key/type listing, two spaces per level.
#[derive(Debug, Default)]
pub struct Outline {
    lines: Vec<String>,
}

impl Outline {
    fn push(&mut self, depth: usize, text: String) {
        self.lines.push(format!("{}{}", "  ".repeat(depth), text));
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

impl ShapeVisitor for Outline {
    fn object(&mut self, key: &str, depth: usize) {
        self.push(depth, format!("{} (Object):", key));
    }

    fn object_array(&mut self, key: &str, depth: usize) {
        self.push(depth, format!("{} (Array of Objects):", key));
    }

    fn scalar_array(&mut self, key: &str, sample: &Value, depth: usize) {
        self.push(
            depth,
            format!("{} (Array of {}): Example value: {}", key, kind(sample), sample),
        );
    }

    fn empty_array(&mut self, key: &str, depth: usize) {
        self.push(depth, format!("{} (Empty Array)", key));
    }

    fn scalar(&mut self, key: &str, value: &Value, depth: usize) {
        let literal = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.push(depth, format!("{}: {}", key, literal));
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

pub fn outline(value: &Value, root: &str) -> String {
    let mut visitor = Outline::default();
    walk(value, root, 0, &mut visitor);
    visitor.finish()
}

/// Outlines the node at `pointer` (e.g. `/data/Media`) inside a raw
/// response, reporting the first service error instead when there is one.
pub fn explore_response(response: &Value, pointer: &str, root: &str) -> String {
    if let Ok(envelope) = serde_json::from_value::<GraphQlResponse<IgnoredAny>>(response.clone())
        && let Some(error) = envelope.first_error()
    {
        return format!("Error: {}", error.message);
    }
    match response.pointer(pointer) {
        Some(node) if !node.is_null() => outline(node, root),
        _ => format!("Nothing found at {}", pointer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outline_covers_every_shape() {
        let value = json!({
            "id": 1,
            "title": {"romaji": "X", "native": null},
            "genres": ["Action", "Drama"],
            "synonyms": [],
            "tags": [{"name": "A", "rank": 90}, {"name": "B", "rank": 10}]
        });
        let expected = [
            "Media (Object):",
            "  id: 1",
            "  title (Object):",
            "    romaji: X",
            "    native: null",
            "  genres (Array of String): Example value: \"Action\"",
            "  synonyms (Empty Array)",
            "  tags (Array of Objects):",
            "    Item (Object):",
            "      name: A",
            "      rank: 90",
        ]
        .join("\n");
        assert_eq!(outline(&value, "Media"), expected);
    }

    #[test]
    fn test_scalar_root() {
        assert_eq!(outline(&json!(true), "flag"), "flag: true");
    }

    #[derive(Default)]
    struct Depths(Vec<(String, usize)>);

    impl ShapeVisitor for Depths {
        fn object(&mut self, key: &str, depth: usize) {
            self.0.push((key.to_string(), depth));
        }
        fn object_array(&mut self, key: &str, depth: usize) {
            self.0.push((key.to_string(), depth));
        }
        fn scalar_array(&mut self, key: &str, _sample: &Value, depth: usize) {
            self.0.push((key.to_string(), depth));
        }
        fn empty_array(&mut self, key: &str, depth: usize) {
            self.0.push((key.to_string(), depth));
        }
        fn scalar(&mut self, key: &str, _value: &Value, depth: usize) {
            self.0.push((key.to_string(), depth));
        }
    }

    #[test]
    fn test_walk_samples_first_object_only() {
        let value = json!({"nodes": [{"name": "ufotable"}, {"name": "Aniplex", "extra": 1}]});
        let mut depths = Depths::default();
        walk(&value, "studios", 0, &mut depths);
        let keys: Vec<(&str, usize)> = depths.0.iter().map(|(k, d)| (k.as_str(), *d)).collect();
        assert_eq!(
            keys,
            vec![("studios", 0), ("nodes", 1), ("Item", 2), ("name", 3)]
        );
    }

    #[test]
    fn test_explore_response_reports_errors_first() {
        let response = json!({
            "errors": [{"message": "Not Found."}],
            "data": {"Media": {"id": 1}}
        });
        assert_eq!(explore_response(&response, "/data/Media", "Media"), "Error: Not Found.");
    }

    #[test]
    fn test_explore_response_missing_node() {
        let response = json!({"data": {"Media": null}});
        assert_eq!(
            explore_response(&response, "/data/Media", "Media"),
            "Nothing found at /data/Media"
        );
    }

    #[test]
    fn test_explore_response_outlines_page() {
        let response = json!({"data": {"Page": {"pageInfo": {"total": 3}}}});
        assert_eq!(
            explore_response(&response, "/data/Page", "Page"),
            "Page (Object):\n  pageInfo (Object):\n    total: 3"
        );
    }
}
