use super::location::ParseInfoTree;

/// Serialize a location tree to a pretty-printed JSON string.
pub fn to_pretty_json(tree: &ParseInfoTree) -> String {
    serde_json::to_string_pretty(tree).expect("ParseInfoTree serialization cannot fail")
}
