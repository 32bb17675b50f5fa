// src/extract/links.rs
// =============================================================================
// This module extracts navigable links from JSON-LD style documents.
//
// Agent descriptions nest links anywhere: inside "interfaces", inside
// "products", inside arrays of service entries, and so on. Instead of knowing
// the schema, we walk the whole structure and pick up values stored under a
// small set of link-bearing keys.
//
// Rules:
// - Only "@id", "url" and "serviceEndpoint" values are considered
// - The value must be a string holding an absolute URL (scheme + host)
// - "@context" blocks are never descended into (vocabulary declarations are
//   full of URL-shaped strings that are not documents)
// - Anything malformed is ignored, never reported
// =============================================================================

use serde_json::Value;
use std::collections::BTreeSet;
use url::Url;

/// Keys whose string values may point at another document.
pub const LINK_KEYS: [&str; 3] = ["@id", "url", "serviceEndpoint"];

/// Key whose subtree is skipped during traversal.
pub const CONTEXT_KEY: &str = "@context";

// Extracts every link found in a document's content
//
// Parameters:
//   content: the parsed document (any JSON value)
//
// Returns: ordered set of absolute URLs
//
// The BTreeSet gives a stable iteration order, so the crawler visits siblings
// in the same order on every run.
//
// Example:
//   {"@id": "https://a/ad.json", "interfaces": [{"url": "https://a/api.yaml"}]}
//   -> {"https://a/ad.json", "https://a/api.yaml"}
pub fn extract_links(content: &Value) -> BTreeSet<String> {
    let mut links = BTreeSet::new();
    traverse(content, &mut links);
    links
}

// Walks one value, collecting links into `links`
//
// Recursion has no depth limit; documents are finite trees so this always
// terminates.
fn traverse(value: &Value, links: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for key in LINK_KEYS {
                if let Some(Value::String(candidate)) = map.get(key) {
                    if is_valid_url(candidate) {
                        links.insert(candidate.clone());
                    }
                }
            }

            for (key, child) in map {
                if key == CONTEXT_KEY {
                    continue;
                }
                if child.is_object() || child.is_array() {
                    traverse(child, links);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                traverse(item, links);
            }
        }
        // Scalars carry no key, so they can't be links on their own
        _ => {}
    }
}

// Checks that a string is an absolute URL with both a scheme and a host
//
// Examples:
//   "https://agent-search.ai/ad.json" -> true
//   "/relative/path"                  -> false (no scheme)
//   "mailto:someone@example.com"      -> false (no host)
//   "urn:uuid:1234"                   -> false (no host)
//   "https:a.example/ad.json"         -> false (no "//" authority marker)
//
// Url::parse fills in a host for special schemes even when the "//" is
// missing, so the raw text is checked for it as well.
pub fn is_valid_url(candidate: &str) -> bool {
    let url = match Url::parse(candidate) {
        Ok(url) => url,
        Err(_) => return false,
    };

    let has_authority = candidate
        .trim_start()
        .get(url.scheme().len()..)
        .map_or(false, |rest| rest.starts_with("://"));

    has_authority && url.has_host()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_top_level_link_keys() {
        let doc = json!({
            "@id": "https://agent.example/ad.json",
            "url": "https://agent.example/",
            "serviceEndpoint": "https://agent.example/rpc",
            "name": "https://agent.example/not-a-link-key"
        });
        let links = extract_links(&doc);
        assert_eq!(links.len(), 3);
        assert!(links.contains("https://agent.example/rpc"));
        assert!(!links.contains("https://agent.example/not-a-link-key"));
    }

    #[test]
    fn test_extracts_nested_objects_and_arrays() {
        let doc = json!({
            "interfaces": [
                {"url": "https://a.example/api.yaml"},
                [{"@id": "https://a.example/deep.json"}]
            ],
            "owner": {"contact": {"serviceEndpoint": "https://a.example/contact"}}
        });
        let links = extract_links(&doc);
        let expected: BTreeSet<String> = [
            "https://a.example/api.yaml",
            "https://a.example/deep.json",
            "https://a.example/contact",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn test_skips_context_subtree() {
        let doc = json!({
            "@context": {
                "@vocab": "https://schema.org/",
                "ad": {"@id": "https://vocab.example/ad#"}
            },
            "name": "agent"
        });
        assert!(extract_links(&doc).is_empty());
    }

    #[test]
    fn test_url_key_equal_to_context_value_is_still_extracted() {
        let doc = json!({"@context": "https://x/schema", "url": "https://x/schema"});
        let links = extract_links(&doc);
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://x/schema"));
    }

    #[test]
    fn test_ignores_invalid_and_non_string_values() {
        let doc = json!({
            "url": "not a url",
            "@id": 42,
            "serviceEndpoint": null,
            "items": [{"url": "/relative"}, {"url": "mailto:a@b.c"}]
        });
        assert!(extract_links(&doc).is_empty());
    }

    #[test]
    fn test_scalar_document_has_no_links() {
        assert!(extract_links(&json!("https://a.example/x")).is_empty());
        assert!(extract_links(&Value::Null).is_empty());
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://agent-search.ai/ad.json"));
        assert!(is_valid_url("http://localhost:8080/x"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("agent-search.ai/ad.json"));
        assert!(!is_valid_url("urn:uuid:1234"));
    }

    #[test]
    fn test_special_scheme_without_authority_is_rejected() {
        assert!(!is_valid_url("http:foo"));
        assert!(!is_valid_url("https:/a/x"));
        assert!(!is_valid_url("https:a.example/ad.json"));
        assert!(is_valid_url("HTTPS://a.example/ad.json"));

        let doc = json!({"url": "http:foo", "items": [{"@id": "https:/a/x"}]});
        assert!(extract_links(&doc).is_empty());
    }
}
