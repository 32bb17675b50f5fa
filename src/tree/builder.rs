// src/tree/builder.rs
// =============================================================================
// Rebuilds a hierarchy from the flat list of crawled documents.
//
// The documents don't declare their parent, so we guess: a document's parent
// is the first OTHER document (in fetch order) whose content mentions its URL
// verbatim. It is a plain substring search over the serialized content, not a
// reference resolver, and it is O(n^2) in the number of documents.
//
// Rules:
// 1. The first document (the seed) always hangs directly under the root
// 2. Every other document goes under the first document that mentions it
// 3. A document nobody mentions goes under the root
// 4. A candidate that is already below the current document is passed over,
//    so mutual mentions can't produce a loop
// =============================================================================

use crate::crawl::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// Name of the synthetic root.
pub const ROOT_NAME: &str = "Root Node";

/// One document in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Short label: the last path segment of the URL
    pub name: String,
    pub url: String,
    pub children: Vec<TreeNode>,
    pub doc: Document,
}

/// The synthetic root wrapping every top-level node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocTree {
    pub name: String,
    pub children: Vec<TreeNode>,
}

// Builds the tree for `documents` (fetch order matters: index 0 is the seed)
//
// Never fails. Duplicate URLs are collapsed onto their first occurrence.
pub fn build_tree(documents: &[Document]) -> DocTree {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut nodes: Vec<&Document> = Vec::with_capacity(documents.len());
    for doc in documents {
        if !seen.contains_key(doc.url.as_str()) {
            seen.insert(doc.url.as_str(), nodes.len());
            nodes.push(doc);
        }
    }

    if nodes.is_empty() {
        return DocTree {
            name: ROOT_NAME.to_string(),
            children: Vec::new(),
        };
    }

    let haystacks: Vec<Cow<'_, str>> = nodes.iter().map(|d| searchable_text(&d.content)).collect();

    let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut top_level = vec![0];

    for current in 1..nodes.len() {
        let url = nodes[current].url.as_str();
        let found = (0..nodes.len()).find(|&candidate| {
            candidate != current
                && haystacks[candidate].contains(url)
                && !is_below(candidate, current, &parent)
        });

        match found {
            Some(p) => {
                parent[current] = Some(p);
                children[p].push(current);
            }
            None => top_level.push(current),
        }
    }

    DocTree {
        name: ROOT_NAME.to_string(),
        children: top_level
            .into_iter()
            .map(|i| materialize(i, &nodes, &children))
            .collect(),
    }
}

// Text the containment search runs over
//
// Plain-text documents are searched as-is; structured ones as compact JSON.
fn searchable_text(content: &Value) -> Cow<'_, str> {
    match content {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

// True if `node` sits somewhere below `ancestor` given the parents assigned so far
fn is_below(node: usize, ancestor: usize, parent: &[Option<usize>]) -> bool {
    let mut cursor = parent[node];
    while let Some(p) = cursor {
        if p == ancestor {
            return true;
        }
        cursor = parent[p];
    }
    false
}

fn materialize(index: usize, nodes: &[&Document], children: &[Vec<usize>]) -> TreeNode {
    let doc = nodes[index];
    TreeNode {
        name: label_for(&doc.url),
        url: doc.url.clone(),
        children: children[index]
            .iter()
            .map(|&child| materialize(child, nodes, children))
            .collect(),
        doc: doc.clone(),
    }
}

// Last path segment of a URL, or the whole URL when that segment is empty
//
// Examples:
//   "https://agent-search.ai/ad.json"    -> "ad.json"
//   "https://agent-search.ai/api/"       -> "https://agent-search.ai/api/"
pub fn label_for(url: &str) -> String {
    match url.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => url.to_string(),
    }
}
