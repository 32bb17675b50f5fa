// src/tree/mod.rs
// =============================================================================
// Turns a crawl into a document tree.
//
// Submodules:
// - builder: the containment heuristic that assigns parents
// - render: indented text output for the terminal
//
// DocTreeReport bundles the three views a caller may want from one crawl:
// the tree, the flat list of visited URLs and the raw documents.
// =============================================================================

mod builder;
mod render;

use crate::crawl::{CrawlResult, Document, FailedFetch};
use serde::{Deserialize, Serialize};

pub use builder::{build_tree, DocTree, TreeNode};
pub use render::render_tree;

/// Response of a tree query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTreeReport {
    pub doc_tree: DocTree,
    pub visited_urls: Vec<String>,
    pub crawled_documents: Vec<Document>,
    #[serde(default)]
    pub failed_fetches: Vec<FailedFetch>,
}

impl DocTreeReport {
    pub fn from_crawl(result: CrawlResult) -> Self {
        let doc_tree = build_tree(&result.documents);
        let visited_urls = result.visited_urls();
        Self {
            doc_tree,
            visited_urls,
            crawled_documents: result.documents,
            failed_fetches: result.failures,
        }
    }
}
