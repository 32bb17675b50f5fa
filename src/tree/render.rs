// src/tree/render.rs
// Indented text view of a document tree, for terminal output.

use super::{DocTree, TreeNode};

// Renders the tree one node per line:
//
//   Root Node
//   └── ad.json  (https://agent-search.ai/ad.json)
//       ├── api.yaml  (https://agent-search.ai/api.yaml)
//       └── ...
pub fn render_tree(tree: &DocTree) -> String {
    let mut out = String::new();
    out.push_str(&tree.name);
    out.push('\n');

    let count = tree.children.len();
    for (i, child) in tree.children.iter().enumerate() {
        render_node(child, "", i + 1 == count, &mut out);
    }
    out
}

fn render_node(node: &TreeNode, prefix: &str, last: bool, out: &mut String) {
    let branch = if last { "└── " } else { "├── " };
    out.push_str(&format!("{}{}{}  ({})\n", prefix, branch, node.name, node.url));

    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        render_node(child, &child_prefix, i + 1 == count, out);
    }
}
