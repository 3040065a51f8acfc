//! Directory structure rendering

use std::collections::BTreeMap;

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

/// Render the included paths as an indented tree rooted at `root_name`.
///
/// Entries are sorted by name; directories carry a trailing `/`.
pub fn generate_tree(root_name: &str, paths: &[String]) -> String {
    let mut root = Node::default();
    for path in paths {
        let mut node = &mut root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    let mut lines = vec![format!("{root_name}/")];
    render_children(&root, "", &mut lines);
    lines.join("\n")
}

fn render_children(node: &Node, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (idx, (name, child)) in node.children.iter().enumerate() {
        let is_last = idx + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        let suffix = if child.children.is_empty() { "" } else { "/" };
        lines.push(format!("{prefix}{connector}{name}{suffix}"));
        if !child.children.is_empty() {
            let extension = if is_last { "    " } else { "│   " };
            render_children(child, &format!("{prefix}{extension}"), lines);
        }
    }
}
