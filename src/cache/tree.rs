//! Folder Tree Builder
//!
//! Rebuilds the folder forest from flat folder rows and provides the
//! lookups used to place pages in it and to compute their URL routes.

use std::collections::HashMap;

use crate::models::{FolderListItem, FolderNode, PageRecord};

// == Build ==
/// Arranges flat folder rows into a forest by parent linkage.
///
/// Rows whose parent is missing from the input (or who point at
/// themselves) become roots. Every row appears exactly once in the
/// output, in input order among siblings; rows caught in a parent cycle
/// are promoted to roots where the cycle is first entered.
pub fn build_folder_tree(folders: &[FolderListItem]) -> Vec<FolderNode> {
    let index: HashMap<&str, usize> = folders
        .iter()
        .enumerate()
        .rev()
        .map(|(i, folder)| (folder.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); folders.len()];
    let mut roots = Vec::new();
    for (i, folder) in folders.iter().enumerate() {
        match folder.parent.as_deref().and_then(|p| index.get(p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut visited = vec![false; folders.len()];
    let mut forest: Vec<FolderNode> = roots
        .iter()
        .map(|&root| assemble(root, folders, &children, &mut visited))
        .collect();

    // Anything left unvisited sits on a parent cycle.
    for i in 0..folders.len() {
        if !visited[i] {
            forest.push(assemble(i, folders, &children, &mut visited));
        }
    }

    forest
}

fn assemble(
    at: usize,
    folders: &[FolderListItem],
    children: &[Vec<usize>],
    visited: &mut [bool],
) -> FolderNode {
    visited[at] = true;
    let mut node = FolderNode::from(&folders[at]);
    for &child in &children[at] {
        if !visited[child] {
            node.children
                .push(assemble(child, folders, children, visited));
        }
    }
    node
}

// == Point Insert ==
/// Appends a page node under the folder `parent_id`.
///
/// With no parent the page goes to the forest root. Returns false, leaving
/// the tree untouched, when the parent folder cannot be found; callers
/// then fall back to a full rebuild.
pub fn add_page_to_folder_tree(
    tree: &mut Vec<FolderNode>,
    parent_id: Option<&str>,
    page: FolderNode,
) -> bool {
    insert_page(tree, parent_id, page).is_none()
}

/// Inserts the page, handing it back when the parent folder is missing.
fn insert_page(
    tree: &mut Vec<FolderNode>,
    parent_id: Option<&str>,
    page: FolderNode,
) -> Option<FolderNode> {
    let Some(parent_id) = parent_id else {
        tree.push(page);
        return None;
    };

    match find_folder_mut(tree, parent_id) {
        Some(folder) => {
            folder.children.push(page);
            None
        }
        None => Some(page),
    }
}

fn find_folder_mut<'a>(nodes: &'a mut [FolderNode], id: &str) -> Option<&'a mut FolderNode> {
    for node in nodes.iter_mut() {
        if node.is_page {
            continue;
        }
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_folder_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

// == Lookups ==
/// Depth-first search for a node by id.
pub fn find_node_by_id<'a>(tree: &'a [FolderNode], id: &str) -> Option<&'a FolderNode> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_by_id(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Returns the chain of ancestors from a root down to, but not including,
/// the node `id`. Empty when `id` is a root or absent.
pub fn find_nodes_along_path_to_id<'a>(tree: &'a [FolderNode], id: &str) -> Vec<&'a FolderNode> {
    let mut path = Vec::new();
    if walk_to(tree, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

fn walk_to<'a>(nodes: &'a [FolderNode], id: &str, path: &mut Vec<&'a FolderNode>) -> bool {
    for node in nodes {
        if node.id == id {
            return true;
        }
        path.push(node);
        if walk_to(&node.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// URL route of a page living in `parent_folder`: the folder names from
/// the root down to the parent folder itself, joined with `/`.
///
/// Pages at the root, or under a folder missing from the tree, get an
/// empty route.
pub fn url_route(tree: &[FolderNode], parent_folder: Option<&str>) -> String {
    let Some(parent) = parent_folder else {
        return String::new();
    };
    let Some(folder) = find_node_by_id(tree, parent) else {
        return String::new();
    };

    find_nodes_along_path_to_id(tree, parent)
        .into_iter()
        .chain(std::iter::once(folder))
        .map(|node| node.name.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

// == Page Trees ==
/// Hangs pages under their parent folders, or at the root when the parent
/// is unset or unknown.
pub fn attach_pages(
    mut tree: Vec<FolderNode>,
    pages: impl IntoIterator<Item = PageRecord>,
) -> Vec<FolderNode> {
    for page in pages {
        let parent = page.parent_folder().map(str::to_string);
        if let Some(node) = insert_page(&mut tree, parent.as_deref(), FolderNode::page(page)) {
            tree.push(node);
        }
    }
    tree
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageData, PageMeta};

    fn folder(id: &str, name: &str, parent: Option<&str>) -> FolderListItem {
        FolderListItem::new(id, name, parent)
    }

    fn page(id: &str, parent: Option<&str>) -> PageRecord {
        let mut data = PageData::new(format!("Page {id}"), id);
        data.parent_folder = parent.map(str::to_string);
        PageRecord {
            meta: PageMeta {
                id: id.to_string(),
                data,
                author: None,
                contributors: Vec::new(),
                categories: Vec::new(),
                tags: Vec::new(),
                url_route: String::new(),
            },
            default_content: None,
            multi_lang_content: Vec::new(),
        }
    }

    fn sample() -> Vec<FolderListItem> {
        vec![
            folder("docs", "docs", None),
            folder("guides", "guides", Some("docs")),
            folder("advanced", "advanced", Some("guides")),
            folder("blog", "blog", None),
        ]
    }

    #[test]
    fn test_build_nests_by_parent() {
        let tree = build_folder_tree(&sample());

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, "docs");
        assert_eq!(tree[0].children[0].id, "guides");
        assert_eq!(tree[0].children[0].children[0].id, "advanced");
        assert_eq!(tree[1].id, "blog");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_build_handles_child_before_parent() {
        let folders = vec![
            folder("child", "child", Some("parent")),
            folder("parent", "parent", None),
        ];
        let tree = build_folder_tree(&folders);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, "parent");
        assert_eq!(tree[0].children[0].id, "child");
    }

    #[test]
    fn test_build_promotes_orphans_to_root() {
        let folders = vec![
            folder("a", "a", None),
            folder("orphan", "orphan", Some("gone")),
        ];
        let tree = build_folder_tree(&folders);

        let ids: Vec<_> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "orphan"]);
    }

    #[test]
    fn test_build_breaks_parent_cycles() {
        let folders = vec![
            folder("x", "x", Some("y")),
            folder("y", "y", Some("x")),
            folder("self", "self", Some("self")),
        ];
        let tree = build_folder_tree(&folders);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, "self");
        assert_eq!(tree[1].id, "x");
        assert_eq!(tree[1].children[0].id, "y");
    }

    #[test]
    fn test_build_empty() {
        assert!(build_folder_tree(&[]).is_empty());
    }

    #[test]
    fn test_add_page_under_nested_folder() {
        let mut tree = build_folder_tree(&sample());

        assert!(add_page_to_folder_tree(
            &mut tree,
            Some("advanced"),
            FolderNode::page(page("p1", Some("advanced")))
        ));

        let advanced = find_node_by_id(&tree, "advanced").unwrap();
        assert_eq!(advanced.children.len(), 1);
        assert!(advanced.children[0].is_page);
        assert!(advanced.children[0].page_data.is_some());
    }

    #[test]
    fn test_add_page_to_root() {
        let mut tree = build_folder_tree(&sample());
        assert!(add_page_to_folder_tree(&mut tree, None, FolderNode::page(page("p1", None))));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_add_page_missing_parent_leaves_tree_untouched() {
        let mut tree = build_folder_tree(&sample());
        let before = tree.clone();

        let added = add_page_to_folder_tree(
            &mut tree,
            Some("missing-id"),
            FolderNode::page(page("p1", Some("missing-id"))),
        );

        assert!(!added);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_add_page_never_nests_under_page() {
        let mut tree = vec![FolderNode::page(page("p0", None))];
        assert!(!add_page_to_folder_tree(
            &mut tree,
            Some("p0"),
            FolderNode::page(page("p1", None))
        ));
    }

    #[test]
    fn test_path_to_id_excludes_target() {
        let tree = build_folder_tree(&sample());

        let path: Vec<_> = find_nodes_along_path_to_id(&tree, "advanced")
            .into_iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(path, vec!["docs", "guides"]);

        assert!(find_nodes_along_path_to_id(&tree, "docs").is_empty());
        assert!(find_nodes_along_path_to_id(&tree, "nope").is_empty());
    }

    #[test]
    fn test_url_route() {
        let tree = build_folder_tree(&sample());

        assert_eq!(url_route(&tree, Some("advanced")), "docs/guides/advanced");
        assert_eq!(url_route(&tree, Some("blog")), "blog");
        assert_eq!(url_route(&tree, None), "");
        assert_eq!(url_route(&tree, Some("unknown")), "");
    }

    #[test]
    fn test_attach_pages() {
        let tree = build_folder_tree(&sample());
        let pages = vec![page("p1", Some("guides")), page("p2", None), page("p3", Some("gone"))];

        let tree = attach_pages(tree, pages);

        let guides = find_node_by_id(&tree, "guides").unwrap();
        assert!(guides.children.iter().any(|n| n.id == "p1"));
        let roots: Vec<_> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["docs", "blog", "p2", "p3"]);
    }
}
