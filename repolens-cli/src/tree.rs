//! Hierarchical file-tree assembly from walk records.

use crate::models::{DirRecord, FileRecord, FileTreeNode, TreeNodeType};
use std::collections::BTreeMap;

#[derive(Default)]
struct Node {
    dirs: BTreeMap<String, Node>,
    files: Vec<(String, u64)>,
}

fn into_tree(node: Node, name: String, path: String) -> FileTreeNode {
    let mut children: Vec<FileTreeNode> = Vec::new();
    for (child_name, child) in node.dirs {
        let child_path = if path == "." {
            child_name.clone()
        } else {
            format!("{path}/{child_name}")
        };
        children.push(into_tree(child, child_name, child_path));
    }
    let mut files = node.files;
    files.sort_by(|a, b| a.0.cmp(&b.0));
    for (file_name, size) in files {
        let file_path = if path == "." {
            file_name.clone()
        } else {
            format!("{path}/{file_name}")
        };
        children.push(FileTreeNode {
            name: file_name,
            path: file_path,
            node_type: TreeNodeType::File,
            size: Some(size),
            children: None,
        });
    }
    FileTreeNode {
        name,
        path,
        node_type: TreeNodeType::Directory,
        size: None,
        children: Some(children),
    }
}

/// Fold walked files and directories into a nested tree. Children are
/// ordered directories-first, each group sorted by name.
pub fn build_tree(files: &[FileRecord], directories: &[DirRecord]) -> FileTreeNode {
    let mut root = Node::default();

    for dir in directories {
        if dir.path == "." {
            continue;
        }
        let mut cursor = &mut root;
        for segment in dir.path.split('/') {
            cursor = cursor.dirs.entry(segment.to_string()).or_default();
        }
    }

    for file in files {
        let mut cursor = &mut root;
        let mut segments: Vec<&str> = file.path.split('/').collect();
        let file_name = segments.pop().unwrap_or(&file.name);
        for segment in segments {
            cursor = cursor.dirs.entry(segment.to_string()).or_default();
        }
        cursor.files.push((file_name.to_string(), file.size));
    }

    let root_name = directories
        .first()
        .map(|d| d.name.clone())
        .unwrap_or_else(|| ".".to_string());
    into_tree(root, root_name, ".".to_string())
}
