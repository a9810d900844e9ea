//! Folder Models
//!
//! Flat folder rows as stored, and the tree nodes rebuilt from them.

use serde::{Deserialize, Serialize};

use super::page::PageRecord;

/// A folder row: the un-treed representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderListItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

impl FolderListItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: parent.map(str::to_string),
        }
    }
}

/// Payload for creating a folder; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInput {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

/// A node of the folder forest.
///
/// Page nodes carry their record and never have children; folder nodes
/// carry no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub is_page: bool,
    pub page_data: Option<PageRecord>,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_page: false,
            page_data: None,
            children: Vec::new(),
        }
    }

    /// Leaf node for a page, named after the page title.
    pub fn page(record: PageRecord) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.title().to_string(),
            is_page: true,
            page_data: Some(record),
            children: Vec::new(),
        }
    }
}

impl From<&FolderListItem> for FolderNode {
    fn from(item: &FolderListItem) -> Self {
        FolderNode::folder(item.id.clone(), item.name.clone())
    }
}
