//! Page Models
//!
//! A cached page is the page row joined with its authors, taxonomy and
//! content blocks, annotated with the folder route it lives under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Slug of the site's default landing page.
pub const DEFAULT_INDEX_SLUG: &str = "index";

// == Page Filter ==
/// Visibility predicates applied to page listings.
///
/// The cache always stores every page and applies the filter on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFilter {
    /// Include pages still marked as drafts
    pub include_drafts: bool,
    /// Hide the page whose slug is `index`
    pub hide_default_index: bool,
}

impl PageFilter {
    pub fn new(include_drafts: bool, hide_default_index: bool) -> Self {
        Self {
            include_drafts,
            hide_default_index,
        }
    }

    /// Filter that admits every page.
    pub fn all() -> Self {
        Self::new(true, false)
    }

    /// Returns true if the page is visible under this filter.
    pub fn admits(&self, page: &PageMeta) -> bool {
        if !self.include_drafts && page.data.draft {
            return false;
        }
        !(self.hide_default_index && page.data.slug == DEFAULT_INDEX_SLUG)
    }
}

// == Writable Page Data ==
/// The editable columns of a page row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default)]
    pub show_on_nav: bool,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_lang")]
    pub content_lang: String,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub contributor_ids: Vec<String>,
    #[serde(default)]
    pub show_author: bool,
    #[serde(default)]
    pub show_contributors: bool,
    #[serde(default)]
    pub parent_folder: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

fn default_package() -> String {
    "studiocms".to_string()
}

fn default_lang() -> String {
    "default".to_string()
}

impl PageData {
    /// Minimal page data; remaining columns take their defaults.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: String::new(),
            package: default_package(),
            show_on_nav: false,
            published_at: Utc::now(),
            updated_at: None,
            content_lang: default_lang(),
            hero_image: None,
            category_ids: Vec::new(),
            tag_ids: Vec::new(),
            author_id: None,
            contributor_ids: Vec::new(),
            show_author: false,
            show_contributors: false,
            parent_folder: None,
            draft: false,
        }
    }

    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.parent_folder = Some(folder_id.into());
        self
    }

    pub fn as_draft(mut self) -> Self {
        self.draft = true;
        self
    }
}

/// Author or contributor resolved from the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A resolved category or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// One language variant of a page body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub id: String,
    pub content_lang: String,
    pub content: String,
}

/// Body text written for one language of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    pub content_lang: String,
    pub content: String,
}

impl ContentInput {
    pub fn new(content_lang: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_lang: content_lang.into(),
            content: content.into(),
        }
    }
}

/// Page update payload: new row data and, optionally, new body content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    pub data: PageData,
    #[serde(default)]
    pub content: Option<ContentInput>,
}

// == Page Meta ==
/// Page metadata without any content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub id: String,
    #[serde(flatten)]
    pub data: PageData,
    pub author: Option<UserSummary>,
    pub contributors: Vec<UserSummary>,
    pub categories: Vec<Taxonomy>,
    pub tags: Vec<Taxonomy>,
    /// Folder names from the forest root down to the parent folder, joined by `/`
    pub url_route: String,
}

impl PageMeta {
    /// Projection is idempotent: a meta record is already meta-only.
    pub fn to_meta_only(&self) -> PageMeta {
        self.clone()
    }
}

// == Page Record ==
/// The full cached form of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub default_content: Option<PageContent>,
    pub multi_lang_content: Vec<PageContent>,
}

impl PageRecord {
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn slug(&self) -> &str {
        &self.meta.data.slug
    }

    pub fn title(&self) -> &str {
        &self.meta.data.title
    }

    pub fn parent_folder(&self) -> Option<&str> {
        self.meta.data.parent_folder.as_deref()
    }

    pub fn is_draft(&self) -> bool {
        self.meta.data.draft
    }

    /// Strips the content blocks, keeping only metadata.
    pub fn to_meta_only(&self) -> PageMeta {
        self.meta.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(slug: &str, draft: bool) -> PageMeta {
        let mut data = PageData::new("Title", slug);
        data.draft = draft;
        PageMeta {
            id: "p1".to_string(),
            data,
            author: None,
            contributors: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            url_route: String::new(),
        }
    }

    #[test]
    fn test_default_filter_hides_drafts() {
        let filter = PageFilter::default();
        assert!(filter.admits(&meta("about", false)));
        assert!(!filter.admits(&meta("about", true)));
    }

    #[test]
    fn test_filter_hides_default_index() {
        let filter = PageFilter::new(true, true);
        assert!(!filter.admits(&meta(DEFAULT_INDEX_SLUG, false)));
        assert!(filter.admits(&meta("blog", true)));
        assert!(PageFilter::all().admits(&meta(DEFAULT_INDEX_SLUG, true)));
    }

    #[test]
    fn test_meta_only_drops_content_keys() {
        let record = PageRecord {
            meta: meta("about", false),
            default_content: Some(PageContent {
                id: "c1".to_string(),
                content_lang: "default".to_string(),
                content: "# About".to_string(),
            }),
            multi_lang_content: Vec::new(),
        };

        let json = serde_json::to_value(record.to_meta_only()).unwrap();
        assert!(json.get("defaultContent").is_none());
        assert!(json.get("multiLangContent").is_none());
        assert_eq!(json["slug"], "about");
        assert_eq!(json["urlRoute"], "");
    }
}
