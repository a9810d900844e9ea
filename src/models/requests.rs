//! Request DTOs for the cache API
//!
//! Query strings accepted by the listing endpoints.

use serde::Deserialize;

use super::PageFilter;

/// Query for `GET /pages`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageListQuery {
    #[serde(default)]
    pub include_drafts: bool,
    #[serde(default)]
    pub hide_default_index: bool,
    #[serde(default)]
    pub meta_only: bool,
}

impl PageListQuery {
    pub fn filter(&self) -> PageFilter {
        PageFilter::new(self.include_drafts, self.hide_default_index)
    }
}

/// Query for `GET /folders/page-tree`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTreeQuery {
    #[serde(default)]
    pub include_drafts: bool,
    #[serde(default)]
    pub hide_default_index: bool,
}

impl PageTreeQuery {
    pub fn filter(&self) -> PageFilter {
        PageFilter::new(self.include_drafts, self.hide_default_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_list_query_defaults() {
        let query: PageListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.filter(), PageFilter::default());
        assert!(!query.meta_only);
    }

    #[test]
    fn test_page_list_query_camel_case() {
        let query: PageListQuery =
            serde_json::from_str(r#"{"includeDrafts":true,"hideDefaultIndex":true}"#).unwrap();
        assert_eq!(query.filter(), PageFilter::new(true, true));
    }
}
