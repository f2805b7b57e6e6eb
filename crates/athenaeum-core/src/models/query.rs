use serde::{Deserialize, Serialize};

use super::enums::{Category, Department, Visibility};
use super::resource::Resource;

/// Filters and pagination for catalog listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub department: Option<Department>,
    pub category: Option<Category>,
    pub visibility: Option<Visibility>,
    /// Include trashed resources in the listing
    pub include_deleted: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            search: None,
            department: None,
            category: None,
            visibility: None,
            include_deleted: false,
        }
    }
}

impl ListQuery {
    /// Single small page filtered by a title search.
    pub fn title_probe(title: &str, limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: Some(title.trim().to_string()),
            ..Self::default()
        }
    }

    /// Query-string pairs in the shape the search endpoint expects.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.max(1).to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(department) = self.department {
            pairs.push(("department", department.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(visibility) = self.visibility {
            pairs.push(("visibility", visibility.to_string()));
        }
        if self.include_deleted {
            pairs.push(("includeDeleted", "true".to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePage {
    pub resources: Vec<Resource>,
    pub page_info: PageInfo,
}
