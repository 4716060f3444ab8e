mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

pub const PAGE_KEY: &str = "pagination[page]";
pub const PAGE_SIZE_KEY: &str = "pagination[pageSize]";
pub const POPULATE_ALL_KEY: &str = "populate";
pub const POPULATE_COMMENTS_USER_KEY: &str = "populate[comments][populate][user]";
pub const POPULATE_USER_KEY: &str = "populate[user]";
pub const POPULATE_CATEGORY_KEY: &str = "populate[category]";
pub const TITLE_FILTER_KEY: &str = "filters[title][$eqi]";
pub const CATEGORY_NAME_FILTER_KEY: &str = "filters[category][name][$eqi]";

/// Parameters of a list-articles call.
///
/// Every field maps to exactly one query key. Unset numbers, `false` flags and
/// empty filters are left off the wire.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ArticleQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub include_category: bool,
    pub include_comments_with_user: bool,
    pub include_user: bool,
    pub include_everything: bool,
    pub title_filter: Option<String>,
    pub category_name_filter: Option<String>,
}

impl ArticleQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_filters(mut self, title: Option<String>, category_name: Option<String>) -> Self {
        self.title_filter = title;
        self.category_name_filter = category_name;
        self
    }

    /// True when this query continues an existing listing rather than starting a fresh one.
    pub fn is_continuation(&self) -> bool {
        matches!(self.page, Some(page) if page > 1)
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let star = || Some("*".to_owned());
        QueryBuilder::new()
            .add_param(PAGE_KEY, self.page.filter(|p| *p > 0).map(|p| p.to_string()))
            .add_param(
                PAGE_SIZE_KEY,
                self.page_size.filter(|s| *s > 0).map(|s| s.to_string()),
            )
            .add_flag(POPULATE_ALL_KEY, self.include_everything, star())
            .add_flag(
                POPULATE_COMMENTS_USER_KEY,
                self.include_comments_with_user,
                star(),
            )
            .add_flag(POPULATE_USER_KEY, self.include_user, star())
            .add_flag(POPULATE_CATEGORY_KEY, self.include_category, star())
            .add_param(TITLE_FILTER_KEY, non_empty(&self.title_filter))
            .add_param(CATEGORY_NAME_FILTER_KEY, non_empty(&self.category_name_filter))
            .build()
    }
}

/// Query parameters of the single-article fetch: its category and each comment's author.
pub fn article_detail_query() -> Vec<(String, String)> {
    QueryBuilder::new()
        .add_param("populate[category]", Some("true".to_owned()))
        .add_param("populate[comments][populate]", Some("user".to_owned()))
        .build()
}

struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    fn new() -> Self {
        Self { params: vec![] }
    }

    fn add_param(mut self, key: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            self.params.push((key.to_owned(), value));
        }
        self
    }

    fn add_flag(self, key: &str, enabled: bool, value: Option<String>) -> Self {
        self.add_param(key, value.filter(|_| enabled))
    }

    fn build(self) -> Vec<(String, String)> {
        self.params
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
