use std::collections::HashSet;

use super::{Notification, Reducer};
use crate::data_formats::ArticleQuery;
use crate::models::{Article, Pagination};

pub const ARTICLE_CREATED: &str = "Article created successfully!";
pub const ARTICLE_UPDATED: &str = "Article updated successfully!";
pub const ARTICLE_DELETED: &str = "Article deleted successfully!";
pub const FETCH_ARTICLES_FAILED: &str = "Failed to fetch articles. Please try again.";
pub const FETCH_ARTICLE_FAILED: &str = "Failed to fetch article. Please try again.";
pub const CREATE_ARTICLE_FAILED: &str = "Failed to create article. Please try again.";
pub const UPDATE_ARTICLE_FAILED: &str = "Failed to update article. Please try again.";
pub const DELETE_ARTICLE_FAILED: &str = "Failed to delete article. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleState {
    pub articles: Vec<Article>,
    /// The article currently being viewed or edited.
    pub article: Option<Article>,
    pub total_pages: u32,
    /// Query of the last applied list response.
    pub query: ArticleQuery,
    /// Requests in flight. The store is busy while this is non-zero.
    pub pending: usize,
    pub error: bool,
    pub success: Notification,
    pub failure: Notification,
}

impl Default for ArticleState {
    fn default() -> Self {
        Self {
            articles: vec![],
            article: None,
            total_pages: 1,
            query: ArticleQuery::default(),
            pending: 0,
            error: false,
            success: Notification::hidden(),
            failure: Notification::hidden(),
        }
    }
}

impl ArticleState {
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    pub fn current_page(&self) -> u32 {
        self.query.page.unwrap_or(1).max(1)
    }

    pub fn has_more(&self) -> bool {
        self.current_page() < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArticleAction {
    Started,
    Finished,
    ListLoaded {
        query: ArticleQuery,
        items: Vec<Article>,
        pagination: Pagination,
    },
    ArticleLoaded(Article),
    Created,
    Updated(Article),
    Deleted,
    Failed(&'static str),
    SetArticles(Vec<Article>),
    RemoveArticle(String),
    DismissSuccess,
    DismissFailure,
}

pub struct ArticleReducer;

impl Reducer for ArticleReducer {
    type State = ArticleState;
    type Intent = ArticleAction;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ArticleAction::Started => ArticleState {
                pending: state.pending + 1,
                ..state
            },
            ArticleAction::Finished => ArticleState {
                pending: state.pending.saturating_sub(1),
                ..state
            },
            ArticleAction::ListLoaded {
                query,
                items,
                pagination,
            } => {
                let articles = if query.is_continuation() {
                    append_unique(state.articles, items)
                } else {
                    items
                };
                ArticleState {
                    articles,
                    total_pages: pagination.page_count,
                    query,
                    error: false,
                    ..state
                }
            }
            ArticleAction::ArticleLoaded(article) => ArticleState {
                article: Some(article),
                error: false,
                ..state
            },
            ArticleAction::Created => ArticleState {
                success: Notification::shown(ARTICLE_CREATED),
                error: false,
                ..state
            },
            ArticleAction::Updated(article) => ArticleState {
                article: Some(article),
                success: Notification::shown(ARTICLE_UPDATED),
                error: false,
                ..state
            },
            ArticleAction::Deleted => ArticleState {
                article: None,
                success: Notification::shown(ARTICLE_DELETED),
                error: false,
                ..state
            },
            ArticleAction::Failed(message) => ArticleState {
                error: true,
                failure: Notification::shown(message),
                ..state
            },
            ArticleAction::SetArticles(articles) => ArticleState { articles, ..state },
            ArticleAction::RemoveArticle(document_id) => {
                let mut articles = state.articles;
                articles.retain(|a| a.document_id != document_id);
                ArticleState { articles, ..state }
            }
            ArticleAction::DismissSuccess => ArticleState {
                success: Notification::hidden(),
                ..state
            },
            ArticleAction::DismissFailure => ArticleState {
                failure: Notification::hidden(),
                ..state
            },
        }
    }
}

/// Appends `incoming` after `existing`, skipping documents already present.
fn append_unique(mut existing: Vec<Article>, incoming: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = existing.iter().map(|a| a.document_id.clone()).collect();
    for article in incoming {
        if seen.insert(article.document_id.clone()) {
            existing.push(article);
        }
    }
    existing
}
