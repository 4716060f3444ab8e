use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::article_state::*;
use super::{authorize, ActionOutcome, Reducer};
use crate::api;
use crate::data_formats::ArticleQuery;
use crate::errors::{ApiError, ApiResult};
use crate::http_client::ApiClient;
use crate::models::Article;
use crate::validation::{ArticleForm, FilterForm, FormMode, ValidationErrors};

/// Shared article state and the actions that change it.
///
/// List and detail fetches are tagged with a generation number. Only the
/// response of the most recently started fetch of each kind is applied, so a
/// slow answer to an old filter can never overwrite a newer one.
pub struct ArticleStore {
    client: ApiClient,
    page_size: u32,
    state: watch::Sender<ArticleState>,
    list_generation: AtomicU64,
    detail_generation: AtomicU64,
}

impl ArticleStore {
    pub fn new(client: ApiClient, page_size: u32) -> Self {
        let (state, _) = watch::channel(ArticleState::default());
        Self {
            client,
            page_size,
            state,
            list_generation: AtomicU64::new(0),
            detail_generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> ArticleState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ArticleState> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: ArticleAction) {
        tracing::trace!(?action, "article action");
        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = ArticleReducer::reduce(current, action);
        });
    }

    /// Applies `action` only if `generation` is still the newest of its kind.
    fn dispatch_if_current(
        &self,
        counter: Option<&AtomicU64>,
        generation: u64,
        action: ArticleAction,
    ) -> bool {
        self.state.send_if_modified(|state| {
            if let Some(counter) = counter {
                if counter.load(Ordering::SeqCst) != generation {
                    return false;
                }
            }
            let current = std::mem::take(state);
            *state = ArticleReducer::reduce(current, action);
            true
        })
    }

    /// Reserves a generation and marks the store busy before the session guard
    /// is awaited, so no other list action can slip in between.
    async fn run<T, Fut>(
        &self,
        counter: Option<&AtomicU64>,
        request: Fut,
        on_success: impl FnOnce(T) -> ArticleAction,
        failure: &'static str,
    ) -> ActionOutcome
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        let generation = counter.map_or(0, |c| c.fetch_add(1, Ordering::SeqCst) + 1);
        self.dispatch(ArticleAction::Started);

        let outcome = if !authorize(&self.client).await {
            ActionOutcome::Unauthenticated
        } else {
            match request.await {
                Ok(value) => {
                    if self.dispatch_if_current(counter, generation, on_success(value)) {
                        ActionOutcome::Succeeded
                    } else {
                        tracing::debug!(generation, "dropping superseded response");
                        ActionOutcome::Superseded
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "{}", failure);
                    if self.dispatch_if_current(counter, generation, ArticleAction::Failed(failure)) {
                        ActionOutcome::Failed
                    } else {
                        ActionOutcome::Superseded
                    }
                }
            }
        };

        self.dispatch(ArticleAction::Finished);
        outcome
    }

    /// Fetches one page. Page 1 (or no page) replaces the list; later pages append to it.
    pub async fn fetch_articles(&self, query: ArticleQuery) -> ActionOutcome {
        let applied = query.clone();
        self.run(
            Some(&self.list_generation),
            api::list_articles(&self.client, &query),
            move |page| {
                let pagination = page.pagination();
                ArticleAction::ListLoaded {
                    query: applied,
                    items: page.data,
                    pagination,
                }
            },
            FETCH_ARTICLES_FAILED,
        )
        .await
    }

    /// Starts a fresh listing from page 1 with the given search filters.
    pub async fn search(&self, filter: &FilterForm) -> Result<ActionOutcome, ValidationErrors> {
        let (title, category) = filter.validate()?;
        self.dispatch(ArticleAction::SetArticles(vec![]));
        let query = ArticleQuery {
            include_category: true,
            ..ArticleQuery::page(1, self.page_size)
        }
        .with_filters(title, category);
        Ok(self.fetch_articles(query).await)
    }

    /// Requests the page after the last applied one, keeping the current filters.
    pub async fn load_more(&self) -> ActionOutcome {
        // Snapshot and reservation happen without an await in between; a list
        // action that has started is always visible here as `loading()`.
        let state = self.snapshot();
        if state.loading() || !state.has_more() {
            return ActionOutcome::Skipped;
        }
        let next = state.current_page() + 1;
        let mut query = state.query.with_page(next);
        if query.page_size.is_none() {
            query.page_size = Some(self.page_size);
        }
        self.fetch_articles(query).await
    }

    pub async fn fetch_article(&self, document_id: &str) -> ActionOutcome {
        self.run(
            Some(&self.detail_generation),
            api::get_article(&self.client, document_id),
            ArticleAction::ArticleLoaded,
            FETCH_ARTICLE_FAILED,
        )
        .await
    }

    /// Validates the form and creates the article. Invalid input never reaches the network.
    pub async fn create_article(
        &self,
        form: &ArticleForm,
    ) -> Result<ActionOutcome, ValidationErrors> {
        let payload = form.validate(FormMode::Create)?;
        Ok(self
            .run(
                None,
                api::create_article(&self.client, &payload),
                |_| ArticleAction::Created,
                CREATE_ARTICLE_FAILED,
            )
            .await)
    }

    pub async fn update_article(
        &self,
        document_id: &str,
        form: &ArticleForm,
    ) -> Result<ActionOutcome, ValidationErrors> {
        let payload = form.validate(FormMode::Edit)?;
        let request = async {
            let article = api::update_article(&self.client, document_id, &payload).await?;
            // Any detail fetch still in flight predates this write.
            self.detail_generation.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ApiError>(article)
        };
        Ok(self
            .run(None, request, ArticleAction::Updated, UPDATE_ARTICLE_FAILED)
            .await)
    }

    pub async fn delete_article(&self, document_id: &str) -> ActionOutcome {
        let request = async {
            api::delete_article(&self.client, document_id).await?;
            self.detail_generation.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ApiError>(())
        };
        self.run(None, request, |_| ArticleAction::Deleted, DELETE_ARTICLE_FAILED)
            .await
    }

    pub fn set_articles(&self, articles: Vec<Article>) {
        self.dispatch(ArticleAction::SetArticles(articles));
    }

    /// Drops one article from the listing, e.g. after the view confirmed its deletion.
    pub fn remove_article(&self, document_id: &str) {
        self.dispatch(ArticleAction::RemoveArticle(document_id.to_owned()));
    }

    pub fn dismiss_success(&self) {
        self.dispatch(ArticleAction::DismissSuccess);
    }

    pub fn dismiss_failure(&self) {
        self.dispatch(ArticleAction::DismissFailure);
    }
}
