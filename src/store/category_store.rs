use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::{authorize, ActionOutcome, Reducer};
use crate::api;
use crate::http_client::ApiClient;
use crate::models::Category;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryState {
    pub categories: Vec<Category>,
    pub pending: usize,
    pub error: bool,
}

impl CategoryState {
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryAction {
    Started,
    Finished,
    Loaded(Vec<Category>),
    Failed,
}

pub struct CategoryReducer;

impl Reducer for CategoryReducer {
    type State = CategoryState;
    type Intent = CategoryAction;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            CategoryAction::Started => CategoryState {
                pending: state.pending + 1,
                ..state
            },
            CategoryAction::Finished => CategoryState {
                pending: state.pending.saturating_sub(1),
                ..state
            },
            CategoryAction::Loaded(categories) => CategoryState {
                categories,
                error: false,
                ..state
            },
            CategoryAction::Failed => CategoryState {
                error: true,
                ..state
            },
        }
    }
}

pub struct CategoryStore {
    client: ApiClient,
    state: watch::Sender<CategoryState>,
    generation: AtomicU64,
}

impl CategoryStore {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(CategoryState::default());
        Self {
            client,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> CategoryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CategoryState> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: CategoryAction) {
        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = CategoryReducer::reduce(current, action);
        });
    }

    pub async fn fetch_categories(&self) -> ActionOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(CategoryAction::Started);
        if !authorize(&self.client).await {
            self.dispatch(CategoryAction::Finished);
            return ActionOutcome::Unauthenticated;
        }

        let result = api::list_categories(&self.client).await;
        let (action, outcome) = match result {
            Ok(categories) => (CategoryAction::Loaded(categories), ActionOutcome::Succeeded),
            Err(error) => {
                tracing::warn!(%error, "failed to fetch categories");
                (CategoryAction::Failed, ActionOutcome::Failed)
            }
        };
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let current = std::mem::take(state);
            *state = CategoryReducer::reduce(current, action);
            true
        });

        self.dispatch(CategoryAction::Finished);
        if applied {
            outcome
        } else {
            ActionOutcome::Superseded
        }
    }
}
