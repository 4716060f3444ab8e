use std::fmt;
use std::sync::Mutex;

/// Application views a navigator can be asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Create,
    Detail(String),
    Edit(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Login => "/login".to_owned(),
            Route::Register => "/register".to_owned(),
            Route::Create => "/create".to_owned(),
            Route::Detail(document_id) => format!("/detail/{}", document_id),
            Route::Edit(document_id) => format!("/edit/{}", document_id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Capability to move the application to another view.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Logs each navigation and remembers every route it was sent to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Route> {
        self.history().pop()
    }

    pub fn count(&self, route: &Route) -> usize {
        self.history().iter().filter(|r| *r == route).count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(path = %route, "navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}
