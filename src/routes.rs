// Top-level views of the panel. No guards, no parameters.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Dashboard,
    Configs,
    Logs,
    Settings,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Dashboard, Route::Configs, Route::Logs, Route::Settings];

    pub fn name(&self) -> &'static str {
        match self {
            Route::Dashboard => "dashboard",
            Route::Configs => "configs",
            Route::Logs => "logs",
            Route::Settings => "settings",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Configs => "/configs",
            Route::Logs => "/logs",
            Route::Settings => "/settings",
        }
    }

    /// Exact match; a trailing slash is tolerated
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }
}
