//! Picker configuration.

use std::time::Duration;

/// First page of the public character catalogue.
pub const DEFAULT_URL: &str = "https://rickandmortyapi.com/api/character";

/// Settings for a [`ListPresenter`](crate::presenter::ListPresenter).
///
/// ```rust,ignore
/// let config = PickerConfig::default()
///     .with_title("Cast")
///     .with_max_rows(6);
/// ```
#[derive(Debug, Clone)]
pub struct PickerConfig {
    /// URL of the first page.
    pub initial_url: String,
    /// Border title of the picker.
    pub title: String,
    /// Shown in the search line while the term is empty.
    pub placeholder: String,
    /// Upper bound on option rows in the open panel.
    pub max_rows: usize,
    /// Per-request timeout for the HTTP source.
    pub request_timeout: Duration,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            initial_url: DEFAULT_URL.to_string(),
            title: "Characters".to_string(),
            placeholder: "Search...".to_string(),
            max_rows: 8,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl PickerConfig {
    pub fn with_initial_url(mut self, url: impl Into<String>) -> Self {
        self.initial_url = url.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// At least one row is always shown.
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
