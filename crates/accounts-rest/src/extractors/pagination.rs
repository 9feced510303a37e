//! Search and pagination query parameters.

use accounts_core::PageRequest;
use serde::Deserialize;

/// Query string of the user search endpoint: `?q=&page=&limit=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl SearchQuery {
    /// The search term, empty when absent.
    #[must_use]
    pub fn term(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }

    /// The requested page, clamped to valid bounds.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )
    }
}
