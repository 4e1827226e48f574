//! Session and filter snapshots read by the query builder.
//!
//! The authentication store lives outside this crate. Callers hand in a
//! `Session` value on every operation instead of the core reading shared
//! state.

use serde::{Deserialize, Serialize};

/// Search filter chosen in the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub departments: Vec<String>,
}

/// Read-only view of the user session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub filter: Filter,
}

impl Session {
    /// An anonymous session with an empty filter.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged-in session carrying `token`.
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            token: token.into(),
            filter: Filter::default(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Token to send, if the session is logged in and actually holds one.
    pub fn bearer(&self) -> Option<&str> {
        (self.logged_in && !self.token.is_empty()).then_some(self.token.as_str())
    }
}
