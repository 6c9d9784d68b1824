//! Application state owned by the dashboard.

use crate::filter::FilterState;
use crate::models::{Role, UserSession};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Signed-in user; `None` shows the public landing view.
    pub user: Option<UserSession>,
    pub filter: FilterState,
}

impl AppState {
    pub fn new(filter: FilterState) -> Self {
        Self { user: None, filter }
    }

    /// Role used for rendering. Anonymous viewers get the member layout.
    pub fn role(&self) -> Role {
        self.user.as_ref().map(|u| u.role).unwrap_or_default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}
