//! Transient user notifications
//!
//! Banners shown in the alert area. Each one expires after a fixed time-to-live and
//! the oldest are dropped once the queue is full.

use crate::api::error::{ApiError, Mutation, UNKNOWN_ERROR};
use crate::consts::cli_consts::{MAX_NOTIFICATIONS, views::notification_ttl};
use crate::render::escape_html;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    created: Instant,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created: Instant::now(),
        }
    }

    /// Notification for a failed mutation, worded for the user.
    pub fn for_failure(mutation: Mutation, error: &ApiError) -> Self {
        let (level, message) = match (mutation, error) {
            (_, ApiError::SampleModeReadOnly(refused)) => (
                NotificationLevel::Warning,
                match refused {
                    Mutation::CreateTip => {
                        "Cannot add tips in demo mode. Switch to Real Data mode.".to_string()
                    }
                    Mutation::DeleteTip => {
                        "Cannot delete tips in demo mode. Switch to Real Data mode.".to_string()
                    }
                },
            ),
            (_, ApiError::Validation(_)) => (NotificationLevel::Danger, error.to_string()),
            (Mutation::CreateTip, ApiError::Network(e)) => (
                NotificationLevel::Danger,
                format!("Error saving tip entry: {}", e),
            ),
            (Mutation::DeleteTip, ApiError::Network(e)) => (
                NotificationLevel::Danger,
                format!("Error deleting tip entry: {}", e),
            ),
            (Mutation::CreateTip, _) => (
                NotificationLevel::Danger,
                format!("Failed to save tip entry: {}", error.detail()),
            ),
            (Mutation::DeleteTip, _) => {
                let detail = error.detail();
                let detail = if detail.trim().is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    detail
                };
                (
                    NotificationLevel::Danger,
                    format!("Failed to delete tip entry: {}", detail),
                )
            }
        };
        Self::new(level, message)
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created) >= ttl
    }

    pub fn to_html(&self) -> String {
        format!(
            concat!(
                r#"<div id="alert-{}" class="alert alert-{} alert-dismissible fade show" role="alert">"#,
                "{}",
                r#"<button type="button" class="btn-close" data-bs-dismiss="alert"></button>"#,
                "</div>"
            ),
            self.id,
            self.level,
            escape_html(&self.message)
        )
    }
}

/// Queue of live notifications, newest last.
#[derive(Debug)]
pub struct NotificationCenter {
    active: VecDeque<Notification>,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_ttl(notification_ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            active: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.prune(Instant::now());
        if self.active.len() >= MAX_NOTIFICATIONS {
            self.active.pop_front();
        }
        self.active.push_back(notification);
    }

    /// Drops notifications older than the time-to-live.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.active.retain(|n| !n.is_expired(now, ttl));
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Alert area content for the live notifications.
    pub fn to_html(&self) -> String {
        self.active.iter().map(Notification::to_html).collect()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_mode_refusals_are_warnings() {
        let n = Notification::for_failure(
            Mutation::DeleteTip,
            &ApiError::SampleModeReadOnly(Mutation::DeleteTip),
        );
        assert_eq!(n.level, NotificationLevel::Warning);
        assert_eq!(
            n.message,
            "Cannot delete tips in demo mode. Switch to Real Data mode."
        );
    }

    #[test]
    fn validation_errors_are_listed_verbatim() {
        let n = Notification::for_failure(
            Mutation::CreateTip,
            &ApiError::Validation(vec!["Cash tips must be positive".into(), "Bad date".into()]),
        );
        assert_eq!(n.level, NotificationLevel::Danger);
        assert_eq!(
            n.message,
            "Validation errors: Cash tips must be positive, Bad date"
        );
    }

    #[test]
    fn http_failures_carry_backend_message() {
        let save = Notification::for_failure(
            Mutation::CreateTip,
            &ApiError::Http {
                status: 500,
                message: "db down".into(),
            },
        );
        assert_eq!(save.message, "Failed to save tip entry: db down");

        let delete = Notification::for_failure(
            Mutation::DeleteTip,
            &ApiError::from_status_and_body(404, ""),
        );
        assert_eq!(delete.message, "Failed to delete tip entry: Unknown error");
    }

    #[test]
    fn notifications_expire_after_ttl() {
        let mut center = NotificationCenter::new();
        center.push(Notification::new(NotificationLevel::Success, "Tip entry deleted"));
        let now = Instant::now();
        center.prune(now);
        assert_eq!(center.len(), 1);

        center.prune(now + Duration::from_millis(5_000));
        assert!(center.is_empty());
    }

    #[test]
    fn queue_is_capped() {
        let mut center = NotificationCenter::new();
        for i in 0..MAX_NOTIFICATIONS + 3 {
            center.push(Notification::new(NotificationLevel::Success, i.to_string()));
        }
        assert_eq!(center.len(), MAX_NOTIFICATIONS);
        assert_eq!(center.active().next().unwrap().message, "3");
    }

    #[test]
    fn html_escapes_message() {
        let n = Notification::new(NotificationLevel::Danger, "<b>oops</b>");
        let html = n.to_html();
        assert!(html.contains("alert-danger"));
        assert!(html.contains("&lt;b&gt;oops&lt;/b&gt;"));
    }
}
