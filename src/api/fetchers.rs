//! Data fetchers: one call per report, single attempt, failures returned as values.

use crate::api::TipApi;
use crate::api::error::{ApiError, Mutation};
use crate::error_classifier::ErrorClassifier;
use crate::filter::Mode;
use crate::models::{AuthUser, DailyStat, NewTip, Role, StatsBreakdown, TipEntry, WeekdayStat};
use crate::query::QueryParams;
use log::log;

/// Wraps a [`TipApi`] with the read-only guard for sample mode and failure logging.
///
/// No caching and no retry: the caller decides whether to re-trigger on the next refresh.
pub struct Fetchers {
    api: Box<dyn TipApi>,
    classifier: ErrorClassifier,
}

impl Fetchers {
    pub fn new(api: Box<dyn TipApi>) -> Self {
        Self {
            api,
            classifier: ErrorClassifier::new(),
        }
    }

    pub async fn fetch_breakdown(&self, params: &QueryParams) -> Result<StatsBreakdown, ApiError> {
        let result = self.api.get_breakdown(params).await;
        self.observe("breakdown", result)
    }

    pub async fn fetch_daily(&self, params: &QueryParams) -> Result<Vec<DailyStat>, ApiError> {
        let result = self.api.get_daily_stats(params).await;
        self.observe("daily stats", result)
    }

    pub async fn fetch_weekday(&self, params: &QueryParams) -> Result<Vec<WeekdayStat>, ApiError> {
        let result = self.api.get_weekday_stats(params).await;
        self.observe("weekday stats", result)
    }

    pub async fn fetch_tips(&self, params: &QueryParams) -> Result<Vec<TipEntry>, ApiError> {
        let result = self.api.get_tips(params).await;
        self.observe("tips", result)
    }

    /// Submits a tip. Refused without a request while in sample mode.
    pub async fn create_tip(
        &self,
        mode: Mode,
        entry: &NewTip,
    ) -> Result<Option<TipEntry>, ApiError> {
        if mode.is_sample() {
            return self.observe(
                "create tip",
                Err(ApiError::SampleModeReadOnly(Mutation::CreateTip)),
            );
        }
        let result = self.api.post_tip(entry).await;
        self.observe("create tip", result)
    }

    /// Deletes a tip. Refused without a request while in sample mode.
    pub async fn delete_tip(&self, mode: Mode, id: i64) -> Result<(), ApiError> {
        if mode.is_sample() {
            return self.observe(
                "delete tip",
                Err(ApiError::SampleModeReadOnly(Mutation::DeleteTip)),
            );
        }
        let result = self.api.delete_tip(id).await;
        self.observe("delete tip", result)
    }

    pub async fn fetch_role(&self) -> Result<Role, ApiError> {
        let result = self.api.get_role().await;
        self.observe("user role", result)
    }

    pub async fn sync_session(&self, access_token: &str) -> Result<(), ApiError> {
        let result = self.api.post_session(access_token).await;
        self.observe("session sync", result)
    }

    pub async fn current_user(&self) -> Result<AuthUser, ApiError> {
        let result = self.api.get_auth_user().await;
        self.observe("current user", result)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.api.post_logout().await;
        self.observe("logout", result)
    }

    /// Logs failures at the level the classifier picks and passes the result through.
    fn observe<T>(&self, what: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result {
            let level: log::Level = self.classifier.classify_fetch_error(e).into();
            log!(level, "Request for {} failed: {}", what, e);
        }
        result
    }
}
