use crate::api::error::ApiError;
use crate::models::{AuthUser, DailyStat, NewTip, Role, StatsBreakdown, TipEntry, WeekdayStat};
use crate::query::QueryParams;

pub(crate) mod client;
pub use client::TipApiClient;
pub mod error;
pub mod fetchers;
pub use fetchers::Fetchers;

#[cfg(test)]
use mockall::automock;

/// Transport-level access to the tip backend. One method per endpoint.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TipApi: Send + Sync {
    /// `GET /api/stats/breakdown`
    async fn get_breakdown(&self, params: &QueryParams) -> Result<StatsBreakdown, ApiError>;

    /// `GET /api/stats/daily`
    async fn get_daily_stats(&self, params: &QueryParams) -> Result<Vec<DailyStat>, ApiError>;

    /// `GET /api/stats/weekday`
    async fn get_weekday_stats(&self, params: &QueryParams)
    -> Result<Vec<WeekdayStat>, ApiError>;

    /// `GET /api/tips`
    async fn get_tips(&self, params: &QueryParams) -> Result<Vec<TipEntry>, ApiError>;

    /// `POST /api/tips`. Returns the stored entry when the backend echoes it.
    async fn post_tip(&self, entry: &NewTip) -> Result<Option<TipEntry>, ApiError>;

    /// `DELETE /api/tips/{id}`
    async fn delete_tip(&self, id: i64) -> Result<(), ApiError>;

    /// `GET /api/user/role`
    async fn get_role(&self) -> Result<Role, ApiError>;

    /// `POST /auth/session`: exchanges the identity provider's token for a backend session.
    async fn post_session(&self, access_token: &str) -> Result<(), ApiError>;

    /// `GET /auth/user`: the user bound to the current backend session.
    async fn get_auth_user(&self) -> Result<AuthUser, ApiError>;

    /// `POST /auth/logout`
    async fn post_logout(&self) -> Result<(), ApiError>;
}
