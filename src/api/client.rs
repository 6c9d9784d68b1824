//! Tip Backend Client
//!
//! reqwest implementation of [`TipApi`]. The client keeps a cookie store so the
//! session established by `POST /auth/session` is sent with every later request.

use crate::api::TipApi;
use crate::api::error::ApiError;
use crate::consts::cli_consts::{endpoints, network};
use crate::environment::Environment;
use crate::models::{
    AuthUser, BreakdownResponse, CreatedTipResponse, DailyStat, DailyStatsResponse, NewTip, Role,
    RoleResponse, SessionRequest, StatsBreakdown, TipEntry, TipsResponse, WeekdayStat,
    WeekdayStatsResponse,
};
use crate::query::QueryParams;
use log::debug;
use reqwest::{Client, ClientBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

// User-Agent string with the client version
const USER_AGENT: &str = concat!("tip-dashboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct TipApiClient {
    client: Client,
    environment: Environment,
}

impl TipApiClient {
    pub fn new(environment: Environment) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(network::connect_timeout())
            .timeout(network::request_timeout())
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            environment,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.base_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn decode_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        serde_json::from_slice(bytes).map_err(ApiError::Decode)
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<T, ApiError> {
        let url = self.build_url(&params.apply_to(endpoint));
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    async fn post_request<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.build_url(endpoint);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        Self::handle_response_status(response).await
    }

    async fn post_request_no_body(&self, endpoint: &str) -> Result<(), ApiError> {
        let url = self.build_url(endpoint);
        debug!("POST {}", url);
        let response = self.client.post(&url).send().await?;
        Self::handle_response_status(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TipApi for TipApiClient {
    async fn get_breakdown(&self, params: &QueryParams) -> Result<StatsBreakdown, ApiError> {
        let response: BreakdownResponse = self.get_request(endpoints::BREAKDOWN, params).await?;
        Ok(response.breakdown)
    }

    async fn get_daily_stats(&self, params: &QueryParams) -> Result<Vec<DailyStat>, ApiError> {
        let response: DailyStatsResponse = self.get_request(endpoints::DAILY, params).await?;
        Ok(response.daily_stats)
    }

    async fn get_weekday_stats(
        &self,
        params: &QueryParams,
    ) -> Result<Vec<WeekdayStat>, ApiError> {
        let response: WeekdayStatsResponse = self.get_request(endpoints::WEEKDAY, params).await?;
        Ok(response.weekday_stats)
    }

    async fn get_tips(&self, params: &QueryParams) -> Result<Vec<TipEntry>, ApiError> {
        let response: TipsResponse = self.get_request(endpoints::TIPS, params).await?;
        Ok(response.tips)
    }

    async fn post_tip(&self, entry: &NewTip) -> Result<Option<TipEntry>, ApiError> {
        let response = self.post_request(endpoints::TIPS, entry).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let created: CreatedTipResponse = Self::decode_response(&bytes)?;
        Ok(created.tip_entry)
    }

    async fn delete_tip(&self, id: i64) -> Result<(), ApiError> {
        let url = self.build_url(&format!("{}/{}", endpoints::TIPS, id));
        debug!("DELETE {}", url);
        let response = self.client.delete(&url).send().await?;
        Self::handle_response_status(response).await?;
        Ok(())
    }

    async fn get_role(&self) -> Result<Role, ApiError> {
        let response: RoleResponse = self
            .get_request(endpoints::USER_ROLE, &QueryParams::new())
            .await?;
        Ok(response.role)
    }

    async fn post_session(&self, access_token: &str) -> Result<(), ApiError> {
        self.post_request(endpoints::AUTH_SESSION, &SessionRequest { access_token })
            .await?;
        Ok(())
    }

    async fn get_auth_user(&self) -> Result<AuthUser, ApiError> {
        self.get_request(endpoints::AUTH_USER, &QueryParams::new())
            .await
    }

    async fn post_logout(&self) -> Result<(), ApiError> {
        self.post_request_no_body(endpoints::AUTH_LOGOUT).await
    }
}
