//! Dashboard Orchestrator
//!
//! Owns the application state and keeps every view consistent with it. A refresh
//! builds the query once and runs the four fetch+render pairs concurrently; each pair
//! writes only its own targets and chart slots, so completion order does not matter.

use crate::api::error::{ApiError, Mutation};
use crate::api::{Fetchers, TipApi};
use crate::consts::cli_consts::presets;
use crate::error_classifier::ErrorClassifier;
use crate::events::{EventSender, EventType, Source};
use crate::filter::{FilterState, Mode};
use crate::logging::LogLevel;
use crate::models::{NewTip, TipEntry, UserSession};
use crate::notifications::{Notification, NotificationCenter, NotificationLevel};
use crate::query::{QueryParams, build_query, public_query};
use crate::render::views;
use crate::render::{ChartBackend, ChartSlot, ChartSlots, Surface, Target};
use crate::session;
use crate::state::AppState;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;

/// Which views rendered their data on the last refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewStatus {
    /// Quick stats and cash/card chart.
    pub breakdown: bool,
    /// Daily and hourly charts.
    pub daily: bool,
    pub weekday: bool,
    pub tips: bool,
}

impl ViewStatus {
    pub fn all_loaded(&self) -> bool {
        self.breakdown && self.daily && self.weekday && self.tips
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The date range is incomplete; nothing was fetched.
    Skipped,
    Completed(ViewStatus),
}

pub struct Dashboard {
    fetchers: Fetchers,
    state: AppState,
    surface: Arc<dyn Surface>,
    charts: Arc<dyn ChartBackend>,
    slots: ChartSlots,
    notifications: NotificationCenter,
    classifier: ErrorClassifier,
    events: EventSender,
}

impl Dashboard {
    pub fn new(
        api: Box<dyn TipApi>,
        filter: FilterState,
        surface: Arc<dyn Surface>,
        charts: Arc<dyn ChartBackend>,
        events: EventSender,
    ) -> Self {
        let dashboard = Self {
            fetchers: Fetchers::new(api),
            state: AppState::new(filter),
            surface,
            charts,
            slots: ChartSlots::new(),
            notifications: NotificationCenter::new(),
            classifier: ErrorClassifier::new(),
            events,
        };
        dashboard.render_mode_label();
        dashboard
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.state.filter
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub async fn set_mode(&mut self, mode: Mode) -> RefreshOutcome {
        self.state.filter.set_mode(mode);
        self.render_mode_label();
        self.refresh().await
    }

    pub async fn set_preset(&mut self, days: u32) -> RefreshOutcome {
        self.state.filter.set_preset(days);
        self.refresh().await
    }

    /// Selects a custom range. Nothing is fetched until both bounds form a valid range.
    pub async fn set_custom_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> RefreshOutcome {
        self.state.filter.set_custom_range(start, end);
        self.refresh().await
    }

    /// Re-fetches and re-renders every view for the current filter.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.state.filter.is_ready() {
            self.events
                .send(
                    Source::Session,
                    "Date range incomplete, refresh skipped".to_string(),
                    EventType::Skipped,
                    LogLevel::Debug,
                )
                .await;
            return RefreshOutcome::Skipped;
        }

        let params = build_query(&self.state.filter);
        let (breakdown, daily, weekday, tips) = futures::join!(
            self.refresh_breakdown(&params, Target::QuickStats, Some(ChartSlot::Breakdown)),
            self.refresh_daily(&params),
            self.refresh_weekday(&params, ChartSlot::Weekday),
            self.refresh_tips(&params),
        );
        RefreshOutcome::Completed(ViewStatus {
            breakdown,
            daily,
            weekday,
            tips,
        })
    }

    /// Landing view for signed-out visitors: sample stats and weekday chart.
    pub async fn load_public(&self) -> bool {
        let params = public_query(presets::PUBLIC_DAYS);
        let (stats, weekday) = futures::join!(
            self.refresh_breakdown(&params, Target::PublicQuickStats, None),
            self.refresh_weekday(&params, ChartSlot::PublicWeekday),
        );
        stats && weekday
    }

    /// Establishes the session and loads the role. A missing session shows the landing
    /// view. Reports are left to the caller's next refresh, once its filter is in place.
    pub async fn sign_in(&mut self, access_token: Option<&str>) -> Result<(), ApiError> {
        match session::establish(&self.fetchers, access_token).await {
            Ok(user) => {
                self.set_user(Some(user));
                self.load_role().await;
                if let Some(user) = &self.state.user {
                    self.events
                        .send(
                            Source::Session,
                            format!("Signed in as {} ({})", user.email, user.role),
                            EventType::Success,
                            LogLevel::Info,
                        )
                        .await;
                }
                Ok(())
            }
            Err(e) => {
                self.report_error(Source::Session, "Not signed in", &e).await;
                self.set_user(None);
                self.load_public().await;
                Err(e)
            }
        }
    }

    /// Re-reads the user's role and updates the badge and tip table layout.
    pub async fn load_role(&mut self) {
        let Some(mut user) = self.state.user.clone() else {
            return;
        };
        session::resolve_role(&self.fetchers, &mut user).await;
        self.set_user(Some(user));
    }

    pub async fn sign_out(&mut self) -> Result<(), ApiError> {
        if let Err(e) = session::sign_out(&self.fetchers).await {
            self.notify(Notification::new(
                NotificationLevel::Danger,
                format!("Logout failed: {}", e.detail()),
            ));
            return Err(e);
        }
        self.set_user(None);
        for slot in [
            ChartSlot::Daily,
            ChartSlot::Breakdown,
            ChartSlot::Weekday,
            ChartSlot::Hourly,
        ] {
            self.slots.clear(self.charts.as_ref(), slot);
        }
        for target in [
            Target::QuickStats,
            Target::TipsTableHead,
            Target::TipsTableBody,
        ] {
            self.surface.clear(target);
        }
        self.load_public().await;
        Ok(())
    }

    /// Saves a tip and refreshes on success; failures become notifications.
    pub async fn create_tip(&mut self, entry: &NewTip) -> Result<Option<TipEntry>, ApiError> {
        let mode = self.state.filter.mode();
        match self.fetchers.create_tip(mode, entry).await {
            Ok(created) => {
                self.notify(Notification::new(
                    NotificationLevel::Success,
                    "Tip entry saved successfully!",
                ));
                self.events
                    .send(
                        Source::Mutation,
                        format!("Saved tip entry for {}", entry.work_date),
                        EventType::Success,
                        LogLevel::Info,
                    )
                    .await;
                self.refresh().await;
                Ok(created)
            }
            Err(e) => {
                self.notify(Notification::for_failure(Mutation::CreateTip, &e));
                self.report_error(Source::Mutation, "Failed to save tip entry", &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Deletes a tip and refreshes on success; failures become notifications.
    pub async fn delete_tip(&mut self, id: i64) -> Result<(), ApiError> {
        let mode = self.state.filter.mode();
        match self.fetchers.delete_tip(mode, id).await {
            Ok(()) => {
                self.notify(Notification::new(
                    NotificationLevel::Success,
                    "Tip entry deleted",
                ));
                self.events
                    .send(
                        Source::Mutation,
                        format!("Deleted tip entry {}", id),
                        EventType::Success,
                        LogLevel::Info,
                    )
                    .await;
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.notify(Notification::for_failure(Mutation::DeleteTip, &e));
                self.report_error(Source::Mutation, "Failed to delete tip entry", &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Drops expired notifications from the alert area.
    pub fn dismiss_expired(&mut self, now: Instant) {
        self.notifications.prune(now);
        self.render_alerts();
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
        self.render_alerts();
    }

    fn render_alerts(&self) {
        if self.notifications.is_empty() {
            self.surface.clear(Target::AlertArea);
        } else {
            self.surface
                .set_content(Target::AlertArea, self.notifications.to_html());
        }
    }

    fn render_mode_label(&self) {
        self.surface.set_content(
            Target::ModeLabel,
            views::mode_label(self.state.filter.mode()),
        );
    }

    fn set_user(&mut self, user: Option<UserSession>) {
        match &user {
            Some(user) => {
                self.surface
                    .set_content(Target::UserBadge, views::user_badge(user));
                self.surface
                    .set_content(Target::TipsTableHead, views::tips_table_head(user.role));
            }
            None => self.surface.clear(Target::UserBadge),
        }
        self.state.user = user;
    }

    async fn refresh_breakdown(
        &self,
        params: &QueryParams,
        target: Target,
        chart: Option<ChartSlot>,
    ) -> bool {
        match self.fetchers.fetch_breakdown(params).await {
            Ok(breakdown) => {
                self.surface
                    .set_content(target, views::quick_stats(&breakdown));
                if let Some(slot) = chart {
                    self.slots.render(
                        self.charts.as_ref(),
                        slot,
                        &views::breakdown_chart(&breakdown),
                    );
                }
                self.report_loaded(Source::Breakdown, format!("Total {:.2}", breakdown.total_tips))
                    .await;
                true
            }
            Err(e) => {
                self.surface
                    .set_content(target, views::STATS_FAILED.to_string());
                if let Some(slot) = chart {
                    self.slots.clear(self.charts.as_ref(), slot);
                }
                self.report_error(Source::Breakdown, "Failed to load stats", &e)
                    .await;
                false
            }
        }
    }

    async fn refresh_daily(&self, params: &QueryParams) -> bool {
        match self.fetchers.fetch_daily(params).await {
            Ok(stats) => {
                let charts = self.charts.as_ref();
                self.slots
                    .render(charts, ChartSlot::Daily, &views::daily_chart(&stats));
                self.slots
                    .render(charts, ChartSlot::Hourly, &views::hourly_chart(&stats));
                self.report_loaded(Source::Daily, format!("{} days", stats.len()))
                    .await;
                true
            }
            Err(e) => {
                let charts = self.charts.as_ref();
                self.slots.clear(charts, ChartSlot::Daily);
                self.slots.clear(charts, ChartSlot::Hourly);
                self.report_error(Source::Daily, "Failed to load daily chart", &e)
                    .await;
                false
            }
        }
    }

    async fn refresh_weekday(&self, params: &QueryParams, slot: ChartSlot) -> bool {
        match self.fetchers.fetch_weekday(params).await {
            Ok(stats) => {
                self.slots
                    .render(self.charts.as_ref(), slot, &views::weekday_chart(&stats));
                self.report_loaded(Source::Weekday, format!("{} weekdays", stats.len()))
                    .await;
                true
            }
            Err(e) => {
                self.slots.clear(self.charts.as_ref(), slot);
                self.report_error(Source::Weekday, "Failed to load weekday chart", &e)
                    .await;
                false
            }
        }
    }

    async fn refresh_tips(&self, params: &QueryParams) -> bool {
        let role = self.state.role();
        match self.fetchers.fetch_tips(params).await {
            Ok(tips) => {
                self.surface
                    .set_content(Target::TipsTableBody, views::tips_table_body(&tips, role));
                self.report_loaded(Source::Tips, format!("{} entries", tips.len()))
                    .await;
                true
            }
            Err(e) => {
                self.surface
                    .set_content(Target::TipsTableBody, views::tips_table_failed(role));
                self.report_error(Source::Tips, "Failed to load entries", &e)
                    .await;
                false
            }
        }
    }

    async fn report_loaded(&self, source: Source, msg: String) {
        self.events
            .send(source, msg, EventType::Refresh, LogLevel::Debug)
            .await;
    }

    async fn report_error(&self, source: Source, context: &str, error: &ApiError) {
        let level = self.classifier.classify_fetch_error(error);
        self.events
            .send(
                source,
                format!("{}: {}", context, error),
                EventType::Error,
                level,
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTipApi;
    use crate::models::{AuthUser, DailyStat, Role, StatsBreakdown, WeekdayStat};
    use crate::render::{ChartJsBackend, HtmlPage};
    use tokio::sync::mpsc;

    struct Harness {
        dashboard: Dashboard,
        page: Arc<HtmlPage>,
        charts: Arc<ChartJsBackend>,
        _events: mpsc::Receiver<crate::events::Event>,
    }

    fn harness(api: impl TipApi + 'static, filter: FilterState) -> Harness {
        let page = Arc::new(HtmlPage::new());
        let charts = Arc::new(ChartJsBackend::new());
        // Large enough that event sends never wait on the test.
        let (sender, receiver) = mpsc::channel(1024);
        let dashboard = Dashboard::new(
            Box::new(api),
            filter,
            page.clone(),
            charts.clone(),
            EventSender::new(sender),
        );
        Harness {
            dashboard,
            page,
            charts,
            _events: receiver,
        }
    }

    fn breakdown() -> StatsBreakdown {
        StatsBreakdown {
            total_tips: 100.0,
            cash_tips: 40.0,
            card_tips: 60.0,
            cash_percentage: 40.0,
            card_percentage: 60.0,
        }
    }

    fn daily() -> Vec<DailyStat> {
        vec![DailyStat {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            total_tips: 100.0,
            avg_tips_per_hour: 25.0,
            total_cash: 40.0,
            total_card: 60.0,
            total_hours: 4.0,
        }]
    }

    fn weekday() -> Vec<WeekdayStat> {
        vec![WeekdayStat {
            weekday_name: "Tuesday".to_string(),
            avg_tips: 100.0,
            weekday: Some(2),
            avg_cash: 40.0,
            avg_card: 60.0,
            avg_hours: 4.0,
            avg_tips_per_hour: 25.0,
        }]
    }

    fn tip(id: i64) -> TipEntry {
        TipEntry::new(
            id,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            40.0,
            60.0,
            4.0,
            "",
            Some("Dana".to_string()),
        )
    }

    /// Every read endpoint succeeds `times` times.
    fn expect_reads(api: &mut MockTipApi, times: usize) {
        api.expect_get_breakdown()
            .times(times)
            .returning(|_| Ok(breakdown()));
        api.expect_get_daily_stats()
            .times(times)
            .returning(|_| Ok(daily()));
        api.expect_get_weekday_stats()
            .times(times)
            .returning(|_| Ok(weekday()));
        api.expect_get_tips()
            .times(times)
            .returning(|_| Ok(vec![tip(1)]));
    }

    #[tokio::test]
    async fn refresh_renders_every_view() {
        let mut api = MockTipApi::new();
        expect_reads(&mut api, 1);
        let h = harness(api, FilterState::default());

        let outcome = h.dashboard.refresh().await;
        match outcome {
            RefreshOutcome::Completed(status) => assert!(status.all_loaded()),
            RefreshOutcome::Skipped => panic!("refresh skipped"),
        }
        assert!(h.page.content(Target::QuickStats).unwrap().contains("$100.00"));
        assert!(h.page.content(Target::TipsTableBody).unwrap().contains("$100.00"));
        assert_eq!(h.charts.live_instances(), 4);
        assert_eq!(h.page.content(Target::ModeLabel).as_deref(), Some("Real Data"));
    }

    #[tokio::test]
    async fn repeated_refreshes_keep_one_chart_per_slot() {
        let mut api = MockTipApi::new();
        expect_reads(&mut api, 3);
        let mut h = harness(api, FilterState::default());

        h.dashboard.refresh().await;
        h.dashboard.set_preset(7).await;
        h.dashboard.set_preset(90).await;
        assert_eq!(h.charts.live_instances(), 4);
    }

    #[tokio::test]
    async fn every_request_carries_the_same_filter() {
        let mut api = MockTipApi::new();
        let expected = "?demo=true&days=7";
        api.expect_get_breakdown()
            .withf(move |p| p.to_string() == expected)
            .times(1)
            .returning(|_| Ok(breakdown()));
        api.expect_get_daily_stats()
            .withf(move |p| p.to_string() == expected)
            .times(1)
            .returning(|_| Ok(daily()));
        api.expect_get_weekday_stats()
            .withf(move |p| p.to_string() == expected)
            .times(1)
            .returning(|_| Ok(weekday()));
        api.expect_get_tips()
            .withf(move |p| p.to_string() == expected)
            .times(1)
            .returning(|_| Ok(vec![]));
        let mut h = harness(api, FilterState::new(Mode::Sample, crate::filter::DateRange::LastNDays(7)));

        h.dashboard.refresh().await;
        assert_eq!(h.page.content(Target::ModeLabel).as_deref(), Some("Test Data"));
        assert!(
            h.page
                .content(Target::TipsTableBody)
                .unwrap()
                .contains("No entries found")
        );
        // Mode changes re-render the label even when nothing is fetched.
        h.dashboard.state.filter.set_custom_range(None, None);
        assert_eq!(h.dashboard.set_mode(Mode::Live).await, RefreshOutcome::Skipped);
        assert_eq!(h.page.content(Target::ModeLabel).as_deref(), Some("Real Data"));
    }

    #[tokio::test]
    async fn incomplete_custom_range_issues_no_requests() {
        let mut api = MockTipApi::new();
        api.expect_get_breakdown().never();
        api.expect_get_daily_stats().never();
        api.expect_get_weekday_stats().never();
        api.expect_get_tips().never();
        let mut h = harness(api, FilterState::default());

        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(
            h.dashboard.set_custom_range(start, None).await,
            RefreshOutcome::Skipped
        );
        let end = NaiveDate::from_ymd_opt(2023, 12, 1);
        assert_eq!(
            h.dashboard.set_custom_range(start, end).await,
            RefreshOutcome::Skipped
        );
        assert!(h.dashboard.filter().custom_range_visible());
    }

    #[tokio::test]
    async fn failed_view_shows_placeholder_while_others_render() {
        let mut api = MockTipApi::new();
        api.expect_get_breakdown().times(1).returning(|_| {
            Err(ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            })
        });
        api.expect_get_daily_stats()
            .times(1)
            .returning(|_| Ok(daily()));
        api.expect_get_weekday_stats()
            .times(1)
            .returning(|_| Ok(weekday()));
        api.expect_get_tips().times(1).returning(|_| {
            Err(ApiError::Http {
                status: 503,
                message: "down".to_string(),
            })
        });
        let h = harness(api, FilterState::default());

        let RefreshOutcome::Completed(status) = h.dashboard.refresh().await else {
            panic!("refresh skipped");
        };
        assert!(!status.breakdown && !status.tips);
        assert!(status.daily && status.weekday);
        assert_eq!(
            h.page.content(Target::QuickStats).as_deref(),
            Some(views::STATS_FAILED)
        );
        assert!(
            h.page
                .content(Target::TipsTableBody)
                .unwrap()
                .contains(r#"colspan="8" class="text-center text-danger">Failed to load entries"#)
        );
        assert_eq!(h.charts.live_instances(), 3);
    }

    #[tokio::test]
    async fn sample_mode_delete_warns_without_request() {
        let mut api = MockTipApi::new();
        api.expect_delete_tip().never();
        api.expect_get_tips().never();
        let mut h = harness(
            api,
            FilterState::new(Mode::Sample, crate::filter::DateRange::LastNDays(30)),
        );

        let result = h.dashboard.delete_tip(9).await;
        assert!(matches!(result, Err(ApiError::SampleModeReadOnly(_))));
        let alerts = h.page.content(Target::AlertArea).unwrap();
        assert!(alerts.contains("alert-warning"));
        assert!(alerts.contains("Cannot delete tips in demo mode. Switch to Real Data mode."));
    }

    #[tokio::test]
    async fn validation_errors_are_shown_and_nothing_refreshes() {
        let mut api = MockTipApi::new();
        api.expect_post_tip().times(1).returning(|_| {
            Err(ApiError::Validation(vec![
                "Cash tips must be a positive number".to_string(),
            ]))
        });
        api.expect_get_tips().never();
        let mut h = harness(api, FilterState::default());

        let entry = NewTip::new(-1.0, 0.0, 1.0, "", None);
        assert!(h.dashboard.create_tip(&entry).await.is_err());
        assert!(
            h.page
                .content(Target::AlertArea)
                .unwrap()
                .contains("Validation errors: Cash tips must be a positive number")
        );
    }

    #[tokio::test]
    async fn successful_mutations_notify_and_refresh() {
        let mut api = MockTipApi::new();
        api.expect_post_tip()
            .times(1)
            .returning(|_| Ok(Some(tip(2))));
        api.expect_delete_tip()
            .withf(|id| *id == 2)
            .times(1)
            .returning(|_| Ok(()));
        expect_reads(&mut api, 2);
        let mut h = harness(api, FilterState::default());

        let created = h
            .dashboard
            .create_tip(&NewTip::new(40.0, 60.0, 4.0, "", None))
            .await
            .unwrap();
        assert_eq!(created.map(|t| t.id), Some(2));
        h.dashboard.delete_tip(2).await.unwrap();

        let alerts = h.page.content(Target::AlertArea).unwrap();
        assert!(alerts.contains("Tip entry saved successfully!"));
        assert!(alerts.contains("Tip entry deleted"));
        assert_eq!(h.dashboard.notifications().len(), 2);

        h.dashboard
            .dismiss_expired(Instant::now() + std::time::Duration::from_secs(5));
        assert!(h.page.content(Target::AlertArea).is_none());
    }

    #[tokio::test]
    async fn managers_get_the_owner_column() {
        let mut api = MockTipApi::new();
        api.expect_post_session().never();
        api.expect_get_auth_user().times(1).returning(|| {
            Ok(AuthUser {
                id: "m".to_string(),
                email: "boss@example.com".to_string(),
                name: None,
            })
        });
        api.expect_get_role().times(1).returning(|| Ok(Role::Manager));
        expect_reads(&mut api, 1);
        let mut h = harness(api, FilterState::default());

        h.dashboard.sign_in(None).await.unwrap();
        h.dashboard.refresh().await;
        assert_eq!(h.dashboard.state().role(), Role::Manager);
        let head = h.page.content(Target::TipsTableHead).unwrap();
        assert_eq!(head.matches("<th>").count(), 9);
        let body = h.page.content(Target::TipsTableBody).unwrap();
        assert!(body.contains("<td>Dana</td>"));
        assert!(
            h.page
                .content(Target::UserBadge)
                .unwrap()
                .contains("boss@example.com")
        );
    }

    #[tokio::test]
    async fn role_reload_updates_badge_and_header() {
        let mut api = MockTipApi::new();
        api.expect_get_auth_user().times(1).returning(|| {
            Ok(AuthUser {
                id: "s".to_string(),
                email: "sam@example.com".to_string(),
                name: Some("Sam".to_string()),
            })
        });
        let mut roles = vec![Role::Manager, Role::Member];
        api.expect_get_role()
            .times(2)
            .returning(move || Ok(roles.pop().unwrap()));
        api.expect_get_tips().never();
        let mut h = harness(api, FilterState::default());

        h.dashboard.sign_in(None).await.unwrap();
        assert_eq!(h.dashboard.state().role(), Role::Member);

        h.dashboard.load_role().await;
        assert_eq!(h.dashboard.state().role(), Role::Manager);
        assert!(h.page.content(Target::UserBadge).unwrap().contains(">Manager<"));
        assert!(
            h.page
                .content(Target::TipsTableHead)
                .unwrap()
                .contains("<th>User</th>")
        );
    }

    #[tokio::test]
    async fn sign_out_tears_down_the_signed_in_views() {
        let mut api = MockTipApi::new();
        api.expect_get_auth_user().times(1).returning(|| {
            Ok(AuthUser {
                id: "s".to_string(),
                email: "sam@example.com".to_string(),
                name: None,
            })
        });
        api.expect_get_role().times(1).returning(|| Ok(Role::Member));
        api.expect_post_logout().times(1).returning(|| Ok(()));
        // One signed-in refresh, then the public view.
        expect_reads(&mut api, 1);
        api.expect_get_breakdown()
            .withf(|p| p.contains("demo"))
            .times(1)
            .returning(|_| Ok(breakdown()));
        api.expect_get_weekday_stats()
            .withf(|p| p.contains("demo"))
            .times(1)
            .returning(|_| Ok(weekday()));
        let mut h = harness(api, FilterState::default());

        h.dashboard.sign_in(None).await.unwrap();
        h.dashboard.refresh().await;
        h.dashboard.sign_out().await.unwrap();

        assert!(!h.dashboard.state().is_signed_in());
        assert!(h.page.content(Target::UserBadge).is_none());
        assert!(h.page.content(Target::TipsTableBody).is_none());
        assert_eq!(h.charts.live_instances(), 1);
    }

    #[tokio::test]
    async fn signed_out_visitors_get_the_public_view() {
        let mut api = MockTipApi::new();
        api.expect_get_auth_user().times(1).returning(|| {
            Err(ApiError::Http {
                status: 401,
                message: "Not authenticated".to_string(),
            })
        });
        api.expect_get_breakdown()
            .withf(|p| p.to_string() == "?demo=true&days=30")
            .times(1)
            .returning(|_| Ok(breakdown()));
        api.expect_get_weekday_stats()
            .withf(|p| p.to_string() == "?demo=true&days=30")
            .times(1)
            .returning(|_| Ok(weekday()));
        api.expect_get_tips().never();
        let mut h = harness(api, FilterState::default());

        assert!(h.dashboard.sign_in(None).await.is_err());
        assert!(!h.dashboard.state().is_signed_in());
        assert!(h.page.content(Target::PublicQuickStats).is_some());
        assert_eq!(h.charts.live_instances(), 1);
    }

    #[tokio::test]
    async fn failed_chart_fetch_removes_the_stale_chart() {
        let mut api = MockTipApi::new();
        api.expect_get_breakdown()
            .times(2)
            .returning(|_| Ok(breakdown()));
        api.expect_get_tips()
            .times(2)
            .returning(|_| Ok(vec![tip(1)]));
        let mut daily_calls = 0;
        api.expect_get_daily_stats().times(2).returning(move |_| {
            daily_calls += 1;
            if daily_calls == 1 {
                Ok(daily())
            } else {
                Err(ApiError::Http {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        });
        let mut weekday_calls = 0;
        api.expect_get_weekday_stats().times(2).returning(move |_| {
            weekday_calls += 1;
            if weekday_calls == 1 {
                Ok(weekday())
            } else {
                Err(ApiError::Http {
                    status: 502,
                    message: "bad gateway".to_string(),
                })
            }
        });
        let mut h = harness(api, FilterState::default());

        h.dashboard.refresh().await;
        assert_eq!(h.charts.live_instances(), 4);

        let RefreshOutcome::Completed(status) = h.dashboard.set_preset(7).await else {
            panic!("refresh skipped");
        };
        assert!(!status.daily && !status.weekday);
        assert_eq!(h.charts.live_instances(), 1);
        for slot in [ChartSlot::Daily, ChartSlot::Hourly, ChartSlot::Weekday] {
            assert!(h.dashboard.slots.handle(slot).is_none(), "{:?} still live", slot);
        }
        assert!(h.dashboard.slots.handle(ChartSlot::Breakdown).is_some());
    }

    /// Serves fixed reports, each after its own delay, and records which finished first.
    struct DelayedApi {
        delays_ms: [u64; 4],
        finished: Arc<std::sync::Mutex<Vec<&'static str>>>,
    }

    impl DelayedApi {
        fn new(delays_ms: [u64; 4]) -> Self {
            Self {
                delays_ms,
                finished: Arc::default(),
            }
        }

        async fn wait(&self, index: usize, name: &'static str) {
            tokio::time::sleep(std::time::Duration::from_millis(self.delays_ms[index])).await;
            self.finished.lock().unwrap().push(name);
        }
    }

    #[async_trait::async_trait]
    impl TipApi for DelayedApi {
        async fn get_breakdown(&self, _: &QueryParams) -> Result<StatsBreakdown, ApiError> {
            self.wait(0, "breakdown").await;
            Ok(breakdown())
        }

        async fn get_daily_stats(&self, _: &QueryParams) -> Result<Vec<DailyStat>, ApiError> {
            self.wait(1, "daily").await;
            Ok(daily())
        }

        async fn get_weekday_stats(&self, _: &QueryParams) -> Result<Vec<WeekdayStat>, ApiError> {
            self.wait(2, "weekday").await;
            Ok(weekday())
        }

        async fn get_tips(&self, _: &QueryParams) -> Result<Vec<TipEntry>, ApiError> {
            self.wait(3, "tips").await;
            Ok(vec![tip(1), tip(2)])
        }

        async fn post_tip(&self, _: &NewTip) -> Result<Option<TipEntry>, ApiError> {
            unreachable!("refresh does not write")
        }

        async fn delete_tip(&self, _: i64) -> Result<(), ApiError> {
            unreachable!("refresh does not write")
        }

        async fn get_role(&self) -> Result<Role, ApiError> {
            unreachable!("refresh does not touch the session")
        }

        async fn post_session(&self, _: &str) -> Result<(), ApiError> {
            unreachable!("refresh does not touch the session")
        }

        async fn get_auth_user(&self) -> Result<AuthUser, ApiError> {
            unreachable!("refresh does not touch the session")
        }

        async fn post_logout(&self) -> Result<(), ApiError> {
            unreachable!("refresh does not touch the session")
        }
    }

    async fn render_with_delays(delays_ms: [u64; 4]) -> (String, usize, Vec<&'static str>) {
        let api = DelayedApi::new(delays_ms);
        let finished = api.finished.clone();
        let h = harness(api, FilterState::default());

        let RefreshOutcome::Completed(status) = h.dashboard.refresh().await else {
            panic!("refresh skipped");
        };
        assert!(status.all_loaded());
        let order = finished.lock().unwrap().clone();
        (h.page.to_document(&h.charts), h.charts.live_instances(), order)
    }

    #[tokio::test]
    async fn completion_order_does_not_change_the_page() {
        let (immediate, immediate_charts, _) = render_with_delays([0, 0, 0, 0]).await;
        let (staggered, staggered_charts, order) = render_with_delays([60, 40, 20, 0]).await;

        assert_eq!(order, vec!["tips", "weekday", "daily", "breakdown"]);
        assert_eq!(staggered_charts, 4);
        assert_eq!(staggered_charts, immediate_charts);
        assert_eq!(staggered, immediate);
    }
}
