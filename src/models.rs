//! Payloads exchanged with the tip backend.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Role of the signed-in user. Managers see every user's entries and the owner column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum::Display)]
#[serde(from = "String")]
pub enum Role {
    #[default]
    Member,
    Manager,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("manager") {
            Role::Manager
        } else {
            Role::Member
        }
    }
}

impl Role {
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager)
    }

    /// Badge text shown next to the user name.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Member => "Server",
            Role::Manager => "Manager",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// Body of `GET /auth/user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<AuthUser> for UserSession {
    fn from(user: AuthUser) -> Self {
        let display_name = match user.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => user.email.clone(),
        };
        Self {
            id: user.id,
            email: user.email,
            display_name,
            role: Role::Member,
        }
    }
}

/// Tips per hour for a shift; zero when no hours were recorded.
pub fn tips_per_hour(total_tips: f64, hours_worked: f64) -> f64 {
    if hours_worked > 0.0 {
        total_tips / hours_worked
    } else {
        0.0
    }
}

/// A tip entry as returned by `GET /api/tips`.
///
/// `total_tips` and `tips_per_hour` are recomputed from the raw amounts when the
/// entry is decoded, so they always agree with `cash_tips`, `card_tips` and
/// `hours_worked`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TipRecord")]
pub struct TipEntry {
    pub id: i64,
    pub work_date: NaiveDate,
    pub cash_tips: f64,
    pub card_tips: f64,
    pub total_tips: f64,
    pub hours_worked: f64,
    pub tips_per_hour: f64,
    pub comments: String,
    /// Name of the user who recorded the entry. Only meaningful for managers.
    pub owner_name: Option<String>,
}

impl TipEntry {
    pub fn new(
        id: i64,
        work_date: NaiveDate,
        cash_tips: f64,
        card_tips: f64,
        hours_worked: f64,
        comments: impl Into<String>,
        owner_name: Option<String>,
    ) -> Self {
        let total_tips = cash_tips + card_tips;
        Self {
            id,
            work_date,
            cash_tips,
            card_tips,
            total_tips,
            hours_worked,
            tips_per_hour: tips_per_hour(total_tips, hours_worked),
            comments: comments.into(),
            owner_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TipRecord {
    id: i64,
    work_date: String,
    #[serde(default)]
    cash_tips: f64,
    #[serde(default)]
    card_tips: f64,
    #[serde(default)]
    hours_worked: f64,
    #[serde(default)]
    comments: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
}

impl TryFrom<TipRecord> for TipEntry {
    type Error = String;

    fn try_from(record: TipRecord) -> Result<Self, Self::Error> {
        let work_date = parse_work_date(&record.work_date)?;
        Ok(TipEntry::new(
            record.id,
            work_date,
            record.cash_tips,
            record.card_tips,
            record.hours_worked,
            record.comments.unwrap_or_default(),
            record.user_name,
        ))
    }
}

/// Accepts `YYYY-MM-DD` as well as a full timestamp starting with the date.
pub fn parse_work_date(raw: &str) -> Result<NaiveDate, String> {
    let date_part = raw.split('T').next().unwrap_or(raw).trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| format!("invalid work_date {:?}: {}", raw, e))
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatsBreakdown {
    #[serde(default)]
    pub total_tips: f64,
    #[serde(default)]
    pub cash_tips: f64,
    #[serde(default)]
    pub card_tips: f64,
    #[serde(default)]
    pub cash_percentage: f64,
    #[serde(default)]
    pub card_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    #[serde(default)]
    pub total_tips: f64,
    #[serde(default)]
    pub avg_tips_per_hour: f64,
    #[serde(default)]
    pub total_cash: f64,
    #[serde(default)]
    pub total_card: f64,
    #[serde(default)]
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeekdayStat {
    pub weekday_name: String,
    #[serde(default)]
    pub avg_tips: f64,
    #[serde(default)]
    pub weekday: Option<u8>,
    #[serde(default)]
    pub avg_cash: f64,
    #[serde(default)]
    pub avg_card: f64,
    #[serde(default)]
    pub avg_hours: f64,
    #[serde(default)]
    pub avg_tips_per_hour: f64,
}

/// Body of `POST /api/tips`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTip {
    pub cash_tips: f64,
    pub card_tips: f64,
    pub hours_worked: f64,
    pub comments: String,
    pub work_date: NaiveDate,
}

impl NewTip {
    /// Builds a submission; comments are trimmed and the date defaults to today.
    pub fn new(
        cash_tips: f64,
        card_tips: f64,
        hours_worked: f64,
        comments: &str,
        work_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            cash_tips,
            card_tips,
            hours_worked,
            comments: comments.trim().to_string(),
            work_date: work_date.unwrap_or_else(|| Local::now().date_naive()),
        }
    }
}

// Response envelopes

#[derive(Debug, Deserialize)]
pub struct BreakdownResponse {
    pub breakdown: StatsBreakdown,
}

#[derive(Debug, Deserialize)]
pub struct DailyStatsResponse {
    #[serde(default)]
    pub daily_stats: Vec<DailyStat>,
}

#[derive(Debug, Deserialize)]
pub struct WeekdayStatsResponse {
    #[serde(default)]
    pub weekday_stats: Vec<WeekdayStat>,
}

#[derive(Debug, Deserialize)]
pub struct TipsResponse {
    #[serde(default)]
    pub tips: Vec<TipEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedTipResponse {
    #[serde(default)]
    pub tip_entry: Option<TipEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct SessionRequest<'a> {
    pub access_token: &'a str,
}

/// Error body of a failed request: `{error}` or `{errors: [...]}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}
