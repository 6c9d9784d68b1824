//! HTML fragments and chart specs for each dashboard view.

use crate::consts::cli_consts::views::{MANAGER_COLUMNS, MEMBER_COLUMNS};
use crate::filter::Mode;
use crate::models::{DailyStat, Role, StatsBreakdown, TipEntry, UserSession, WeekdayStat};
use crate::render::chart::{ChartKind, ChartSpec, Dataset, Legend};
use crate::render::{escape_html, format_money};
use chrono::NaiveDate;

const DAILY_COLOR: &str = "#20c997";
const DAILY_FILL: &str = "#20c99720";
const CASH_COLOR: &str = "#ffc107";
const CARD_COLOR: &str = "#0d6efd";
const WEEKDAY_COLOR: &str = "#6f42c1";
const HOURLY_COLOR: &str = "#dc3545";

pub const STATS_FAILED: &str = r#"<p class="text-danger">Failed to load stats</p>"#;

/// Short local date, e.g. `1/31/2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Number of tip table columns for a role; managers get the owner column.
pub fn column_count(role: Role) -> usize {
    if role.is_manager() {
        MANAGER_COLUMNS
    } else {
        MEMBER_COLUMNS
    }
}

/// Total, cash and card panel.
pub fn quick_stats(breakdown: &StatsBreakdown) -> String {
    format!(
        r#"<div class="row">
    <div class="col-4">
        <h6 class="text-success">Total Tips</h6>
        <h4>{total}</h4>
    </div>
    <div class="col-4">
        <h6 class="text-info">Cash</h6>
        <h5>{cash}</h5>
        <small class="text-muted">{cash_pct}%</small>
    </div>
    <div class="col-4">
        <h6 class="text-warning">Card</h6>
        <h5>{card}</h5>
        <small class="text-muted">{card_pct}%</small>
    </div>
</div>"#,
        total = format_money(breakdown.total_tips),
        cash = format_money(breakdown.cash_tips),
        cash_pct = breakdown.cash_percentage,
        card = format_money(breakdown.card_tips),
        card_pct = breakdown.card_percentage,
    )
}

pub fn tips_table_head(role: Role) -> String {
    let mut cells = vec!["Date"];
    if role.is_manager() {
        cells.push("User");
    }
    cells.extend([
        "Cash",
        "Card",
        "Total",
        "Hours",
        "Tips/Hour",
        "Comments",
        "Actions",
    ]);
    let cells: String = cells
        .iter()
        .map(|cell| format!("<th>{}</th>", cell))
        .collect();
    format!("<tr>{}</tr>", cells)
}

fn placeholder_row(role: Role, class: &str, text: &str) -> String {
    format!(
        r#"<tr><td colspan="{}" class="text-center {}">{}</td></tr>"#,
        column_count(role),
        class,
        text
    )
}

/// Rows for the tip table, or a single "No entries found" row.
pub fn tips_table_body(tips: &[TipEntry], role: Role) -> String {
    if tips.is_empty() {
        return placeholder_row(role, "text-muted", "No entries found");
    }
    tips.iter().map(|tip| tip_row(tip, role)).collect()
}

pub fn tips_table_failed(role: Role) -> String {
    placeholder_row(role, "text-danger", "Failed to load entries")
}

fn tip_row(tip: &TipEntry, role: Role) -> String {
    let owner = if role.is_manager() {
        format!(
            "<td>{}</td>",
            tip.owner_name.as_deref().map(escape_html).unwrap_or_default()
        )
    } else {
        String::new()
    };
    format!(
        concat!(
            "<tr>",
            "<td>{date}</td>{owner}",
            "<td>{cash}</td><td>{card}</td><td>{total}</td>",
            "<td>{hours:.2}</td><td>{rate}</td><td>{comments}</td>",
            r#"<td><button class="btn btn-sm btn-outline-danger" data-tip-id="{id}">"#,
            r#"<i class="fas fa-trash"></i></button></td>"#,
            "</tr>"
        ),
        date = format_date(tip.work_date),
        owner = owner,
        cash = format_money(tip.cash_tips),
        card = format_money(tip.card_tips),
        total = format_money(tip.total_tips),
        hours = tip.hours_worked,
        rate = format_money(tip.tips_per_hour),
        comments = escape_html(&tip.comments),
        id = tip.id,
    )
}

pub fn mode_label(mode: Mode) -> String {
    mode.label().to_string()
}

/// Signed-in user's name with a role badge.
pub fn user_badge(user: &UserSession) -> String {
    let badge_class = match user.role {
        Role::Manager => "bg-warning",
        Role::Member => "bg-secondary",
    };
    format!(
        r#"<span id="userName">{}</span><span id="userRole" class="badge {} ms-2">{}</span>"#,
        escape_html(&user.display_name),
        badge_class,
        user.role.label()
    )
}

fn currency_bar(labels: Vec<String>, label: &str, data: Vec<f64>, color: &str) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        labels,
        datasets: vec![Dataset::new(Some(label), data, &[color], 1)],
        currency_axis: true,
        legend: Legend::Hidden,
    }
}

/// Line chart of total tips per day.
pub fn daily_chart(stats: &[DailyStat]) -> ChartSpec {
    let mut dataset = Dataset::new(
        Some("Total Tips"),
        stats.iter().map(|s| s.total_tips).collect(),
        &[DAILY_COLOR],
        3,
    );
    dataset.fill = Some(DAILY_FILL.to_string());
    dataset.tension = Some(0.1);
    ChartSpec {
        kind: ChartKind::Line,
        labels: stats.iter().map(|s| format_date(s.date)).collect(),
        datasets: vec![dataset],
        currency_axis: true,
        legend: Legend::Hidden,
    }
}

/// Bar chart of the average tips per hour for each day.
pub fn hourly_chart(stats: &[DailyStat]) -> ChartSpec {
    currency_bar(
        stats.iter().map(|s| format_date(s.date)).collect(),
        "Tips per Hour",
        stats.iter().map(|s| s.avg_tips_per_hour).collect(),
        HOURLY_COLOR,
    )
}

/// Cash vs card doughnut.
pub fn breakdown_chart(breakdown: &StatsBreakdown) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Doughnut,
        labels: vec!["Cash Tips".to_string(), "Card Tips".to_string()],
        datasets: vec![Dataset::new(
            None,
            vec![breakdown.cash_tips, breakdown.card_tips],
            &[CASH_COLOR, CARD_COLOR],
            2,
        )],
        currency_axis: false,
        legend: Legend::Bottom,
    }
}

pub fn weekday_chart(stats: &[WeekdayStat]) -> ChartSpec {
    currency_bar(
        stats.iter().map(|s| s.weekday_name.clone()).collect(),
        "Average Tips",
        stats.iter().map(|s| s.avg_tips).collect(),
        WEEKDAY_COLOR,
    )
}
