mod api;
mod cli_messages;
mod config;
mod consts;
mod dashboard;
mod environment;
mod error_classifier;
mod events;
mod filter;
mod logging;
mod models;
mod notifications;
mod query;
mod render;
mod session;
mod state;

use crate::api::{Fetchers, TipApiClient};
use crate::config::{Config, get_config_path};
use crate::consts::cli_consts::presets;
use crate::dashboard::{Dashboard, RefreshOutcome};
use crate::environment::Environment;
use crate::events::{Event, EventSender};
use crate::filter::{DateRange, FilterState, Mode};
use crate::models::NewTip;
use crate::render::{ChartBackend, ChartJsBackend, HtmlPage};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Environment variable selecting the backend: `local` or a base URL.
const ENVIRONMENT_VAR: &str = "TIP_DASHBOARD_ENVIRONMENT";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Track shift tips and view earnings statistics
struct Args {
    /// Backend base URL, e.g. https://tips.example.org
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

/// Dataset and date range the command works on.
#[derive(ClapArgs, Debug, Clone)]
struct FilterArgs {
    /// Use the read-only sample dataset instead of your own records
    #[arg(long)]
    sample: bool,

    /// Trailing number of days to report on (7, 30 and 90 are the usual presets)
    #[arg(long, default_value_t = presets::DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
    days: u32,

    /// First day of a custom range (YYYY-MM-DD); overrides --days
    #[arg(long, value_name = "DATE")]
    start: Option<NaiveDate>,

    /// Last day of a custom range (YYYY-MM-DD); overrides --days
    #[arg(long, value_name = "DATE")]
    end: Option<NaiveDate>,
}

impl FilterArgs {
    /// Applies the selection through the dashboard's setters, each of which refreshes.
    /// Returns `None` when the defaults were kept and nothing has been loaded yet.
    async fn apply(&self, dashboard: &mut Dashboard) -> Option<RefreshOutcome> {
        let mut outcome = None;
        if self.sample {
            outcome = Some(dashboard.set_mode(Mode::Sample).await);
        }
        if self.start.is_some() || self.end.is_some() {
            outcome = Some(dashboard.set_custom_range(self.start, self.end).await);
        } else if self.days != presets::DEFAULT_DAYS {
            outcome = Some(dashboard.set_preset(self.days).await);
        }
        outcome
    }
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with an access token from the identity provider and save the session.
    Login {
        /// Access token issued by the identity provider
        #[arg(long, value_name = "TOKEN")]
        token: String,
    },
    /// Sign out and clear the saved session.
    Logout,
    /// Render the dashboard to a standalone HTML file.
    Show {
        #[command(flatten)]
        filter: FilterArgs,

        /// Where to write the HTML document
        #[arg(long, short, default_value = "dashboard.html")]
        output: PathBuf,
    },
    /// Record the tips of a shift.
    Add {
        /// Cash tips
        #[arg(long, default_value_t = 0.0)]
        cash: f64,

        /// Card tips
        #[arg(long, default_value_t = 0.0)]
        card: f64,

        /// Hours worked
        #[arg(long, default_value_t = 0.0)]
        hours: f64,

        /// Free-form notes about the shift
        #[arg(long, default_value = "")]
        comments: String,

        /// Day of the shift (YYYY-MM-DD); defaults to today
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,

        /// Pretend to work on the sample dataset
        #[arg(long)]
        sample: bool,
    },
    /// Delete a tip entry.
    Delete {
        /// Id of the entry, as shown in the dashboard
        id: i64,

        /// Pretend to work on the sample dataset
        #[arg(long)]
        sample: bool,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args = Args::parse();
    let config_path = get_config_path()?;
    let config = if config_path.exists() {
        match Config::load_from_file(&config_path) {
            Ok(config) => Some(config),
            Err(e) => {
                print_cmd_warn!("Ignoring unreadable config", "{}", e);
                None
            }
        }
    } else {
        None
    };
    let environment = resolve_environment(args.base_url.as_deref(), config.as_ref())?;

    match args.command {
        Command::Login { token } => login(environment, &token, &config_path).await,
        Command::Logout => logout(environment, config.as_ref(), &config_path).await,
        Command::Show { filter, output } => {
            show(environment, config.as_ref(), &filter, &output).await
        }
        Command::Add {
            cash,
            card,
            hours,
            comments,
            date,
            sample,
        } => {
            let entry = NewTip::new(cash, card, hours, &comments, date);
            add(environment, config.as_ref(), mode_for(sample), entry).await
        }
        Command::Delete { id, sample, yes } => {
            delete(environment, config.as_ref(), mode_for(sample), id, yes).await
        }
    }
}

fn mode_for(sample: bool) -> Mode {
    if sample { Mode::Sample } else { Mode::Live }
}

/// `--base-url`, then the environment variable, then the saved config, then local.
fn resolve_environment(
    flag: Option<&str>,
    config: Option<&Config>,
) -> Result<Environment, Box<dyn Error>> {
    if let Some(url) = flag {
        return url
            .parse::<Environment>()
            .map_err(|_| format!("Invalid --base-url {:?}: expected an http(s) URL", url).into());
    }
    if let Ok(value) = std::env::var(ENVIRONMENT_VAR) {
        match value.parse::<Environment>() {
            Ok(environment) => return Ok(environment),
            Err(()) => print_cmd_warn!("Ignoring invalid environment", "{}={}", ENVIRONMENT_VAR, value),
        }
    }
    let saved = config
        .map(|c| c.base_url.as_str())
        .filter(|url| !url.is_empty())
        .and_then(|url| url.parse::<Environment>().ok());
    Ok(saved.unwrap_or_default())
}

/// A dashboard rendering into an in-memory page, with events printed as they arrive.
struct HeadlessSession {
    dashboard: Dashboard,
    page: Arc<HtmlPage>,
    charts: Arc<ChartJsBackend>,
    printer: JoinHandle<()>,
}

impl HeadlessSession {
    fn start(environment: Environment, filter: FilterState) -> Result<Self, Box<dyn Error>> {
        let api = TipApiClient::new(environment)?;
        let page = Arc::new(HtmlPage::new());
        let charts = Arc::new(ChartJsBackend::new());
        let (events, receiver) = EventSender::channel();
        let printer = tokio::spawn(print_events(receiver));
        let dashboard = Dashboard::new(Box::new(api), filter, page.clone(), charts.clone(), events);
        Ok(Self {
            dashboard,
            page,
            charts,
            printer,
        })
    }

    /// Drops the dashboard and waits for the remaining events to be printed.
    /// Notifications that have already expired are left out of the document.
    async fn finish(mut self) -> String {
        self.dashboard.dismiss_expired(Instant::now());
        let document = self.page.to_document(&self.charts);
        drop(self.dashboard);
        let _ = self.printer.await;
        document
    }

    /// Message of the most recent notification, if any.
    fn last_notification(&self) -> Option<String> {
        self.dashboard
            .notifications()
            .active()
            .last()
            .map(|n| n.message.clone())
    }
}

async fn print_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        if event.should_display() {
            println!("{}", event);
        }
    }
}

fn require_session(config: Option<&Config>) -> Result<&Config, Box<dyn Error>> {
    config
        .filter(|c| c.has_session())
        .ok_or_else(|| "Not logged in. Run `tip-dashboard login --token <TOKEN>` first.".into())
}

async fn login(
    environment: Environment,
    token: &str,
    config_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let client = TipApiClient::new(environment)?;
    print_cmd_info!("Signing in", "{:?}", client.environment());
    let base_url = client.environment().base_url();
    let fetchers = Fetchers::new(Box::new(client));
    let user = session::sign_in(&fetchers, Some(token)).await.map_err(|e| {
        print_cmd_error!("Sign in failed", e.to_string().as_str());
        e
    })?;

    Config::new(token.to_string(), base_url, user.email.clone())
        .save(config_path)
        .map_err(|e| format!("Failed to save config: {}", e))?;
    print_cmd_success!(
        "Signed in",
        "{} ({})",
        user.display_name,
        user.role.label()
    );
    Ok(())
}

async fn logout(
    environment: Environment,
    config: Option<&Config>,
    config_path: &Path,
) -> Result<(), Box<dyn Error>> {
    print_cmd_info!("Logging out and clearing the saved session");
    if let Some(config) = config.filter(|c| c.has_session()) {
        let mut session = HeadlessSession::start(environment, FilterState::default())?;
        let ended = match session.dashboard.sign_in(Some(&config.access_token)).await {
            Ok(()) => session.dashboard.sign_out().await,
            Err(e) => Err(e),
        };
        session.finish().await;
        if let Err(e) = ended {
            print_cmd_warn!("Backend session not closed", "{}", e);
        }
    }
    Config::clear_session(config_path)?;
    print_cmd_success!("Logged out");
    Ok(())
}

async fn show(
    environment: Environment,
    config: Option<&Config>,
    filter: &FilterArgs,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut session = HeadlessSession::start(environment, FilterState::default())?;
    match config.filter(|c| c.has_session()) {
        Some(config) => match session.dashboard.sign_in(Some(&config.access_token)).await {
            Ok(()) => {
                let outcome = match filter.apply(&mut session.dashboard).await {
                    Some(outcome) => outcome,
                    None => session.dashboard.refresh().await,
                };
                report_outcome(outcome);
            }
            Err(e) if e.is_auth_failure() => print_cmd_warn!(
                "Session expired",
                "run `tip-dashboard login --token <TOKEN>` again; showing the public dashboard"
            ),
            Err(e) => print_cmd_warn!("Showing the public dashboard", "{}", e),
        },
        None => {
            print_cmd_info!("Not logged in", "showing sample data");
            session.dashboard.load_public().await;
        }
    }

    let showing = if session.dashboard.state().is_signed_in() {
        session.dashboard.filter().mode().label()
    } else {
        "public sample"
    };
    let charts = session.charts.live_instances();
    let document = session.finish().await;
    std::fs::write(output, document)
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    print_cmd_success!(
        "Dashboard written",
        "{} ({}, {} charts)",
        output.display(),
        showing,
        charts
    );
    Ok(())
}

fn report_outcome(outcome: RefreshOutcome) {
    match outcome {
        RefreshOutcome::Skipped => print_cmd_warn!(
            "Nothing loaded",
            "a custom range needs both --start and --end, with start on or before end"
        ),
        RefreshOutcome::Completed(status) if !status.all_loaded() => {
            print_cmd_warn!("Some views failed to load", "{:?}", status)
        }
        RefreshOutcome::Completed(_) => {}
    }
}

async fn add(
    environment: Environment,
    config: Option<&Config>,
    mode: Mode,
    entry: NewTip,
) -> Result<(), Box<dyn Error>> {
    let mut session = HeadlessSession::start(environment, FilterState::new(mode, DateRange::default()))?;
    if !mode.is_sample() {
        let config = require_session(config)?;
        session.dashboard.sign_in(Some(&config.access_token)).await?;
    }

    let result = session.dashboard.create_tip(&entry).await;
    let message = session.last_notification().unwrap_or_default();
    session.finish().await;
    match result {
        Ok(_) => {
            print_cmd_success!(&message, "{} on {}", shift_total(&entry), entry.work_date);
            Ok(())
        }
        Err(e) => {
            print_cmd_warn!(&message);
            Err(e.into())
        }
    }
}

fn shift_total(entry: &NewTip) -> String {
    render::format_money(entry.cash_tips + entry.card_tips)
}

async fn delete(
    environment: Environment,
    config: Option<&Config>,
    mode: Mode,
    id: i64,
    yes: bool,
) -> Result<(), Box<dyn Error>> {
    let mut session = HeadlessSession::start(environment, FilterState::new(mode, DateRange::default()))?;
    if !mode.is_sample() {
        let config = require_session(config)?;
        if !yes && !confirm("Delete this tip entry?")? {
            print_cmd_info!("Cancelled");
            return Ok(());
        }
        session.dashboard.sign_in(Some(&config.access_token)).await?;
    }

    let result = session.dashboard.delete_tip(id).await;
    let message = session.last_notification().unwrap_or_default();
    session.finish().await;
    match result {
        Ok(()) => {
            print_cmd_success!(&message, "id {}", id);
            Ok(())
        }
        Err(e) => {
            print_cmd_warn!(&message);
            Err(e.into())
        }
    }
}

fn confirm(question: &str) -> Result<bool, io::Error> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
