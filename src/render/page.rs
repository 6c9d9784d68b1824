//! In-memory [`Surface`] that assembles a standalone HTML dashboard.

use crate::render::chart::ChartJsBackend;
use crate::render::surface::{Surface, Target};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

#[derive(Debug, Default)]
pub struct HtmlPage {
    targets: Mutex<BTreeMap<Target, String>>,
}

impl HtmlPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole page: every target's content plus one Chart.js instance per live chart.
    ///
    /// The signed-in layout is shown once the user badge has content, the public
    /// landing layout otherwise.
    pub fn to_document(&self, charts: &ChartJsBackend) -> String {
        let targets = self
            .targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let signed_in = targets.contains_key(&Target::UserBadge);
        let hidden = |visible: bool| if visible { "" } else { " d-none" };
        let script = chart_script(charts);

        fill_template(INDEX_HTML, |name| match name {
            "CHART_JS" => Some(CHART_JS_CDN),
            "PUBLIC_HIDDEN" => Some(hidden(!signed_in)),
            "APP_HIDDEN" => Some(hidden(signed_in)),
            "CHART_SCRIPT" => Some(script.as_str()),
            _ => Target::from_element_id(name)
                .map(|target| targets.get(&target).map_or("", String::as_str)),
        })
    }
}

/// Replaces each `{{name}}` in `template` with `lookup(name)` in a single pass.
/// Inserted text is never scanned again; unknown names are kept as written.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let value = after
            .find("}}")
            .and_then(|close| lookup(&after[..close]).map(|value| (close, value)));
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

impl Surface for HtmlPage {
    fn set_content(&self, target: Target, html: String) {
        self.targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target, html);
    }

    fn content(&self, target: Target) -> Option<String> {
        self.targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&target)
            .cloned()
    }

    fn clear(&self, target: Target) {
        self.targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&target);
    }
}

fn chart_script(charts: &ChartJsBackend) -> String {
    charts
        .configs()
        .iter()
        .map(|(slot, config)| {
            // A literal "</" would end the script element early.
            let config = config.to_string().replace("</", "<\\/");
            format!(
                "new Chart(document.getElementById(\"{}\"), {});\n",
                slot.canvas_id(),
                config
            )
        })
        .collect()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Tip Tracker</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" />
  <script src="{{CHART_JS}}"></script>
  <style>
    .chart-box { position: relative; height: 280px; }
  </style>
</head>
<body class="bg-light">
  <nav class="navbar navbar-dark bg-dark mb-4">
    <div class="container">
      <span class="navbar-brand">Tip Tracker</span>
      <span class="text-light" id="userSection">{{userSection}}</span>
    </div>
  </nav>
  <div class="container">
    <div id="alertArea">{{alertArea}}</div>

    <section id="authRequired" class="{{PUBLIC_HIDDEN}}">
      <h2>Track your tips</h2>
      <p class="text-muted">Sample data from the last 30 days.</p>
      <div id="publicQuickStats" class="card card-body mb-4">{{publicQuickStats}}</div>
      <div class="card card-body chart-box"><canvas id="publicWeekdayChart"></canvas></div>
    </section>

    <section id="mainApp" class="{{APP_HIDDEN}}">
      <p>Showing <strong id="dataModeLabel">{{dataModeLabel}}</strong></p>
      <div id="quickStats" class="card card-body mb-4">{{quickStats}}</div>
      <div class="row g-4 mb-4">
        <div class="col-md-8"><div class="card card-body chart-box"><canvas id="dailyChart"></canvas></div></div>
        <div class="col-md-4"><div class="card card-body chart-box"><canvas id="breakdownChart"></canvas></div></div>
        <div class="col-md-6"><div class="card card-body chart-box"><canvas id="weekdayChart"></canvas></div></div>
        <div class="col-md-6"><div class="card card-body chart-box"><canvas id="hourlyChart"></canvas></div></div>
      </div>
      <div class="card card-body">
        <table class="table table-striped">
          <thead id="tipsTableHead">{{tipsTableHead}}</thead>
          <tbody id="tipsTableBody">{{tipsTableBody}}</tbody>
        </table>
      </div>
    </section>
  </div>
  <script>
{{CHART_SCRIPT}}  </script>
</body>
</html>
"#;
