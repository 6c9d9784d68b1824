//! Chart capability
//!
//! Views describe charts with a [`ChartSpec`]; a [`ChartBackend`] turns specs into
//! live chart instances. [`ChartSlots`] guarantees at most one live instance per
//! slot by destroying the previous instance before creating its replacement.

use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Canvas a chart is drawn on. Each slot holds at most one live chart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::AsRefStr)]
pub enum ChartSlot {
    #[strum(serialize = "dailyChart")]
    Daily,
    #[strum(serialize = "breakdownChart")]
    Breakdown,
    #[strum(serialize = "weekdayChart")]
    Weekday,
    #[strum(serialize = "hourlyChart")]
    Hourly,
    #[strum(serialize = "publicWeekdayChart")]
    PublicWeekday,
}

impl ChartSlot {
    pub fn canvas_id(&self) -> &str {
        self.as_ref()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Legend {
    Hidden,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: Option<String>,
    pub data: Vec<f64>,
    /// One colour for the whole series, or one per point.
    pub colors: Vec<String>,
    /// Area fill colour under a line.
    pub fill: Option<String>,
    pub border_width: u32,
    pub tension: Option<f64>,
}

impl Dataset {
    pub fn new(label: Option<&str>, data: Vec<f64>, colors: &[&str], border_width: u32) -> Self {
        Self {
            label: label.map(str::to_string),
            data,
            colors: colors.iter().map(|c| c.to_string()).collect(),
            fill: None,
            border_width,
            tension: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    /// Y axis starts at zero and is labelled in dollars.
    pub currency_axis: bool,
    pub legend: Legend,
}

/// Opaque id of a live chart instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartHandle(pub u64);

/// The charting library, reduced to what the dashboard needs.
pub trait ChartBackend: Send + Sync {
    /// Creates a chart on `slot` and returns its handle.
    fn render_chart(&self, slot: ChartSlot, spec: &ChartSpec) -> ChartHandle;

    /// Disposes a chart created by `render_chart`.
    fn destroy(&self, handle: ChartHandle);

    /// Number of charts created and not yet destroyed.
    fn live_instances(&self) -> usize;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks the live chart of every slot.
#[derive(Debug, Default)]
pub struct ChartSlots {
    slots: Mutex<HashMap<ChartSlot, ChartHandle>>,
}

impl ChartSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the chart on `slot`, destroying the previous one first.
    pub fn render(&self, backend: &dyn ChartBackend, slot: ChartSlot, spec: &ChartSpec) {
        let mut slots = lock(&self.slots);
        if let Some(previous) = slots.remove(&slot) {
            backend.destroy(previous);
        }
        let handle = backend.render_chart(slot, spec);
        slots.insert(slot, handle);
    }

    /// Destroys the chart on `slot`, if any.
    pub fn clear(&self, backend: &dyn ChartBackend, slot: ChartSlot) {
        if let Some(previous) = lock(&self.slots).remove(&slot) {
            backend.destroy(previous);
        }
    }

    #[cfg(test)]
    pub fn handle(&self, slot: ChartSlot) -> Option<ChartHandle> {
        lock(&self.slots).get(&slot).copied()
    }
}

#[derive(Debug, Default)]
struct JsCharts {
    next_id: u64,
    live: BTreeMap<ChartHandle, (ChartSlot, Value)>,
}

/// Backend producing Chart.js configurations, embedded by [`super::HtmlPage`].
#[derive(Debug, Default)]
pub struct ChartJsBackend {
    charts: Mutex<JsCharts>,
}

impl ChartJsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(slot, Chart.js config)` of every live chart, in slot order.
    pub fn configs(&self) -> Vec<(ChartSlot, Value)> {
        let mut configs: Vec<_> = lock(&self.charts).live.values().cloned().collect();
        configs.sort_by_key(|(slot, _)| *slot);
        configs
    }

    /// Chart.js configuration for a spec.
    pub fn config_for(spec: &ChartSpec) -> Value {
        let datasets: Vec<Value> = spec
            .datasets
            .iter()
            .map(|dataset| {
                let colors: Value = match dataset.colors.as_slice() {
                    [single] => json!(single),
                    many => json!(many),
                };
                let background = match &dataset.fill {
                    Some(fill) => json!(fill),
                    None => colors.clone(),
                };
                let mut value = json!({
                    "data": dataset.data,
                    "borderColor": colors,
                    "backgroundColor": background,
                    "borderWidth": dataset.border_width,
                });
                if let Some(label) = &dataset.label {
                    value["label"] = json!(label);
                }
                if dataset.fill.is_some() {
                    value["fill"] = json!(true);
                }
                if let Some(tension) = dataset.tension {
                    value["tension"] = json!(tension);
                }
                value
            })
            .collect();

        let legend = match spec.legend {
            Legend::Hidden => json!({ "display": false }),
            Legend::Bottom => json!({ "position": "bottom" }),
        };
        let mut options = json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": legend }
        });
        if spec.currency_axis {
            options["scales"] = json!({
                "y": {
                    "beginAtZero": true,
                    "ticks": { "format": { "style": "currency", "currency": "USD" } }
                }
            });
        }

        json!({
            "type": spec.kind.as_ref(),
            "data": { "labels": spec.labels, "datasets": datasets },
            "options": options,
        })
    }
}

impl ChartBackend for ChartJsBackend {
    fn render_chart(&self, slot: ChartSlot, spec: &ChartSpec) -> ChartHandle {
        let mut charts = lock(&self.charts);
        charts.next_id += 1;
        let handle = ChartHandle(charts.next_id);
        charts.live.insert(handle, (slot, Self::config_for(spec)));
        handle
    }

    fn destroy(&self, handle: ChartHandle) {
        lock(&self.charts).live.remove(&handle);
    }

    fn live_instances(&self) -> usize {
        lock(&self.charts).live.len()
    }
}
