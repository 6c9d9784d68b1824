//! View rendering
//!
//! Views write HTML fragments into named [`Target`]s of a [`Surface`] and chart
//! specifications into [`ChartSlot`]s of a [`ChartBackend`].

pub mod chart;
pub mod page;
pub mod surface;
pub mod views;

pub use chart::{ChartBackend, ChartJsBackend, ChartSlot, ChartSlots};
pub use page::HtmlPage;
pub use surface::{Surface, Target};

/// Escapes text for insertion into HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `$1234.50`
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}
