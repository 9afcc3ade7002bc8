//! Bar chart generation.
//!
//! Renders chart series as a horizontal SVG bar chart (written to disk by
//! `output::svg`) or as a `#` bar chart for the terminal. The SVG is built
//! by hand; the charts are small and a plotting dependency buys nothing.

use super::series::ChartPoint;
use crate::utils::config::{DEFAULT_CHART_WIDTH, TEXT_CHART_WIDTH};
use crate::utils::error::ChartError;
use log::info;

const BAR_HEIGHT: usize = 22;
const BAR_GAP: usize = 6;
const TITLE_HEIGHT: usize = 40;
const LABEL_WIDTH: usize = 260;
const VALUE_WIDTH: usize = 70;
const BAR_COLOR: &str = "rgb(70, 130, 180)";

/// Bar chart configuration
#[derive(Debug, Clone)]
pub struct BarChartConfig {
    pub title: String,
    pub width: usize,
    /// Decimal places shown next to each bar
    pub precision: usize,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            title: "Top Drugs by Performance".to_string(),
            width: DEFAULT_CHART_WIDTH,
            precision: 2,
        }
    }
}

impl BarChartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

/// Generate an SVG bar chart
///
/// Bars are drawn in series order, scaled to the largest value.
///
/// # Errors
/// * `ChartError::EmptySeries` - Nothing to draw
pub fn generate_bar_chart(
    points: &[ChartPoint],
    config: Option<&BarChartConfig>,
) -> Result<String, ChartError> {
    if points.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating bar chart with {} bars", points.len());

    let width = config.width.max(LABEL_WIDTH + VALUE_WIDTH + 50);
    let plot_width = (width - LABEL_WIDTH - VALUE_WIDTH) as f64;
    let height = TITLE_HEIGHT + points.len() * (BAR_HEIGHT + BAR_GAP) + BAR_GAP;
    let max_value = max_value(points);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, height, width, height
    ));
    svg.push_str(
        r#"<style>.bar:hover { opacity: 0.8; } .label { font: 12px sans-serif; }</style>"#,
    );
    svg.push_str(&format!(
        r#"<text x="{}" y="24" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    ));

    for (i, point) in points.iter().enumerate() {
        let y = TITLE_HEIGHT + i * (BAR_HEIGHT + BAR_GAP);
        let bar_width = if max_value > 0.0 {
            (point.value.max(0.0) / max_value) * plot_width
        } else {
            0.0
        };
        let label = escape_xml(&truncate_label(&point.label, LABEL_WIDTH / 7));

        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" class="label">{}</text>"#,
            LABEL_WIDTH - 8,
            y + BAR_HEIGHT / 2 + 4,
            label
        ));
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{:.2}" height="{}" fill="{}" class="bar"><title>{}: {:.prec$}</title></rect>"#,
            LABEL_WIDTH,
            y,
            bar_width,
            BAR_HEIGHT,
            BAR_COLOR,
            escape_xml(&point.label),
            point.value,
            prec = config.precision
        ));
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{}" class="label">{:.prec$}</text>"#,
            LABEL_WIDTH as f64 + bar_width + 6.0,
            y + BAR_HEIGHT / 2 + 4,
            point.value,
            prec = config.precision
        ));
    }

    svg.push_str("</svg>");

    info!("Bar chart generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Render a `#` bar chart for terminal output
///
/// Empty input renders a "No data" line.
pub fn generate_text_chart(points: &[ChartPoint], precision: usize) -> String {
    if points.is_empty() {
        return "  (No data to chart)".to_string();
    }

    let max_value = max_value(points);
    let label_width = points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(40);

    points
        .iter()
        .map(|point| {
            let bar_len = if max_value > 0.0 {
                ((point.value.max(0.0) / max_value) * TEXT_CHART_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "  {:<width$} | {:<bar$} {:.prec$}",
                truncate_label(&point.label, label_width),
                "#".repeat(bar_len),
                point.value,
                width = label_width,
                bar = TEXT_CHART_WIDTH,
                prec = precision
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn max_value(points: &[ChartPoint]) -> f64 {
    points.iter().map(|p| p.value).fold(0.0, f64::max)
}

/// Truncate to `max_chars` characters with a trailing ellipsis
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    if max_chars <= 3 {
        return label.chars().take(max_chars).collect();
    }
    let kept: String = label.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

/// Escape text for use inside SVG elements
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
