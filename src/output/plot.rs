// SVG plot of evaluation results.
//
// One panel per metric, stacked vertically and sharing the x axis (the swept
// parameter). Each panel is scaled to its own metric's range since metric
// values differ by orders of magnitude.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::evaluate::metrics::Metric;
use crate::evaluate::results::EvalResult;

const WIDTH: f64 = 800.0;
const MARGIN_LEFT: f64 = 100.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const PANEL_HEIGHT: f64 = 180.0;
const PANEL_GAP: f64 = 60.0;

/// Render evaluation results (as returned by `results_by_parameter`) to SVG.
pub fn render_eval_plot(
    points: &[(f64, &EvalResult)],
    metrics: &[Metric],
    x_label: &str,
    title: &str,
) -> String {
    let height = MARGIN_TOP + metrics.len() as f64 * (PANEL_HEIGHT + PANEL_GAP);
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

    let (x_min, x_max) = padded_range(points.iter().map(|(x, _)| *x));

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{height}\">\n"
    ));
    svg.push_str("  <style>\n");
    svg.push_str("    .frame { fill: #ebebeb; stroke: none; }\n");
    svg.push_str("    .grid { stroke: #ffffff; stroke-width: 1; }\n");
    svg.push_str("    .line { fill: none; stroke: #e24a33; stroke-width: 2; }\n");
    svg.push_str("    .dot { fill: #e24a33; }\n");
    svg.push_str("    .label { font-family: sans-serif; font-size: 12px; fill: #333; }\n");
    svg.push_str("    .title { font-family: sans-serif; font-size: 16px; font-weight: bold; }\n");
    svg.push_str("  </style>\n");
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    svg.push_str(&format!(
        "  <text class=\"title\" x=\"{}\" y=\"30\" text-anchor=\"middle\">{}</text>\n",
        WIDTH / 2.0,
        xml_escape(title)
    ));

    let sx = |x: f64| MARGIN_LEFT + (x - x_min) / (x_max - x_min) * plot_width;

    for (i, metric) in metrics.iter().enumerate() {
        let top = MARGIN_TOP + i as f64 * (PANEL_HEIGHT + PANEL_GAP);
        let bottom = top + PANEL_HEIGHT;

        let series: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|(x, r)| r.score(*metric).map(|y| (*x, y)))
            .collect();
        let (y_min, y_max) = padded_range(series.iter().map(|(_, y)| *y));
        let sy = |y: f64| bottom - (y - y_min) / (y_max - y_min) * PANEL_HEIGHT;

        svg.push_str(&format!(
            "  <rect class=\"frame\" x=\"{MARGIN_LEFT}\" y=\"{top}\" width=\"{plot_width}\" height=\"{PANEL_HEIGHT}\"/>\n"
        ));
        for frac in [0.25, 0.5, 0.75] {
            let gy = top + frac * PANEL_HEIGHT;
            svg.push_str(&format!(
                "  <line class=\"grid\" x1=\"{MARGIN_LEFT}\" y1=\"{gy:.1}\" x2=\"{:.1}\" y2=\"{gy:.1}\"/>\n",
                MARGIN_LEFT + plot_width
            ));
        }
        svg.push_str(&format!(
            "  <text class=\"label\" x=\"{MARGIN_LEFT}\" y=\"{:.1}\">{}</text>\n",
            top - 8.0,
            xml_escape(metric.name())
        ));
        svg.push_str(&format!(
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
            MARGIN_LEFT - 6.0,
            top + 12.0,
            format_tick(y_max)
        ));
        svg.push_str(&format!(
            "  <text class=\"label\" x=\"{:.1}\" y=\"{bottom:.1}\" text-anchor=\"end\">{}</text>\n",
            MARGIN_LEFT - 6.0,
            format_tick(y_min)
        ));

        if !series.is_empty() {
            let path: Vec<String> = series
                .iter()
                .map(|&(x, y)| format!("{:.1},{:.1}", sx(x), sy(y)))
                .collect();
            svg.push_str(&format!(
                "  <polyline class=\"line\" points=\"{}\"/>\n",
                path.join(" ")
            ));
            for &(x, y) in &series {
                svg.push_str(&format!(
                    "  <circle class=\"dot\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\"/>\n",
                    sx(x),
                    sy(y)
                ));
            }
        }

        // x tick labels at each evaluated parameter value
        for (x, _) in points {
            svg.push_str(&format!(
                "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"9\">{}</text>\n",
                sx(*x),
                bottom + 14.0,
                format_tick(*x)
            ));
        }
    }

    svg.push_str(&format!(
        "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
        MARGIN_LEFT + plot_width / 2.0,
        height - PANEL_GAP / 2.0,
        xml_escape(x_label)
    ));
    svg.push_str("</svg>\n");
    svg
}

/// Render and write the plot to `path`.
pub fn save_eval_plot(
    path: &Path,
    points: &[(f64, &EvalResult)],
    metrics: &[Metric],
    x_label: &str,
    title: &str,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let svg = render_eval_plot(points, metrics, x_label, title);
    fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Saved evaluation plot");
    Ok(())
}

/// Min and max of the values, widened so the range is never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < f64::EPSILON * lo.abs().max(1.0) {
        let pad = lo.abs().max(1.0) * 0.05;
        return (lo - pad, hi + pad);
    }
    (lo, hi)
}

fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{v:.0}")
    } else if v.abs() >= 1000.0 || v.abs() < 0.01 {
        format!("{v:.3e}")
    } else {
        format!("{v:.3}")
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
