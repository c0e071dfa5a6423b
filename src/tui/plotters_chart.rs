//! Plotters-powered risk score histogram widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use crate::domain::{RiskLevel, ScoreHistogram};

/// One filled rectangle of the stacked histogram, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub level: Option<RiskLevel>,
}

/// Stack each bin's counts bottom-up: Low, Medium, High, then unclassified.
pub fn histogram_bars(hist: &ScoreHistogram) -> Vec<Bar> {
    let mut bars = Vec::new();
    for bin in &hist.bins {
        let mut base = 0.0;
        for level in [
            Some(RiskLevel::Low),
            Some(RiskLevel::Medium),
            Some(RiskLevel::High),
            None,
        ] {
            let n = bin.counts.get(level) as f64;
            if n == 0.0 {
                continue;
            }
            bars.push(Bar {
                x0: bin.lower,
                x1: bin.upper,
                y0: base,
                y1: base + n,
                level,
            });
            base += n;
        }
    }
    bars
}

/// A lightweight, render-only chart description.
///
/// All bars and bounds are computed outside the render call.
pub struct RiskHistogramChart<'a> {
    pub bars: &'a [Bar],
    /// Y upper bound (tallest bin, padded).
    pub y_max: f64,
}

fn level_color(level: Option<RiskLevel>) -> RGBColor {
    match level {
        Some(RiskLevel::Low) => RGBColor(0, 200, 0),
        Some(RiskLevel::Medium) => RGBColor(255, 200, 0),
        Some(RiskLevel::High) => RGBColor(255, 0, 0),
        None => RGBColor(128, 128, 128),
    }
}

impl<'a> Widget for RiskHistogramChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area; show a hint instead of panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }

        let y_max = self.y_max;
        if !(y_max.is_finite() && y_max > 0.0) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 5)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(0.0..1.0, 0.0..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(6)
                .y_labels(4)
                .x_label_formatter(&|v| format!("{v:.1}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            chart.draw_series(self.bars.iter().map(|b| {
                Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], level_color(b.level).filled())
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
