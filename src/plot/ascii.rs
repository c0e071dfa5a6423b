//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Histogram cells are stacked by level: `L` (Low), `M` (Medium), `H` (High),
//! `?` (no level).

use crate::domain::{RegionAggregate, RiskLevel, ScoreHistogram};

/// Vertical histogram of risk scores, one column group per bin.
pub fn render_histogram(hist: &ScoreHistogram, width: usize, height: usize) -> String {
    let height = height.max(3);
    let n_bins = hist.bins.len().max(1);
    let col_w = (width.max(n_bins) / n_bins).max(1);
    let max = hist.max_count();

    let mut out = String::new();
    out.push_str("Risk Score Distribution\n");
    if max == 0 {
        out.push_str("(no scores)\n");
        return out;
    }

    // Each bin becomes a column of chars, bottom-up, stacked Low -> Medium -> High -> unclassified.
    let columns: Vec<Vec<char>> = hist
        .bins
        .iter()
        .map(|bin| {
            let mut stack = Vec::new();
            for (level, ch) in [
                (Some(RiskLevel::Low), 'L'),
                (Some(RiskLevel::Medium), 'M'),
                (Some(RiskLevel::High), 'H'),
                (None, '?'),
            ] {
                let n = bin.counts.get(level);
                let cells = scaled(n, max, height);
                stack.extend(std::iter::repeat_n(ch, cells));
            }
            stack.truncate(height);
            stack
        })
        .collect();

    let label_w = max.to_string().len();
    for row in (0..height).rev() {
        let label = if row + 1 == height {
            max.to_string()
        } else if row == 0 {
            "0".to_string()
        } else {
            String::new()
        };
        let mut line = format!("{label:>label_w$} |");
        for col in &columns {
            let ch = col.get(row).copied().unwrap_or(' ');
            for _ in 0..col_w {
                line.push(ch);
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let axis_len = col_w * columns.len();
    out.push_str(&format!("{:>label_w$} +{}\n", "", "-".repeat(axis_len)));
    let right = "1.0";
    let gap = axis_len.saturating_sub(3 + right.len());
    out.push_str(&format!("{:>label_w$}  0.0{}{right}\n", "", " ".repeat(gap)));
    out.push_str("legend: L=Low M=Medium H=High ?=unclassified\n");
    out
}

/// Horizontal bars of average risk per region, annotated with the high-risk share.
pub fn render_region_bars(regions: &[RegionAggregate], width: usize) -> String {
    let mut out = String::new();
    out.push_str("Average Risk Score by Region\n");
    if regions.is_empty() {
        out.push_str("(no regions)\n");
        return out;
    }

    let name_w = regions
        .iter()
        .map(|g| g.region.chars().count())
        .max()
        .unwrap_or(0)
        .min(16);
    let bar_w = width.max(10);

    for g in regions {
        let avg = if g.avg_risk_score.is_finite() { g.avg_risk_score.clamp(0.0, 1.0) } else { 0.0 };
        let filled = (avg * bar_w as f64).round() as usize;
        let name: String = g.region.chars().take(name_w).collect();
        out.push_str(&format!(
            "{name:<name_w$} |{}{} {:.2} (high {:.0}%)\n",
            "#".repeat(filled),
            " ".repeat(bar_w - filled),
            g.avg_risk_score,
            g.high_risk_pct * 100.0
        ));
    }
    out
}

/// Cells for `n` out of `max` on a `height`-row axis; any nonzero count gets at least one cell.
fn scaled(n: usize, max: usize, height: usize) -> usize {
    if n == 0 || max == 0 {
        return 0;
    }
    ((n as f64 / max as f64) * height as f64).round().max(1.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HistogramBin, LevelCounts};

    fn hist(counts: &[(usize, usize, usize)]) -> ScoreHistogram {
        let n = counts.len();
        ScoreHistogram {
            bins: counts
                .iter()
                .enumerate()
                .map(|(i, &(low, medium, high))| HistogramBin {
                    lower: i as f64 / n as f64,
                    upper: (i + 1) as f64 / n as f64,
                    counts: LevelCounts { low, medium, high, unclassified: 0 },
                })
                .collect(),
        }
    }

    #[test]
    fn histogram_is_deterministic_and_sized() {
        let h = hist(&[(4, 0, 0), (0, 2, 0), (0, 0, 1)]);
        let a = render_histogram(&h, 30, 4);
        let b = render_histogram(&h, 30, 4);
        assert_eq!(a, b);
        // title + 4 rows + axis + ticks + legend
        assert_eq!(a.lines().count(), 8);
        assert!(a.contains('L') && a.contains('M') && a.contains('H'));
    }

    #[test]
    fn tallest_bin_reaches_top_row() {
        let h = hist(&[(5, 0, 0), (1, 0, 0)]);
        let text = render_histogram(&h, 2, 5);
        let top = text.lines().nth(1).unwrap();
        assert!(top.starts_with("5 |L"));
    }

    #[test]
    fn empty_histogram() {
        let h = hist(&[(0, 0, 0)]);
        assert!(render_histogram(&h, 10, 5).contains("(no scores)"));
    }

    #[test]
    fn region_bars_scale_with_average() {
        let regions = vec![
            RegionAggregate {
                region: "Accra".to_string(),
                total_borrowers: 2,
                avg_risk_score: 0.5,
                high_risk_pct: 0.5,
            },
            RegionAggregate {
                region: "Kumasi".to_string(),
                total_borrowers: 1,
                avg_risk_score: 1.0,
                high_risk_pct: 1.0,
            },
        ];
        let text = render_region_bars(&regions, 10);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("Accra  |#####     "));
        assert!(lines[2].starts_with("Kumasi |##########"));
        assert!(lines[2].ends_with("(high 100%)"));
    }
}
