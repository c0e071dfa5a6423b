//! Ratatui-based terminal dashboard.
//!
//! Layout: summary header, score histogram + level-filtered table on the left,
//! top-N table + regional table + recommendation on the right. Every key press
//! rebuilds the whole view from the scored dataset.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
};
use tracing::{info, warn};

use crate::app::pipeline::{self, DashboardView, Upload, ViewSelection};
use crate::domain::{RegionView, RiskLevel, ScoredBorrower};
use crate::error::AppError;
use crate::io::ingest::IngestOptions;
use crate::report::REGION_UNAVAILABLE;

mod plotters_chart;

use plotters_chart::{RiskHistogramChart, histogram_bars};

/// Settings for a dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub csv_path: PathBuf,
    pub export_path: PathBuf,
    pub top_n: usize,
    pub ingest: IngestOptions,
}

/// Start the dashboard.
pub fn run(options: DashboardOptions) -> Result<(), AppError> {
    // Load before touching the terminal so a bad file fails like `crisk score` does.
    let upload = pipeline::upload(&options.csv_path, options.ingest)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(options, upload);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    options: DashboardOptions,
    upload: Upload,
    selection: ViewSelection,
    status: String,
}

impl App {
    fn new(options: DashboardOptions, upload: Upload) -> Self {
        let selection = ViewSelection {
            top_n: options.top_n,
            borrower_index: (!upload.scored.is_empty()).then_some(0),
            ..ViewSelection::default()
        };
        let status = loaded_status(&upload);
        Self {
            options,
            upload,
            selection,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply a key press. Returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let n_rows = self.upload.scored.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right => {
                self.selection.level = self.selection.level.next();
                self.status = format!("level: {}", self.selection.level.label());
            }
            KeyCode::Left => {
                self.selection.level = self.selection.level.prev();
                self.status = format!("level: {}", self.selection.level.label());
            }
            KeyCode::Down => {
                if let Some(i) = self.selection.borrower_index {
                    self.selection.borrower_index = Some((i + 1).min(n_rows.saturating_sub(1)));
                }
            }
            KeyCode::Up => {
                if let Some(i) = self.selection.borrower_index {
                    self.selection.borrower_index = Some(i.saturating_sub(1));
                }
            }
            KeyCode::Char('+') => {
                self.selection.top_n = self.selection.top_n.saturating_add(1);
                self.status = format!("top: {}", self.selection.top_n);
            }
            KeyCode::Char('-') => {
                self.selection.top_n = self.selection.top_n.saturating_sub(1).max(1);
                self.status = format!("top: {}", self.selection.top_n);
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn export(&mut self) {
        let path = &self.options.export_path;
        self.status = match pipeline::download(&self.upload.scored, path) {
            Ok(()) => format!("Report written to {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    /// Re-read the CSV from disk. On failure the current dataset stays loaded.
    fn reload(&mut self) {
        match pipeline::upload(&self.options.csv_path, self.options.ingest) {
            Ok(upload) => {
                info!(path = %self.options.csv_path.display(), "reloaded dataset");
                self.status = loaded_status(&upload);
                let n = upload.scored.len();
                self.selection.borrower_index = match self.selection.borrower_index {
                    _ if n == 0 => None,
                    Some(i) => Some(i.min(n - 1)),
                    None => Some(0),
                };
                self.upload = upload;
            }
            Err(err) => {
                warn!("reload failed: {err}");
                self.status = err.to_string();
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match pipeline::build_view(&self.upload.scored, &self.selection) {
            Ok(view) => {
                self.draw_header(frame, chunks[0], &view);
                self.draw_body(frame, chunks[1], &view);
            }
            Err(err) => {
                let p = Paragraph::new(err.to_string())
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(p, chunks[0]);
            }
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView<'_>) {
        let s = &view.summary;
        let avg = s
            .avg_risk_score
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let lines = vec![
            Line::from(vec![
                Span::styled("crisk", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" | {}", self.upload.source.display())),
            ]),
            Line::from(Span::styled(
                format!(
                    "Total Borrowers: {} | High Risk Borrowers: {} | Average Risk Score: {avg} | skipped rows: {}",
                    s.total_borrowers,
                    s.high_risk_borrowers,
                    self.upload.ingest.row_errors.len(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView<'_>) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(columns[0]);
        self.draw_histogram(frame, left[0], view);
        self.draw_filtered(frame, left[1], view);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.selection.top_n.min(10) as u16 + 4),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(columns[1]);
        self.draw_top_risk(frame, right[0], view);
        self.draw_regions(frame, right[1], view);
        self.draw_recommendation(frame, right[2], view);
    }

    fn draw_histogram(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView<'_>) {
        let block = Block::default()
            .title("Risk Score Distribution")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let bars = histogram_bars(&view.histogram);
        let max = view.histogram.max_count();
        if max == 0 {
            frame.render_widget(
                Paragraph::new("No scores to plot.").style(Style::default().fg(Color::Yellow)),
                inner,
            );
            return;
        }
        let chart = RiskHistogramChart {
            bars: &bars,
            y_max: max as f64 * 1.1,
        };
        frame.render_widget(chart, inner);
    }

    fn draw_filtered(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView<'_>) {
        let title = format!(
            "Borrowers, level: {} ({} rows)  ←/→",
            view.level.label(),
            view.filtered.len()
        );
        let with_region = self.upload.scored.has_region();
        let table = borrower_table(&view.filtered, with_region)
            .block(Block::default().title(title).borders(Borders::ALL))
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White));

        let mut state = TableState::default();
        let selected_pos = self
            .selection
            .borrower_index
            .and_then(|idx| view.filtered.iter().position(|r| r.index == idx));
        state.select(selected_pos);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_top_risk(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView<'_>) {
        let title = format!("Top {} High-Risk Borrowers  +/-", self.selection.top_n);
        let table = borrower_table(&view.top_risk, false).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_regions(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView<'_>) {
        let block = Block::default().title("Risk by Region").borders(Borders::ALL);
        match &view.regions {
            RegionView::Unavailable => {
                let p = Paragraph::new(REGION_UNAVAILABLE)
                    .style(Style::default().fg(Color::Yellow))
                    .wrap(ratatui::widgets::Wrap { trim: true })
                    .block(block);
                frame.render_widget(p, area);
            }
            RegionView::Available(groups) => {
                let header = Row::new(["region", "n", "avg", "high %"])
                    .style(Style::default().add_modifier(Modifier::BOLD));
                let rows = groups.iter().map(|g| {
                    Row::new(vec![
                        Cell::from(g.region.clone()),
                        Cell::from(g.total_borrowers.to_string()),
                        Cell::from(format!("{:.3}", g.avg_risk_score)),
                        Cell::from(format!("{:.0}%", g.high_risk_pct * 100.0))
                            .style(Style::default().fg(heat_color(g.high_risk_pct))),
                    ])
                });
                let table = Table::new(
                    rows,
                    [
                        Constraint::Min(10),
                        Constraint::Length(5),
                        Constraint::Length(6),
                        Constraint::Length(7),
                    ],
                )
                .header(header)
                .block(block);
                frame.render_widget(table, area);
            }
        }
    }

    fn draw_recommendation(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView<'_>) {
        let block = Block::default()
            .title("Loan Decision  ↑/↓")
            .borders(Borders::ALL);
        let text = match view.selected {
            Some((row, rec)) => Line::from(vec![
                Span::raw(format!("Borrower #{} is ", row.index)),
                Span::styled(
                    format!("{} risk", level_label(row)),
                    Style::default().fg(level_style_color(row.risk_level)).add_modifier(Modifier::BOLD),
                ),
                Span::raw(". Recommended action: "),
                Span::styled(rec.label(), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            None => Line::from("No borrowers loaded."),
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ level  ↑/↓ borrower  +/- top-N  e export  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn loaded_status(upload: &Upload) -> String {
    format!(
        "Loaded {} borrowers ({} skipped)",
        upload.ingest.rows_used,
        upload.ingest.row_errors.len()
    )
}

fn borrower_table<'a>(rows: &[&ScoredBorrower], with_region: bool) -> Table<'a> {
    let mut head = vec!["#", "age", "income", "loan", "score", "level"];
    if with_region {
        head.push("region");
    }
    let header = Row::new(head).style(Style::default().add_modifier(Modifier::BOLD));

    let body: Vec<Row<'a>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![
                Cell::from(r.index.to_string()),
                Cell::from(format!("{}", r.record.age)),
                Cell::from(format!("{:.0}", r.record.income)),
                Cell::from(format!("{:.0}", r.record.loan_amount)),
                Cell::from(format!("{:.3}", r.risk_score)),
                Cell::from(level_label(r)).style(Style::default().fg(level_style_color(r.risk_level))),
            ];
            if with_region {
                cells.push(Cell::from(r.record.region.clone().unwrap_or_default()));
            }
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(7),
    ];
    if with_region {
        widths.push(Constraint::Min(8));
    }
    Table::new(body, widths).header(header)
}

fn level_label(row: &ScoredBorrower) -> &'static str {
    row.risk_level.map(RiskLevel::label).unwrap_or("-")
}

fn level_style_color(level: Option<RiskLevel>) -> Color {
    match level {
        Some(RiskLevel::Low) => Color::Green,
        Some(RiskLevel::Medium) => Color::Yellow,
        Some(RiskLevel::High) => Color::Red,
        None => Color::DarkGray,
    }
}

/// Red intensity for a high-risk share in `[0, 1]`.
fn heat_color(pct: f64) -> Color {
    let pct = if pct.is_finite() { pct.clamp(0.0, 1.0) } else { 0.0 };
    let fade = (200.0 * (1.0 - pct)).round() as u8;
    Color::Rgb(255, fade, fade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LevelFilter;
    use crate::io::ingest::parse_dataset;
    use crate::risk;

    fn app(csv: &str) -> App {
        let ingest = parse_dataset(csv.as_bytes(), IngestOptions::default()).unwrap();
        let scored = risk::score(&ingest.dataset);
        let upload = Upload {
            source: PathBuf::from("test.csv"),
            ingest,
            scored,
        };
        let options = DashboardOptions {
            csv_path: PathBuf::from("does/not/exist.csv"),
            export_path: PathBuf::from("does/not/exist/report.csv"),
            top_n: 5,
            ingest: IngestOptions::default(),
        };
        App::new(options, upload)
    }

    const CSV: &str = "age,income,loan_amount\n30,1000,2000\n60,9000,1000\n22,100,5000\n";

    #[test]
    fn level_keys_cycle_filter() {
        let mut a = app(CSV);
        assert!(!a.handle_key(KeyCode::Right));
        assert_eq!(a.selection.level, LevelFilter::Only(RiskLevel::Low));
        a.handle_key(KeyCode::Left);
        a.handle_key(KeyCode::Left);
        assert_eq!(a.selection.level, LevelFilter::Only(RiskLevel::High));
    }

    #[test]
    fn borrower_keys_stay_in_range() {
        let mut a = app(CSV);
        assert_eq!(a.selection.borrower_index, Some(0));
        a.handle_key(KeyCode::Up);
        assert_eq!(a.selection.borrower_index, Some(0));
        for _ in 0..10 {
            a.handle_key(KeyCode::Down);
        }
        assert_eq!(a.selection.borrower_index, Some(2));
        assert!(pipeline::build_view(&a.upload.scored, &a.selection).is_ok());
    }

    #[test]
    fn top_n_never_drops_below_one() {
        let mut a = app(CSV);
        for _ in 0..10 {
            a.handle_key(KeyCode::Char('-'));
        }
        assert_eq!(a.selection.top_n, 1);
        a.handle_key(KeyCode::Char('+'));
        assert_eq!(a.selection.top_n, 2);
    }

    #[test]
    fn failed_reload_keeps_dataset() {
        let mut a = app(CSV);
        a.handle_key(KeyCode::Char('r'));
        assert_eq!(a.upload.scored.len(), 3);
        assert!(a.status.contains("cannot open"));
    }

    #[test]
    fn failed_export_is_reported_in_status() {
        let mut a = app(CSV);
        a.handle_key(KeyCode::Char('e'));
        assert!(a.status.starts_with("Export failed"));
    }

    #[test]
    fn quit_keys() {
        let mut a = app(CSV);
        assert!(a.handle_key(KeyCode::Char('q')));
        assert!(a.handle_key(KeyCode::Esc));
    }

    #[test]
    fn heat_color_endpoints() {
        assert_eq!(heat_color(0.0), Color::Rgb(255, 200, 200));
        assert_eq!(heat_color(1.0), Color::Rgb(255, 0, 0));
    }
}
