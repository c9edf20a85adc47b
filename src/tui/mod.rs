//! Ratatui-based dashboard.
//!
//! The dashboard holds the generator config, the generated table, and the
//! selected view. Statistics are recomputed from the table on every frame
//! through the same pipeline the CLI uses.

use std::io;
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
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
};

use crate::app::pipeline::{self, LoadedTable, RunOutput};
use crate::domain::{AnalysisConfig, Category, GeneratorConfig, TableSource, TestConfig};
use crate::error::AppError;
use crate::report::{format_category_table, format_inference, format_results};
use crate::stats::{DEFAULT_HISTOGRAM_BINS, histogram};
use crate::viz::{category_totals, palette::category_color};

mod plotters_chart;

use plotters_chart::{Series, TerminalChart};

/// Record count step for `+` / `-`.
const COUNT_STEP: usize = 10;

/// Start the dashboard.
pub fn run(generator: GeneratorConfig, test: TestConfig) -> Result<(), AppError> {
    let mut app = App::new(generator, test)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Overview,
    Categories,
    Inference,
    Histogram,
    CategoryTotals,
}

impl View {
    const ALL: [View; 5] = [
        View::Overview,
        View::Categories,
        View::Inference,
        View::Histogram,
        View::CategoryTotals,
    ];

    fn title(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Categories => "Categories",
            View::Inference => "Inference",
            View::Histogram => "Histogram",
            View::CategoryTotals => "Category totals",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App {
    generator: GeneratorConfig,
    test: TestConfig,
    loaded: LoadedTable,
    view: View,
    status: String,
}

impl App {
    fn new(generator: GeneratorConfig, test: TestConfig) -> Result<Self, AppError> {
        crate::stats::inference::validate(&test)?;
        let loaded = pipeline::load_table(&TableSource::Generate(generator.clone()))?;
        Ok(Self {
            status: format!("Generated {} records.", loaded.table.len()),
            generator,
            test,
            loaded,
            view: View::Overview,
        })
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

    /// Returns `true` when the dashboard should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Down => self.view = self.view.next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Up => self.view = self.view.prev(),
            KeyCode::Char('r') => {
                self.generator.seed = self.generator.seed.wrapping_add(1);
                self.regenerate();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.generator.record_count = self.generator.record_count.saturating_add(COUNT_STEP);
                self.regenerate();
            }
            KeyCode::Char('-') => {
                self.generator.record_count = self
                    .generator
                    .record_count
                    .saturating_sub(COUNT_STEP)
                    .max(1);
                self.regenerate();
            }
            _ => {}
        }
        false
    }

    /// Regenerate the table; a failure keeps the previous table.
    fn regenerate(&mut self) {
        match pipeline::load_table(&TableSource::Generate(self.generator.clone())) {
            Ok(loaded) => {
                self.status = format!(
                    "Generated {} records (seed {}).",
                    loaded.table.len(),
                    self.generator.seed
                );
                self.loaded = loaded;
            }
            Err(err) => self.status = format!("Generation failed: {err}"),
        }
    }

    fn analysis(&self) -> Result<RunOutput, String> {
        let config = AnalysisConfig {
            source: TableSource::Generate(self.generator.clone()),
            category: None,
            test: self.test,
        };
        pipeline::analyze_loaded(self.loaded.clone(), &config).map_err(|e| e.to_string())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        let run = self.analysis();
        self.draw_header(frame, chunks[0], run.as_ref().ok());
        self.draw_tabs(frame, chunks[1]);
        self.draw_body(frame, chunks[2], &run);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: Option<&RunOutput>) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sales", Style::default().fg(Color::Cyan)),
            Span::raw(" | synthetic sales data exploration"),
        ]));

        let verdict = run
            .and_then(|r| r.inference.as_ref())
            .map(|i| i.verdict.display_name())
            .unwrap_or("-");
        let dates = self
            .loaded
            .table
            .date_range()
            .map(|(lo, hi)| format!("{lo} .. {hi}"))
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "records: {} | seed: {} | dates: {dates} | H0 mean = {}: {verdict}",
                self.loaded.table.len(),
                self.generator.seed,
                self.test.hypothesized_mean,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL))
            .select(self.view.index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &Result<RunOutput, String>) {
        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let run = match run {
            Ok(run) => run,
            Err(err) => {
                let msg = Paragraph::new(format!("No statistics: {err}"))
                    .style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
                return;
            }
        };

        match self.view {
            View::Overview => {
                let mut text = format!("Units sold ({} records)\n\n", run.table.len());
                text.push_str(&format_results(&run.summary.results()));
                frame.render_widget(Paragraph::new(text), inner);
            }
            View::Categories => {
                frame.render_widget(Paragraph::new(format_category_table(&run.by_category)), inner);
            }
            View::Inference => {
                let text = match &run.inference {
                    Some(inference) => format_inference(inference),
                    None => run
                        .skipped
                        .iter()
                        .find(|(step, _)| step == "inference")
                        .map(|(_, reason)| format!("Not available: {reason}"))
                        .unwrap_or_else(|| "Not available.".to_string()),
                };
                frame.render_widget(Paragraph::new(text), inner);
            }
            View::Histogram => self.draw_histogram(frame, inner, run),
            View::CategoryTotals => self.draw_category_totals(frame, inner, run),
        }
    }

    fn draw_histogram(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let Ok(bins) = histogram(&run.table.units(), DEFAULT_HISTOGRAM_BINS) else {
            frame.render_widget(Paragraph::new("No data."), area);
            return;
        };
        let (series, x_bounds, y_bounds) = histogram_series(&bins);
        let widget = TerminalChart {
            series: &series,
            x_bounds,
            y_bounds,
            x_label: "units sold",
            y_label: "count",
            x_labels: 6,
            fmt_x: fmt_axis_int,
            fmt_y: fmt_axis_int,
        };
        frame.render_widget(widget, area);
    }

    fn draw_category_totals(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let (series, x_bounds, y_bounds) = category_series(&category_totals(&run.table));
        let widget = TerminalChart {
            series: &series,
            x_bounds,
            y_bounds,
            x_label: "category",
            y_label: "units",
            x_labels: Category::ALL.len() + 1,
            fmt_x: fmt_category_tick,
            fmt_y: fmt_axis_int,
        };
        frame.render_widget(widget, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/←/→ view  r reseed  +/- records  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                &self.status,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Step outline of a histogram.
fn histogram_series(bins: &[crate::stats::Bin]) -> (Vec<Series>, [f64; 2], [f64; 2]) {
    let mut points = Vec::with_capacity(bins.len() * 2 + 2);
    for b in bins {
        points.push((b.lower, b.count as f64));
        points.push((b.upper, b.count as f64));
    }
    if let (Some(first), Some(last)) = (bins.first(), bins.last()) {
        points.insert(0, (first.lower, 0.0));
        points.push((last.upper, 0.0));
    }

    let x_bounds = match (bins.first(), bins.last()) {
        (Some(f), Some(l)) => [f.lower, l.upper],
        _ => [0.0, 1.0],
    };
    let top = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let series = vec![Series {
        points,
        color: plotters::style::RGBColor(0, 255, 255),
    }];
    (series, x_bounds, [0.0, top * 1.1 + 1.0])
}

/// One filled bar per category, drawn as closely spaced vertical lines at
/// the category's position in `Category::ALL`.
fn category_series(totals: &[(Category, u64)]) -> (Vec<Series>, [f64; 2], [f64; 2]) {
    const STROKES: usize = 9;
    const HALF_WIDTH: f64 = 0.3;

    let mut series = Vec::new();
    for (category, total) in totals {
        let x = Category::ALL.iter().position(|c| c == category).unwrap_or(0) as f64;
        for s in 0..STROKES {
            let dx = -HALF_WIDTH + 2.0 * HALF_WIDTH * s as f64 / (STROKES - 1) as f64;
            series.push(Series {
                points: vec![(x + dx, 0.0), (x + dx, *total as f64)],
                color: category_color(*category),
            });
        }
    }
    let top = totals.iter().map(|(_, t)| *t).max().unwrap_or(0) as f64;
    (
        series,
        [-0.5, Category::ALL.len() as f64 - 0.5],
        [0.0, top * 1.1 + 1.0],
    )
}

fn fmt_axis_int(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_category_tick(v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 0.05 || i < 0.0 {
        return String::new();
    }
    Category::ALL
        .get(i as usize)
        .map(|c| c.display_name().chars().take(4).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(GeneratorConfig::default(), TestConfig::default()).unwrap()
    }

    #[test]
    fn tab_cycles_through_views() {
        let mut app = app();
        for expected in [
            View::Categories,
            View::Inference,
            View::Histogram,
            View::CategoryTotals,
            View::Overview,
        ] {
            assert!(!app.handle_key(KeyCode::Tab));
            assert_eq!(app.view, expected);
        }
        app.handle_key(KeyCode::Left);
        assert_eq!(app.view, View::CategoryTotals);
    }

    #[test]
    fn reseed_regenerates_table() {
        let mut app = app();
        let before = app.loaded.table.clone();
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.generator.seed, GeneratorConfig::default().seed + 1);
        assert_ne!(app.loaded.table, before);
    }

    #[test]
    fn plus_and_minus_change_record_count() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+'));
        assert_eq!(app.loaded.table.len(), 110);
        for _ in 0..20 {
            app.handle_key(KeyCode::Char('-'));
        }
        assert_eq!(app.generator.record_count, 1);
        assert_eq!(app.loaded.table.len(), 1);

        let run = app.analysis().unwrap();
        assert!(run.inference.is_none());
    }

    #[test]
    fn invalid_alpha_refuses_to_start() {
        let test = TestConfig { alpha: 1.5, ..TestConfig::default() };
        let err = App::new(GeneratorConfig::default(), test).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn q_quits() {
        assert!(app().handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn category_bars_sit_on_category_positions() {
        let (series, x_bounds, _) = category_series(&[(Category::Home, 12), (Category::Sports, 3)]);
        assert_eq!(series.len(), 18);
        assert_eq!(x_bounds, [-0.5, 4.5]);
        let home_mid = &series[4].points;
        assert_eq!(home_mid, &vec![(1.0, 0.0), (1.0, 12.0)]);
        assert_eq!(fmt_category_tick(1.0), "Home");
        assert_eq!(fmt_category_tick(1.5), "");
    }

    #[test]
    fn histogram_outline_closes_at_zero() {
        let bins = histogram(&[1, 2, 2, 3], 2).unwrap();
        let (series, x_bounds, _) = histogram_series(&bins);
        let pts = &series[0].points;
        assert_eq!(pts.first(), Some(&(1.0, 0.0)));
        assert_eq!(pts.last(), Some(&(3.0, 0.0)));
        assert_eq!(x_bounds, [1.0, 3.0]);
    }
}
