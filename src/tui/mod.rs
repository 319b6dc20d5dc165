//! Ratatui-based terminal UI.
//!
//! The TUI presents both views of one pipeline result: a bar chart of the
//! ranked states and a scrollable table of every state in the metrics map.
//! Every accepted selection change re-runs the full aggregation synchronously
//! against the resident inputs.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Terminal,
};

use crate::app::pipeline::{self, LoadedInputs, RunOutput};
use crate::cli::RunArgs;
use crate::domain::{DateRange, MetricField, RunConfig, StateMetrics};
use crate::error::AppError;
use crate::report::{fmt_abs, fmt_population, fmt_rel};

/// Start the TUI.
///
/// Inputs are loaded before the terminal switches modes so that load errors
/// print as ordinary CLI errors.
pub fn run(args: RunArgs) -> Result<(), AppError> {
    let config = crate::app::run_config_from_args(&args)?;
    let inputs = pipeline::load_inputs(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, inputs);
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
    config: RunConfig,
    inputs: LoadedInputs,
    run: RunOutput,
    table_offset: usize,
    editing_range: bool,
    range_input: String,
    status: String,
}

impl App {
    fn new(config: RunConfig, inputs: LoadedInputs) -> Self {
        let run = pipeline::run_with_inputs(&inputs, &config);
        let status = format!(
            "{} states aggregated, {} warnings.",
            run.output.metrics.len(),
            run.output.warnings.len()
        );
        Self {
            config,
            inputs,
            run,
            table_offset: 0,
            editing_range: false,
            range_input: String::new(),
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_range {
            self.handle_range_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('m') => {
                self.config.metric = next_metric(self.config.metric);
                self.recompute();
                self.status = format!("metric: {}", self.config.metric.display_name());
            }
            KeyCode::Char('t') => {
                self.config.descending = !self.config.descending;
                self.recompute();
                self.status = if self.config.descending {
                    "ranking top-N.".to_string()
                } else {
                    "ranking bottom-N.".to_string()
                };
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.config.top_n = self.config.top_n.saturating_add(1);
                self.recompute();
                self.status = format!("top: {}", self.config.top_n);
            }
            KeyCode::Char('-') => {
                self.config.top_n = self.config.top_n.saturating_sub(1).max(1);
                self.recompute();
                self.status = format!("top: {}", self.config.top_n);
            }
            KeyCode::Char('e') => {
                self.editing_range = true;
                self.range_input = self
                    .config
                    .range
                    .map(|r| format!("{}..{}", r.start, r.end))
                    .unwrap_or_default();
                self.status = "Editing range (FROM..TO).".to_string();
            }
            KeyCode::Char('c') => {
                self.config.range = None;
                self.recompute();
                self.status = "Window: full span.".to_string();
            }
            KeyCode::Up => {
                self.table_offset = self.table_offset.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.run.output.metrics.len().saturating_sub(1);
                self.table_offset = (self.table_offset + 1).min(max);
            }
            _ => {}
        }

        false
    }

    fn handle_range_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_range = false;
                self.status = "Range edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_range = false;
                self.apply_range_input();
            }
            KeyCode::Backspace => {
                self.range_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || matches!(c, '-' | '/' | '.') {
                    self.range_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_range_input(&mut self) {
        match parse_range_input(&self.range_input) {
            Ok(range) => {
                self.config.range = range;
                self.recompute();
                self.status = match &self.config.range {
                    Some(r) => format!("Window: {} -> {}", r.start, r.end),
                    None => "Window: full span.".to_string(),
                };
            }
            Err(err) => {
                // Keep the old window; just report the parse problem.
                self.status = err.to_string();
            }
        }
    }

    fn recompute(&mut self) {
        // One full superseding pass per trigger; selections were snapshotted
        // into the config before this call.
        self.run = pipeline::run_with_inputs(&self.inputs, &self.config);
        let max = self.run.output.metrics.len().saturating_sub(1);
        self.table_offset = self.table_offset.min(max);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("cov", Style::default().fg(Color::Cyan)),
            Span::raw(" - COVID-19 state metrics"),
        ]));

        let window = match &self.config.range {
            Some(r) => format!("{} -> {}", r.start, r.end),
            None => "full span".to_string(),
        };
        let direction = if self.config.descending { "top" } else { "bottom" };
        lines.push(Line::from(Span::styled(
            format!(
                "metric: {} | {direction} {} | window: {window} | states: {} | warnings: {}",
                self.config.metric.display_name(),
                self.config.top_n,
                self.run.output.metrics.len(),
                self.run.output.warnings.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(14)])
            .split(area);

        self.draw_bars(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
    }

    fn draw_bars(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let direction = if self.config.descending { "Top" } else { "Bottom" };
        let title = format!(
            "{direction} {} by {}",
            self.run.ranked.len(),
            self.config.metric.display_name()
        );
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.run.ranked.is_empty() {
            let msg = Paragraph::new("No states in the selected window.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let metric = self.config.metric;
        let scale = bar_scale(metric);
        let bars: Vec<Bar<'_>> = self
            .run
            .ranked
            .iter()
            .map(|m| {
                Bar::default()
                    .value(bar_value(m.value(metric), scale))
                    .text_value(bar_text(m.value(metric), metric))
                    .label(Line::from(self.bar_label(m)))
                    .style(Style::default().fg(Color::Cyan))
                    .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            })
            .collect();

        let max = self
            .run
            .ranked
            .iter()
            .map(|m| bar_value(m.value(metric), scale))
            .max()
            .unwrap_or(0)
            .max(1);

        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .max(max)
            .bar_gap(1)
            .bar_width(8);

        frame.render_widget(chart, area);
    }

    /// Bars are labeled by feed code where the table knows one.
    fn bar_label(&self, metrics: &StateMetrics) -> String {
        match self.inputs.names.abbreviation(&metrics.state_name) {
            Some(code) => code.to_string(),
            None => metrics.state_name.chars().take(8).collect(),
        }
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let header = Row::new(vec![
            "state",
            "population",
            "cases",
            "deaths",
            "cases %",
            "deaths %",
        ])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

        let rows: Vec<Row<'_>> = self
            .run
            .output
            .metrics
            .iter()
            .map(|m| {
                Row::new(vec![
                    Cell::from(m.state_name.clone()),
                    Cell::from(fmt_population(m.population)),
                    Cell::from(fmt_abs(m.abs_cases)),
                    Cell::from(fmt_abs(m.abs_deaths)),
                    Cell::from(fmt_rel(m.rel_cases)),
                    Cell::from(fmt_rel(m.rel_deaths)),
                ])
            })
            .collect();

        let title = format!("All states ({})", self.run.output.metrics.len());
        let table = Table::new(
            rows,
            [
                Constraint::Min(24),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .column_spacing(1);

        let mut state = TableState::default().with_offset(self.table_offset);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = if self.editing_range {
            Line::from(vec![
                Span::styled("range: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{}_", self.range_input),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "  FROM..TO, Enter apply, Esc cancel, empty clears",
                    Style::default().fg(Color::Gray),
                ),
            ])
        } else {
            let help = "m metric  t top/bottom  +/- adjust N  e edit range  c clear  up/down scroll  q quit";
            Line::from(vec![
                Span::styled(help, Style::default().fg(Color::Gray)),
                Span::raw(" | "),
                Span::styled(&self.status, Style::default().fg(Color::Yellow)),
            ])
        };
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Cycle order matches the CLI value order.
fn next_metric(cur: MetricField) -> MetricField {
    match cur {
        MetricField::AbsCases => MetricField::AbsDeaths,
        MetricField::AbsDeaths => MetricField::RelCases,
        MetricField::RelCases => MetricField::RelDeaths,
        MetricField::RelDeaths => MetricField::AbsCases,
    }
}

/// Relative metrics are small percentages; scale them up so bars keep
/// resolution once truncated to integer heights.
fn bar_scale(metric: MetricField) -> f64 {
    if metric.is_relative() { 1000.0 } else { 1.0 }
}

/// Bar height. Negative totals floor at zero height (the text value still
/// shows the signed number); unresolved metrics get no bar at all.
fn bar_value(value: Option<f64>, scale: f64) -> u64 {
    match value {
        Some(v) if v > 0.0 => (v * scale).round() as u64,
        _ => 0,
    }
}

fn bar_text(value: Option<f64>, metric: MetricField) -> String {
    match value {
        Some(v) if metric.is_relative() => format!("{v:.4}"),
        Some(v) => format!("{v:.0}"),
        None => "-".to_string(),
    }
}

/// `FROM..TO` with either accepted date format; empty input clears the window.
fn parse_range_input(input: &str) -> Result<Option<DateRange>, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let Some((from, to)) = trimmed.split_once("..") else {
        return Err(AppError::new(
            2,
            "Expected FROM..TO (e.g. 2020-03-01..2020-03-31).",
        ));
    };
    crate::app::parse_range_args(Some(from.trim()), Some(to.trim()))
}
