use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, BorderType, Borders, Chart, Dataset, Gauge, GraphType, Paragraph,
};

use crate::Theme;
use crate::backend::{Account, AnalyticsSeries};
use crate::page::{Page, PageEvent};
use crate::ui::{Component, Spinner};

#[derive(Debug, Default)]
enum SeriesState {
    #[default]
    NotRequested,
    Loading,
    Loaded(AnalyticsSeries),
    Unavailable,
}

/// Player statistics and the usage chart.
///
/// The series is requested once, the first time the page is shown.
pub struct AnalyticsPage {
    series: SeriesState,
    account: Option<Account>,
    spinner: Spinner,
}

impl Default for AnalyticsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsPage {
    pub fn new() -> Self {
        Self {
            series: SeriesState::NotRequested,
            account: None,
            spinner: Spinner::new().with_label("Loading analytics…"),
        }
    }

    /// `None` when the request failed; the chart then stays empty.
    pub fn set_series(&mut self, series: Option<AnalyticsSeries>) {
        self.series = series.map_or(SeriesState::Unavailable, SeriesState::Loaded);
    }

    fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
        Block::default()
            .title(format!(" {title} "))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [players_area, adoption_area, quota_area] = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(area);

        let account = self.account.clone().unwrap_or_default();

        let players = vec![
            Line::from(Span::styled(
                account.total_modern_auth_players.to_string(),
                Style::default().fg(theme.lavender()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("of {} players", account.total_players),
                Style::default().fg(theme.subtext0()),
            )),
        ];
        frame.render_widget(
            Paragraph::new(players)
                .alignment(Alignment::Center)
                .block(Self::panel("Players using ModernAuth", theme)),
            players_area,
        );

        frame.render_widget(
            Gauge::default()
                .block(Self::panel("Adoption", theme))
                .gauge_style(Style::default().fg(theme.green()).bg(theme.surface0()))
                .percent(account.adoption_percent()),
            adoption_area,
        );

        frame.render_widget(
            Gauge::default()
                .block(Self::panel("Quota used", theme))
                .gauge_style(Style::default().fg(theme.peach()).bg(theme.surface0()))
                .percent(u16::from(account.quota_percent.min(100))),
            quota_area,
        );
    }

    fn render_chart(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Self::panel("Players per day", theme);

        let series = match &self.series {
            SeriesState::Loaded(series) if !series.is_empty() => series,
            SeriesState::NotRequested | SeriesState::Loading => {
                let inner = block.inner(area);
                frame.render_widget(block, area);
                self.spinner.render(frame, inner, theme);
                return;
            }
            SeriesState::Loaded(_) | SeriesState::Unavailable => {
                frame.render_widget(
                    Paragraph::new("No analytics data available.")
                        .style(Style::default().fg(theme.overlay1()))
                        .alignment(Alignment::Center)
                        .block(block),
                    area,
                );
                return;
            }
        };

        let points = series.points();
        let last = points.len().saturating_sub(1);
        let x_max = points.last().map_or(1.0, |(x, _)| x.max(1.0));
        let y_max = (series.max_value() * 1.1).max(1.0);

        let x_labels: Vec<Span> = [0, last / 2, last]
            .into_iter()
            .filter_map(|i| series.labels.get(i))
            .map(|label| Span::raw(label.clone()))
            .collect();
        let y_labels = vec![
            Span::raw("0"),
            Span::raw(format!("{:.0}", y_max / 2.0)),
            Span::raw(format!("{y_max:.0}")),
        ];

        let dataset = Dataset::default()
            .name("Players")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.accent()))
            .data(&points);

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(theme.overlay1()))
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(theme.overlay1()))
                    .bounds([0.0, y_max])
                    .labels(y_labels),
            );

        frame.render_widget(chart, area);
    }
}

impl Page for AnalyticsPage {
    fn handle_tick(&mut self) {
        if matches!(self.series, SeriesState::Loading) {
            self.spinner.handle_tick();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [stats_area, chart_area] =
            Layout::vertical([Constraint::Length(4), Constraint::Min(8)]).areas(area);
        self.render_stats(frame, stats_area, theme);
        self.render_chart(frame, chart_area, theme);
    }

    fn set_account(&mut self, account: &Account) {
        self.account = Some(account.clone());
    }

    fn on_enter(&mut self) -> Option<PageEvent> {
        if matches!(self.series, SeriesState::NotRequested) {
            self.series = SeriesState::Loading;
            return Some(PageEvent::LoadSeries);
        }
        None
    }
}
