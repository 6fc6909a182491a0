use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::{
    models::{Comparison, RewardEstimate, Side, UserOverview},
    session::ViewState,
    tui::app::{App, InputMode, Screen},
    utils::{format_fdv, format_money, format_price, format_qty},
};

pub fn draw(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Main => draw_main_screen(frame, app),
        Screen::Results => draw_results_screen(frame, app),
    }
    if let Some(message) = app.loading_message() {
        draw_loading_popup(frame, &message);
    }
}

fn key(label: &str, color: Color) -> Span<'_> {
    Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn draw_main_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.size());

    let title = Paragraph::new("📣 Yap Reward Estimator")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let projects: Vec<ListItem> = app
        .projects
        .iter()
        .enumerate()
        .map(|(i, project)| {
            let content = format!(
                "{} (${}) pool {} of {}",
                project.name,
                project.ticker,
                format_qty(project.reward_pool, 0),
                format_qty(project.total_supply, 0),
            );
            let style = if i == app.selected_project {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(content).style(style)
        })
        .collect();
    let projects = List::new(projects)
        .block(Block::default().borders(Borders::ALL).title("Projects (Tab to change)"));
    frame.render_widget(projects, chunks[1]);

    let editing = app.input_mode == InputMode::EditingHandle;
    let input = Paragraph::new(app.handle_input.as_str())
        .style(if editing { Style::default().fg(Color::Yellow) } else { Style::default() })
        .block(Block::default().borders(Borders::ALL).title(if editing {
            "X handle [Enter to check, ESC to cancel]"
        } else {
            "X handle [e to edit]"
        }));
    frame.render_widget(input, chunks[2]);

    let mut lines = vec![Line::from(vec![
        Span::raw("Commands: "),
        key("e", Color::Green),
        Span::raw(" edit handle | "),
        key("Enter", Color::Green),
        Span::raw(" check rewards | "),
        key("q", Color::Red),
        Span::raw(" quit"),
    ])];
    if let Some(error) = &app.error_message {
        lines.push(Line::from(vec![
            Span::styled("Error: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(error.as_str(), Style::default().fg(Color::Red)),
        ]));
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );

    if editing {
        frame.set_cursor(
            chunks[2].x + app.handle_input.chars().count() as u16 + 1,
            chunks[2].y + 1,
        );
    }
}

fn draw_results_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(frame.size());

    let project = app.project().map(|p| p.name.as_str()).unwrap_or("-");
    let title = Paragraph::new(format!("🎯 {} rewards", project))
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let ratio = if app.max_fdv > 0.0 { gauge_ratio(app.fdv / app.max_fdv, 0.0) } else { 0.0 };
    let slider = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Simulated FDV (←/→, PgUp/PgDn)"))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio)
        .label(format_fdv(app.fdv));
    frame.render_widget(slider, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    draw_estimate(frame, body[0], &app.estimate.state());
    draw_overview(frame, body[1], &app.overview.state());

    draw_comparison(frame, chunks[3], app);

    let help = if app.input_mode == InputMode::EditingFren {
        "Type a fren's handle and press Enter | ESC to cancel"
    } else {
        "'c' compare with a fren | 'r' refresh | 'b' back | 'q' quit"
    };
    frame.render_widget(
        Paragraph::new(help).block(Block::default().borders(Borders::ALL)),
        chunks[4],
    );
}

fn draw_estimate(frame: &mut Frame, area: Rect, state: &ViewState<RewardEstimate>) {
    let block = Block::default().borders(Borders::ALL).title("Estimate");
    let text = match state {
        ViewState::Loaded(estimate) => estimate_lines(estimate),
        ViewState::Failed { reason, .. } => vec![Line::from(Span::styled(
            format!("❌ {}", reason),
            Style::default().fg(Color::Red),
        ))],
        _ => vec![Line::from("...")],
    };
    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn estimate_lines(estimate: &RewardEstimate) -> Vec<Line<'_>> {
    let score = &estimate.score;
    let mut text = vec![
        Line::from(vec![
            Span::raw("Handle: "),
            Span::styled(format!("@{}", estimate.handle), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(format!(
            "Score: {:.4} via {}",
            score.weighted_score,
            if score.used_mindshare { "mindshare" } else { "rank" }
        )),
        Line::from(format!(
            "Best rank: {}",
            score.best_rank.map(|r| format!("#{}", r)).unwrap_or_else(|| "unranked".to_string())
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Tokens: "),
            Span::styled(
                format!("{} ${}", format_qty(score.tokens_awarded, 2), estimate.ticker),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!("Token price: {}", format_price(estimate.valuation.token_price))),
        Line::from(vec![
            Span::raw("Worth: "),
            Span::styled(
                format_money(estimate.valuation.worth_usd),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    if score.eligible {
        text.push(Line::from(vec![
            Span::styled("✅ ", Style::default().fg(Color::Green)),
            Span::styled(estimate.tagline.as_str(), Style::default().fg(Color::Green)),
        ]));
    } else {
        text.push(Line::from(Span::styled(
            "❌ Not eligible",
            Style::default().fg(Color::Red),
        )));
    }
    text
}

fn draw_overview(frame: &mut Frame, area: Rect, state: &ViewState<UserOverview>) {
    let block = Block::default().borders(Borders::ALL).title("Account");
    let text = match state {
        ViewState::Loaded(overview) => vec![
            Line::from(format!("Followers: {}", format_qty(overview.status.follower_count as f64, 0))),
            Line::from(format!(
                "Smart followers: {}",
                format_qty(overview.status.smart_follower_count as f64, 0)
            )),
            Line::from(format!("Yaps: {}", format_qty(overview.yaps.yaps_all, 2))),
            Line::from(format!("Yaps (24h): {}", format_qty(overview.yaps.yaps_l24h, 2))),
        ],
        ViewState::Failed { reason, .. } => vec![Line::from(Span::styled(
            reason.as_str(),
            Style::default().fg(Color::Red),
        ))],
        _ => vec![Line::from("...")],
    };
    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn draw_comparison(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.input_mode == InputMode::EditingFren {
        format!("Fren: {}_", app.fren_input)
    } else {
        "Fren comparison".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    match app.comparison.state() {
        ViewState::Loaded(comparison) => draw_share(frame, area, block, &comparison),
        ViewState::Failed { reason, .. } => frame.render_widget(
            Paragraph::new(Span::styled(reason, Style::default().fg(Color::Red))).block(block),
            area,
        ),
        _ => frame.render_widget(Paragraph::new("Press 'c' to compare").block(block), area),
    }
}

fn draw_share(frame: &mut Frame, area: Rect, block: Block, comparison: &Comparison) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let side_line = |estimate: &RewardEstimate, leads: bool| {
        Line::from(vec![
            Span::styled(
                format!("{}@{}", if leads { "👑 " } else { "   " }, estimate.handle),
                Style::default().add_modifier(if leads { Modifier::BOLD } else { Modifier::empty() }),
            ),
            Span::raw(format!(
                "  {} ${}  {}",
                format_qty(estimate.score.tokens_awarded, 2),
                estimate.ticker,
                format_money(estimate.valuation.worth_usd),
            )),
        ])
    };
    let you_lead = comparison.leader == Side::You;
    frame.render_widget(
        Paragraph::new(vec![
            side_line(&comparison.you, you_lead),
            side_line(&comparison.fren, !you_lead),
        ]),
        rows[0],
    );

    let share = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Magenta))
        .ratio(gauge_ratio(comparison.you_share, 0.5))
        .label(format!(
            "{:.1}% / {:.1}%",
            comparison.you_share * 100.0,
            (1.0 - comparison.you_share) * 100.0
        ));
    frame.render_widget(share, rows[1]);

    frame.render_widget(
        Paragraph::new(format!("Gap: {}", format_money(comparison.worth_gap()))),
        rows[2],
    );
}

// `Gauge::ratio` panics outside [0, 1], and `clamp` passes NaN through.
fn gauge_ratio(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

fn draw_loading_popup(frame: &mut Frame, message: &str) {
    let area = centered_rect(60, 20, frame.size());

    let loading = Paragraph::new(message)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("⏳ Loading"));

    frame.render_widget(Clear, area);
    frame.render_widget(loading, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_ratio_stays_in_unit_range() {
        assert_eq!(gauge_ratio(0.25, 0.5), 0.25);
        assert_eq!(gauge_ratio(1.5, 0.5), 1.0);
        assert_eq!(gauge_ratio(-0.1, 0.5), 0.0);
        assert_eq!(gauge_ratio(f64::NAN, 0.5), 0.5);
        assert_eq!(gauge_ratio(f64::INFINITY, 0.0), 0.0);
    }
}
