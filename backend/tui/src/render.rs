//! TUI Rendering
//!
//! Translates `TuiApp` (through the shared `Screen` view model) into Ratatui
//! widgets and draws them to the terminal frame.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use cropguard_core::ConfidenceTier;
use cropguard_media::{mime_from_data_uri, SUPPORTED_FORMATS_HINT};
use cropguard_session::{text, DiagnosisCard, Outcome, Screen};

use crate::app::{Tab, TuiApp};

/// Main draw function.
pub fn draw_ui(f: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(5),    // Body
            Constraint::Length(3), // Path input
            Constraint::Length(1), // Key hints
        ])
        .split(f.size());

    let selected = match app.tab {
        Tab::Diagnose => 0,
        Tab::History => 1,
    };
    let tabs = Tabs::new(vec!["诊断", text::HISTORY_LABEL])
        .select(selected)
        .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().title(text::APP_TITLE).borders(Borders::ALL));
    f.render_widget(tabs, chunks[0]);

    let screen = app.screen();
    let body = match app.tab {
        Tab::Diagnose => body_lines(&screen, app.alert.as_deref()),
        Tab::History => vec![Line::from("暂无历史记录")],
    };
    let body_widget = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body_widget, chunks[1]);

    let input_style = match &screen.upload {
        Some(panel) if panel.enabled => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::DarkGray),
    };
    let input_widget = Paragraph::new(app.input.as_str())
        .style(input_style)
        .block(Block::default().title(text::UPLOAD_BUTTON).borders(Borders::ALL));
    f.render_widget(input_widget, chunks[2]);

    let hints = Paragraph::new(key_hints(&screen)).style(Style::default().fg(Color::DarkGray));
    f.render_widget(hints, chunks[3]);
}

fn key_hints(screen: &Screen) -> &'static str {
    if screen.outcome.is_some() {
        "Enter/Esc 识别另一张照片 · Tab 历史记录 · Ctrl-C 退出"
    } else if screen.error_banner.is_some() {
        "Ctrl-R 重试 · Enter 提交新路径 · Esc 重置 · Ctrl-C 退出"
    } else if screen.loading {
        "Esc 取消 · Ctrl-C 退出"
    } else {
        "输入或拖入图片路径后按 Enter · Esc 退出"
    }
}

/// Lines of the diagnose tab body, top to bottom.
pub fn body_lines(screen: &Screen, alert: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(alert) = alert {
        lines.push(Line::styled(alert.to_string(), Style::default().fg(Color::Red)));
        lines.push(Line::from(""));
    }

    if screen.hero {
        lines.push(Line::styled(
            text::HERO_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::from(text::HERO_SUBTITLE));
        lines.push(Line::from(""));
    }

    if let Some(panel) = &screen.upload {
        let style = if panel.enabled {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::styled(text::UPLOAD_TITLE, style.add_modifier(Modifier::BOLD)));
        lines.push(Line::styled(text::UPLOAD_HINT, style));
        lines.push(Line::styled(
            format!("{SUPPORTED_FORMATS_HINT} · {}", text::MAX_SIZE_HINT),
            style,
        ));
    }

    if screen.loading {
        lines.push(Line::from(""));
        lines.push(Line::styled(text::LOADING_TITLE, Style::default().fg(Color::Cyan)));
    }

    if let Some(banner) = &screen.error_banner {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            text::ERROR_TITLE,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::styled(banner.message.clone(), Style::default().fg(Color::Red)));
        lines.push(Line::from(format!("[Ctrl-R] {}", text::RETRY_LABEL)));
    }

    match &screen.outcome {
        Some(Outcome::Diagnosis(card)) => push_card(&mut lines, card),
        Some(Outcome::NotAPlant) => {
            lines.push(Line::styled(
                text::NOT_A_PLANT_TITLE,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::from(text::NOT_A_PLANT_BODY));
        }
        None => {}
    }

    lines
}

fn tier_color(tier: ConfidenceTier) -> Color {
    match tier {
        ConfidenceTier::High => Color::Green,
        ConfidenceTier::Medium => Color::Yellow,
        ConfidenceTier::Low => Color::Red,
    }
}

fn push_card(lines: &mut Vec<Line<'static>>, card: &DiagnosisCard) {
    let result = &card.result;
    if let Some(mime) = card.image_uri.as_deref().and_then(mime_from_data_uri) {
        lines.push(Line::styled(format!("[{mime}]"), Style::default().fg(Color::DarkGray)));
    }

    lines.push(Line::styled(
        result.plant_name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let condition_color = if card.healthy { Color::Green } else { Color::Red };
    lines.push(Line::from(vec![
        Span::styled(result.condition.clone(), Style::default().fg(condition_color)),
        Span::raw("  "),
        Span::raw(format!("{}: ", text::CONFIDENCE_LABEL)),
        Span::styled(
            format!("{}%", card.confidence_percent),
            Style::default().fg(tier_color(card.confidence_tier)),
        ),
    ]));
    lines.push(Line::from(result.description.clone()));

    for (title, items, numbered) in [
        (text::SYMPTOMS_TITLE, &result.symptoms, false),
        (text::TREATMENT_TITLE, &result.treatment, true),
        (text::PREVENTION_TITLE, &result.prevention, false),
    ] {
        lines.push(Line::from(""));
        lines.push(Line::styled(title, Style::default().add_modifier(Modifier::BOLD)));
        for (i, item) in items.iter().enumerate() {
            let bullet = if numbered { format!("{}. ", i + 1) } else { "• ".to_string() };
            lines.push(Line::from(format!("{bullet}{item}")));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!("[Enter] {}", text::ANALYZE_ANOTHER)));
}
