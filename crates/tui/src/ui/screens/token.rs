use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::AppState,
    ui::{screens::centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let card_area = centered_box(48.min(area.width), 6, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" bearer token ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Hint
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Input
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("API {}", state.base_url),
            Style::default().fg(theme.text_muted),
        )),
        rows[0],
    );
    let masked = format!("{}│", mask(&state.token.input));
    frame.render_widget(
        Paragraph::new(Span::styled(masked, Style::default().fg(theme.accent))),
        rows[2],
    );

    if let Some(message) = &state.token.message {
        let error_area = Rect {
            x: card_area.x,
            y: card_area.y + card_area.height + 1,
            width: card_area.width,
            height: 1,
        }
        .intersection(area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            error_area,
        );
    }
}

/// One bullet per character, capped so long tokens fit the box.
fn mask(token: &str) -> String {
    "•".repeat(token.chars().count().min(40))
}
