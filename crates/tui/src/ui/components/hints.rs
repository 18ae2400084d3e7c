use ratatui::{style::Style, text::Span};

use crate::{app::Phase, ui::theme::Theme};

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

/// Keys that do something in `phase`.
pub fn for_phase(phase: Phase) -> Vec<KeyHint> {
    match phase {
        Phase::List => vec![
            KeyHint::new("↑↓", "select"),
            KeyHint::new("Enter", "view"),
            KeyHint::new("e", "edit"),
            KeyHint::new("c", "create"),
            KeyHint::new("d", "delete"),
            KeyHint::new("/", "search"),
            KeyHint::new("b", "branch"),
            KeyHint::new("r", "refresh"),
        ],
        Phase::Search => vec![
            KeyHint::new("Enter", "apply"),
            KeyHint::new("Esc", "clear"),
        ],
        Phase::Detail => vec![KeyHint::new("e", "edit"), KeyHint::new("Esc", "back")],
        Phase::Form => vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("←→", "choose"),
            KeyHint::new("Enter", "save"),
            KeyHint::new("Esc", "cancel"),
        ],
        Phase::Confirm => vec![KeyHint::new("y", "delete"), KeyHint::new("n", "keep")],
    }
}
