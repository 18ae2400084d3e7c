use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Row, Table, TableState},
};

use backoffice::{
    FieldDescriptor, FieldKind, Mode, ResourceController, schema::FieldCheck,
};

use crate::{
    app::ResourceView,
    ui::{TableRow, screens::centered_box, theme::Theme},
};

/// Renders one resource tab in whatever mode its controller is in.
pub fn render<R: TableRow>(frame: &mut Frame<'_>, area: Rect, view: &ResourceView<R>, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    render_filter_line(frame, layout[0], view, theme);

    match view.controller.mode() {
        Mode::Viewing(record) => render_detail(frame, layout[1], &view.controller, record, theme),
        Mode::Editing { submitting, .. } | Mode::Creating { submitting, .. } => {
            render_form(frame, layout[1], view, *submitting, theme)
        }
        Mode::ConfirmDelete { id, deleting } => {
            render_table(frame, layout[1], view, theme);
            let name = view
                .controller
                .store()
                .get(*id)
                .map(|record| record.name().to_string())
                .unwrap_or_else(|| format!("#{id}"));
            render_confirm(frame, layout[1], &name, *deleting, theme);
        }
        Mode::Loading | Mode::Ready => render_table(frame, layout[1], view, theme),
    }
}

fn render_filter_line<R: TableRow>(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &ResourceView<R>,
    theme: &Theme,
) {
    let store = view.controller.store();
    let muted = Style::default().fg(theme.text_muted);
    let branch = view.branch_label().unwrap_or("All");

    let mut spans = vec![
        Span::styled(" Branch", muted),
        Span::raw(format!(": {branch}  ")),
        Span::styled("Search", muted),
    ];
    match &view.search_input {
        Some(input) => spans.push(Span::styled(
            format!(": {input}│  "),
            Style::default().fg(theme.accent),
        )),
        None => {
            let term = &view.controller.filter().search;
            let shown = if term.is_empty() { "-" } else { term.as_str() };
            spans.push(Span::raw(format!(": {shown}  ")));
        }
    }
    spans.push(Span::styled(
        format!("{} of {}", store.view_len(), store.collection().len()),
        muted,
    ));
    if matches!(view.controller.mode(), Mode::Loading) || view.controller.is_selecting() {
        spans.push(Span::styled("  loading…", Style::default().fg(theme.warning)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table<R: TableRow>(frame: &mut Frame<'_>, area: Rect, view: &ResourceView<R>, theme: &Theme) {
    let title = format!(" {} ", R::schema().title);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let store = view.controller.store();
    if store.view_len() == 0 {
        let message = if matches!(view.controller.mode(), Mode::Loading) {
            "Loading…"
        } else if store.collection().is_empty() {
            "No records."
        } else {
            "No records match the filter."
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(theme.text_muted)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(R::HEADERS.iter().copied())
        .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD));
    let rows = store
        .view()
        .map(|record| Row::new(record.cells()).style(Style::default().fg(theme.text)));
    let table = Table::new(rows, R::WIDTHS.iter().copied())
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("› ");

    let mut state = TableState::default().with_selected(Some(view.cursor));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Form/detail text for one field; reference ids become display names.
fn display_value<R: TableRow>(
    controller: &ResourceController<R>,
    field: &FieldDescriptor,
    value: &str,
) -> String {
    match field.kind {
        FieldKind::Reference(kind) if !value.is_empty() => controller
            .options(kind)
            .iter()
            .find(|option| option.id.to_string() == value)
            .map(|option| option.display_name.clone())
            .unwrap_or_else(|| format!("#{value}")),
        _ => value.to_string(),
    }
}

fn render_detail<R: TableRow>(
    frame: &mut Frame<'_>,
    area: Rect,
    controller: &ResourceController<R>,
    record: &R,
    theme: &Theme,
) {
    let block = Block::default()
        .title(format!(" {} #{} ", R::schema().title, record.id()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let lines: Vec<Line<'_>> = R::schema()
        .fields
        .iter()
        .map(|field| {
            let value = record.field_value(field.name).unwrap_or_default();
            Line::from(vec![
                Span::styled(
                    format!("{:<14}", field.label),
                    Style::default().fg(theme.text_muted),
                ),
                Span::raw(display_value(controller, field, &value)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form<R: TableRow>(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &ResourceView<R>,
    submitting: bool,
    theme: &Theme,
) {
    let Some(draft) = view.controller.draft() else {
        return;
    };
    let title = match draft.record_id() {
        Some(id) => format!(" Edit {} #{id} ", R::schema().title),
        None => format!(" New {} ", R::schema().title),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let mut lines: Vec<Line<'_>> = draft
        .fields()
        .enumerate()
        .map(|(idx, (field, value))| {
            let focused = idx == view.focus;
            let label = if field.required {
                format!("{}*", field.label)
            } else {
                field.label.to_string()
            };
            let label_style = match field.check(value) {
                FieldCheck::Ok => Style::default().fg(theme.text_muted),
                _ => Style::default().fg(theme.error),
            };

            let mut shown = display_value(&view.controller, field, value);
            let choosable = matches!(field.kind, FieldKind::Enum(_) | FieldKind::Reference(_));
            if focused {
                shown = if choosable {
                    format!("‹ {shown} ›")
                } else {
                    format!("{shown}│")
                };
            }
            let value_style = if focused {
                Style::default().fg(theme.accent)
            } else {
                Style::default().fg(theme.text)
            };

            Line::from(vec![
                Span::styled(format!("{label:<15}"), label_style),
                Span::styled(shown, value_style),
            ])
        })
        .collect();

    if submitting {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Saving…", Style::default().fg(theme.warning)));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm(frame: &mut Frame<'_>, area: Rect, name: &str, deleting: bool, theme: &Theme) {
    let rect = centered_box(44.min(area.width), 5, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(" delete ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.error));
    let body = if deleting {
        Line::styled("Deleting…", Style::default().fg(theme.warning))
    } else {
        Line::from(vec![
            Span::raw(format!("Delete \"{name}\"? ")),
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::raw("/"),
            Span::styled("n", Style::default().fg(theme.accent)),
        ])
    };

    frame.render_widget(
        Paragraph::new(body).alignment(Alignment::Center).block(block),
        rect,
    );
}
