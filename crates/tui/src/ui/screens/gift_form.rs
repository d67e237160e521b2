use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use engine::validation::{ALLOWED_IMAGE_TYPES, MAX_IMAGES};

use crate::{
    app::{FormField, GiftFormState},
    ui::{screens::login::centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, form: &GiftFormState) {
    let theme = Theme::default();
    let card_area = centered_box(area.width.min(64), 14, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(form.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent));
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    // Two rows per field (value, error) plus the status line.
    let mut constraints = vec![Constraint::Length(1); FormField::ALL.len() * 2];
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    for (i, field) in FormField::ALL.into_iter().enumerate() {
        let focused = form.focus == field;
        let cursor = if focused { "│" } else { "" };
        let value_style = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("{:<15}", field.label()),
                    Style::default().fg(theme.text_muted),
                ),
                Span::styled(format!("{}{cursor}", form.value(field)), value_style),
            ])),
            rows[i * 2],
        );

        let note = match form.error(field) {
            Some(err) => Span::styled(format!("{:<15}{err}", ""), Style::default().fg(theme.error)),
            None if field == FormField::Images => Span::styled(
                format!("{:<15}{}", "", images_hint(form)),
                Style::default().fg(theme.text_muted),
            ),
            None => Span::raw(""),
        };
        frame.render_widget(Paragraph::new(note), rows[i * 2 + 1]);
    }

    let status = if form.saving {
        Span::styled("Salvataggio in corso…", Style::default().fg(theme.text_muted))
    } else if let Some(message) = &form.message {
        Span::styled(message.as_str(), Style::default().fg(theme.error))
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(status), rows[FormField::ALL.len() * 2 + 1]);
}

fn images_hint(form: &GiftFormState) -> String {
    let kinds = ALLOWED_IMAGE_TYPES
        .iter()
        .filter_map(|mime| mime.strip_prefix("image/"))
        .collect::<Vec<_>>()
        .join("/");
    if form.existing_photos > 0 {
        format!(
            "percorsi separati da virgola, {kinds}, {} già presenti (max {MAX_IMAGES})",
            form.existing_photos
        )
    } else {
        format!("percorsi separati da virgola, {kinds}, max {MAX_IMAGES}")
    }
}
