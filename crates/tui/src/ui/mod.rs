pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Screen, Section};

use components::hints::{KeyHint, hint_separator, hints_to_spans};
pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Home => render_shell(frame, area, state),
    }
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.section, &theme);

    let content = layout[2];
    match state.section {
        Section::Orders => screens::orders::render(frame, content, state),
        Section::Gifts => screens::gifts::render(frame, content, state),
        Section::Users => screens::users::render(frame, content, state),
        Section::Groups => screens::groups::render(frame, content, state),
    }

    render_bottom_bar(frame, layout[3], state, &theme);

    if let Some(form) = &state.gift_form {
        screens::gift_form::render(frame, content, form);
    }
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let status = if state.is_loading(state.section) {
        Span::styled("caricamento…", Style::default().fg(theme.warning))
    } else {
        Span::styled("pronto", Style::default().fg(theme.positive))
    };

    let line = Line::from(vec![
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Utente", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.user_label)),
        Span::styled("Sezione", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.section.label())),
        status,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    let context = context_hints(state);
    if !context.is_empty() {
        parts.push(hint_separator(theme));
        parts.extend(hints_to_spans(&context, theme));
    }

    parts.push(hint_separator(theme));
    parts.extend(hints_to_spans(
        &[KeyHint::new("L", "logout"), KeyHint::new("q", "esci")],
        theme,
    ));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn context_hints(state: &AppState) -> Vec<KeyHint> {
    if state.gift_form.is_some() {
        return components::hints::common::form_editing();
    }

    let mut hints = components::hints::common::list_navigation();
    match state.section {
        Section::Orders => hints.extend(components::hints::common::order_actions()),
        Section::Gifts => hints.extend(components::hints::common::gift_actions()),
        Section::Users | Section::Groups => {}
    }
    hints
}
