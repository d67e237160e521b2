use ratatui::{Frame, layout::Rect, text::Line, widgets::ListItem};

use crate::{
    app::AppState,
    ui::{
        components::list_panel::{self, Panel},
        screens::fit,
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let view = &state.users;

    let items = view
        .items
        .iter()
        .map(|user| {
            ListItem::new(Line::from(format!(
                "{:<6} {:<20} {:<28} {:<10} {}",
                format!("#{}", user.id),
                fit(&user.username, 20),
                fit(&user.email, 28),
                fit(&user.role, 10),
                user.group,
            )))
        })
        .collect();

    let panel = Panel {
        title: " utenti ".to_string(),
        header: format!(
            "{:<6} {:<20} {:<28} {:<10} {}",
            "ID", "Username", "Email", "Ruolo", "Gruppo"
        ),
        items,
        selected: view.selected,
        loading: view.loading,
        error: view.error.as_deref(),
        pager: &view.pager,
        empty: "Nessun utente.",
    };
    list_panel::render(frame, area, panel, &theme);
}
