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
    let view = &state.groups;

    let items = view
        .items
        .iter()
        .map(|group| {
            ListItem::new(Line::from(format!(
                "{:<6} {:<24} {:>7}  {}",
                format!("#{}", group.id),
                fit(&group.name, 24),
                group.members,
                fit(&group.description, 40),
            )))
        })
        .collect();

    let panel = Panel {
        title: " gruppi ".to_string(),
        header: format!(
            "{:<6} {:<24} {:>7}  {}",
            "ID", "Nome", "Membri", "Descrizione"
        ),
        items,
        selected: view.selected,
        loading: view.loading,
        error: view.error.as_deref(),
        pager: &view.pager,
        empty: "Nessun gruppo.",
    };
    list_panel::render(frame, area, panel, &theme);
}
