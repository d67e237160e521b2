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
    let gifts = &state.gifts;

    let items = gifts
        .visible()
        .into_iter()
        .map(|gift| {
            let marker = if gifts.pending_delete == Some(gift.id) {
                "  da eliminare?"
            } else {
                ""
            };
            ListItem::new(Line::from(format!(
                "{:<6} {:<28} {:>10} {:>8} {:>5}{marker}",
                format!("#{}", gift.id),
                fit(&gift.name, 28),
                gift.price_label(),
                gift.stock,
                gift.photos.len(),
            )))
        })
        .collect();

    let title = match &gifts.category {
        Some(category) => format!(" regali: {category} "),
        None => " regali ".to_string(),
    };

    let panel = Panel {
        title,
        header: format!(
            "{:<6} {:<28} {:>10} {:>8} {:>5}",
            "ID", "Nome", "Prezzo", "Disp.", "Foto"
        ),
        items,
        selected: gifts.list.selected,
        loading: gifts.list.loading,
        error: gifts.list.error.as_deref(),
        pager: &gifts.list.pager,
        empty: "Nessun regalo.",
    };
    list_panel::render(frame, area, panel, &theme);
}
