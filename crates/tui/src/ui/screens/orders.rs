use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::ListItem,
};

use engine::OrderStatus;

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
    let view = &state.orders;

    let items = view
        .items
        .iter()
        .map(|order| {
            let text = format!(
                "{:<6} {:<24} {:<20} {:<17} ",
                format!("#{}", order.id),
                fit(&order.gift_name, 24),
                fit(&order.customer, 20),
                order.ordered_at,
            );
            ListItem::new(Line::from(vec![
                Span::raw(text),
                Span::styled(
                    order.status_label(),
                    Style::default().fg(status_color(order.status, &theme)),
                ),
            ]))
        })
        .collect();

    let panel = Panel {
        title: " ordini ".to_string(),
        header: format!(
            "{:<6} {:<24} {:<20} {:<17} {}",
            "ID", "Regalo", "Cliente", "Data", "Stato"
        ),
        items,
        selected: view.selected,
        loading: view.loading,
        error: view.error.as_deref(),
        pager: &view.pager,
        empty: "Nessun ordine.",
    };
    list_panel::render(frame, area, panel, &theme);
}

fn status_color(status: OrderStatus, theme: &Theme) -> ratatui::style::Color {
    match status {
        OrderStatus::Pending => theme.warning,
        OrderStatus::Confirmed => theme.accent,
        OrderStatus::Delivered => theme.positive,
        OrderStatus::Cancelled => theme.error,
    }
}
