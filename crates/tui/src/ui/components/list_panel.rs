use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
};

use engine::Pager;

use crate::ui::theme::Theme;

/// Everything a paginated list screen shows besides its rows.
pub struct Panel<'a> {
    pub title: String,
    pub header: String,
    pub items: Vec<ListItem<'a>>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub pager: &'a Pager,
    pub empty: &'a str,
}

pub fn render(frame: &mut Frame<'_>, area: Rect, panel: Panel<'_>, theme: &Theme) {
    let banner_height = if panel.error.is_some() { 1 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    if let Some(error) = panel.error {
        let banner = Line::from(vec![
            Span::styled(format!(" {error}"), Style::default().fg(theme.error)),
            Span::styled("  (Esc per chiudere)", Style::default().fg(theme.text_muted)),
        ]);
        frame.render_widget(Paragraph::new(banner), layout[0]);
    }

    let block = Block::default()
        .title(panel.title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    if panel.items.is_empty() {
        let text = if panel.loading {
            "Caricamento…"
        } else {
            panel.empty
        };
        frame.render_widget(
            Paragraph::new(Line::from(text))
                .style(Style::default().fg(theme.text_muted))
                .alignment(Alignment::Center)
                .block(block),
            layout[1],
        );
    } else {
        let inner = block.inner(layout[1]);
        frame.render_widget(block, layout[1]);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("  {}", panel.header),
                Style::default()
                    .fg(theme.text_muted)
                    .add_modifier(Modifier::BOLD),
            )),
            rows[0],
        );

        let mut list_state = ListState::default();
        list_state.select(Some(panel.selected.min(panel.items.len() - 1)));
        let list = List::new(panel.items)
            .highlight_style(
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("» ");
        frame.render_stateful_widget(list, rows[1], &mut list_state);
    }

    let footer = if panel.loading {
        format!(" pagina {}  caricamento…", panel.pager.describe())
    } else {
        format!(" pagina {}", panel.pager.describe())
    };
    frame.render_widget(
        Paragraph::new(Span::styled(footer, Style::default().fg(theme.text_muted))),
        layout[2],
    );
}
