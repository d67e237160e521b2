use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: String,
    pub action: String,
}

impl KeyHint {
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            hint.key.clone(),
            Style::default().fg(theme.accent),
        ));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

/// Hint groups shared by the screens.
pub mod common {
    use super::KeyHint;

    pub fn list_navigation() -> Vec<KeyHint> {
        vec![
            KeyHint::new("↑↓", "seleziona"),
            KeyHint::new("←→", "pagina"),
            KeyHint::new("a", "tutti"),
            KeyHint::new("r", "aggiorna"),
        ]
    }

    pub fn order_actions() -> Vec<KeyHint> {
        vec![
            KeyHint::new("c", "conferma"),
            KeyHint::new("d", "consegna"),
            KeyHint::new("x", "annulla"),
        ]
    }

    pub fn gift_actions() -> Vec<KeyHint> {
        vec![
            KeyHint::new("+", "nuovo"),
            KeyHint::new("e", "modifica"),
            KeyHint::new("D", "elimina"),
            KeyHint::new("f", "filtro"),
        ]
    }

    pub fn form_editing() -> Vec<KeyHint> {
        vec![
            KeyHint::new("Tab", "campo"),
            KeyHint::new("Enter", "salva"),
            KeyHint::new("Esc", "annulla"),
        ]
    }
}
