pub mod gift_form;
pub mod gifts;
pub mod groups;
pub mod login;
pub mod orders;
pub mod users;

/// Cuts `value` to `width` characters, marking the cut with an ellipsis.
pub(crate) fn fit(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::fit;

    #[test]
    fn fit_truncates_on_char_boundaries() {
        assert_eq!(fit("Tazza", 10), "Tazza");
        assert_eq!(fit("Disponibilità", 6), "Dispo…");
        assert_eq!(fit("àèìòù", 3), "àè…");
    }
}
