use std::collections::HashMap;

use api_types::present::Present;

/// Gift id → gift name, built from the full gift collection.
#[derive(Debug, Default, Clone)]
pub struct GiftLookup {
    names: HashMap<i64, String>,
}

impl GiftLookup {
    pub fn new(presents: &[Present]) -> Self {
        Self {
            names: presents
                .iter()
                .map(|present| (present.id, present.name.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Gift name, or a placeholder carrying the raw id when the gift is
    /// unknown (deleted, or outside the fetched collection).
    pub fn name_for(&self, id: i64) -> String {
        match self.get(id) {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => placeholder(id),
        }
    }
}

pub fn placeholder(id: i64) -> String {
    format!("Regalo #{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(id: i64, name: &str) -> Present {
        Present {
            id,
            name: name.to_string(),
            price: 10,
            stock: 1,
            photos: Vec::new(),
        }
    }

    #[test]
    fn known_id_resolves_to_name() {
        let lookup = GiftLookup::new(&[present(1, "Tazza"), present(2, "Sciarpa")]);
        assert_eq!(lookup.name_for(2), "Sciarpa");
        assert_eq!(lookup.len(), 2);
    }

    #[test]
    fn missing_id_yields_placeholder_with_id() {
        let lookup = GiftLookup::new(&[present(1, "Tazza")]);
        let name = lookup.name_for(42);
        assert!(!name.is_empty());
        assert!(name.contains("42"));
        assert!(GiftLookup::default().name_for(7).contains('7'));
    }

    #[test]
    fn blank_name_falls_back_to_placeholder() {
        let lookup = GiftLookup::new(&[present(5, "  ")]);
        assert_eq!(lookup.name_for(5), placeholder(5));
    }
}
