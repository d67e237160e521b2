//! Display rows built from backend DTOs.
use std::collections::BTreeSet;

use api_types::{group::GroupDto, order::OrderDto, present::Present, user::UserDto};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{lookup::GiftLookup, status::OrderStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: i64,
    pub gift_id: i64,
    pub gift_name: String,
    pub customer: String,
    pub ordered_at: String,
    pub status: OrderStatus,
}

impl OrderRow {
    pub fn from_dto(order: OrderDto, gifts: &GiftLookup) -> Self {
        Self {
            id: order.id,
            gift_id: order.present_id,
            gift_name: gifts.name_for(order.present_id),
            customer: order.customer_name,
            ordered_at: format_order_date(&order.order_date),
            status: OrderStatus::from_code_lossy(&order.status),
        }
    }

    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftRow {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub photos: Vec<i64>,
}

impl From<Present> for GiftRow {
    fn from(present: Present) -> Self {
        Self {
            id: present.id,
            name: present.name,
            price: present.price,
            stock: present.stock,
            photos: present.photos,
        }
    }
}

impl GiftRow {
    pub fn price_label(&self) -> String {
        format!("{}€", self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub group: String,
}

impl From<UserDto> for UserRow {
    fn from(user: UserDto) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email.unwrap_or_else(|| "-".to_string()),
            role: user.role.unwrap_or_else(|| "-".to_string()),
            group: user
                .group_id
                .map(|id| format!("#{id}"))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub members: usize,
}

impl From<GroupDto> for GroupRow {
    fn from(group: GroupDto) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description.unwrap_or_default(),
            members: group.user_ids.len(),
        }
    }
}

/// Formats a backend timestamp as `dd/mm/yyyy HH:MM`; unparseable values
/// are shown as sent.
pub fn format_order_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%d/%m/%Y %H:%M").to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}

/// Distinct gift names, sorted. The gift list uses the name as its
/// category key.
pub fn gift_categories<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(present_id: i64, status: &str) -> OrderDto {
        OrderDto {
            id: 1,
            present_id,
            customer_name: "Anna Rossi".to_string(),
            order_date: "2024-05-01T10:30:00".to_string(),
            status: status.to_string(),
        }
    }

    fn present(id: i64, name: &str) -> Present {
        Present {
            id,
            name: name.to_string(),
            price: 25,
            stock: 4,
            photos: vec![1, 2],
        }
    }

    #[test]
    fn known_gift_name_is_used() {
        let lookup = GiftLookup::new(&[present(3, "Cesto natalizio")]);
        let row = OrderRow::from_dto(order(3, "CONFIRMED"), &lookup);
        assert_eq!(row.gift_name, "Cesto natalizio");
        assert_eq!(row.status, OrderStatus::Confirmed);
        assert_eq!(row.status_label(), "Confermato");
        assert_eq!(row.ordered_at, "01/05/2024 10:30");
    }

    #[test]
    fn unknown_gift_and_status_fall_back() {
        let row = OrderRow::from_dto(order(99, "LOST"), &GiftLookup::default());
        assert!(row.gift_name.contains("99"));
        assert_eq!(row.status, OrderStatus::Pending);
    }

    #[test]
    fn order_dates_accept_common_shapes() {
        assert_eq!(format_order_date("2024-05-01T10:30:00Z"), "01/05/2024 10:30");
        assert_eq!(
            format_order_date("2024-05-01T10:30:00.123456"),
            "01/05/2024 10:30"
        );
        assert_eq!(format_order_date("2024-05-01"), "01/05/2024");
        assert_eq!(format_order_date("ieri"), "ieri");
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let gifts = [
            present(1, "Tazza"),
            present(2, "Cesto"),
            present(3, "Tazza"),
            present(4, " "),
        ];
        let categories = gift_categories(gifts.iter().map(|g| g.name.as_str()));
        assert_eq!(categories, vec!["Cesto".to_string(), "Tazza".to_string()]);
    }

    #[test]
    fn user_row_fills_missing_fields() {
        let row = UserRow::from(UserDto {
            id: 4,
            username: "mario".to_string(),
            email: None,
            role: Some("ADMIN".to_string()),
            group_id: Some(2),
        });
        assert_eq!(row.email, "-");
        assert_eq!(row.group, "#2");
    }
}
