use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses.
///
/// Depending on the endpoint the human readable text is either in `message`
/// or in `error`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn text(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|e| !e.trim().is_empty()))
    }
}

pub mod page {
    use super::*;

    /// Paged envelope used by every `GET <entity>?page=&size=` endpoint.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Page<T> {
        pub content: Vec<T>,
        pub total_pages: u32,
        pub total_elements: u64,
        /// Zero-based index of this page.
        #[serde(default)]
        pub number: Option<u32>,
        #[serde(default)]
        pub size: Option<u32>,
    }
}

pub mod order {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderDto {
        pub id: i64,
        pub present_id: i64,
        pub customer_name: String,
        /// ISO-8601 date-time (or date) as sent by the backend.
        pub order_date: String,
        /// Backend status code (`PENDING`, `CONFIRMED`, `DELIVERED`, `CANCELLED`).
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderStatusUpdate {
        pub status: String,
    }
}

pub mod present {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Present {
        pub id: i64,
        pub name: String,
        /// Integer currency units.
        pub price: i64,
        pub stock: i64,
        #[serde(default)]
        pub photos: Vec<i64>,
    }

    /// Request body for `POST presents` and `PUT presents/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PresentPayload {
        pub name: String,
        pub price: i64,
        pub stock: i64,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserDto {
        pub id: i64,
        pub username: String,
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub role: Option<String>,
        #[serde(default)]
        pub group_id: Option<i64>,
    }
}

pub mod group {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GroupDto {
        pub id: i64,
        pub name: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub user_ids: Vec<i64>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_reads_camel_case_envelope() {
        let raw = r#"{
            "content": [{"id": 1, "name": "Tazza", "price": 12, "stock": 3}],
            "totalPages": 4,
            "totalElements": 31,
            "number": 0
        }"#;
        let page: page::Page<present::Present> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.total_elements, 31);
        assert_eq!(page.content[0].name, "Tazza");
        assert!(page.content[0].photos.is_empty());
        assert_eq!(page.size, None);
    }

    #[test]
    fn order_reads_present_reference() {
        let raw = r#"{"id": 9, "presentId": 3, "customerName": "Anna",
            "orderDate": "2024-05-01T10:00:00", "status": "PENDING"}"#;
        let order: order::OrderDto = serde_json::from_str(raw).unwrap();
        assert_eq!(order.present_id, 3);
        assert_eq!(order.status, "PENDING");
    }

    #[test]
    fn error_text_prefers_message_then_error() {
        let both: ErrorResponse =
            serde_json::from_str(r#"{"message": "stock esaurito", "error": "Bad Request"}"#)
                .unwrap();
        assert_eq!(both.text().as_deref(), Some("stock esaurito"));

        let only_error: ErrorResponse =
            serde_json::from_str(r#"{"message": "", "error": "Conflict"}"#).unwrap();
        assert_eq!(only_error.text().as_deref(), Some("Conflict"));

        assert_eq!(ErrorResponse::default().text(), None);
    }
}
