//! Order lifecycle.
//!
//! ```text
//! Pending ──confirm──▶ Confirmed ──deliver──▶ Delivered
//!    │                     │
//!    └──────cancel─────────┴──────────────▶ Cancelled
//! ```
//!
//! Delivered and Cancelled are terminal.
use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderAction {
    Confirm,
    Deliver,
    Cancel,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("transizione non consentita: {from} → {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Backend status code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Like [`from_code`](Self::from_code) but never fails: unknown codes
    /// are shown as pending.
    pub fn from_code_lossy(code: &str) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            tracing::warn!(code, "unknown order status from backend, showing as pending");
            Self::Pending
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "In attesa",
            Self::Confirmed => "Confermato",
            Self::Delivered => "Consegnato",
            Self::Cancelled => "Annullato",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Delivered)
                | (Self::Pending | Self::Confirmed, Self::Cancelled)
        )
    }

    pub fn available_actions(self) -> Vec<OrderAction> {
        OrderAction::ALL
            .into_iter()
            .filter(|action| self.can_transition_to(action.target()))
            .collect()
    }

    pub fn apply(self, action: OrderAction) -> Result<OrderStatus, TransitionError> {
        let to = action.target();
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl OrderAction {
    pub const ALL: [OrderAction; 3] = [Self::Confirm, Self::Deliver, Self::Cancel];

    pub fn target(self) -> OrderStatus {
        match self {
            Self::Confirm => OrderStatus::Confirmed,
            Self::Deliver => OrderStatus::Delivered,
            Self::Cancel => OrderStatus::Cancelled,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Confirm => "Conferma",
            Self::Deliver => "Consegna",
            Self::Cancel => "Annulla",
        }
    }

    /// Parses the command-line spelling (`confirm`, `deliver`, `cancel`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "confirm" => Some(Self::Confirm),
            "deliver" => Some(Self::Deliver),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}
