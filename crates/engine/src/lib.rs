//! Client-side core of the Dono admin console.
//!
//! The crate talks to the gift platform backend ([`Client`]), keeps the
//! pagination state of list views ([`ListView`]), maps DTOs to display rows
//! and validates the gift form. Front ends (terminal UI, admin CLI) own a
//! [`Session`] and pass its [`Credentials`] to every call.
pub use client::{Backend, Client};
pub use credentials::{Credentials, Session};
pub use error::ClientError;
pub use lookup::GiftLookup;
pub use paging::{Applied, DEFAULT_PAGE_SIZE, ListView, Listing, PageQuery, Pager, Ticket};
pub use reqwest::StatusCode;
pub use status::{OrderAction, OrderStatus, TransitionError};

pub mod loader;
pub mod validation;
pub mod views;

mod client;
mod credentials;
mod error;
mod lookup;
mod paging;
mod status;
