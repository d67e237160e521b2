//! Pagination bookkeeping shared by every list view.
//!
//! A view owns a [`ListView`]. Each fetch is started with [`ListView::begin`],
//! which bumps the view generation and hands out a [`Ticket`]. Responses are
//! applied with [`ListView::apply`]; a response whose ticket is older than
//! the latest one is dropped, so a slow reply for page 2 can never overwrite
//! the page 3 the user asked for afterwards.
use api_types::page::Page;

use crate::error::ClientError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageQuery {
    Page { index: u32, size: u32 },
    All,
}

/// A fetched slice of a collection, normalized for both fetch modes.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl<T> Listing<T> {
    /// Unpaged fetch: a single implied page holding everything.
    pub fn from_all(items: Vec<T>) -> Self {
        let total_elements = items.len() as u64;
        Self {
            items,
            total_pages: 1,
            total_elements,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_elements: self.total_elements,
        }
    }
}

impl<T> From<Page<T>> for Listing<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.content,
            total_pages: page.total_pages,
            total_elements: page.total_elements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub index: u32,
    pub size: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub show_all: bool,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(size: u32) -> Self {
        Self {
            index: 0,
            size: size.max(1),
            total_pages: 0,
            total_elements: 0,
            show_all: false,
        }
    }

    pub fn query(&self) -> PageQuery {
        if self.show_all {
            PageQuery::All
        } else {
            PageQuery::Page {
                index: self.index,
                size: self.size,
            }
        }
    }

    /// Moves to the next page; returns `false` when there is nothing to load.
    pub fn next_page(&mut self) -> bool {
        if self.show_all || self.index + 1 >= self.total_pages {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.show_all || self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Switches between paged and unpaged mode. Either way the view restarts
    /// from the first page.
    pub fn toggle_show_all(&mut self) {
        self.show_all = !self.show_all;
        self.index = 0;
    }

    /// Takes the totals of a fetch. Returns `true` when the current index no
    /// longer exists and was moved to the last page.
    fn absorb<T>(&mut self, listing: &Listing<T>) -> bool {
        self.total_elements = listing.total_elements;
        self.total_pages = if self.show_all { 1 } else { listing.total_pages };

        let last = self.total_pages.saturating_sub(1);
        if !self.show_all && self.index > last {
            self.index = last;
            return true;
        }
        false
    }

    /// Human readable position, e.g. `2/5 (43)` or `tutti (43)`.
    pub fn describe(&self) -> String {
        if self.show_all {
            format!("tutti ({})", self.total_elements)
        } else {
            format!(
                "{}/{} ({})",
                self.index + 1,
                self.total_pages.max(1),
                self.total_elements
            )
        }
    }
}

/// Identifies one fetch of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub query: PageQuery,
}

#[derive(Debug)]
pub enum Applied {
    Updated,
    /// The page shrank under the current index; the pager now points at the
    /// last page, which has to be fetched.
    PageMoved,
    /// A newer fetch was started after this one; the response was ignored.
    Stale,
    /// The fetch failed; prior items are still in place.
    Failed(ClientError),
}

#[derive(Debug)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub pager: Pager,
    pub selected: usize,
    pub error: Option<String>,
    pub loading: bool,
    generation: u64,
    /// Generation at the last [`ListView::reset`]; older tickets belong to a
    /// previous session.
    reset_at: u64,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<T> ListView<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            pager: Pager::new(page_size),
            selected: 0,
            error: None,
            loading: false,
            generation: 0,
            reset_at: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.loading = true;
        Ticket {
            generation: self.generation,
            query: self.pager.query(),
        }
    }

    /// Applies the response of `ticket`.
    ///
    /// A 401 is reported even when the ticket is superseded: the credential
    /// is rejected regardless of which page asked. Tickets issued before the
    /// last [`reset`](Self::reset) stay stale in every case.
    pub fn apply(&mut self, ticket: Ticket, result: Result<Listing<T>, ClientError>) -> Applied {
        if ticket.generation != self.generation {
            if ticket.generation > self.reset_at
                && matches!(result, Err(ClientError::Unauthorized))
            {
                tracing::debug!(ticket = ticket.generation, "superseded fetch got 401");
                return Applied::Failed(ClientError::Unauthorized);
            }
            tracing::debug!(
                ticket = ticket.generation,
                latest = self.generation,
                "dropping stale response"
            );
            return Applied::Stale;
        }
        self.loading = false;

        match result {
            Ok(listing) => {
                let moved = self.pager.absorb(&listing);
                self.items = listing.items;
                self.error = None;
                self.selected = self.selected.min(self.items.len().saturating_sub(1));
                if moved {
                    Applied::PageMoved
                } else {
                    Applied::Updated
                }
            }
            Err(err) => Applied::Failed(err),
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
    }

    /// Forgets loaded data, e.g. after logout.
    pub fn reset(&mut self) {
        self.items.clear();
        self.selected = 0;
        self.error = None;
        self.loading = false;
        self.pager = Pager::new(self.pager.size);
        // Outstanding tickets become stale.
        self.generation += 1;
        self.reset_at = self.generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(items: Vec<u32>, total_pages: u32, total_elements: u64) -> Listing<u32> {
        Listing {
            items,
            total_pages,
            total_elements,
        }
    }

    #[test]
    fn show_all_listing_has_a_single_page() {
        let listing = Listing::from_all(vec![1, 2, 3]);
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.total_elements, 3);
    }

    #[test]
    fn toggling_show_all_on_then_off_requests_page_zero() {
        let mut pager = Pager::new(10);
        pager.total_pages = 5;
        assert!(pager.next_page());
        assert!(pager.next_page());
        assert_eq!(pager.index, 2);

        pager.toggle_show_all();
        assert_eq!(pager.query(), PageQuery::All);
        pager.toggle_show_all();
        assert_eq!(pager.index, 0);
        assert_eq!(pager.query(), PageQuery::Page { index: 0, size: 10 });
    }

    #[test]
    fn paging_stops_at_the_edges() {
        let mut pager = Pager::new(10);
        pager.total_pages = 2;
        assert!(!pager.prev_page());
        assert!(pager.next_page());
        assert!(!pager.next_page());
        assert_eq!(pager.index, 1);

        pager.toggle_show_all();
        assert!(!pager.next_page());
        assert!(!pager.prev_page());
    }

    #[test]
    fn apply_updates_items_and_totals() {
        let mut view = ListView::new(2);
        let ticket = view.begin();
        assert!(view.loading);

        let applied = view.apply(ticket, Ok(page_of(vec![1, 2], 3, 5)));
        assert!(matches!(applied, Applied::Updated));
        assert_eq!(view.items, vec![1, 2]);
        assert_eq!(view.pager.total_pages, 3);
        assert_eq!(view.pager.total_elements, 5);
        assert!(!view.loading);
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_state() {
        let mut view = ListView::new(2);
        let first = view.begin();
        let second = view.begin();

        assert!(matches!(
            view.apply(second, Ok(page_of(vec![3, 4], 3, 6))),
            Applied::Updated
        ));
        assert!(matches!(
            view.apply(first, Ok(page_of(vec![1, 2], 3, 6))),
            Applied::Stale
        ));
        assert_eq!(view.items, vec![3, 4]);
    }

    #[test]
    fn failure_keeps_previous_items() {
        let mut view = ListView::new(2);
        let ticket = view.begin();
        view.apply(ticket, Ok(page_of(vec![1, 2], 1, 2)));

        let ticket = view.begin();
        let applied = view.apply(
            ticket,
            Err(ClientError::Http {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                message: "boom".to_string(),
            }),
        );
        assert!(matches!(applied, Applied::Failed(_)));
        assert_eq!(view.items, vec![1, 2]);
        assert!(!view.loading);
    }

    #[test]
    fn show_all_forces_one_page_in_pager() {
        let mut view = ListView::new(2);
        view.pager.toggle_show_all();
        let ticket = view.begin();
        assert_eq!(ticket.query, PageQuery::All);
        view.apply(ticket, Ok(Listing::from_all(vec![1, 2, 3, 4, 5])));
        assert_eq!(view.pager.total_pages, 1);
        assert_eq!(view.pager.describe(), "tutti (5)");
    }

    #[test]
    fn selection_is_clamped_after_shorter_page() {
        let mut view = ListView::new(3);
        let ticket = view.begin();
        view.apply(ticket, Ok(page_of(vec![1, 2, 3], 2, 4)));
        view.select_next();
        view.select_next();
        assert_eq!(view.selected, 2);

        let ticket = view.begin();
        view.apply(ticket, Ok(page_of(vec![4], 2, 4)));
        assert_eq!(view.selected, 0);
        assert_eq!(view.selected_item(), Some(&4));
    }

    #[test]
    fn reset_invalidates_outstanding_tickets() {
        let mut view: ListView<u32> = ListView::new(2);
        let ticket = view.begin();
        view.reset();
        assert!(matches!(
            view.apply(ticket, Ok(page_of(vec![1], 1, 1))),
            Applied::Stale
        ));
        assert!(view.items.is_empty());
    }

    #[test]
    fn superseded_unauthorized_is_still_reported() {
        let mut view: ListView<u32> = ListView::new(2);
        let old = view.begin();
        let latest = view.begin();

        assert!(matches!(
            view.apply(old, Err(ClientError::Unauthorized)),
            Applied::Failed(ClientError::Unauthorized)
        ));
        // The newer fetch is still pending.
        assert!(view.loading);
        assert_eq!(view.generation(), latest.generation);
    }

    #[test]
    fn unauthorized_from_before_reset_is_stale() {
        let mut view: ListView<u32> = ListView::new(2);
        let ticket = view.begin();
        view.reset();
        assert!(matches!(
            view.apply(ticket, Err(ClientError::Unauthorized)),
            Applied::Stale
        ));
    }

    #[test]
    fn shrinking_collection_moves_index_to_last_page() {
        let mut view = ListView::new(2);
        view.pager.total_pages = 3;
        view.pager.next_page();
        view.pager.next_page();
        assert_eq!(view.pager.index, 2);

        let ticket = view.begin();
        let applied = view.apply(ticket, Ok(page_of(vec![], 2, 4)));
        assert!(matches!(applied, Applied::PageMoved));
        assert_eq!(view.pager.index, 1);
        assert_eq!(view.pager.describe(), "2/2 (4)");
        assert_eq!(view.pager.query(), PageQuery::Page { index: 1, size: 2 });
        assert!(!view.pager.next_page());
    }

    #[test]
    fn empty_collection_goes_back_to_page_zero() {
        let mut view: ListView<u32> = ListView::new(2);
        view.pager.total_pages = 2;
        view.pager.next_page();

        let ticket = view.begin();
        assert!(matches!(
            view.apply(ticket, Ok(page_of(vec![], 0, 0))),
            Applied::PageMoved
        ));
        assert_eq!(view.pager.index, 0);
    }
}
