//! Per-view load state and stale-response protection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::FetchError;

/// What a view currently has to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Empty,
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            ViewState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T> ViewState<Vec<T>> {
    /// A successful but empty collection is `Empty`, never `Loaded(vec![])`.
    pub fn from_collection(result: Result<Vec<T>, FetchError>) -> Self {
        match result {
            Ok(items) if items.is_empty() => ViewState::Empty,
            Ok(items) => ViewState::Loaded(items),
            Err(err) => ViewState::Failed(err.to_string()),
        }
    }
}

impl<T> From<Result<T, FetchError>> for ViewState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => ViewState::Loaded(value),
            Err(err) => ViewState::Failed(err.to_string()),
        }
    }
}

/// Identifies one issued request. Only the newest ticket may update a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Hands out request tickets in issue order.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every earlier one.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// A view's state plus the tracker guarding it.
#[derive(Debug)]
pub struct ViewSlot<T> {
    tracker: RequestTracker,
    state: ViewState<T>,
    in_flight: Option<Ticket>,
}

impl<T> Default for ViewSlot<T> {
    fn default() -> Self {
        Self {
            tracker: RequestTracker::new(),
            state: ViewState::Loading,
            in_flight: None,
        }
    }
}

impl<T> ViewSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request for a different subject; the view goes back to
    /// `Loading` and any outstanding response becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.state = ViewState::Loading;
        let ticket = self.tracker.begin();
        self.in_flight = Some(ticket);
        ticket
    }

    /// Starts a refetch of the same subject, keeping what is shown.
    ///
    /// Returns `None` while the current request is still outstanding, so a
    /// backend slower than the refresh interval still gets its answer applied.
    pub fn refresh(&mut self) -> Option<Ticket> {
        if self.is_pending() {
            return None;
        }
        let ticket = self.tracker.begin();
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Whether the newest issued request has not been answered yet.
    pub fn is_pending(&self) -> bool {
        self.in_flight
            .is_some_and(|ticket| self.tracker.is_current(ticket))
    }

    /// Applies a response. Returns false, leaving the view untouched, when a
    /// newer request has been issued since `ticket`.
    pub fn apply(&mut self, ticket: Ticket, state: ViewState<T>) -> bool {
        if !self.tracker.is_current(ticket) {
            return false;
        }
        self.state = state;
        self.in_flight = None;
        true
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn tracker(&self) -> RequestTracker {
        self.tracker.clone()
    }
}
