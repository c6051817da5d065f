//! Page and terminal rendering for the listing and detail views.
//!
//! `listing` and `detail` turn fetched models into serializable page views;
//! `templates` turns those into HTML; `terminal` prints the same views for
//! the CLI tools.

pub mod detail;
pub mod listing;
pub mod templates;
pub mod terminal;

pub use self::detail::DetailPage;
pub use self::listing::ListingPage;

/// Name of a view state as used by the templates.
pub(crate) fn status_name<T>(state: &crate::view_state::ViewState<T>) -> &'static str {
    use crate::view_state::ViewState;

    match state {
        ViewState::Loading => "loading",
        ViewState::Loaded(_) => "loaded",
        ViewState::Empty => "empty",
        ViewState::Failed(_) => "failed",
    }
}
