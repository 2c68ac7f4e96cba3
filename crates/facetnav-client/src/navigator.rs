//! Navigation sequencing.
//!
//! Every navigation is stamped with a sequence number when it starts. A
//! finished navigation is shown only if no newer one has started since, so
//! the displayed page always matches the most recently initiated URL no
//! matter in which order responses arrive.

use std::sync::atomic::{AtomicU64, Ordering};

use facetnav_query::{
    NavAction, NavigationState, PageProfile, PageWindow, QueryParams, SearchPage, SearchRequest,
};
use serde::de::DeserializeOwned;

use crate::backend::SearchBackend;
use crate::client::SearchClient;
use crate::error::FetchError;

/// Result of one navigation.
///
/// A failure replaces the whole page; stale results are never kept.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    Loaded(SearchPage<T>),
    Failed(FetchError),
}

impl<T> PageOutcome<T> {
    /// Loaded page, if any.
    pub fn page(&self) -> Option<&SearchPage<T>> {
        match self {
            PageOutcome::Loaded(page) => Some(page),
            PageOutcome::Failed(_) => None,
        }
    }

    /// Error, if the navigation failed.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            PageOutcome::Loaded(_) => None,
            PageOutcome::Failed(e) => Some(e),
        }
    }
}

impl<T> From<Result<SearchPage<T>, FetchError>> for PageOutcome<T> {
    fn from(result: Result<SearchPage<T>, FetchError>) -> Self {
        match result {
            Ok(page) => PageOutcome::Loaded(page),
            Err(e) => PageOutcome::Failed(e),
        }
    }
}

/// A navigation that has started but not yet been shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    /// Sequence number.
    pub seq: u64,
    /// Canonical URL parameters of the navigation.
    pub params: QueryParams,
    /// Selection decoded from `params`.
    pub state: NavigationState,
    /// Request sent to the backend.
    pub request: SearchRequest,
}

/// Everything needed to render a finished navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation<T> {
    /// Sequence number.
    pub seq: u64,
    /// Canonical URL parameters.
    pub params: QueryParams,
    /// Selection.
    pub state: NavigationState,
    /// Results or the page-level error.
    pub outcome: PageOutcome<T>,
    /// Page links, when results loaded.
    pub window: Option<PageWindow>,
}

/// Runs navigations for one search page.
pub struct Navigator<B: SearchBackend> {
    client: SearchClient<B>,
    profile: PageProfile,
    latest: AtomicU64,
}

impl<B: SearchBackend> Navigator<B> {
    /// Create a navigator.
    pub fn new(client: SearchClient<B>, profile: PageProfile) -> Self {
        Self {
            client,
            profile,
            latest: AtomicU64::new(0),
        }
    }

    /// Page profile.
    pub fn profile(&self) -> &PageProfile {
        &self.profile
    }

    /// Client.
    pub fn client(&self) -> &SearchClient<B> {
        &self.client
    }

    /// Sequence number of the most recently started navigation.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Start a navigation to `params`. Supersedes every earlier ticket.
    ///
    /// The parameters are canonicalized through the navigation state, so
    /// the ticket carries the URL the page should display.
    pub fn begin(&self, params: &QueryParams) -> Ticket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let state = NavigationState::from_query(params, &self.profile);
        let params = state.to_query(&self.profile);
        let request = SearchRequest::build(&params, &self.profile);
        tracing::debug!(seq, page = %self.profile.kind, url = %params, "navigation started");

        Ticket {
            seq,
            params,
            state,
            request,
        }
    }

    /// Whether `ticket` is still the latest navigation.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.seq == self.latest()
    }

    /// Fetch results for a ticket.
    pub async fn fetch<T: DeserializeOwned>(&self, ticket: &Ticket) -> PageOutcome<T> {
        self.client.search(&self.profile, &ticket.request).await.into()
    }

    /// Finish a navigation. Returns `None` when a newer one has started.
    pub fn complete<T>(&self, ticket: Ticket, outcome: PageOutcome<T>) -> Option<Navigation<T>> {
        if !self.is_current(&ticket) {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.latest(),
                "discarding response of superseded navigation"
            );
            return None;
        }

        let window = outcome.page().map(|page| {
            let total = self
                .profile
                .total_pages_known
                .then_some(page.stats.total_pages);
            facetnav_query::window(page.stats.current_page, total)
        });

        Some(Navigation {
            seq: ticket.seq,
            params: ticket.params,
            state: ticket.state,
            outcome,
            window,
        })
    }

    /// Start, fetch and finish a navigation.
    pub async fn navigate<T: DeserializeOwned>(&self, params: &QueryParams) -> Option<Navigation<T>> {
        let ticket = self.begin(params);
        let outcome = self.fetch(&ticket).await;
        self.complete(ticket, outcome)
    }

    /// Apply a user action to `state` and navigate to the resulting URL.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        state: &NavigationState,
        action: &NavAction,
    ) -> Option<Navigation<T>> {
        let next = state.apply(action, &self.profile);
        self.navigate(&next.to_query(&self.profile)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::config::ClientConfig;
    use facetnav_query::PageLink;
    use serde_json::json;

    type Item = serde_json::Value;

    fn navigator(backend: InMemoryBackend, profile: PageProfile) -> Navigator<InMemoryBackend> {
        Navigator::new(SearchClient::new(backend, ClientConfig::default()), profile)
    }

    fn body(total: u64, index: u32, pages: u32) -> serde_json::Value {
        json!({
            "stats": {"total": total, "index": index, "pages": pages, "facet": {}},
            "items": [{"id": 1}]
        })
    }

    #[tokio::test]
    async fn test_navigate_loads_page_and_window() {
        let nav = navigator(
            InMemoryBackend::new().with_json("/api/search/problem", body(1200, 7, 20)),
            PageProfile::problem(),
        );
        let result = nav
            .navigate::<Item>(&QueryParams::parse("p=7&page=3&utm=x&category=ABC"))
            .await
            .unwrap();

        assert_eq!(result.seq, 1);
        assert_eq!(result.params.to_query_string(), "category=ABC&p=7");
        assert_eq!(result.state.page(), 7);
        assert!(result.outcome.page().is_some());
        let window = result.window.unwrap();
        assert_eq!(window.links.last(), Some(&PageLink::Page(20)));
    }

    #[tokio::test]
    async fn test_unknown_total_gives_open_window() {
        let nav = navigator(
            InMemoryBackend::new().with_json("/api/search/submission", body(0, 1, 0)),
            PageProfile::submission(),
        );
        let result = nav.navigate::<Item>(&QueryParams::new()).await.unwrap();
        let window = result.window.unwrap();
        assert!(window.has_trailing_gap);
        assert_eq!(window.links.last(), Some(&PageLink::Gap));
    }

    #[tokio::test]
    async fn test_failure_is_single_page_error() {
        let nav = navigator(
            InMemoryBackend::new().with_failure(
                "/api/search/problem",
                FetchError::Connection("refused".to_string()),
            ),
            PageProfile::problem(),
        );
        let result = nav.navigate::<Item>(&QueryParams::new()).await.unwrap();

        assert_eq!(
            result.outcome.error(),
            Some(&FetchError::Connection("refused".to_string()))
        );
        assert!(result.outcome.page().is_none());
        assert!(result.window.is_none());
        assert_eq!(nav.client().backend().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_latest_initiated_wins() {
        let nav = navigator(
            InMemoryBackend::new().with_json("/api/search/problem", body(10, 1, 1)),
            PageProfile::problem(),
        );

        let first = nav.begin(&QueryParams::parse("q=a"));
        let second = nav.begin(&QueryParams::parse("q=ab"));
        assert!(!nav.is_current(&first));
        assert!(nav.is_current(&second));

        // The second response arrives first.
        let second_outcome = nav.fetch::<Item>(&second).await;
        let first_outcome = nav.fetch::<Item>(&first).await;

        let shown = nav.complete(second, second_outcome).unwrap();
        assert_eq!(shown.params.get("q"), Some("ab"));
        assert!(nav.complete(first, first_outcome).is_none());
    }

    #[tokio::test]
    async fn test_stale_failure_is_discarded_too() {
        let nav = navigator(InMemoryBackend::new(), PageProfile::user());
        let first = nav.begin(&QueryParams::new());
        let _second = nav.begin(&QueryParams::new());
        let outcome: PageOutcome<Item> = PageOutcome::Failed(FetchError::Timeout("t".to_string()));
        assert!(nav.complete(first, outcome).is_none());
        assert_eq!(nav.latest(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_applies_action() {
        let nav = navigator(
            InMemoryBackend::new().with_json("/api/search/problem", body(10, 1, 1)),
            PageProfile::problem(),
        );
        let state = NavigationState::from_query(
            &QueryParams::parse("difficultyFrom=400&difficultyTo=800&p=3"),
            nav.profile(),
        );
        let action = NavAction::SelectRange {
            field: "difficulty".to_string(),
            range: facetnav_query::NumericRange::between(400.0, 800.0),
        };
        let result = nav.dispatch::<Item>(&state, &action).await.unwrap();

        assert!(result.params.is_empty());
        let sent = &nav.client().backend().requests()[0];
        assert!(!sent.query.contains_key("difficultyFrom"));
        assert_eq!(sent.query.get("page"), Some("1"));
    }

    #[tokio::test]
    async fn test_dispatch_drops_what_the_url_cannot_carry() {
        let nav = navigator(
            InMemoryBackend::new().with_json("/api/search/problem", body(10, 1, 1)),
            PageProfile::problem(),
        );
        let state = NavigationState::new();

        let sorted = nav
            .dispatch::<Item>(&state, &NavAction::Sort { code: Some("99".to_string()) })
            .await
            .unwrap();
        assert_eq!(sorted.state.sort_code(), None);
        assert!(sorted.params.is_empty());

        let flagged = nav
            .dispatch::<Item>(
                &state,
                &NavAction::SelectToggle {
                    field: "excludeSolved".to_string(),
                    value: false,
                },
            )
            .await
            .unwrap();
        assert!(!flagged.state.has_filters());
    }
}
