//! Query translation and faceted-navigation state for search pages.
//!
//! The URL query string is the single source of truth for what a search page
//! shows. This crate converts between that query string and the two other
//! shapes the page deals with:
//!
//! - **Request**: a canonical [`SearchRequest`] for the backend
//! - **Response**: backend payloads projected into [`SearchPage`]
//! - **Navigation**: [`NavigationState`] transitions that rebuild the URL
//! - **Pagination**: a bounded [`PageWindow`] of page links
//!
//! Everything here is pure; fetching lives in `facetnav-client`.
//!
//! # Example
//!
//! ```rust,ignore
//! use facetnav_query::prelude::*;
//!
//! let profile = PageProfile::problem();
//! let params = QueryParams::parse("q=dp&category=ABC&difficultyFrom=1200&difficultyTo=1600");
//!
//! // Request for the backend
//! let request = SearchRequest::build(&params, &profile);
//! assert_eq!(request.limit, 60);
//!
//! // Clicking the selected bucket again clears it
//! let state = NavigationState::from_query(&params, &profile);
//! let next = state.select_bucket("difficulty", "1200~1600", &profile);
//! assert_eq!(next.to_query_string(&profile), "q=dp&category=ABC");
//! ```

pub mod error;
pub mod pagination;
pub mod params;
pub mod profile;
pub mod range;
pub mod request;
pub mod response;
pub mod scalar;
pub mod sort;
pub mod state;

pub use error::ProfileError;
pub use pagination::{window, PageLink, PageWindow};
pub use params::QueryParams;
pub use profile::{PageKind, PageProfile};
pub use range::NumericRange;
pub use request::{Filter, OptionValue, SearchRequest};
pub use response::{Facet, FacetCount, FacetSet, PageStats, SearchPage, SearchResponse};
pub use sort::{SortDirection, SortDirective, SortRegistry};
pub use state::{FacetCountView, NavAction, NavigationState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::ProfileError;
    pub use crate::params::QueryParams;

    // Codecs
    pub use crate::range::{NumericRange, RangeKeys};
    pub use crate::scalar::BooleanPolicy;

    // Pages
    pub use crate::profile::{PageKind, PageProfile, ValueEncoding};
    pub use crate::sort::{SortDirection, SortDirective, SortRegistry};

    // Request / response
    pub use crate::request::{Filter, OptionValue, SearchRequest};
    pub use crate::response::{Facet, FacetCount, FacetSet, PageStats, SearchPage, SearchResponse};

    // Navigation
    pub use crate::pagination::{window, PageLink, PageWindow};
    pub use crate::state::{FacetCountView, NavAction, NavigationState};
}
