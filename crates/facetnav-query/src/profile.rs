//! Page profiles: everything that differs between search pages.
//!
//! A profile fixes the page size, the requested facets, the sort table and
//! the URL key names of every filter the page understands.
//!
//! | Page       | Exact filters                                           | Range filters                          | Toggles                                   |
//! |------------|---------------------------------------------------------|----------------------------------------|-------------------------------------------|
//! | problem    | `category`, `color` (comma-joined)                      | `difficulty`                           | `experimental` (nullable), `excludeSolved`, `prioritizeRecent` (true-only) |
//! | user       | `userId`, `country`, `color` (comma-joined)             | `rating`, `birthYear`, `joinCount`     |                                           |
//! | submission | `problemId`, `contestId`, `category`, `userId`, `language`, `languageGroup` (comma-joined), `result` | `epochSecond`, `point`, `length`, `executionTime` | |
//!
//! All pages use `p` for the page and `s` for the sort code, accepting the
//! legacy `page` / `sort` keys on decode. Range filters use
//! `<field>From` / `<field>To`. The problem page also carries `userId` (the
//! user whose solved problems `excludeSolved` hides) and `preferDifficulty`
//! as single-valued scalars.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::range::RangeKeys;
use crate::scalar::BooleanPolicy;
use crate::sort::{SortDirective, SortRegistry};

/// Search page type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Problem,
    User,
    Submission,
}

impl PageKind {
    /// All page kinds.
    pub const ALL: [PageKind; 3] = [PageKind::Problem, PageKind::User, PageKind::Submission];

    /// Stable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::User => "user",
            Self::Submission => "submission",
        }
    }

    /// Built-in profile for this page.
    pub fn profile(&self) -> PageProfile {
        match self {
            Self::Problem => PageProfile::problem(),
            Self::User => PageProfile::user(),
            Self::Submission => PageProfile::submission(),
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "problem" => Ok(Self::Problem),
            "user" => Ok(Self::User),
            "submission" => Ok(Self::Submission),
            other => Err(ProfileError::UnknownPage(other.to_string())),
        }
    }
}

/// How a multi-valued field is written to the URL.
///
/// Values of a repeated field may contain commas. A comma-joined field also
/// reads repeated keys, but its values can never contain a comma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueEncoding {
    /// `category=ABC&category=ARC`
    #[default]
    Repeated,
    /// `color=gray,brown`
    CommaJoined,
}

/// Multi-choice field filtered by exact values (OR-combined).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactField {
    /// Field name, also the query key and backend parameter.
    pub name: String,
    /// URL encoding for multiple values.
    pub encoding: ValueEncoding,
}

/// Numeric field filtered by a range, selected one bucket at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeField {
    /// Field name, also the facet name.
    pub name: String,
    /// Query keys for the two bounds.
    pub keys: RangeKeys,
}

/// Boolean toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleField {
    /// Field name and query key.
    pub name: String,
    /// Decoding policy.
    pub policy: BooleanPolicy,
}

/// Kind of a single-valued scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Number,
    Text,
}

/// Single-valued parameter that is passed through to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Field name and query key.
    pub name: String,
    /// Value kind.
    pub kind: ScalarKind,
}

/// Reference to a field of a profile, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Exact(&'a ExactField),
    Range(&'a RangeField),
    Toggle(&'a ToggleField),
    Scalar(&'a ScalarField),
}

/// Page-specific defaults consumed by the request builder and the
/// navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageProfile {
    /// Page type.
    pub kind: PageKind,
    /// Backend endpoint path.
    pub endpoint: String,
    /// Fixed page size.
    pub limit: u32,
    /// Page number keys; the first is written, all are read.
    pub page_keys: Vec<String>,
    /// Sort code keys; the first is written, all are read.
    pub sort_keys: Vec<String>,
    /// Free-text query key, if the page has a search box.
    pub query_key: Option<String>,
    /// Sort table.
    pub sorts: SortRegistry,
    /// Facets requested from the backend.
    pub facets: Vec<String>,
    /// Multi-choice exact filters.
    pub exact_fields: Vec<ExactField>,
    /// Range filters.
    pub range_fields: Vec<RangeField>,
    /// Boolean toggles.
    pub toggles: Vec<ToggleField>,
    /// Scalar pass-through parameters.
    pub scalars: Vec<ScalarField>,
    /// Whether the backend reports a reliable total page count.
    pub total_pages_known: bool,
}

impl PageProfile {
    /// Create a profile with no filters.
    pub fn new(kind: PageKind, endpoint: impl Into<String>, limit: u32, sorts: SortRegistry) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            limit: limit.max(1),
            page_keys: vec!["p".to_string(), "page".to_string()],
            sort_keys: vec!["s".to_string(), "sort".to_string()],
            query_key: Some("q".to_string()),
            sorts,
            facets: Vec::new(),
            exact_fields: Vec::new(),
            range_fields: Vec::new(),
            toggles: Vec::new(),
            scalars: Vec::new(),
            total_pages_known: true,
        }
    }

    /// Request facets.
    pub fn with_facets(mut self, facets: &[&str]) -> Self {
        self.facets = facets.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add a multi-choice exact filter.
    pub fn with_exact(mut self, name: &str, encoding: ValueEncoding) -> Self {
        self.exact_fields.push(ExactField {
            name: name.to_string(),
            encoding,
        });
        self
    }

    /// Add a range filter keyed by `<name>From` / `<name>To`.
    pub fn with_range(mut self, name: &str) -> Self {
        self.range_fields.push(RangeField {
            name: name.to_string(),
            keys: RangeKeys::for_field(name),
        });
        self
    }

    /// Add a boolean toggle.
    pub fn with_toggle(mut self, name: &str, policy: BooleanPolicy) -> Self {
        self.toggles.push(ToggleField {
            name: name.to_string(),
            policy,
        });
        self
    }

    /// Add a scalar pass-through parameter.
    pub fn with_scalar(mut self, name: &str, kind: ScalarKind) -> Self {
        self.scalars.push(ScalarField {
            name: name.to_string(),
            kind,
        });
        self
    }

    /// Drop the free-text query box.
    pub fn without_query(mut self) -> Self {
        self.query_key = None;
        self
    }

    /// Mark the total page count as unreliable.
    pub fn with_unknown_total(mut self) -> Self {
        self.total_pages_known = false;
        self
    }

    /// Problem search.
    pub fn problem() -> Self {
        let sorts = SortRegistry::new(SortDirective::desc("startAt"))
            .with_entry("1", "Relevance", &["-score", "-startAt"])
            .with_entry("2", "Newest", &["-startAt"])
            .with_entry("3", "Oldest", &["startAt"])
            .with_entry("4", "Hardest", &["-difficulty", "-startAt"])
            .with_entry("5", "Easiest", &["difficulty", "-startAt"])
            .with_default("2");

        Self::new(PageKind::Problem, "/api/search/problem", 60, sorts)
            .with_facets(&["category", "difficulty"])
            .with_exact("category", ValueEncoding::Repeated)
            .with_exact("color", ValueEncoding::CommaJoined)
            .with_range("difficulty")
            .with_toggle("experimental", BooleanPolicy::Nullable)
            .with_toggle("excludeSolved", BooleanPolicy::TrueOnly)
            .with_toggle("prioritizeRecent", BooleanPolicy::TrueOnly)
            .with_scalar("userId", ScalarKind::Text)
            .with_scalar("preferDifficulty", ScalarKind::Text)
    }

    /// User search.
    pub fn user() -> Self {
        let sorts = SortRegistry::new(SortDirective::desc("rating"))
            .with_entry("1", "Relevance", &["-score"])
            .with_entry("2", "Lowest rating", &["rating", "rank"])
            .with_entry("3", "Highest rating", &["-rating", "rank"])
            .with_entry("4", "Birth year, latest first", &["-birthYear", "rank"])
            .with_entry("5", "Birth year, earliest first", &["birthYear", "rank"])
            .with_default("3");

        Self::new(PageKind::User, "/api/search/user", 60, sorts)
            .with_facets(&["country", "rating", "birthYear", "joinCount"])
            .with_exact("userId", ValueEncoding::Repeated)
            .with_exact("country", ValueEncoding::Repeated)
            .with_exact("color", ValueEncoding::CommaJoined)
            .with_range("rating")
            .with_range("birthYear")
            .with_range("joinCount")
    }

    /// Submission search.
    pub fn submission() -> Self {
        let sorts = SortRegistry::new(SortDirective::desc("epochSecond"))
            .with_entry("1", "Newest", &["-epochSecond"])
            .with_entry("2", "Oldest", &["epochSecond"])
            .with_entry("3", "Fastest", &["executionTime", "-epochSecond"])
            .with_entry("4", "Slowest", &["-executionTime", "-epochSecond"])
            .with_entry("5", "Lowest point", &["point", "-epochSecond"])
            .with_entry("6", "Highest point", &["-point", "-epochSecond"])
            .with_entry("7", "Shortest code", &["length", "-epochSecond"])
            .with_entry("8", "Longest code", &["-length", "-epochSecond"])
            .with_default("1");

        Self::new(PageKind::Submission, "/api/search/submission", 100, sorts)
            .without_query()
            .with_unknown_total()
            .with_facets(&["problemId", "userId", "language", "result", "length", "executionTime"])
            .with_exact("problemId", ValueEncoding::Repeated)
            .with_exact("contestId", ValueEncoding::Repeated)
            .with_exact("category", ValueEncoding::Repeated)
            .with_exact("userId", ValueEncoding::Repeated)
            .with_exact("language", ValueEncoding::Repeated)
            .with_exact("languageGroup", ValueEncoding::CommaJoined)
            .with_exact("result", ValueEncoding::Repeated)
            .with_range("epochSecond")
            .with_range("point")
            .with_range("length")
            .with_range("executionTime")
    }

    /// Key the page number is written under.
    pub fn page_key(&self) -> &str {
        self.page_keys.first().map(String::as_str).unwrap_or("p")
    }

    /// Key the sort code is written under.
    pub fn sort_key(&self) -> &str {
        self.sort_keys.first().map(String::as_str).unwrap_or("s")
    }

    /// Look up a field of any kind by name.
    ///
    /// Exact fields shadow range fields, which shadow toggles, which shadow
    /// scalars; built-in profiles never reuse a name.
    pub fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        if let Some(f) = self.exact_fields.iter().find(|f| f.name == name) {
            return Some(FieldRef::Exact(f));
        }
        if let Some(f) = self.range_fields.iter().find(|f| f.name == name) {
            return Some(FieldRef::Range(f));
        }
        if let Some(f) = self.toggles.iter().find(|f| f.name == name) {
            return Some(FieldRef::Toggle(f));
        }
        self.scalars
            .iter()
            .find(|f| f.name == name)
            .map(FieldRef::Scalar)
    }

    /// Look up a range field.
    pub fn range_field(&self, name: &str) -> Option<&RangeField> {
        self.range_fields.iter().find(|f| f.name == name)
    }

    /// Every URL key owned by `name` (both bound keys for a range field).
    pub fn keys_for(&self, name: &str) -> Vec<&str> {
        match self.field(name) {
            Some(FieldRef::Range(f)) => vec![f.keys.from.as_str(), f.keys.to.as_str()],
            Some(FieldRef::Exact(f)) => vec![f.name.as_str()],
            Some(FieldRef::Toggle(f)) => vec![f.name.as_str()],
            Some(FieldRef::Scalar(f)) => vec![f.name.as_str()],
            None => Vec::new(),
        }
    }
}
