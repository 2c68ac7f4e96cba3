//! Response projector: backend payload to pagination stats, items and
//! facets.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::range::{NumericRange, RANGE_SEPARATOR};
use crate::request::SearchRequest;
use crate::scalar::{decode_number, encode_number};

/// Raw search response as the backend emits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SearchResponse<T> {
    /// Result statistics and facets.
    #[serde(default, deserialize_with = "null_default")]
    pub stats: RawStats,
    /// Result items.
    #[serde(default = "Vec::new", deserialize_with = "null_default")]
    pub items: Vec<T>,
    /// Backend diagnostic, e.g. "specified user not found".
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw `stats` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStats {
    /// Elapsed time in milliseconds.
    #[serde(default, deserialize_with = "null_default")]
    pub time: u64,
    /// Total number of matching items.
    #[serde(default, deserialize_with = "null_default")]
    pub total: u64,
    /// Current page.
    #[serde(default, deserialize_with = "null_default")]
    pub index: u32,
    /// Total number of pages.
    #[serde(default, deserialize_with = "null_default")]
    pub pages: u32,
    /// Number of items on this page.
    #[serde(default, deserialize_with = "null_default")]
    pub count: u32,
    /// Facets by field name.
    #[serde(default, deserialize_with = "facet_map")]
    pub facet: BTreeMap<String, RawFacet>,
}

/// Raw facet entry. Older backends send the counts array directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFacet {
    Counts(Vec<RawCount>),
    Part {
        #[serde(default, deserialize_with = "null_default")]
        counts: Vec<RawCount>,
        #[serde(default, rename = "rangeInfo", alias = "range_info")]
        range_info: Option<RawRangeInfo>,
    },
}

impl RawFacet {
    fn into_parts(self) -> (Vec<RawCount>, Option<RawRangeInfo>) {
        match self {
            RawFacet::Counts(counts) => (counts, None),
            RawFacet::Part { counts, range_info } => (counts, range_info),
        }
    }
}

/// Raw facet bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCount {
    #[serde(alias = "key")]
    pub label: String,
    #[serde(default, deserialize_with = "null_default")]
    pub count: u64,
}

/// Raw range facet bucketing. Bounds may arrive as numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRangeInfo {
    #[serde(default, deserialize_with = "number_or_string")]
    pub start: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub end: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub gap: Option<f64>,
    /// Items below `start`.
    #[serde(default, deserialize_with = "number_or_string")]
    pub before: Option<f64>,
    /// Items at or above `end`.
    #[serde(default, deserialize_with = "number_or_string")]
    pub after: Option<f64>,
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn facet_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, RawFacet>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<RawFacet>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(field, facet)| facet.map(|facet| (field, facet)))
        .collect())
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(value)) => Some(value),
        Some(NumberOrString::String(value)) => decode_number(Some(&value)),
        None => None,
    })
}

/// One facet bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    /// Value (field facet) or canonical `from~to` label (range facet).
    pub label: String,
    /// Number of matching items.
    pub count: u64,
}

impl FacetCount {
    /// Create a bucket.
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }

    /// Bucket bounds, for range facet labels.
    pub fn range(&self) -> Option<NumericRange> {
        NumericRange::decode_label(&self.label)
    }
}

/// Bucketing of a range facet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeInfo {
    /// Lower bound of the first backend bucket.
    pub start: Option<f64>,
    /// Upper bound of the last backend bucket.
    pub end: Option<f64>,
    /// Bucket width.
    pub gap: Option<f64>,
}

/// Projected facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Facet {
    /// Discrete values.
    Field {
        field: String,
        counts: Vec<FacetCount>,
    },
    /// Numeric buckets, including the two open-ended sentinels.
    Range {
        field: String,
        counts: Vec<FacetCount>,
        info: RangeInfo,
    },
}

impl Facet {
    /// Project one raw facet.
    ///
    /// A facet without `rangeInfo` is a field facet. Range labels are
    /// canonicalized and the before/after sentinels are added unless the
    /// backend already sent a bucket with the same label.
    pub fn from_raw(field: impl Into<String>, raw: RawFacet) -> Self {
        let field = field.into();
        let (counts, range_info) = raw.into_parts();
        let Some(range_info) = range_info else {
            let counts = counts
                .into_iter()
                .map(|c| FacetCount::new(c.label, c.count))
                .collect();
            return Facet::Field { field, counts };
        };

        let mut buckets: Vec<FacetCount> = counts
            .into_iter()
            .map(|c| FacetCount::new(canonical_label(&c.label), c.count))
            .collect();

        if let Some(start) = range_info.start {
            let label = before_label(start);
            if !buckets.iter().any(|b| b.label == label) {
                buckets.insert(0, FacetCount::new(label, sentinel_count(range_info.before)));
            }
        }
        if let Some(end) = range_info.end {
            let label = after_label(end);
            if !buckets.iter().any(|b| b.label == label) {
                buckets.push(FacetCount::new(label, sentinel_count(range_info.after)));
            }
        }

        Facet::Range {
            field,
            counts: buckets,
            info: RangeInfo {
                start: range_info.start,
                end: range_info.end,
                gap: range_info.gap,
            },
        }
    }

    /// Field name.
    pub fn field(&self) -> &str {
        match self {
            Facet::Field { field, .. } | Facet::Range { field, .. } => field,
        }
    }

    /// Buckets in display order.
    pub fn counts(&self) -> &[FacetCount] {
        match self {
            Facet::Field { counts, .. } | Facet::Range { counts, .. } => counts,
        }
    }

    /// Whether this is a range facet.
    pub fn is_range(&self) -> bool {
        matches!(self, Facet::Range { .. })
    }
}

/// Rewrite `1200 ~ 1600` as `1200~1600`. Labels that are not ranges are
/// kept as they are.
fn canonical_label(label: &str) -> String {
    match NumericRange::decode_label(label) {
        Some(range) => range.encode_label(),
        None => {
            tracing::trace!(label, "range facet label is not a range");
            label.to_string()
        }
    }
}

fn sentinel_count(raw: Option<f64>) -> u64 {
    raw.filter(|count| *count > 0.0).map(|count| count as u64).unwrap_or(0)
}

/// Facets by field name. A missing field means "no facet data".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSet {
    facets: BTreeMap<String, Facet>,
}

impl FacetSet {
    /// Project a raw facet map.
    pub fn from_raw(raw: BTreeMap<String, RawFacet>) -> Self {
        let facets = raw
            .into_iter()
            .map(|(field, facet)| (field.clone(), Facet::from_raw(field, facet)))
            .collect();
        Self { facets }
    }

    /// Add or replace a facet.
    pub fn insert(&mut self, facet: Facet) {
        self.facets.insert(facet.field().to_string(), facet);
    }

    /// Facet for `field`.
    pub fn get(&self, field: &str) -> Option<&Facet> {
        self.facets.get(field)
    }

    /// Buckets for `field`; empty when the backend sent none.
    pub fn counts_for(&self, field: &str) -> &[FacetCount] {
        self.get(field).map(Facet::counts).unwrap_or(&[])
    }

    /// All facets, ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = &Facet> {
        self.facets.values()
    }

    /// Number of facets.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

/// Pagination statistics.
///
/// `1 <= current_page <= max(total_pages, 1)` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    /// Total number of matching items.
    pub total_items: u64,
    /// Current page (1-indexed).
    pub current_page: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Items per page.
    pub page_size: u32,
    /// Backend time in milliseconds.
    pub elapsed_ms: u64,
}

impl PageStats {
    /// Create stats, deriving the page count from `total_items` when the
    /// backend did not report one and clamping the current page.
    pub fn new(total_items: u64, current_page: u32, total_pages: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages = if total_pages > 0 {
            total_pages
        } else {
            let pages = total_items.div_ceil(u64::from(page_size));
            u32::try_from(pages).unwrap_or(u32::MAX)
        };
        let current_page = current_page.clamp(1, total_pages.max(1));

        Self {
            total_items,
            current_page,
            total_pages,
            page_size,
            elapsed_ms: 0,
        }
    }

    /// Set elapsed time.
    pub fn with_elapsed(mut self, ms: u64) -> Self {
        self.elapsed_ms = ms;
        self
    }

    /// Whether there is a next page.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether there is a previous page.
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Get start item number (1-indexed).
    pub fn start_item(&self) -> u64 {
        if self.total_items == 0 {
            0
        } else {
            u64::from(self.current_page.saturating_sub(1)) * u64::from(self.page_size) + 1
        }
    }

    /// Get end item number.
    pub fn end_item(&self) -> u64 {
        (u64::from(self.current_page) * u64::from(self.page_size)).min(self.total_items)
    }
}

/// Projected search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage<T> {
    /// Pagination statistics.
    pub stats: PageStats,
    /// Result items, unchanged in shape.
    pub items: Vec<T>,
    /// Facets.
    pub facets: FacetSet,
    /// Backend diagnostic. Never blank.
    pub message: Option<String>,
}

impl<T> SearchPage<T> {
    /// Project a raw response for the request that produced it.
    pub fn project(response: SearchResponse<T>, request: &SearchRequest) -> Self {
        let SearchResponse {
            stats,
            items,
            message,
        } = response;
        let current = if stats.index > 0 { stats.index } else { request.page };
        let page_stats = PageStats::new(stats.total, current, stats.pages, request.limit)
            .with_elapsed(stats.time);

        Self {
            stats: page_stats,
            items,
            facets: FacetSet::from_raw(stats.facet),
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Map items, keeping stats and facets.
    pub fn map_items<U, F: FnMut(T) -> U>(self, f: F) -> SearchPage<U> {
        SearchPage {
            stats: self.stats,
            items: self.items.into_iter().map(f).collect(),
            facets: self.facets,
            message: self.message,
        }
    }
}

/// Label of the open-ended bucket below `start`.
pub fn before_label(start: f64) -> String {
    format!("{}{}", RANGE_SEPARATOR, encode_number(start))
}

/// Label of the open-ended bucket from `end` upward.
pub fn after_label(end: f64) -> String {
    format!("{}{}", encode_number(end), RANGE_SEPARATOR)
}
