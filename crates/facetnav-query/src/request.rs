//! Request builder: URL query string to canonical search request.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::params::QueryParams;
use crate::profile::{ExactField, PageProfile, ScalarKind, ValueEncoding};
use crate::range::{NumericRange, RangeKeys};
use crate::scalar::{decode_number, decode_page, encode_bool, encode_number};
use crate::sort::SortDirective;

/// A search filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Filter {
    /// Field equals any of `values` (OR).
    Exact {
        field: String,
        values: BTreeSet<String>,
    },
    /// Field within a range, open on a side whose bound is `None`.
    Range {
        field: String,
        from: Option<f64>,
        to: Option<f64>,
    },
}

impl Filter {
    /// Create an exact filter.
    pub fn exact<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Exact {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a range filter.
    pub fn range(field: impl Into<String>, range: NumericRange) -> Self {
        Filter::Range {
            field: field.into(),
            from: range.from,
            to: range.to,
        }
    }

    /// Field this filter applies to.
    pub fn field(&self) -> &str {
        match self {
            Filter::Exact { field, .. } | Filter::Range { field, .. } => field,
        }
    }

    /// Bounds of a range filter.
    pub fn as_range(&self) -> Option<NumericRange> {
        match self {
            Filter::Range { from, to, .. } => Some(NumericRange::new(*from, *to)),
            Filter::Exact { .. } => None,
        }
    }

    /// Values of an exact filter.
    pub fn values(&self) -> Option<&BTreeSet<String>> {
        match self {
            Filter::Exact { values, .. } => Some(values),
            Filter::Range { .. } => None,
        }
    }

    /// True when the filter would not restrict anything. Such filters are
    /// never sent.
    pub fn is_empty(&self) -> bool {
        match self {
            Filter::Exact { values, .. } => values.is_empty(),
            Filter::Range { from, to, .. } => from.is_none() && to.is_none(),
        }
    }

    fn write_params(&self, params: &mut QueryParams) {
        match self {
            Filter::Exact { field, values } => {
                for value in values {
                    params.append(field.clone(), value.clone());
                }
            }
            Filter::Range { field, from, to } => {
                NumericRange::new(*from, *to).write_keys(params, &RangeKeys::for_field(field));
            }
        }
    }
}

/// Value of a single-valued extra parameter (toggle or scalar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// Wire form of the value.
    pub fn to_param(&self) -> String {
        match self {
            OptionValue::Flag(value) => encode_bool(*value).to_string(),
            OptionValue::Number(value) => encode_number(*value),
            OptionValue::Text(value) => value.clone(),
        }
    }

    /// The boolean, if this is a flag.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

/// Canonical search request sent to the backend.
///
/// Built fresh on every navigation; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text query.
    pub q: Option<String>,
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Sort directives, never empty.
    pub sort: Vec<SortDirective>,
    /// Active filters. Never contains an empty filter.
    pub filters: Vec<Filter>,
    /// Facets to compute.
    pub requested_facets: Vec<String>,
    /// Toggles and scalar pass-through parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionValue>,
}

impl SearchRequest {
    /// Build a request from URL parameters and page defaults.
    ///
    /// Never fails: malformed parameters are treated as absent.
    pub fn build(params: &QueryParams, profile: &PageProfile) -> Self {
        let page = decode_page(first_of(params, &profile.page_keys)).unwrap_or(1);
        let q = profile
            .query_key
            .as_deref()
            .and_then(|key| params.get(key))
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        let sort = profile
            .sorts
            .resolve(first_of(params, &profile.sort_keys))
            .to_vec();

        let mut filters = Vec::new();
        for field in &profile.exact_fields {
            let values = read_values(params, field);
            if !values.is_empty() {
                filters.push(Filter::Exact {
                    field: field.name.clone(),
                    values,
                });
            }
        }
        for field in &profile.range_fields {
            if let Some(range) = NumericRange::decode_keys(params, &field.keys) {
                filters.push(Filter::range(field.name.clone(), range));
            }
        }

        let mut options = BTreeMap::new();
        for toggle in &profile.toggles {
            if let Some(value) = toggle.policy.decode(params.get(&toggle.name)) {
                options.insert(toggle.name.clone(), OptionValue::Flag(value));
            }
        }
        for scalar in &profile.scalars {
            let raw = params.get(&scalar.name);
            let value = match scalar.kind {
                ScalarKind::Number => decode_number(raw).map(OptionValue::Number),
                ScalarKind::Text => raw
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| OptionValue::Text(v.to_string())),
            };
            if let Some(value) = value {
                options.insert(scalar.name.clone(), value);
            }
        }

        let request = Self {
            q,
            page,
            limit: profile.limit,
            sort,
            filters,
            requested_facets: profile.facets.clone(),
            options,
        };
        tracing::debug!(
            kind = %profile.kind,
            page = request.page,
            filters = request.filters.len(),
            sort = ?request.sort.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "built search request"
        );
        request
    }

    /// Filter for `field`, if active.
    pub fn filter(&self, field: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.field() == field)
    }

    /// Extra parameter for `name`, if set.
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Number of items skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Query-encoded wire form.
    ///
    /// Absent values are skipped and lists become repeated keys.
    pub fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new()
            .with("limit", self.limit.to_string())
            .with("page", self.page.to_string());
        if let Some(q) = &self.q {
            params.append("q", q.clone());
        }
        for directive in &self.sort {
            params.append("sort", directive.to_param());
        }
        for facet in &self.requested_facets {
            params.append("facet", facet.clone());
        }
        for filter in self.filters.iter().filter(|f| !f.is_empty()) {
            filter.write_params(&mut params);
        }
        for (name, value) in &self.options {
            params.append(name.clone(), value.to_param());
        }
        params
    }
}

fn first_of<'a>(params: &'a QueryParams, keys: &[String]) -> Option<&'a str> {
    keys.iter().find_map(|key| params.get(key))
}

/// Read a multi-valued field in its declared encoding.
///
/// Repeated fields take each value whole, so a value may contain commas.
/// Comma-joined fields split every value on commas, which also accepts
/// repeated keys. Blank values are dropped.
pub(crate) fn read_values(params: &QueryParams, field: &ExactField) -> BTreeSet<String> {
    params
        .get_all(&field.name)
        .flat_map(|value| match field.encoding {
            ValueEncoding::Repeated => vec![value],
            ValueEncoding::CommaJoined => value.split(',').collect(),
        })
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let request = SearchRequest::build(&QueryParams::new(), &PageProfile::problem());
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 60);
        assert_eq!(request.q, None);
        assert_eq!(request.sort, vec![SortDirective::desc("startAt")]);
        assert!(request.filters.is_empty());
        assert_eq!(request.requested_facets, vec!["category", "difficulty"]);
    }

    #[test]
    fn test_build_reads_filters_and_sort() {
        let params = QueryParams::parse(
            "q=dp&p=3&s=4&category=ABC&category=ARC&difficultyFrom=1200&difficultyTo=1600",
        );
        let request = SearchRequest::build(&params, &PageProfile::problem());

        assert_eq!(request.q.as_deref(), Some("dp"));
        assert_eq!(request.page, 3);
        assert_eq!(request.offset(), 120);
        assert_eq!(
            request.sort,
            vec![SortDirective::desc("difficulty"), SortDirective::desc("startAt")]
        );
        assert_eq!(request.filter("category"), Some(&Filter::exact("category", ["ABC", "ARC"])));
        assert_eq!(
            request.filter("difficulty").and_then(Filter::as_range),
            Some(NumericRange::between(1200.0, 1600.0))
        );
    }

    #[test]
    fn test_build_accepts_legacy_keys() {
        let params = QueryParams::parse("page=2&sort=3");
        let request = SearchRequest::build(&params, &PageProfile::problem());
        assert_eq!(request.page, 2);
        assert_eq!(request.sort, vec![SortDirective::asc("startAt")]);
    }

    #[test]
    fn test_build_accepts_both_multi_value_encodings() {
        let params = QueryParams::parse("color=gray,brown&color=green&color=");
        let request = SearchRequest::build(&params, &PageProfile::problem());
        assert_eq!(
            request.filter("color"),
            Some(&Filter::exact("color", ["brown", "gray", "green"]))
        );
    }

    #[test]
    fn test_build_keeps_commas_in_repeated_values() {
        let params = QueryParams::parse(
            "language=Python%20(CPython%203.11%2C%20PyPy)&language=Rust&languageGroup=Python,Rust",
        );
        let request = SearchRequest::build(&params, &PageProfile::submission());
        assert_eq!(
            request.filter("language"),
            Some(&Filter::exact("language", ["Python (CPython 3.11, PyPy)", "Rust"]))
        );
        assert_eq!(
            request.filter("languageGroup"),
            Some(&Filter::exact("languageGroup", ["Python", "Rust"]))
        );
    }

    #[test]
    fn test_build_drops_empty_and_malformed_filters() {
        let params =
            QueryParams::parse("category=&category=%20&color=,&difficultyFrom=abc&p=zero&q=%20%20");
        let request = SearchRequest::build(&params, &PageProfile::problem());
        assert!(request.filters.is_empty());
        assert_eq!(request.page, 1);
        assert_eq!(request.q, None);
    }

    #[test]
    fn test_build_boolean_policies() {
        let profile = PageProfile::problem();

        let request = SearchRequest::build(
            &QueryParams::parse("experimental=false&excludeSolved=false&prioritizeRecent=true"),
            &profile,
        );
        assert_eq!(request.option("experimental"), Some(&OptionValue::Flag(false)));
        assert_eq!(request.option("excludeSolved"), None);
        assert_eq!(request.option("prioritizeRecent"), Some(&OptionValue::Flag(true)));

        let request = SearchRequest::build(&QueryParams::parse("experimental=yes"), &profile);
        assert_eq!(request.option("experimental"), None);
    }

    #[test]
    fn test_build_scalars() {
        let params = QueryParams::parse("userId=tourist&preferDifficulty=hard");
        let request = SearchRequest::build(&params, &PageProfile::problem());
        assert_eq!(request.option("userId"), Some(&OptionValue::Text("tourist".to_string())));
        assert_eq!(
            request.option("preferDifficulty"),
            Some(&OptionValue::Text("hard".to_string()))
        );
    }

    #[test]
    fn test_submission_ignores_free_text() {
        let params = QueryParams::parse("q=ignored&language=Rust&executionTimeTo=100");
        let request = SearchRequest::build(&params, &PageProfile::submission());
        assert_eq!(request.q, None);
        assert_eq!(request.limit, 100);
        assert_eq!(request.filter("language"), Some(&Filter::exact("language", ["Rust"])));
        assert_eq!(
            request.filter("executionTime").and_then(Filter::as_range),
            Some(NumericRange::below(100.0))
        );
    }

    #[test]
    fn test_to_query_params() {
        let params = QueryParams::parse(
            "q=graph&s=4&category=ARC&category=ABC&difficultyFrom=2800&experimental=true",
        );
        let request = SearchRequest::build(&params, &PageProfile::problem());
        let wire = request.to_query_params();

        assert_eq!(wire.get("limit"), Some("60"));
        assert_eq!(wire.get("page"), Some("1"));
        assert_eq!(wire.get("q"), Some("graph"));
        assert_eq!(wire.get_all("sort").collect::<Vec<_>>(), vec!["-difficulty", "-startAt"]);
        assert_eq!(wire.get_all("facet").collect::<Vec<_>>(), vec!["category", "difficulty"]);
        assert_eq!(wire.get_all("category").collect::<Vec<_>>(), vec!["ABC", "ARC"]);
        assert_eq!(wire.get("difficultyFrom"), Some("2800"));
        assert!(!wire.contains_key("difficultyTo"));
        assert_eq!(wire.get("experimental"), Some("true"));
    }

    #[test]
    fn test_to_query_params_omits_absent_query() {
        let request = SearchRequest::build(&QueryParams::new(), &PageProfile::user());
        let wire = request.to_query_params();
        assert!(!wire.contains_key("q"));
        assert_eq!(wire.get_all("sort").collect::<Vec<_>>(), vec!["-rating", "rank"]);
    }

    #[test]
    fn test_json_form() {
        let params = QueryParams::parse("category=ABC&difficultyTo=400");
        let request = SearchRequest::build(&params, &PageProfile::problem());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["page"], 1);
        assert_eq!(json["requestedFacets"][0], "category");
        assert_eq!(json["filters"][0]["kind"], "exact");
        assert_eq!(json["filters"][0]["values"][0], "ABC");
        assert_eq!(json["filters"][1]["kind"], "range");
        assert!(json["filters"][1]["from"].is_null());
        assert_eq!(json["filters"][1]["to"], 400.0);
        assert_eq!(json["sort"][0]["direction"], "desc");

        let back: SearchRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
