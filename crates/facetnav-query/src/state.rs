//! Facet navigation state.
//!
//! The state is a value rehydrated from the URL on every render. Each
//! transition returns a new state, and the next URL is rebuilt from that
//! state with [`NavigationState::to_query`], so a reload reproduces exactly
//! what the user saw.
//!
//! Transitions take the page profile and return canonical states: anything
//! the URL cannot carry (unknown fields, unregistered sort codes, a `false`
//! opt-in flag, non-numeric numbers) is dropped right away instead of
//! vanishing on the next reload.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::params::QueryParams;
use crate::profile::{FieldRef, PageProfile, ScalarKind, ValueEncoding};
use crate::range::NumericRange;
use crate::request::read_values;
use crate::response::{Facet, FacetCount};
use crate::scalar::{decode_number, decode_page, encode_number};

/// Selection state of one search page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    query: Option<String>,
    sort: Option<String>,
    page: u32,
    checked: BTreeMap<String, BTreeSet<String>>,
    ranges: BTreeMap<String, NumericRange>,
    toggles: BTreeMap<String, bool>,
    scalars: BTreeMap<String, String>,
}

/// A user interaction on the search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavAction {
    /// Submit the search box.
    Search { query: Option<String> },
    /// Flip one checkbox of a multi-choice field.
    ToggleValue { field: String, value: String },
    /// Click a range bucket.
    SelectRange { field: String, range: NumericRange },
    /// Click one side of a three-state toggle.
    SelectToggle { field: String, value: bool },
    /// Tick or untick an opt-in flag.
    SetFlag { field: String, on: bool },
    /// Set or clear a scalar parameter.
    SetScalar { field: String, value: Option<String> },
    /// Pick a sort code.
    Sort { code: Option<String> },
    /// Follow a page link.
    Page { page: u32 },
    /// Clear one field.
    ResetField { field: String },
    /// Clear every filter, keeping the query text and sort.
    ResetAll,
}

/// A facet bucket joined with the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCountView {
    /// Bucket label.
    pub label: String,
    /// Number of matching items.
    pub count: u64,
    /// Whether the bucket is part of the current selection.
    pub selected: bool,
}

impl NavigationState {
    /// Empty state on page 1.
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Self::default()
        }
    }

    /// Rehydrate from URL parameters.
    ///
    /// Keys the profile does not know are ignored, as are unregistered sort
    /// codes and malformed values.
    pub fn from_query(params: &QueryParams, profile: &PageProfile) -> Self {
        let mut state = Self::new();

        state.query = profile
            .query_key
            .as_deref()
            .and_then(|key| params.get(key))
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        state.sort = profile
            .sort_keys
            .iter()
            .find_map(|key| params.get(key))
            .filter(|code| profile.sorts.contains(code))
            .map(str::to_string);
        state.page = decode_page(profile.page_keys.iter().find_map(|key| params.get(key)))
            .unwrap_or(1);

        for field in &profile.exact_fields {
            let values = read_values(params, field);
            if !values.is_empty() {
                state.checked.insert(field.name.clone(), values);
            }
        }
        for field in &profile.range_fields {
            if let Some(range) = NumericRange::decode_keys(params, &field.keys) {
                state.ranges.insert(field.name.clone(), range);
            }
        }
        for toggle in &profile.toggles {
            if let Some(value) = toggle.policy.decode(params.get(&toggle.name)) {
                state.toggles.insert(toggle.name.clone(), value);
            }
        }
        for scalar in &profile.scalars {
            let raw = params.get(&scalar.name);
            let value = match scalar.kind {
                ScalarKind::Number => decode_number(raw).map(encode_number),
                ScalarKind::Text => raw
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            };
            if let Some(value) = value {
                state.scalars.insert(scalar.name.clone(), value);
            }
        }

        state
    }

    /// Rebuild the URL parameters from this state.
    ///
    /// Fields are written in profile order using the profile's primary key
    /// names. Page 1 and an unset sort code are omitted.
    pub fn to_query(&self, profile: &PageProfile) -> QueryParams {
        let mut params = QueryParams::new();

        if let (Some(key), Some(query)) = (profile.query_key.as_deref(), &self.query) {
            params.append(key, query.clone());
        }
        for field in &profile.exact_fields {
            let Some(values) = self.checked.get(&field.name).filter(|v| !v.is_empty()) else {
                continue;
            };
            match field.encoding {
                ValueEncoding::Repeated => {
                    for value in values {
                        params.append(field.name.clone(), value.clone());
                    }
                }
                ValueEncoding::CommaJoined => {
                    let joined = values.iter().map(String::as_str).collect::<Vec<_>>().join(",");
                    params.append(field.name.clone(), joined);
                }
            }
        }
        for field in &profile.range_fields {
            if let Some(range) = self.ranges.get(&field.name).filter(|r| !r.is_unbounded()) {
                range.write_keys(&mut params, &field.keys);
            }
        }
        for toggle in &profile.toggles {
            if let Some(encoded) = self
                .toggles
                .get(&toggle.name)
                .and_then(|value| toggle.policy.encode(*value))
            {
                params.append(toggle.name.clone(), encoded);
            }
        }
        for scalar in &profile.scalars {
            if let Some(value) = self.scalars.get(&scalar.name) {
                params.append(scalar.name.clone(), value.clone());
            }
        }
        if let Some(code) = &self.sort {
            params.append(profile.sort_key(), code.clone());
        }
        if self.page > 1 {
            params.append(profile.page_key(), self.page.to_string());
        }

        params
    }

    /// Percent-encoded form of [`NavigationState::to_query`].
    pub fn to_query_string(&self, profile: &PageProfile) -> String {
        self.to_query(profile).to_query_string()
    }

    /// The state a reload of this state's URL would produce.
    ///
    /// Idempotent. Every transition already returns a canonical state; this
    /// is for states built some other way, such as deserialized ones.
    pub fn canonical(&self, profile: &PageProfile) -> Self {
        Self::from_query(&self.to_query(profile), profile)
    }

    /// Apply an action.
    pub fn apply(&self, action: &NavAction, profile: &PageProfile) -> Self {
        match action {
            NavAction::Search { query } => self.with_query_text(query.as_deref(), profile),
            NavAction::ToggleValue { field, value } => self.toggle_value(field, value, profile),
            NavAction::SelectRange { field, range } => self.select_range(field, *range, profile),
            NavAction::SelectToggle { field, value } => self.select_toggle(field, *value, profile),
            NavAction::SetFlag { field, on } => self.set_flag(field, *on, profile),
            NavAction::SetScalar { field, value } => {
                self.with_scalar(field, value.as_deref(), profile)
            }
            NavAction::Sort { code } => self.with_sort(code.as_deref(), profile),
            NavAction::Page { page } => self.with_page(*page),
            NavAction::ResetField { field } => self.reset_field(field),
            NavAction::ResetAll => self.reset_all(),
        }
    }

    /// Replace the free-text query. Blank text clears it.
    pub fn with_query_text(&self, query: Option<&str>, profile: &PageProfile) -> Self {
        let mut next = self.restart();
        next.query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        next.canonical(profile)
    }

    /// Flip one checkbox of a multi-choice field.
    pub fn toggle_value(&self, field: &str, value: &str, profile: &PageProfile) -> Self {
        let checked = !self.is_checked(field, value.trim());
        self.set_checked(field, value, checked, profile)
    }

    /// Check or uncheck one value of a multi-choice field.
    ///
    /// Values are trimmed. Unchecking the last value removes the field
    /// entirely. Blank values, and values with a comma in a comma-joined
    /// field, cannot be written to the URL and leave the state unchanged.
    pub fn set_checked(
        &self,
        field: &str,
        value: &str,
        checked: bool,
        profile: &PageProfile,
    ) -> Self {
        let value = value.trim();
        let comma_joined = matches!(
            profile.field(field),
            Some(FieldRef::Exact(f)) if f.encoding == ValueEncoding::CommaJoined
        );
        if value.is_empty() || (comma_joined && value.contains(',')) {
            tracing::debug!(field, value, "ignoring value that cannot be written to the URL");
            return self.clone();
        }

        let mut next = self.restart();
        if checked {
            next.checked
                .entry(field.to_string())
                .or_default()
                .insert(value.to_string());
        } else if let Some(values) = next.checked.get_mut(field) {
            values.remove(value);
            if values.is_empty() {
                next.checked.remove(field);
            }
        }
        next.canonical(profile)
    }

    /// Select a range bucket. Selecting the current bucket again clears
    /// the field.
    pub fn select_range(&self, field: &str, range: NumericRange, profile: &PageProfile) -> Self {
        let mut next = self.restart();
        if range.is_unbounded() || self.ranges.get(field) == Some(&range) {
            next.ranges.remove(field);
        } else {
            next.ranges.insert(field.to_string(), range);
        }
        next.canonical(profile)
    }

    /// Select a range bucket by its `from~to` label.
    ///
    /// A label that does not decode leaves the state unchanged.
    pub fn select_bucket(&self, field: &str, label: &str, profile: &PageProfile) -> Self {
        match NumericRange::decode_label(label) {
            Some(range) => self.select_range(field, range, profile),
            None => {
                tracing::debug!(field, label, "ignoring selection of malformed range label");
                self.clone()
            }
        }
    }

    /// Select one side of a three-state toggle. Selecting the current side
    /// again unsets it.
    ///
    /// On an opt-in flag, selecting `false` is the same as unsetting it.
    pub fn select_toggle(&self, field: &str, value: bool, profile: &PageProfile) -> Self {
        let mut next = self.restart();
        if self.toggles.get(field) == Some(&value) {
            next.toggles.remove(field);
        } else {
            next.toggles.insert(field.to_string(), value);
        }
        next.canonical(profile)
    }

    /// Tick or untick an opt-in flag. Unticking removes it.
    pub fn set_flag(&self, field: &str, on: bool, profile: &PageProfile) -> Self {
        let mut next = self.restart();
        if on {
            next.toggles.insert(field.to_string(), true);
        } else {
            next.toggles.remove(field);
        }
        next.canonical(profile)
    }

    /// Set or clear a scalar parameter. Blank values clear it, and so do
    /// values of a number field that do not parse as a number.
    pub fn with_scalar(&self, field: &str, value: Option<&str>, profile: &PageProfile) -> Self {
        let mut next = self.restart();
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => {
                next.scalars.insert(field.to_string(), value.to_string());
            }
            None => {
                next.scalars.remove(field);
            }
        }
        next.canonical(profile)
    }

    /// Pick a sort code. Resets to page 1.
    ///
    /// Codes the page does not register are dropped, so the default order
    /// applies.
    pub fn with_sort(&self, code: Option<&str>, profile: &PageProfile) -> Self {
        let mut next = self.restart();
        next.sort = code.map(str::to_string);
        next.canonical(profile)
    }

    /// Go to a page. Selection is kept.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Clear one field, leaving every other field and the query text alone.
    pub fn reset_field(&self, field: &str) -> Self {
        let mut next = self.restart();
        next.checked.remove(field);
        next.ranges.remove(field);
        next.toggles.remove(field);
        next.scalars.remove(field);
        next
    }

    /// Clear every filter. The query text and sort code survive.
    pub fn reset_all(&self) -> Self {
        Self {
            query: self.query.clone(),
            sort: self.sort.clone(),
            ..Self::new()
        }
    }

    /// URL parameters of a link to `page` of the current selection.
    pub fn page_link(&self, page: u32, profile: &PageProfile) -> QueryParams {
        self.with_page(page).to_query(profile)
    }

    /// Join a facet's buckets with the selection.
    pub fn facet_view(&self, facet: &Facet) -> Vec<FacetCountView> {
        let field = facet.field();
        facet
            .counts()
            .iter()
            .map(|count| FacetCountView {
                label: count.label.clone(),
                count: count.count,
                selected: self.is_bucket_selected(field, count),
            })
            .collect()
    }

    fn is_bucket_selected(&self, field: &str, count: &FacetCount) -> bool {
        if self.is_checked(field, &count.label) {
            return true;
        }
        match (self.ranges.get(field), count.range()) {
            (Some(selected), Some(bucket)) => *selected == bucket,
            _ => false,
        }
    }

    /// Copy with the page reset to 1.
    fn restart(&self) -> Self {
        Self {
            page: 1,
            ..self.clone()
        }
    }

    /// Free-text query.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Selected sort code, if one was picked.
    pub fn sort_code(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Current page.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Checked values of a multi-choice field.
    pub fn checked(&self, field: &str) -> impl Iterator<Item = &str> {
        self.checked
            .get(field)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// Whether `value` is checked.
    pub fn is_checked(&self, field: &str, value: &str) -> bool {
        self.checked
            .get(field)
            .map_or(false, |values| values.contains(value))
    }

    /// Selected range of a range field.
    pub fn selected_range(&self, field: &str) -> Option<NumericRange> {
        self.ranges.get(field).copied()
    }

    /// Value of a toggle.
    pub fn toggle(&self, field: &str) -> Option<bool> {
        self.toggles.get(field).copied()
    }

    /// Value of a scalar parameter.
    pub fn scalar(&self, field: &str) -> Option<&str> {
        self.scalars.get(field).map(String::as_str)
    }

    /// Whether any filter is active.
    pub fn has_filters(&self) -> bool {
        !(self.checked.is_empty()
            && self.ranges.is_empty()
            && self.toggles.is_empty()
            && self.scalars.is_empty())
    }
}
