//! Property tests for the URL round-trip laws.
//!
//! - Range labels: encode(decode(label)) = label
//! - Selections: decode(encode(state)) = state, through the full
//!   percent-encoded query string, for arbitrary values and sort codes
//! - Sort resolution is never empty
//! - Page windows always contain the current page and start at page 1

use facetnav_query::prelude::*;
use proptest::prelude::*;

fn bound() -> impl Strategy<Value = Option<i32>> {
    prop_oneof![Just(None), (-5000i32..5000).prop_map(Some)]
}

fn range() -> impl Strategy<Value = NumericRange> {
    (bound(), bound())
        .prop_filter("unbounded ranges are never emitted", |(from, to)| {
            from.is_some() || to.is_some()
        })
        .prop_map(|(from, to)| NumericRange::new(from.map(f64::from), to.map(f64::from)))
}

fn label(from: Option<i32>, to: Option<i32>) -> String {
    format!(
        "{}~{}",
        from.map(|v| v.to_string()).unwrap_or_default(),
        to.map(|v| v.to_string()).unwrap_or_default()
    )
}

#[derive(Debug, Clone)]
struct Selection {
    query: Option<String>,
    categories: Vec<String>,
    colors: Vec<String>,
    difficulty: Option<NumericRange>,
    experimental: Option<bool>,
    exclude_solved: Option<bool>,
    user_id: Option<String>,
    sort: Option<String>,
    page: u32,
}

fn selection() -> impl Strategy<Value = Selection> {
    (
        proptest::option::of("[a-z][a-z &+%]{0,10}"),
        proptest::collection::vec("[ -~]{0,12}", 0..4),
        proptest::collection::vec("[ -~]{0,8}", 0..3),
        proptest::option::of(range()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of("[ -~]{0,8}"),
        proptest::option::of("[0-9]{1,2}"),
        1u32..200,
    )
        .prop_map(
            |(query, categories, colors, difficulty, experimental, exclude_solved, user_id, sort, page)| {
                Selection {
                    query,
                    categories,
                    colors,
                    difficulty,
                    experimental,
                    exclude_solved,
                    user_id,
                    sort,
                    page,
                }
            },
        )
}

fn apply(selection: &Selection, profile: &PageProfile) -> NavigationState {
    let mut state = NavigationState::new().with_query_text(selection.query.as_deref(), profile);
    for value in &selection.categories {
        state = state.set_checked("category", value, true, profile);
    }
    for value in &selection.colors {
        state = state.set_checked("color", value, true, profile);
    }
    if let Some(range) = selection.difficulty {
        state = state.select_range("difficulty", range, profile);
    }
    if let Some(value) = selection.experimental {
        state = state.select_toggle("experimental", value, profile);
    }
    if let Some(value) = selection.exclude_solved {
        state = state.select_toggle("excludeSolved", value, profile);
    }
    state = state.with_scalar("userId", selection.user_id.as_deref(), profile);
    if let Some(code) = &selection.sort {
        state = state.with_sort(Some(code), profile);
    }
    state.with_page(selection.page)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn range_label_round_trip(from in bound(), to in bound()) {
        prop_assume!(from.is_some() || to.is_some());
        let label = label(from, to);

        let decoded = NumericRange::decode_label(&label);
        prop_assert!(decoded.is_some(), "label {} did not decode", label);
        prop_assert_eq!(decoded.unwrap().encode_label(), label);
    }

    #[test]
    fn range_keys_round_trip(range in range()) {
        let keys = RangeKeys::for_field("rating");
        let mut params = QueryParams::new();
        range.write_keys(&mut params, &keys);

        let reparsed = QueryParams::parse(&params.to_query_string());
        prop_assert_eq!(NumericRange::decode_keys(&reparsed, &keys), Some(range));
    }

    #[test]
    fn selection_round_trip(selection in selection()) {
        let profile = PageProfile::problem();
        let state = apply(&selection, &profile);

        let url = state.to_query_string(&profile);
        let decoded = NavigationState::from_query(&QueryParams::parse(&url), &profile);
        prop_assert_eq!(&decoded, &state, "url: {}", url);

        // Rebuilding is stable.
        prop_assert_eq!(decoded.to_query_string(&profile), url);
    }

    #[test]
    fn selected_values_are_kept(selection in selection()) {
        let profile = PageProfile::problem();
        let state = apply(&selection, &profile);

        for value in selection.categories.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
            prop_assert!(state.is_checked("category", value), "lost category {:?}", value);
        }
        for value in selection
            .colors
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && !v.contains(','))
        {
            prop_assert!(state.is_checked("color", value), "lost color {:?}", value);
        }
        if let Some(code) = selection.sort.as_deref().filter(|c| profile.sorts.contains(c)) {
            prop_assert_eq!(state.sort_code(), Some(code));
        }
        prop_assert!(state.sort_code().map_or(true, |c| profile.sorts.contains(c)));
        prop_assert_ne!(state.toggle("excludeSolved"), Some(false));
    }

    #[test]
    fn unchecking_everything_removes_keys(selection in selection()) {
        let profile = PageProfile::problem();
        let mut state = apply(&selection, &profile);
        for value in &selection.categories {
            state = state.set_checked("category", value, false, &profile);
        }
        let params = state.to_query(&profile);
        prop_assert!(!params.contains_key("category"));
    }

    #[test]
    fn request_never_has_empty_filters(selection in selection()) {
        let profile = PageProfile::problem();
        let params = apply(&selection, &profile).to_query(&profile);
        let request = SearchRequest::build(&params, &profile);

        prop_assert!(request.filters.iter().all(|f| !f.is_empty()));
        prop_assert!(!request.sort.is_empty());
        prop_assert_eq!(request.page, selection.page);
    }

    #[test]
    fn sort_resolution_is_never_empty(code in proptest::option::of(".{0,6}")) {
        for kind in PageKind::ALL {
            let profile = kind.profile();
            prop_assert!(!profile.sorts.resolve(code.as_deref()).is_empty());
        }
    }

    #[test]
    fn window_contains_current_page(
        current in 1u32..500,
        total in proptest::option::of(1u32..500),
        width in 2u32..12,
    ) {
        let w = PageWindow::new(current, total, width);
        let pages: Vec<u32> = w.links.iter().filter_map(PageLink::page).collect();

        prop_assert_eq!(pages.first().copied(), Some(1));
        prop_assert!(pages.contains(&w.current));
        prop_assert!(pages.windows(2).all(|p| p[0] < p[1]), "pages not increasing: {:?}", pages);
        if let Some(total) = total {
            prop_assert!(pages.iter().all(|&p| p <= total));
            prop_assert_eq!(w.links.last(), Some(&PageLink::Page(total)));
            prop_assert_eq!(w.has_trailing_gap, w.links.iter().rev().nth(1) == Some(&PageLink::Gap));
        } else {
            prop_assert!(w.has_trailing_gap);
            prop_assert_eq!(w.links.last(), Some(&PageLink::Gap));
        }
    }
}
