use projectdesk_api::{
    encode, Query, QueryKey, SortDescriptor, SortOrder, TableQueryOptions, WireQueryParams,
};
use serde_json::{json, Value};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://example.com/api/projects").unwrap()
}

#[test]
fn default_options_encode_first_page() {
    let wire = encode(&TableQueryOptions::default());
    assert_eq!(wire.page, 1);
    assert_eq!(wire.page_size, 10);
    assert_eq!(wire.sort_by, None);
    assert_eq!(wire.sort_order, None);
    assert_eq!(wire.search, None);
    assert!(wire.filters.is_empty());
}

#[test]
fn page_index_maps_to_one_based_page() {
    for page_index in (0..500).step_by(7) {
        let options = TableQueryOptions::default().with_page_index(page_index);
        assert_eq!(encode(&options).page, page_index + 1);
    }
}

#[test]
fn blank_filter_values_never_reach_the_wire() {
    let blanks = [Value::Null, json!(""), json!([]), json!([null, ""])];
    for blank in blanks {
        let options = TableQueryOptions::default()
            .with_filter("status", blank.clone())
            .with_filter("kind", "thesis");
        let wire = encode(&options);
        assert!(!wire.filters.contains_key("status"), "{blank} leaked");
        assert_eq!(wire.filters.len(), 1);
    }
}

#[test]
fn search_is_not_trimmed() {
    let wire = encode(&TableQueryOptions::default().with_search(" sensor "));
    assert_eq!(wire.search.as_deref(), Some(" sensor "));
}

#[test]
fn url_round_trip_single_sort() {
    for (desc, order) in [(false, SortOrder::Asc), (true, SortOrder::Desc)] {
        let options = TableQueryOptions::default()
            .with_page_index(3)
            .with_page_size(50)
            .with_sort(SortDescriptor {
                id: "updatedAt".to_string(),
                desc,
            });
        let url = encode(&options).add_to_url(&base_url());
        let back = WireQueryParams::from_url(&url);
        assert_eq!(back.page, 4);
        assert_eq!(back.page_size, 50);
        assert_eq!(back.sort_by.as_deref(), Some("updatedAt"));
        assert_eq!(back.sort_order, Some(order));
    }
}

#[test]
fn filters_survive_url_round_trip() {
    let options = TableQueryOptions::default()
        .with_filter("status", "in review")
        .with_filter("period", 3);
    let wire = encode(&options);
    let back = WireQueryParams::from_url(&wire.add_to_url(&base_url()));
    assert_eq!(back, wire);
}

#[test]
fn query_key_changes_with_every_state_slice() {
    let base = TableQueryOptions::default();
    let key = |o: &TableQueryOptions| QueryKey::new("projects", encode(o)).to_string();
    let k0 = key(&base);
    assert_ne!(k0, key(&base.clone().with_page_index(1)));
    assert_ne!(k0, key(&base.clone().with_page_size(25)));
    assert_ne!(k0, key(&base.clone().with_sort(SortDescriptor::asc("title"))));
    assert_ne!(k0, key(&base.clone().with_filter("status", "approved")));
    assert_ne!(k0, key(&base.clone().with_search("mesh")));
    assert_eq!(k0, key(&base.clone()));
}
