use axum_petmarket_api::routes::params::{ListingSelection, Pagination, PetListQuery};
use uuid::Uuid;

fn query_with_category(category: Option<String>) -> PetListQuery {
    PetListQuery {
        pagination: Pagination {
            page: None,
            per_page: None,
        },
        q: None,
        category,
        min_price: None,
        max_price: None,
        gender: None,
        city: None,
        sort: None,
    }
}

#[test]
fn pagination_normalizes_out_of_range_input() {
    let pagination = Pagination {
        page: Some(0),
        per_page: Some(1000),
    };
    assert_eq!(pagination.normalize(), (1, 100, 0));

    let defaults = Pagination {
        page: None,
        per_page: None,
    };
    assert_eq!(defaults.normalize(), (1, 20, 0));

    let third_page = Pagination {
        page: Some(3),
        per_page: Some(10),
    };
    assert_eq!(third_page.normalize(), (3, 10, 20));
}

#[test]
fn category_param_parses_comma_joined_ids() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let query = query_with_category(Some(format!("{a},{b}")));
    assert_eq!(query.category_ids(), vec![a, b]);

    let single = query_with_category(Some(a.to_string()));
    assert_eq!(single.category_ids(), vec![a]);

    let sloppy = query_with_category(Some(format!(" {a} , not-a-uuid ,")));
    assert_eq!(sloppy.category_ids(), vec![a]);

    assert!(query_with_category(None).category_ids().is_empty());
}

#[test]
fn details_take_precedence_over_parent() {
    let parent = Uuid::new_v4();
    let detail_a = Uuid::new_v4();
    let detail_b = Uuid::new_v4();

    let mut selection = ListingSelection::default();
    selection.select_parent(Some(parent));
    assert_eq!(selection.category_param(), Some(parent.to_string()));

    selection.toggle_detail(detail_a);
    selection.toggle_detail(detail_b);
    assert_eq!(
        selection.category_param(),
        Some(format!("{detail_a},{detail_b}"))
    );

    // Untoggling the last detail falls back to the parent id.
    selection.toggle_detail(detail_a);
    selection.toggle_detail(detail_b);
    assert_eq!(selection.category_param(), Some(parent.to_string()));
}

#[test]
fn switching_parent_clears_details_and_resets_page() {
    let first_parent = Uuid::new_v4();
    let second_parent = Uuid::new_v4();
    let detail = Uuid::new_v4();

    let mut selection = ListingSelection::default();
    selection.select_parent(Some(first_parent));
    selection.toggle_detail(detail);
    selection.set_page(4);

    selection.select_parent(Some(second_parent));
    assert!(selection.details.is_empty());
    assert_eq!(selection.page, 1);
    assert_eq!(selection.category_param(), Some(second_parent.to_string()));
}

#[test]
fn toggling_a_detail_resets_page() {
    let mut selection = ListingSelection::default();
    selection.set_page(7);
    selection.toggle_detail(Uuid::new_v4());
    assert_eq!(selection.page, 1);
}

#[test]
fn selection_round_trips_through_the_query_contract() {
    let detail_a = Uuid::new_v4();
    let detail_b = Uuid::new_v4();

    let mut selection = ListingSelection::default();
    selection.select_parent(Some(Uuid::new_v4()));
    selection.toggle_detail(detail_a);
    selection.toggle_detail(detail_b);
    selection.set_page(2);

    let query = selection.to_query();
    let category = query
        .iter()
        .find(|(key, _)| *key == "category")
        .map(|(_, value)| value.clone());
    assert_eq!(category, Some(format!("{detail_a},{detail_b}")));
    assert!(query.contains(&("page", "2".to_string())));

    // The server parses back exactly the detail set.
    let parsed = query_with_category(category);
    assert_eq!(parsed.category_ids(), vec![detail_a, detail_b]);
}
