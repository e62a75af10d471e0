use axum_petmarket_api::category_tree::{
    CategoryRecord, ParentRef, children_of, find_root_by_slug, flatten, roots,
};
use uuid::Uuid;

fn record(name: &str, slug: &str, parent: Option<ParentRef>) -> CategoryRecord {
    CategoryRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        parent,
    }
}

fn forest() -> (Vec<CategoryRecord>, Uuid, Uuid) {
    let pets = record("Pets", "pets", None);
    let accessories = record("Accessories", "accessories", None);
    let pets_id = pets.id;
    let accessories_id = accessories.id;

    // One child referencing its parent by raw id, one by expanded object.
    let dogs = record("Dogs", "dogs", Some(ParentRef::Id(pets_id)));
    let cats = record("Cats", "cats", Some(ParentRef::Expanded { id: pets_id }));
    let corgi = record("Corgi", "corgi", Some(ParentRef::Id(dogs.id)));
    let food = record("Food", "food", Some(ParentRef::Id(accessories_id)));

    (
        vec![pets, accessories, dogs, cats, corgi, food],
        pets_id,
        accessories_id,
    )
}

#[test]
fn children_partition_matches_both_parent_forms() {
    let (all, pets_id, accessories_id) = forest();

    let pet_children: Vec<&str> = children_of(&all, pets_id)
        .iter()
        .map(|c| c.slug.as_str())
        .collect();
    assert_eq!(pet_children, vec!["dogs", "cats"]);

    let accessory_children: Vec<&str> = children_of(&all, accessories_id)
        .iter()
        .map(|c| c.slug.as_str())
        .collect();
    assert_eq!(accessory_children, vec!["food"]);
}

#[test]
fn children_of_unknown_parent_is_empty() {
    let (all, _, _) = forest();
    assert!(children_of(&all, Uuid::new_v4()).is_empty());
}

#[test]
fn roots_are_nodes_without_parent() {
    let (all, _, _) = forest();
    let slugs: Vec<&str> = roots(&all).iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec!["pets", "accessories"]);
}

#[test]
fn find_root_by_slug_falls_back_to_none() {
    let (all, pets_id, _) = forest();
    assert_eq!(find_root_by_slug(&all, "pets").map(|c| c.id), Some(pets_id));
    assert!(find_root_by_slug(&all, "plants").is_none());
    // A non-root never matches even when the slug exists.
    assert!(find_root_by_slug(&all, "dogs").is_none());
}

#[test]
fn flatten_is_preorder_with_depths() {
    let (all, _, _) = forest();
    let rows = flatten(&all);

    let got: Vec<(usize, &str)> = rows
        .iter()
        .map(|row| (row.depth, row.slug.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            (0, "pets"),
            (1, "dogs"),
            (2, "corgi"),
            (1, "cats"),
            (0, "accessories"),
            (1, "food"),
        ]
    );
}

#[test]
fn flatten_skips_nodes_with_missing_parent() {
    let (mut all, _, _) = forest();
    // Points at a parent id that was never fetched.
    all.push(record("Orphan", "orphan", Some(ParentRef::Id(Uuid::new_v4()))));

    let rows = flatten(&all);
    assert!(rows.iter().all(|row| row.slug != "orphan"));
}

#[test]
fn flatten_terminates_on_a_parent_cycle() {
    let mut a = record("A", "a", None);
    let b = record("B", "b", Some(ParentRef::Id(a.id)));
    // Malformed data: the root also claims B as its parent.
    a.parent = Some(ParentRef::Id(b.id));
    let c = record("C", "c", None);

    let rows = flatten(&[a, b, c]);
    // Only the well-formed root survives; the cycle is dropped, not recursed.
    let slugs: Vec<&str> = rows.iter().map(|row| row.slug.as_str()).collect();
    assert_eq!(slugs, vec!["c"]);
}

#[test]
fn flatten_emits_each_node_at_most_once() {
    let root = record("Root", "root", None);
    let child = record("Child", "child", Some(ParentRef::Id(root.id)));
    let grandchild = record(
        "Grandchild",
        "grandchild",
        Some(ParentRef::Expanded { id: child.id }),
    );
    let all = vec![root, child, grandchild];

    let rows = flatten(&all);
    assert_eq!(rows.len(), all.len());
    let mut ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), all.len());
}
