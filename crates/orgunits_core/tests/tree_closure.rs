use orgunits_core::db::open_db_in_memory;
use orgunits_core::{
    Organization, OrganizationService, OrganizationStore, SqliteOrganizationStore, TreeError,
    TreeQueryEngine, TreeStrategy,
};
use std::collections::HashSet;
use uuid::Uuid;

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn insert(store: &SqliteOrganizationStore<'_>, name: &str, code: &str, parent: Option<Uuid>) -> Uuid {
    let org = Organization::new(name, code, parent);
    store.create_org(&org).unwrap()
}

/// Chain fixture from the reference scenario: A is B's parent, B is C's.
fn chain(store: &SqliteOrganizationStore<'_>) -> (Uuid, Uuid, Uuid) {
    let a = insert(store, "Alpha", "A", None);
    let b = insert(store, "Beta", "B", Some(a));
    let c = insert(store, "Gamma", "C", Some(b));
    (a, b, c)
}

#[test]
fn sqlite_store_defaults_to_recursive_strategy() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let engine = TreeQueryEngine::new(&store);
    assert_eq!(engine.strategy(), TreeStrategy::Recursive);
}

#[test]
fn chain_closures_match_reference_scenario() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();
    let (a, b, c) = chain(&store);
    let engine = TreeQueryEngine::new(&store);

    assert_eq!(engine.descendants_of(a).unwrap(), HashSet::from([a, b, c]));
    assert_eq!(engine.ancestors_of(c).unwrap(), HashSet::from([a, b, c]));
    assert_eq!(engine.ancestors_of(a).unwrap(), HashSet::from([a]));
    assert_eq!(engine.descendants_of(c).unwrap(), HashSet::from([c]));
}

#[test]
fn facade_excludes_self_and_orders_by_name() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();
    let (a, _b, c) = chain(&store);
    let service = OrganizationService::new(store);

    let org_a = service.get_org(a).unwrap().unwrap();
    let children = service.children(&org_a).unwrap();
    let child_names: Vec<_> = children.iter().map(|org| org.name.as_str()).collect();
    assert_eq!(child_names, ["Beta", "Gamma"]);
    assert!(children.iter().all(|org| org.id != a));

    let org_c = service.get_org(c).unwrap().unwrap();
    let parents = service.parents(&org_c).unwrap();
    let parent_names: Vec<_> = parents.iter().map(|org| org.name.as_str()).collect();
    assert_eq!(parent_names, ["Alpha", "Beta"]);
    assert!(parents.iter().all(|org| org.id != c));

    assert!(service.parents(&org_a).unwrap().is_empty());
    assert!(service.children(&org_c).unwrap().is_empty());
}

#[test]
fn sibling_subtrees_stay_disjoint() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let a = insert(&store, "Root", "ROOT", None);
    let b1 = insert(&store, "Left", "B1", Some(a));
    let b2 = insert(&store, "Right", "B2", Some(a));
    let engine = TreeQueryEngine::new(&store);

    assert_eq!(engine.descendants_of(a).unwrap(), HashSet::from([a, b1, b2]));

    let left = engine.descendants_of(b1).unwrap();
    assert_eq!(left, HashSet::from([b1]));
    assert!(!left.contains(&b2));
}

#[test]
fn strategies_are_set_equal_on_a_mixed_forest() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    // Two trees: one three levels deep with branching, one a lone root.
    let hq = insert(&store, "HQ", "HQ", None);
    let ops = insert(&store, "Operations", "OPS", Some(hq));
    let sales = insert(&store, "Sales", "SALES", Some(hq));
    let north = insert(&store, "North region", "OPS-N", Some(ops));
    let south = insert(&store, "South region", "OPS-S", Some(ops));
    let depot = insert(&store, "Depot", "OPS-N-D", Some(north));
    let lab = insert(&store, "Lab", "LAB", None);

    let iterative = TreeQueryEngine::with_strategy(&store, TreeStrategy::Iterative);
    let recursive = TreeQueryEngine::with_strategy(&store, TreeStrategy::Recursive);

    for id in [hq, ops, sales, north, south, depot, lab] {
        assert_eq!(
            iterative.descendants_of(id).unwrap(),
            recursive.descendants_of(id).unwrap(),
            "downward closure of {id} diverged between strategies"
        );
        assert_eq!(
            iterative.ancestors_of(id).unwrap(),
            recursive.ancestors_of(id).unwrap(),
            "upward closure of {id} diverged between strategies"
        );
    }

    assert_eq!(
        recursive.descendants_of(hq).unwrap(),
        HashSet::from([hq, ops, sales, north, south, depot])
    );
    assert_eq!(
        recursive.ancestors_of(depot).unwrap(),
        HashSet::from([hq, ops, north, depot])
    );
}

#[test]
fn missing_id_is_singleton_downward_and_not_found_upward() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();
    chain(&store);
    let ghost = Uuid::new_v4();

    for strategy in [TreeStrategy::Iterative, TreeStrategy::Recursive] {
        let engine = TreeQueryEngine::with_strategy(&store, strategy);

        let closure = engine.descendants_of(ghost).unwrap();
        assert_eq!(closure, HashSet::from([ghost]));

        let err = engine.ancestors_of(ghost).unwrap_err();
        assert!(matches!(err, TreeError::NotFound(id) if id == ghost));
    }
}

#[test]
fn facade_on_missing_record_errs_for_parents_and_empties_for_children() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();
    chain(&store);
    let service = OrganizationService::new(store);

    let never_persisted = Organization::new("Ghost", "GHOST", None);

    let err = service.parents(&never_persisted).unwrap_err();
    assert!(matches!(err, TreeError::NotFound(id) if id == never_persisted.id));

    let children = service.children(&never_persisted).unwrap();
    assert!(children.is_empty());
}

#[test]
fn repeated_traversals_are_idempotent() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();
    let (a, _b, c) = chain(&store);
    let engine = TreeQueryEngine::new(&store);

    assert_eq!(
        engine.descendants_of(a).unwrap(),
        engine.descendants_of(a).unwrap()
    );
    assert_eq!(
        engine.ancestors_of(c).unwrap(),
        engine.ancestors_of(c).unwrap()
    );
}

#[test]
fn facade_reflects_mutations_without_caching() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();
    let (a, b, _c) = chain(&store);
    let service = OrganizationService::new(store);

    let org_a = service.get_org(a).unwrap().unwrap();
    assert_eq!(service.children(&org_a).unwrap().len(), 2);

    // Reparent B to be a root; A loses its whole subtree.
    let mut org_b = service.get_org(b).unwrap().unwrap();
    org_b.parent_id = None;
    service.update_org(&org_b).unwrap();

    assert!(service.children(&org_a).unwrap().is_empty());
    assert_eq!(service.list_roots().unwrap().len(), 2);
}
