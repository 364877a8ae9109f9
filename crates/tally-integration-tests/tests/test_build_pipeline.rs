//! End-to-end tests for the catalog build pipeline: registration-time
//! duplicate rejection, fail-slow compile aggregation, the compile gate,
//! link-phase dangling references, and the shape of the resulting stores.

use tally_catalog::{BuildError, CatalogCompiler, EntryKind, LinkError, RegistryError};
use tally_core::CatalogKey;

fn key(text: &str) -> CatalogKey {
    CatalogKey::new(text).unwrap()
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn registering_gold_twice_fails_before_build() {
    let mut compiler = CatalogCompiler::new();
    compiler.register_currency("gold").unwrap();

    // Even a different kind must fail: the namespace is shared.
    let err = compiler.register_item("gold").unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateKey {
            key: "gold".to_string()
        }
    );

    // The first registration is unaffected and still builds.
    let built = compiler.build().unwrap();
    assert!(built.catalog.find(EntryKind::Currency, "gold").is_some());
}

// ---------------------------------------------------------------------------
// Kind-checked lookup
// ---------------------------------------------------------------------------

#[test]
fn find_returns_the_registered_kind_and_no_other() {
    let mut compiler = CatalogCompiler::new();
    compiler.register_currency("gold").unwrap();
    let built = compiler.build().unwrap();

    assert!(built.catalog.find(EntryKind::Currency, "gold").is_some());
    assert!(built.catalog.find(EntryKind::Item, "gold").is_none());
    assert!(built
        .catalog
        .find(EntryKind::VirtualTransaction, "gold")
        .is_none());
    assert!(built
        .catalog
        .find(EntryKind::StoreTransaction, "gold")
        .is_none());
}

// ---------------------------------------------------------------------------
// Fail-slow compile aggregation
// ---------------------------------------------------------------------------

#[test]
fn one_defective_descriptor_yields_exactly_one_cause() {
    let mut compiler = CatalogCompiler::new();
    compiler.register_currency("gold").unwrap();
    compiler
        .register_currency("gems")
        .unwrap()
        .set_initial_balance(-1);

    let err = compiler.build().unwrap_err();
    let BuildError::Compile(causes) = err else {
        panic!("expected compile failure, got {err:?}");
    };
    assert_eq!(causes.len(), 1);
}

#[test]
fn n_defective_descriptors_yield_exactly_n_causes() {
    let mut compiler = CatalogCompiler::new();
    // M = 6 descriptors, N = 3 defective.
    compiler.register_currency("gold").unwrap();
    compiler.register_item("sword").unwrap();
    compiler.register_item("shield").unwrap();
    compiler
        .register_currency("gems")
        .unwrap()
        .set_initial_balance(-1);
    compiler
        .register_currency("dust")
        .unwrap()
        .set_initial_balance(10)
        .set_maximum_balance(5);
    compiler
        .register_store_transaction("pack")
        .unwrap()
        .add_payout(key("gold"), 5); // product id missing

    let err = compiler.build().unwrap_err();
    assert_eq!(err.compile_errors().map(|causes| causes.len()), Some(3));
}

#[test]
fn no_store_is_observable_after_a_failed_build() {
    let mut compiler = CatalogCompiler::new();
    compiler
        .register_currency("gems")
        .unwrap()
        .set_initial_balance(-1);
    // build() consumes the compiler; a failed build returns only the
    // aggregate error, so there is nothing store-shaped to observe.
    let result = compiler.build();
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Compile gate and link phase
// ---------------------------------------------------------------------------

#[test]
fn dangling_sword_payout_is_a_named_link_cause() {
    let mut compiler = CatalogCompiler::new();
    compiler.register_currency("gold").unwrap();
    compiler
        .register_virtual_transaction("buy-sword")
        .unwrap()
        .add_cost(key("gold"), 50)
        .add_payout(key("sword"), 1);

    let err = compiler.build().unwrap_err();
    let causes = err.link_errors().expect("link failure");
    assert!(causes.iter().any(|cause| matches!(
        cause,
        LinkError::DanglingReference { target, .. } if target == "sword"
    )));
}

#[test]
fn compile_failure_suppresses_link_reporting_entirely() {
    let mut compiler = CatalogCompiler::new();
    // Defective currency AND a transaction dangling into a key that was
    // never registered: only the compile cause may surface this attempt.
    compiler
        .register_currency("gems")
        .unwrap()
        .set_initial_balance(-1);
    compiler
        .register_virtual_transaction("buy")
        .unwrap()
        .add_payout(key("missing"), 1);

    let err = compiler.build().unwrap_err();
    assert!(err.compile_errors().is_some());
    assert!(err.link_errors().is_none());
    assert_eq!(err.causes().len(), 1);
}

// ---------------------------------------------------------------------------
// Tag queries
// ---------------------------------------------------------------------------

#[test]
fn find_by_tag_returns_exactly_the_tagged_set() {
    let mut compiler = CatalogCompiler::new();
    compiler.get_or_create_tag("rare").unwrap();
    compiler.register_item("a").unwrap();
    compiler
        .register_item("b")
        .unwrap()
        .add_tag(key("rare"));
    let built = compiler.build().unwrap();

    let rare = built.tags.find("rare").unwrap();
    let mut target = Vec::new();
    let count = built
        .catalog
        .find_by_tag_into(EntryKind::Item, rare, &mut target, true);
    assert_eq!(count, 1);
    assert_eq!(target.len(), 1);
    assert_eq!(target[0].key().as_str(), "b");

    // A tag attached to zero entries yields an empty result, not an error.
    let count = built
        .catalog
        .find_by_tag_into(EntryKind::Currency, rare, &mut target, true);
    assert_eq!(count, 0);
    assert!(target.is_empty());
}

#[test]
fn get_all_into_count_matches_contents() {
    let mut compiler = CatalogCompiler::new();
    compiler.register_currency("gold").unwrap();
    compiler.register_currency("gems").unwrap();
    compiler.register_item("sword").unwrap();
    let built = compiler.build().unwrap();

    let mut target = vec![built.catalog.find_any("sword").unwrap().clone()];
    let count = built
        .catalog
        .get_all_into(EntryKind::Currency, &mut target, true);
    assert_eq!(count, 2);
    assert_eq!(target.len(), count);
    assert!(target.iter().all(|e| e.kind() == EntryKind::Currency));
}
