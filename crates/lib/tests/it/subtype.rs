//! Tests for the type-keyed subtype registries and both registration paths.

use relmap::model::DocumentKind;
use relmap::subtype::SubtypeNode;
use relmap::{Catalog, ClassBuilder, Classlike, EntityToken, SubclassBuilder, Subtype};

use crate::helpers::{Contractor, Employee, Manager};

#[test]
fn subclass_renders_into_the_parent_document() {
    let mut mapping = ClassBuilder::<Employee>::new();
    mapping.id(Employee::ID);
    mapping.discriminate_on_column("kind");
    mapping.subclass::<Manager>("manager", |sub| {
        sub.map(Manager::BONUS).column("bonus").not_null();
    });

    let doc = mapping.document();
    assert_eq!(doc.discriminator().unwrap().column, "kind");

    let manager = doc.subclass("Manager").unwrap();
    assert_eq!(manager.discriminator_value, "manager");
    assert_eq!(manager.document.kind(), DocumentKind::Subclass);
    assert_eq!(manager.document.body().property("Bonus").unwrap().column, "bonus");
}

#[test]
fn re_registration_replaces_and_starts_clean() {
    let mut mapping = ClassBuilder::<Employee>::new();
    mapping.subclass::<Manager>("m1", |sub| {
        sub.map(Manager::BONUS).column("b1");
    });
    mapping.subclass::<Manager>("m2", |_sub| {});

    let doc = mapping.document();
    assert_eq!(doc.subclasses().count(), 1);

    // Only the second registration survives, and it did not inherit the
    // first registration's declarations.
    let manager = doc.subclass("Manager").unwrap();
    assert_eq!(manager.discriminator_value, "m2");
    assert!(manager.document.body().property("Bonus").is_none());
}

#[test]
fn one_strategy_per_type() {
    let mut mapping = ClassBuilder::<Employee>::new();
    mapping.subclass::<Manager>("manager", |_sub| {});
    mapping.joined_subclass::<Manager>("employee_id", |sub| {
        sub.map(Manager::BONUS);
    });

    assert!(mapping.get_subclass("Manager").is_none());
    assert!(mapping.get_joined_subclass("Manager").is_some());

    let doc = mapping.document();
    assert!(doc.subclass("Manager").is_none());
    let joined = doc.joined_subclass("Manager").unwrap();
    assert_eq!(joined.key_column, "employee_id");
    assert_eq!(joined.document.kind(), DocumentKind::JoinedSubclass);
}

#[test]
fn static_and_dynamic_paths_are_equivalent() {
    let mut static_mapping = ClassBuilder::<Employee>::new();
    static_mapping.subclass::<Manager>("manager", |sub| {
        sub.map(Manager::BONUS).column("bonus");
    });

    let mut dynamic_mapping = ClassBuilder::<Employee>::new();
    let handle = dynamic_mapping.subclass_of(EntityToken::of::<Manager>(), "manager");
    let typed = handle
        .as_any_mut()
        .downcast_mut::<SubclassBuilder<Manager>>()
        .expect("dynamic path stores the same builder type");
    typed.map(Manager::BONUS).column("bonus");

    let static_doc = static_mapping.document();
    let dynamic_doc = dynamic_mapping.document();
    assert_eq!(static_doc, dynamic_doc);

    // Node content is equal down to the serialized representation.
    assert_eq!(
        serde_json::to_value(&static_doc).unwrap(),
        serde_json::to_value(&dynamic_doc).unwrap()
    );
}

#[test]
fn dynamic_handle_exposes_the_classlike_capability() {
    let mut mapping = ClassBuilder::<Employee>::new();
    let handle = mapping.subclass_of(EntityToken::of::<Manager>(), "manager");

    assert_eq!(handle.entity_name(), "Manager");
    assert!(handle.properties_mapped().is_empty());
    handle.discriminate_on_column("manager_kind");

    match handle.node() {
        SubtypeNode::Subclass(node) => {
            assert_eq!(node.entity, "Manager");
            assert_eq!(node.document.discriminator().unwrap().column, "manager_kind");
        }
        SubtypeNode::Joined(_) => panic!("discriminator registration produced a joined node"),
    }
}

#[test]
fn catalog_resolves_registered_names() {
    let mut catalog = Catalog::new();
    catalog.register::<Manager>().register::<Contractor>();

    let token = catalog.token("Manager").unwrap();
    assert!(token.is::<Manager>());
    assert!(!token.is::<Contractor>());
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Contractor", "Manager"]);

    let mut mapping = ClassBuilder::<Employee>::new();
    mapping.joined_subclass_of(token, "employee_id");
    assert!(mapping.get_joined_subclass("Manager").is_some());
}

#[test]
fn unknown_entity_is_a_configuration_error() {
    let catalog = Catalog::new();

    let err = catalog.token("Ghost").unwrap_err();
    assert!(err.is_unknown_entity());
    assert_eq!(err.module(), "subtype");
    assert!(err.to_string().contains("Ghost"));
}

#[test]
fn subtype_hierarchies_nest() {
    let mut mapping = ClassBuilder::<Employee>::new();
    mapping.subclass::<Manager>("manager", |manager| {
        manager.subclass::<Contractor>("contracting_manager", |contractor| {
            contractor.map(Contractor::DAY_RATE).column("day_rate");
        });
    });

    let doc = mapping.document();
    let nested = doc.subclass("Manager").unwrap().document.subclass("Contractor").unwrap();
    assert_eq!(nested.discriminator_value, "contracting_manager");
    assert_eq!(nested.document.body().property("DayRate").unwrap().column, "day_rate");
}

#[test]
fn identity_declarations_do_not_render_into_subtype_documents() {
    let mut mapping = ClassBuilder::<Employee>::new();
    mapping.subclass::<Manager>("manager", |sub| {
        // Consumed in the subtype's ledger, but subtype documents inherit
        // identity from their root.
        sub.id(Employee::ID);
        sub.map(Manager::BONUS);
    });

    let doc = mapping.document();
    let manager = doc.subclass("Manager").unwrap();
    assert!(manager.document.id().is_none());
    assert!(manager.document.body().property("Bonus").is_some());
}

#[test]
fn subtype_ledger_is_independent_of_the_root_ledger() {
    let mut mapping = ClassBuilder::<Employee>::new();
    mapping.map(Employee::NAME);
    let sub = mapping.subclass::<Manager>("manager", |sub| {
        sub.map(Manager::BONUS);
    });

    assert_eq!(sub.properties_mapped(), vec!["Bonus".to_string()]);
    assert!(!sub.is_mapped("Name"));
    assert!(mapping.is_mapped("Name"));
    assert!(!mapping.is_mapped("Bonus"));
}
