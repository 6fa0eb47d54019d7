//! Tests for the mapping-definition session: ledger, declarations and the
//! add-or-replace merge.

use relmap::model::nodes::{CollectionKind, IdentityNode, PropertyNode, ReferenceKind};
use relmap::testing::ModelTester;
use relmap::{ClassBuilder, Classlike, Document, Entity, RedefinitionPolicy};

use crate::helpers::{Address, Order, Person};

#[test]
fn explicit_declarations_and_ignore() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.id(Person::ID);
    mapping.map(Person::NAME).column("nm");
    mapping.ignore_property(Person::TEMP);

    let doc = mapping.document();

    assert!(doc.id().is_some());
    let name = doc.body().property("Name").unwrap();
    assert_eq!(name.column, "nm");

    // Ledger covers mapped and ignored names; the ignored one produced no node.
    assert_eq!(mapping.ledger().iter().collect::<Vec<_>>(), vec!["Id", "Name", "Temp"]);
    assert!(doc.body().property("Temp").is_none());
}

#[test]
fn last_declaration_wins_for_a_property() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.map(Person::NAME).column("first");
    mapping.map(Person::NAME).column("second");

    let doc = mapping.document();
    assert_eq!(doc.body().properties().count(), 1);
    assert_eq!(doc.body().property("Name").unwrap().column, "second");
}

#[test]
fn last_reference_declaration_wins() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.references::<Person>(Person::PARENT).column("parent_id");
    mapping.references::<Person>(Person::PARENT).column("owner_id");

    let doc = mapping.document();
    assert_eq!(doc.body().references().count(), 1);
    assert_eq!(doc.body().reference("Parent").unwrap().column.as_deref(), Some("owner_id"));
}

#[test]
fn one_to_one_displaces_many_to_one_for_same_property() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.references::<Person>(Person::PARENT).column("parent_id");
    mapping.has_one::<Person>(Person::PARENT);

    let doc = mapping.document();
    assert_eq!(doc.body().reference("Parent").unwrap().kind, ReferenceKind::OneToOne);
}

#[test]
fn merge_is_idempotent() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.id(Person::ID).column("person_id");
    mapping.version(Person::REVISION);
    mapping.map(Person::NAME).not_null();
    mapping.has_many::<Order>(Person::ORDERS).key_column("person_id");
    mapping.component(Person::ADDRESS, |address| {
        address.map(Address::CITY);
    });

    let once = mapping.document();

    let mut twice = Document::new("Person");
    mapping.alter_document(&mut twice);
    mapping.alter_document(&mut twice);

    assert_eq!(once, twice);
}

#[test]
fn merge_overwrites_a_partially_populated_target() {
    // Baseline state established by a different pass.
    let mut target = Document::new("Person");
    target.set_id(IdentityNode {
        name: "Id".into(),
        column: "legacy_id".into(),
        generator: None,
    });
    target.body_mut().add_or_replace_property(PropertyNode {
        name: "Name".into(),
        column: "legacy_name".into(),
        not_null: false,
        length: None,
        unique: false,
    });
    target.body_mut().add_or_replace_property(PropertyNode {
        name: "Shoe".into(),
        column: "shoe".into(),
        not_null: false,
        length: None,
        unique: false,
    });

    let mut mapping = ClassBuilder::<Person>::new();
    mapping.id(Person::ID).column("id");
    mapping.map(Person::NAME).column("nm");
    mapping.alter_document(&mut target);

    // Session values win; unrelated baseline content survives.
    assert_eq!(target.id().unwrap().column, "id");
    assert_eq!(target.body().property("Name").unwrap().column, "nm");
    assert!(target.body().property("Shoe").is_some());
}

#[test]
fn empty_session_is_a_no_op() {
    let mapping = ClassBuilder::<Person>::new();
    let mut target = Document::new("Person");
    let before = target.clone();

    mapping.alter_document(&mut target);
    assert_eq!(target, before);
}

#[test]
fn convention_pass_skips_consumed_properties() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.id(Person::ID);
    mapping.map(Person::NAME).column("nm");
    mapping.ignore_property(Person::TEMP);

    // Simulates the external convention engine: synthesize a default for
    // every property the ledger has not consumed.
    let mut synthesized = Vec::new();
    for property in Person::properties() {
        if !mapping.is_mapped(property.name()) {
            synthesized.push(property.name());
            mapping.map(*property);
        }
    }

    assert_eq!(synthesized, vec!["Parent", "Orders", "Address", "Revision"]);

    // A second pass finds nothing left to synthesize.
    let remaining: Vec<_> =
        Person::properties().iter().filter(|p| !mapping.is_mapped(p.name())).collect();
    assert!(remaining.is_empty());

    // The explicit declaration survived the convention pass untouched where it
    // came first; the synthesized default kept its own column.
    let doc = mapping.document();
    assert_eq!(doc.body().property("Name").unwrap().column, "nm");
    assert_eq!(doc.body().property("Parent").unwrap().column, "Parent");
}

#[test]
fn component_declarations_flow_through_the_session_ledger() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.component(Person::ADDRESS, |address| {
        address.map(Address::CITY).column("city");
        address.references::<Person>(Address::STREET);
    });

    // The component property and its nested declarations are all consumed.
    assert!(mapping.is_mapped("Address"));
    assert!(mapping.is_mapped("City"));
    assert!(mapping.is_mapped("Street"));

    let doc = mapping.document();
    let component = doc.body().component("Address").unwrap();
    assert!(!component.dynamic);
    assert_eq!(component.body.property("City").unwrap().column, "city");
    assert!(component.body.reference("Street").is_some());
}

#[test]
fn dynamic_component_is_flagged() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.dynamic_component(Person::ADDRESS, |address| {
        address.map(Address::CITY);
    });

    let doc = mapping.document();
    assert!(doc.body().component("Address").unwrap().dynamic);
}

#[test]
fn ignore_after_map_erases_the_node() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.map(Person::NAME).column("nm");
    mapping.ignore_property(Person::NAME);

    let doc = mapping.document();
    assert!(doc.body().property("Name").is_none());
    assert!(mapping.ledger().is_ignored("Name"));
}

#[test]
fn map_after_ignore_clears_the_mark() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.ignore_property(Person::NAME);
    mapping.map(Person::NAME).column("nm");

    let doc = mapping.document();
    assert!(doc.body().property("Name").is_some());
    assert!(!mapping.ledger().is_ignored("Name"));
}

#[test]
fn deny_policy_rejects_redefinition_at_build_time() {
    let mut mapping = ClassBuilder::<Person>::with_policy(RedefinitionPolicy::Deny);
    mapping.map(Person::NAME).column("first");
    mapping.map(Person::NAME).column("second");

    let err = mapping.build().unwrap_err();
    assert!(err.is_duplicate_definition());
    assert_eq!(err.module(), "builder");
    assert_eq!(mapping.redefinitions().len(), 1);
}

#[test]
fn replace_policy_never_errors() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.map(Person::NAME).column("first");
    mapping.map(Person::NAME).column("second");

    assert!(mapping.build().is_ok());
    assert_eq!(mapping.policy(), RedefinitionPolicy::Replace);
}

#[test]
fn auxiliary_declarations_render() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.version(Person::REVISION).column("rev");
    mapping.cache().read_only();
    mapping.join("person_details").key_column("person_id");
    mapping.any(Person::PARENT).identifier_column("parent_id").type_column("parent_type");

    let doc = mapping.document();
    assert_eq!(doc.version().unwrap().column, "rev");
    assert!(doc.cache().is_some());
    assert_eq!(doc.join("person_details").unwrap().key_column.as_deref(), Some("person_id"));
    assert_eq!(doc.body().any("Parent").unwrap().type_column, "parent_type");
}

#[test]
fn composite_id_consumes_each_key_property() {
    let mut mapping = ClassBuilder::<Order>::new();
    mapping.composite_id(|id| {
        id.key_property(Order::ID).key_property_column(Order::TOTAL, "total_key");
    });

    assert!(mapping.is_mapped("Id"));
    assert!(mapping.is_mapped("Total"));

    let doc = mapping.document();
    let composite = doc.composite_id().unwrap();
    assert_eq!(composite.key_properties.len(), 2);
    assert_eq!(composite.key_properties[1].column, "total_key");
}

#[test]
fn collections_carry_kind_and_element_metadata() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping
        .has_many_to_many::<Order>(Person::ORDERS)
        .table("person_orders")
        .composite_element::<Order>(|element| {
            element.map(Order::TOTAL).column("total");
        });

    let doc = mapping.document();
    let orders = doc.body().collection("Orders").unwrap();
    assert_eq!(orders.kind, CollectionKind::ManyToMany);
    assert_eq!(orders.element, "Order");
    assert_eq!(orders.table.as_deref(), Some("person_orders"));

    let element = orders.composite_element.as_ref().unwrap();
    assert_eq!(element.class, "Order");
    assert_eq!(element.properties[0].column, "total");
}

#[test]
fn classlike_exposes_the_session_capability() {
    let mut mapping = ClassBuilder::<Person>::new();
    mapping.id(Person::ID);
    mapping.map(Person::NAME);

    let classlike: &mut dyn Classlike = &mut mapping;
    assert_eq!(classlike.entity_name(), "Person");
    assert_eq!(classlike.properties_mapped(), vec!["Id".to_string(), "Name".to_string()]);

    classlike.discriminate_on_column("kind");
    let mut target = Document::new("Person");
    classlike.alter_document(&mut target);
    assert_eq!(target.discriminator().unwrap().column, "kind");
}

#[test]
fn model_tester_extracts_the_node_under_test() {
    let tester = ModelTester::new(
        || ClassBuilder::<Person>::new(),
        |mapping| mapping.document().body().property("Name").cloned(),
    );

    let node = tester
        .model(|mapping| {
            mapping.map(Person::NAME).column("nm").length(64);
        })
        .unwrap();
    assert_eq!(node.column, "nm");
    assert_eq!(node.length, Some(64));

    tester.assert_model(|mapping| {
        mapping.ignore_property(Person::NAME);
    }, &None);
}
