use super::*;
use crate::{
    error::{ErrorClass, ErrorOrigin},
    test_support::{CUSTOMER, ORDER, PASSPORT, PERSON, domain_model},
    types::{ValueMapping, WireType},
};

static ORPHAN: EntityModel = EntityModel {
    entity_name: "Orphan",
    root_entity_name: "Orphan",
    identifier: IdentifierModel {
        name: "id",
        columns: &[ColumnModel {
            name: "id",
            wire: WireType::BigInt,
        }],
    },
    attributes: &[],
    associations: &[AssociationModel {
        name: "customer",
        target: &CUSTOMER,
        fk_columns: &["customer_a", "customer_b"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

static KEYLESS: EntityModel = EntityModel {
    entity_name: "Keyless",
    root_entity_name: "Keyless",
    identifier: IdentifierModel {
        name: "id",
        columns: &[],
    },
    attributes: &[],
    associations: &[],
    natural_id: &[],
};

#[test]
fn fixture_domain_validates() {
    let domain = domain_model();

    assert!(!domain.is_empty());
    assert!(domain.find_entity("Customer").is_some());
}

#[test]
fn attribute_mapping_resolution() {
    let domain = domain_model();

    assert_eq!(
        domain.resolve_attribute_mapping("Order", "id").expect("id"),
        ValueMapping::EntityIdentifier(&ORDER)
    );
    assert!(matches!(
        domain.resolve_attribute_mapping("Order", "customer").expect("fk"),
        ValueMapping::AssociationForeignKey(assoc) if assoc.target.is_same(&CUSTOMER)
    ));
    assert_eq!(
        domain.resolve_attribute_mapping("Order", "total").expect("basic"),
        ValueMapping::Scalar(WireType::Double)
    );

    let err = domain
        .resolve_attribute_mapping("Order", "missing")
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::NotFound);
}

#[test]
fn duplicate_entities_are_rejected() {
    let err = DomainModel::new(&[&CUSTOMER, &CUSTOMER]).unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::Model);
}

#[test]
fn foreign_key_arity_must_match_target_key() {
    let err = DomainModel::new(&[&CUSTOMER, &ORPHAN]).unwrap_err();

    assert!(err.message.contains("foreign-key columns"));
}

#[test]
fn identifier_needs_at_least_one_column() {
    let err = DomainModel::new(&[&KEYLESS]).unwrap_err();

    assert!(err.message.contains("identifier spans 0 columns"));
}

#[test]
fn unregistered_targets_are_rejected() {
    let err = DomainModel::new(&[&ORDER]).unwrap_err();

    assert!(err.message.contains("unregistered entity 'Customer'"));
}

#[test]
fn inverse_side_is_recognized() {
    let owner = PASSPORT.association("owner").expect("owner");

    assert!(owner.is_inverse());
    assert!(owner.selects_by_unique_key());
    assert!(!PERSON.association("passport").expect("passport").is_inverse());
    assert_eq!(FetchTiming::default(), FetchTiming::Immediate);
}
