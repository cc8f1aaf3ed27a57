use super::*;
use crate::{
    db::session::AttributeValue,
    error::{ErrorClass, ErrorOrigin},
    obs::CounterSink,
    test_support::{
        ACCOUNT, CUSTOMER, LEDGER_ENTRY, ORDER, SHIPMENT, TRANSFER, association,
    },
    types::{ValueClass, ValueMapping, WireType},
    value::Value,
};

#[test]
fn association_by_primary_key_binds_like_identifier() {
    let session = {
        let mut session = Session::new();
        session
            .persistence_context_mut()
            .get_or_register(&CUSTOMER, Value::Int(7));
        session
    };
    let customer = session.find(&CUSTOMER, &Value::Int(7)).expect("managed");

    // where o.customer = :c
    let mut by_association = Statement::select("Order");
    let c = parameter_with_occurrences(
        &mut by_association,
        ParameterSpec::named("c").with_declared_type(ValueMapping::AssociationForeignKey(
            association(&ORDER, "customer"),
        )),
        &[Some(AnticipatedType::Attribute {
            entity: "Order",
            attribute: "customer",
        })],
    );
    let mut bindings = QueryParameterBindings::from_xref(by_association.parameters());
    bindings.bind(c, customer).expect("bind entity");
    let from_association = prepare(&mut by_association, &bindings, &session).expect("prepare");

    // where o.customer.id = :id
    let mut by_identifier = Statement::select("Order");
    let id = parameter_with_occurrences(
        &mut by_identifier,
        ParameterSpec::named("id").with_value_class(ValueClass::Int),
        &[Some(AnticipatedType::Attribute {
            entity: "Customer",
            attribute: "id",
        })],
    );
    let mut bindings = QueryParameterBindings::from_xref(by_identifier.parameters());
    bindings.bind(id, 7i64).expect("bind id");
    let from_identifier = prepare(&mut by_identifier, &bindings, &session).expect("prepare");

    assert_eq!(positional(&from_association), positional(&from_identifier));
    assert_eq!(
        positional(&from_association),
        vec![BindingValue::typed(WireType::BigInt, Value::Int(7))]
    );
}

#[test]
fn association_by_referenced_property_binds_that_property() {
    let mut session = Session::new();
    let (account, _) = session
        .persistence_context_mut()
        .get_or_register(&ACCOUNT, Value::Int(1));
    session
        .persistence_context_mut()
        .instance_mut(account)
        .expect("instance")
        .set_attribute("iban", AttributeValue::Basic(Value::from("NL01BANK")));

    let mut statement = Statement::select("Transfer");
    let a = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("account").with_declared_type(ValueMapping::AssociationForeignKey(
            association(&TRANSFER, "account"),
        )),
        &[Some(AnticipatedType::Attribute {
            entity: "Transfer",
            attribute: "account",
        })],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind(a, account).expect("bind");

    let prepared = prepare(&mut statement, &bindings, &session).expect("prepare");

    assert_eq!(
        positional(&prepared),
        vec![BindingValue::typed(WireType::Varchar, Value::from("NL01BANK"))]
    );
}

#[test]
fn composite_identifier_binds_each_column() {
    let session = Session::new();
    let mut statement = Statement::select("Shipment");
    let id = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("id").with_declared_type(ValueMapping::EntityIdentifier(&SHIPMENT)),
        &[None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings
        .bind(id, Value::List(vec![Value::from("eu"), Value::Int(9)]))
        .expect("bind");

    let prepared = prepare(&mut statement, &bindings, &session).expect("prepare");

    assert_eq!(
        positional(&prepared),
        vec![
            BindingValue::typed(WireType::Varchar, Value::from("eu")),
            BindingValue::typed(WireType::BigInt, Value::Int(9)),
        ]
    );
}

#[test]
fn value_arity_mismatch_is_an_invariant_violation() {
    let session = Session::new();
    let mut statement = Statement::select("LedgerEntry");
    let id = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("id")
            .with_declared_type(ValueMapping::EntityIdentifier(&LEDGER_ENTRY)),
        &[None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings
        .bind(id, Value::List(vec![Value::from("main"), Value::Int(2024)]))
        .expect("bind");

    let err = prepare(&mut statement, &bindings, &session).unwrap_err();

    assert!(err.is_invariant_violation());
    assert_eq!(err.origin, ErrorOrigin::Binding);
    assert!(err.message.contains("decomposes into 2 values"));
}

#[test]
fn untyped_value_fails_only_when_bound() {
    let session = Session::new();
    let mut statement = Statement::select("Order");
    let p = parameter_with_occurrences(&mut statement, ParameterSpec::named("p"), &[None]);

    // typeless null needs no conversion
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind_null(p).expect("bind null");
    let prepared = prepare(&mut statement, &bindings, &session).expect("null binds");
    assert_eq!(positional(&prepared), vec![BindingValue::typeless_null()]);

    bindings.bind(p, 5i64).expect("bind value");
    let err = prepare(&mut statement, &bindings, &session).unwrap_err();
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(
        err.message,
        "parameter has no type by which it can be bound: :p"
    );
}

#[test]
fn type_hint_is_the_last_resort() {
    let session = Session::new();
    let mut statement = Statement::select("Order");
    let p = parameter_with_occurrences(&mut statement, ParameterSpec::named("p"), &[None]);
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind(p, 5i64).expect("bind");
    bindings
        .set_type_hint(p, ValueMapping::Scalar(WireType::BigInt))
        .expect("hint");

    let prepared = prepare(&mut statement, &bindings, &session).expect("prepare");

    assert_eq!(
        positional(&prepared),
        vec![BindingValue::typed(WireType::BigInt, Value::Int(5))]
    );
}

#[test]
fn composite_type_hint_widens_the_occurrence() {
    let session = Session::new();
    let mut statement = Statement::select("Shipment");
    let id = parameter_with_occurrences(&mut statement, ParameterSpec::named("id"), &[None]);
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings
        .bind(id, Value::List(vec![Value::from("eu"), Value::Int(9)]))
        .expect("bind");
    bindings
        .set_type_hint(id, ValueMapping::EntityIdentifier(&SHIPMENT))
        .expect("hint");

    let prepared = prepare(&mut statement, &bindings, &session).expect("prepare");

    assert_eq!(prepared.slots.slot_count(), 2);
    assert_eq!(
        positional(&prepared),
        vec![
            BindingValue::typed(WireType::Varchar, Value::from("eu")),
            BindingValue::typed(WireType::BigInt, Value::Int(9)),
        ]
    );
}

#[test]
fn null_binds_typeless_in_every_slot() {
    let session = Session::new();
    let mut statement = Statement::select("ShipmentLine");
    let s = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("s"),
        &[Some(AnticipatedType::Attribute {
            entity: "ShipmentLine",
            attribute: "shipment",
        })],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind_null(s).expect("bind");

    let prepared = prepare(&mut statement, &bindings, &session).expect("prepare");

    assert_eq!(
        positional(&prepared),
        vec![BindingValue::typeless_null(), BindingValue::typeless_null()]
    );
}

#[test]
fn unbound_parameter_binds_typed_nulls() {
    let session = Session::new();
    let mut statement = Statement::select("ShipmentLine");
    let s = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("s"),
        &[Some(AnticipatedType::Attribute {
            entity: "ShipmentLine",
            attribute: "shipment",
        })],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings
        .bind(s, Value::List(vec![Value::from("eu"), Value::Int(1)]))
        .expect("bind");
    bindings.unbind(s).expect("unbind");

    let prepared = prepare(&mut statement, &bindings, &session).expect("prepare");

    assert_eq!(
        positional(&prepared),
        vec![
            BindingValue::typed(WireType::Varchar, Value::Null),
            BindingValue::typed(WireType::BigInt, Value::Null),
        ]
    );
    assert!(bindings.verify_all_bound().is_err());
}

#[test]
fn multi_valued_binding_fills_expansions() {
    let session = Session::new();
    let mut statement = Statement::select("Order");
    let ids = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("ids")
            .with_value_class(ValueClass::Int)
            .multi_valued(),
        &[None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings
        .bind_multi(ids, [Value::Int(3), Value::Int(1), Value::Int(2)])
        .expect("bind");

    let prepared = prepare(&mut statement, &bindings, &session).expect("prepare");

    let values: Vec<Value> = positional(&prepared)
        .into_iter()
        .map(|binding| binding.value)
        .collect();
    assert_eq!(values, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
}

#[test]
fn missing_expansions_are_an_invariant_violation() {
    let session = Session::new();
    let mut statement = Statement::select("Order");
    let ids = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("ids")
            .with_value_class(ValueClass::Int)
            .multi_valued(),
        &[None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings
        .bind_multi(ids, [Value::Int(1), Value::Int(2)])
        .expect("bind");

    // skip expansion
    let xref = statement.parameters();
    let types = TypeResolutions::resolve(xref, &bindings, &StandardTypeRegistry).expect("types");
    let slots = allocate_slots(xref, &bindings, &domain_model(), Some(&types)).expect("slots");
    let cross = build_jdbc_params_xref(Some(xref), &slots);

    let err = create_jdbc_parameter_bindings(
        &bindings,
        xref,
        &cross,
        &types,
        &domain_model(),
        &session,
    )
    .unwrap_err();

    assert!(err.is_invariant_violation());
    assert!(err.message.contains("0 expansions for 2 values"));
}

#[test]
fn scalar_wire_type_must_accept_value() {
    let session = Session::new();
    let mut statement = Statement::select("Order");
    let p = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("p").with_declared_type(ValueMapping::Scalar(WireType::BigInt)),
        &[None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind(p, "not a number").expect("bind");

    let err = prepare(&mut statement, &bindings, &session).unwrap_err();

    assert!(err.is_unsupported());
}

#[test]
fn entity_of_wrong_type_is_rejected() {
    let mut session = Session::new();
    let (order, _) = session
        .persistence_context_mut()
        .get_or_register(&ORDER, Value::Int(1));

    let mut statement = Statement::select("Order");
    let c = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("c").with_declared_type(ValueMapping::EntityIdentifier(&CUSTOMER)),
        &[None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind(c, order).expect("bind");

    let err = prepare(&mut statement, &bindings, &session).unwrap_err();

    assert!(err.is_unsupported());
    assert!(err.message.contains("expects 'Customer'"));
}

#[test]
fn duplicate_slots_are_rejected() {
    let session = Session::new();
    let mut statement = Statement::select("Order");
    let p = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("p").with_value_class(ValueClass::Int),
        &[None, None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind(p, 1i64).expect("bind");

    let xref = statement.parameters();
    let mut slots = SlotAssignment::default();
    for occurrence in xref.occurrences_of(p) {
        slots.insert(*occurrence, vec![PositionalSlot::new(1)]);
    }
    let cross = build_jdbc_params_xref(Some(xref), &slots);
    let types = TypeResolutions::resolve(xref, &bindings, &StandardTypeRegistry).expect("types");

    let err = create_jdbc_parameter_bindings(
        &bindings,
        xref,
        &cross,
        &types,
        &domain_model(),
        &session,
    )
    .unwrap_err();

    assert!(err.message.contains("bound twice"));
}

#[test]
fn positional_view_rejects_gaps() {
    let mut bindings = JdbcParameterBindings::default();
    bindings
        .add_binding(PositionalSlot::new(2), BindingValue::typeless_null())
        .expect("add");

    assert!(bindings.to_positional().unwrap_err().is_invariant_violation());
}

#[test]
fn binding_statistics_are_recorded() {
    let sink = CounterSink::new();
    let session = Session::new().metrics_sink(&sink);
    let mut statement = Statement::select("Order");
    let p = parameter_with_occurrences(
        &mut statement,
        ParameterSpec::named("p").with_value_class(ValueClass::Int),
        &[None, None],
    );
    let mut bindings = QueryParameterBindings::from_xref(statement.parameters());
    bindings.bind(p, 1i64).expect("bind");

    prepare(&mut statement, &bindings, &session).expect("prepare");

    sink.with_state(|m| {
        assert_eq!(m.ops.binding_statements, 1);
        assert_eq!(m.ops.binding_slots, 2);
    });
}

#[test]
fn bind_type_beats_declared_type_beats_value_class() {
    let mut xref = DomainParameterXref::new();
    let p = xref
        .register_parameter(
            ParameterSpec::named("p")
                .with_declared_type(ValueMapping::Scalar(WireType::Varchar))
                .with_value_class(ValueClass::Int),
        )
        .expect("register");
    let mut bindings = QueryParameterBindings::from_xref(&xref);
    let parameter = xref.parameter(p).expect("parameter");

    assert_eq!(
        determine_parameter_type(
            bindings.binding(p).expect("binding"),
            parameter,
            &StandardTypeRegistry
        ),
        Some(ValueMapping::Scalar(WireType::Varchar))
    );

    bindings
        .set_bind_type(p, ValueMapping::Scalar(WireType::Double))
        .expect("bind type");
    assert_eq!(
        determine_parameter_type(
            bindings.binding(p).expect("binding"),
            parameter,
            &StandardTypeRegistry
        ),
        Some(ValueMapping::Scalar(WireType::Double))
    );
}

#[test]
fn multi_values_need_a_multi_valued_parameter() {
    let mut xref = DomainParameterXref::new();
    let p = xref
        .register_parameter(ParameterSpec::named("p"))
        .expect("register");
    let mut bindings = QueryParameterBindings::from_xref(&xref);

    let err = bindings.bind_multi(p, [Value::Int(1)]).unwrap_err();

    assert_eq!(err.message, "parameter :p does not accept multiple values");
}
