use crate::{
    model::{
        AssociationModel, AttributeModel, ColumnModel, DomainModel, EntityModel, FetchTiming,
        IdentifierModel,
    },
    types::WireType,
};

const fn id_column(name: &'static str, wire: WireType) -> ColumnModel {
    ColumnModel { name, wire }
}

const fn attr(name: &'static str, wire: WireType) -> AttributeModel {
    AttributeModel {
        name,
        wire,
        unique: false,
    }
}

const fn unique_attr(name: &'static str, wire: WireType) -> AttributeModel {
    AttributeModel {
        name,
        wire,
        unique: true,
    }
}

///
/// Customer / Order
/// Plain owning to-one by primary key; Customer has a simple natural id.
///

pub(crate) static CUSTOMER: EntityModel = EntityModel {
    entity_name: "Customer",
    root_entity_name: "Customer",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[
        unique_attr("email", WireType::Varchar),
        attr("name", WireType::Varchar),
    ],
    associations: &[],
    natural_id: &["email"],
};

pub(crate) static ORDER: EntityModel = EntityModel {
    entity_name: "Order",
    root_entity_name: "Order",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[
        unique_attr("number", WireType::Varchar),
        attr("total", WireType::Double),
    ],
    associations: &[AssociationModel {
        name: "customer",
        target: &CUSTOMER,
        fk_columns: &["customer_id"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

///
/// Vehicle
/// Composite natural id declared as (country, plate).
///

pub(crate) static VEHICLE: EntityModel = EntityModel {
    entity_name: "Vehicle",
    root_entity_name: "Vehicle",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::Ulid)],
    },
    attributes: &[
        attr("plate", WireType::Varchar),
        attr("country", WireType::Varchar),
        attr("model", WireType::Varchar),
    ],
    associations: &[],
    natural_id: &["country", "plate"],
};

///
/// NodeA / NodeB
/// Two owning to-one associations pointing at each other.
///

pub(crate) static NODE_A: EntityModel = EntityModel {
    entity_name: "NodeA",
    root_entity_name: "NodeA",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[attr("label", WireType::Varchar)],
    associations: &[AssociationModel {
        name: "b",
        target: &NODE_B,
        fk_columns: &["b_id"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

pub(crate) static NODE_B: EntityModel = EntityModel {
    entity_name: "NodeB",
    root_entity_name: "NodeB",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[attr("label", WireType::Varchar)],
    associations: &[AssociationModel {
        name: "a",
        target: &NODE_A,
        fk_columns: &["a_id"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

///
/// Person / Passport
/// Bidirectional one-to-one; Passport.owner is the inverse side.
///

pub(crate) static PERSON: EntityModel = EntityModel {
    entity_name: "Person",
    root_entity_name: "Person",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[attr("name", WireType::Varchar)],
    associations: &[AssociationModel {
        name: "passport",
        target: &PASSPORT,
        fk_columns: &["passport_id"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

pub(crate) static PASSPORT: EntityModel = EntityModel {
    entity_name: "Passport",
    root_entity_name: "Passport",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[unique_attr("code", WireType::Varchar)],
    associations: &[AssociationModel {
        name: "owner",
        target: &PERSON,
        fk_columns: &[],
        referenced_property: None,
        mapped_by: Some("passport"),
        timing: FetchTiming::Immediate,
    }],
    natural_id: &["code"],
};

///
/// Employee
/// Self-referencing, delayed manager association.
///

pub(crate) static EMPLOYEE: EntityModel = EntityModel {
    entity_name: "Employee",
    root_entity_name: "Employee",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[attr("name", WireType::Varchar)],
    associations: &[AssociationModel {
        name: "manager",
        target: &EMPLOYEE,
        fk_columns: &["manager_id"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Delayed,
    }],
    natural_id: &[],
};

///
/// Shipment / ShipmentLine
/// Composite identifier (region, seq) referenced by a two-column key.
///

pub(crate) static SHIPMENT: EntityModel = EntityModel {
    entity_name: "Shipment",
    root_entity_name: "Shipment",
    identifier: IdentifierModel {
        name: "id",
        columns: &[
            id_column("region", WireType::Varchar),
            id_column("seq", WireType::BigInt),
        ],
    },
    attributes: &[attr("carrier", WireType::Varchar)],
    associations: &[],
    natural_id: &[],
};

pub(crate) static SHIPMENT_LINE: EntityModel = EntityModel {
    entity_name: "ShipmentLine",
    root_entity_name: "ShipmentLine",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[attr("sku", WireType::Varchar)],
    associations: &[AssociationModel {
        name: "shipment",
        target: &SHIPMENT,
        fk_columns: &["shipment_region", "shipment_seq"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

///
/// Account / Transfer
/// To-one joined on a unique non-key property (iban).
///

pub(crate) static ACCOUNT: EntityModel = EntityModel {
    entity_name: "Account",
    root_entity_name: "Account",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[
        unique_attr("iban", WireType::Varchar),
        attr("holder", WireType::Varchar),
    ],
    associations: &[],
    natural_id: &[],
};

pub(crate) static TRANSFER: EntityModel = EntityModel {
    entity_name: "Transfer",
    root_entity_name: "Transfer",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[attr("amount", WireType::BigInt)],
    associations: &[AssociationModel {
        name: "account",
        target: &ACCOUNT,
        fk_columns: &["account_iban"],
        referenced_property: Some("iban"),
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

pub(crate) static REFUND: EntityModel = EntityModel {
    entity_name: "Refund",
    root_entity_name: "Refund",
    identifier: IdentifierModel {
        name: "id",
        columns: &[id_column("id", WireType::BigInt)],
    },
    attributes: &[attr("reason", WireType::Varchar)],
    associations: &[AssociationModel {
        name: "transfer",
        target: &TRANSFER,
        fk_columns: &["transfer_id"],
        referenced_property: None,
        mapped_by: None,
        timing: FetchTiming::Immediate,
    }],
    natural_id: &[],
};

///
/// LedgerEntry
/// Three-column composite identifier.
///

pub(crate) static LEDGER_ENTRY: EntityModel = EntityModel {
    entity_name: "LedgerEntry",
    root_entity_name: "LedgerEntry",
    identifier: IdentifierModel {
        name: "id",
        columns: &[
            id_column("book", WireType::Varchar),
            id_column("year", WireType::BigInt),
            id_column("seq", WireType::BigInt),
        ],
    },
    attributes: &[attr("amount", WireType::BigInt)],
    associations: &[],
    natural_id: &[],
};

/// Domain model containing every fixture entity.
pub(crate) fn domain_model() -> DomainModel {
    DomainModel::new(&[
        &ACCOUNT,
        &CUSTOMER,
        &EMPLOYEE,
        &LEDGER_ENTRY,
        &NODE_A,
        &NODE_B,
        &ORDER,
        &PASSPORT,
        &PERSON,
        &REFUND,
        &SHIPMENT,
        &SHIPMENT_LINE,
        &TRANSFER,
        &VEHICLE,
    ])
    .expect("fixture domain model is valid")
}

/// Association lookup by owner and name.
pub(crate) fn association(
    entity: &'static EntityModel,
    name: &str,
) -> &'static AssociationModel {
    entity
        .association(name)
        .expect("fixture association exists")
}
