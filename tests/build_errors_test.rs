mod common;

use anyhow::Result;
use common::{Address, Person};
use doc_adapter::{
    AdapterDefinitionBuilder, AdapterError, AdapterOptions, AdapterRegistry, FieldMapping,
    ModelType, ModelTypeId,
};

/// 巢狀型別尚未註冊時建構失敗，且不修改 registry
#[test]
fn test_unresolved_reference_leaves_registry_untouched() -> Result<()> {
    let mut registry = AdapterRegistry::new();
    AdapterDefinitionBuilder::new(&mut registry).build(
        &common::address_type(),
        &common::address_mapping(),
        &AdapterOptions::default(),
    )?;

    // AddressExt is still missing.
    let err = AdapterDefinitionBuilder::new(&mut registry)
        .build(
            &common::person_type(),
            &common::person_mapping(),
            &AdapterOptions::default().identifier("friendIds"),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unresolved reference from Person.address: no adapter registered for AddressExt"
    );
    assert_eq!(registry.len(), 1);
    assert!(!registry.contains(ModelTypeId::of::<Person>()));
    Ok(())
}

#[test]
fn test_identifier_must_be_string_typed() {
    let mut registry = AdapterRegistry::new();
    let err = AdapterDefinitionBuilder::new(&mut registry)
        .build(
            &common::address_type(),
            &FieldMapping::new().map("street", "str").map("number", "_id"),
            &AdapterOptions::default(),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Identifier field Address.number must be string-typed, found Int32"
    );
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_document_key() {
    let mut registry = AdapterRegistry::new();
    let err = AdapterDefinitionBuilder::new(&mut registry)
        .build(
            &common::address_type(),
            &FieldMapping::new().map("street", "k").map("number", "k"),
            &AdapterOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, AdapterError::AmbiguousDocumentKey { ref key, .. } if key == "k"));
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_registration() -> Result<()> {
    let mut registry = AdapterRegistry::new();
    let build = |registry: &mut AdapterRegistry| {
        AdapterDefinitionBuilder::new(registry)
            .build(
                &common::address_type(),
                &common::address_mapping(),
                &AdapterOptions::default(),
            )
            .map(|definition| definition.name().to_string())
    };

    assert_eq!(build(&mut registry)?, "AddressAdapter");
    let err = build(&mut registry).unwrap_err();
    assert!(matches!(err, AdapterError::DuplicateAdapter { .. }));
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn test_unknown_field() {
    let mut registry = AdapterRegistry::new();
    let err = AdapterDefinitionBuilder::new(&mut registry)
        .build(
            &common::address_type(),
            &FieldMapping::new().map("zip", "zip"),
            &AdapterOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown field 'zip' on model Address");
}

#[derive(Debug, Default)]
struct Grid {
    rows: Vec<Vec<Address>>,
    values: Vec<Vec<i32>>,
}

fn grid_type() -> ModelType {
    ModelType::builder::<Grid>()
        .field("rows", |g: &Grid| g.rows.clone(), |g, v| g.rows = v)
        .field("values", |g: &Grid| g.values.clone(), |g, v| g.values = v)
        .build()
}

/// 只有純量可以使用巢狀清單
#[test]
fn test_lists_of_lists_need_scalar_elements() -> Result<()> {
    let mut registry = AdapterRegistry::new();
    AdapterDefinitionBuilder::new(&mut registry).build(
        &common::address_type(),
        &common::address_mapping(),
        &AdapterOptions::default(),
    )?;

    let err = AdapterDefinitionBuilder::new(&mut registry)
        .build(
            &grid_type(),
            &FieldMapping::new().map("rows", "rows"),
            &AdapterOptions::default(),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unsupported type List<List<Model<Address>>> for field Grid.rows"
    );

    AdapterDefinitionBuilder::new(&mut registry).build(
        &grid_type(),
        &FieldMapping::new().map("values", "values"),
        &AdapterOptions::default(),
    )?;
    assert_eq!(registry.len(), 2);
    Ok(())
}
