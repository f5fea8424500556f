#![allow(dead_code)]

use bson::oid::ObjectId;
use doc_adapter::{
    AdapterContext, AdapterRegistry, FieldMapping, FieldOverride, ModelCatalog, ModelType,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub number: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressExt {
    pub base: Address,
    pub city: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: Option<String>,
    pub friend_ids: Option<Vec<String>>,
    pub name: String,
    pub nicknames: Vec<String>,
    pub age: i32,
    pub number: String,
    pub famous: bool,
    pub gender: Option<Gender>,
    pub preferred_genders: Vec<Gender>,
    pub address: Option<AddressExt>,
    pub other_addresses: Vec<Address>,
}

doc_adapter::impl_model_field!(Address, AddressExt);
doc_adapter::impl_model_enum!(Gender { Male => "MALE", Female => "FEMALE" });

pub fn address_type() -> ModelType {
    ModelType::builder::<Address>()
        .field("street", |a: &Address| a.street.clone(), |a, v| a.street = v)
        .field("number", |a: &Address| a.number, |a, v| a.number = v)
        .build()
}

pub fn address_ext_type() -> ModelType {
    ModelType::builder::<AddressExt>()
        .field("city", |a: &AddressExt| a.city.clone(), |a, v| a.city = v)
        .extends::<Address>(|a| &a.base, |a| &mut a.base)
        .build()
}

pub fn person_type() -> ModelType {
    ModelType::builder::<Person>()
        .field("id", |p: &Person| p.id.clone(), |p, v| p.id = v)
        .field("friendIds", |p: &Person| p.friend_ids.clone(), |p, v| p.friend_ids = v)
        .field("name", |p: &Person| p.name.clone(), |p, v| p.name = v)
        .field("nicknames", |p: &Person| p.nicknames.clone(), |p, v| p.nicknames = v)
        .field("age", |p: &Person| p.age, |p, v| p.age = v)
        .field("number", |p: &Person| p.number.clone(), |p, v| p.number = v)
        .field("famous", |p: &Person| p.famous, |p, v| p.famous = v)
        .field("gender", |p: &Person| p.gender, |p, v| p.gender = v)
        .field(
            "preferredGenders",
            |p: &Person| p.preferred_genders.clone(),
            |p, v| p.preferred_genders = v,
        )
        .field("address", |p: &Person| p.address.clone(), |p, v| p.address = v)
        .field(
            "otherAddresses",
            |p: &Person| p.other_addresses.clone(),
            |p, v| p.other_addresses = v,
        )
        .build()
}

pub fn address_mapping() -> FieldMapping {
    FieldMapping::new().map("street", "str").map("number", "num")
}

pub fn address_ext_mapping() -> FieldMapping {
    FieldMapping::new().map("city", "city")
}

pub fn person_mapping() -> FieldMapping {
    FieldMapping::new()
        .map("id", "_id")
        .map("friendIds", "friendIds")
        .map("name", "name")
        .map("nicknames", "nicks")
        .map("age", "age")
        .map("number", "num")
        .map("famous", "fam")
        .map("gender", "gen")
        .map("preferredGenders", "prefs")
        .map("address", "adr")
        .map("otherAddresses", "other")
}

pub fn catalog() -> ModelCatalog {
    ModelCatalog::new()
        .with(address_type())
        .with(address_ext_type())
        .with(person_type())
}

/// Address, AddressExt and Person adapters, built in dependency order.
pub fn sample_context() -> anyhow::Result<AdapterContext> {
    let mut context = AdapterContext::new("com.example.adapters");
    context.create_adapter(&address_type(), &address_mapping(), |o| o)?;
    context.create_adapter(&address_ext_type(), &address_ext_mapping(), |o| {
        o.extends::<Address>()
    })?;
    context.create_adapter(&person_type(), &person_mapping(), |o| {
        o.identifier("friendIds")
            .override_field("number", FieldOverride::string_as_int32())
    })?;
    Ok(context)
}

pub fn sample_registry() -> anyhow::Result<AdapterRegistry> {
    Ok(sample_context()?.into_registry())
}

pub fn sample_person() -> Person {
    let other = Address {
        street: "Simple street".to_string(),
        number: 321,
    };
    Person {
        id: Some(ObjectId::new().to_hex()),
        friend_ids: Some(vec![ObjectId::new().to_hex(), ObjectId::new().to_hex()]),
        name: "John".to_string(),
        nicknames: vec!["Joni".to_string(), "Gin".to_string()],
        age: 20,
        number: "123".to_string(),
        famous: true,
        gender: Some(Gender::Male),
        preferred_genders: vec![Gender::Male, Gender::Female],
        address: Some(AddressExt {
            base: Address {
                street: "Extended street".to_string(),
                number: 123,
            },
            city: "Barcelona".to_string(),
        }),
        other_addresses: vec![other.clone(), other],
    }
}
