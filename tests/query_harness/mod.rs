//! Shared test harness for pipeline testing
//!
//! Provides three record types (`Person`, `Company`, `Address`) implementing
//! `Record`, their class descriptors, and a fixed data set. Nested objects are
//! exposed to the pipeline as `FieldValue::Object`.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod query_harness;
//! use query_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod pipeline_tests;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use this_query::prelude::*;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    pub city: String,
    pub street: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub address: Option<Address>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub rating: f64,
    pub status: i64,
    pub active: bool,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub salary: f64,
    pub employer: Option<Company>,
}

impl Address {
    fn to_value(&self) -> FieldValue {
        FieldValue::object([
            ("id", FieldValue::Integer(self.id)),
            ("city", self.city.as_str().into()),
            ("street", self.street.as_str().into()),
        ])
    }
}

impl Company {
    fn to_value(&self) -> FieldValue {
        FieldValue::object([
            ("id", FieldValue::Integer(self.id)),
            ("name", self.name.as_str().into()),
            ("address", self.address.as_ref().map_or(FieldValue::Null, Address::to_value)),
        ])
    }
}

impl Record for Address {
    fn class_name() -> &'static str {
        "Address"
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        self.to_value().member(field).cloned()
    }
}

impl Record for Company {
    fn class_name() -> &'static str {
        "Company"
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        self.to_value().member(field).cloned()
    }
}

impl Record for Person {
    fn class_name() -> &'static str {
        "Person"
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "id" => self.id.into(),
            "firstName" => self.first_name.as_str().into(),
            "lastName" => self.last_name.as_str().into(),
            "email" => self.email.clone().into(),
            "age" => self.age.into(),
            "rating" => self.rating.into(),
            "status" => FieldValue::Integer(self.status),
            "active" => self.active.into(),
            "birthDate" => self
                .birth_date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .into(),
            "createdAt" => self.created_at.into(),
            "salary" => self.salary.into(),
            "fullName" => format!("{} {}", self.first_name, self.last_name).into(),
            "employer" => self.employer.as_ref().map_or(FieldValue::Null, Company::to_value),
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

pub fn status_enum() -> Arc<EnumDescriptor> {
    Arc::new(EnumDescriptor::new(
        "Status",
        [("Active", 1), ("Inactive", 2), ("Archived", 3)],
    ))
}

pub fn registry() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();

    registry.register(
        ClassDescriptor::builder("Address")
            .property(PropertyDescriptor::new("id", TypeCategory::Number(NumberKind::Integer)).primary_key())
            .property(PropertyDescriptor::new("city", TypeCategory::String).searchable(SearchConfig::begins_with()))
            .property(PropertyDescriptor::new("street", TypeCategory::String))
            .build()
            .expect("address descriptor"),
    );

    registry.register(
        ClassDescriptor::builder("Company")
            .property(PropertyDescriptor::new("id", TypeCategory::Number(NumberKind::Integer)).primary_key())
            .property(PropertyDescriptor::new("name", TypeCategory::String).searchable(SearchConfig::begins_with()))
            .property(
                PropertyDescriptor::new("address", TypeCategory::Object("Address".into()))
                    .nullable()
                    .searchable(SearchConfig::begins_with()),
            )
            .build()
            .expect("company descriptor"),
    );

    registry.register(
        ClassDescriptor::builder("Person")
            .display_name("Person")
            .property(PropertyDescriptor::new("id", TypeCategory::Guid).primary_key())
            .property(
                PropertyDescriptor::new("firstName", TypeCategory::String)
                    .searchable(SearchConfig::begins_with().split_on_spaces())
                    .with_default_order(2, SortDirection::Ascending),
            )
            .property(
                PropertyDescriptor::new("lastName", TypeCategory::String)
                    .searchable(SearchConfig::begins_with().split_on_spaces())
                    .with_default_order(1, SortDirection::Ascending),
            )
            .property(
                PropertyDescriptor::new("email", TypeCategory::String)
                    .nullable()
                    .searchable(SearchConfig::contains()),
            )
            .property(PropertyDescriptor::new("age", TypeCategory::Number(NumberKind::Integer)).nullable())
            .property(PropertyDescriptor::new("rating", TypeCategory::Number(NumberKind::Float)))
            .property(
                PropertyDescriptor::new("status", TypeCategory::Enum(status_enum()))
                    .searchable(SearchConfig::begins_with()),
            )
            .property(PropertyDescriptor::new("active", TypeCategory::Boolean))
            .property(PropertyDescriptor::new("birthDate", TypeCategory::Date(DateKind::Date)).nullable())
            .property(PropertyDescriptor::new("createdAt", TypeCategory::Date(DateKind::Timestamp)))
            .property(
                PropertyDescriptor::new("salary", TypeCategory::Number(NumberKind::Float))
                    .readable_by(AuthPolicy::role("hr")),
            )
            .property(PropertyDescriptor::new("fullName", TypeCategory::String).not_persisted())
            .property(
                PropertyDescriptor::new("employer", TypeCategory::Object("Company".into()))
                    .nullable()
                    .searchable(SearchConfig::begins_with()),
            )
            .build()
            .expect("person descriptor"),
    );

    registry
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

pub fn person_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn acme() -> Company {
    Company {
        id: 1,
        name: "Acme Corp".into(),
        address: Some(Address {
            id: 10,
            city: "Springfield".into(),
            street: "1 Main St".into(),
        }),
    }
}

pub fn globex() -> Company {
    Company {
        id: 2,
        name: "Globex".into(),
        address: Some(Address {
            id: 20,
            city: "Acme Falls".into(),
            street: "9 River Rd".into(),
        }),
    }
}

pub fn initech() -> Company {
    Company {
        id: 3,
        name: "Initech".into(),
        address: None,
    }
}

pub fn companies() -> Vec<Company> {
    vec![globex(), initech(), acme()]
}

#[allow(clippy::too_many_arguments)]
fn person(
    n: u128,
    first: &str,
    last: &str,
    email: Option<&str>,
    age: Option<i64>,
    rating: f64,
    status: i64,
    active: bool,
    birth_date: Option<NaiveDate>,
    salary: f64,
    employer: Option<Company>,
) -> Person {
    Person {
        id: person_id(n),
        first_name: first.into(),
        last_name: last.into(),
        email: email.map(Into::into),
        age,
        rating,
        status,
        active,
        birth_date,
        created_at: Utc
            .with_ymd_and_hms(2024, 3, n as u32, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
        salary,
        employer,
    }
}

/// Eight people, in insertion order 1..=8
///
/// Default ordering (last name, then first name) is 7, 8, 5, 2, 3, 4, 1, 6.
pub fn people() -> Vec<Person> {
    vec![
        person(1, "Steverson", "Steve", Some("steve@acme.test"), Some(34), 4.0, 1, true, date(1985, 2, 14), 50_000.0, Some(acme())),
        person(2, "Ann", "Lee", None, None, 3.5, 2, true, date(1990, 6, 1), 62_000.0, Some(globex())),
        person(3, "Bob", "Smith", Some("bob@acme.test"), Some(29), 2.0, 1, false, None, 48_000.0, Some(acme())),
        person(4, "Carol", "Smithers", Some("carol@mail.test"), Some(41), 5.0, 3, true, date(1982, 11, 30), 91_000.0, None),
        person(5, "Dave", "Jones", Some("dave@initech.test"), Some(29), 3.0, 2, false, date(1995, 1, 1), 55_000.0, Some(initech())),
        person(6, "Eve", "Stone", Some("smithfan@mail.test"), Some(52), 4.5, 1, true, date(1971, 7, 4), 120_000.0, Some(globex())),
        person(7, "Frank", "Adams", Some("frank@acme.test"), Some(38), 1.5, 2, true, date(1990, 6, 1), 70_000.0, Some(acme())),
        person(8, "Grace", "Hopper", Some("grace@navy.test"), Some(85), 5.0, 3, true, date(1906, 12, 9), 0.0, None),
    ]
}

/// Ids of `people`, as the `n` passed to [`person_id`]
pub fn numbers(people: &[Person]) -> Vec<u128> {
    people.iter().map(|p| p.id.as_u128()).collect()
}

pub fn sorted(mut numbers: Vec<u128>) -> Vec<u128> {
    numbers.sort_unstable();
    numbers
}

pub fn people_source<S: QueryStore<Item = Person>>(store: S, config: QueryConfig) -> DataSource<S> {
    DataSource::for_type::<Person>(store, Arc::new(registry()), config).expect("person data source")
}

pub fn company_source(config: QueryConfig) -> DataSource<InMemoryStore<Company>> {
    DataSource::for_type::<Company>(InMemoryStore::from_records(companies()), Arc::new(registry()), config)
        .expect("company data source")
}
