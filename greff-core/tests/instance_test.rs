use greff_core::response::{FieldValue, Instance, InstanceError, ResponseMapper};
use greff_core::schema::{DeclaredType, FieldDescriptor, TypeDescriptor};
use library_schema::{registry, ty};
use serde_json::{Value, json};
use std::sync::Arc;


#[test]
fn test_new_instance_is_unset_and_unchanged() {
    let registry = registry();
    let book = Instance::new(ty(&registry, "Book"));

    assert_eq!(book.type_name(), "Book");
    assert!(book.fields().all(|(_, value)| value.is_unset()));
    assert!(!book.is_changed());
    assert!(book.changes().is_empty());
    assert_eq!(book.to_json(), json!({"__typename": "Book"}));
}

#[test]
fn test_set_tracks_changes() {
    let registry = registry();
    let mut book = Instance::new(ty(&registry, "Book"));

    book.set("pages", json!(412)).unwrap();
    book.set("title", json!("Dune")).unwrap();
    book.set("pages", json!(413)).unwrap();

    let changed: Vec<_> = book.changed_fields().collect();
    assert_eq!(changed, ["pages", "title"]);
    assert_eq!(book.get("pages").unwrap().as_value(), Some(&json!(413)));

    // Declaration order, not change order.
    let changes = book.changes();
    let keys: Vec<_> = changes.keys().map(String::as_str).collect();
    assert_eq!(keys, ["title", "pages"]);

    book.clear_changes();
    assert!(!book.is_changed());
    assert!(book.changes().is_empty());
    assert_eq!(book.get("title").unwrap().as_value(), Some(&json!("Dune")));
}

#[test]
fn test_immutable_fields_are_left_out_of_changes() {
    let registry = registry();
    let mut book = Instance::new(ty(&registry, "Book"));

    book.set("isbn", json!("978-0441013593")).unwrap();
    assert!(book.is_changed());
    assert!(book.changes().is_empty());
}

#[test]
fn test_unknown_field() {
    let registry = registry();
    let mut book = Instance::new(ty(&registry, "Book"));

    let err = book.set("colour", json!("red")).unwrap_err();
    assert!(matches!(
        &err,
        InstanceError::UnknownField { type_name, field } if type_name == "Book" && field == "colour"
    ));
    assert_eq!(err.to_string(), "Unknown field 'Book.colour'");
    assert!(!book.is_changed());
}

#[test]
fn test_changes_use_mutation_names_and_transforms() {
    let descriptor = Arc::new(
        TypeDescriptor::builder("Profile")
            .field_with(
                "displayName",
                DeclaredType::Scalar,
                FieldDescriptor::new()
                    .mutate_name("display_name")
                    .transform(|_, value| match value {
                        Value::String(s) => Value::String(s.trim().to_string()),
                        other => other,
                    }),
            )
            .field("bio", DeclaredType::Scalar)
            .build()
            .unwrap(),
    );

    let mut profile = Instance::new(descriptor);
    profile.set("displayName", json!("  Ada  ")).unwrap();

    assert_eq!(Value::Object(profile.changes()), json!({"display_name": "Ada"}));
    // The stored value is untouched.
    assert_eq!(
        profile.get("displayName").unwrap().as_value(),
        Some(&json!("  Ada  "))
    );
}

#[test]
fn test_nested_instances_in_changes() {
    let registry = registry();
    let mapper = ResponseMapper::new(&registry);

    let author = mapper
        .instantiate(
            &ty(&registry, "Author"),
            json!({"name": "Frank", "birthYear": 1920}),
        )
        .unwrap();

    let mut book = Instance::new(ty(&registry, "Book"));
    book.set("authors", vec![FieldValue::from(author)]).unwrap();

    // Nested objects are written with mutation names and no discriminator.
    assert_eq!(
        Value::Object(book.changes()),
        json!({"authors": [{"name": "Frank", "born": 1920}]})
    );
}

#[test]
fn test_to_json_skips_unset_fields() {
    let registry = registry();
    let mut author = Instance::new(ty(&registry, "Author"));

    author.set("born", json!(1815)).unwrap();

    assert_eq!(
        author.to_json(),
        json!({"__typename": "Author", "birthYear": 1815})
    );
}
