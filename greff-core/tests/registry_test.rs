use greff_core::schema::{
    DeclarationError, DeclaredType, FieldDefault, FieldDescriptor, Registry, TargetKind,
    TypeDescriptor, title_case,
};
use library_schema::{field, registry, ty};
use serde_json::json;


#[test]
fn test_resolve_lookups() {
    let registry = registry();

    assert_eq!(registry.resolve_by_root_name("books").unwrap().name(), "Book");
    assert_eq!(registry.resolve_by_root_name("updateMedia").unwrap().name(), "Media");
    assert_eq!(registry.resolve_by_wire_name("EBook").unwrap().name(), "Ebook");
    assert_eq!(registry.resolve_by_name("Movie").unwrap().typename(), "Movie");

    assert!(registry.resolve_by_root_name("ghosts").is_none());
    assert!(registry.resolve_by_wire_name("Ebook").is_none());
}

#[test]
fn test_declaration_order_is_kept() {
    let registry = registry();

    let names: Vec<_> = registry.types().map(|t| t.name().to_string()).collect();
    assert_eq!(
        names,
        ["Author", "Media", "Book", "Ebook", "Movie", "Shelf", "SearchResult"]
    );

    let book = ty(&registry, "Book");
    let fields: Vec<_> = book.fields().map(|f| f.name()).collect();
    assert_eq!(fields, ["title", "authors", "isbn", "pages", "tags", "metadata"]);
}

#[test]
fn test_default_names() {
    let registry = registry();

    let movie = ty(&registry, "Movie");
    assert_eq!(movie.typename(), "Movie");
    assert_eq!(movie.query_root_name(), None);
    assert_eq!(movie.mutate_root_name(), None);

    let born = field(&registry, "Author", "born");
    assert_eq!(born.name(), "born");
    assert_eq!(born.wire_query_name(), "birthYear");
    assert_eq!(born.wire_mutate_name(), "born");
}

#[test]
fn test_title_case() {
    assert_eq!(title_case("book"), "Book");
    assert_eq!(title_case("book_item"), "Book_Item");
    assert_eq!(title_case("BookItem"), "Bookitem");
    assert_eq!(title_case("v2release"), "V2Release");

    let descriptor = TypeDescriptor::builder("library_card").build().unwrap();
    assert_eq!(descriptor.typename(), "Library_Card");
}

#[test]
fn test_extends_registers_along_the_parent_chain() {
    let registry = registry();
    let media = ty(&registry, "Media");
    let book = ty(&registry, "Book");

    let media_implementers: Vec<_> = registry.implementers(&media).map(|(k, _)| k).collect();
    assert_eq!(media_implementers, ["Book", "EBook", "Movie"]);

    let book_implementers: Vec<_> = registry.implementers(&book).map(|(k, _)| k).collect();
    assert_eq!(book_implementers, ["EBook"]);

    assert_eq!(
        registry.resolve_implementer(&media, "EBook").unwrap().name(),
        "Ebook"
    );
    assert!(registry.resolve_implementer(&book, "Movie").is_none());
}

#[test]
fn test_explicit_implementers() {
    let registry = registry();
    let search = ty(&registry, "SearchResult");

    assert_eq!(
        registry.resolve_implementer(&search, "Author").unwrap().name(),
        "Author"
    );
    assert_eq!(
        registry.resolve_implementer(&search, "Book").unwrap().name(),
        "Book"
    );
    // Explicit relations are not inherited by subtypes.
    assert!(registry.resolve_implementer(&search, "EBook").is_none());
}

#[test]
fn test_implementer_collision() {
    let mut registry = registry();
    let search = ty(&registry, "SearchResult");
    let movie = ty(&registry, "Movie");

    let err = registry
        .register_implementer(&search, "Book", &movie)
        .unwrap_err();

    assert!(matches!(
        err,
        DeclarationError::DuplicateRegistration { kind: "implementer", .. }
    ));
    assert_eq!(
        registry.resolve_implementer(&search, "Book").unwrap().name(),
        "Book"
    );
}

#[test]
fn test_implementer_requires_registered_types() {
    let mut registry = registry();
    let search = ty(&registry, "SearchResult");
    let stranger = std::sync::Arc::new(TypeDescriptor::builder("Stranger").build().unwrap());

    let err = registry
        .register_implementer(&search, "Stranger", &stranger)
        .unwrap_err();

    assert!(matches!(err, DeclarationError::UnknownType(name) if name == "Stranger"));
}

#[test]
fn test_duplicate_registrations() {
    let mut registry = registry();

    let cases = [
        (TypeDescriptor::builder("Book"), "type"),
        (TypeDescriptor::builder("Novel").typename("EBook"), "typename"),
        (TypeDescriptor::builder("Novel").query_root("books"), "query root"),
        (
            TypeDescriptor::builder("Novel").mutate_root("updateMedia"),
            "mutation root",
        ),
        // Root names are shared between queries and mutations.
        (
            TypeDescriptor::builder("Novel").mutate_root("books"),
            "mutation root",
        ),
        (
            TypeDescriptor::builder("Novel").query_root("updateMedia"),
            "query root",
        ),
    ];

    for (builder, expected_kind) in cases {
        match registry.declare(builder) {
            Err(DeclarationError::DuplicateRegistration { kind, .. }) => {
                assert_eq!(kind, expected_kind)
            }
            other => panic!("Expected a duplicate {expected_kind}, got {other:?}"),
        }
    }

    assert!(registry.resolve_by_name("Novel").is_none());

    // A type may still use one name for both of its own roots.
    let podcast = registry
        .declare(
            TypeDescriptor::builder("Podcast")
                .query_root("podcast")
                .mutate_root("podcast"),
        )
        .unwrap();
    assert_eq!(registry.resolve_by_root_name("podcast").unwrap().name(), podcast.name());
}

#[test]
fn test_root_name_reused_across_tables_keeps_first_owner() {
    let mut registry = Registry::new();

    registry
        .declare(TypeDescriptor::builder("Alpha").query_root("item"))
        .unwrap();
    let err = registry
        .declare(TypeDescriptor::builder("Beta").mutate_root("item"))
        .unwrap_err();

    assert!(matches!(
        err,
        DeclarationError::DuplicateRegistration { kind: "mutation root", name } if name == "item"
    ));
    assert!(registry.resolve_by_name("Beta").is_none());
    assert_eq!(registry.resolve_by_root_name("item").unwrap().name(), "Alpha");
}

#[test]
fn test_base_typename_cannot_be_an_implementer() {
    let mut registry = registry();
    let search = ty(&registry, "SearchResult");
    let movie = ty(&registry, "Movie");

    let err = registry
        .register_implementer(&search, search.typename(), &movie)
        .unwrap_err();

    assert!(matches!(
        err,
        DeclarationError::DuplicateRegistration { kind: "implementer", .. }
    ));
    assert!(registry.resolve_implementer(&search, search.typename()).is_none());
}

#[test]
fn test_failed_declaration_leaves_registry_untouched() {
    let mut registry = registry();
    let media = ty(&registry, "Media");

    // Colliding typename on the parent chain: nothing must be registered.
    let err = registry
        .declare(
            TypeDescriptor::builder("Documentary")
                .typename("Movie")
                .extends("Media"),
        )
        .unwrap_err();

    assert!(matches!(err, DeclarationError::DuplicateRegistration { .. }));
    assert!(registry.resolve_by_name("Documentary").is_none());
    assert_eq!(
        registry.resolve_implementer(&media, "Movie").unwrap().name(),
        "Movie"
    );
}

#[test]
fn test_unknown_parent() {
    let mut registry = Registry::new();

    let err = registry
        .declare(TypeDescriptor::builder("Book").extends("Media"))
        .unwrap_err();

    assert!(matches!(err, DeclarationError::UnknownType(name) if name == "Media"));
}

#[test]
fn test_reserved_and_duplicate_fields() {
    let err = TypeDescriptor::builder("Book")
        .field("__typename", DeclaredType::Scalar)
        .build()
        .unwrap_err();
    assert!(matches!(err, DeclarationError::ReservedFieldName { .. }));

    let err = TypeDescriptor::builder("Book")
        .field_with(
            "kind",
            DeclaredType::Scalar,
            FieldDescriptor::new().query_name("__typename"),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, DeclarationError::ReservedFieldName { .. }));

    let err = TypeDescriptor::builder("Book")
        .field("title", DeclaredType::Scalar)
        .field("title", DeclaredType::Scalar)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        DeclarationError::DuplicateField { field, .. } if field == "title"
    ));

    // Two fields reading the same wire key.
    let err = TypeDescriptor::builder("Book")
        .field("title", DeclaredType::Scalar)
        .field_with(
            "heading",
            DeclaredType::Scalar,
            FieldDescriptor::new().query_name("title"),
        )
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        DeclarationError::DuplicateField { field, .. } if field == "heading"
    ));

    // A field renamed onto another field's default wire name.
    let err = TypeDescriptor::builder("Book")
        .field_with(
            "title",
            DeclaredType::Scalar,
            FieldDescriptor::new().query_name("heading"),
        )
        .field("heading", DeclaredType::Scalar)
        .build()
        .unwrap_err();
    assert!(matches!(err, DeclarationError::DuplicateField { .. }));

    // Distinct wire names are accepted.
    TypeDescriptor::builder("Book")
        .field("title", DeclaredType::Scalar)
        .field_with(
            "subtitle",
            DeclaredType::Scalar,
            FieldDescriptor::new().query_name("subTitle"),
        )
        .build()
        .unwrap();
}

#[test]
fn test_field_binds_once() {
    let mut title = FieldDescriptor::new();
    title.bind_name("title").unwrap();

    let err = title.bind_name("name").unwrap_err();
    assert!(matches!(err, DeclarationError::FieldAlreadyBound { part: "name", .. }));

    title.bind_type(&DeclaredType::Scalar).unwrap();
    let err = title.bind_type(&DeclaredType::Scalar).unwrap_err();
    assert!(matches!(err, DeclarationError::FieldAlreadyBound { part: "type", .. }));
    assert!(title.is_bound());

    let mut late = FieldDescriptor::new();
    late.bind_type(&DeclaredType::Scalar).unwrap();
    let err = late.bind_name("late").unwrap_err();
    assert!(matches!(err, DeclarationError::FieldAlreadyBound { part: "type", .. }));
}

#[test]
fn test_bind_type_analysis() {
    let analyze = |declared: DeclaredType| {
        let mut field = FieldDescriptor::new();
        field.bind_name("value").unwrap();
        field.bind_type(&declared).unwrap();
        (field.target().clone(), field.is_collection())
    };

    assert_eq!(analyze(DeclaredType::Scalar), (TargetKind::Scalar, false));
    assert_eq!(
        analyze(DeclaredType::object("Author")),
        (TargetKind::ObjectReference("Author".into()), false)
    );
    assert_eq!(
        analyze(DeclaredType::list(DeclaredType::object("Author"))),
        (TargetKind::ObjectReference("Author".into()), true)
    );
    assert_eq!(
        analyze(DeclaredType::list(DeclaredType::Scalar)),
        (TargetKind::Scalar, true)
    );
    assert_eq!(
        analyze(DeclaredType::map(DeclaredType::Scalar)),
        (TargetKind::RawMapping, false)
    );
    assert_eq!(
        analyze(DeclaredType::map(DeclaredType::object("Author"))),
        (TargetKind::ObjectReference("Author".into()), false)
    );
    // Only one layer is unwrapped.
    assert_eq!(
        analyze(DeclaredType::list(DeclaredType::list(DeclaredType::object("Author")))),
        (TargetKind::RawMapping, true)
    );
}

#[test]
fn test_validate_value() {
    let registry = registry();

    let authors = field(&registry, "Book", "authors");
    assert!(authors.validate_value("Book", &json!([])).is_ok());
    assert!(authors.validate_value("Book", &json!("Ada")).is_err());

    let title = field(&registry, "Book", "title");
    assert!(title.validate_value("Book", &json!("Dune")).is_ok());
    assert!(title.validate_value("Book", &json!({"text": "Dune"})).is_err());

    let metadata = field(&registry, "Book", "metadata");
    assert!(metadata.validate_value("Book", &json!({"shelf": 3})).is_ok());

    let featured = field(&registry, "Shelf", "featured");
    assert!(featured.validate_value("Shelf", &json!({"title": "Dune"})).is_ok());
}

#[test]
fn test_defaults_and_transform() {
    let registry = registry();

    let authors = field(&registry, "Book", "authors");
    assert_eq!(authors.default_value(), &FieldDefault::Value(json!([])));
    assert_eq!(field(&registry, "Book", "pages").default_value(), &FieldDefault::Unset);

    let upper = FieldDescriptor::new().transform(|_, value| match value {
        serde_json::Value::String(s) => serde_json::Value::String(s.to_uppercase()),
        other => other,
    });
    assert_eq!(upper.serialize_outgoing(json!("dune")), json!("DUNE"));
    assert_eq!(FieldDescriptor::new().serialize_outgoing(json!(1)), json!(1));
}
