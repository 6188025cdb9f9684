mod common;

use protodyn::context::{Context, ResolveError, ValueType};

fn nested_set() -> bytes::BytesMut
{
    // message Outer { message Inner { string value = 1; } Inner inner = 1; }
    let inner = common::message(
        "Inner",
        &[common::field(
            "value",
            1,
            common::LABEL_OPTIONAL,
            common::TYPE_STRING,
            None,
        )],
    );
    let mut outer = common::message(
        "Outer",
        &[common::field(
            "inner",
            1,
            common::LABEL_OPTIONAL,
            common::TYPE_MESSAGE,
            Some(".Outer.Inner"),
        )],
    );
    common::add_nested(&mut outer, &inner);

    let color = common::enum_type("Color", &[("COLOR_UNKNOWN", 0), ("COLOR_RED", 1)]);

    common::descriptor_set(&[common::file("nested.proto", None, &[outer], &[color])])
}

#[test]
fn resolve_file_is_exact_match()
{
    let set = common::person_set();
    let context = Context::from_descriptor_set(&set).unwrap();

    assert!(context.resolve_file("person.proto").is_ok());

    match context.resolve_file("person") {
        Err(ResolveError::FileNotFound { path }) => assert_eq!(path, "person"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn resolve_top_level_type()
{
    let set = common::person_set();
    let context = Context::from_descriptor_set(&set).unwrap();

    let handle = context.resolve_type("person.proto", "Person").unwrap();
    assert_eq!(handle.info().full_name, "Person");
}

#[test]
fn resolve_nested_type_by_qualified_name()
{
    let set = nested_set();
    let context = Context::from_descriptor_set(&set).unwrap();

    let handle = context.resolve_type("nested.proto", "Outer.Inner").unwrap();
    assert_eq!(handle.info().full_name, "Outer.Inner");

    // The nested name is not visible at the top level.
    match context.resolve_type("nested.proto", "Inner") {
        Err(ResolveError::TypeNotFound { .. }) => {}
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn missing_type_is_an_error_not_an_empty_handle()
{
    let set = common::person_set();
    let context = Context::from_descriptor_set(&set).unwrap();

    match context.resolve_type("person.proto", "Persona") {
        Err(ResolveError::TypeNotFound { name, file }) => {
            assert_eq!(name, "Persona");
            assert_eq!(file, "person.proto");
        }
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn enum_name_is_not_a_message()
{
    let set = nested_set();
    let context = Context::from_descriptor_set(&set).unwrap();

    match context.resolve_type("nested.proto", "Color") {
        Err(ResolveError::NotAMessage { name }) => assert_eq!(name, "Color"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn cross_file_handle_is_fully_resolved()
{
    let inner = common::message(
        "Inner",
        &[common::field(
            "value",
            1,
            common::LABEL_OPTIONAL,
            common::TYPE_STRING,
            None,
        )],
    );
    let outer = common::message(
        "Outer",
        &[common::field(
            "inner",
            1,
            common::LABEL_OPTIONAL,
            common::TYPE_MESSAGE,
            Some(".Inner"),
        )],
    );
    let set = common::descriptor_set(&[
        common::file("a.proto", None, &[inner], &[]),
        common::file("b.proto", None, &[outer], &[]),
    ]);

    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("b.proto", "Outer").unwrap();

    let inner_ref = match &handle.info().get_field(1).unwrap().field_type {
        ValueType::Message(inner_ref) => *inner_ref,
        other => panic!("Field did not resolve to a message: {:?}", other),
    };
    let inner = handle.context().resolve_message(inner_ref);
    assert_eq!(inner.full_name, "Inner");
    assert_eq!(inner.get_field(1).unwrap().field_type, ValueType::String);
}
