use std::fs;
use std::rc::Rc;

use skiff_thrift_compiler::{parse_source, Loader, ThriftError};
use skiff_thrift_schema::{StructKind, Symbol, TypeTag, Value};

#[test]
fn test_parse_struct_fields_in_declaration_order() {
    let module = parse_source(
        r#"
        struct Pair {
          1: required i32 a;
          2: required string b;
        }
        "#,
        "pair",
    )
    .unwrap();

    let def = module.struct_def("Pair").unwrap();
    assert_eq!(def.kind, StructKind::Struct);
    assert_eq!(def.fields.len(), 2);
    assert_eq!(def.fields[0].id, 1);
    assert_eq!(def.fields[0].name, "a");
    assert_eq!(def.fields[0].ty, TypeTag::I32);
    assert!(def.fields[0].required);
    assert_eq!(def.fields[1].id, 2);
    assert_eq!(def.fields[1].name, "b");
    assert_eq!(def.fields[1].ty, TypeTag::String);
    assert!(def.fields[1].required);
}

#[test]
fn test_unmarked_and_optional_fields_are_not_required() {
    let module = parse_source("struct S { 1: i32 a; 2: optional i32 b }", "s").unwrap();
    let def = module.struct_def("S").unwrap();
    assert!(!def.fields[0].required);
    assert!(!def.fields[1].required);
}

#[test]
fn test_union_and_exception_keep_their_kind() {
    let module = parse_source(
        "union U { 1: i32 a } exception E { 1: string message }",
        "kinds",
    )
    .unwrap();
    assert_eq!(module.struct_def("U").unwrap().kind, StructKind::Union);
    assert_eq!(module.struct_def("E").unwrap().kind, StructKind::Exception);
}

#[test]
fn test_enum_auto_numbering() {
    let module = parse_source("enum E { A, B, C }", "e").unwrap();
    let def = module.enum_def("E").unwrap();
    assert_eq!(def.value_of("A"), Some(0));
    assert_eq!(def.value_of("B"), Some(1));
    assert_eq!(def.value_of("C"), Some(2));
}

#[test]
fn test_enum_numbering_continues_after_explicit_value() {
    let module = parse_source("enum E { A = 5, B }", "e").unwrap();
    let def = module.enum_def("E").unwrap();
    assert_eq!(def.value_of("B"), Some(6));
}

#[test]
fn test_const_reference_resolves_to_exact_value() {
    let module = parse_source(
        r#"
        const i32 MAX = 42
        const i32 COPY = MAX
        "#,
        "consts",
    )
    .unwrap();
    assert_eq!(module.constant("COPY"), Some(&Value::Int(42)));
}

#[test]
fn test_undefined_const_reference_is_an_error() {
    let err = parse_source("const i32 X = MISSING", "consts").unwrap_err();
    assert!(matches!(
        err,
        ThriftError::UnresolvedReference { ref path, .. } if path == "MISSING"
    ));
}

#[test]
fn test_enum_member_reference_in_const() {
    let module = parse_source(
        r#"
        enum Color { RED, GREEN }
        const Color FAVORITE = Color.GREEN
        "#,
        "colors",
    )
    .unwrap();
    assert_eq!(module.constant("FAVORITE"), Some(&Value::Int(1)));
}

#[test]
fn test_const_enum_value_must_be_defined() {
    let err = parse_source(
        "enum Color { RED, GREEN } const Color BAD = 7",
        "colors",
    )
    .unwrap_err();
    assert!(matches!(err, ThriftError::InvalidEnumValue { value: 7, .. }));
}

#[test]
fn test_field_default_type_mismatch() {
    let err = parse_source(r#"struct S { 1: i32 x = "oops" }"#, "s").unwrap_err();
    assert!(matches!(err, ThriftError::TypeMismatch { .. }));
}

#[test]
fn test_well_typed_field_default_is_kept() {
    let module = parse_source("struct S { 1: i32 x = 9 }", "s").unwrap();
    let def = module.struct_def("S").unwrap();
    assert_eq!(def.fields[0].default, Some(Value::Int(9)));
}

#[test]
fn test_int_literal_is_not_accepted_for_double() {
    let err = parse_source("const double D = 1", "s").unwrap_err();
    assert!(matches!(err, ThriftError::TypeMismatch { .. }));
}

#[test]
fn test_map_const_casts_keys_and_values() {
    let module = parse_source("const map<i32,i32> M = {1:2, 3:4}", "m").unwrap();
    let value = module.constant("M").unwrap();
    assert_eq!(
        value,
        &Value::Map(vec![
            (Value::Int(1), Value::Int(2)),
            (Value::Int(3), Value::Int(4)),
        ])
    );
}

#[test]
fn test_set_const_deduplicates() {
    let module = parse_source("const set<i32> S = [3, 1, 3]", "s").unwrap();
    assert_eq!(
        module.constant("S"),
        Some(&Value::Set(vec![Value::Int(3), Value::Int(1)]))
    );
}

#[test]
fn test_nested_container_const() {
    let module = parse_source(
        r#"const map<string, list<i32>> M = {"a": [1, 2]}"#,
        "m",
    )
    .unwrap();
    let value = module.constant("M").unwrap();
    assert_eq!(
        value,
        &Value::Map(vec![(
            Value::String("a".to_owned()),
            Value::List(vec![Value::Int(1), Value::Int(2)]),
        )])
    );
}

#[test]
fn test_struct_const_fills_defaults_and_checks_required() {
    let module = parse_source(
        r#"
        struct Account {
          1: required string name
          2: i32 balance = 100
        }
        const Account EMPTY = {"name": "nobody"}
        "#,
        "bank",
    )
    .unwrap();
    let record = module.constant("EMPTY").unwrap().as_record().unwrap();
    assert_eq!(record.type_name, "Account");
    assert_eq!(record.get("name"), Some(&Value::String("nobody".to_owned())));
    assert_eq!(record.get("balance"), Some(&Value::Int(100)));
}

#[test]
fn test_struct_const_missing_required_field() {
    let err = parse_source(
        r#"
        struct Account { 1: required string name }
        const Account BAD = {}
        "#,
        "bank",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ThriftError::MissingRequiredField { ref field, .. } if field == "name"
    ));
}

#[test]
fn test_struct_const_unknown_field() {
    let err = parse_source(
        r#"
        struct Account { 1: string name }
        const Account BAD = {"nome": "typo"}
        "#,
        "bank",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ThriftError::UnknownField { ref field, .. } if field == "nome"
    ));
}

#[test]
fn test_struct_const_reference_is_idempotent() {
    let module = parse_source(
        r#"
        struct Point { 1: i32 x, 2: i32 y }
        const Point ORIGIN = {"x": 0, "y": 0}
        const Point COPY = ORIGIN
        "#,
        "geo",
    )
    .unwrap();
    assert_eq!(module.constant("COPY"), module.constant("ORIGIN"));
}

#[test]
fn test_typedef_aliases_a_type() {
    let module = parse_source(
        r#"
        typedef list<i32> Ints
        const Ints XS = [1, 2]
        struct S { 1: Ints values }
        "#,
        "alias",
    )
    .unwrap();
    assert_eq!(
        module.type_alias("Ints"),
        Some(&TypeTag::List(Box::new(TypeTag::I32)))
    );
    assert_eq!(
        module.constant("XS"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );
    let def = module.struct_def("S").unwrap();
    assert_eq!(def.fields[0].ty, TypeTag::List(Box::new(TypeTag::I32)));
}

#[test]
fn test_field_type_must_already_be_resolvable() {
    let err = parse_source("struct S { 1: Missing m }", "s").unwrap_err();
    assert!(matches!(
        err,
        ThriftError::UnresolvedReference { ref path, .. } if path == "Missing"
    ));
}

#[test]
fn test_duplicate_definition_last_write_wins() {
    let module = parse_source(
        r#"
        const i32 X = 1
        const i32 X = 2
        "#,
        "dups",
    )
    .unwrap();
    assert_eq!(module.len(), 1);
    assert_eq!(module.constant("X"), Some(&Value::Int(2)));
}

#[test]
fn test_namespace_header_is_accepted_without_effect() {
    let module = parse_source(
        r#"
        namespace py tutorial
        namespace * shared.types;
        const i32 X = 1
        "#,
        "ns",
    )
    .unwrap();
    assert_eq!(module.len(), 1);
}

#[test]
fn test_grammar_error_carries_line() {
    let err = parse_source("struct {\n}", "bad").unwrap_err();
    match err {
        ThriftError::Grammar { line, .. } => assert_eq!(line, 1),
        other => panic!("expected grammar error, got {:?}", other),
    }
}

#[test]
fn test_service_methods_and_envelopes() {
    let module = parse_source(
        r#"
        exception NotFound { 1: string key }
        service Store {
          string fetch(1: required string key) throws (1: NotFound missing),
          oneway void ping()
        }
        "#,
        "store",
    )
    .unwrap();

    let service = module.service_def("Store").unwrap();
    assert_eq!(
        service.method_names().collect::<Vec<_>>(),
        vec!["fetch", "ping"]
    );

    let fetch = service.method("fetch").unwrap();
    assert!(!fetch.oneway);
    assert_eq!(fetch.args.name, "fetch_args");
    assert_eq!(fetch.args.fields[0].name, "key");
    assert!(fetch.args.fields[0].required);
    assert_eq!(fetch.result.name, "fetch_result");
    assert_eq!(fetch.result.fields[0].name, "success");
    assert_eq!(fetch.result.fields[0].id, 0);
    assert_eq!(fetch.result.fields[0].ty, TypeTag::String);
    assert!(!fetch.result.fields[0].required);
    assert_eq!(fetch.result.fields[1].name, "missing");
    assert!(!fetch.result.fields[1].required);

    let ping = service.method("ping").unwrap();
    assert!(ping.oneway);
    assert!(ping.result.fields.is_empty());
}

#[test]
fn test_service_extends_exposes_parent_methods() {
    let module = parse_source(
        r#"
        service Base { void ping() }
        service Child extends Base { void fetch() }
        "#,
        "svc",
    )
    .unwrap();
    let child = module.service_def("Child").unwrap();
    assert_eq!(child.all_method_names(), vec!["ping", "fetch"]);
    assert!(child.method("ping").is_some());
}

#[test]
fn test_extends_undefined_target_is_an_error() {
    let err = parse_source("service B extends Z { void f() }", "svc").unwrap_err();
    assert!(matches!(
        err,
        ThriftError::ExtendsTarget { ref target, .. } if target == "Z"
    ));
}

#[test]
fn test_extends_target_must_be_a_service() {
    let err = parse_source(
        "struct A { 1: i32 x } service B extends A { void f() }",
        "svc",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ThriftError::ExtendsTarget { ref target, .. } if target == "A"
    ));
}

#[test]
fn test_module_path_suffix_rules() {
    let mut loader = Loader::new();
    assert!(matches!(
        loader.load(std::path::Path::new("schema.txt")),
        Err(ThriftError::ModulePath(_))
    ));
    assert!(matches!(
        loader.load_named(std::path::Path::new("schema.thrift"), Some("schema")),
        Err(ThriftError::ModulePath(_))
    ));
}

#[test]
fn test_missing_file_surfaces_io_error() {
    let err = Loader::new()
        .load(std::path::Path::new("no_such_file.thrift"))
        .unwrap_err();
    assert!(matches!(err, ThriftError::Io(_)));
}

#[test]
fn test_parse_entry_point_with_include_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("shared.thrift"), "const i32 LIMIT = 10").unwrap();
    fs::write(
        dir.path().join("main.thrift"),
        "include \"shared.thrift\"\nconst i32 X = shared.LIMIT",
    )
    .unwrap();

    let module = skiff_thrift_compiler::parse(
        &dir.path().join("main.thrift"),
        Some("main_thrift"),
        Some(dir.path()),
    )
    .unwrap();
    assert_eq!(module.name, "main_thrift");
    assert_eq!(module.constant("X"), Some(&Value::Int(10)));
}

#[test]
fn test_include_attaches_child_module() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("shared.thrift"),
        "struct SharedStruct { 1: i32 key }\nconst i32 LIMIT = 10",
    )
    .unwrap();
    fs::write(
        dir.path().join("main.thrift"),
        r#"
        include "shared.thrift"

        struct Wrapper { 1: shared.SharedStruct inner }
        const i32 COPY = shared.LIMIT
        "#,
    )
    .unwrap();

    let mut loader = Loader::with_include_dir(dir.path());
    let module = loader.load(&dir.path().join("main.thrift")).unwrap();
    assert_eq!(module.name, "main");

    let child = module.submodule("shared").unwrap();
    assert_eq!(child.name, "shared");
    assert!(child.struct_def("SharedStruct").is_some());

    let wrapper = module.struct_def("Wrapper").unwrap();
    match &wrapper.fields[0].ty {
        TypeTag::Struct(def) => assert_eq!(def.name, "SharedStruct"),
        other => panic!("unexpected field type {:?}", other),
    }
    assert_eq!(module.constant("COPY"), Some(&Value::Int(10)));
}

#[test]
fn test_enum_member_reference_through_included_module() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("shared.thrift"), "enum Color { RED, GREEN }").unwrap();
    fs::write(
        dir.path().join("main.thrift"),
        "include \"shared.thrift\"\nconst shared.Color C = shared.Color.GREEN",
    )
    .unwrap();

    let mut loader = Loader::with_include_dir(dir.path());
    let module = loader.load(&dir.path().join("main.thrift")).unwrap();
    assert_eq!(module.constant("C"), Some(&Value::Int(1)));
}

#[test]
fn test_repeated_include_reuses_the_cached_module() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("shared.thrift"), "enum Color { RED }").unwrap();
    fs::write(dir.path().join("a.thrift"), "include \"shared.thrift\"").unwrap();
    fs::write(dir.path().join("b.thrift"), "include \"shared.thrift\"").unwrap();
    fs::write(
        dir.path().join("main.thrift"),
        "include \"a.thrift\"\ninclude \"b.thrift\"",
    )
    .unwrap();

    let mut loader = Loader::with_include_dir(dir.path());
    let module = loader.load(&dir.path().join("main.thrift")).unwrap();

    let via_a = module.submodule("a").unwrap().submodule("shared").unwrap();
    let via_b = module.submodule("b").unwrap().submodule("shared").unwrap();
    assert!(Rc::ptr_eq(via_a, via_b));
}

#[test]
fn test_circular_include_is_a_bounded_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.thrift"), "include \"b.thrift\"").unwrap();
    fs::write(dir.path().join("b.thrift"), "include \"a.thrift\"").unwrap();

    let mut loader = Loader::with_include_dir(dir.path());
    let err = loader.load(&dir.path().join("a.thrift")).unwrap_err();
    assert!(matches!(err, ThriftError::CircularInclude { .. }));
}

#[test]
fn test_self_include_is_a_bounded_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("me.thrift"), "include \"me.thrift\"").unwrap();

    let mut loader = Loader::with_include_dir(dir.path());
    let err = loader.load(&dir.path().join("me.thrift")).unwrap_err();
    assert!(matches!(err, ThriftError::CircularInclude { .. }));
}

#[test]
fn test_service_extends_across_included_module() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("base.thrift"),
        "service Base { void ping() }",
    )
    .unwrap();
    fs::write(
        dir.path().join("main.thrift"),
        "include \"base.thrift\"\nservice Child extends base.Base { void fetch() }",
    )
    .unwrap();

    let mut loader = Loader::with_include_dir(dir.path());
    let module = loader.load(&dir.path().join("main.thrift")).unwrap();
    let child = module.service_def("Child").unwrap();
    assert_eq!(child.all_method_names(), vec!["ping", "fetch"]);
}

#[test]
fn test_explicit_module_name_is_used() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tutorial.thrift"), "const i32 X = 1").unwrap();

    let mut loader = Loader::with_include_dir(dir.path());
    let module = loader
        .load_named(&dir.path().join("tutorial.thrift"), Some("tutorial_thrift"))
        .unwrap();
    assert_eq!(module.name, "tutorial_thrift");
}

#[test]
fn test_symbols_keep_declaration_order() {
    let module = parse_source(
        r#"
        const i32 A = 1
        enum E { X }
        struct S { 1: i32 a }
        "#,
        "ordered",
    )
    .unwrap();
    let names: Vec<_> = module.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["A", "E", "S"]);
    assert!(matches!(module.symbol("E"), Some(Symbol::Enum(_))));
}
