use parse_thrift::ast::const_value::ConstValue;
use parse_thrift::ast::stx::Definition;
use parse_thrift::ast::stx::Header;
use parse_thrift::ast::stx::Requiredness;
use parse_thrift::ast::stx::StructKind;
use parse_thrift::ast::type_expr::TypeExpr;
use parse_thrift::error::SyntaxErrorType;
use parse_thrift::parse;
use parse_thrift::token::TT;

fn named(t: &TypeExpr) -> &str {
  match t {
    TypeExpr::Named { name } => name,
    other => panic!("expected named type, got {other:?}"),
  }
}

#[test]
fn parses_headers() {
  let doc = parse(
    r#"
    include "shared.thrift"
    include 'other/common.thrift'
    cpp_include "<vector>"
    namespace java com.example.api
    namespace * example
    "#,
  )
  .unwrap();
  let doc = doc.stx;
  assert_eq!(doc.headers.len(), 5);
  assert_eq!(doc.includes().count(), 2);
  match doc.headers[1].stx.as_ref() {
    Header::Include { path } => assert_eq!(path, "other/common.thrift"),
    other => panic!("unexpected header {other:?}"),
  };
  match doc.headers[3].stx.as_ref() {
    Header::Namespace { scope, name } => {
      assert_eq!(scope, "java");
      assert_eq!(name, "com.example.api");
    }
    other => panic!("unexpected header {other:?}"),
  };
  match doc.headers[4].stx.as_ref() {
    Header::Namespace { scope, .. } => assert_eq!(scope, "*"),
    other => panic!("unexpected header {other:?}"),
  };
}

#[test]
fn parses_basic_document() {
  let doc = parse(
    r#"
    namespace java com.example

    /** Some numbers. */
    enum TestEnum {
      ONE = 1,
      TWO = 2
    }

    typedef i32 Int

    struct S {
      1: required Int n
    }

    service Svc {
      oneway void sayHello(1: S arg1)
    }
    "#,
  )
  .unwrap();
  let defs = &doc.stx.definitions;
  assert_eq!(defs.len(), 4);

  let Definition::Enum(e) = defs[0].stx.as_ref() else {
    panic!("expected enum");
  };
  assert_eq!(e.name, "TestEnum");
  assert_eq!(e.doc.as_deref(), Some("Some numbers."));
  let members: Vec<_> = e
    .members
    .iter()
    .map(|m| (m.stx.name.as_str(), m.stx.value))
    .collect();
  assert_eq!(members, vec![("ONE", Some(1)), ("TWO", Some(2))]);

  let Definition::Typedef(t) = defs[1].stx.as_ref() else {
    panic!("expected typedef");
  };
  assert_eq!(t.name, "Int");
  assert_eq!(named(&t.old_type.stx), "i32");

  let Definition::Struct(s) = defs[2].stx.as_ref() else {
    panic!("expected struct");
  };
  assert_eq!(s.kind, StructKind::Struct);
  let field = &s.fields[0].stx;
  assert_eq!(field.id, 1);
  assert!(field.explicit_id);
  assert_eq!(field.requiredness, Requiredness::Required);
  assert_eq!(named(&field.typ.stx), "Int");
  assert_eq!(field.name, "n");

  let Definition::Service(svc) = defs[3].stx.as_ref() else {
    panic!("expected service");
  };
  let f = &svc.functions[0].stx;
  assert!(f.oneway);
  assert_eq!(named(&f.return_type.stx), "void");
  assert_eq!(f.name, "sayHello");
  assert_eq!(named(&f.params[0].stx.typ.stx), "S");
}

#[test]
fn assigns_implicit_field_ids() {
  let doc = parse("struct S { i32 a; 5: i32 b; optional string c }").unwrap();
  let Definition::Struct(s) = doc.stx.definitions[0].stx.as_ref() else {
    panic!("expected struct");
  };
  let ids: Vec<_> = s.fields.iter().map(|f| (f.stx.id, f.stx.explicit_id)).collect();
  assert_eq!(ids, vec![(-1, false), (5, true), (-2, false)]);
  assert_eq!(s.fields[2].stx.requiredness, Requiredness::Optional);
  assert_eq!(s.fields[0].stx.requiredness, Requiredness::Default);
}

#[test]
fn parses_unions_exceptions_and_throws() {
  let doc = parse(
    r#"
    union U { 1: i32 a, 2: string b }
    exception Oops { 1: string message }
    service Base {}
    service Child extends Base {
      list<U> fetch(1: map<string, set<i64>> query) throws (1: Oops oops)
    }
    "#,
  )
  .unwrap();
  let defs = &doc.stx.definitions;
  let Definition::Struct(u) = defs[0].stx.as_ref() else {
    panic!("expected union");
  };
  assert_eq!(u.kind, StructKind::Union);
  let Definition::Struct(x) = defs[1].stx.as_ref() else {
    panic!("expected exception");
  };
  assert_eq!(x.kind, StructKind::Exception);
  let Definition::Service(child) = defs[3].stx.as_ref() else {
    panic!("expected service");
  };
  assert_eq!(child.extends.as_ref().map(|e| e.stx.as_str()), Some("Base"));
  let fetch = &child.functions[0].stx;
  match fetch.return_type.stx.as_ref() {
    TypeExpr::List { element } => assert_eq!(named(&element.stx), "U"),
    other => panic!("unexpected return type {other:?}"),
  };
  match fetch.params[0].stx.typ.stx.as_ref() {
    TypeExpr::Map { key, value } => {
      assert_eq!(named(&key.stx), "string");
      assert!(matches!(value.stx.as_ref(), TypeExpr::Set { .. }));
    }
    other => panic!("unexpected param type {other:?}"),
  };
  assert_eq!(fetch.throws[0].stx.name, "oops");
}

#[test]
fn parses_const_values() {
  let doc = parse(
    r#"
    const i32 HEX = 0x10
    const double PI = 3.14
    const bool YES = true
    const string NAME = "quoted \"name\""
    const list<i32> NUMS = [1, 2; 3]
    const map<string, Kind> KINDS = { "a": Kind.A, "b": other.Kind.B }
    "#,
  )
  .unwrap();
  let values: Vec<_> = doc
    .stx
    .definitions
    .iter()
    .map(|d| match d.stx.as_ref() {
      Definition::Const(c) => c.value.stx.as_ref().clone(),
      other => panic!("unexpected definition {other:?}"),
    })
    .collect();
  assert!(matches!(values[0], ConstValue::Int { value: 16 }));
  assert!(matches!(values[1], ConstValue::Double { value } if value == 3.14));
  assert!(matches!(values[2], ConstValue::Int { value: 1 }));
  match &values[3] {
    ConstValue::Literal { value } => assert_eq!(value, "quoted \"name\""),
    other => panic!("unexpected value {other:?}"),
  };
  match &values[4] {
    ConstValue::List { elements } => assert_eq!(elements.len(), 3),
    other => panic!("unexpected value {other:?}"),
  };
  match &values[5] {
    ConstValue::Map { entries } => {
      assert_eq!(entries.len(), 2);
      match entries[1].1.stx.as_ref() {
        ConstValue::Identifier { name } => assert_eq!(name, "other.Kind.B"),
        other => panic!("unexpected value {other:?}"),
      };
    }
    other => panic!("unexpected value {other:?}"),
  };
}

#[test]
fn parses_annotations_and_docs() {
  let doc = parse(
    r#"
    /// A person.
    struct Person {
      /** The name. */
      1: string (python.immutable = "") name (min = "1", max = "64")
    } (final)
    "#,
  )
  .unwrap();
  let Definition::Struct(s) = doc.stx.definitions[0].stx.as_ref() else {
    panic!("expected struct");
  };
  assert_eq!(s.doc.as_deref(), Some("A person."));
  assert_eq!(s.annotations.len(), 1);
  assert_eq!(s.annotations[0].name, "final");
  assert_eq!(s.annotations[0].value, "");
  let field = &s.fields[0].stx;
  assert_eq!(field.doc.as_deref(), Some("The name."));
  let annotations: Vec<_> = field
    .annotations
    .iter()
    .map(|a| (a.name.as_str(), a.value.as_str()))
    .collect();
  assert_eq!(annotations, vec![("min", "1"), ("max", "64")]);
}

#[test]
fn locates_definitions() {
  let source = "enum E { A }\nstruct Point { 1: i32 x }";
  let doc = parse(source).unwrap();
  let def = &doc.stx.definitions[1];
  assert_eq!(&source[def.loc.0..def.loc.1], "struct Point { 1: i32 x }");
  assert_eq!(&source[def.stx.name_loc().0..def.stx.name_loc().1], "Point");
}

#[test]
fn rejects_malformed_input() {
  let err = parse("struct S { 1: i32 }").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::RequiredTokenNotFound(TT::Identifier));
  assert_eq!(err.actual_token, Some(TT::BraceClose));

  let err = parse("struct S {").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::UnexpectedEnd);

  let err = parse("struct a.B {}").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::ExpectedSyntax("undotted identifier"));

  let err = parse("struct S {}\ninclude \"late.thrift\"").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::HeaderAfterDefinition);
  assert_eq!(err.code(), "PS0009");

  let err = parse("enum E { A = 99999999999 }").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::IntegerOutOfRange);

  let err = parse("senum E {}").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::ExpectedSyntax("definition"));
}
