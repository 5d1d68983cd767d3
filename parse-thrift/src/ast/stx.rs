use super::const_value::ConstValue;
use super::node::Node;
use super::type_expr::TypeExpr;
use crate::loc::Loc;
use serde::Serialize;

/// An unlinked Thrift document. Type references are still plain names.
#[derive(Clone, Debug, Serialize)]
pub struct Document {
  pub headers: Vec<Node<Header>>,
  pub definitions: Vec<Node<Definition>>,
}

impl Document {
  pub fn includes(&self) -> impl Iterator<Item = &Node<Header>> {
    self
      .headers
      .iter()
      .filter(|h| matches!(h.stx.as_ref(), Header::Include { .. }))
  }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "$t")]
pub enum Header {
  Include { path: String },
  // Recorded for completeness; never followed.
  CppInclude { path: String },
  Namespace { scope: String, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Annotation {
  pub name: String,
  pub value: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "$t")]
pub enum Definition {
  Const(ConstDecl),
  Typedef(TypedefDecl),
  Enum(EnumDecl),
  Struct(StructDecl),
  Service(ServiceDecl),
}

impl Definition {
  pub fn name(&self) -> &str {
    match self {
      Definition::Const(d) => &d.name,
      Definition::Typedef(d) => &d.name,
      Definition::Enum(d) => &d.name,
      Definition::Struct(d) => &d.name,
      Definition::Service(d) => &d.name,
    }
  }

  pub fn name_loc(&self) -> Loc {
    match self {
      Definition::Const(d) => d.name_loc,
      Definition::Typedef(d) => d.name_loc,
      Definition::Enum(d) => d.name_loc,
      Definition::Struct(d) => d.name_loc,
      Definition::Service(d) => d.name_loc,
    }
  }

  pub fn doc(&self) -> Option<&str> {
    match self {
      Definition::Const(d) => d.doc.as_deref(),
      Definition::Typedef(d) => d.doc.as_deref(),
      Definition::Enum(d) => d.doc.as_deref(),
      Definition::Struct(d) => d.doc.as_deref(),
      Definition::Service(d) => d.doc.as_deref(),
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct ConstDecl {
  pub doc: Option<String>,
  pub name: String,
  pub name_loc: Loc,
  pub typ: Node<TypeExpr>,
  pub value: Node<ConstValue>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypedefDecl {
  pub doc: Option<String>,
  pub name: String,
  pub name_loc: Loc,
  pub old_type: Node<TypeExpr>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumDecl {
  pub doc: Option<String>,
  pub name: String,
  pub name_loc: Loc,
  pub members: Vec<Node<EnumMemberDecl>>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumMemberDecl {
  pub doc: Option<String>,
  pub name: String,
  // Absent when the member relies on the implicit previous + 1 numbering.
  pub value: Option<i32>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum StructKind {
  Struct,
  Union,
  Exception,
}

impl StructKind {
  pub fn keyword(self) -> &'static str {
    match self {
      StructKind::Struct => "struct",
      StructKind::Union => "union",
      StructKind::Exception => "exception",
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct StructDecl {
  pub doc: Option<String>,
  pub kind: StructKind,
  pub name: String,
  pub name_loc: Loc,
  pub fields: Vec<Node<FieldDecl>>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Requiredness {
  Required,
  Optional,
  Default,
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldDecl {
  pub doc: Option<String>,
  pub id: i32,
  // False when `id` was assigned implicitly (counting down from -1).
  pub explicit_id: bool,
  pub requiredness: Requiredness,
  pub typ: Node<TypeExpr>,
  pub name: String,
  pub default: Option<Node<ConstValue>>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceDecl {
  pub doc: Option<String>,
  pub name: String,
  pub name_loc: Loc,
  pub extends: Option<Node<String>>,
  pub functions: Vec<Node<FunctionDecl>>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionDecl {
  pub doc: Option<String>,
  pub oneway: bool,
  // `void` is kept as a named type.
  pub return_type: Node<TypeExpr>,
  pub name: String,
  pub params: Vec<Node<FieldDecl>>,
  pub throws: Vec<Node<FieldDecl>>,
  pub annotations: Vec<Annotation>,
}
