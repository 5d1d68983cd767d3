use super::node::Node;
use serde::Serialize;

/// A type reference as written. Base types and user types are both kept by name; only containers
/// have structure at this stage.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "$t")]
pub enum TypeExpr {
  Named { name: String },
  List { element: Node<TypeExpr> },
  Set { element: Node<TypeExpr> },
  Map { key: Node<TypeExpr>, value: Node<TypeExpr> },
}

impl TypeExpr {
  pub fn named(name: impl Into<String>) -> TypeExpr {
    TypeExpr::Named { name: name.into() }
  }
}
