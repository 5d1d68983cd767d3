use super::node::Node;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "$t")]
pub enum ConstValue {
  // `true` and `false` are stored as 1 and 0.
  Int { value: i64 },
  Double { value: f64 },
  Literal { value: String },
  // A possibly dotted reference to a constant or enum member.
  Identifier { name: String },
  List { elements: Vec<Node<ConstValue>> },
  Map { entries: Vec<(Node<ConstValue>, Node<ConstValue>)> },
}
