pub mod const_value;
pub mod node;
pub mod stx;
pub mod type_expr;
