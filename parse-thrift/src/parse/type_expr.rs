use super::Parser;
use crate::ast::node::Node;
use crate::ast::type_expr::TypeExpr;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn parse_type_expr(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let t = self.consume();
    let typ = match t.typ {
      TT::Identifier => TypeExpr::named(self.str(t.loc)),
      TT::KeywordList => {
        self.require(TT::ChevronLeft)?;
        let element = self.parse_type_expr()?;
        self.require(TT::ChevronRight)?;
        TypeExpr::List { element }
      }
      TT::KeywordSet => {
        self.require(TT::ChevronLeft)?;
        let element = self.parse_type_expr()?;
        self.require(TT::ChevronRight)?;
        TypeExpr::Set { element }
      }
      TT::KeywordMap => {
        self.require(TT::ChevronLeft)?;
        let key = self.parse_type_expr()?;
        self.require(TT::Comma)?;
        let value = self.parse_type_expr()?;
        self.require(TT::ChevronRight)?;
        TypeExpr::Map { key, value }
      }
      TT::EOF => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("type"))),
    };
    let loc = self.since(t.loc);
    // Annotations on type references carry no linking information.
    self.parse_annotations()?;
    Ok(Node::new(loc, typ))
  }
}
