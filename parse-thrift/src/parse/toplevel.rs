use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::Definition;
use crate::ast::stx::Document;
use crate::ast::stx::Header;
use crate::ast::stx::StructKind;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn parse_document(&mut self) -> SyntaxResult<Node<Document>> {
    let mut headers = Vec::new();
    let mut definitions = Vec::new();
    loop {
      let t = self.peek();
      match t.typ {
        TT::EOF => break,
        TT::KeywordInclude | TT::KeywordCppInclude | TT::KeywordNamespace => {
          if !definitions.is_empty() {
            return Err(t.error(SyntaxErrorType::HeaderAfterDefinition));
          };
          headers.push(self.parse_header()?);
        }
        _ => definitions.push(self.parse_definition()?),
      };
      self.consume_separator();
    }
    Ok(Node::new(self.source_range(), Document {
      headers,
      definitions,
    }))
  }

  pub fn parse_header(&mut self) -> SyntaxResult<Node<Header>> {
    let start = self.consume();
    let header = match start.typ {
      TT::KeywordInclude => Header::Include {
        path: self.parse_string_literal()?,
      },
      TT::KeywordCppInclude => Header::CppInclude {
        path: self.parse_string_literal()?,
      },
      TT::KeywordNamespace => {
        let scope = self.require_predicate(
          |t| matches!(t, TT::Asterisk | TT::Identifier),
          "namespace scope",
        )?;
        let scope = self.string(scope.loc);
        let name = self.require(TT::Identifier)?;
        Header::Namespace {
          scope,
          name: self.string(name.loc),
        }
      }
      _ => return Err(start.error(SyntaxErrorType::ExpectedSyntax("header"))),
    };
    Ok(Node::new(self.since(start.loc), header))
  }

  pub fn parse_definition(&mut self) -> SyntaxResult<Node<Definition>> {
    let t = self.peek();
    let def = match t.typ {
      TT::KeywordConst => Definition::Const(self.parse_const_decl()?),
      TT::KeywordTypedef => Definition::Typedef(self.parse_typedef_decl()?),
      TT::KeywordEnum => Definition::Enum(self.parse_enum_decl()?),
      TT::KeywordStruct => Definition::Struct(self.parse_struct_decl(StructKind::Struct)?),
      TT::KeywordUnion => Definition::Struct(self.parse_struct_decl(StructKind::Union)?),
      TT::KeywordException => Definition::Struct(self.parse_struct_decl(StructKind::Exception)?),
      TT::KeywordService => Definition::Service(self.parse_service_decl()?),
      TT::EOF => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("definition"))),
    };
    Ok(Node::new(self.since(t.loc), def))
  }
}
