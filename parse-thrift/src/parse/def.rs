use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::Annotation;
use crate::ast::stx::ConstDecl;
use crate::ast::stx::EnumDecl;
use crate::ast::stx::EnumMemberDecl;
use crate::ast::stx::FieldDecl;
use crate::ast::stx::FunctionDecl;
use crate::ast::stx::Requiredness;
use crate::ast::stx::ServiceDecl;
use crate::ast::stx::StructDecl;
use crate::ast::stx::StructKind;
use crate::ast::stx::TypedefDecl;
use crate::ast::type_expr::TypeExpr;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Declared names may not be dotted; dots are reserved for scoped references.
  pub fn require_decl_name(&mut self) -> SyntaxResult<(String, Loc)> {
    let t = self.require(TT::Identifier)?;
    let name = self.str(t.loc);
    if name.contains('.') {
      return Err(t.error(SyntaxErrorType::ExpectedSyntax("undotted identifier")));
    };
    Ok((name.to_string(), t.loc))
  }

  pub fn parse_annotations(&mut self) -> SyntaxResult<Vec<Annotation>> {
    let mut annotations = Vec::new();
    if !self.consume_if(TT::ParenthesisOpen).is_match() {
      return Ok(annotations);
    };
    while !self.consume_if(TT::ParenthesisClose).is_match() {
      let name = self.require(TT::Identifier)?;
      let name = self.string(name.loc);
      let value = match self.consume_if(TT::Equals).is_match() {
        true => self.parse_string_literal()?,
        false => String::new(),
      };
      annotations.push(Annotation { name, value });
      self.consume_separator();
    }
    Ok(annotations)
  }

  pub fn parse_const_decl(&mut self) -> SyntaxResult<ConstDecl> {
    let doc = self.peek_doc();
    self.require(TT::KeywordConst)?;
    let typ = self.parse_type_expr()?;
    let (name, name_loc) = self.require_decl_name()?;
    self.require(TT::Equals)?;
    let value = self.parse_const_value()?;
    let annotations = self.parse_annotations()?;
    Ok(ConstDecl {
      doc,
      name,
      name_loc,
      typ,
      value,
      annotations,
    })
  }

  pub fn parse_typedef_decl(&mut self) -> SyntaxResult<TypedefDecl> {
    let doc = self.peek_doc();
    self.require(TT::KeywordTypedef)?;
    let old_type = self.parse_type_expr()?;
    let (name, name_loc) = self.require_decl_name()?;
    let annotations = self.parse_annotations()?;
    Ok(TypedefDecl {
      doc,
      name,
      name_loc,
      old_type,
      annotations,
    })
  }

  pub fn parse_enum_decl(&mut self) -> SyntaxResult<EnumDecl> {
    let doc = self.peek_doc();
    self.require(TT::KeywordEnum)?;
    let (name, name_loc) = self.require_decl_name()?;
    self.require(TT::BraceOpen)?;
    let mut members = Vec::new();
    // Tracks the value an unnumbered member would take, to reject implicit overflow here rather
    // than during linking.
    let mut next_value = 0i64;
    while !self.consume_if(TT::BraceClose).is_match() {
      let member_doc = self.peek_doc();
      let (member_name, start) = self.require_decl_name()?;
      let value = match self.consume_if(TT::Equals).is_match() {
        true => {
          let t = self.require(TT::LiteralInt)?;
          let value = super::const_value::parse_int(self.str(t.loc))
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| t.error(SyntaxErrorType::IntegerOutOfRange))?;
          Some(value)
        }
        false => {
          if i32::try_from(next_value).is_err() {
            return Err(start.error(SyntaxErrorType::IntegerOutOfRange, None));
          };
          None
        }
      };
      next_value = value.map_or(next_value, i64::from) + 1;
      let annotations = self.parse_annotations()?;
      members.push(Node::new(self.since(start), EnumMemberDecl {
        doc: member_doc,
        name: member_name,
        value,
        annotations,
      }));
      self.consume_separator();
    }
    let annotations = self.parse_annotations()?;
    Ok(EnumDecl {
      doc,
      name,
      name_loc,
      members,
      annotations,
    })
  }

  pub fn parse_struct_decl(&mut self, kind: StructKind) -> SyntaxResult<StructDecl> {
    let doc = self.peek_doc();
    self.consume();
    let (name, name_loc) = self.require_decl_name()?;
    self.require(TT::BraceOpen)?;
    let fields = self.parse_fields(TT::BraceClose)?;
    let annotations = self.parse_annotations()?;
    Ok(StructDecl {
      doc,
      kind,
      name,
      name_loc,
      fields,
      annotations,
    })
  }

  /// Parses fields up to and including `close`. Fields without an explicit id are numbered
  /// -1, -2, ... in declaration order.
  pub fn parse_fields(&mut self, close: TT) -> SyntaxResult<Vec<Node<FieldDecl>>> {
    let mut fields = Vec::new();
    let mut next_implicit_id = -1;
    while !self.consume_if(close).is_match() {
      let field = self.parse_field(&mut next_implicit_id)?;
      fields.push(field);
    }
    Ok(fields)
  }

  fn parse_field(&mut self, next_implicit_id: &mut i32) -> SyntaxResult<Node<FieldDecl>> {
    let doc = self.peek_doc();
    let start = self.peek().loc;
    let explicit_id = match self.peek_2() {
      (a, b) if a.typ == TT::LiteralInt && b.typ == TT::Colon => {
        let t = self.consume();
        self.consume();
        let id = super::const_value::parse_int(self.str(t.loc))
          .and_then(|v| i32::try_from(v).ok())
          .ok_or_else(|| t.error(SyntaxErrorType::IntegerOutOfRange))?;
        Some(id)
      }
      _ => None,
    };
    let requiredness = if self.consume_if(TT::KeywordRequired).is_match() {
      Requiredness::Required
    } else if self.consume_if(TT::KeywordOptional).is_match() {
      Requiredness::Optional
    } else {
      Requiredness::Default
    };
    let typ = self.parse_type_expr()?;
    let (name, _) = self.require_decl_name()?;
    let default = self
      .consume_if(TT::Equals)
      .and_then(|| self.parse_const_value())?;
    let annotations = self.parse_annotations()?;
    let id = explicit_id.unwrap_or_else(|| {
      let id = *next_implicit_id;
      *next_implicit_id -= 1;
      id
    });
    let loc = self.since(start);
    self.consume_separator();
    Ok(Node::new(loc, FieldDecl {
      doc,
      id,
      explicit_id: explicit_id.is_some(),
      requiredness,
      typ,
      name,
      default,
      annotations,
    }))
  }

  pub fn parse_service_decl(&mut self) -> SyntaxResult<ServiceDecl> {
    let doc = self.peek_doc();
    self.require(TT::KeywordService)?;
    let (name, name_loc) = self.require_decl_name()?;
    let extends = match self.consume_if(TT::KeywordExtends).is_match() {
      true => {
        let t = self.require(TT::Identifier)?;
        Some(Node::new(t.loc, self.string(t.loc)))
      }
      false => None,
    };
    self.require(TT::BraceOpen)?;
    let mut functions = Vec::new();
    while !self.consume_if(TT::BraceClose).is_match() {
      functions.push(self.parse_function()?);
      self.consume_separator();
    }
    let annotations = self.parse_annotations()?;
    Ok(ServiceDecl {
      doc,
      name,
      name_loc,
      extends,
      functions,
      annotations,
    })
  }

  pub fn parse_function(&mut self) -> SyntaxResult<Node<FunctionDecl>> {
    let doc = self.peek_doc();
    let start = self.peek().loc;
    let oneway = self.consume_if(TT::KeywordOneway).is_match();
    let return_type = match self.consume_if(TT::KeywordVoid).match_loc() {
      Some(loc) => Node::new(loc, TypeExpr::named("void")),
      None => self.parse_type_expr()?,
    };
    let (name, _) = self.require_decl_name()?;
    self.require(TT::ParenthesisOpen)?;
    let params = self.parse_fields(TT::ParenthesisClose)?;
    let throws = match self.consume_if(TT::KeywordThrows).is_match() {
      true => {
        self.require(TT::ParenthesisOpen)?;
        self.parse_fields(TT::ParenthesisClose)?
      }
      false => Vec::new(),
    };
    let annotations = self.parse_annotations()?;
    Ok(Node::new(self.since(start), FunctionDecl {
      doc,
      oneway,
      return_type,
      name,
      params,
      throws,
      annotations,
    }))
  }
}
