use super::Parser;
use crate::ast::const_value::ConstValue;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;

/// Parses a decimal or `0x` hexadecimal integer with an optional sign.
pub fn parse_int(raw: &str) -> Option<i64> {
  let (negative, digits) = match raw.as_bytes().first() {
    Some(b'-') => (true, &raw[1..]),
    Some(b'+') => (false, &raw[1..]),
    _ => (false, raw),
  };
  let magnitude = match digits
    .strip_prefix("0x")
    .or_else(|| digits.strip_prefix("0X"))
  {
    Some(hex) => i128::from_str_radix(hex, 16).ok()?,
    None => digits.parse::<i128>().ok()?,
  };
  i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Strips the quotes from a string literal and resolves backslash escapes. Unknown escapes keep
/// the escaped character.
pub fn unescape_string(raw: &str) -> String {
  let inner = &raw[1..raw.len() - 1];
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    };
    match chars.next() {
      Some('n') => out.push('\n'),
      Some('r') => out.push('\r'),
      Some('t') => out.push('\t'),
      Some(other) => out.push(other),
      None => out.push('\\'),
    };
  }
  out
}

impl<'a> Parser<'a> {
  pub fn parse_string_literal(&mut self) -> SyntaxResult<String> {
    let t = self.require(TT::LiteralString)?;
    Ok(unescape_string(self.str(t.loc)))
  }

  pub fn parse_const_value(&mut self) -> SyntaxResult<Node<ConstValue>> {
    let t = self.consume();
    let value = match t.typ {
      TT::LiteralInt => ConstValue::Int {
        value: parse_int(self.str(t.loc))
          .ok_or_else(|| t.error(SyntaxErrorType::IntegerOutOfRange))?,
      },
      TT::LiteralDouble => ConstValue::Double {
        value: self
          .str(t.loc)
          .parse()
          .map_err(|_| t.error(SyntaxErrorType::MalformedLiteralNumber))?,
      },
      TT::LiteralString => ConstValue::Literal {
        value: unescape_string(self.str(t.loc)),
      },
      TT::KeywordTrue => ConstValue::Int { value: 1 },
      TT::KeywordFalse => ConstValue::Int { value: 0 },
      TT::Identifier => ConstValue::Identifier {
        name: self.string(t.loc),
      },
      TT::BracketOpen => {
        let mut elements = Vec::new();
        while !self.consume_if(TT::BracketClose).is_match() {
          elements.push(self.parse_const_value()?);
          self.consume_separator();
        }
        ConstValue::List { elements }
      }
      TT::BraceOpen => {
        let mut entries = Vec::new();
        while !self.consume_if(TT::BraceClose).is_match() {
          let key = self.parse_const_value()?;
          self.require(TT::Colon)?;
          let value = self.parse_const_value()?;
          entries.push((key, value));
          self.consume_separator();
        }
        ConstValue::Map { entries }
      }
      TT::EOF => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("constant value"))),
    };
    Ok(Node::new(self.since(t.loc), value))
  }
}
