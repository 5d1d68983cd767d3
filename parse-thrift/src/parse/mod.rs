use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;

pub mod const_value;
pub mod def;
#[cfg(test)]
mod tests;
pub mod toplevel;
pub mod type_expr;

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  typ: TT,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.typ))
  }

  pub fn and_then<R, F: FnOnce() -> SyntaxResult<R>>(self, f: F) -> SyntaxResult<Option<R>> {
    Ok(if self.matched { Some(f()?) } else { None })
  }
}

pub struct ParserCheckpoint {
  next_tok_i: usize,
}

pub struct Parser<'a> {
  source: &'a str,
  // Always ends with a single EOF token.
  tokens: Vec<Token>,
  next_tok_i: usize,
}

impl<'a> Parser<'a> {
  pub fn new(source: &'a str, tokens: Vec<Token>) -> Parser<'a> {
    debug_assert!(tokens.last().is_some_and(|t| t.typ == TT::EOF));
    Parser {
      source,
      tokens,
      next_tok_i: 0,
    }
  }

  pub fn source_range(&self) -> Loc {
    Loc(0, self.source.len())
  }

  pub fn str(&self, loc: Loc) -> &'a str {
    &self.source[loc.0..loc.1]
  }

  pub fn string(&self, loc: Loc) -> String {
    self.str(loc).to_string()
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  /// Location from the start of `start` through the end of the last consumed token.
  pub fn since(&self, start: Loc) -> Loc {
    let end = self
      .next_tok_i
      .checked_sub(1)
      .and_then(|i| self.tokens.get(i))
      .map_or(start.1, |t| t.loc.1);
    Loc(start.0, end.max(start.1))
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, keep: K) -> (bool, Token) {
    let i = self.next_tok_i.min(self.tokens.len() - 1);
    let t = self.tokens[i].clone();
    let k = keep(&t) && t.typ != TT::EOF;
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume(&mut self) -> Token {
    self.forward(|_| true).1
  }

  pub fn peek(&mut self) -> Token {
    self.forward(|_| false).1
  }

  pub fn peek_2(&mut self) -> (Token, Token) {
    let cp = self.checkpoint();
    let a = self.forward(|_| true);
    let b = self.forward(|_| true);
    self.restore_checkpoint(cp);
    (a.1, b.1)
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    let (matched, t) = self.forward(|t| t.typ == typ);
    MaybeToken {
      typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn consume_if_pred<F: FnOnce(&Token) -> bool>(&mut self, pred: F) -> MaybeToken {
    let (matched, t) = self.forward(pred);
    MaybeToken {
      typ: t.typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    let t = self.consume();
    if t.typ == TT::EOF && typ != TT::EOF {
      Err(t.error(SyntaxErrorType::UnexpectedEnd))
    } else if t.typ != typ {
      Err(t.error(SyntaxErrorType::RequiredTokenNotFound(typ)))
    } else {
      Ok(t)
    }
  }

  pub fn require_predicate<P: FnOnce(TT) -> bool>(
    &mut self,
    pred: P,
    expected: &'static str,
  ) -> SyntaxResult<Token> {
    let t = self.consume();
    if t.typ == TT::EOF {
      Err(t.error(SyntaxErrorType::UnexpectedEnd))
    } else if !pred(t.typ) {
      Err(t.error(SyntaxErrorType::ExpectedSyntax(expected)))
    } else {
      Ok(t)
    }
  }

  /// Consumes an optional `,` or `;` list separator.
  pub fn consume_separator(&mut self) {
    let _ = self.consume_if_pred(|t| matches!(t.typ, TT::Comma | TT::Semicolon));
  }

  /// Documentation attached to the next token, with comment decoration removed.
  pub fn peek_doc(&mut self) -> Option<String> {
    let doc = self.peek().doc?;
    let text = clean_doc(self.str(doc));
    (!text.is_empty()).then_some(text)
  }
}

fn clean_doc(raw: &str) -> String {
  let body = match raw.strip_prefix("/**") {
    Some(rest) => rest.strip_suffix("*/").unwrap_or(rest),
    None => raw,
  };
  let lines: Vec<&str> = body
    .lines()
    .map(|line| {
      let line = line.trim();
      let line = line
        .strip_prefix("///")
        .or_else(|| line.strip_prefix('*'))
        .unwrap_or(line);
      line.strip_prefix(' ').unwrap_or(line).trim_end()
    })
    .collect();
  lines.join("\n").trim().to_string()
}
