use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use core::ops::Index;
use memchr::memchr;
use memchr::memmem;
use once_cell::sync::Lazy;

#[cfg(test)]
mod tests;

pub static KEYWORDS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::KeywordConst, "const");
  map.insert(TT::KeywordCppInclude, "cpp_include");
  map.insert(TT::KeywordEnum, "enum");
  map.insert(TT::KeywordException, "exception");
  map.insert(TT::KeywordExtends, "extends");
  map.insert(TT::KeywordFalse, "false");
  map.insert(TT::KeywordInclude, "include");
  map.insert(TT::KeywordList, "list");
  map.insert(TT::KeywordMap, "map");
  map.insert(TT::KeywordNamespace, "namespace");
  map.insert(TT::KeywordOneway, "oneway");
  map.insert(TT::KeywordOptional, "optional");
  map.insert(TT::KeywordRequired, "required");
  map.insert(TT::KeywordService, "service");
  map.insert(TT::KeywordSet, "set");
  map.insert(TT::KeywordStruct, "struct");
  map.insert(TT::KeywordThrows, "throws");
  map.insert(TT::KeywordTrue, "true");
  map.insert(TT::KeywordTypedef, "typedef");
  map.insert(TT::KeywordUnion, "union");
  map.insert(TT::KeywordVoid, "void");
  map
});

pub static KEYWORD_STRS: Lazy<HashMap<&'static str, TT>> = Lazy::new(|| {
  KEYWORDS_MAPPING.iter().map(|(&tt, &s)| (s, tt)).collect()
});

#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
}

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
    }
  }

  pub fn next(&self) -> usize {
    self.next
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> &'a str {
    &self.source[self.next..]
  }

  pub fn source_range(&self) -> Loc {
    Loc(0, self.end())
  }

  fn eof_range(&self) -> Loc {
    Loc(self.end(), self.end())
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek_byte(&self, n: usize) -> Option<u8> {
    self.source.as_bytes().get(self.next + n).copied()
  }

  fn starts_with(&self, prefix: &str) -> bool {
    self.remaining().starts_with(prefix)
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint { next: self.next }
  }

  pub fn since_checkpoint(&self, checkpoint: LexerCheckpoint) -> Loc {
    Loc(checkpoint.next, self.next)
  }

  fn while_bytes(&self, pred: impl Fn(u8) -> bool) -> usize {
    self
      .remaining()
      .bytes()
      .position(|b| !pred(b))
      .unwrap_or(self.remaining().len())
  }

  fn through_byte_or_end(&self, b: u8) -> usize {
    memchr(b, self.remaining().as_bytes()).unwrap_or(self.remaining().len())
  }

  fn range(&self, len: usize) -> Loc {
    Loc(self.next, self.next + len)
  }

  fn consume(&mut self, len: usize) -> Loc {
    let loc = self.range(len);
    self.next += len;
    loc
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

fn is_id_start(b: u8) -> bool {
  b.is_ascii_alphabetic() || b == b'_'
}

fn is_id_continue(b: u8) -> bool {
  b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

// Skips whitespace and comments, returning the location of the documentation comment closest to
// the next token. Consecutive `///` lines merge into one documentation range.
fn skip_trivia(lexer: &mut Lexer<'_>) -> SyntaxResult<Option<Loc>> {
  let mut doc: Option<Loc> = None;
  let mut prev_was_line_doc = false;
  loop {
    let ws = lexer.while_bytes(|b| b.is_ascii_whitespace());
    lexer.consume(ws);
    if lexer.starts_with("/*") {
      let Some(close) = memmem::find(lexer.remaining()[2..].as_bytes(), b"*/") else {
        let loc = Loc(lexer.next, lexer.end());
        return Err(loc.error(SyntaxErrorType::UnterminatedComment, None));
      };
      let is_doc = lexer.starts_with("/**") && !lexer.starts_with("/**/");
      let loc = lexer.consume(close + 4);
      if is_doc {
        doc = Some(loc);
      }
      prev_was_line_doc = false;
    } else if lexer.starts_with("//") || lexer.starts_with("#") {
      let is_doc = lexer.starts_with("///") && !lexer.starts_with("////");
      let len = lexer.through_byte_or_end(b'\n');
      let loc = lexer.consume(len);
      if is_doc {
        doc = match doc {
          Some(prev) if prev_was_line_doc => Some(prev + loc),
          _ => Some(loc),
        };
      }
      prev_was_line_doc = is_doc;
    } else {
      return Ok(doc);
    }
  }
}

fn lex_identifier(lexer: &mut Lexer<'_>) -> TT {
  let len = lexer.while_bytes(is_id_continue);
  let loc = lexer.consume(len);
  KEYWORD_STRS
    .get(&lexer[loc])
    .copied()
    .unwrap_or(TT::Identifier)
}

fn lex_number(lexer: &mut Lexer<'_>) -> SyntaxResult<TT> {
  let cp = lexer.checkpoint();
  if matches!(lexer.peek_byte(0), Some(b'-' | b'+')) {
    lexer.consume(1);
  }
  let mut typ = TT::LiteralInt;
  if lexer.starts_with("0x") || lexer.starts_with("0X") {
    lexer.consume(2);
    let digits = lexer.while_bytes(|b| b.is_ascii_hexdigit());
    if digits == 0 {
      return Err(lexer.since_checkpoint(cp).error(SyntaxErrorType::MalformedLiteralNumber, None));
    }
    lexer.consume(digits);
  } else {
    let digits = lexer.while_bytes(|b| b.is_ascii_digit());
    lexer.consume(digits);
    if lexer.peek_byte(0) == Some(b'.') && lexer.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) {
      lexer.consume(1);
      let fraction = lexer.while_bytes(|b| b.is_ascii_digit());
      lexer.consume(fraction);
      typ = TT::LiteralDouble;
    }
    if matches!(lexer.peek_byte(0), Some(b'e' | b'E')) {
      lexer.consume(1);
      if matches!(lexer.peek_byte(0), Some(b'-' | b'+')) {
        lexer.consume(1);
      }
      let exponent = lexer.while_bytes(|b| b.is_ascii_digit());
      if exponent == 0 {
        return Err(lexer.since_checkpoint(cp).error(SyntaxErrorType::MalformedLiteralNumber, None));
      }
      lexer.consume(exponent);
      typ = TT::LiteralDouble;
    }
  }
  // A number running straight into an identifier (e.g. `12abc`) is not two tokens.
  if lexer.peek_byte(0).is_some_and(is_id_start) {
    let tail = lexer.while_bytes(is_id_continue);
    lexer.consume(tail);
    return Err(lexer.since_checkpoint(cp).error(SyntaxErrorType::MalformedLiteralNumber, None));
  }
  Ok(typ)
}

fn lex_string(lexer: &mut Lexer<'_>, quote: u8) -> SyntaxResult<TT> {
  let cp = lexer.checkpoint();
  lexer.consume(1);
  loop {
    let len = lexer.while_bytes(|b| b != quote && b != b'\\');
    lexer.consume(len);
    match lexer.peek_byte(0) {
      None => {
        return Err(lexer.since_checkpoint(cp).error(SyntaxErrorType::UnterminatedString, None));
      }
      Some(b'\\') => {
        // Skip the escaped char, which may be multi-byte.
        let escaped = lexer.remaining()[1..].chars().next().map_or(0, char::len_utf8);
        lexer.consume(1 + escaped);
      }
      Some(_) => {
        lexer.consume(1);
        return Ok(TT::LiteralString);
      }
    }
  }
}

pub fn lex_next(lexer: &mut Lexer<'_>) -> SyntaxResult<Token> {
  let doc = skip_trivia(lexer)?;
  if lexer.at_end() {
    return Ok(Token {
      loc: lexer.eof_range(),
      typ: TT::EOF,
      doc,
    });
  };
  let cp = lexer.checkpoint();
  let Some(c) = lexer.peek_byte(0) else {
    unreachable!();
  };
  let punctuator = match c {
    b'*' => Some(TT::Asterisk),
    b'}' => Some(TT::BraceClose),
    b'{' => Some(TT::BraceOpen),
    b']' => Some(TT::BracketClose),
    b'[' => Some(TT::BracketOpen),
    b'<' => Some(TT::ChevronLeft),
    b'>' => Some(TT::ChevronRight),
    b':' => Some(TT::Colon),
    b',' => Some(TT::Comma),
    b'=' => Some(TT::Equals),
    b')' => Some(TT::ParenthesisClose),
    b'(' => Some(TT::ParenthesisOpen),
    b';' => Some(TT::Semicolon),
    _ => None,
  };
  let typ = if let Some(typ) = punctuator {
    lexer.consume(1);
    typ
  } else if c == b'"' || c == b'\'' {
    lex_string(lexer, c)?
  } else if c.is_ascii_digit()
    || (matches!(c, b'-' | b'+') && lexer.peek_byte(1).is_some_and(|b| b.is_ascii_digit()))
  {
    lex_number(lexer)?
  } else if is_id_start(c) {
    lex_identifier(lexer)
  } else {
    let len = lexer.remaining().chars().next().map_or(1, char::len_utf8);
    return Err(lexer.range(len).error(SyntaxErrorType::InvalidCharacter, Some(TT::Invalid)));
  };
  Ok(Token {
    loc: lexer.since_checkpoint(cp),
    typ,
    doc,
  })
}

/// Lexes the entire source, ending with a single [`TT::EOF`] token.
pub fn lex_all(lexer: &mut Lexer<'_>) -> SyntaxResult<Vec<Token>> {
  let mut tokens = Vec::new();
  loop {
    let token = lex_next(lexer)?;
    let done = token.typ == TT::EOF;
    tokens.push(token);
    if done {
      return Ok(tokens);
    }
  }
}
