use super::clean_doc;
use super::Parser;
use crate::lex::lex_all;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::TT;

fn parser(code: &str) -> Parser<'_> {
  let tokens = lex_all(&mut Lexer::new(code)).unwrap();
  Parser::new(code, tokens)
}

#[test]
fn test_parser() {
  let mut p = parser("struct S {}");
  let cp = p.checkpoint();
  assert_eq!(p.next_tok_i, 0);

  let t = p.peek();
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(t.typ, TT::KeywordStruct);

  let t = p.consume();
  assert_eq!(p.next_tok_i, 1);
  assert_eq!(t.typ, TT::KeywordStruct);

  let (a, b) = p.peek_2();
  assert_eq!((a.typ, b.typ), (TT::Identifier, TT::BraceOpen));
  assert_eq!(p.next_tok_i, 1);

  assert!(!p.consume_if(TT::BraceOpen).is_match());
  assert_eq!(p.consume_if(TT::Identifier).match_loc(), Some(Loc(7, 8)));
  assert_eq!(p.since(Loc(0, 6)), Loc(0, 8));

  p.restore_checkpoint(cp);
  assert_eq!(p.next_tok_i, 0);
}

#[test]
fn test_parser_stops_at_eof() {
  let mut p = parser("enum");
  p.consume();
  assert_eq!(p.consume().typ, TT::EOF);
  assert_eq!(p.consume().typ, TT::EOF);
  assert!(!p.consume_if(TT::EOF).is_match());
  assert_eq!(p.next_tok_i, 1);
}

#[test]
fn test_clean_doc() {
  assert_eq!(clean_doc("/** Single line. */"), "Single line.");
  assert_eq!(
    clean_doc("/**\n   * First.\n   *\n   * Second.\n   */"),
    "First.\n\nSecond."
  );
  assert_eq!(clean_doc("/// One\n/// Two"), "One\nTwo");
}
