use crate::error::SyntaxErrorType;
use crate::lex::lex_next;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer).unwrap();
    assert_eq!(t.typ, expected, "in {code:?}");
  }
  let t = lex_next(&mut lexer).unwrap();
  assert_eq!(EOF, t.typ);
}

fn check_err(code: &str, expected: SyntaxErrorType) {
  let mut lexer = Lexer::new(code);
  loop {
    match lex_next(&mut lexer) {
      Ok(t) if t.typ == EOF => panic!("expected error in {code:?}"),
      Ok(_) => {}
      Err(err) => {
        assert_eq!(err.typ, expected, "in {code:?}");
        return;
      }
    }
  }
}

#[test]
fn test_lex_keywords() {
  check("struct", [KeywordStruct]);
  check("cpp_include", [KeywordCppInclude]);
  check("oneway void", [KeywordOneway, KeywordVoid]);
  check("structs", [Identifier]);
}

#[test]
fn test_lex_identifiers() {
  check("i32", [Identifier]);
  check("_private", [Identifier]);
  check("shared.Enum.MEMBER", [Identifier]);
  check("list<shared.Foo>", [KeywordList, ChevronLeft, Identifier, ChevronRight]);
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [LiteralInt]);
  check("-929", [LiteralInt]);
  check("+7", [LiteralInt]);
  check("0x7fFF", [LiteralInt]);
  check("3.14", [LiteralDouble]);
  check("1e10", [LiteralDouble]);
  check("-2.5E-3", [LiteralDouble]);
  check("1:", [LiteralInt, Colon]);
  check_err("0x", SyntaxErrorType::MalformedLiteralNumber);
  check_err("12abc", SyntaxErrorType::MalformedLiteralNumber);
  check_err("1e", SyntaxErrorType::MalformedLiteralNumber);
}

#[test]
fn test_lex_literal_strings() {
  check("'hello world'", [LiteralString]);
  check("\"say \\\"hi\\\"\"", [LiteralString]);
  check("\"multi\nline\"", [LiteralString]);
  check_err("\"never closed", SyntaxErrorType::UnterminatedString);
  check_err("'escaped end\\'", SyntaxErrorType::UnterminatedString);
}

#[test]
fn test_lex_comments() {
  check("// line\n# hash\n/* block */ enum", [KeywordEnum]);
  check("/* a */ /* b */", []);
  check_err("/* open", SyntaxErrorType::UnterminatedComment);
}

#[test]
fn test_lex_invalid_character() {
  check_err("struct S @", SyntaxErrorType::InvalidCharacter);
  check_err("é", SyntaxErrorType::InvalidCharacter);
  let err = lex_next(&mut Lexer::new("  $")).unwrap_err();
  assert_eq!(err.loc, Loc(2, 3));
  assert_eq!(err.actual_token, Some(Invalid));
}

#[test]
fn test_lex_doc_comments() {
  let code = "/** Docs. */\nstruct";
  let t = lex_next(&mut Lexer::new(code)).unwrap();
  assert_eq!(t.typ, KeywordStruct);
  assert_eq!(t.doc, Some(Loc(0, 12)));

  // Plain block comments are not documentation.
  let t = lex_next(&mut Lexer::new("/* plain */ struct")).unwrap();
  assert_eq!(t.doc, None);
  let t = lex_next(&mut Lexer::new("/**/ struct")).unwrap();
  assert_eq!(t.doc, None);

  // Consecutive triple-slash lines merge.
  let code = "/// one\n/// two\nenum";
  let t = lex_next(&mut Lexer::new(code)).unwrap();
  assert_eq!(t.doc, Some(Loc(0, 15)));

  // A plain comment breaks the run.
  let code = "/// one\n// plain\n/// two\nenum";
  let t = lex_next(&mut Lexer::new(code)).unwrap();
  assert_eq!(t.doc, Some(Loc(17, 24)));
}

#[test]
fn test_lex_punctuation() {
  check(
    "{}[]<>():,;=*",
    [
      BraceOpen,
      BraceClose,
      BracketOpen,
      BracketClose,
      ChevronLeft,
      ChevronRight,
      ParenthesisOpen,
      ParenthesisClose,
      Colon,
      Comma,
      Semicolon,
      Equals,
      Asterisk,
    ],
  );
}
