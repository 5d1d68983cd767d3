use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TT {
  // Special token used to represent the end of the source code. Easier than using and handling Option everywhere.
  EOF,
  // Reported as the actual token of an InvalidCharacter error.
  Invalid,

  Asterisk,
  BraceClose,
  BraceOpen,
  BracketClose,
  BracketOpen,
  ChevronLeft,
  ChevronRight,
  Colon,
  Comma,
  Equals,
  Identifier,
  KeywordConst,
  KeywordCppInclude,
  KeywordEnum,
  KeywordException,
  KeywordExtends,
  KeywordFalse,
  KeywordInclude,
  KeywordList,
  KeywordMap,
  KeywordNamespace,
  KeywordOneway,
  KeywordOptional,
  KeywordRequired,
  KeywordService,
  KeywordSet,
  KeywordStruct,
  KeywordThrows,
  KeywordTrue,
  KeywordTypedef,
  KeywordUnion,
  KeywordVoid,
  LiteralDouble,
  LiteralInt,
  LiteralString,
  ParenthesisClose,
  ParenthesisOpen,
  Semicolon,
}

impl TT {
  pub fn is_keyword(self) -> bool {
    matches!(
      self,
      TT::KeywordConst
        | TT::KeywordCppInclude
        | TT::KeywordEnum
        | TT::KeywordException
        | TT::KeywordExtends
        | TT::KeywordFalse
        | TT::KeywordInclude
        | TT::KeywordList
        | TT::KeywordMap
        | TT::KeywordNamespace
        | TT::KeywordOneway
        | TT::KeywordOptional
        | TT::KeywordRequired
        | TT::KeywordService
        | TT::KeywordSet
        | TT::KeywordStruct
        | TT::KeywordThrows
        | TT::KeywordTrue
        | TT::KeywordTypedef
        | TT::KeywordUnion
        | TT::KeywordVoid
    )
  }
}

#[derive(Clone, Debug)]
pub struct Token {
  pub loc: Loc,
  pub typ: TT,
  // Range of the documentation comment (`/** */` or a run of `///` lines) that immediately precedes this token, if any.
  pub doc: Option<Loc>,
}

impl Token {
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, Some(self.typ))
  }
}
