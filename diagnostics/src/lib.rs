//! Shared diagnostics model and rendering utilities.
//!
//! ```
//! use diagnostics::files::SimpleFiles;
//! use diagnostics::render::render_diagnostic;
//! use diagnostics::{Diagnostic, Span, TextRange};
//!
//! let mut files = SimpleFiles::new();
//! let file = files.add("example.thrift", "struct S { 1: Nope n }");
//! let diag = Diagnostic::error(
//!   "TEST0001",
//!   "an example error",
//!   Span::new(file, TextRange::new(14, 18)),
//! );
//!
//! let rendered = render_diagnostic(&files, &diag);
//! assert!(rendered.contains("TEST0001"));
//! assert!(rendered.contains("--> example.thrift:1:15"));
//! ```

pub mod files;
pub mod paths;
pub mod render;

use parse_thrift::error::SyntaxError;
use parse_thrift::loc::Loc;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;

/// A stable identifier for a file in a load.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

impl FileId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// A byte range in a file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct TextRange {
  pub start: u32,
  pub end: u32,
}

impl TextRange {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  pub fn len(&self) -> u32 {
    self.end.saturating_sub(self.start)
  }

  pub fn is_empty(&self) -> bool {
    self.start >= self.end
  }
}

impl From<Loc> for TextRange {
  /// Converts a `Loc` by saturating to `u32`.
  fn from(value: Loc) -> Self {
    Self {
      start: value.start_u32(),
      end: value.end_u32(),
    }
  }
}

/// A span across a specific file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Span {
  pub file: FileId,
  pub range: TextRange,
}

impl Span {
  pub const fn new(file: FileId, range: TextRange) -> Self {
    Self { file, range }
  }
}

/// Diagnostic severity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
  Note,
  Help,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Note => "note",
      Severity::Help => "help",
    }
  }
}

impl Display for Severity {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A label attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Label {
  pub span: Span,
  pub message: String,
  pub is_primary: bool,
}

impl Label {
  pub fn new(span: Span, message: impl Into<String>, is_primary: bool) -> Self {
    Self {
      span,
      message: message.into(),
      is_primary,
    }
  }

  pub fn primary(span: Span, message: impl Into<String>) -> Self {
    Self::new(span, message, true)
  }

  pub fn secondary(span: Span, message: impl Into<String>) -> Self {
    Self::new(span, message, false)
  }
}

/// A user-facing diagnostic with optional labels and notes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub code: &'static str,
  pub severity: Severity,
  pub message: String,
  pub primary: Span,
  pub labels: Vec<Label>,
  pub notes: Vec<String>,
}

impl Diagnostic {
  pub fn new(
    severity: Severity,
    code: &'static str,
    message: impl Into<String>,
    primary: Span,
  ) -> Self {
    Self {
      code,
      severity,
      message: message.into(),
      primary,
      labels: Vec::new(),
      notes: Vec::new(),
    }
  }

  pub fn error(code: &'static str, message: impl Into<String>, primary: Span) -> Self {
    Self::new(Severity::Error, code, message, primary)
  }

  pub fn warning(code: &'static str, message: impl Into<String>, primary: Span) -> Self {
    Self::new(Severity::Warning, code, message, primary)
  }

  pub fn with_label(mut self, label: Label) -> Self {
    self.labels.push(label);
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.notes.push(note.into());
    self
  }
}

/// Convert a parse-thrift [`SyntaxError`] into a [`Diagnostic`]. The syntax error's `PS` code is
/// kept.
pub fn diagnostic_from_syntax_error(file: FileId, err: &SyntaxError) -> Diagnostic {
  let span = Span::new(file, err.loc.into());
  let mut diagnostic = Diagnostic::error(err.code(), err.message(), span);
  if err.loc.1 > u32::MAX as usize {
    diagnostic = diagnostic.with_note(format!(
      "byte offsets truncated to fit u32 (start={}, end={})",
      err.loc.0, err.loc.1
    ));
  }
  diagnostic
}

#[cfg(test)]
mod tests {
  use super::*;
  use parse_thrift::error::SyntaxErrorType;
  use parse_thrift::token::TT;

  #[test]
  fn converts_syntax_error() {
    let err = SyntaxError::new(
      SyntaxErrorType::RequiredTokenNotFound(TT::Identifier),
      Loc(2, 5),
      Some(TT::BraceClose),
    );
    let diagnostic = diagnostic_from_syntax_error(FileId(1), &err);
    assert_eq!(diagnostic.code, "PS0002");
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.primary.file, FileId(1));
    assert_eq!(diagnostic.primary.range, TextRange::new(2, 5));
    assert!(diagnostic.message.contains("Identifier"));
    assert!(diagnostic.notes.is_empty());
  }

  #[test]
  fn records_overflow_note_from_loc() {
    let loc = Loc(usize::MAX - 1, usize::MAX);
    let err = SyntaxError::new(SyntaxErrorType::UnexpectedEnd, loc, None);
    let diagnostic = diagnostic_from_syntax_error(FileId(0), &err);
    assert_eq!(diagnostic.primary.range.start, u32::MAX);
    assert_eq!(diagnostic.primary.range.end, u32::MAX);
    assert_eq!(diagnostic.notes.len(), 1);
    assert!(diagnostic.notes[0].contains("truncated"));
  }

  #[test]
  fn loc_conversion_is_lossless_when_fitting() {
    let range: TextRange = Loc(10, 20).into();
    assert_eq!(range, TextRange::new(10, 20));
    assert_eq!(range.len(), 10);
    assert!(!range.is_empty());
  }

  #[test]
  fn serializes_to_json() {
    let diagnostic = Diagnostic::error("T1", "msg", Span::new(FileId(3), TextRange::new(1, 2)))
      .with_note("extra");
    let json = serde_json::to_value(&diagnostic).unwrap();
    assert_eq!(json["code"], "T1");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["primary"]["file"], 3);
    assert_eq!(json["notes"][0], "extra");
  }
}
