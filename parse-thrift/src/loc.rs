use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A location within the current source file expressed as UTF-8 byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  /// Returns the starting offset as `u32`, clamping to `u32::MAX` if necessary.
  pub fn start_u32(&self) -> u32 {
    clamp_to_u32(self.0)
  }

  /// Returns the ending offset as `u32`, clamping to `u32::MAX` if necessary.
  pub fn end_u32(&self) -> u32 {
    clamp_to_u32(self.1)
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

fn clamp_to_u32(value: usize) -> u32 {
  u32::try_from(value).unwrap_or(u32::MAX)
}

/// Maps byte offsets to 1-based line and column numbers.
///
/// Columns count `char`s, not bytes, so a multi-byte character occupies a single column.
#[derive(Clone, Debug)]
pub struct LineIndex {
  starts: Vec<usize>,
  len: usize,
}

impl LineIndex {
  pub fn new(text: &str) -> LineIndex {
    let mut starts = vec![0];
    starts.extend(memchr::memchr_iter(b'\n', text.as_bytes()).map(|i| i + 1));
    LineIndex {
      starts,
      len: text.len(),
    }
  }

  pub fn line_count(&self) -> usize {
    self.starts.len()
  }

  /// Zero-based index of the line containing `offset`.
  pub fn line_of(&self, offset: usize) -> usize {
    let offset = offset.min(self.len);
    match self.starts.binary_search(&offset) {
      Ok(line) => line,
      Err(next) => next - 1,
    }
  }

  /// Byte bounds of a zero-based line, excluding its terminator.
  pub fn line_bounds(&self, line: usize, text: &str) -> (usize, usize) {
    let start = self.starts.get(line).copied().unwrap_or(self.len);
    let end = self
      .starts
      .get(line + 1)
      .map(|next| next - 1)
      .unwrap_or(self.len);
    let end = if end > start && text.as_bytes().get(end - 1) == Some(&b'\r') {
      end - 1
    } else {
      end
    };
    (start, end.max(start))
  }

  /// 1-based `(line, column)` of `offset` within `text`.
  pub fn line_col(&self, text: &str, offset: usize) -> (u32, u32) {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
      offset -= 1;
    }
    let line = self.line_of(offset);
    let line_start = self.starts[line];
    let column = text[line_start..offset].chars().count();
    (clamp_to_u32(line + 1), clamp_to_u32(column + 1))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extends_to_cover_both_locations() {
    let mut loc = Loc(4, 6);
    loc.extend(Loc(1, 2));
    assert_eq!(loc, Loc(1, 6));
    assert_eq!(Loc(3, 5) + Loc(9, 12), Loc(3, 12));
  }

  #[test]
  fn offsets_clamp_to_u32() {
    let loc = Loc(usize::MAX - 1, usize::MAX);
    assert_eq!(loc.start_u32(), u32::MAX);
    assert_eq!(loc.end_u32(), u32::MAX);
  }

  #[test]
  fn computes_line_and_column() {
    let text = "enum E {\n  ONE\n}\n";
    let index = LineIndex::new(text);
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.line_col(text, 0), (1, 1));
    assert_eq!(index.line_col(text, 11), (2, 3));
    assert_eq!(index.line_col(text, 15), (3, 1));
    assert_eq!(index.line_bounds(1, text), (9, 14));
  }

  #[test]
  fn columns_count_chars() {
    let text = "// é\nstruct S {}";
    let index = LineIndex::new(text);
    assert_eq!(index.line_col(text, 3), (1, 4));
    // Offsets inside a multi-byte char snap back to its start.
    assert_eq!(index.line_col(text, 4), (1, 4));
    assert_eq!(index.line_col(text, 5), (1, 5));
  }

  #[test]
  fn line_bounds_strip_carriage_returns() {
    let text = "a\r\nb";
    let index = LineIndex::new(text);
    assert_eq!(index.line_bounds(0, text), (0, 1));
    assert_eq!(index.line_bounds(1, text), (3, 4));
  }
}
