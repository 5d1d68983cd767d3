use crate::render::SourceProvider;
use crate::FileId;
use std::sync::Arc;

/// A minimal in-memory store of file names and source text for rendering diagnostics without a
/// custom [`SourceProvider`] implementation.
///
/// `FileId`s are allocated in insertion order starting from zero, so adding files in load order
/// reproduces the ids a loader assigned.
#[derive(Clone, Debug, Default)]
pub struct SimpleFiles {
  files: Vec<SimpleFile>,
}

#[derive(Clone, Debug)]
struct SimpleFile {
  name: Arc<str>,
  text: Option<Arc<str>>,
}

impl SimpleFiles {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a new file and returns its [`FileId`].
  pub fn add(&mut self, name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> FileId {
    self.push(name.into(), Some(text.into()))
  }

  /// Adds a file whose text could not be read. Labels in it render without source lines.
  pub fn add_unavailable(&mut self, name: impl Into<Arc<str>>) -> FileId {
    self.push(name.into(), None)
  }

  fn push(&mut self, name: Arc<str>, text: Option<Arc<str>>) -> FileId {
    let id = u32::try_from(self.files.len()).unwrap_or(u32::MAX);
    self.files.push(SimpleFile { name, text });
    FileId(id)
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}

impl SourceProvider for SimpleFiles {
  fn file_name(&self, file: FileId) -> Option<&str> {
    self.files.get(file.index()).map(|file| file.name.as_ref())
  }

  fn file_text(&self, file: FileId) -> Option<&str> {
    self.files.get(file.index()).and_then(|file| file.text.as_deref())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::render::render_diagnostic;
  use crate::Diagnostic;
  use crate::Label;
  use crate::Span;
  use crate::TextRange;

  #[test]
  fn allocates_ids_in_order() {
    let mut files = SimpleFiles::new();
    let first = files.add("a.thrift", "enum A {}");
    let second = files.add("b.thrift", "enum B {}");
    assert_eq!(first, FileId(0));
    assert_eq!(second, FileId(1));
    assert_eq!(files.len(), 2);
    assert_eq!(files.file_name(second), Some("b.thrift"));
  }

  #[test]
  fn missing_files_degrade_gracefully() {
    let mut files = SimpleFiles::new();
    let existing = files.add("a.thrift", "const i32 A = 1");
    let unreadable = files.add_unavailable("gone.thrift");
    let missing = FileId(existing.0 + 5);

    let diagnostic = Diagnostic::error("TEST0005", "missing file", Span::new(missing, TextRange::new(0, 1)))
      .with_label(Label::secondary(Span::new(existing, TextRange::new(10, 11)), "secondary"))
      .with_label(Label::secondary(Span::new(unreadable, TextRange::new(0, 1)), "unreadable"));

    assert!(files.file_name(missing).is_none());
    assert!(files.file_text(unreadable).is_none());

    let rendered = render_diagnostic(&files, &diagnostic);
    assert!(rendered.contains(" --> <unknown>:?:?"));
    assert!(rendered.contains(" --> gone.thrift:?:?"));
    assert!(rendered.contains("<source unavailable>"));
    assert!(rendered.contains(" --> a.thrift:1:11"));
  }
}
