use crate::Diagnostic;
use crate::FileId;
use crate::Label;
use crate::Severity;
use parse_thrift::loc::LineIndex;
use std::cmp::max;
use std::collections::BTreeMap;
use std::fmt::Write;

const ANSI_RESET: &str = "\u{1b}[0m";
const ANSI_BOLD_RED: &str = "\u{1b}[1;31m";
const ANSI_BOLD_YELLOW: &str = "\u{1b}[1;33m";
const ANSI_BOLD_BLUE: &str = "\u{1b}[1;34m";
const ANSI_BOLD_CYAN: &str = "\u{1b}[1;36m";

/// Provides access to source text for rendering diagnostics.
pub trait SourceProvider {
  fn file_name(&self, file: FileId) -> Option<&str>;
  fn file_text(&self, file: FileId) -> Option<&str>;
}

/// Options to control diagnostic rendering.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
  pub render_secondary_files: bool,
  pub color: bool,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      render_secondary_files: true,
      color: false,
    }
  }
}

/// Render a diagnostic into a human-readable string with caret highlighting.
pub fn render_diagnostic(provider: &dyn SourceProvider, diagnostic: &Diagnostic) -> String {
  render_diagnostic_with_options(provider, diagnostic, RenderOptions::default())
}

/// Render a diagnostic with explicit options.
pub fn render_diagnostic_with_options(
  provider: &dyn SourceProvider,
  diagnostic: &Diagnostic,
  options: RenderOptions,
) -> String {
  let mut labels = Vec::with_capacity(diagnostic.labels.len() + 1);
  labels.push(Label::primary(diagnostic.primary, diagnostic.message.clone()));
  labels.extend(diagnostic.labels.iter().cloned());
  // Primary first, then by position, so output is independent of insertion order.
  labels.sort_by(|a, b| {
    b.is_primary
      .cmp(&a.is_primary)
      .then(a.span.file.cmp(&b.span.file))
      .then(a.span.range.start.cmp(&b.span.range.start))
      .then(a.span.range.end.cmp(&b.span.range.end))
      .then(a.message.cmp(&b.message))
  });
  if !options.render_secondary_files {
    labels.retain(|label| label.span.file == diagnostic.primary.file);
  }

  let mut output = String::new();
  write_severity(&mut output, diagnostic.severity, options.color);
  let _ = writeln!(output, "[{}]: {}", diagnostic.code, diagnostic.message);

  let mut start = 0;
  while start < labels.len() {
    let file = labels[start].span.file;
    let end = labels[start..]
      .iter()
      .position(|l| l.span.file != file)
      .map_or(labels.len(), |n| start + n);
    render_file_group(provider, &mut output, file, &labels[start..end], &options);
    start = end;
  }

  for note in &diagnostic.notes {
    let _ = writeln!(output, "= note: {note}");
  }
  output
}

fn write_severity(output: &mut String, severity: Severity, color: bool) {
  if !color {
    let _ = write!(output, "{severity}");
    return;
  }
  let code = match severity {
    Severity::Error => ANSI_BOLD_RED,
    Severity::Warning => ANSI_BOLD_YELLOW,
    Severity::Note => ANSI_BOLD_BLUE,
    Severity::Help => ANSI_BOLD_CYAN,
  };
  let _ = write!(output, "{code}{severity}{ANSI_RESET}");
}

struct Highlight<'a> {
  start_col: usize,
  len: usize,
  is_primary: bool,
  message: Option<&'a str>,
}

fn render_file_group(
  provider: &dyn SourceProvider,
  output: &mut String,
  file: FileId,
  labels: &[Label],
  options: &RenderOptions,
) {
  let name = provider.file_name(file).unwrap_or("<unknown>");
  let Some(text) = provider.file_text(file) else {
    let _ = writeln!(output, " --> {name}:?:?");
    let _ = writeln!(output, "  | <source unavailable>");
    for label in labels.iter().filter(|l| !l.message.is_empty()) {
      let _ = writeln!(output, "  = label: {}", label.message);
    }
    return;
  };
  let index = LineIndex::new(text);
  let (line, col) = index.line_col(text, labels[0].span.range.start as usize);
  let _ = writeln!(output, " --> {name}:{line}:{col}");

  let mut lines: BTreeMap<usize, Vec<Highlight>> = BTreeMap::new();
  for label in labels {
    let start = snap(text, label.span.range.start as usize);
    let end = snap(text, label.span.range.end as usize).max(start);
    let first_line = index.line_of(start);
    let last_line = index.line_of(end.saturating_sub(1)).max(first_line);
    for line_idx in first_line..=last_line {
      let (line_start, line_end) = index.line_bounds(line_idx, text);
      let from = start.clamp(line_start, line_end);
      let to = end.clamp(from, line_end);
      let start_col = text[line_start..from].chars().count();
      let len = max(1, text[from..to].chars().count());
      lines.entry(line_idx).or_default().push(Highlight {
        start_col,
        len,
        is_primary: label.is_primary,
        message: (line_idx == first_line).then_some(label.message.as_str()),
      });
    }
  }

  let gutter = lines
    .keys()
    .next_back()
    .map_or(1, |last| (last + 1).to_string().len());
  let _ = writeln!(output, "{:>gutter$} |", "");
  for (line_idx, highlights) in &lines {
    let (line_start, line_end) = index.line_bounds(*line_idx, text);
    let _ = writeln!(output, "{:>gutter$} | {}", line_idx + 1, &text[line_start..line_end]);
    for h in highlights {
      let marker = if h.is_primary { '^' } else { '-' };
      let run: String = std::iter::repeat(marker).take(h.len).collect();
      let _ = write!(output, "{:>gutter$} | {}", "", " ".repeat(h.start_col));
      if options.color {
        let color = if h.is_primary { ANSI_BOLD_RED } else { ANSI_BOLD_BLUE };
        let _ = write!(output, "{color}{run}{ANSI_RESET}");
      } else {
        output.push_str(&run);
      }
      match h.message {
        Some(message) if !message.is_empty() => {
          let _ = writeln!(output, " {message}");
        }
        _ => output.push('\n'),
      };
    }
  }
}

fn snap(text: &str, offset: usize) -> usize {
  let mut offset = offset.min(text.len());
  while offset > 0 && !text.is_char_boundary(offset) {
    offset -= 1;
  }
  offset
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::files::SimpleFiles;
  use crate::Span;
  use crate::TextRange;

  #[test]
  fn render_single_line_span() {
    let mut files = SimpleFiles::new();
    let file = files.add("test.thrift", "typedef Nope T");
    let diagnostic = Diagnostic::error(
      "TEST0001",
      "unknown type",
      Span::new(file, TextRange::new(8, 12)),
    );

    let rendered = render_diagnostic(&files, &diagnostic);
    let expected = "error[TEST0001]: unknown type\n --> test.thrift:1:9\n  |\n1 | typedef Nope T\n  |         ^^^^ unknown type\n";
    assert_eq!(rendered, expected);
  }

  #[test]
  fn render_multi_line_span() {
    let mut files = SimpleFiles::new();
    let text = "struct S {\n  1: i32 a\n}\n";
    let file = files.add("main.thrift", text);
    let diagnostic = Diagnostic::error(
      "TEST0002",
      "broken struct",
      Span::new(file, TextRange::new(0, text.len() as u32 - 1)),
    );

    let rendered = render_diagnostic(&files, &diagnostic);
    let expected = concat!(
      "error[TEST0002]: broken struct\n",
      " --> main.thrift:1:1\n",
      "  |\n",
      "1 | struct S {\n",
      "  | ^^^^^^^^^^ broken struct\n",
      "2 |   1: i32 a\n",
      "  | ^^^^^^^^^^\n",
      "3 | }\n",
      "  | ^\n",
    );
    assert_eq!(rendered, expected);
  }

  #[test]
  fn stable_label_ordering() {
    let mut files = SimpleFiles::new();
    let file = files.add("order.thrift", "abcdef");
    let primary = Span::new(file, TextRange::new(2, 3));
    let first = Label::secondary(Span::new(file, TextRange::new(0, 1)), "first");
    let second = Label::secondary(Span::new(file, TextRange::new(4, 5)), "second");
    let a = Diagnostic::warning("TEST0003", "ordering", primary)
      .with_label(second.clone())
      .with_label(first.clone());
    let b = Diagnostic::warning("TEST0003", "ordering", primary)
      .with_label(first)
      .with_label(second);

    let rendered = render_diagnostic(&files, &a);
    assert_eq!(rendered, render_diagnostic(&files, &b));
    assert!(rendered.starts_with("warning[TEST0003]"));
    assert!(rendered.find("first").unwrap() < rendered.find("second").unwrap());
    assert!(rendered.contains("  | -"));
  }

  #[test]
  fn secondary_files_can_be_suppressed() {
    let mut files = SimpleFiles::new();
    let a = files.add("a.thrift", "enum A {}");
    let b = files.add("b.thrift", "enum A {}");
    let diagnostic = Diagnostic::error("TEST0004", "duplicate", Span::new(b, TextRange::new(5, 6)))
      .with_label(Label::secondary(Span::new(a, TextRange::new(5, 6)), "first here"));

    let rendered = render_diagnostic(&files, &diagnostic);
    assert!(rendered.contains(" --> b.thrift:1:6"));
    assert!(rendered.contains(" --> a.thrift:1:6"));

    let options = RenderOptions {
      render_secondary_files: false,
      ..RenderOptions::default()
    };
    let rendered = render_diagnostic_with_options(&files, &diagnostic, options);
    assert!(!rendered.contains("a.thrift"));
  }

  #[test]
  fn colors_markers() {
    let mut files = SimpleFiles::new();
    let file = files.add("c.thrift", "x");
    let diagnostic = Diagnostic::error("TEST0005", "colored", Span::new(file, TextRange::new(0, 1)));
    let options = RenderOptions {
      color: true,
      ..RenderOptions::default()
    };
    let rendered = render_diagnostic_with_options(&files, &diagnostic, options);
    assert!(rendered.starts_with(ANSI_BOLD_RED));
    assert!(rendered.contains(&format!("{ANSI_BOLD_RED}^{ANSI_RESET}")));
  }

  #[test]
  fn clamps_inside_multibyte_chars() {
    let mut files = SimpleFiles::new();
    let file = files.add("utf8.thrift", "é = 1");
    let diagnostic = Diagnostic::error("TEST0006", "inside", Span::new(file, TextRange::new(1, 2)));
    let rendered = render_diagnostic(&files, &diagnostic);
    assert!(rendered.contains(" --> utf8.thrift:1:1"));
    assert!(rendered.contains("  | ^ inside"));
  }
}
