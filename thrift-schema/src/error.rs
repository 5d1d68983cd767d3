use crate::host::Host;
use crate::host::HostError;
use ahash::HashMap;
use ahash::HashMapExt;
use diagnostics::diagnostic_from_syntax_error;
use diagnostics::files::SimpleFiles;
use diagnostics::render::render_diagnostic;
use diagnostics::Diagnostic;
use diagnostics::FileId;
use diagnostics::Label;
use diagnostics::Span;
use diagnostics::TextRange;
use parse_thrift::error::SyntaxError;
use parse_thrift::loc::LineIndex;
use parse_thrift::loc::Loc;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;
use std::sync::Arc;

/// A position in a loaded file. `line` and `column` are 1-based; columns count characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
  pub file: FileId,
  pub path: Arc<str>,
  pub line: u32,
  pub column: u32,
  pub range: TextRange,
}

impl Location {
  pub fn new(file: FileId, path: Arc<str>, source: &str, lines: &LineIndex, loc: Loc) -> Location {
    let (line, column) = lines.line_col(source, loc.0);
    Location {
      file,
      path,
      line,
      column,
      range: loc.into(),
    }
  }

  pub fn span(&self) -> Span {
    Span::new(self.file, self.range)
  }
}

impl Display for Location {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}", self.path, self.line, self.column)
  }
}

fn at(location: &Option<Location>) -> String {
  location
    .as_ref()
    .map(|l| format!("{l}: "))
    .unwrap_or_default()
}

fn expected_suffix(expected: &Option<&'static str>) -> String {
  expected
    .map(|e| format!(" (expected {e})"))
    .unwrap_or_default()
}

/// The first fatal problem found during a load.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
  /// An entry or included file could not be opened. `location` is the include that named it.
  #[error("{}failed to read {path}: {source}", at(.location))]
  Read {
    path: String,
    source: HostError,
    location: Option<Location>,
  },

  #[error("{location}: {error}")]
  Parse {
    location: Location,
    error: SyntaxError,
  },

  /// `cycle` lists the participating files, starting and ending with the same one.
  #[error("{location}: circular include: {}", .cycle.join(" -> "))]
  CircularInclude {
    cycle: Vec<String>,
    location: Location,
  },

  #[error("{location}: duplicate definition of {name} (previously defined at {previous})")]
  DuplicateDefinition {
    name: String,
    location: Location,
    previous: Location,
  },

  #[error("{location}: failed to resolve type {name}{}", expected_suffix(.expected))]
  UnresolvedType {
    name: String,
    location: Location,
    /// Set when the name resolved, but to the wrong kind of declaration.
    expected: Option<&'static str>,
  },

  /// `chain` lists the typedef names, starting and ending with the same one.
  #[error("{location}: circular typedef: {}", .chain.join(" -> "))]
  CircularTypedef {
    chain: Vec<String>,
    location: Location,
  },

  /// `chain` lists the service names, starting and ending with the same one.
  #[error("{location}: circular service inheritance: {}", .chain.join(" -> "))]
  CircularExtends {
    chain: Vec<String>,
    location: Location,
  },
}

impl LoadError {
  /// Stable diagnostic code for this error. Parse errors keep their syntax error code.
  pub fn code(&self) -> &'static str {
    match self {
      LoadError::Read { .. } => "THRIFT0001",
      LoadError::Parse { error, .. } => error.code(),
      LoadError::CircularInclude { .. } => "THRIFT0002",
      LoadError::DuplicateDefinition { .. } => "THRIFT0003",
      LoadError::UnresolvedType { .. } => "THRIFT0004",
      LoadError::CircularTypedef { .. } => "THRIFT0005",
      LoadError::CircularExtends { .. } => "THRIFT0006",
    }
  }

  pub fn location(&self) -> Option<&Location> {
    match self {
      LoadError::Read { location, .. } => location.as_ref(),
      LoadError::Parse { location, .. }
      | LoadError::CircularInclude { location, .. }
      | LoadError::DuplicateDefinition { location, .. }
      | LoadError::UnresolvedType { location, .. }
      | LoadError::CircularTypedef { location, .. }
      | LoadError::CircularExtends { location, .. } => Some(location),
    }
  }

  /// Converts to a diagnostic anchored at the error's location. Returns `None` for errors without
  /// a source location, i.e. unreadable entry files.
  pub fn to_diagnostic(&self) -> Option<Diagnostic> {
    let location = self.location()?;
    let diagnostic = match self {
      LoadError::Read { path, source, .. } => Diagnostic::error(
        self.code(),
        format!("failed to read {path}"),
        location.span(),
      )
      .with_note(source.to_string()),
      LoadError::Parse { error, .. } => diagnostic_from_syntax_error(location.file, error),
      LoadError::CircularInclude { cycle, .. } => Diagnostic::error(
        self.code(),
        "circular include",
        location.span(),
      )
      .with_note(format!("cycle: {}", cycle.join(" -> "))),
      LoadError::DuplicateDefinition { name, previous, .. } => Diagnostic::error(
        self.code(),
        format!("duplicate definition of {name}"),
        location.span(),
      )
      .with_label(Label::secondary(previous.span(), "previously defined here")),
      LoadError::UnresolvedType { name, expected, .. } => {
        let diagnostic = Diagnostic::error(
          self.code(),
          format!("failed to resolve type {name}"),
          location.span(),
        );
        match expected {
          Some(expected) => diagnostic.with_note(format!("expected {expected}")),
          None => diagnostic,
        }
      }
      LoadError::CircularTypedef { chain, .. } => Diagnostic::error(
        self.code(),
        "circular typedef",
        location.span(),
      )
      .with_note(format!("chain: {}", chain.join(" -> "))),
      LoadError::CircularExtends { chain, .. } => Diagnostic::error(
        self.code(),
        "circular service inheritance",
        location.span(),
      )
      .with_note(format!("chain: {}", chain.join(" -> "))),
    };
    Some(diagnostic)
  }

  /// Renders the error with source excerpts re-read through `host`. Falls back to the plain
  /// message when there is no location.
  pub fn render(&self, host: &dyn Host) -> String {
    let Some(mut diagnostic) = self.to_diagnostic() else {
      return format!("error[{}]: {self}\n", self.code());
    };
    // Render ids are allocated in first-use order, so spans are moved onto them.
    let mut files = SimpleFiles::new();
    let mut ids = HashMap::new();
    for location in self.locations() {
      ids.entry(location.file).or_insert_with(|| {
        match host.read(Path::new(&*location.path)) {
          Ok(text) => files.add(location.path.clone(), text),
          Err(_) => files.add_unavailable(location.path.clone()),
        }
      });
    }
    let remap = |span: &mut Span| {
      if let Some(&id) = ids.get(&span.file) {
        span.file = id;
      };
    };
    remap(&mut diagnostic.primary);
    for label in &mut diagnostic.labels {
      remap(&mut label.span);
    }
    render_diagnostic(&files, &diagnostic)
  }

  fn locations(&self) -> Vec<&Location> {
    let mut locations: Vec<&Location> = self.location().into_iter().collect();
    if let LoadError::DuplicateDefinition { previous, .. } = self {
      locations.push(previous);
    };
    locations
  }
}
