use crate::error::LoadError;
use crate::error::Location;
use crate::host::Host;
use crate::options::LoadOptions;
use ahash::HashMap;
use ahash::HashMapExt;
use diagnostics::FileId;
use parse_thrift::ast::node::Node;
use parse_thrift::ast::stx::Document;
use parse_thrift::ast::stx::Header;
use parse_thrift::loc::LineIndex;
use parse_thrift::loc::Loc;
use rayon::prelude::*;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// An include header after its target has been registered.
#[derive(Clone, Debug)]
pub struct Include {
  /// The path as written.
  pub path: String,
  /// The included file's name without directory or extension.
  pub alias: String,
  pub target: FileId,
  pub loc: Loc,
}

/// One parsed file. Created once per canonical path and never re-parsed.
#[derive(Debug)]
pub struct Program {
  pub file: FileId,
  pub canonical: PathBuf,
  pub path: Arc<str>,
  pub source: Arc<str>,
  pub lines: LineIndex,
  pub document: Node<Document>,
  pub includes: Vec<Include>,
}

impl Program {
  pub fn location(&self, loc: Loc) -> Location {
    Location::new(self.file, self.path.clone(), &self.source, &self.lines, loc)
  }

  pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
    self.document.stx.headers.iter().filter_map(|h| match h.stx.as_ref() {
      Header::Namespace { scope, name } => Some((scope.as_str(), name.as_str())),
      _ => None,
    })
  }
}

struct Pending {
  file: FileId,
  canonical: PathBuf,
  // The include header that first named this file; absent for entry files.
  requested_by: Option<Location>,
}

struct Parsed {
  source: Arc<str>,
  lines: LineIndex,
  document: Node<Document>,
}

/// Alias under which an include is visible: the file name without directory and extension.
pub fn include_alias(path: &str) -> String {
  Path::new(path)
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.to_string())
}

/// Picks the file an include refers to. Absolute paths are used as is; relative ones are tried
/// next to the including file, then under each include path. When none exists the sibling
/// candidate is returned so the failure names it.
pub fn resolve_include(
  host: &dyn Host,
  options: &LoadOptions,
  including: &Path,
  include: &str,
) -> PathBuf {
  let path = Path::new(include);
  if path.is_absolute() {
    return path.to_path_buf();
  };
  let sibling = match including.parent() {
    Some(dir) => dir.join(path),
    None => path.to_path_buf(),
  };
  if host.is_file(&sibling) {
    return sibling;
  };
  options
    .include_paths
    .iter()
    .map(|dir| dir.join(path))
    .find(|candidate| host.is_file(candidate))
    .unwrap_or(sibling)
}

struct Registry<'a> {
  host: &'a dyn Host,
  options: &'a LoadOptions,
  ids: HashMap<PathBuf, FileId>,
}

impl<'a> Registry<'a> {
  /// Assigns the next file id to an unseen canonical path and queues it on `wave`.
  fn intern(
    &mut self,
    canonical: PathBuf,
    requested_by: Option<Location>,
    wave: &mut Vec<Pending>,
  ) -> FileId {
    if let Some(&file) = self.ids.get(&canonical) {
      return file;
    };
    let file = FileId(self.ids.len() as u32);
    self.ids.insert(canonical.clone(), file);
    wave.push(Pending {
      file,
      canonical,
      requested_by,
    });
    file
  }

  fn parse(&self, pending: &Pending) -> Result<Parsed, LoadError> {
    let path = pending.canonical.display().to_string();
    let source = self
      .host
      .read(&pending.canonical)
      .map_err(|source| LoadError::Read {
        path: path.clone(),
        source,
        location: pending.requested_by.clone(),
      })?;
    let lines = LineIndex::new(&source);
    let document = parse_thrift::parse(&source).map_err(|error| LoadError::Parse {
      location: Location::new(pending.file, path.into(), &source, &lines, error.loc),
      error,
    })?;
    Ok(Parsed {
      source,
      lines,
      document,
    })
  }

  fn parse_wave(&self, wave: &[Pending]) -> Vec<Result<Parsed, LoadError>> {
    if self.options.parallel_parse && wave.len() > 1 {
      wave.par_iter().map(|p| self.parse(p)).collect()
    } else {
      wave.iter().map(|p| self.parse(p)).collect()
    }
  }
}

/// Registers the entry files and everything they transitively include, breadth-first. File ids
/// are dense and follow registration order, so `programs[id]` is the program for `FileId(id)`.
pub fn register_all(
  host: &dyn Host,
  options: &LoadOptions,
  entries: &[PathBuf],
) -> Result<Vec<Program>, LoadError> {
  let mut registry = Registry {
    host,
    options,
    ids: HashMap::new(),
  };
  let mut wave = Vec::new();
  for entry in entries {
    let canonical = host.canonicalize(entry).map_err(|source| LoadError::Read {
      path: entry.display().to_string(),
      source,
      location: None,
    })?;
    registry.intern(canonical, None, &mut wave);
  }

  let mut programs = Vec::new();
  while !wave.is_empty() {
    let parsed = registry.parse_wave(&wave);
    let mut next = Vec::new();
    for (pending, parsed) in wave.into_iter().zip(parsed) {
      let parsed = parsed?;
      let path: Arc<str> = pending.canonical.display().to_string().into();
      let mut program = Program {
        file: pending.file,
        canonical: pending.canonical,
        path,
        source: parsed.source,
        lines: parsed.lines,
        document: parsed.document,
        includes: Vec::new(),
      };
      let mut includes = Vec::new();
      for header in &program.document.stx.headers {
        let Header::Include { path } = header.stx.as_ref() else {
          continue;
        };
        let location = program.location(header.loc);
        let resolved = resolve_include(host, options, &program.canonical, path);
        let canonical = host.canonicalize(&resolved).map_err(|source| LoadError::Read {
          path: resolved.display().to_string(),
          source,
          location: Some(location.clone()),
        })?;
        includes.push(Include {
          path: path.clone(),
          alias: include_alias(path),
          target: registry.intern(canonical, Some(location), &mut next),
          loc: header.loc,
        });
      }
      program.includes = includes;
      debug!(
        file = program.file.0,
        path = %program.path,
        includes = program.includes.len(),
        "registered file"
      );
      programs.push(program);
    }
    wave = next;
  }
  Ok(programs)
}
