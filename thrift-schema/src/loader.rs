use crate::error::LoadError;
use crate::host::Host;
use crate::include_graph::check_cycles;
use crate::link::Linker;
use crate::options::LoadOptions;
use crate::registry::register_all;
use crate::schema::assemble;
use crate::schema::Schema;
use crate::symbols;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use tracing::debug_span;
use tracing::field::Empty;
use tracing::info;
use tracing::info_span;

/// Runs `f` inside a debug span for one load phase, recording how long it took.
fn phase<T>(name: &'static str, f: impl FnOnce() -> T) -> T {
  let span = debug_span!("phase", phase = name, duration_ms = Empty);
  let start = Instant::now();
  let result = span.in_scope(f);
  span.record("duration_ms", start.elapsed().as_secs_f64() * 1000.0);
  result
}

/// Collects entry files and settings, then loads them into a [`Schema`]. Each call to
/// [`Loader::load`] is independent: nothing is cached between loads.
pub struct Loader {
  host: Arc<dyn Host>,
  options: LoadOptions,
  entries: Vec<PathBuf>,
}

impl Loader {
  pub fn new(host: impl Host + 'static) -> Loader {
    Loader::with_options(host, LoadOptions::default())
  }

  pub fn with_options(host: impl Host + 'static, options: LoadOptions) -> Loader {
    Loader {
      host: Arc::new(host),
      options,
      entries: Vec::new(),
    }
  }

  pub fn host(&self) -> &dyn Host {
    self.host.as_ref()
  }

  pub fn options(&self) -> &LoadOptions {
    &self.options
  }

  pub fn entries(&self) -> &[PathBuf] {
    &self.entries
  }

  pub fn add_thrift_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
    self.entries.push(path.into());
    self
  }

  pub fn add_include_path(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
    self.options.include_paths.push(dir.into());
    self
  }

  /// Registers, checks, indexes and links every entry file and everything it includes. Stops at
  /// the first error.
  pub fn load(&self) -> Result<Schema, LoadError> {
    let span = info_span!(
      "load",
      entries = self.entries.len(),
      files = Empty,
      duration_ms = Empty
    );
    let _guard = span.enter();
    let start = Instant::now();
    let result = self.run();
    span.record("duration_ms", start.elapsed().as_secs_f64() * 1000.0);
    match &result {
      Ok(schema) => {
        span.record("files", schema.programs().len());
        info!(
          enums = schema.enums().len(),
          typedefs = schema.typedefs().len(),
          structs = schema.structs().len(),
          services = schema.services().len(),
          constants = schema.constants().len(),
          "loaded schema"
        );
      }
      Err(err) => debug!(code = err.code(), error = %err, "load failed"),
    };
    result
  }

  fn run(&self) -> Result<Schema, LoadError> {
    let host = self.host.as_ref();
    let programs = phase("register", || {
      register_all(host, &self.options, &self.entries)
    })?;
    let order = phase("include_graph", || check_cycles(&programs))?;
    let symbols = phase("symbols", || {
      programs
        .iter()
        .map(symbols::build)
        .collect::<Result<Vec<_>, _>>()
    })?;
    let (linked, types) = phase("link", || {
      let mut linker = Linker::new(&programs, &symbols);
      linker.resolve_typedefs(&order)?;
      let linked = programs
        .iter()
        .map(|p| linker.link_program(p.file))
        .collect::<Result<Vec<_>, LoadError>>()?;
      Ok::<_, LoadError>((linked, linker.into_store()))
    })?;
    Ok(phase("assemble", || assemble(&programs, linked, types)))
  }
}
