mod project;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use diagnostics::Diagnostic;
use project::load_project_config;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use thrift_schema::ConstValue;
use thrift_schema::DiskHost;
use thrift_schema::LoadOptions;
use thrift_schema::Loader;
use thrift_schema::Requiredness;
use thrift_schema::Schema;
use tracing::debug;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(author, version, about = "Thrift IDL schema loader")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Load and link entry files and everything they include.
  Load(LoadArgs),
}

#[derive(Args)]
struct LoadArgs {
  /// Entry files, loaded after any listed in the project file.
  entries: Vec<PathBuf>,

  /// Directory searched for includes not found next to the including file. Repeatable.
  #[arg(short = 'I', long = "include-path")]
  include_paths: Vec<PathBuf>,

  /// JSON5 project file with `files` and `includePaths`.
  #[arg(long)]
  project: Option<PathBuf>,

  /// Parse files one at a time.
  #[arg(long)]
  sequential: bool,

  /// Print the linked schema, or the error, as JSON.
  #[arg(long)]
  json: bool,

  /// Emit tracing spans (JSON) on stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Serialize)]
struct JsonError {
  code: &'static str,
  message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  diagnostic: Option<Diagnostic>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  schema: Option<&'a Schema>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<JsonError>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  match cli.command {
    Commands::Load(args) => run_load(args),
  }
}

fn build_loader(args: &LoadArgs) -> Result<Loader, String> {
  let mut options = LoadOptions::default();
  let mut entries = Vec::new();
  if let Some(path) = &args.project {
    let project = load_project_config(path)?;
    debug!(project = %project.project_path.display(), files = project.files.len(), "read project");
    entries.extend(project.files);
    options.include_paths.extend(project.include_paths);
    if let Some(parallel_parse) = project.parallel_parse {
      options.parallel_parse = parallel_parse;
    };
  };
  entries.extend(args.entries.iter().cloned());
  options.include_paths.extend(args.include_paths.iter().cloned());
  if args.sequential {
    options.parallel_parse = false;
  };
  if entries.is_empty() {
    return Err("no entry files given".to_string());
  };

  let mut loader = Loader::with_options(DiskHost, options);
  for entry in entries {
    loader.add_thrift_file(entry);
  }
  Ok(loader)
}

fn run_load(args: LoadArgs) -> ExitCode {
  init_tracing(args.trace);

  let loader = match build_loader(&args) {
    Ok(loader) => loader,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };
  let result = loader.load();

  if args.json {
    let output = match &result {
      Ok(schema) => JsonOutput {
        schema: Some(schema),
        error: None,
      },
      Err(err) => JsonOutput {
        schema: None,
        error: Some(JsonError {
          code: err.code(),
          message: err.to_string(),
          diagnostic: err.to_diagnostic(),
        }),
      },
    };
    match serde_json::to_string_pretty(&output) {
      Ok(serialized) => println!("{serialized}"),
      Err(err) => {
        eprintln!("failed to serialize JSON: {err}");
        return ExitCode::FAILURE;
      }
    };
  } else {
    match &result {
      Ok(schema) => print!("{}", summarize(schema)),
      Err(err) => eprint!("{}", err.render(loader.host())),
    };
  }

  match result {
    Ok(_) => ExitCode::SUCCESS,
    Err(_) => ExitCode::FAILURE,
  }
}

fn requiredness(requiredness: Requiredness) -> &'static str {
  match requiredness {
    Requiredness::Required => "required ",
    Requiredness::Optional => "optional ",
    Requiredness::Default => "",
  }
}

fn const_value(schema: &Schema, value: &ConstValue) -> String {
  match value {
    ConstValue::Int { value } => value.to_string(),
    ConstValue::Double { value } => value.to_string(),
    ConstValue::String { value } => format!("{value:?}"),
    ConstValue::EnumMember {
      enum_type, name, ..
    } => format!("{}.{name}", schema.types().name(*enum_type)),
    ConstValue::Constant { name, .. } => name.clone(),
    ConstValue::List { elements } => {
      let elements: Vec<_> = elements.iter().map(|e| const_value(schema, e)).collect();
      format!("[{}]", elements.join(", "))
    }
    ConstValue::Map { entries } => {
      let entries: Vec<_> = entries
        .iter()
        .map(|(k, v)| format!("{}: {}", const_value(schema, k), const_value(schema, v)))
        .collect();
      format!("{{{}}}", entries.join(", "))
    }
  }
}

/// One block per file listing its declarations, then a count of each kind.
fn summarize(schema: &Schema) -> String {
  let types = schema.types();
  let mut out = String::new();
  for program in schema.programs() {
    let _ = writeln!(out, "{}", program.path);
    let file = program.file;
    for e in schema.enums().iter().filter(|e| e.file == file) {
      let members: Vec<_> = e
        .members
        .iter()
        .map(|m| format!("{} = {}", m.name, m.value))
        .collect();
      let _ = writeln!(out, "  enum {} {{ {} }}", e.name, members.join(", "));
    }
    for t in schema.typedefs().iter().filter(|t| t.file == file) {
      let _ = writeln!(out, "  typedef {} {}", types.name(t.old_type), t.name);
    }
    for c in schema.constants().iter().filter(|c| c.file == file) {
      let _ = writeln!(
        out,
        "  const {} {} = {}",
        types.name(c.type_id),
        c.name,
        const_value(schema, &c.value)
      );
    }
    for s in schema.structs().iter().filter(|s| s.file == file) {
      let _ = writeln!(out, "  {} {}", s.kind.keyword(), s.name);
      for f in &s.fields {
        let _ = writeln!(
          out,
          "    {}: {}{} {}",
          f.id,
          requiredness(f.requiredness),
          types.name(f.type_id),
          f.name
        );
      }
    }
    for s in schema.services().iter().filter(|s| s.file == file) {
      match s.extends {
        Some(base) => {
          let _ = writeln!(out, "  service {} extends {}", s.name, types.name(base));
        }
        None => {
          let _ = writeln!(out, "  service {}", s.name);
        }
      };
      for m in &s.methods {
        let params: Vec<_> = m
          .params
          .iter()
          .map(|p| format!("{}: {} {}", p.id, types.name(p.type_id), p.name))
          .collect();
        let _ = writeln!(
          out,
          "    {}{} {}({})",
          if m.oneway { "oneway " } else { "" },
          types.name(m.return_type),
          m.name,
          params.join(", ")
        );
      }
    }
  }
  let _ = writeln!(
    out,
    "{} files, {} enums, {} typedefs, {} structs, {} services, {} constants",
    schema.programs().len(),
    schema.enums().len(),
    schema.typedefs().len(),
    schema.structs().len(),
    schema.services().len(),
    schema.constants().len()
  );
  out
}

fn init_tracing(enabled: bool) {
  if !enabled {
    return;
  }
  let _ = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(Level::DEBUG)
    .json()
    .with_ansi(false)
    .with_writer(std::io::stderr)
    .try_init();
}
