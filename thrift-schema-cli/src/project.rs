use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// A project file, with every path resolved against the directory containing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
  pub project_path: PathBuf,
  pub files: Vec<PathBuf>,
  pub include_paths: Vec<PathBuf>,
  pub parallel_parse: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
  #[serde(default)]
  files: Vec<String>,
  #[serde(default)]
  include_paths: Vec<String>,
  #[serde(default)]
  parallel_parse: Option<bool>,
}

fn resolve_path_relative_to(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    base.join(path)
  }
}

/// Reads a JSON5 project file such as `{ files: ["main.thrift"], includePaths: ["vendor"] }`.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig, String> {
  let text =
    fs::read_to_string(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
  let raw: RawProject =
    json5::from_str(&text).map_err(|err| format!("failed to parse {}: {err}", path.display()))?;
  let root_dir = match path.parent() {
    Some(dir) => dir.to_path_buf(),
    None => PathBuf::new(),
  };
  let resolve = |raw: &String| resolve_path_relative_to(&root_dir, Path::new(raw));
  Ok(ProjectConfig {
    project_path: path.to_path_buf(),
    files: raw.files.iter().map(resolve).collect(),
    include_paths: raw.include_paths.iter().map(resolve).collect(),
    parallel_parse: raw.parallel_parse,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_paths_against_project_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thrift.json5");
    fs::write(
      &path,
      "{\n  // entry points\n  files: ['idl/main.thrift'],\n  includePaths: ['vendor', '/opt/idl'],\n}",
    )
    .unwrap();
    let config = load_project_config(&path).unwrap();
    assert_eq!(config.files, vec![dir.path().join("idl/main.thrift")]);
    assert_eq!(config.include_paths, vec![
      dir.path().join("vendor"),
      PathBuf::from("/opt/idl"),
    ]);
    assert_eq!(config.parallel_parse, None);
  }

  #[test]
  fn reports_malformed_projects() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thrift.json5");
    fs::write(&path, "{ files: ").unwrap();
    let err = load_project_config(&path).unwrap_err();
    assert!(err.starts_with("failed to parse"), "{err}");

    let err = load_project_config(&dir.path().join("absent.json5")).unwrap_err();
    assert!(err.starts_with("failed to read"), "{err}");
  }
}
