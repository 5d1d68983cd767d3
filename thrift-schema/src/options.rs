use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadOptions {
  /// Directories searched, in order, for includes not found next to the including file.
  pub include_paths: Vec<PathBuf>,
  /// Parse each registration wave on the rayon thread pool.
  pub parallel_parse: bool,
}

impl Default for LoadOptions {
  fn default() -> Self {
    Self {
      include_paths: Vec::new(),
      parallel_parse: true,
    }
  }
}
