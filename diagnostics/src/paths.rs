//! Path normalization helpers shared across tooling.
//!
//! Produces deterministic, forward-slashed virtual paths that are stable across platforms:
//! - backslashes are replaced with `/`
//! - `.` segments are removed, `..` pops a segment without escaping the root
//! - drive letters are lowercased (`C:\foo` -> `c:/foo`)
//! - relative inputs are treated as rooted at `/`
use std::path::Path;

/// Normalize a path-like string into a canonical, forward-slashed virtual path.
pub fn normalize_path(raw: &str) -> String {
  let mut path = raw.replace('\\', "/");
  if let Some(stripped) = path.strip_prefix("//?/") {
    path = stripped.to_string();
  }
  let mut rest = path.trim_start_matches('/');

  let mut drive = None;
  let bytes = rest.as_bytes();
  if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
    drive = Some(rest[..2].to_ascii_lowercase());
    rest = rest[2..].trim_start_matches('/');
  }

  let mut components = Vec::new();
  for part in rest.split('/') {
    match part {
      "" | "." => {}
      ".." => {
        components.pop();
      }
      _ => components.push(part),
    }
  }

  let mut normalized = match drive {
    Some(drive) => format!("{drive}/"),
    None => "/".to_string(),
  };
  normalized.push_str(&components.join("/"));
  normalized
}

/// Convenience wrapper for normalizing OS paths into virtual paths.
pub fn normalize_fs_path(path: &Path) -> String {
  normalize_path(&path.to_string_lossy())
}
