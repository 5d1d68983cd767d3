use ahash::HashMap;
use diagnostics::paths::normalize_fs_path;
use parking_lot::RwLock;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
  #[error("file not found: {path}")]
  NotFound { path: String },
  #[error("failed to read {path}: {message}")]
  Io { path: String, message: String },
}

impl HostError {
  fn from_io(path: &Path, err: io::Error) -> HostError {
    let path = path.display().to_string();
    match err.kind() {
      io::ErrorKind::NotFound => HostError::NotFound { path },
      _ => HostError::Io {
        path,
        message: err.to_string(),
      },
    }
  }
}

/// File system access for a load. Registration may parse files from several threads at once.
pub trait Host: Send + Sync {
  /// Canonical identity of an existing file. Different spellings of one file must produce equal
  /// results.
  fn canonicalize(&self, path: &Path) -> Result<PathBuf, HostError>;
  /// Full text of a file previously returned by [`Host::canonicalize`].
  fn read(&self, path: &Path) -> Result<Arc<str>, HostError>;
  fn is_file(&self, path: &Path) -> bool;
}

/// Reads from the real file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskHost;

impl Host for DiskHost {
  fn canonicalize(&self, path: &Path) -> Result<PathBuf, HostError> {
    std::fs::canonicalize(path).map_err(|err| HostError::from_io(path, err))
  }

  fn read(&self, path: &Path) -> Result<Arc<str>, HostError> {
    std::fs::read_to_string(path)
      .map(Arc::from)
      .map_err(|err| HostError::from_io(path, err))
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }
}

/// Virtual files keyed by normalized, forward-slashed paths. Relative paths are rooted at `/`.
#[derive(Debug, Default)]
pub struct MemoryHost {
  files: RwLock<HashMap<String, Arc<str>>>,
}

impl MemoryHost {
  pub fn new() -> MemoryHost {
    MemoryHost::default()
  }

  pub fn with_file(self, path: impl AsRef<Path>, text: impl Into<Arc<str>>) -> MemoryHost {
    self.insert(path, text);
    self
  }

  pub fn insert(&self, path: impl AsRef<Path>, text: impl Into<Arc<str>>) {
    let key = normalize_fs_path(path.as_ref());
    self.files.write().insert(key, text.into());
  }
}

impl Host for MemoryHost {
  fn canonicalize(&self, path: &Path) -> Result<PathBuf, HostError> {
    let key = normalize_fs_path(path);
    match self.files.read().contains_key(&key) {
      true => Ok(PathBuf::from(key)),
      false => Err(HostError::NotFound { path: key }),
    }
  }

  fn read(&self, path: &Path) -> Result<Arc<str>, HostError> {
    let key = normalize_fs_path(path);
    let text = self.files.read().get(&key).cloned();
    text.ok_or(HostError::NotFound { path: key })
  }

  fn is_file(&self, path: &Path) -> bool {
    self.files.read().contains_key(&normalize_fs_path(path))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn memory_host_normalizes_paths() {
    let host = MemoryHost::new().with_file("idl/shared.thrift", "enum E {}");
    let canonical = host.canonicalize(Path::new("/idl/./other/../shared.thrift")).unwrap();
    assert_eq!(canonical, PathBuf::from("/idl/shared.thrift"));
    assert!(host.is_file(Path::new("idl\\shared.thrift")));
    assert_eq!(&*host.read(&canonical).unwrap(), "enum E {}");
  }

  #[test]
  fn memory_host_reports_missing_files() {
    let host = MemoryHost::new();
    assert_eq!(
      host.canonicalize(Path::new("nope.thrift")),
      Err(HostError::NotFound {
        path: "/nope.thrift".into()
      })
    );
    assert!(host.read(Path::new("nope.thrift")).is_err());
    assert!(!host.is_file(Path::new("nope.thrift")));
  }

  #[test]
  fn disk_host_maps_not_found() {
    let err = DiskHost
      .read(Path::new("/definitely/not/here.thrift"))
      .unwrap_err();
    assert!(matches!(err, HostError::NotFound { .. }));
  }
}
