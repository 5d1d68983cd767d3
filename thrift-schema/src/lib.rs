//! Loads Thrift IDL files and links them into a [`Schema`].
//!
//! A load registers the entry files and every file they include, rejects include cycles, indexes
//! each file's declarations, resolves every type and constant reference, and flattens the result.
//! Cross-file references must be scoped by the include alias (`shared.Name`); nothing declared in
//! an included file is visible unqualified. The first problem found aborts the load with a
//! [`LoadError`].

pub mod error;
pub mod host;
pub mod include_graph;
pub mod link;
pub mod loader;
pub mod options;
pub mod registry;
pub mod schema;
pub mod symbols;
pub mod types;

pub use error::{LoadError, Location};
pub use host::{DiskHost, Host, HostError, MemoryHost};
pub use loader::Loader;
pub use options::LoadOptions;
pub use schema::{
  ConstValue, Constant, EnumMember, EnumType, Field, ProgramInfo, Schema, Service, ServiceMethod,
  StructType, Typedef,
};
pub use types::{BuiltinType, TypeId, TypeKind, TypeStore};

pub use parse_thrift::ast::stx::{Annotation, Requiredness, StructKind};

use std::path::PathBuf;

/// Loads `paths`, in order, from the real file system.
pub fn load<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Result<Schema, LoadError> {
  let mut loader = Loader::new(DiskHost);
  for path in paths {
    loader.add_thrift_file(path);
  }
  loader.load()
}
