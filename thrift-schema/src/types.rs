use diagnostics::FileId;
use parse_thrift::ast::stx::StructKind;
use serde::Serialize;

/// Handle to a type in a [`TypeStore`]. Every reference to one declared type yields the same id;
/// comparing ids compares identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
  pub const VOID: TypeId = TypeId(0);
  pub const BOOL: TypeId = TypeId(1);
  pub const BYTE: TypeId = TypeId(2);
  pub const I16: TypeId = TypeId(3);
  pub const I32: TypeId = TypeId(4);
  pub const I64: TypeId = TypeId(5);
  pub const DOUBLE: TypeId = TypeId(6);
  pub const STRING: TypeId = TypeId(7);
  pub const BINARY: TypeId = TypeId(8);

  fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum BuiltinType {
  Void,
  Bool,
  Byte,
  I16,
  I32,
  I64,
  Double,
  String,
  Binary,
}

impl BuiltinType {
  /// In reserved id order.
  pub const ALL: [BuiltinType; 9] = [
    BuiltinType::Void,
    BuiltinType::Bool,
    BuiltinType::Byte,
    BuiltinType::I16,
    BuiltinType::I32,
    BuiltinType::I64,
    BuiltinType::Double,
    BuiltinType::String,
    BuiltinType::Binary,
  ];

  pub fn name(self) -> &'static str {
    match self {
      BuiltinType::Void => "void",
      BuiltinType::Bool => "bool",
      BuiltinType::Byte => "byte",
      BuiltinType::I16 => "i16",
      BuiltinType::I32 => "i32",
      BuiltinType::I64 => "i64",
      BuiltinType::Double => "double",
      BuiltinType::String => "string",
      BuiltinType::Binary => "binary",
    }
  }

  /// `i8` is an alias of `byte`.
  pub fn from_name(name: &str) -> Option<BuiltinType> {
    Some(match name {
      "void" => BuiltinType::Void,
      "bool" => BuiltinType::Bool,
      "byte" | "i8" => BuiltinType::Byte,
      "i16" => BuiltinType::I16,
      "i32" => BuiltinType::I32,
      "i64" => BuiltinType::I64,
      "double" => BuiltinType::Double,
      "string" => BuiltinType::String,
      "binary" => BuiltinType::Binary,
      _ => return None,
    })
  }

  pub fn type_id(self) -> TypeId {
    TypeId(self as u32)
  }
}

/// What a [`TypeId`] denotes. Named kinds carry their declaring file and an index into the
/// matching flat collection of the schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "$t")]
pub enum TypeKind {
  Builtin {
    builtin: BuiltinType,
  },
  List {
    element: TypeId,
  },
  Set {
    element: TypeId,
  },
  Map {
    key: TypeId,
    value: TypeId,
  },
  Enum {
    file: FileId,
    name: String,
    index: usize,
  },
  Struct {
    file: FileId,
    name: String,
    kind: StructKind,
    index: usize,
  },
  Service {
    file: FileId,
    name: String,
    index: usize,
  },
  Typedef {
    file: FileId,
    name: String,
    old_type: TypeId,
    index: usize,
  },
}

/// Arena of every type created by one load.
#[derive(Clone, Debug, Serialize)]
pub struct TypeStore {
  kinds: Vec<TypeKind>,
}

impl Default for TypeStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TypeStore {
  pub fn new() -> TypeStore {
    TypeStore {
      kinds: BuiltinType::ALL
        .iter()
        .map(|&builtin| TypeKind::Builtin { builtin })
        .collect(),
    }
  }

  pub(crate) fn alloc(&mut self, kind: TypeKind) -> TypeId {
    let id = TypeId(self.kinds.len() as u32);
    self.kinds.push(kind);
    id
  }

  pub fn len(&self) -> usize {
    self.kinds.len()
  }

  pub fn is_empty(&self) -> bool {
    self.kinds.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeKind)> {
    self
      .kinds
      .iter()
      .enumerate()
      .map(|(i, kind)| (TypeId(i as u32), kind))
  }

  pub fn kind(&self, id: TypeId) -> &TypeKind {
    &self.kinds[id.index()]
  }

  /// Built-in keyword, declared name, or the rendered container (e.g. `map<i32, string>`).
  pub fn name(&self, id: TypeId) -> String {
    match self.kind(id) {
      TypeKind::Builtin { builtin } => builtin.name().to_string(),
      TypeKind::List { element } => format!("list<{}>", self.name(*element)),
      TypeKind::Set { element } => format!("set<{}>", self.name(*element)),
      TypeKind::Map { key, value } => format!("map<{}, {}>", self.name(*key), self.name(*value)),
      TypeKind::Enum { name, .. }
      | TypeKind::Struct { name, .. }
      | TypeKind::Service { name, .. }
      | TypeKind::Typedef { name, .. } => name.clone(),
    }
  }

  /// Follows typedef chains to the first non-typedef type.
  pub fn true_type(&self, id: TypeId) -> TypeId {
    let mut id = id;
    while let TypeKind::Typedef { old_type, .. } = self.kind(id) {
      id = *old_type;
    }
    id
  }

  pub fn builtin(&self, id: TypeId) -> Option<BuiltinType> {
    match self.kind(id) {
      TypeKind::Builtin { builtin } => Some(*builtin),
      _ => None,
    }
  }

  pub fn file(&self, id: TypeId) -> Option<FileId> {
    match self.kind(id) {
      TypeKind::Enum { file, .. }
      | TypeKind::Struct { file, .. }
      | TypeKind::Service { file, .. }
      | TypeKind::Typedef { file, .. } => Some(*file),
      _ => None,
    }
  }

  pub fn is_builtin(&self, id: TypeId) -> bool {
    matches!(self.kind(id), TypeKind::Builtin { .. })
  }

  pub fn is_typedef(&self, id: TypeId) -> bool {
    matches!(self.kind(id), TypeKind::Typedef { .. })
  }

  pub fn is_container(&self, id: TypeId) -> bool {
    matches!(
      self.kind(id),
      TypeKind::List { .. } | TypeKind::Set { .. } | TypeKind::Map { .. }
    )
  }

  pub fn is_enum(&self, id: TypeId) -> bool {
    matches!(self.kind(id), TypeKind::Enum { .. })
  }

  /// Structs, unions and exceptions.
  pub fn is_struct_like(&self, id: TypeId) -> bool {
    matches!(self.kind(id), TypeKind::Struct { .. })
  }

  pub fn is_service(&self, id: TypeId) -> bool {
    matches!(self.kind(id), TypeKind::Service { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtins_have_reserved_ids() {
    let store = TypeStore::new();
    assert_eq!(store.len(), BuiltinType::ALL.len());
    for builtin in BuiltinType::ALL {
      assert_eq!(store.builtin(builtin.type_id()), Some(builtin));
      assert_eq!(BuiltinType::from_name(builtin.name()), Some(builtin));
    }
    assert_eq!(BuiltinType::I32.type_id(), TypeId::I32);
    assert_eq!(BuiltinType::Binary.type_id(), TypeId::BINARY);
    assert_eq!(BuiltinType::from_name("i8"), Some(BuiltinType::Byte));
    assert_eq!(BuiltinType::from_name("Int"), None);
  }

  #[test]
  fn renders_container_names() {
    let mut store = TypeStore::new();
    let list = store.alloc(TypeKind::List {
      element: TypeId::STRING,
    });
    let map = store.alloc(TypeKind::Map {
      key: TypeId::I32,
      value: list,
    });
    assert_eq!(store.name(map), "map<i32, list<string>>");
    assert!(store.is_container(map));
    assert!(!store.is_builtin(map));
  }

  #[test]
  fn follows_typedef_chains() {
    let mut store = TypeStore::new();
    let inner = store.alloc(TypeKind::Typedef {
      file: FileId(0),
      name: "Inner".into(),
      old_type: TypeId::I64,
      index: 0,
    });
    let outer = store.alloc(TypeKind::Typedef {
      file: FileId(0),
      name: "Outer".into(),
      old_type: inner,
      index: 1,
    });
    assert_eq!(store.true_type(outer), TypeId::I64);
    assert_eq!(store.true_type(TypeId::BOOL), TypeId::BOOL);
    assert!(store.is_typedef(outer));
    assert_eq!(store.name(outer), "Outer");
    assert_eq!(store.file(outer), Some(FileId(0)));
  }
}
