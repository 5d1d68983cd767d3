use crate::error::Location;
use crate::registry::Program;
use crate::types::TypeId;
use crate::types::TypeKind;
use crate::types::TypeStore;
use diagnostics::FileId;
use parse_thrift::ast::stx::Annotation;
use parse_thrift::ast::stx::Requiredness;
use parse_thrift::ast::stx::StructKind;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "$t")]
pub enum ConstValue {
  Int {
    value: i64,
  },
  Double {
    value: f64,
  },
  String {
    value: String,
  },
  EnumMember {
    enum_type: TypeId,
    name: String,
    value: i32,
  },
  /// Another constant, referenced rather than inlined.
  Constant {
    file: FileId,
    name: String,
  },
  List {
    elements: Vec<ConstValue>,
  },
  Map {
    entries: Vec<(ConstValue, ConstValue)>,
  },
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumMember {
  pub name: String,
  pub value: i32,
  pub location: Location,
  pub documentation: Option<String>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumType {
  pub name: String,
  pub file: FileId,
  pub type_id: TypeId,
  pub location: Location,
  pub documentation: Option<String>,
  pub annotations: Vec<Annotation>,
  pub members: Vec<EnumMember>,
}

impl EnumType {
  pub fn member_by_name(&self, name: &str) -> Option<&EnumMember> {
    self.members.iter().find(|m| m.name == name)
  }

  /// First member with this value; values are not required to be unique.
  pub fn member_by_value(&self, value: i32) -> Option<&EnumMember> {
    self.members.iter().find(|m| m.value == value)
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Typedef {
  pub name: String,
  pub file: FileId,
  pub type_id: TypeId,
  /// The type named in the declaration, which may itself be a typedef.
  pub old_type: TypeId,
  pub location: Location,
  pub documentation: Option<String>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Field {
  pub id: i32,
  pub name: String,
  pub requiredness: Requiredness,
  pub type_id: TypeId,
  pub default_value: Option<ConstValue>,
  pub location: Location,
  pub documentation: Option<String>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StructType {
  pub name: String,
  pub kind: StructKind,
  pub file: FileId,
  pub type_id: TypeId,
  pub location: Location,
  pub documentation: Option<String>,
  pub annotations: Vec<Annotation>,
  pub fields: Vec<Field>,
}

impl StructType {
  pub fn field_by_name(&self, name: &str) -> Option<&Field> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn field_by_id(&self, id: i32) -> Option<&Field> {
    self.fields.iter().find(|f| f.id == id)
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceMethod {
  pub name: String,
  pub oneway: bool,
  pub return_type: TypeId,
  pub params: Vec<Field>,
  pub exceptions: Vec<Field>,
  pub location: Location,
  pub documentation: Option<String>,
  pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Service {
  pub name: String,
  pub file: FileId,
  pub type_id: TypeId,
  pub extends: Option<TypeId>,
  pub location: Location,
  pub documentation: Option<String>,
  pub annotations: Vec<Annotation>,
  pub methods: Vec<ServiceMethod>,
}

impl Service {
  pub fn method(&self, name: &str) -> Option<&ServiceMethod> {
    self.methods.iter().find(|m| m.name == name)
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Constant {
  pub name: String,
  pub file: FileId,
  pub type_id: TypeId,
  pub value: ConstValue,
  pub location: Location,
  pub documentation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Namespace {
  pub scope: String,
  pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncludeInfo {
  pub path: String,
  pub alias: String,
  pub target: FileId,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProgramInfo {
  pub file: FileId,
  pub path: Arc<str>,
  pub namespaces: Vec<Namespace>,
  pub includes: Vec<IncludeInfo>,
}

impl ProgramInfo {
  pub fn namespace(&self, scope: &str) -> Option<&str> {
    self
      .namespaces
      .iter()
      .find(|ns| ns.scope == scope)
      .or_else(|| self.namespaces.iter().find(|ns| ns.scope == "*"))
      .map(|ns| ns.name.as_str())
  }
}

/// The declarations of one program after linking, in declaration order.
#[derive(Debug, Default)]
pub(crate) struct LinkedProgram {
  pub enums: Vec<EnumType>,
  pub typedefs: Vec<Typedef>,
  pub structs: Vec<StructType>,
  pub services: Vec<Service>,
  pub constants: Vec<Constant>,
}

/// Every declaration of one load, fully linked. Collections are ordered by file registration,
/// then by declaration within a file.
#[derive(Clone, Debug, Serialize)]
pub struct Schema {
  programs: Vec<ProgramInfo>,
  enums: Vec<EnumType>,
  typedefs: Vec<Typedef>,
  structs: Vec<StructType>,
  services: Vec<Service>,
  constants: Vec<Constant>,
  types: TypeStore,
}

impl Schema {
  pub fn programs(&self) -> &[ProgramInfo] {
    &self.programs
  }

  pub fn program(&self, file: FileId) -> Option<&ProgramInfo> {
    self.programs.get(file.index())
  }

  pub fn enums(&self) -> &[EnumType] {
    &self.enums
  }

  pub fn typedefs(&self) -> &[Typedef] {
    &self.typedefs
  }

  /// Structs, unions and exceptions.
  pub fn structs(&self) -> &[StructType] {
    &self.structs
  }

  pub fn unions(&self) -> impl Iterator<Item = &StructType> {
    self.structs.iter().filter(|s| s.kind == StructKind::Union)
  }

  pub fn exceptions(&self) -> impl Iterator<Item = &StructType> {
    self
      .structs
      .iter()
      .filter(|s| s.kind == StructKind::Exception)
  }

  pub fn services(&self) -> &[Service] {
    &self.services
  }

  pub fn constants(&self) -> &[Constant] {
    &self.constants
  }

  pub fn types(&self) -> &TypeStore {
    &self.types
  }

  pub fn enum_type(&self, id: TypeId) -> Option<&EnumType> {
    match self.types.kind(id) {
      TypeKind::Enum { index, .. } => self.enums.get(*index),
      _ => None,
    }
  }

  pub fn struct_type(&self, id: TypeId) -> Option<&StructType> {
    match self.types.kind(id) {
      TypeKind::Struct { index, .. } => self.structs.get(*index),
      _ => None,
    }
  }

  pub fn service(&self, id: TypeId) -> Option<&Service> {
    match self.types.kind(id) {
      TypeKind::Service { index, .. } => self.services.get(*index),
      _ => None,
    }
  }

  pub fn typedef(&self, id: TypeId) -> Option<&Typedef> {
    match self.types.kind(id) {
      TypeKind::Typedef { index, .. } => self.typedefs.get(*index),
      _ => None,
    }
  }

  pub fn constant(&self, file: FileId, name: &str) -> Option<&Constant> {
    self
      .constants
      .iter()
      .find(|c| c.file == file && c.name == name)
  }

  // Name lookups return the first match in schema order; names are only unique per file.

  pub fn find_enum(&self, name: &str) -> Option<&EnumType> {
    self.enums.iter().find(|e| e.name == name)
  }

  pub fn find_typedef(&self, name: &str) -> Option<&Typedef> {
    self.typedefs.iter().find(|t| t.name == name)
  }

  pub fn find_struct(&self, name: &str) -> Option<&StructType> {
    self.structs.iter().find(|s| s.name == name)
  }

  pub fn find_service(&self, name: &str) -> Option<&Service> {
    self.services.iter().find(|s| s.name == name)
  }

  pub fn find_constant(&self, name: &str) -> Option<&Constant> {
    self.constants.iter().find(|c| c.name == name)
  }
}

fn program_info(program: &Program) -> ProgramInfo {
  ProgramInfo {
    file: program.file,
    path: program.path.clone(),
    namespaces: program
      .namespaces()
      .map(|(scope, name)| Namespace {
        scope: scope.to_string(),
        name: name.to_string(),
      })
      .collect(),
    includes: program
      .includes
      .iter()
      .map(|i| IncludeInfo {
        path: i.path.clone(),
        alias: i.alias.clone(),
        target: i.target,
      })
      .collect(),
  }
}

/// Flattens linked programs, which must be in file order, into the final schema.
pub(crate) fn assemble(
  programs: &[Program],
  linked: Vec<LinkedProgram>,
  types: TypeStore,
) -> Schema {
  let mut schema = Schema {
    programs: programs.iter().map(program_info).collect(),
    enums: Vec::new(),
    typedefs: Vec::new(),
    structs: Vec::new(),
    services: Vec::new(),
    constants: Vec::new(),
    types,
  };
  for program in linked {
    schema.enums.extend(program.enums);
    schema.typedefs.extend(program.typedefs);
    schema.structs.extend(program.structs);
    schema.services.extend(program.services);
    schema.constants.extend(program.constants);
  }
  debug_assert!(schema.structs.iter().enumerate().all(|(i, s)| {
    matches!(schema.types.kind(s.type_id), TypeKind::Struct { index, .. } if *index == i)
  }));
  schema
}
