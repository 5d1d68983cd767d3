use crate::error::LoadError;
use crate::registry::Program;
use crate::schema::ConstValue;
use crate::schema::Constant;
use crate::schema::EnumMember;
use crate::schema::EnumType;
use crate::schema::Field;
use crate::schema::LinkedProgram;
use crate::schema::Service;
use crate::schema::ServiceMethod;
use crate::schema::StructType;
use crate::schema::Typedef;
use crate::symbols::DeclKind;
use crate::symbols::LocalDecl;
use crate::symbols::SymbolTable;
use crate::types::BuiltinType;
use crate::types::TypeId;
use crate::types::TypeKind;
use crate::types::TypeStore;
use diagnostics::FileId;
use parse_thrift::ast::const_value::ConstValue as ConstValueSyntax;
use parse_thrift::ast::node::Node;
use parse_thrift::ast::stx::Definition;
use parse_thrift::ast::stx::EnumDecl;
use parse_thrift::ast::stx::FieldDecl;
use parse_thrift::ast::stx::FunctionDecl;
use parse_thrift::ast::type_expr::TypeExpr;
use parse_thrift::loc::Loc;
use tracing::debug;
use tracing::trace;

/// Values of an enum's members in declaration order. Members without an explicit value follow the
/// previous one; the first defaults to 0.
pub fn enum_member_values(decl: &EnumDecl) -> Vec<i32> {
  let mut next = 0i64;
  decl
    .members
    .iter()
    .map(|m| {
      let value = m.stx.value.map(i64::from).unwrap_or(next);
      next = value + 1;
      value as i32
    })
    .collect()
}

#[derive(Clone, Copy, Debug)]
struct DeclSlot {
  /// Position in the flattened collection of this declaration's kind.
  index: usize,
  /// Set up front for enums, structs and services, and once resolved for typedefs. Never set for
  /// constants.
  type_id: Option<TypeId>,
}

pub(crate) struct Linker<'a> {
  programs: &'a [Program],
  symbols: &'a [SymbolTable],
  store: TypeStore,
  slots: Vec<Vec<DeclSlot>>,
  // Typedefs currently being resolved, outermost first.
  typedef_stack: Vec<(FileId, usize)>,
}

impl<'a> Linker<'a> {
  /// Allocates ids for every enum, struct and service so that references to them, including
  /// self references, resolve without recursion.
  pub fn new(programs: &'a [Program], symbols: &'a [SymbolTable]) -> Linker<'a> {
    let mut store = TypeStore::new();
    let mut counts = [0usize; 5];
    let mut slots = Vec::with_capacity(programs.len());
    for program in programs {
      let file = program.file;
      let mut file_slots = Vec::with_capacity(program.document.stx.definitions.len());
      for def in &program.document.stx.definitions {
        let kind = DeclKind::of(&def.stx);
        let count = &mut counts[kind as usize];
        let index = *count;
        *count += 1;
        let name = def.stx.name().to_string();
        let type_id = match def.stx.as_ref() {
          Definition::Enum(_) => Some(store.alloc(TypeKind::Enum { file, name, index })),
          Definition::Struct(decl) => Some(store.alloc(TypeKind::Struct {
            file,
            name,
            kind: decl.kind,
            index,
          })),
          Definition::Service(_) => Some(store.alloc(TypeKind::Service { file, name, index })),
          Definition::Const(_) | Definition::Typedef(_) => None,
        };
        file_slots.push(DeclSlot { index, type_id });
      }
      slots.push(file_slots);
    }
    Linker {
      programs,
      symbols,
      store,
      slots,
      typedef_stack: Vec::new(),
    }
  }

  fn program(&self, file: FileId) -> &'a Program {
    let programs: &'a [Program] = self.programs;
    &programs[file.index()]
  }

  fn symbols(&self, file: FileId) -> &'a SymbolTable {
    let symbols: &'a [SymbolTable] = self.symbols;
    &symbols[file.index()]
  }

  fn declared_type(&self, file: FileId, decl_index: usize) -> TypeId {
    self.slots[file.index()][decl_index]
      .type_id
      .expect("enum, struct and service ids are allocated up front")
  }

  fn unresolved(
    &self,
    file: FileId,
    name: &str,
    loc: Loc,
    expected: Option<&'static str>,
  ) -> LoadError {
    LoadError::UnresolvedType {
      name: name.to_string(),
      location: self.program(file).location(loc),
      expected,
    }
  }

  /// Finds a declaration visible from `file` by a bare name or an `alias.Name` reference. Scoped
  /// names only search the aliased program's own declarations.
  fn lookup(&self, file: FileId, name: &str) -> Option<(FileId, LocalDecl)> {
    if let Some(decl) = self.symbols(file).decl(name) {
      return Some((file, *decl));
    };
    let (alias, name) = name.rsplit_once('.')?;
    let target = self.symbols(file).alias(alias)?;
    let decl = self.symbols(target).decl(name)?;
    Some((target, *decl))
  }

  fn resolve_name(&mut self, file: FileId, name: &str, loc: Loc) -> Result<TypeId, LoadError> {
    if let Some(builtin) = BuiltinType::from_name(name) {
      return Ok(builtin.type_id());
    };
    let Some((target, decl)) = self.lookup(file, name) else {
      return Err(self.unresolved(file, name, loc, None));
    };
    let id = match decl.kind {
      DeclKind::Typedef => self.resolve_typedef(target, decl.index)?,
      DeclKind::Const => return Err(self.unresolved(file, name, loc, Some("a type"))),
      DeclKind::Enum | DeclKind::Struct | DeclKind::Service => {
        self.declared_type(target, decl.index)
      }
    };
    trace!(file = file.0, name, type_id = id.0, "resolved type");
    Ok(id)
  }

  pub fn resolve_type_expr(
    &mut self,
    file: FileId,
    expr: &Node<TypeExpr>,
  ) -> Result<TypeId, LoadError> {
    let kind = match expr.stx.as_ref() {
      TypeExpr::Named { name } => return self.resolve_name(file, name, expr.loc),
      TypeExpr::List { element } => TypeKind::List {
        element: self.resolve_type_expr(file, element)?,
      },
      TypeExpr::Set { element } => TypeKind::Set {
        element: self.resolve_type_expr(file, element)?,
      },
      TypeExpr::Map { key, value } => TypeKind::Map {
        key: self.resolve_type_expr(file, key)?,
        value: self.resolve_type_expr(file, value)?,
      },
    };
    Ok(self.store.alloc(kind))
  }

  /// Resolves the typedef at `decl_index` in `file`, allocating its id the first time. The
  /// underlying chain is resolved eagerly, so a typedef that reaches itself is an error.
  fn resolve_typedef(&mut self, file: FileId, decl_index: usize) -> Result<TypeId, LoadError> {
    let slot = self.slots[file.index()][decl_index];
    if let Some(id) = slot.type_id {
      return Ok(id);
    };
    let program = self.program(file);
    let Definition::Typedef(decl) = program.document.stx.definitions[decl_index].stx.as_ref() else {
      unreachable!("slot is not a typedef");
    };
    if let Some(start) = self
      .typedef_stack
      .iter()
      .position(|&entry| entry == (file, decl_index))
    {
      let chain = self.typedef_stack[start..]
        .iter()
        .map(|&(f, i)| self.program(f).document.stx.definitions[i].stx.name().to_string())
        .chain(std::iter::once(decl.name.clone()))
        .collect();
      return Err(LoadError::CircularTypedef {
        chain,
        location: program.location(decl.name_loc),
      });
    };
    self.typedef_stack.push((file, decl_index));
    let old_type = self.resolve_type_expr(file, &decl.old_type);
    self.typedef_stack.pop();
    let old_type = old_type?;
    let id = self.store.alloc(TypeKind::Typedef {
      file,
      name: decl.name.clone(),
      old_type,
      index: slot.index,
    });
    self.slots[file.index()][decl_index].type_id = Some(id);
    debug!(
      file = file.0,
      name = %decl.name,
      type_id = id.0,
      old_type = %self.store.name(old_type),
      "resolved typedef"
    );
    Ok(id)
  }

  /// Resolves every typedef, visiting files in the given order.
  pub fn resolve_typedefs(&mut self, order: &[FileId]) -> Result<(), LoadError> {
    for &file in order {
      let program = self.program(file);
      for (index, def) in program.document.stx.definitions.iter().enumerate() {
        if let Definition::Typedef(_) = def.stx.as_ref() {
          self.resolve_typedef(file, index)?;
        };
      }
    }
    Ok(())
  }

  fn enum_member(
    &self,
    file: FileId,
    name: &str,
    loc: Loc,
    target: FileId,
    decl: LocalDecl,
    member: &str,
  ) -> Result<ConstValue, LoadError> {
    let Definition::Enum(enum_decl) = self.program(target).document.stx.definitions[decl.index]
      .stx
      .as_ref()
    else {
      return Err(self.unresolved(file, name, loc, Some("an enum")));
    };
    let values = enum_member_values(enum_decl);
    let Some(position) = enum_decl.members.iter().position(|m| m.stx.name == member) else {
      return Err(self.unresolved(file, name, loc, None));
    };
    Ok(ConstValue::EnumMember {
      enum_type: self.declared_type(target, decl.index),
      name: member.to_string(),
      value: values[position],
    })
  }

  /// Identifiers in constant values name a constant (`NAME`, `alias.NAME`) or an enum member
  /// (`Enum.MEMBER`, `alias.Enum.MEMBER`).
  fn resolve_identifier(
    &self,
    file: FileId,
    name: &str,
    loc: Loc,
  ) -> Result<ConstValue, LoadError> {
    let mut found = false;
    if let Some((target, decl)) = self.lookup(file, name) {
      if decl.kind == DeclKind::Const {
        let constant = self.program(target).document.stx.definitions[decl.index].stx.name();
        return Ok(ConstValue::Constant {
          file: target,
          name: constant.to_string(),
        });
      };
      found = true;
    };
    if let Some((enum_name, member)) = name.rsplit_once('.') {
      if let Some((target, decl)) = self.lookup(file, enum_name) {
        if decl.kind == DeclKind::Enum {
          return self.enum_member(file, name, loc, target, decl, member);
        };
        found = true;
      };
    };
    let expected = found.then_some("a constant or enum member");
    Err(self.unresolved(file, name, loc, expected))
  }

  pub fn resolve_const_value(
    &self,
    file: FileId,
    value: &Node<ConstValueSyntax>,
  ) -> Result<ConstValue, LoadError> {
    Ok(match value.stx.as_ref() {
      ConstValueSyntax::Int { value } => ConstValue::Int { value: *value },
      ConstValueSyntax::Double { value } => ConstValue::Double { value: *value },
      ConstValueSyntax::Literal { value } => ConstValue::String {
        value: value.clone(),
      },
      ConstValueSyntax::Identifier { name } => self.resolve_identifier(file, name, value.loc)?,
      ConstValueSyntax::List { elements } => ConstValue::List {
        elements: elements
          .iter()
          .map(|e| self.resolve_const_value(file, e))
          .collect::<Result<_, _>>()?,
      },
      ConstValueSyntax::Map { entries } => ConstValue::Map {
        entries: entries
          .iter()
          .map(|(k, v)| {
            Ok((
              self.resolve_const_value(file, k)?,
              self.resolve_const_value(file, v)?,
            ))
          })
          .collect::<Result<_, LoadError>>()?,
      },
    })
  }

  /// Follows `extends` from the service at `decl_index`, failing if the chain reaches a service
  /// already on it. Bases that do not resolve to a service end the walk; linking that service
  /// reports them.
  fn check_extends_chain(&self, file: FileId, decl_index: usize) -> Result<(), LoadError> {
    let mut chain = vec![(file, decl_index)];
    let (mut current, mut current_index) = (file, decl_index);
    loop {
      let program = self.program(current);
      let Definition::Service(decl) = program.document.stx.definitions[current_index].stx.as_ref()
      else {
        unreachable!("extends chain holds a non-service");
      };
      let Some(base) = &decl.extends else {
        return Ok(());
      };
      let Some((target, base_decl)) = self.lookup(current, &base.stx) else {
        return Ok(());
      };
      if base_decl.kind != DeclKind::Service {
        return Ok(());
      };
      let next = (target, base_decl.index);
      if let Some(start) = chain.iter().position(|&entry| entry == next) {
        let chain = chain[start..]
          .iter()
          .chain(std::iter::once(&next))
          .map(|&(f, i)| self.program(f).document.stx.definitions[i].stx.name().to_string())
          .collect();
        return Err(LoadError::CircularExtends {
          chain,
          location: program.location(base.loc),
        });
      };
      chain.push(next);
      (current, current_index) = next;
    }
  }

  fn link_field(&mut self, file: FileId, field: &Node<FieldDecl>) -> Result<Field, LoadError> {
    let decl = field.stx.as_ref();
    let type_id = self.resolve_type_expr(file, &decl.typ)?;
    let default_value = decl
      .default
      .as_ref()
      .map(|v| self.resolve_const_value(file, v))
      .transpose()?;
    Ok(Field {
      id: decl.id,
      name: decl.name.clone(),
      requiredness: decl.requiredness,
      type_id,
      default_value,
      location: self.program(file).location(field.loc),
      documentation: decl.doc.clone(),
      annotations: decl.annotations.clone(),
    })
  }

  fn link_fields(
    &mut self,
    file: FileId,
    fields: &[Node<FieldDecl>],
  ) -> Result<Vec<Field>, LoadError> {
    fields.iter().map(|f| self.link_field(file, f)).collect()
  }

  fn link_method(
    &mut self,
    file: FileId,
    function: &Node<FunctionDecl>,
  ) -> Result<ServiceMethod, LoadError> {
    let decl = function.stx.as_ref();
    Ok(ServiceMethod {
      name: decl.name.clone(),
      oneway: decl.oneway,
      return_type: self.resolve_type_expr(file, &decl.return_type)?,
      params: self.link_fields(file, &decl.params)?,
      exceptions: self.link_fields(file, &decl.throws)?,
      location: self.program(file).location(function.loc),
      documentation: decl.doc.clone(),
      annotations: decl.annotations.clone(),
    })
  }

  /// Links every declaration of one program. Typedefs must already be resolved.
  pub fn link_program(&mut self, file: FileId) -> Result<LinkedProgram, LoadError> {
    let program = self.program(file);
    let mut linked = LinkedProgram::default();
    for (index, def) in program.document.stx.definitions.iter().enumerate() {
      let location = program.location(def.stx.name_loc());
      match def.stx.as_ref() {
        Definition::Const(decl) => linked.constants.push(Constant {
          name: decl.name.clone(),
          file,
          type_id: self.resolve_type_expr(file, &decl.typ)?,
          value: self.resolve_const_value(file, &decl.value)?,
          location,
          documentation: decl.doc.clone(),
        }),
        Definition::Typedef(decl) => {
          let type_id = self.resolve_typedef(file, index)?;
          let TypeKind::Typedef { old_type, .. } = *self.store.kind(type_id) else {
            unreachable!("typedef slot holds a non-typedef type");
          };
          linked.typedefs.push(Typedef {
            name: decl.name.clone(),
            file,
            type_id,
            old_type,
            location,
            documentation: decl.doc.clone(),
            annotations: decl.annotations.clone(),
          });
        }
        Definition::Enum(decl) => {
          let members = decl
            .members
            .iter()
            .zip(enum_member_values(decl))
            .map(|(m, value)| EnumMember {
              name: m.stx.name.clone(),
              value,
              location: program.location(m.loc),
              documentation: m.stx.doc.clone(),
              annotations: m.stx.annotations.clone(),
            })
            .collect();
          linked.enums.push(EnumType {
            name: decl.name.clone(),
            file,
            type_id: self.declared_type(file, index),
            location,
            documentation: decl.doc.clone(),
            annotations: decl.annotations.clone(),
            members,
          });
        }
        Definition::Struct(decl) => linked.structs.push(StructType {
          name: decl.name.clone(),
          kind: decl.kind,
          file,
          type_id: self.declared_type(file, index),
          location,
          documentation: decl.doc.clone(),
          annotations: decl.annotations.clone(),
          fields: self.link_fields(file, &decl.fields)?,
        }),
        Definition::Service(decl) => {
          let extends = match &decl.extends {
            Some(base) => {
              let id = self.resolve_name(file, &base.stx, base.loc)?;
              if !self.store.is_service(id) {
                return Err(self.unresolved(file, &base.stx, base.loc, Some("a service")));
              };
              self.check_extends_chain(file, index)?;
              Some(id)
            }
            None => None,
          };
          let methods = decl
            .functions
            .iter()
            .map(|f| self.link_method(file, f))
            .collect::<Result<_, _>>()?;
          linked.services.push(Service {
            name: decl.name.clone(),
            file,
            type_id: self.declared_type(file, index),
            extends,
            location,
            documentation: decl.doc.clone(),
            annotations: decl.annotations.clone(),
            methods,
          });
        }
      };
    }
    Ok(linked)
  }

  pub fn into_store(self) -> TypeStore {
    self.store
  }
}
